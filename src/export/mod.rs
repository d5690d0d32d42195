// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Diagram export: PNG, SVG, PDF and JSON files written to a directory.
//!
//! Encoding runs on a blocking worker so the UI stays responsive; at most
//! one export is in flight at a time and the busy flag is cleared by a drop
//! guard, so it cannot stay stuck after a failed or panicked encode.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use crate::model::FlowState;

mod json;
mod pdf;
mod png;
mod svg;

pub use json::to_json;
pub use pdf::to_pdf;
pub use png::to_png;
pub use svg::to_svg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Svg,
    Pdf,
    Json,
}

impl ExportFormat {
    /// Exports always land under a fixed name in the target directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Png => "flowsketch.png",
            Self::Svg => "flowsketch.svg",
            Self::Pdf => "flowsketch.pdf",
            Self::Json => "flowsketch.json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Svg => "SVG",
            Self::Pdf => "PDF",
            Self::Json => "JSON",
        }
    }
}

/// An sRGB color used by the raster and vector encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Export colors derived from the active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub ink: Rgb,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            background: Rgb::new(0x0f, 0x17, 0x2a),
            ink: Rgb::new(0xe2, 0xe8, 0xf0),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Rgb::new(0xf8, 0xfa, 0xfc),
            ink: Rgb::new(0x0f, 0x17, 0x2a),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    /// There is nothing to export; the diagram has no nodes.
    EmptyFlow,
    /// The raster would be degenerate or beyond the size cap.
    TooLarge { width: usize, height: usize },
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFlow => f.write_str("nothing to export: the diagram is empty"),
            Self::TooLarge { width, height } => {
                write!(f, "raster size {width}x{height} is out of range")
            }
            Self::Io(err) => write!(f, "export io error: {err}"),
            Self::Json(err) => write!(f, "export serialization error: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyFlow | Self::TooLarge { .. } => None,
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Encodes a snapshot into the bytes of the requested format.
pub fn render_bytes(
    state: &FlowState,
    format: ExportFormat,
    palette: &Palette,
) -> Result<Vec<u8>, ExportError> {
    if state.is_empty() {
        return Err(ExportError::EmptyFlow);
    }
    match format {
        ExportFormat::Png => to_png(state, palette),
        ExportFormat::Svg => Ok(to_svg(state, palette).into_bytes()),
        ExportFormat::Pdf => Ok(to_pdf(state, palette)),
        ExportFormat::Json => Ok(to_json(state)?.into_bytes()),
    }
}

#[derive(Debug)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub state: FlowState,
    pub palette: Palette,
    pub dir: PathBuf,
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub result: Result<(), ExportError>,
}

/// Runs exports on a blocking worker, one at a time.
pub struct Exporter {
    in_flight: Arc<AtomicBool>,
    done_tx: mpsc::Sender<ExportOutcome>,
    done_rx: mpsc::Receiver<ExportOutcome>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    pub fn new() -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            in_flight: Arc::new(AtomicBool::new(false)),
            done_tx,
            done_rx,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Starts an export unless one is already running. Returns whether the
    /// request was accepted.
    pub fn start(&self, runtime: &tokio::runtime::Handle, request: ExportRequest) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return false;
        }

        let flag = Arc::clone(&self.in_flight);
        let done_tx = self.done_tx.clone();
        runtime.spawn_blocking(move || {
            let outcome = {
                // Clears the busy flag on every exit path, panic included,
                // and before the outcome becomes observable.
                let _guard = InFlightGuard(flag);
                run_export(request)
            };
            let _ = done_tx.send(outcome);
        });
        true
    }

    /// Non-blocking check for a finished export.
    pub fn poll(&self) -> Option<ExportOutcome> {
        self.done_rx.try_recv().ok()
    }
}

struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn run_export(request: ExportRequest) -> ExportOutcome {
    let path = request.dir.join(request.format.file_name());
    let result = render_bytes(&request.state, request.format, &request.palette)
        .and_then(|bytes| fs::write(&path, bytes).map_err(ExportError::Io));
    ExportOutcome {
        format: request.format,
        path,
        result,
    }
}
