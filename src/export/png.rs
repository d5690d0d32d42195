// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! PNG export: rasterizes the rendered character canvas at 2x pixel ratio.
//!
//! Box-drawing characters are drawn geometrically so connectors stay crisp;
//! label text uses an embedded 5x7 bitmap font. The encoder emits stored
//! deflate blocks, trading file size for zero compression dependencies.

use crate::model::FlowState;
use crate::render::{render_flow, CELL_H_PX, CELL_W_PX};

use super::{ExportError, Palette, Rgb};

/// Raster pixels per canvas cell; the 2x factor matches display exports.
const PIXEL_RATIO: usize = 2;
const PX_W: usize = CELL_W_PX as usize * PIXEL_RATIO;
const PX_H: usize = CELL_H_PX as usize * PIXEL_RATIO;

/// Upper bound on raster area, 64 megapixels.
const MAX_RASTER_PIXELS: usize = 64 * 1024 * 1024;

/// Encodes a snapshot as a PNG image.
pub fn to_png(state: &FlowState, palette: &Palette) -> Result<Vec<u8>, ExportError> {
    let rendered = render_flow(state);
    let lines: Vec<Vec<char>> = rendered
        .text
        .lines()
        .map(|line| line.chars().collect())
        .collect();

    let width = rendered.width * PX_W;
    let height = rendered.height * PX_H;
    if width == 0 || height == 0 || width.saturating_mul(height) > MAX_RASTER_PIXELS {
        return Err(ExportError::TooLarge { width, height });
    }

    let mut raster = Raster::new(width, height, palette.background);
    for (cy, line) in lines.iter().enumerate() {
        for (cx, &ch) in line.iter().enumerate() {
            if ch != ' ' {
                draw_cell(&mut raster, cx, cy, ch, palette.ink);
            }
        }
    }

    Ok(encode(&raster))
}

struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    fn new(width: usize, height: usize, background: Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[background.r, background.g, background.b]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let at = (y * self.width + x) * 3;
        self.pixels[at] = color.r;
        self.pixels[at + 1] = color.g;
        self.pixels[at + 2] = color.b;
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, color);
            }
        }
    }
}

/// Draws one canvas cell at `(cx, cy)` in cell coordinates.
fn draw_cell(raster: &mut Raster, cx: usize, cy: usize, ch: char, ink: Rgb) {
    let x0 = cx * PX_W;
    let y0 = cy * PX_H;
    // Line weight matches the pixel ratio.
    let mid_x = x0 + PX_W / 2 - 1;
    let mid_y = y0 + PX_H / 2 - 1;

    let h_left = |r: &mut Raster| r.fill(x0, mid_y, PX_W / 2 + 1, 2, ink);
    let h_right = |r: &mut Raster| r.fill(mid_x, mid_y, PX_W / 2 + 1, 2, ink);
    let v_top = |r: &mut Raster| r.fill(mid_x, y0, 2, PX_H / 2 + 1, ink);
    let v_bottom = |r: &mut Raster| r.fill(mid_x, mid_y, 2, PX_H / 2 + 1, ink);

    match ch {
        '─' | '~' => {
            h_left(raster);
            h_right(raster);
        }
        '│' => {
            v_top(raster);
            v_bottom(raster);
        }
        '┼' => {
            h_left(raster);
            h_right(raster);
            v_top(raster);
            v_bottom(raster);
        }
        '┌' | '╭' => {
            h_right(raster);
            v_bottom(raster);
        }
        '┐' | '╮' => {
            h_left(raster);
            v_bottom(raster);
        }
        '└' | '╰' => {
            h_right(raster);
            v_top(raster);
        }
        '┘' | '╯' => {
            h_left(raster);
            v_top(raster);
        }
        '╱' => diagonal(raster, x0, y0, ink, true),
        '╲' => diagonal(raster, x0, y0, ink, false),
        '▼' => {
            for row in 0..PX_H / 4 {
                let half = (PX_W / 2).saturating_sub(row * 2);
                if half == 0 {
                    break;
                }
                let cx_px = x0 + PX_W / 2;
                raster.fill(cx_px - half / 2, y0 + PX_H / 2 + row, half, 1, ink);
            }
        }
        '…' => {
            for dot in 0..3 {
                raster.fill(x0 + 2 + dot * 5, y0 + PX_H - 10, 2, 2, ink);
            }
        }
        _ => draw_glyph(raster, x0, y0, ch, ink),
    }
}

fn diagonal(raster: &mut Raster, x0: usize, y0: usize, ink: Rgb, rising: bool) {
    for step in 0..PX_H {
        let x_off = step * PX_W / PX_H;
        let x = if rising {
            x0 + PX_W - 1 - x_off
        } else {
            x0 + x_off
        };
        raster.fill(x, y0 + step, 2, 1, ink);
    }
}

/// Draws an ASCII glyph from the 5x7 font, scaled to the cell.
fn draw_glyph(raster: &mut Raster, x0: usize, y0: usize, ch: char, ink: Rgb) {
    let index = (ch as usize).wrapping_sub(32);
    let glyph = FONT_5X7
        .get(index)
        .unwrap_or(&FONT_5X7[(b'?' - 32) as usize]);

    // 5 columns x 7 rows mapped onto 2x3 pixel blocks, centered in the cell.
    for (col, bits) in glyph.iter().enumerate() {
        for row in 0..7 {
            if bits & (1 << row) != 0 {
                raster.fill(x0 + 3 + col * 2, y0 + 5 + row * 3, 2, 3, ink);
            }
        }
    }
}

/// Classic 5x7 font, one byte per column, bit 0 at the top. ASCII 32..=126.
#[rustfmt::skip]
const FONT_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x5f, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7f, 0x14, 0x7f, 0x14], // #
    [0x24, 0x2a, 0x7f, 0x2a, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1c, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1c, 0x00], // )
    [0x14, 0x08, 0x3e, 0x08, 0x14], // *
    [0x08, 0x08, 0x3e, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3e, 0x51, 0x49, 0x45, 0x3e], // 0
    [0x00, 0x42, 0x7f, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4b, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7f, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3c, 0x4a, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1e], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3e], // @
    [0x7e, 0x11, 0x11, 0x11, 0x7e], // A
    [0x7f, 0x49, 0x49, 0x49, 0x36], // B
    [0x3e, 0x41, 0x41, 0x41, 0x22], // C
    [0x7f, 0x41, 0x41, 0x22, 0x1c], // D
    [0x7f, 0x49, 0x49, 0x49, 0x41], // E
    [0x7f, 0x09, 0x09, 0x09, 0x01], // F
    [0x3e, 0x41, 0x49, 0x49, 0x7a], // G
    [0x7f, 0x08, 0x08, 0x08, 0x7f], // H
    [0x00, 0x41, 0x7f, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3f, 0x01], // J
    [0x7f, 0x08, 0x14, 0x22, 0x41], // K
    [0x7f, 0x40, 0x40, 0x40, 0x40], // L
    [0x7f, 0x02, 0x0c, 0x02, 0x7f], // M
    [0x7f, 0x04, 0x08, 0x10, 0x7f], // N
    [0x3e, 0x41, 0x41, 0x41, 0x3e], // O
    [0x7f, 0x09, 0x09, 0x09, 0x06], // P
    [0x3e, 0x41, 0x51, 0x21, 0x5e], // Q
    [0x7f, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7f, 0x01, 0x01], // T
    [0x3f, 0x40, 0x40, 0x40, 0x3f], // U
    [0x1f, 0x20, 0x40, 0x20, 0x1f], // V
    [0x3f, 0x40, 0x38, 0x40, 0x3f], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7f, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x00, 0x41, 0x41, 0x7f, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7f, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7f], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7e, 0x09, 0x01, 0x02], // f
    [0x0c, 0x52, 0x52, 0x52, 0x3e], // g
    [0x7f, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7d, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3d, 0x00], // j
    [0x7f, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7f, 0x40, 0x00], // l
    [0x7c, 0x04, 0x18, 0x04, 0x78], // m
    [0x7c, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7c, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7c], // q
    [0x7c, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3f, 0x44, 0x40, 0x20], // t
    [0x3c, 0x40, 0x40, 0x20, 0x7c], // u
    [0x1c, 0x20, 0x40, 0x20, 0x1c], // v
    [0x3c, 0x40, 0x30, 0x40, 0x3c], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0c, 0x50, 0x50, 0x50, 0x3c], // y
    [0x44, 0x64, 0x54, 0x4c, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7f, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x10, 0x08, 0x08, 0x10, 0x08], // ~
];

fn encode(raster: &Raster) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"\x89PNG\r\n\x1a\n");

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(raster.width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(raster.height as u32).to_be_bytes());
    // 8-bit RGB, no interlace.
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);
    chunk(&mut out, b"IHDR", &ihdr);

    // Every scanline is prefixed with filter type 0 (none).
    let mut scanlines = Vec::with_capacity(raster.height * (raster.width * 3 + 1));
    for y in 0..raster.height {
        scanlines.push(0);
        let row = y * raster.width * 3;
        scanlines.extend_from_slice(&raster.pixels[row..row + raster.width * 3]);
    }
    chunk(&mut out, b"IDAT", &zlib_stored(&scanlines));
    chunk(&mut out, b"IEND", &[]);
    out
}

fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut crc = Crc32::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&crc.finish().to_be_bytes());
}

/// Wraps raw bytes in a zlib stream of stored (uncompressed) deflate blocks.
fn zlib_stored(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / u16::MAX as usize * 5 + 16);
    // CMF/FLG: 32k window, no preset dictionary, check bits valid.
    out.extend_from_slice(&[0x78, 0x01]);

    let mut chunks = data.chunks(u16::MAX as usize).peekable();
    while let Some(block) = chunks.next() {
        let last = chunks.peek().is_none();
        out.push(u8::from(last));
        let len = block.len() as u16;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(block);
    }
    if data.is_empty() {
        out.extend_from_slice(&[0x01, 0x00, 0x00, 0xff, 0xff]);
    }

    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

fn adler32(data: &[u8]) -> u32 {
    const MOD: u32 = 65521;
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for chunk in data.chunks(5552) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD;
        b %= MOD;
    }
    (b << 16) | a
}

struct Crc32 {
    state: u32,
}

impl Crc32 {
    fn new() -> Self {
        Self { state: 0xffff_ffff }
    }

    fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xedb8_8320
                } else {
                    crc >> 1
                };
            }
        }
        self.state = crc;
    }

    fn finish(self) -> u32 {
        self.state ^ 0xffff_ffff
    }
}

#[cfg(test)]
mod tests {
    use super::{adler32, to_png, zlib_stored, Crc32};
    use crate::export::{ExportError, Palette};
    use crate::graph::build_flow;
    use crate::parse::parse_tasks;

    #[test]
    fn crc32_matches_known_vectors() {
        let mut crc = Crc32::new();
        crc.update(b"123456789");
        assert_eq!(crc.finish(), 0xcbf4_3926);

        let mut crc = Crc32::new();
        crc.update(b"IEND");
        assert_eq!(crc.finish(), 0xae42_6082);
    }

    #[test]
    fn adler32_matches_known_vectors() {
        assert_eq!(adler32(b""), 1);
        assert_eq!(adler32(b"Wikipedia"), 0x11e6_0398);
    }

    #[test]
    fn stored_zlib_stream_round_trips_by_inspection() {
        let stream = zlib_stored(b"hello");
        assert_eq!(&stream[..2], &[0x78, 0x01]);
        // Final stored block: marker, len, one's complement, payload.
        assert_eq!(stream[2], 1);
        assert_eq!(&stream[3..5], &5u16.to_le_bytes());
        assert_eq!(&stream[5..7], &(!5u16).to_le_bytes());
        assert_eq!(&stream[7..12], b"hello");
    }

    #[test]
    fn png_has_signature_and_ihdr_dimensions() {
        let state = build_flow(&parse_tasks("Draft plan\nShip it"), true);
        let bytes = to_png(&state, &Palette::dark()).expect("png");

        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&bytes[12..16], b"IHDR");

        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        assert!(width > 0 && height > 0);
        // One canvas cell is 16x32 raster pixels.
        assert_eq!(width % 16, 0);
        assert_eq!(height % 32, 0);

        assert_eq!(&bytes[bytes.len() - 8..bytes.len() - 4], b"IEND");
    }

    #[test]
    fn empty_render_is_rejected() {
        let state = crate::model::FlowState::default();
        let err = to_png(&state, &Palette::dark()).expect_err("empty raster");
        assert!(matches!(err, ExportError::TooLarge { .. }));
    }
}
