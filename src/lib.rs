// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! FlowSketch — turn rough task lists into clean, editable flowcharts in the terminal.
//!
//! The pipeline is `parse` (text lines → typed tasks) → `graph` (tasks → node/edge
//! flow state) → `render`/`tui` (interactive canvas) → `export` (PNG/SVG/PDF/JSON).

pub mod export;
pub mod graph;
pub mod history;
pub mod model;
pub mod ops;
pub mod parse;
pub mod render;
pub mod tui;
