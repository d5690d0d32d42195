// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! Terminal UI.
//!
//! Left pane edits the task text, the center pane shows the generated
//! flowchart, the sidebar carries an inspector and a minimap. Every change
//! to text or diagram goes through history, so undo/redo covers both.

use std::{
    env, io,
    path::PathBuf,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::export::{ExportFormat, ExportRequest, Exporter};
use crate::graph::regenerate;
use crate::history::History;
use crate::model::{EdgeId, FlowState, Handle, NodeId, Position};
use crate::ops::{apply_edit, EditOp};
use crate::parse::parse_tasks;
use crate::render::{render_flow, RenderedFlow};

mod theme;

pub use theme::{Theme, ThemeError};


const TOAST_TTL: Duration = Duration::from_secs(4);
const PAN_STEP: u16 = 2;

/// Starter text shown when no tasks file is given.
pub const DEMO_TEXT: &str = "Create project outline\n\
Identify stakeholders #team\n\
Draft requirements\n\
Review with leads\n\
Design solution #design\n\
Build prototype\n\
Test internally\n\
Deploy to staging\n\
Collect feedback\n\
Ship to production";

/// Behavior knobs resolved from the CLI before the TUI starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuiConfig {
    pub auto_connect: bool,
    pub grid: i64,
    pub snap_to_grid: bool,
    pub theme: Theme,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            auto_connect: true,
            grid: 10,
            snap_to_grid: true,
            theme: Theme::default(),
        }
    }
}

/// Runs the interactive terminal UI until the user quits.
pub fn run(
    config: TuiConfig,
    text: String,
    runtime: tokio::runtime::Handle,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(config, text, runtime);

    while !app.should_quit {
        if let Some(outcome) = app.exporter.poll() {
            match outcome.result {
                Ok(()) => app.set_toast(format!(
                    "Exported {} to {}",
                    outcome.format.label(),
                    outcome.path.display()
                )),
                Err(err) => app.set_toast(format!("Export failed: {err}")),
            }
        }

        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Editor,
    Canvas,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Selection {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Normal,
    /// In-place label editing of the selected node.
    EditLabel { node_id: NodeId, buffer: String },
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
}

struct App {
    config: TuiConfig,
    text: String,
    cursor_line: usize,
    cursor_col: usize,
    history: History,
    rendered: RenderedFlow,
    focus: Focus,
    selection: Selection,
    mode: Mode,
    pending_connect: Option<NodeId>,
    pan_x: u16,
    pan_y: u16,
    minimap_visible: bool,
    show_help: bool,
    toast: Option<Toast>,
    exporter: Exporter,
    export_dir: PathBuf,
    runtime: tokio::runtime::Handle,
    should_quit: bool,
}

impl App {
    fn new(config: TuiConfig, text: String, runtime: tokio::runtime::Handle) -> Self {
        let initial = crate::graph::build_flow(&parse_tasks(&text), config.auto_connect);
        let rendered = render_flow(&initial);
        let cursor_line = text.lines().count().saturating_sub(1);
        let cursor_col = text.lines().last().map_or(0, |line| line.chars().count());
        Self {
            config,
            text,
            cursor_line,
            cursor_col,
            history: History::new(initial),
            rendered,
            focus: Focus::Editor,
            selection: Selection::None,
            mode: Mode::Normal,
            pending_connect: None,
            pan_x: 0,
            pan_y: 0,
            minimap_visible: true,
            show_help: false,
            toast: None,
            exporter: Exporter::new(),
            export_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            runtime,
            should_quit: false,
        }
    }

    fn current(&self) -> &FlowState {
        self.history.current()
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    /// Pushes a new snapshot and refreshes the render and selection.
    fn commit(&mut self, next: FlowState) {
        self.history.push(next);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.rendered = render_flow(self.current());
        self.prune_selection();
    }

    fn prune_selection(&mut self) {
        let stale = match &self.selection {
            Selection::None => false,
            Selection::Node(node_id) => !self.current().contains_node(node_id),
            Selection::Edge(edge_id) => !self.current().contains_edge(edge_id),
        };
        if stale {
            self.selection = Selection::None;
        }
        if let Some(source) = &self.pending_connect {
            if !self.current().contains_node(source) {
                self.pending_connect = None;
            }
        }
    }

    /// Reparses the text and regenerates the diagram, keeping hand-drawn
    /// edges when auto-connect is off.
    fn regenerate_from_text(&mut self) {
        let tasks = parse_tasks(&self.text);
        let next = regenerate(self.current(), &tasks, self.config.auto_connect);
        if &next != self.current() {
            self.commit(next);
        }
    }

    fn apply(&mut self, op: EditOp) {
        match apply_edit(self.current(), &op) {
            Ok(next) => self.commit(next),
            Err(err) => self.set_toast(format!("Edit failed: {err}")),
        }
    }

    // Text editing ------------------------------------------------------

    fn clamp_cursor(&mut self) {
        let lines = self.text.split('\n').count();
        self.cursor_line = self.cursor_line.min(lines.saturating_sub(1));
        let len = self
            .text
            .split('\n')
            .nth(self.cursor_line)
            .map_or(0, |line| line.chars().count());
        self.cursor_col = self.cursor_col.min(len);
    }

    /// Byte offset of the cursor within the text buffer.
    fn cursor_byte(&self) -> usize {
        let mut offset = 0;
        for (idx, line) in self.text.split('\n').enumerate() {
            if idx == self.cursor_line {
                return offset
                    + line
                        .char_indices()
                        .nth(self.cursor_col)
                        .map_or(line.len(), |(at, _)| at);
            }
            offset += line.len() + 1;
        }
        self.text.len()
    }

    fn insert_char(&mut self, ch: char) {
        let at = self.cursor_byte();
        self.text.insert(at, ch);
        if ch == '\n' {
            self.cursor_line += 1;
            self.cursor_col = 0;
        } else {
            self.cursor_col += 1;
        }
        self.regenerate_from_text();
    }

    fn backspace(&mut self) {
        let at = self.cursor_byte();
        if at == 0 {
            return;
        }
        let prev = self.text[..at]
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let removed = self.text.remove(prev);
        if removed == '\n' {
            self.cursor_line -= 1;
            self.cursor_col = self
                .text
                .split('\n')
                .nth(self.cursor_line)
                .map_or(0, |line| line.chars().count());
        } else {
            self.cursor_col -= 1;
        }
        self.regenerate_from_text();
    }

    // Selection ---------------------------------------------------------

    fn select_node_offset(&mut self, offset: isize) {
        let nodes = self.current().nodes();
        if nodes.is_empty() {
            self.selection = Selection::None;
            return;
        }
        let current = match &self.selection {
            Selection::Node(node_id) => nodes.iter().position(|n| n.node_id() == node_id),
            _ => None,
        };
        let next = match current {
            Some(at) => (at as isize + offset).rem_euclid(nodes.len() as isize) as usize,
            None => {
                if offset >= 0 {
                    0
                } else {
                    nodes.len() - 1
                }
            }
        };
        self.selection = Selection::Node(nodes[next].node_id().clone());
    }

    fn select_edge_offset(&mut self, offset: isize) {
        let edges = self.current().edges();
        if edges.is_empty() {
            self.selection = Selection::None;
            return;
        }
        let current = match &self.selection {
            Selection::Edge(edge_id) => edges.iter().position(|e| e.edge_id() == edge_id),
            _ => None,
        };
        let next = match current {
            Some(at) => (at as isize + offset).rem_euclid(edges.len() as isize) as usize,
            None => 0,
        };
        self.selection = Selection::Edge(edges[next].edge_id().clone());
    }

    fn selected_node_id(&self) -> Option<&NodeId> {
        match &self.selection {
            Selection::Node(node_id) => Some(node_id),
            _ => None,
        }
    }

    // Diagram edits -----------------------------------------------------

    fn move_selected_node(&mut self, dx: i64, dy: i64) {
        let Some(node_id) = self.selected_node_id().cloned() else {
            self.set_toast("No node selected");
            return;
        };
        let Some(node) = self.current().node(&node_id) else {
            return;
        };
        let step = self.config.grid.max(1);
        let raw = Position::new(node.position().x + dx * step, node.position().y + dy * step);
        let position = if self.config.snap_to_grid {
            raw.snapped(self.config.grid)
        } else {
            raw
        };
        self.apply(EditOp::MoveNode { node_id, position });
    }

    fn begin_label_edit(&mut self) {
        let Some(node_id) = self.selected_node_id().cloned() else {
            self.set_toast("No node selected");
            return;
        };
        let buffer = self
            .current()
            .node(&node_id)
            .map(|node| node.label().to_owned())
            .unwrap_or_default();
        self.mode = Mode::EditLabel { node_id, buffer };
    }

    fn connect_step(&mut self) {
        let Some(node_id) = self.selected_node_id().cloned() else {
            self.set_toast("Select a node first");
            return;
        };
        match self.pending_connect.take() {
            None => {
                self.pending_connect = Some(node_id);
                self.set_toast("Connecting: select the target node, then press c");
            }
            Some(source) if source == node_id => {
                self.set_toast("Connect cancelled (source and target are the same)");
            }
            Some(source) => {
                self.apply(EditOp::Connect {
                    source,
                    source_handle: Handle::SourceBottom,
                    target: node_id,
                    target_handle: Handle::Top,
                });
            }
        }
    }

    /// Delete contract: only reachable in normal mode; label and text
    /// editing consume Backspace/Delete themselves.
    fn delete_selection(&mut self) {
        let op = match std::mem::take(&mut self.selection) {
            Selection::None => {
                self.set_toast("Nothing selected");
                return;
            }
            Selection::Node(node_id) => EditOp::RemoveSelection {
                node_ids: vec![node_id],
                edge_ids: Vec::new(),
            },
            Selection::Edge(edge_id) => EditOp::RemoveSelection {
                node_ids: Vec::new(),
                edge_ids: vec![edge_id],
            },
        };
        self.apply(op);
    }

    fn undo(&mut self) {
        if self.history.undo().is_some() {
            self.refresh();
        } else {
            self.set_toast("Nothing to undo");
        }
    }

    fn redo(&mut self) {
        if self.history.redo().is_some() {
            self.refresh();
        } else {
            self.set_toast("Nothing to redo");
        }
    }

    fn toggle_auto_connect(&mut self) {
        self.config.auto_connect = !self.config.auto_connect;
        let tasks = parse_tasks(&self.text);
        let next = regenerate(self.current(), &tasks, self.config.auto_connect);
        if &next != self.current() {
            self.commit(next);
        }
        self.set_toast(if self.config.auto_connect {
            "Auto-connect on"
        } else {
            "Auto-connect off (edges are kept as drawn)"
        });
    }

    fn toggle_theme(&mut self) {
        self.config.theme = match self.config.theme {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        self.set_toast(format!("Theme: {}", self.config.theme));
    }

    fn yank_flowchart_text(&mut self) {
        if self.rendered.text.is_empty() {
            self.set_toast("Nothing to copy");
            return;
        }
        match copy_to_clipboard(&self.rendered.text) {
            Ok(backend) => self.set_toast(format!("Copied flowchart text ({backend})")),
            Err(err) => self.set_toast(format!("Clipboard error: {err}")),
        }
    }

    fn begin_export(&mut self, format: ExportFormat) {
        if self.current().is_empty() {
            self.set_toast("Nothing to export");
            return;
        }
        let request = ExportRequest {
            format,
            state: self.current().clone(),
            palette: self.config.theme.palette(),
            dir: self.export_dir.clone(),
        };
        if self.exporter.start(&self.runtime, request) {
            self.set_toast(format!("Exporting {}...", format.label()));
        } else {
            self.set_toast("An export is already running");
        }
    }

    // Key handling ------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        if let Mode::EditLabel { .. } = &self.mode {
            self.handle_label_edit_key(key);
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('z') => self.undo(),
                KeyCode::Char('y') => self.redo(),
                KeyCode::Char('c') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Editor => Focus::Canvas,
                    Focus::Canvas => Focus::Editor,
                };
                return;
            }
            KeyCode::F(1) => {
                self.show_help = true;
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Editor => self.handle_editor_key(key),
            Focus::Canvas => self.handle_canvas_key(key),
        }
    }

    fn handle_label_edit_key(&mut self, key: KeyEvent) {
        let Mode::EditLabel { node_id, buffer } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.set_toast("Label edit cancelled");
            }
            KeyCode::Enter => {
                let op = EditOp::SetNodeLabel {
                    node_id: node_id.clone(),
                    label: buffer.clone(),
                };
                self.mode = Mode::Normal;
                self.apply(op);
            }
            // While editing, Backspace edits the buffer, never the diagram.
            KeyCode::Backspace | KeyCode::Delete => {
                buffer.pop();
            }
            KeyCode::Char(ch) => buffer.push(ch),
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.insert_char('\n'),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(ch) => self.insert_char(ch),
            KeyCode::Up => {
                self.cursor_line = self.cursor_line.saturating_sub(1);
                self.clamp_cursor();
            }
            KeyCode::Down => {
                self.cursor_line += 1;
                self.clamp_cursor();
            }
            KeyCode::Left => self.cursor_col = self.cursor_col.saturating_sub(1),
            KeyCode::Right => {
                self.cursor_col += 1;
                self.clamp_cursor();
            }
            KeyCode::Home => self.cursor_col = 0,
            KeyCode::End => {
                self.cursor_col = usize::MAX;
                self.clamp_cursor();
            }
            _ => {}
        }
    }

    fn handle_canvas_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.pending_connect.take().is_some() {
                    self.set_toast("Connect cancelled");
                } else if self.selection != Selection::None {
                    self.selection = Selection::None;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('n') => self.select_node_offset(1),
            KeyCode::Char('p') => self.select_node_offset(-1),
            KeyCode::Char('e') => self.select_edge_offset(1),
            KeyCode::Char('E') => self.select_edge_offset(-1),
            KeyCode::Up => self.move_selected_node(0, -1),
            KeyCode::Down => self.move_selected_node(0, 1),
            KeyCode::Left => self.move_selected_node(-1, 0),
            KeyCode::Right => self.move_selected_node(1, 0),
            KeyCode::Enter => self.begin_label_edit(),
            KeyCode::Char('c') => self.connect_step(),
            KeyCode::Delete | KeyCode::Backspace => self.delete_selection(),
            KeyCode::Char('u') => self.undo(),
            KeyCode::Char('r') => self.redo(),
            KeyCode::Char('a') => self.toggle_auto_connect(),
            KeyCode::Char('g') => {
                self.config.snap_to_grid = !self.config.snap_to_grid;
                self.set_toast(if self.config.snap_to_grid {
                    format!("Snap to grid on ({} px)", self.config.grid)
                } else {
                    "Snap to grid off".to_owned()
                });
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.config.grid = (self.config.grid + 5).min(100);
                self.set_toast(format!("Grid {} px", self.config.grid));
            }
            KeyCode::Char('-') => {
                self.config.grid = (self.config.grid - 5).max(5);
                self.set_toast(format!("Grid {} px", self.config.grid));
            }
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('m') => self.minimap_visible = !self.minimap_visible,
            KeyCode::Char('h') => self.pan_x = self.pan_x.saturating_sub(PAN_STEP),
            KeyCode::Char('l') => self.pan_x = self.pan_x.saturating_add(PAN_STEP),
            KeyCode::Char('k') => self.pan_y = self.pan_y.saturating_sub(PAN_STEP),
            KeyCode::Char('j') => self.pan_y = self.pan_y.saturating_add(PAN_STEP),
            KeyCode::Char('y') => self.yank_flowchart_text(),
            KeyCode::Char('x') => self.begin_export(ExportFormat::Png),
            KeyCode::Char('s') => self.begin_export(ExportFormat::Svg),
            KeyCode::Char('d') => self.begin_export(ExportFormat::Pdf),
            KeyCode::Char('w') => self.begin_export(ExportFormat::Json),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }
}

// Drawing ---------------------------------------------------------------

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let theme = app.config.theme;
    let area = frame.size();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let main_area = rows[0];
    let status_area = rows[1];

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Min(0),
            Constraint::Percentage(24),
        ])
        .split(main_area);
    let editor_area = panes[0];
    let canvas_area = panes[1];
    let sidebar_area = panes[2];

    draw_editor(frame, app, editor_area);
    draw_canvas(frame, app, canvas_area);
    draw_sidebar(frame, app, sidebar_area);
    draw_footer(frame, app, status_area);

    if app.show_help {
        draw_help(frame, theme, main_area);
    }
}

fn draw_editor(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let theme = app.config.theme;
    let editor = Paragraph::new(app.text.clone()).style(theme.base_style()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Tasks ")
            .border_style(theme.panel_border_style(app.focus == Focus::Editor)),
    );
    frame.render_widget(editor, area);

    if app.focus == Focus::Editor && matches!(app.mode, Mode::Normal) {
        let x = area.x + 1 + app.cursor_col.min(area.width.saturating_sub(2) as usize) as u16;
        let y = area.y + 1 + app.cursor_line.min(area.height.saturating_sub(2) as usize) as u16;
        frame.set_cursor(x, y);
    }
}

fn draw_canvas(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let theme = app.config.theme;
    let mut title = format!(
        " Flowchart — {} nodes, {} edges ",
        app.current().nodes().len(),
        app.current().edges().len()
    );
    if !app.config.auto_connect {
        title.push_str("[manual edges] ");
    }
    if app.exporter.is_in_flight() {
        title.push_str("[exporting] ");
    }

    let canvas = Paragraph::new(canvas_text(app))
        .style(theme.base_style())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(theme.panel_border_style(app.focus == Focus::Canvas)),
        )
        .scroll((app.pan_y, app.pan_x));
    frame.render_widget(canvas, area);
}

/// Canvas text with the current selection highlighted.
fn canvas_text(app: &App) -> Text<'static> {
    let theme = app.config.theme;
    let style = theme.selection_style();

    // Highlighted cell ranges per row, from the render geometry.
    let mut ranges_per_row: Vec<(usize, usize, usize)> = Vec::new();
    match &app.selection {
        Selection::None => {}
        Selection::Node(node_id) => {
            if let Some(&(x0, y0, x1, y1)) = app.rendered.node_rects.get(node_id) {
                for y in y0..=y1 {
                    ranges_per_row.push((y, x0, x1));
                }
            }
        }
        Selection::Edge(edge_id) => {
            if let Some(spans) = app.rendered.edge_spans.get(edge_id) {
                ranges_per_row.extend(spans.iter().copied());
            }
        }
    }

    let mut lines = Vec::new();
    for (y, raw) in app.rendered.text.lines().enumerate() {
        let mut ranges: Vec<(usize, usize)> = ranges_per_row
            .iter()
            .filter(|(row, _, _)| *row == y)
            .map(|&(_, x0, x1)| (x0, x1))
            .collect();
        if ranges.is_empty() {
            lines.push(Line::from(raw.to_owned()));
            continue;
        }
        ranges.sort_unstable();

        let chars: Vec<char> = raw.chars().collect();
        let mut spans = Vec::new();
        let mut at = 0usize;
        for (x0, x1) in ranges {
            let x0 = x0.min(chars.len());
            let end = (x1 + 1).min(chars.len());
            if x0 > at {
                spans.push(Span::raw(chars[at..x0].iter().collect::<String>()));
            }
            if end > x0.max(at) {
                let start = x0.max(at);
                spans.push(Span::styled(
                    chars[start..end].iter().collect::<String>(),
                    style,
                ));
            }
            at = at.max(end);
        }
        if at < chars.len() {
            spans.push(Span::raw(chars[at..].iter().collect::<String>()));
        }
        lines.push(Line::from(spans));
    }

    Text::from(lines)
}

fn draw_sidebar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let minimap_height = if app.minimap_visible { 10 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(minimap_height)])
        .split(area);

    draw_inspector(frame, app, rows[0]);
    if app.minimap_visible {
        draw_minimap(frame, app, rows[1]);
    }
}

fn draw_inspector(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let theme = app.config.theme;
    let state = app.current();

    let mut lines: Vec<Line<'_>> = Vec::new();
    match &app.selection {
        Selection::None => lines.push(Line::from(Span::styled("No selection", theme.dim_style()))),
        Selection::Node(node_id) => match state.node(node_id) {
            Some(node) => {
                lines.push(Line::from(format!("Node {}", node.node_id())));
                lines.push(Line::from(format!("  label: {}", node.label())));
                lines.push(Line::from(format!("  group: {}", node.group().unwrap_or("—"))));
                lines.push(Line::from(format!("  verb: {}", node.verb().unwrap_or("—"))));
                lines.push(Line::from(format!("  shape: {}", node.shape())));
                lines.push(Line::from(format!(
                    "  at: ({}, {})",
                    node.position().x,
                    node.position().y
                )));
            }
            None => lines.push(Line::from("Selection out of date")),
        },
        Selection::Edge(edge_id) => match state.edge(edge_id) {
            Some(edge) => {
                lines.push(Line::from(format!("Edge {}", edge.edge_id())));
                lines.push(Line::from(format!(
                    "  {} ({}) -> {} ({})",
                    edge.source(),
                    edge.source_handle().as_str(),
                    edge.target(),
                    edge.target_handle().as_str()
                )));
                lines.push(Line::from(format!("  label: {}", edge.label().unwrap_or("—"))));
            }
            None => lines.push(Line::from("Selection out of date")),
        },
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Groups", theme.accent_style())));
    let mut groups = std::collections::BTreeMap::<&str, usize>::new();
    let mut ungrouped = 0usize;
    for node in state.nodes() {
        match node.group() {
            Some(group) => *groups.entry(group).or_default() += 1,
            None => ungrouped += 1,
        }
    }
    if groups.is_empty() && ungrouped == 0 {
        lines.push(Line::from(Span::styled("  (empty)", theme.dim_style())));
    }
    for (group, count) in groups {
        lines.push(Line::from(format!("  #{group}: {count}")));
    }
    if ungrouped > 0 {
        lines.push(Line::from(format!("  ungrouped: {ungrouped}")));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "History {}/{}",
        app.history.index() + 1,
        app.history.len()
    )));

    if let Mode::EditLabel { buffer, .. } = &app.mode {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Label: {buffer}▏"),
            theme.selection_style(),
        )));
    }

    let inspector = Paragraph::new(lines).style(theme.base_style()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Inspector ")
            .border_style(theme.panel_border_style(false)),
    );
    frame.render_widget(inspector, area);
}

fn draw_minimap(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let theme = app.config.theme;
    let inner_w = area.width.saturating_sub(2) as usize;
    let inner_h = area.height.saturating_sub(2) as usize;

    let mut grid = vec![vec![' '; inner_w]; inner_h];
    if inner_w > 0 && inner_h > 0 && app.rendered.width > 0 && app.rendered.height > 0 {
        for (node_id, &(x0, y0, x1, y1)) in &app.rendered.node_rects {
            let cx = (x0 + x1) / 2 * inner_w / app.rendered.width;
            let cy = (y0 + y1) / 2 * inner_h / app.rendered.height;
            let marker = if app.selection == Selection::Node(node_id.clone()) {
                '◆'
            } else {
                '▪'
            };
            if cy < inner_h && cx < inner_w {
                grid[cy][cx] = marker;
            }
        }
    }
    let body = grid
        .into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");

    let minimap = Paragraph::new(body).style(theme.base_style()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Minimap ")
            .border_style(theme.panel_border_style(false)),
    );
    frame.render_widget(minimap, area);
}

fn draw_footer(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let theme = app.config.theme;

    let toast_suffix = match &app.toast {
        Some(toast) if toast.expires_at > Instant::now() => format!(" — {}", toast.message),
        Some(_) => {
            app.toast = None;
            String::new()
        }
        None => String::new(),
    };

    let hints: &[(&str, &str)] = match (&app.mode, app.focus) {
        (Mode::EditLabel { .. }, _) => &[("Enter", "apply"), ("Esc", "cancel")],
        (_, Focus::Editor) => &[("Tab", "canvas"), ("F1", "help"), ("Esc", "quit")],
        (_, Focus::Canvas) => &[
            ("n/p", "node"),
            ("e", "edge"),
            ("arrows", "move"),
            ("Enter", "label"),
            ("c", "connect"),
            ("Del", "delete"),
            ("u/r", "undo/redo"),
            ("x/s/d/w", "export"),
            ("?", "help"),
        ],
    };

    let mut spans = Vec::new();
    for (idx, (key, label)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", theme.dim_style()));
        }
        spans.push(Span::styled(*key, theme.accent_style()));
        spans.push(Span::styled(format!(" {label}"), theme.dim_style()));
    }
    if !toast_suffix.is_empty() {
        let style = if toast_suffix.contains("failed") {
            theme.error_style()
        } else {
            theme.base_style()
        };
        spans.push(Span::styled(toast_suffix, style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame<'_>, theme: Theme, area: Rect) {
    let width = area.width.min(56);
    let height = area.height.min(20);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let body = "\
Tab        switch between tasks and flowchart
n / p      select next / previous node
e / E      select next / previous edge
arrows     move the selected node (grid steps)
Enter      edit the selected node's label
c          connect: pick source, then target
Del        delete the selection and its edges
u / r      undo / redo (also Ctrl+Z / Ctrl+Y)
a          toggle auto-connect
g          toggle snap to grid
+ / -      grow / shrink the snap grid
t          toggle light / dark theme
m          toggle minimap
h j k l    pan the flowchart
y          copy the flowchart text (OSC52)
x s d w    export PNG / SVG / PDF / JSON
q / Esc    quit

Press any key to close this help.";

    frame.render_widget(Clear, popup);
    let help = Paragraph::new(body).style(theme.base_style()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(theme.panel_border_style(true)),
    );
    frame.render_widget(help, popup);
}

// Terminal lifecycle ----------------------------------------------------

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn copy_to_clipboard(text: &str) -> Result<&'static str, String> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text))).map_err(|err| err.to_string())?;
    Ok("osc52")
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}
