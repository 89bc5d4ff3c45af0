// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! ratatui + crossterm shell around an [`EditSession`]: a mouse-driven canvas, the account's
//! diagram list, a status strip and a one-line prompt.

use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tracing::{info, warn};

use crate::interact::{EditorCommand, EditorKey, Handled, InputEvent, StatusMessage};
use crate::model::{DiagramId, NodeId};
use crate::session::EditSession;
use crate::store::DiagramMeta;

pub mod input;
pub mod scene;
pub mod viewport;

use input::{pointer_event, ClickTracker};
use scene::{status_style, Scene, SceneView};
use viewport::Viewport;

const FOCUS_COLOR: Color = Color::LightGreen;
const IDLE_BORDER_COLOR: Color = Color::DarkGray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const LIST_WIDTH: u16 = 34;
const STATUS_LINES: u16 = 3;

const FOOTER_HINTS: &[(&str, &str)] = &[
    ("dbl-click", "add"),
    ("drag", "move"),
    ("e", "text"),
    ("c", "connect"),
    ("Del", "delete"),
    ("^S", "save"),
    ("n", "new"),
    ("Tab", "maps"),
    ("q", "quit"),
];

/// Runs the interactive editor until the user quits.
///
/// `open` is loaded before the first frame; without it the session starts on an unsaved, empty
/// diagram.
pub fn run(session: EditSession, open: Option<&DiagramId>) -> io::Result<()> {
    let mut app = App::new(session);
    if let Some(diagram_id) = open {
        app.open(diagram_id);
    }

    let mut terminal = TerminalSession::new()?;
    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                _ => {}
            }
        }
    }

    info!(account = %app.session.account(), "editor closed");
    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(STATUS_LINES),
            Constraint::Length(1),
        ])
        .split(frame.size());
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(LIST_WIDTH)])
        .split(rows[0]);

    let canvas_block = Block::default()
        .borders(Borders::ALL)
        .title(app.canvas_title())
        .border_style(border_style(app.focus == Focus::Canvas));
    let canvas_area = canvas_block.inner(panes[0]);
    frame.render_widget(canvas_block, panes[0]);
    app.viewport.area = canvas_area;
    frame.render_widget(
        SceneView {
            scene: &app.scene,
            viewport: app.viewport,
        },
        canvas_area,
    );

    let items: Vec<ListItem<'_>> = app
        .diagrams
        .iter()
        .map(|meta| {
            let marker = if app.is_current(meta) { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::raw(meta.title.clone()),
                Span::styled(
                    format!("  {}", meta.modified.format("%m-%d %H:%M")),
                    Style::new().fg(FOOTER_LABEL_COLOR),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Maps ({})", app.diagrams.len()))
                .border_style(border_style(app.focus == Focus::List)),
        )
        .highlight_style(Style::new().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, panes[1], &mut app.list_state);

    let status: Vec<Line<'_>> = app
        .scene
        .recent_status(usize::from(STATUS_LINES))
        .map(|line| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", line.at.format("%H:%M:%S")),
                    Style::new().fg(IDLE_BORDER_COLOR),
                ),
                Span::styled(line.message.text.clone(), status_style(line.message.severity)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(status), rows[1]);

    frame.render_widget(Paragraph::new(app.footer_line()), rows[2]);
}

fn border_style(focused: bool) -> Style {
    Style::new().fg(if focused { FOCUS_COLOR } else { IDLE_BORDER_COLOR })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Canvas,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptKind {
    NodeText(NodeId),
    SaveTitle,
    NewTitle,
    ConfirmDelete(DiagramId, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Prompt {
    kind: PromptKind,
    input: String,
}

impl Prompt {
    fn label(&self) -> String {
        match &self.kind {
            PromptKind::NodeText(_) => "Node text".to_owned(),
            PromptKind::SaveTitle => "Save as".to_owned(),
            PromptKind::NewTitle => "New map title".to_owned(),
            PromptKind::ConfirmDelete(_, title) => format!("Delete '{title}'? (y/n)"),
        }
    }
}

struct App {
    session: EditSession,
    scene: Scene,
    viewport: Viewport,
    clicks: ClickTracker,
    focus: Focus,
    diagrams: Vec<DiagramMeta>,
    list_state: ListState,
    prompt: Option<Prompt>,
    quit_armed: bool,
    should_quit: bool,
}

impl App {
    fn new(session: EditSession) -> Self {
        let mut app = Self {
            session,
            scene: Scene::default(),
            viewport: Viewport::new(Rect::default()),
            clicks: ClickTracker::default(),
            focus: Focus::Canvas,
            diagrams: Vec::new(),
            list_state: ListState::default(),
            prompt: None,
            quit_armed: false,
            should_quit: false,
        };
        app.refresh_list();
        app.scene.push_status(StatusMessage::info(
            "Double-click to add a node, then drag it, press c to connect.",
        ));
        app
    }

    fn canvas_title(&self) -> String {
        let title = self
            .session
            .current()
            .map_or("untitled", |meta| meta.title.as_str());
        let dirty = if self.session.editor().is_dirty() { " *" } else { "" };
        let mode = if self.session.editor().is_connecting() {
            " [connecting]"
        } else {
            ""
        };
        format!("{title}{dirty}{mode}")
    }

    fn is_current(&self, meta: &DiagramMeta) -> bool {
        self.session
            .current()
            .is_some_and(|current| current.diagram_id == meta.diagram_id)
    }

    fn footer_line(&self) -> Line<'static> {
        if let Some(prompt) = &self.prompt {
            return Line::from(vec![
                Span::styled(format!("{}: ", prompt.label()), Style::new().fg(FOOTER_KEY_COLOR)),
                Span::raw(prompt.input.clone()),
                Span::styled("▏", Style::new().fg(FOCUS_COLOR)),
            ]);
        }

        let mut spans = Vec::with_capacity(FOOTER_HINTS.len() * 2);
        for (key, label) in FOOTER_HINTS {
            spans.push(Span::styled(*key, Style::new().fg(FOOTER_KEY_COLOR)));
            spans.push(Span::styled(
                format!(" {label}  "),
                Style::new().fg(FOOTER_LABEL_COLOR),
            ));
        }
        Line::from(spans)
    }

    fn status(&mut self, message: StatusMessage) {
        self.scene.push_status(message);
    }

    fn refresh_list(&mut self) {
        match self.session.list() {
            Ok(diagrams) => self.diagrams = diagrams,
            Err(err) => {
                warn!(%err, "listing diagrams failed");
                self.status(StatusMessage::warning(format!("Cannot list maps: {err}")));
            }
        }

        let selected = match self.list_state.selected() {
            _ if self.diagrams.is_empty() => None,
            Some(index) => Some(index.min(self.diagrams.len() - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }

    fn dispatch(&mut self, event: InputEvent) {
        let result = self.session.editor_mut().handle(event, &mut self.scene);
        if matches!(&result, Ok(handled) if *handled != Handled::Nothing) {
            self.quit_armed = false;
        }

        if let Some((node_id, current)) = self.scene.take_text_edit() {
            self.prompt = Some(Prompt {
                kind: PromptKind::NodeText(node_id),
                input: current,
            });
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.prompt.is_some() {
            return;
        }
        if let Some(event) = pointer_event(&mouse, &self.viewport, &mut self.clicks, now) {
            self.focus = Focus::Canvas;
            self.dispatch(event);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.save(None),
                KeyCode::Char('c') => self.quit(),
                _ => {}
            }
            return;
        }

        match self.focus {
            Focus::Canvas => self.handle_canvas_key(key.code),
            Focus::List => self.handle_list_key(key.code),
        }
    }

    fn handle_canvas_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('c') => {
                self.dispatch(InputEvent::Command(EditorCommand::StartConnection))
            }
            KeyCode::Delete | KeyCode::Backspace => {
                self.dispatch(InputEvent::Key(EditorKey::Delete))
            }
            KeyCode::Esc => self.dispatch(InputEvent::Key(EditorKey::Escape)),
            KeyCode::Char('e') => self.edit_selected_text(),
            KeyCode::Char('n') => self.open_prompt(PromptKind::NewTitle),
            KeyCode::Tab => self.focus = Focus::List,
            _ => {}
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Tab | KeyCode::Esc => self.focus = Focus::Canvas,
            KeyCode::Char('q') => self.quit(),
            KeyCode::Up | KeyCode::Char('k') => self.move_list_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_list_cursor(1),
            KeyCode::Char('r') => self.refresh_list(),
            KeyCode::Char('n') => self.open_prompt(PromptKind::NewTitle),
            KeyCode::Enter => {
                if let Some(meta) = self.selected_meta().cloned() {
                    self.open(&meta.diagram_id);
                    self.focus = Focus::Canvas;
                }
            }
            KeyCode::Char('d') => {
                if let Some(meta) = self.selected_meta().cloned() {
                    self.open_prompt(PromptKind::ConfirmDelete(meta.diagram_id, meta.title));
                }
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };

        if let PromptKind::ConfirmDelete(diagram_id, _) = &prompt.kind {
            let diagram_id = diagram_id.clone();
            self.prompt = None;
            if matches!(key.code, KeyCode::Char('y' | 'Y')) {
                self.delete(&diagram_id);
            } else {
                self.status(StatusMessage::info("Delete cancelled."));
            }
            return;
        }

        match key.code {
            KeyCode::Char(ch) => prompt.input.push(ch),
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Esc => {
                if let Some(Prompt {
                    kind: PromptKind::NodeText(_),
                    ..
                }) = self.prompt.take()
                {
                    self.dispatch(InputEvent::TextEditCancelled);
                }
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.confirm_prompt(prompt);
                }
            }
            _ => {}
        }
    }

    fn confirm_prompt(&mut self, prompt: Prompt) {
        match prompt.kind {
            PromptKind::NodeText(node_id) => self.dispatch(InputEvent::TextEditConfirmed {
                node_id,
                text: prompt.input,
            }),
            PromptKind::SaveTitle => self.save(Some(&prompt.input)),
            PromptKind::NewTitle => self.new_diagram(&prompt.input),
            PromptKind::ConfirmDelete(diagram_id, _) => self.delete(&diagram_id),
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            input: String::new(),
        });
    }

    fn edit_selected_text(&mut self) {
        let center = self
            .session
            .editor()
            .selection()
            .and_then(|node_id| self.session.editor().diagram().node(node_id))
            .map(|node| node.center());
        match center {
            Some(center) => self.dispatch(InputEvent::SecondaryActivate(center)),
            None => self.status(StatusMessage::warning("No node selected to edit.")),
        }
    }

    fn selected_meta(&self) -> Option<&DiagramMeta> {
        self.list_state
            .selected()
            .and_then(|index| self.diagrams.get(index))
    }

    fn move_list_cursor(&mut self, delta: isize) {
        if self.diagrams.is_empty() {
            return;
        }
        let last = self.diagrams.len() - 1;
        let current = self.list_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(last);
        self.list_state.select(Some(next));
    }

    fn quit(&mut self) {
        if self.session.editor().is_dirty() && !self.quit_armed {
            self.quit_armed = true;
            self.status(StatusMessage::warning(
                "Unsaved changes; press q again to quit without saving.",
            ));
            return;
        }
        self.should_quit = true;
    }

    fn save(&mut self, title: Option<&str>) {
        if title.is_none() && self.session.needs_title() {
            self.open_prompt(PromptKind::SaveTitle);
            return;
        }
        match self.session.save(title) {
            Ok(meta) => {
                self.quit_armed = false;
                self.status(StatusMessage::info(format!("Saved '{}'.", meta.title)));
                self.refresh_list();
            }
            Err(err) => self.status(StatusMessage::warning(format!("Save failed: {err}"))),
        }
    }

    fn new_diagram(&mut self, title: &str) {
        match self.session.new_diagram(title, &mut self.scene) {
            Ok(meta) => {
                self.status(StatusMessage::info(format!("Created map '{}'.", meta.title)));
                self.refresh_list();
            }
            Err(err) => self.status(StatusMessage::warning(format!("Cannot create map: {err}"))),
        }
    }

    fn open(&mut self, diagram_id: &DiagramId) {
        match self.session.open(diagram_id, &mut self.scene) {
            Ok(report) => {
                let title = self
                    .session
                    .current()
                    .map_or_else(|| diagram_id.to_string(), |meta| meta.title.clone());
                if report.is_clean() {
                    self.status(StatusMessage::info(format!("Opened '{title}'.")));
                } else {
                    self.status(StatusMessage::warning(format!(
                        "Opened '{title}'; dropped {} invalid record(s).",
                        report.dropped.len()
                    )));
                }
            }
            Err(err) => self.status(StatusMessage::warning(format!("Cannot open map: {err}"))),
        }
    }

    fn delete(&mut self, diagram_id: &DiagramId) {
        match self.session.delete(diagram_id, &mut self.scene) {
            Ok(true) => self.status(StatusMessage::info(format!("Deleted map {diagram_id}."))),
            Ok(false) => self.status(StatusMessage::info(format!(
                "Map {diagram_id} was already gone."
            ))),
            Err(err) => self.status(StatusMessage::warning(format!("Cannot delete map: {err}"))),
        }
        self.refresh_list();
    }
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
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
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}
