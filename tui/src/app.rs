//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, backend completions, timers)
//! - `ChatState` from the core, mutated only through `ChatState::apply`
//! - `EffectRunner` for non-blocking backend requests
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────┐
//! │ DSTL Chat    │ You: hello                           │
//! │ + New Chat   │                                      │
//! │              │ Assistant: Hi there                  │
//! │ Greeting     │                                      │
//! │ Recipes      ├──────────────────────────────────────┤
//! │              │ You: _                               │
//! │              ├──────────────────────────────────────┤
//! │              │ Enter send | Tab sidebar | Esc quit  │
//! └──────────────┴──────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use dstl_chat_core::{
    ChatBackend, ChatEvent, ChatState, ConversationId, Effect, EffectRunner, Notice,
};

use crate::display::{self, DisplayNotification, NoticeBar};
use crate::theme::{ACTIVE_HIGHLIGHT, DIM_GRAY, FOCUS_ACCENT, SIDEBAR_TEXT, SIDEBAR_TITLE, USER_BLUE};
use crate::widgets::{TextBlock, TextBlockState};

/// Input box height (lines, including its top border)
const INPUT_HEIGHT: u16 = 5;

/// Sidebar width (columns)
const SIDEBAR_WIDTH: u16 = 28;

/// Timer tick for notice expiry
const TICK: Duration = Duration::from_millis(250);

/// Which pane receives keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    /// The input box
    Input,
    /// The conversation list
    Sidebar,
}

/// Main application state
pub struct App<B: ChatBackend + 'static> {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Client state store
    state: ChatState,

    // === Backend Integration ===
    /// Spawns backend requests
    runner: EffectRunner<B>,
    /// Completions of spawned requests
    completions: mpsc::UnboundedReceiver<ChatEvent>,
    /// Requests spawned but not yet completed
    in_flight: usize,

    // === UI State ===
    /// Pane receiving keys
    focus: Focus,
    /// Highlighted sidebar row
    sidebar_cursor: usize,
    /// Sidebar row awaiting a confirming delete press
    armed_delete: Option<ConversationId>,
    /// Thread scroll position
    thread_scroll: TextBlockState,
    /// Status bar notice
    notices: NoticeBar,
    /// Thread viewport height, for paging
    thread_height: u16,
    /// Last frame time (for timers)
    last_frame: Instant,
}

impl<B: ChatBackend + 'static> App<B> {
    /// Create a new App instance
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(backend: Arc<B>) -> Self {
        let (runner, completions) = EffectRunner::new(backend);

        Self {
            running: true,
            state: ChatState::new(),
            runner,
            completions,
            in_flight: 0,
            focus: Focus::Input,
            sidebar_cursor: 0,
            armed_delete: None,
            thread_scroll: TextBlockState::default(),
            notices: NoticeBar::default(),
            thread_height: 0,
            last_frame: Instant::now(),
        }
    }

    /// Client state
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pane receiving keys
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Highlighted sidebar row
    pub fn sidebar_cursor(&self) -> usize {
        self.sidebar_cursor
    }

    /// Requests still in flight
    pub fn pending_requests(&self) -> usize {
        self.in_flight
    }

    /// Notice currently shown
    pub fn notice(&self) -> Option<&DisplayNotification> {
        self.notices.current.as_ref()
    }

    /// Fetch the conversation list
    pub fn start(&mut self) {
        self.dispatch(ChatEvent::Startup);
    }

    /// Main event loop
    pub async fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick = tokio::time::interval(TICK);

        self.start();
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            enum Step {
                Terminal(Option<std::io::Result<Event>>),
                Completion(ChatEvent),
                Tick,
            }

            let step = tokio::select! {
                // Terminal events first so typing stays responsive
                biased;

                maybe_event = event_stream.next() => Step::Terminal(maybe_event),
                Some(event) = self.completions.recv() => Step::Completion(event),
                _ = tick.tick() => Step::Tick,
            };

            match step {
                Step::Terminal(Some(Ok(event))) => self.handle_terminal_event(event),
                Step::Terminal(Some(Err(e))) => warn!(error = %e, "Terminal event error"),
                Step::Terminal(None) => self.running = false,
                Step::Completion(event) => self.on_completion(event),
                Step::Tick => {}
            }

            self.drain_completions();
            self.update();
            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    /// Wait for the next backend completion and apply it
    ///
    /// Returns `false` if nothing is in flight.
    pub async fn process_next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.completions.recv().await {
            Some(event) => {
                self.on_completion(event);
                true
            }
            None => false,
        }
    }

    /// Apply an event and spawn the resulting requests
    fn dispatch(&mut self, event: ChatEvent) {
        let effects = self.state.apply(event);
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        self.in_flight += effects.iter().filter(|e| e.is_request()).count();
        for notice in self.runner.run(effects) {
            debug!(level = ?notice.level, message = %notice.message, "Notice");
            self.notices.push(notice);
        }
    }

    fn on_completion(&mut self, event: ChatEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.dispatch(event);
        self.clamp_sidebar_cursor();
    }

    fn drain_completions(&mut self) {
        while let Ok(event) = self.completions.try_recv() {
            self.on_completion(event);
        }
    }

    fn handle_terminal_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            // Quit
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if ctrl => self.running = false,

            // Global actions
            KeyCode::Char('n') if ctrl => self.new_chat(),
            KeyCode::Char('d') if ctrl => self.delete_active(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.armed_delete = None;
                self.focus = match self.focus {
                    Focus::Input => Focus::Sidebar,
                    Focus::Sidebar => Focus::Input,
                };
                self.clamp_sidebar_cursor();
            }

            // Thread scrolling
            KeyCode::PageUp => {
                let page = (self.thread_height / 2).max(1) as usize;
                self.thread_scroll.scroll_up(page);
            }
            KeyCode::PageDown => {
                let page = (self.thread_height / 2).max(1) as usize;
                self.thread_scroll.scroll_down(page);
            }

            _ => match self.focus {
                Focus::Input => self.handle_input_key(key),
                Focus::Sidebar => self.handle_sidebar_key(key),
            },
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.edit_input(|input| input.push('\n'));
            }
            KeyCode::Enter => {
                if self.state.can_send() {
                    self.dispatch(ChatEvent::SendRequested);
                    self.thread_scroll.scroll_to_bottom();
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.edit_input(|input| input.push(c));
            }
            KeyCode::Backspace => self.edit_input(|input| {
                input.pop();
            }),
            _ => {}
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        let count = self.state.conversations.len();
        let armed = self.armed_delete.take();

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.sidebar_cursor + 1 < count {
                    self.sidebar_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.highlighted() {
                    self.dispatch(ChatEvent::SelectRequested {
                        conversation_id: id,
                    });
                    self.thread_scroll.scroll_to_bottom();
                    self.focus = Focus::Input;
                }
            }
            // Second press on the same row confirms
            KeyCode::Delete | KeyCode::Char('d') => {
                let Some(conversation) = self.state.conversations.get(self.sidebar_cursor) else {
                    return;
                };
                let id = conversation.id;
                if armed == Some(id) {
                    self.dispatch(ChatEvent::DeleteRequested {
                        conversation_id: id,
                    });
                } else {
                    let prompt = format!("Press d again to delete \"{}\"", conversation.title);
                    self.notices.push(Notice::warning(prompt));
                    self.armed_delete = Some(id);
                }
            }
            _ => {}
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.thread_scroll.scroll_up(3),
            MouseEventKind::ScrollDown => self.thread_scroll.scroll_down(3),
            _ => {}
        }
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        let mut input = self.state.input.clone();
        edit(&mut input);
        self.dispatch(ChatEvent::InputChanged(input));
    }

    fn new_chat(&mut self) {
        self.dispatch(ChatEvent::NewChatRequested);
        self.thread_scroll.scroll_to_bottom();
        self.focus = Focus::Input;
    }

    fn delete_active(&mut self) {
        if let Some(id) = self.state.active {
            self.dispatch(ChatEvent::DeleteRequested {
                conversation_id: id,
            });
        }
    }

    fn highlighted(&self) -> Option<ConversationId> {
        self.state
            .conversations
            .get(self.sidebar_cursor)
            .map(|c| c.id)
    }

    fn clamp_sidebar_cursor(&mut self) {
        let count = self.state.conversations.len();
        if self.sidebar_cursor >= count {
            self.sidebar_cursor = count.saturating_sub(1);
        }
    }

    /// Update timers
    fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;

        self.notices.update(delta);
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the UI
    pub fn draw(&mut self, frame: &mut Frame) {
        let [sidebar_area, main_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
                .areas(frame.area());
        let [thread_area, input_area, status_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(main_area);

        self.render_sidebar(frame, sidebar_area);
        self.render_thread(frame, thread_area);
        self.render_input(frame, input_area);
        self.render_status(frame, status_area);
    }

    /// Render the conversation list
    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focus == Focus::Sidebar {
            Style::default().fg(FOCUS_ACCENT)
        } else {
            Style::default().fg(DIM_GRAY)
        };
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(border_style)
            .title(Span::styled(
                " DSTL Chat ",
                Style::default()
                    .fg(SIDEBAR_TITLE)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header_area, list_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(inner);

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                "+ New Chat (Ctrl+N)",
                Style::default().fg(SIDEBAR_TEXT),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Previous chats...",
                Style::default().fg(DIM_GRAY),
            )),
        ]);
        frame.render_widget(header, header_area);

        let width = list_area.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = display::sidebar_entries(&self.state, width)
            .into_iter()
            .map(|entry| {
                let style = if entry.active {
                    Style::default()
                        .fg(SIDEBAR_TEXT)
                        .bg(ACTIVE_HIGHLIGHT)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(SIDEBAR_TEXT)
                };
                ListItem::new(Span::styled(entry.label, style))
            })
            .collect();

        let mut list_state = ListState::default();
        if self.focus == Focus::Sidebar && !items.is_empty() {
            list_state.select(Some(self.sidebar_cursor));
        }

        let list = List::new(items)
            .highlight_symbol("> ")
            .highlight_style(Style::default().fg(FOCUS_ACCENT));
        frame.render_stateful_widget(list, list_area, &mut list_state);
    }

    /// Render the message thread
    fn render_thread(&mut self, frame: &mut Frame, area: Rect) {
        let area = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(2),
            ..area
        };
        self.thread_height = area.height;

        if self.state.messages.is_empty() {
            let mut lines = vec![Line::from(""); (area.height / 3) as usize];
            lines.extend(
                display::welcome_lines()
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l.text, l.style))),
            );
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
            return;
        }

        let lines = display::thread_lines(&self.state.messages, area.width as usize);
        frame.render_stateful_widget(TextBlock::new(&lines), area, &mut self.thread_scroll);
    }

    /// Render the input box
    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focus == Focus::Input {
            Style::default().fg(FOCUS_ACCENT)
        } else {
            Style::default().fg(DIM_GRAY)
        };
        let mut block = Block::default()
            .borders(Borders::TOP)
            .border_style(border_style);
        if let Some(conversation) = self.state.active_conversation() {
            let width = area.width.saturating_sub(4) as usize;
            block = block.title(format!(" {} ", display::truncate(&conversation.title, width)));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text_width = inner.width.saturating_sub(2) as usize;
        let text_height = inner.height as usize;
        if text_width < 5 || text_height < 1 {
            return;
        }

        let cursor = if self.focus == Focus::Input { "_" } else { "" };
        let full_input = format!("You: {}{}", self.state.input, cursor);
        let wrapped: Vec<String> = full_input
            .split('\n')
            .flat_map(|paragraph| {
                if paragraph.is_empty() {
                    vec![String::new()]
                } else {
                    textwrap::wrap(paragraph, text_width)
                        .into_iter()
                        .map(|row| row.into_owned())
                        .collect()
                }
            })
            .collect();

        // Keep the end of long input visible
        let skip = wrapped.len().saturating_sub(text_height);
        let lines: Vec<Line> = wrapped
            .into_iter()
            .skip(skip)
            .map(|row| Line::from(Span::styled(row, Style::default().fg(USER_BLUE))))
            .collect();

        let input_area = Rect {
            x: inner.x + 1,
            width: inner.width.saturating_sub(1),
            ..inner
        };
        frame.render_widget(Paragraph::new(lines), input_area);
    }

    /// Render the status bar
    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(notification) = &self.notices.current {
            Line::from(Span::styled(
                format!(" {}", notification.notice.message),
                Style::default().fg(notification.color()),
            ))
        } else {
            let activity = if self.state.is_creating() {
                " | creating conversation...".to_string()
            } else if self.in_flight > 0 {
                format!(" | waiting on {} request(s)", self.in_flight)
            } else {
                String::new()
            };
            let scroll_info = if self.thread_scroll.scroll_offset > 0 {
                format!(" [^{} lines]", self.thread_scroll.scroll_offset)
            } else {
                String::new()
            };
            Line::from(Span::styled(
                format!(
                    " Enter send | Tab sidebar | Ctrl+N new | Ctrl+D delete | Esc quit{activity}{scroll_info}"
                ),
                Style::default().fg(DIM_GRAY),
            ))
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}
