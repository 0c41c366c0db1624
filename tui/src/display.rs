//! Display State Types
//!
//! Types that turn the core's `ChatState` into something the terminal can
//! draw: wrapped, styled thread lines, sidebar entries and the notice bar.
//!
//! # Design Philosophy
//!
//! The TUI is a thin client. It never decides what the conversation looks
//! like; it only lays out what the state store holds. Everything here is a
//! pure function of that state plus the terminal width, so layout can be
//! tested without a terminal.

use std::time::Duration;

use ratatui::style::{Color, Modifier, Style};
use unicode_width::UnicodeWidthStr;

use dstl_chat_core::{ChatState, Message, Notice, NotifyLevel, Role};

use crate::theme::{
    ASSISTANT_TEXT, DIM_GRAY, ERROR_RED, SUCCESS_GREEN, USER_BLUE, WARNING_YELLOW,
};

/// How long a notice stays in the status bar
pub const NOTICE_TTL: Duration = Duration::from_secs(6);

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// Backend reply
    Assistant,
}

impl From<Role> for DisplayRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => DisplayRole::User,
            Role::Assistant => DisplayRole::Assistant,
        }
    }
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant => "Assistant: ",
        }
    }

    /// Text style for this role
    pub fn style(&self) -> Style {
        match self {
            DisplayRole::User => Style::default().fg(USER_BLUE),
            DisplayRole::Assistant => Style::default().fg(ASSISTANT_TEXT),
        }
    }
}

/// One rendered row of the thread
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayLine {
    /// Row text, already wrapped to width
    pub text: String,
    /// Row style
    pub style: Style,
}

impl DisplayLine {
    fn blank() -> Self {
        Self {
            text: String::new(),
            style: Style::default(),
        }
    }
}

/// Wrap the thread to `width` columns
///
/// Each message starts with its role prefix; embedded newlines are kept and
/// a blank row separates messages.
pub fn thread_lines(messages: &[Message], width: usize) -> Vec<DisplayLine> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for msg in messages {
        let role = DisplayRole::from(msg.role);
        let style = role.style();
        let content = format!("{}{}", role.prefix(), msg.content);

        for paragraph in content.split('\n') {
            if paragraph.is_empty() {
                lines.push(DisplayLine {
                    text: String::new(),
                    style,
                });
                continue;
            }
            for row in textwrap::wrap(paragraph, width) {
                lines.push(DisplayLine {
                    text: row.into_owned(),
                    style,
                });
            }
        }
        lines.push(DisplayLine::blank());
    }

    lines
}

/// Placeholder shown while the thread is empty
pub fn welcome_lines() -> Vec<DisplayLine> {
    let dim = Style::default().fg(DIM_GRAY);
    vec![
        DisplayLine {
            text: "Welcome to the DSTL Chat App".to_string(),
            style: dim.add_modifier(Modifier::BOLD),
        },
        DisplayLine {
            text: "Start a conversation!".to_string(),
            style: dim,
        },
    ]
}

/// A conversation row in the sidebar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarEntry {
    /// Title, truncated to fit
    pub label: String,
    /// Whether this is the conversation on screen
    pub active: bool,
}

/// Sidebar rows for the known conversations
pub fn sidebar_entries(state: &ChatState, width: usize) -> Vec<SidebarEntry> {
    state
        .conversations
        .iter()
        .map(|c| SidebarEntry {
            label: truncate(&c.title, width),
            active: state.active == Some(c.id),
        })
        .collect()
}

/// Truncate to `width` display columns, marking the cut with `…`
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// A notice with a remaining lifetime
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// The notice
    pub notice: Notice,
    /// Time left on screen
    pub remaining: Duration,
}

impl DisplayNotification {
    /// Show `notice` for the default lifetime
    pub fn new(notice: Notice) -> Self {
        Self {
            notice,
            remaining: NOTICE_TTL,
        }
    }

    /// Color for the notice level
    pub fn color(&self) -> Color {
        level_color(self.notice.level)
    }
}

/// Color for a notice level
pub fn level_color(level: NotifyLevel) -> Color {
    match level {
        NotifyLevel::Warning => WARNING_YELLOW,
        NotifyLevel::Error => ERROR_RED,
        NotifyLevel::Success => SUCCESS_GREEN,
    }
}

/// The notice bar
#[derive(Debug, Default)]
pub struct NoticeBar {
    /// Currently shown notice
    pub current: Option<DisplayNotification>,
}

impl NoticeBar {
    /// Show a notice, replacing the current one
    pub fn push(&mut self, notice: Notice) {
        self.current = Some(DisplayNotification::new(notice));
    }

    /// Update timers
    pub fn update(&mut self, delta: Duration) {
        if let Some(current) = &mut self.current {
            current.remaining = current.remaining.saturating_sub(delta);
            if current.remaining.is_zero() {
                self.current = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstl_chat_core::{Conversation, ConversationId};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_thread_lines_prefix_and_spacing() {
        let lines = thread_lines(
            &[Message::user("hello"), Message::assistant("Hi there")],
            40,
        );
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["You: hello", "", "Assistant: Hi there", ""]);
        assert_eq!(lines[0].style, DisplayRole::User.style());
        assert_eq!(lines[2].style, DisplayRole::Assistant.style());
    }

    #[test]
    fn test_thread_lines_wrap_and_newlines() {
        let lines = thread_lines(&[Message::assistant("one two three\n\nfour")], 12);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Assistant:", "one two", "three", "", "four", ""]);
    }

    #[test]
    fn test_sidebar_marks_active() {
        let mut state = ChatState::new();
        state.conversations = vec![
            Conversation::new(1, "Greeting"),
            Conversation::new(2, "A rather long conversation title"),
        ];
        state.active = Some(ConversationId(2));

        let entries = sidebar_entries(&state, 10);
        assert_eq!(
            entries,
            vec![
                SidebarEntry {
                    label: "Greeting".to_string(),
                    active: false
                },
                SidebarEntry {
                    label: "A rather …".to_string(),
                    active: true
                },
            ]
        );
    }

    #[test]
    fn test_truncate_edges() {
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("abcd", 3), "ab…");
        assert_eq!(truncate("abcd", 0), "");
    }

    #[test]
    fn test_notice_expires() {
        let mut bar = NoticeBar::default();
        bar.push(Notice::error("boom"));
        bar.update(Duration::from_secs(2));
        assert!(bar.current.is_some());
        bar.update(NOTICE_TTL);
        assert!(bar.current.is_none());
    }
}
