//! Theme and Colors
//!
//! Palette for the chat surface: a dark sidebar, blue for the person typing,
//! neutral light text for the assistant.

use ratatui::style::Color;

// ============================================================================
// Thread
// ============================================================================

/// User messages and the input prompt
pub const USER_BLUE: Color = Color::Rgb(96, 165, 250);

/// Assistant messages
pub const ASSISTANT_TEXT: Color = Color::Rgb(229, 231, 235);

/// Welcome placeholder and separators
pub const DIM_GRAY: Color = Color::Rgb(107, 114, 128);

/// Faded lines at the scroll edges
pub const FADE_NEAR: Color = Color::Rgb(120, 120, 120);

/// Faded lines at the very edge
pub const FADE_FAR: Color = Color::Rgb(80, 80, 80);

// ============================================================================
// Sidebar
// ============================================================================

/// Sidebar header
pub const SIDEBAR_TITLE: Color = Color::White;

/// Conversation titles
pub const SIDEBAR_TEXT: Color = Color::Rgb(209, 213, 219);

/// The conversation currently shown
pub const ACTIVE_HIGHLIGHT: Color = Color::Rgb(31, 41, 55);

/// Focus marker
pub const FOCUS_ACCENT: Color = Color::Rgb(59, 130, 246);

// ============================================================================
// Notices
// ============================================================================

/// Error notices
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Warning notices
pub const WARNING_YELLOW: Color = Color::Rgb(250, 204, 21);

/// Success notices
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

