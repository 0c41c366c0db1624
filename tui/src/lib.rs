//! DSTL Chat TUI - Terminal interface for the DSTL chat application
//!
//! A thin display client over `dstl-chat-core`: every user action becomes a
//! `ChatEvent`, every backend call is an `Effect` run by the core's
//! `EffectRunner`, and this crate only draws the resulting `ChatState`.
//!
//! # Architecture
//!
//! - **App**: event loop, key handling and layout
//! - **Display**: wrapping and styling of thread, sidebar and notices
//! - **Widgets**: bottom-anchored scrollable text block
//! - **Theme**: colors

pub mod app;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::{App, Focus};
