//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus, edit mode and
//!   playback of the last run
//! - **[`editor`]**: the text buffer behind edit mode
//! - **[`panes`]**: stateless render functions for each visible pane (source, array,
//!   log, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point is [`App`]: construct it with the initial source and run
//! settings and call [`App::run`] to start the event loop.

pub mod app;
pub mod editor;
pub mod panes;
pub mod theme;

pub use app::App;
