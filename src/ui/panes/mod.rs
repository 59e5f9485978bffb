//! TUI pane rendering modules
//!
//! - [`source`]: program text with syntax highlighting and the edit cursor
//! - [`array`]: the array buffer as bars, highlighted element marked
//! - [`log`]: the log feed
//! - [`status`]: status bar with keybindings and run state
//!
//! Each module exports a stateless `render_*` function; scroll offsets live
//! in the [`App`](crate::ui::App) and are clamped during rendering.

pub mod array;
pub mod log;
pub mod source;
pub mod status;

pub use array::render_array_pane;
pub use log::render_log_pane;
pub use source::{render_source_pane, EditCursor};
pub use status::{render_status_bar, StatusRenderData};
