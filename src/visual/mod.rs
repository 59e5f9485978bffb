//! Visualization state and the run lifecycle around it
//!
//! - [`state`]: the array buffer, highlighted index and log
//! - [`pacer`]: what happens during the pause after each mutation
//! - [`session`]: source text plus state, implementing the interpreter [`Host`](crate::interpreter::Host)

pub mod pacer;
pub mod session;
pub mod state;

pub use pacer::{ConsolePacer, NoPause, Pacer};
pub use session::{Phase, RunOutcome, RunSettings, Session};
pub use state::{InitOutcome, VisualState};
