//! Pacing of state changes
//!
//! Every host operation ends with a pause so the change can be seen. What a
//! pause *means* depends on where the state is shown: the TUI records a frame
//! and replays it later, headless mode prints and sleeps, tests skip it.

use super::state::VisualState;
use crate::interpreter::RuntimeError;
use crate::memory::value::format_number;
use std::io::Write;
use std::thread;
use std::time::Duration;

/// Receives the visualization state after every paced mutation
pub trait Pacer {
    /// Called once the array is initialized, before the program runs
    fn begin(&mut self, _state: &VisualState) -> Result<(), RuntimeError> {
        Ok(())
    }

    /// Present `state` and hold it for `duration`
    fn pause(&mut self, state: &VisualState, duration: Duration) -> Result<(), RuntimeError>;

    /// Called with the final state (after the success or error line is logged)
    fn finish(&mut self, _state: &VisualState) -> Result<(), RuntimeError> {
        Ok(())
    }
}

/// Counts pauses without waiting
#[derive(Debug, Default)]
pub struct NoPause {
    pub pauses: usize,
    pub total: Duration,
}

impl Pacer for NoPause {
    fn pause(&mut self, _state: &VisualState, duration: Duration) -> Result<(), RuntimeError> {
        self.pauses += 1;
        self.total += duration;
        Ok(())
    }
}

/// Headless output: prints new log lines and array changes, then sleeps
pub struct ConsolePacer<W: Write> {
    out: W,
    sleep: bool,
    printed_lines: usize,
    last_array: Option<Vec<f64>>,
    last_highlight: Option<usize>,
}

impl<W: Write> ConsolePacer<W> {
    pub fn new(out: W, sleep: bool) -> Self {
        ConsolePacer {
            out,
            sleep,
            printed_lines: 0,
            last_array: None,
            last_highlight: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn present(&mut self, state: &VisualState) -> Result<(), RuntimeError> {
        // The log is cleared at the start of every run
        if state.log().len() < self.printed_lines {
            self.printed_lines = 0;
        }

        let mut text = String::new();
        for line in &state.log()[self.printed_lines..] {
            text.push_str(&format!("log   | {}\n", line));
        }
        self.printed_lines = state.log().len();

        let array_changed = self.last_array.as_deref() != Some(state.array());
        if array_changed || self.last_highlight != state.highlighted() {
            text.push_str(&format!(
                "array | {}\n",
                render_strip(state.array(), state.highlighted())
            ));
            self.last_array = Some(state.array().to_vec());
            self.last_highlight = state.highlighted();
        }

        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|err| RuntimeError::Output {
                message: err.to_string(),
            })
    }
}

impl<W: Write> Pacer for ConsolePacer<W> {
    fn begin(&mut self, state: &VisualState) -> Result<(), RuntimeError> {
        self.present(state)
    }

    fn pause(&mut self, state: &VisualState, duration: Duration) -> Result<(), RuntimeError> {
        self.present(state)?;
        if self.sleep && !duration.is_zero() {
            thread::sleep(duration);
        }
        Ok(())
    }

    fn finish(&mut self, state: &VisualState) -> Result<(), RuntimeError> {
        self.present(state)
    }
}

/// One-line rendering of the array with the highlighted cell bracketed: `3 [1] 2`
pub fn render_strip(values: &[f64], highlighted: Option<usize>) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let text = format_number(*v);
            if Some(i) == highlighted {
                format!("[{}]", text)
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_strip() {
        assert_eq!(render_strip(&[3.0, 1.0, 2.5], Some(1)), "3 [1] 2.5");
        assert_eq!(render_strip(&[3.0], Some(4)), "3");
        assert_eq!(render_strip(&[], None), "");
    }

    #[test]
    fn test_console_pacer_prints_only_changes() {
        let mut state = VisualState::new();
        state.update(vec![2.0, 1.0]);
        state.append_log("first");

        let mut pacer = ConsolePacer::new(Vec::new(), false);
        pacer.begin(&state).unwrap();
        state.append_log("second");
        pacer.pause(&state, Duration::from_millis(500)).unwrap();
        state.highlight(Some(0));
        pacer.pause(&state, Duration::ZERO).unwrap();

        let out = String::from_utf8(pacer.into_inner()).unwrap();
        assert_eq!(
            out,
            "log   | first\narray | 2 1\nlog   | second\narray | [2] 1\n"
        );
    }

    #[test]
    fn test_no_pause_counts() {
        let state = VisualState::new();
        let mut pacer = NoPause::default();
        pacer.pause(&state, Duration::from_millis(500)).unwrap();
        pacer.pause(&state, Duration::from_millis(20)).unwrap();
        assert_eq!(pacer.pauses, 2);
        assert_eq!(pacer.total, Duration::from_millis(520));
    }
}
