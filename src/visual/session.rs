//! A visualization session: source text, state, and the run lifecycle
//!
//! A run goes `Initializing` (array detection) → `Executing` (rewrite, parse,
//! evaluate) → `Completed` or `Failed`. Every failure is caught here, logged
//! as `Error: <message>` and reported through [`RunOutcome`]; nothing already
//! written to the array or the log is rolled back.

use super::pacer::Pacer;
use super::state::{InitOutcome, VisualState};
use crate::instrument::{instrument, InitError};
use crate::interpreter::constants::DEFAULT_STEP_LIMIT;
use crate::interpreter::{self, Host, RuntimeError};
use crate::memory::value::{format_number, Value};
use crate::samples::Example;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Logged when a program runs to completion
pub const SUCCESS_MESSAGE: &str = "Code executed successfully";

/// Default pause after each visualization step
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Initializing,
    Executing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed(String),
}

/// Knobs that shape a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Pause after highlight/update/log, and the value injected into `delay`
    pub pause: Duration,
    /// Statement budget per run (0 = unlimited)
    pub step_limit: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            pause: DEFAULT_PAUSE,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

pub struct Session<P: Pacer> {
    source: String,
    state: VisualState,
    pacer: P,
    phase: Phase,
    settings: RunSettings,
}

impl<P: Pacer> Session<P> {
    pub fn new(pacer: P, settings: RunSettings) -> Self {
        Session {
            source: String::new(),
            state: VisualState::new(),
            pacer,
            phase: Phase::Idle,
            settings,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    pub fn state(&self) -> &VisualState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> RunSettings {
        self.settings
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut P {
        &mut self.pacer
    }

    pub fn into_pacer(self) -> P {
        self.pacer
    }

    /// Replace the source with a bundled example and re-initialize the array
    pub fn load_example(&mut self, example: Example) -> Result<InitOutcome, InitError> {
        info!(example = example.title(), "loading example");
        self.set_source(example.source());
        self.initialize()
    }

    /// Re-run array detection without executing the program
    pub fn initialize(&mut self) -> Result<InitOutcome, InitError> {
        self.phase = Phase::Initializing;
        match self.state.initialize(&self.source) {
            Ok(outcome) => {
                self.phase = Phase::Idle;
                Ok(outcome)
            }
            Err(err) => {
                warn!(error = %err, "array initialization failed");
                self.state.append_log(format!("Error: {}", err));
                self.phase = Phase::Failed;
                Err(err)
            }
        }
    }

    /// Initialize, instrument and execute the current source
    pub fn run(&mut self) -> RunOutcome {
        info!("run started");
        self.phase = Phase::Initializing;
        if let Err(err) = self.state.initialize(&self.source) {
            return self.fail(err.to_string());
        }
        if let Err(err) = self.pacer.begin(&self.state) {
            return self.fail(err.message());
        }

        self.phase = Phase::Executing;
        let pause_ms = u64::try_from(self.settings.pause.as_millis()).unwrap_or(u64::MAX);
        let instrumented = instrument(&self.source, pause_ms);
        debug!(bytes = instrumented.len(), "instrumented source");

        let buffer = self.state.array().to_vec();
        let step_limit = self.settings.step_limit;
        if let Err(err) = interpreter::execute(&instrumented, &mut *self, &buffer, step_limit) {
            return self.fail(err.message());
        }

        self.state.append_log(SUCCESS_MESSAGE);
        self.phase = Phase::Completed;
        self.finish();
        info!("run completed");
        RunOutcome::Completed
    }

    fn fail(&mut self, message: String) -> RunOutcome {
        info!(error = %message, "run failed");
        self.state.append_log(format!("Error: {}", message));
        self.phase = Phase::Failed;
        self.finish();
        RunOutcome::Failed(message)
    }

    fn finish(&mut self) {
        if let Err(err) = self.pacer.finish(&self.state) {
            warn!(error = %err, "could not present final state");
        }
    }

    fn pause(&mut self, duration: Duration) -> Result<(), RuntimeError> {
        self.pacer.pause(&self.state, duration)
    }
}

/// Marker index for a highlight argument: non-negative integers only
fn highlight_index(index: &Value) -> Option<usize> {
    match index {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && n.is_finite() => Some(*n as usize),
        _ => None,
    }
}

impl<P: Pacer> Host for Session<P> {
    fn highlight(&mut self, index: &Value) -> Result<(), RuntimeError> {
        let marker = highlight_index(index);
        self.state.highlight(marker);

        let value = marker
            .and_then(|i| self.state.array().get(i).copied())
            .map_or_else(|| "undefined".to_string(), format_number);
        self.state
            .append_log(format!("Highlighting element at index {}: {}", index, value));

        self.pause(self.settings.pause)
    }

    fn update(&mut self, values: &[Value]) -> Result<(), RuntimeError> {
        self.state.update(values.iter().map(Value::to_number).collect());
        self.pause(self.settings.pause)
    }

    fn log(&mut self, message: &str) -> Result<(), RuntimeError> {
        self.state.append_log(message);
        self.pause(self.settings.pause)
    }

    /// A missing or non-numeric duration uses the configured pause
    fn delay(&mut self, ms: f64) -> Result<(), RuntimeError> {
        let duration = if ms.is_nan() {
            self.settings.pause
        } else if ms.is_finite() && ms > 0.0 {
            Duration::from_micros((ms * 1000.0).round() as u64)
        } else {
            Duration::ZERO
        };
        self.pause(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::pacer::NoPause;

    fn session(source: &str) -> Session<NoPause> {
        let mut session = Session::new(NoPause::default(), RunSettings::default());
        session.set_source(source);
        session
    }

    #[test]
    fn test_run_success_logs_last() {
        let mut s = session("const a = [2, 1];\nlog('hi');");
        assert_eq!(s.run(), RunOutcome::Completed);
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(
            s.state().log(),
            &[
                "Initialized array: [2,1]".to_string(),
                "hi".to_string(),
                SUCCESS_MESSAGE.to_string(),
            ]
        );
        assert_eq!(s.pacer().pauses, 1);
    }

    #[test]
    fn test_highlight_message_and_marker() {
        let mut s = session("const a = [4, 5];\nhighlightElement(1);\nhighlightElement(9);");
        s.run();
        assert_eq!(s.state().log()[1], "Highlighting element at index 1: 5");
        assert_eq!(s.state().log()[2], "Highlighting element at index 9: undefined");
        assert_eq!(s.state().highlighted(), Some(9));
    }

    #[test]
    fn test_negative_highlight_clears_marker() {
        let mut s = session("const a = [4];\nhighlightElement(0);\nhighlightElement(-1);");
        s.run();
        assert_eq!(s.state().highlighted(), None);
    }

    #[test]
    fn test_runtime_error_is_logged_and_halts() {
        let mut s = session("const a = [1];\nlog('before');\nmissing();\nlog('after');");
        let outcome = s.run();

        assert_eq!(outcome, RunOutcome::Failed("missing is not defined".to_string()));
        assert_eq!(s.phase(), Phase::Failed);
        assert_eq!(s.state().log().last().unwrap(), "Error: missing is not defined");
        assert!(!s.state().log().iter().any(|l| l == "after"));
    }

    #[test]
    fn test_delay_uses_requested_duration() {
        let mut s = session("delay(20); delay(-5); delay();");
        s.run();
        assert_eq!(s.pacer().pauses, 3);
        assert_eq!(s.pacer().total, Duration::from_millis(520));
    }

    #[test]
    fn test_initialize_error_is_logged() {
        let mut s = session("const x = [1,2,]");
        assert!(s.initialize().is_err());
        assert_eq!(s.phase(), Phase::Failed);
        assert!(s.state().log()[0].starts_with("Error: "));
    }

    #[test]
    fn test_load_example_initializes() {
        let mut s = session("");
        let outcome = s.load_example(Example::BubbleSort).unwrap();
        assert_eq!(outcome, InitOutcome::Loaded { name: "list".to_string() });
        assert_eq!(s.state().array().len(), 10);
        assert_eq!(s.phase(), Phase::Idle);
    }
}
