//! Main TUI application state and logic

use super::editor::EditorBuffer;
use super::panes::{self, EditCursor, StatusRenderData};
use crate::samples::Example;
use crate::snapshot::{FrameRecorder, Playback};
use crate::visual::{InitOutcome, RunOutcome, RunSettings, Session};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::info;

/// How long the event loop waits for input before advancing playback
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Array,
    Log,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> array -> log)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Array,
            FocusedPane::Array => FocusedPane::Log,
            FocusedPane::Log => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    session: Session<FrameRecorder>,

    /// Replay of the last run; `None` shows the live session state
    playback: Option<Playback>,

    editor: EditorBuffer,
    editing: bool,

    pub focused_pane: FocusedPane,
    pub source_scroll: usize,
    pub log_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    /// Last time space was pressed (for debouncing)
    last_space_press: Option<Instant>,
}

impl App {
    pub fn new(source: String, settings: RunSettings, max_frames: usize) -> Self {
        let mut session = Session::new(FrameRecorder::new(max_frames), settings);
        session.set_source(source.as_str());
        let status_message = match session.initialize() {
            Ok(InitOutcome::Loaded { name }) => format!("Loaded array '{}'", name),
            Ok(InitOutcome::NoArray) => "Ready!".to_string(),
            Err(_) => "Initialization failed".to_string(),
        };

        App {
            session,
            playback: None,
            editor: EditorBuffer::new(&source),
            editing: false,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            log_scroll: usize::MAX,
            should_quit: false,
            status_message,
            last_space_press: None,
        }
    }

    pub fn session(&self) -> &Session<FrameRecorder> {
        &self.session
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn source(&self) -> String {
        self.editor.text()
    }

    /// Array and highlight currently on screen
    pub fn displayed_array(&self) -> (&[f64], Option<usize>) {
        match self.playback.as_ref().and_then(Playback::current) {
            Some(frame) => (frame.array.as_slice(), frame.highlighted),
            None => {
                let state = self.session.state();
                (state.array(), state.highlighted())
            }
        }
    }

    /// Log lines currently on screen
    pub fn displayed_log(&self) -> &[String] {
        match &self.playback {
            Some(playback) => playback.current_log(),
            None => self.session.state().log(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            let now = Instant::now();
            self.tick(now - last_tick);
            last_tick = now;
        }

        Ok(())
    }

    /// Let `delta` of wall time pass for auto-play
    pub fn tick(&mut self, delta: Duration) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let was_playing = playback.is_playing();
        if playback.advance(delta) {
            self.log_scroll = usize::MAX;
        }
        if was_playing && !playback.is_playing() {
            self.status_message = "Playback complete".to_string();
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main_chunks[0]);

        // Right column: Array (top) | Log (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        let cursor = self.editing.then(|| {
            let (line, column) = self.editor.cursor();
            EditCursor { line, column }
        });
        panes::render_source_pane(
            frame,
            columns[0],
            self.editor.lines(),
            self.focused_pane == FocusedPane::Source,
            cursor,
            &mut self.source_scroll,
        );

        let (array, highlighted) = self.displayed_array();
        panes::render_array_pane(
            frame,
            right_rows[0],
            array,
            highlighted,
            self.focused_pane == FocusedPane::Array,
        );

        let mut log_scroll = self.log_scroll;
        panes::render_log_pane(
            frame,
            right_rows[1],
            self.displayed_log(),
            self.focused_pane == FocusedPane::Log,
            &mut log_scroll,
        );
        self.log_scroll = log_scroll;

        let status = StatusRenderData {
            message: &self.status_message,
            phase: self.session.phase(),
            frame: self
                .playback
                .as_ref()
                .map(|playback| (playback.position(), playback.len())),
            is_playing: self.playback.as_ref().is_some_and(Playback::is_playing),
            is_editing: self.editing,
        };
        panes::render_status_bar(frame, main_chunks[1], &status);
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if self.editing {
            self.handle_edit_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => self.run_program(),
            KeyCode::Char('b') => self.load_example(Example::BubbleSort),
            KeyCode::Char('i') => self.initialize(),
            KeyCode::Char('e') => {
                self.editing = true;
                self.focused_pane = FocusedPane::Source;
                self.status_message = "Editing (Esc to finish)".to_string();
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => self.with_playback(|playback| {
                if playback.step_backward() {
                    "Stepped backward"
                } else {
                    "At first frame"
                }
            }),
            KeyCode::Right => self.with_playback(|playback| {
                if playback.step_forward() {
                    "Stepped forward"
                } else {
                    "At last frame"
                }
            }),
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    self.source_scroll = self.source_scroll.saturating_sub(1);
                }
                FocusedPane::Log => {
                    let total = self.displayed_log().len();
                    self.log_scroll = self.log_scroll.min(total).saturating_sub(1);
                }
                FocusedPane::Array => {}
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    self.source_scroll = self.source_scroll.saturating_add(1);
                }
                FocusedPane::Log => {
                    self.log_scroll = self.log_scroll.saturating_add(1);
                }
                FocusedPane::Array => {}
            },
            KeyCode::Char(' ') => {
                // 200ms debounce against key repeat
                let now = Instant::now();
                if self
                    .last_space_press
                    .is_some_and(|last| now.duration_since(last) < Duration::from_millis(200))
                {
                    return;
                }
                self.last_space_press = Some(now);
                self.with_playback(|playback| {
                    playback.toggle_play();
                    if playback.is_playing() {
                        "Playing..."
                    } else {
                        "Paused"
                    }
                });
            }
            KeyCode::Enter => self.with_playback(|playback| {
                playback.jump_to_end();
                "Jumped to end"
            }),
            KeyCode::Backspace => self.with_playback(|playback| {
                playback.rewind_to_start();
                "Jumped to start"
            }),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing = false;
                self.session.set_source(self.editor.text());
                self.status_message = "Source updated".to_string();
            }
            KeyCode::Char(c) => self.editor.insert_char(c),
            KeyCode::Tab => self.editor.insert_str("    "),
            KeyCode::Enter => self.editor.newline(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Up => self.editor.move_up(),
            KeyCode::Down => self.editor.move_down(),
            KeyCode::Home => self.editor.home(),
            KeyCode::End => self.editor.end(),
            _ => {}
        }
    }

    fn with_playback(&mut self, action: impl FnOnce(&mut Playback) -> &'static str) {
        match self.playback.as_mut() {
            Some(playback) => {
                self.status_message = action(playback).to_string();
                self.log_scroll = usize::MAX;
            }
            None => {
                self.status_message = "Nothing to replay, press r to run".to_string();
            }
        }
    }

    /// Execute the current source and start replaying it
    ///
    /// Any playback in progress is dropped first.
    fn run_program(&mut self) {
        self.playback = None;
        self.session.set_source(self.editor.text());

        let outcome = self.session.run();
        let recording = self.session.pacer_mut().take_recording();
        info!(frames = recording.len(), "replaying run");

        self.status_message = match outcome {
            RunOutcome::Completed => "Playing...".to_string(),
            RunOutcome::Failed(message) => format!("Error: {}", message),
        };
        self.playback = Some(Playback::new(recording));
        self.log_scroll = usize::MAX;
    }

    fn load_example(&mut self, example: Example) {
        self.playback = None;
        self.editor = EditorBuffer::new(example.source());
        self.source_scroll = 0;
        self.status_message = match self.session.load_example(example) {
            Ok(_) => format!("Loaded {} example", example.title()),
            Err(err) => format!("Error: {}", err),
        };
        self.log_scroll = usize::MAX;
    }

    fn initialize(&mut self) {
        self.playback = None;
        self.session.set_source(self.editor.text());
        self.status_message = match self.session.initialize() {
            Ok(InitOutcome::Loaded { name }) => format!("Loaded array '{}'", name),
            Ok(InitOutcome::NoArray) => "No array literal found".to_string(),
            Err(err) => format!("Error: {}", err),
        };
        self.log_scroll = usize::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::Phase;

    fn app(source: &str) -> App {
        let settings = RunSettings {
            pause: Duration::from_millis(10),
            ..RunSettings::default()
        };
        App::new(source.to_string(), settings, 10_000)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_new_initializes_array() {
        let app = app("const a = [3, 1, 2];");
        assert_eq!(app.displayed_array().0, &[3.0, 1.0, 2.0]);
        assert_eq!(app.displayed_log(), &["Initialized array: [3,1,2]".to_string()]);
    }

    #[test]
    fn test_run_starts_playback_from_initial_frame() {
        let mut app = app("");
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('r'));

        let playback = app.playback().unwrap();
        assert!(playback.is_playing());
        assert_eq!(playback.position(), 0);
        assert_eq!(app.displayed_array().0[0], 9.0);
        assert_eq!(app.session().phase(), Phase::Completed);

        press(&mut app, KeyCode::Enter);
        let expected: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(app.displayed_array().0, expected.as_slice());
        assert_eq!(
            app.displayed_log().last().unwrap(),
            "Code executed successfully"
        );
    }

    #[test]
    fn test_tick_advances_playback() {
        let mut app = app("const a = [1];\nlog('x');\nlog('y');");
        press(&mut app, KeyCode::Char('r'));
        app.tick(Duration::from_secs(10));
        assert!(app.playback().unwrap().at_end());
        assert_eq!(app.status_message, "Playback complete");
    }

    #[test]
    fn test_stepping_without_run() {
        let mut app = app("");
        press(&mut app, KeyCode::Right);
        assert!(app.playback().is_none());
        assert!(app.status_message.contains("press r"));
    }

    #[test]
    fn test_edit_mode_updates_source() {
        let mut app = app("");
        press(&mut app, KeyCode::Char('e'));
        assert!(app.is_editing());
        for c in "const z = [5];".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        // 'q' while editing is text, not quit
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Esc);
        assert!(!app.is_editing());
        assert_eq!(app.session().source(), "const z = [5];");

        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.displayed_array().0, &[5.0]);
    }

    #[test]
    fn test_failed_run_reports_error() {
        let mut app = app("const a = [1];\nthrow new Error('boom');");
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.status_message, "Error: boom");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.displayed_log().last().unwrap(), "Error: boom");
    }

    #[test]
    fn test_new_run_replaces_playback() {
        let mut app = app("const a = [1];\nlog('x');");
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.playback().unwrap().position(), 0);
    }

    #[test]
    fn test_focus_cycles_and_quit() {
        let mut app = app("");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Array);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Source);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
