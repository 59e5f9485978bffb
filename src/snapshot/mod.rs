// Frame recording and playback
//
// A run executes up front; every paced mutation is captured as a frame that the
// UI replays afterwards, honouring each frame's pause and allowing steps back.

use crate::interpreter::RuntimeError;
use crate::visual::pacer::Pacer;
use crate::visual::state::VisualState;
use std::time::Duration;
use tracing::debug;

/// State after one paced mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub array: Vec<f64>,
    pub highlighted: Option<usize>,
    /// The log is append-only during a run, so a frame only needs its length
    pub log_len: usize,
    /// How long the frame is held during playback
    pub pause: Duration,
}

impl Frame {
    /// Estimate the memory usage of this frame in bytes
    pub fn estimated_size(&self) -> usize {
        std::mem::size_of::<Frame>() + self.array.len() * std::mem::size_of::<f64>()
    }
}

/// Frames of one run together with the full log they index into
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    pub frames: Vec<Frame>,
    pub log: Vec<String>,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Log lines visible in frame `index`
    pub fn log_at(&self, index: usize) -> &[String] {
        let len = self.frames.get(index).map_or(0, |f| f.log_len);
        &self.log[..len.min(self.log.len())]
    }
}

/// [`Pacer`] that records frames instead of waiting
#[derive(Debug)]
pub struct FrameRecorder {
    recording: Recording,
    max_frames: usize,
}

impl FrameRecorder {
    pub fn new(max_frames: usize) -> Self {
        FrameRecorder {
            recording: Recording::default(),
            max_frames,
        }
    }

    pub fn len(&self) -> usize {
        self.recording.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recording.is_empty()
    }

    pub fn frame_limit(&self) -> usize {
        self.max_frames
    }

    /// Hand over the recorded run, leaving the recorder empty
    pub fn take_recording(&mut self) -> Recording {
        std::mem::take(&mut self.recording)
    }

    fn record(&mut self, state: &VisualState, pause: Duration) {
        let log = state.log();
        if log.len() < self.recording.log.len() {
            self.recording.log = log.to_vec();
        } else {
            let known = self.recording.log.len();
            self.recording.log.extend_from_slice(&log[known..]);
        }

        self.recording.frames.push(Frame {
            array: state.array().to_vec(),
            highlighted: state.highlighted(),
            log_len: log.len(),
            pause,
        });
    }
}

impl Pacer for FrameRecorder {
    fn begin(&mut self, state: &VisualState) -> Result<(), RuntimeError> {
        self.recording = Recording::default();
        self.record(state, Duration::ZERO);
        Ok(())
    }

    fn pause(&mut self, state: &VisualState, duration: Duration) -> Result<(), RuntimeError> {
        if self.max_frames > 0 && self.recording.len() >= self.max_frames {
            return Err(RuntimeError::FrameLimitExceeded {
                limit: self.max_frames,
            });
        }
        self.record(state, duration);
        Ok(())
    }

    /// The final frame is always kept, even past the limit
    fn finish(&mut self, state: &VisualState) -> Result<(), RuntimeError> {
        self.record(state, Duration::ZERO);
        let bytes: usize = self.recording.frames.iter().map(Frame::estimated_size).sum();
        debug!(frames = self.recording.len(), bytes, "recording finished");
        Ok(())
    }
}

/// Cursor over a [`Recording`] with auto-play
#[derive(Debug, Default)]
pub struct Playback {
    recording: Recording,
    position: usize,
    playing: bool,
    /// Time spent on the current frame while playing
    elapsed: Duration,
}

impl Playback {
    /// Start playing `recording` from its first frame
    pub fn new(recording: Recording) -> Self {
        let playing = recording.len() > 1;
        Playback {
            recording,
            position: 0,
            playing,
            elapsed: Duration::ZERO,
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.recording.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recording.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn at_end(&self) -> bool {
        self.position + 1 >= self.recording.len()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.recording.frames.get(self.position)
    }

    /// Log lines visible at the current frame
    pub fn current_log(&self) -> &[String] {
        self.recording.log_at(self.position)
    }

    pub fn toggle_play(&mut self) {
        if self.at_end() {
            // Replay from the start
            self.rewind_to_start();
            self.playing = self.recording.len() > 1;
        } else {
            self.playing = !self.playing;
        }
        self.elapsed = Duration::ZERO;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Move one frame forward (stops auto-play)
    pub fn step_forward(&mut self) -> bool {
        self.playing = false;
        self.advance_one()
    }

    /// Move one frame back (stops auto-play)
    pub fn step_backward(&mut self) -> bool {
        self.playing = false;
        self.elapsed = Duration::ZERO;
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        true
    }

    pub fn rewind_to_start(&mut self) {
        self.playing = false;
        self.position = 0;
        self.elapsed = Duration::ZERO;
    }

    pub fn jump_to_end(&mut self) {
        self.playing = false;
        self.position = self.recording.len().saturating_sub(1);
        self.elapsed = Duration::ZERO;
    }

    /// Let `delta` of wall time pass; returns whether the frame changed
    pub fn advance(&mut self, delta: Duration) -> bool {
        if !self.playing {
            return false;
        }
        self.elapsed += delta;

        let mut moved = false;
        while let Some(pause) = self.current().map(|frame| frame.pause) {
            if self.elapsed < pause {
                break;
            }
            self.elapsed -= pause;
            if !self.advance_one() {
                self.playing = false;
                break;
            }
            moved = true;
        }
        moved
    }

    fn advance_one(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.position += 1;
        if !self.playing {
            self.elapsed = Duration::ZERO;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(array: &[f64], highlighted: Option<usize>, log: &[&str]) -> VisualState {
        let mut s = VisualState::new();
        s.update(array.to_vec());
        s.highlight(highlighted);
        for line in log {
            s.append_log(*line);
        }
        s
    }

    fn recorded() -> Recording {
        let mut recorder = FrameRecorder::new(10);
        recorder.begin(&state(&[2.0, 1.0], None, &["init"])).unwrap();
        recorder
            .pause(&state(&[2.0, 1.0], Some(0), &["init", "hl 0"]), Duration::from_millis(500))
            .unwrap();
        recorder
            .pause(&state(&[1.0, 2.0], Some(0), &["init", "hl 0"]), Duration::from_millis(500))
            .unwrap();
        recorder
            .finish(&state(&[1.0, 2.0], Some(0), &["init", "hl 0", "done"]))
            .unwrap();
        recorder.take_recording()
    }

    #[test]
    fn test_recorder_shares_log_prefixes() {
        let recording = recorded();
        assert_eq!(recording.len(), 4);
        assert_eq!(recording.log, vec!["init", "hl 0", "done"]);
        assert_eq!(recording.log_at(0), &["init".to_string()]);
        assert_eq!(recording.log_at(2).len(), 2);
        assert_eq!(recording.frames[2].array, vec![1.0, 2.0]);
    }

    #[test]
    fn test_recorder_frame_limit() {
        let mut recorder = FrameRecorder::new(2);
        let s = VisualState::new();
        recorder.begin(&s).unwrap();
        recorder.pause(&s, Duration::ZERO).unwrap();
        let err = recorder.pause(&s, Duration::ZERO).unwrap_err();
        assert!(matches!(err, RuntimeError::FrameLimitExceeded { limit: 2 }));
        recorder.finish(&s).unwrap();
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn test_stepping() {
        let mut playback = Playback::new(recorded());
        assert!(playback.is_playing());

        assert!(playback.step_forward());
        assert!(!playback.is_playing());
        assert_eq!(playback.position(), 1);
        assert!(playback.step_backward());
        assert!(!playback.step_backward());

        playback.jump_to_end();
        assert!(playback.at_end());
        assert_eq!(playback.current_log().last().unwrap(), "done");
        assert!(!playback.step_forward());

        playback.rewind_to_start();
        assert_eq!(playback.position(), 0);
    }

    #[test]
    fn test_auto_play_honours_pauses() {
        let mut playback = Playback::new(recorded());

        // First frame has no pause
        assert!(playback.advance(Duration::ZERO));
        assert_eq!(playback.position(), 1);

        assert!(!playback.advance(Duration::from_millis(499)));
        assert!(playback.advance(Duration::from_millis(1)));
        assert_eq!(playback.position(), 2);

        assert!(playback.advance(Duration::from_secs(5)));
        assert!(playback.at_end());
        assert!(!playback.is_playing());
    }

    #[test]
    fn test_toggle_at_end_replays() {
        let mut playback = Playback::new(recorded());
        playback.jump_to_end();
        playback.toggle_play();
        assert_eq!(playback.position(), 0);
        assert!(playback.is_playing());
    }
}
