//! Visualization state: the array being animated, the highlighted index and the log

use crate::instrument::{detect_array, InitError};
use crate::memory::value::format_number_list;

/// Logged when the source declares no array literal
pub const NO_ARRAY_MESSAGE: &str = "No array found in the code for visualization.";

/// What initialization found
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    /// The buffer was replaced by the literal `name`
    Loaded { name: String },
    /// No literal; the previous buffer is kept
    NoArray,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualState {
    array: Vec<f64>,
    highlighted: Option<usize>,
    log: Vec<String>,
}

impl VisualState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn array(&self) -> &[f64] {
        &self.array
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Reset the log and the highlight marker
    pub fn clear(&mut self) {
        self.log.clear();
        self.highlighted = None;
    }

    /// Seed the buffer from the first array literal in `source`
    ///
    /// Always clears the log and highlight first. A malformed literal leaves
    /// the buffer untouched and is returned to the caller.
    pub fn initialize(&mut self, source: &str) -> Result<InitOutcome, InitError> {
        self.clear();

        match detect_array(source)? {
            Some(found) => {
                self.append_log(format!(
                    "Initialized array: {}",
                    format_number_list(&found.values)
                ));
                self.array = found.values;
                Ok(InitOutcome::Loaded { name: found.name })
            }
            None => {
                self.append_log(NO_ARRAY_MESSAGE);
                Ok(InitOutcome::NoArray)
            }
        }
    }

    /// Mark `index`; `None` clears the marker. The index is not checked
    /// against the buffer length.
    pub fn highlight(&mut self, index: Option<usize>) {
        self.highlighted = index;
    }

    /// Replace the buffer wholesale
    pub fn update(&mut self, values: Vec<f64>) {
        self.array = values;
    }

    pub fn append_log(&mut self, message: impl Into<String>) {
        self.log.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_loads_literal() {
        let mut state = VisualState::new();
        let outcome = state.initialize("const nums = [3, 1, 2];").unwrap();

        assert_eq!(outcome, InitOutcome::Loaded { name: "nums".to_string() });
        assert_eq!(state.array(), &[3.0, 1.0, 2.0]);
        assert_eq!(state.log(), &["Initialized array: [3,1,2]".to_string()]);
    }

    #[test]
    fn test_initialize_without_literal_keeps_buffer() {
        let mut state = VisualState::new();
        state.update(vec![1.0, 2.0]);
        state.append_log("old");
        state.highlight(Some(1));

        assert_eq!(state.initialize("let x = 1;").unwrap(), InitOutcome::NoArray);
        assert_eq!(state.array(), &[1.0, 2.0]);
        assert_eq!(state.highlighted(), None);
        assert_eq!(state.log(), &[NO_ARRAY_MESSAGE.to_string()]);
    }

    #[test]
    fn test_initialize_malformed_keeps_buffer() {
        let mut state = VisualState::new();
        state.update(vec![4.0]);
        assert!(state.initialize("const x = [1,2,]").is_err());
        assert_eq!(state.array(), &[4.0]);
        assert!(state.log().is_empty());
    }

    #[test]
    fn test_highlight_out_of_range_is_stored() {
        let mut state = VisualState::new();
        state.update(vec![1.0]);
        state.highlight(Some(7));
        assert_eq!(state.highlighted(), Some(7));
    }
}
