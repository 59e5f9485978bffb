//! Array literal detection
//!
//! The array to visualize is taken from the first `const <name> = [ ... ]`
//! in the source. The bracket contents are read as a JSON array of numbers,
//! so trailing commas, holes and non-numeric elements are rejected.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// First `const name = [...]` on a single line; the contents stop at the first `]`
static ARRAY_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"const\s+(\w+)\s*=\s*\[(.*?)\]").expect("array literal pattern is valid")
});

/// Errors raised while initializing the array from source text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    /// The literal was found but its contents are not a list of numbers
    #[error("Invalid array literal for '{name}': {reason}")]
    InvalidLiteral { name: String, reason: String },
}

/// A numeric array literal found in the source
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedArray {
    pub name: String,
    pub values: Vec<f64>,
}

/// Find and parse the array literal to visualize
///
/// Returns `Ok(None)` when the source declares no `const` array literal.
pub fn detect_array(source: &str) -> Result<Option<DetectedArray>, InitError> {
    let Some(caps) = ARRAY_LITERAL.captures(source) else {
        return Ok(None);
    };
    let name = caps.get(1).map_or("", |m| m.as_str()).to_string();
    let contents = caps.get(2).map_or("", |m| m.as_str());

    let values = serde_json::from_str::<Vec<f64>>(&format!("[{}]", contents)).map_err(|err| {
        InitError::InvalidLiteral {
            name: name.clone(),
            reason: err.to_string(),
        }
    })?;

    Ok(Some(DetectedArray { name, values }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_first_literal() {
        let src = "const list = [9, 7, 5];\nconst other = [1];";
        let found = detect_array(src).unwrap().unwrap();
        assert_eq!(found.name, "list");
        assert_eq!(found.values, vec![9.0, 7.0, 5.0]);
    }

    #[test]
    fn test_accepts_floats_negatives_and_empty() {
        let found = detect_array("const a = [-1.5, 2e3, 0]").unwrap().unwrap();
        assert_eq!(found.values, vec![-1.5, 2000.0, 0.0]);
        let empty = detect_array("const e = []").unwrap().unwrap();
        assert!(empty.values.is_empty());
    }

    #[test]
    fn test_missing_literal() {
        assert_eq!(detect_array("let a = [1, 2];").unwrap(), None);
        assert_eq!(detect_array("log('hi')").unwrap(), None);
    }

    #[test]
    fn test_malformed_literals_are_errors() {
        for src in ["const x = [1,2,]", "const x = [1,,2]", "const x = ['a']", "const x = [n]"] {
            let err = detect_array(src).unwrap_err();
            assert!(!err.to_string().is_empty());
            assert!(matches!(err, InitError::InvalidLiteral { ref name, .. } if name == "x"));
        }
    }

    #[test]
    fn test_multiline_literal_is_not_matched() {
        assert_eq!(detect_array("const a = [\n1, 2\n]").unwrap(), None);
    }
}
