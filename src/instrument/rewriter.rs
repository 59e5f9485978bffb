//! Counted-loop instrumentation
//!
//! Rewrites loops of the exact shape
//!
//! ```text
//! for (let i = 0; i < arr.length; i++) { body }
//! ```
//!
//! so that every iteration highlights `i`, pauses, runs the original body and
//! finally publishes the array:
//!
//! ```text
//! for (let i = 0; i < arr.length; i++) {
//!     await highlightElement(i);
//!     await delay(500);
//! body
//!     await updateArrayData(arr);
//! }
//! ```
//!
//! This is a textual transform, not a parse: anything that does not match the
//! pattern (a `var` header, a non-zero start, a bound other than `.length`)
//! passes through byte-for-byte.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Loop header up to and including the opening brace. The iterator is captured
/// three times; all three must name the same variable.
static LOOP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"for\s*\(\s*let\s+(\w+)\s*=\s*0\s*;\s*(\w+)\s*<\s*(\w+)\.length\s*;\s*(\w+)\+\+\s*\)\s*\{")
        .expect("loop header pattern is valid")
});

/// A recognized loop: byte offsets into the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopMatch<'a> {
    pub iterator: &'a str,
    pub array: &'a str,
    /// Start of the `for` keyword
    pub start: usize,
    /// Body text between the braces
    pub body: &'a str,
    /// One past the closing brace
    pub end: usize,
}

/// Find the next instrumentable loop at or after `from`
pub fn find_loop(source: &str, from: usize) -> Option<LoopMatch<'_>> {
    let mut search_from = from;

    while let Some(caps) = LOOP_HEADER.captures_at(source, search_from) {
        let header = caps.get(0)?;
        let iterator = caps.get(1)?.as_str();
        let same_iterator = [2, 4]
            .iter()
            .all(|&i| caps.get(i).is_some_and(|m| m.as_str() == iterator));

        if same_iterator {
            if let Some(close) = find_closing_brace(source, header.end()) {
                return Some(LoopMatch {
                    iterator,
                    array: caps.get(3)?.as_str(),
                    start: header.start(),
                    body: &source[header.end()..close],
                    end: close + 1,
                });
            }
        }

        // Headers start with the ASCII `for`, so +1 stays on a char boundary
        search_from = header.start() + 1;
    }
    None
}

/// Instrument every outermost matching loop in `source`. Loops nested in a
/// rewritten body are copied as-is. `pause_ms` is the value passed to the
/// injected `delay`.
pub fn instrument(source: &str, pause_ms: u64) -> String {
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    let mut rewritten = 0;

    while let Some(found) = find_loop(source, copied) {
        out.push_str(&source[copied..found.start]);
        out.push_str(&render_loop(&found, found.body, pause_ms));
        copied = found.end;
        rewritten += 1;
    }
    out.push_str(&source[copied..]);

    if rewritten > 0 {
        debug!(loops = rewritten, "instrumented counted loops");
    }
    out
}

fn render_loop(found: &LoopMatch<'_>, body: &str, pause_ms: u64) -> String {
    let i = found.iterator;
    let arr = found.array;
    format!(
        "for (let {i} = 0; {i} < {arr}.length; {i}++) {{\n    \
         await highlightElement({i});\n    \
         await delay({pause_ms});\n\
         {body}\n    \
         await updateArrayData({arr});\n}}"
    )
}

/// Index of the `}` closing a block whose body starts at `from`.
/// String, template and comment contents are skipped.
fn find_closing_brace(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 1usize;
    let mut i = from;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_single_loop_in_order() {
        let src = "for (let i = 0; i < list.length; i++) { total += list[i]; }";
        let out = instrument(src, 500);

        let positions: Vec<usize> = [
            "await highlightElement(i);",
            "await delay(500);",
            "total += list[i];",
            "await updateArrayData(list);",
        ]
        .iter()
        .map(|needle| out.find(needle).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", out);
        assert!(out.starts_with("for (let i = 0; i < list.length; i++) {"));
        assert!(out.ends_with('}'));
    }

    #[test]
    fn test_tolerates_header_whitespace() {
        let src = "for(let k=0;k<xs.length;k++){x(k)}";
        let out = instrument(src, 10);
        assert!(out.contains("await highlightElement(k);"));
        assert!(out.contains("await delay(10);"));
        assert!(out.contains("await updateArrayData(xs);"));
    }

    #[test]
    fn test_non_matching_loops_pass_through() {
        for src in [
            "for (var i = 0; i < a.length; i++) { f(i); }",
            "for (let i = 1; i < a.length; i++) { f(i); }",
            "for (let i = 0; i < n; i++) { f(i); }",
            "for (let i = 0; j < a.length; i++) { f(i); }",
            "while (i < a.length) { i++; }",
        ] {
            assert_eq!(instrument(src, 500), src);
        }
    }

    #[test]
    fn test_unbalanced_body_is_left_alone() {
        let src = "for (let i = 0; i < a.length; i++) { if (x) { f(i); }";
        assert_eq!(instrument(src, 500), src);
    }

    #[test]
    fn test_body_with_nested_braces_and_strings() {
        let src = "for (let i = 0; i < a.length; i++) { if (a[i] > 0) { log(\"}\"); } // }\n}";
        let found = find_loop(src, 0).unwrap();
        assert_eq!(found.end, src.len());
        assert!(found.body.contains("log(\"}\");"));
    }

    #[test]
    fn test_nested_loop_is_left_untouched() {
        let inner = "for (let j = 0; j < a.length; j++) { s(i, j); }";
        let src = format!("for (let i = 0; i < a.length; i++) {{\n  {}\n}}", inner);
        let out = instrument(&src, 500);
        assert!(out.contains("await highlightElement(i);"));
        assert!(!out.contains("await highlightElement(j);"));
        assert_eq!(out.matches("await updateArrayData(a);").count(), 1);
        assert!(out.contains(inner));
    }

    #[test]
    fn test_surrounding_text_is_preserved() {
        let src = "const a = [1];\nfor (let i = 0; i < a.length; i++) { f(i); }\nlog('done');";
        let out = instrument(src, 500);
        assert!(out.starts_with("const a = [1];\n"));
        assert!(out.ends_with("\nlog('done');"));
    }
}
