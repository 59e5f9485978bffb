//! Line-based text buffer behind the source pane's insert mode

/// Editable source text with a (line, column) cursor; columns count chars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorBuffer {
    lines: Vec<String>,
    line: usize,
    column: usize,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        EditorBuffer {
            lines: vec![String::new()],
            line: 0,
            column: 0,
        }
    }
}

impl EditorBuffer {
    pub fn new(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        EditorBuffer {
            lines,
            line: 0,
            column: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Cursor as (line, column), both zero-based
    pub fn cursor(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.newline();
            return;
        }
        let at = self.byte_offset();
        self.lines[self.line].insert(at, c);
        self.column += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    pub fn newline(&mut self) {
        let at = self.byte_offset();
        let rest = self.lines[self.line].split_off(at);
        self.lines.insert(self.line + 1, rest);
        self.line += 1;
        self.column = 0;
    }

    /// Delete the char before the cursor, joining lines at column 0
    pub fn backspace(&mut self) {
        if self.column > 0 {
            self.column -= 1;
            let at = self.byte_offset();
            self.lines[self.line].remove(at);
        } else if self.line > 0 {
            let current = self.lines.remove(self.line);
            self.line -= 1;
            self.column = self.line_len(self.line);
            self.lines[self.line].push_str(&current);
        }
    }

    /// Delete the char under the cursor, joining the next line at the end
    pub fn delete(&mut self) {
        if self.column < self.line_len(self.line) {
            let at = self.byte_offset();
            self.lines[self.line].remove(at);
        } else if self.line + 1 < self.lines.len() {
            let next = self.lines.remove(self.line + 1);
            self.lines[self.line].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.column > 0 {
            self.column -= 1;
        } else if self.line > 0 {
            self.line -= 1;
            self.column = self.line_len(self.line);
        }
    }

    pub fn move_right(&mut self) {
        if self.column < self.line_len(self.line) {
            self.column += 1;
        } else if self.line + 1 < self.lines.len() {
            self.line += 1;
            self.column = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.line > 0 {
            self.line -= 1;
            self.column = self.column.min(self.line_len(self.line));
        }
    }

    pub fn move_down(&mut self) {
        if self.line + 1 < self.lines.len() {
            self.line += 1;
            self.column = self.column.min(self.line_len(self.line));
        }
    }

    pub fn home(&mut self) {
        self.column = 0;
    }

    pub fn end(&mut self) {
        self.column = self.line_len(self.line);
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines[line].chars().count()
    }

    fn byte_offset(&self) -> usize {
        let line = &self.lines[self.line];
        line.char_indices()
            .nth(self.column)
            .map_or(line.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_newline() {
        let mut buffer = EditorBuffer::default();
        buffer.insert_str("const a = [1];\nlog(a)");
        assert_eq!(buffer.text(), "const a = [1];\nlog(a)");
        assert_eq!(buffer.cursor(), (1, 6));
    }

    #[test]
    fn test_newline_splits_line() {
        let mut buffer = EditorBuffer::new("abcd");
        buffer.move_right();
        buffer.move_right();
        buffer.newline();
        assert_eq!(buffer.lines(), &["ab".to_string(), "cd".to_string()]);
        assert_eq!(buffer.cursor(), (1, 0));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buffer = EditorBuffer::new("ab\ncd");
        buffer.move_down();
        buffer.backspace();
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(buffer.cursor(), (0, 2));

        buffer.backspace();
        assert_eq!(buffer.text(), "acd");
        buffer.home();
        buffer.backspace();
        assert_eq!(buffer.text(), "acd");
    }

    #[test]
    fn test_delete_joins_next_line() {
        let mut buffer = EditorBuffer::new("a\nb");
        buffer.end();
        buffer.delete();
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn test_multibyte_chars() {
        let mut buffer = EditorBuffer::new("é");
        buffer.end();
        buffer.insert_char('x');
        buffer.move_left();
        buffer.backspace();
        assert_eq!(buffer.text(), "x");
    }

    #[test]
    fn test_vertical_moves_clamp_column() {
        let mut buffer = EditorBuffer::new("long line\nab");
        buffer.end();
        buffer.move_down();
        assert_eq!(buffer.cursor(), (1, 2));
        buffer.move_up();
        assert_eq!(buffer.cursor(), (0, 2));
    }
}
