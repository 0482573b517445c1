/// Forward-only cursor over a line sequence with explicit lookahead.
///
/// The preprocessor passes consume one or two extra lines after a marker;
/// modelling that as `advance()` returning `None` at end of input lets the
/// callers turn a truncated file into a checked error instead of an index
/// panic.
pub struct LineCursor<'a, S: AsRef<str>> {
    lines: &'a [S],
    pos: usize,
}

impl<'a, S: AsRef<str>> LineCursor<'a, S> {
    pub fn new(lines: &'a [S]) -> Self {
        Self { lines, pos: 0 }
    }

    /// Consume the next line, returning its 1-based line number and content.
    pub fn advance(&mut self) -> Option<(usize, &'a str)> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some((self.pos, line.as_ref()))
    }

    /// Look at the next line without consuming it.
    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).map(|l| l.as_ref())
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// 1-based number of the last consumed line (0 before the first advance).
    pub fn line_number(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_line_numbers() {
        let lines = ["first", "second"];
        let mut cursor = LineCursor::new(&lines);

        assert_eq!(cursor.line_number(), 0);
        assert_eq!(cursor.advance(), Some((1, "first")));
        assert_eq!(cursor.advance(), Some((2, "second")));
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.line_number(), 2);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let lines = ["only"];
        let mut cursor = LineCursor::new(&lines);

        assert_eq!(cursor.peek(), Some("only"));
        assert_eq!(cursor.peek(), Some("only"));
        assert!(!cursor.is_exhausted());
        assert_eq!(cursor.advance(), Some((1, "only")));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn test_empty_input() {
        let lines: [&str; 0] = [];
        let mut cursor = LineCursor::new(&lines);
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.advance(), None);
    }
}
