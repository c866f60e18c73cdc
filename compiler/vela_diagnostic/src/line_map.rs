//! Offset-to-position mapping.
//!
//! Spans are byte offsets into the unit's source; diagnostics are located
//! by 1-based line and 1-based character column. The map is built once per
//! unit and answered by binary search over line-start offsets.

use vela_ast::Span;

/// Line-start table for one source text.
#[derive(Clone, Debug)]
pub struct LineMap {
    /// Byte offset of the first character of each line. Always starts
    /// with 0; a trailing newline opens one more (empty) line.
    line_starts: Vec<u32>,
    /// The source the offsets index into, kept for column counting.
    source: String,
}

impl LineMap {
    /// Build a map for `source`.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                #[allow(clippy::cast_possible_truncation)]
                line_starts.push(i as u32 + 1);
            }
        }
        LineMap {
            line_starts,
            source,
        }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: u32) -> u32 {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        #[allow(clippy::cast_possible_truncation)]
        {
            idx as u32 + 1
        }
    }

    /// 1-based character column of `offset` within its line.
    pub fn column(&self, offset: u32) -> u32 {
        let line_start = self.line_starts[(self.line(offset) - 1) as usize];
        let slice = &self.source[line_start as usize..offset as usize];
        #[allow(clippy::cast_possible_truncation)]
        {
            slice.chars().count() as u32 + 1
        }
    }

    /// Character length of `span`.
    pub fn span_length(&self, span: Span) -> u32 {
        let slice = &self.source[span.to_range()];
        #[allow(clippy::cast_possible_truncation)]
        {
            slice.chars().count() as u32
        }
    }

    /// (line, column) of the start of `span`.
    pub fn position(&self, span: Span) -> (u32, u32) {
        (self.line(span.start), self.column(span.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_and_columns_are_one_based() {
        let map = LineMap::new("ab\ncd\n");
        assert_eq!(map.position(Span::new(0, 1)), (1, 1));
        assert_eq!(map.position(Span::new(1, 2)), (1, 2));
        assert_eq!(map.position(Span::new(3, 4)), (2, 1));
        assert_eq!(map.position(Span::new(4, 5)), (2, 2));
    }

    #[test]
    fn offset_on_newline_belongs_to_its_line() {
        let map = LineMap::new("ab\ncd");
        assert_eq!(map.line(2), 1);
        assert_eq!(map.line(3), 2);
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        // "é" is two bytes.
        let map = LineMap::new("é x");
        assert_eq!(map.column(3), 3);
        assert_eq!(map.span_length(Span::new(0, 2)), 1);
    }

    #[test]
    fn empty_source_is_line_one() {
        let map = LineMap::new("");
        assert_eq!(map.position(Span::new(0, 0)), (1, 1));
    }
}
