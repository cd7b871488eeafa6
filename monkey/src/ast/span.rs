//! Source location tracking

use serde::Serialize;

/// A byte range in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`, used for the end-of-input marker
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_point_is_zero_width() {
        assert_eq!(Span::point(7), Span::new(7, 7));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(42, 99).to_string(), "42..99");
    }

    #[test]
    fn test_span_into_range() {
        let range: std::ops::Range<usize> = Span::new(5, 15).into();
        assert_eq!(range, 5..15);
    }
}
