//! Debug positions attached to foreign instructions and method bodies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source range recorded by the front end for one instruction or a whole body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Line number (1-indexed)
    pub first_line: u32,
    /// Column (1-indexed)
    pub first_column: u32,
    /// Line number (1-indexed)
    pub last_line: u32,
    /// Column (1-indexed)
    pub last_column: u32,
}

impl SourcePosition {
    /// Create a new position
    pub fn new(first_line: u32, first_column: u32, last_line: u32, last_column: u32) -> Self {
        Self {
            first_line,
            first_column,
            last_line,
            last_column,
        }
    }

    /// Position covering a single line
    pub fn line(line: u32) -> Self {
        Self::new(line, 0, line, 0)
    }

    /// Merge two positions into one that covers both
    pub fn merge(&self, other: &SourcePosition) -> SourcePosition {
        let (first_line, first_column) = (self.first_line, self.first_column)
            .min((other.first_line, other.first_column));
        let (last_line, last_column) =
            (self.last_line, self.last_column).max((other.last_line, other.last_column));
        SourcePosition {
            first_line,
            first_column,
            last_line,
            last_column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.first_line, self.first_column, self.last_line, self.last_column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_covers_both() {
        let a = SourcePosition::new(3, 5, 3, 20);
        let b = SourcePosition::new(2, 9, 4, 1);
        let merged = a.merge(&b);
        assert_eq!(merged, SourcePosition::new(2, 9, 4, 1));
        assert_eq!(b.merge(&a), merged);
    }

    #[test]
    fn test_display() {
        assert_eq!(SourcePosition::new(1, 2, 3, 4).to_string(), "1:2-3:4");
    }
}
