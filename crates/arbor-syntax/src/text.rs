//! Positional bookkeeping in three coordinate systems.
//!
//! Every span in a document is measured three ways at once: in bytes, in
//! characters, and as a row/column [`Point`]. The tree stores only relative
//! [`Extent`]s, so subtrees can be shared between revisions without any
//! position fix-up; absolute positions fall out of summing extents while
//! walking down from the root.

use std::ops::{Add, AddAssign};

/// A row/column position. Rows and columns are zero-based; the column is
/// measured in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    /// Zero-based line number.
    pub row: usize,
    /// Zero-based character offset within the line.
    pub column: usize,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl Add for Point {
    type Output = Point;

    /// Composes two relative points. If the right-hand side spans at least
    /// one newline its column starts over; otherwise columns accumulate.
    fn add(self, rhs: Point) -> Point {
        if rhs.row > 0 {
            Point::new(self.row + rhs.row, rhs.column)
        } else {
            Point::new(self.row, self.column + rhs.column)
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// A length of text measured in all three coordinate systems.
///
/// An absolute position is an `Extent` from the start of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Extent {
    pub(crate) bytes: usize,
    pub(crate) chars: usize,
    pub(crate) point: Point,
}

impl Extent {
    pub(crate) const ZERO: Extent = Extent {
        bytes: 0,
        chars: 0,
        point: Point { row: 0, column: 0 },
    };

    /// The extent of a single character.
    pub(crate) fn of_char(c: char) -> Extent {
        let point = if c == '\n' {
            Point::new(1, 0)
        } else {
            Point::new(0, 1)
        };
        Extent {
            bytes: c.len_utf8(),
            chars: 1,
            point,
        }
    }

    pub(crate) fn is_zero(self) -> bool {
        self.chars == 0 && self.bytes == 0
    }
}

impl Add for Extent {
    type Output = Extent;

    fn add(self, rhs: Extent) -> Extent {
        Extent {
            bytes: self.bytes + rhs.bytes,
            chars: self.chars + rhs.chars,
            point: self.point + rhs.point,
        }
    }
}

impl AddAssign for Extent {
    fn add_assign(&mut self, rhs: Extent) {
        *self = *self + rhs;
    }
}
