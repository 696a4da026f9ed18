//! Edit records and the invalidation tracker.
//!
//! Edits accumulate between parses; nothing touches the tree when one is
//! recorded. Before the next parse the log is composed into a
//! [`ChangeSet`]: disjoint pairs of an *old* range (coordinates of the
//! previous tree) and the *new* range that replaced it. The parser uses
//! the set to map positions between the two documents and to test whether
//! a span of the previous tree was touched.

/// One text mutation, in character coordinates relative to the document at
/// the moment the edit was made. Later edits in the same log are
/// interpreted against the already-edited text, matching how a consumer
/// applies them to a live buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEdit {
    /// Character offset the mutation starts at.
    pub position: usize,
    /// Characters deleted at `position`.
    pub chars_removed: usize,
    /// Characters inserted at `position`.
    pub chars_inserted: usize,
}

/// A replaced region: `old_start..old_end` in the previous document became
/// `new_start..new_end` in the current one. Regions are disjoint and
/// sorted in both coordinate systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Change {
    old_start: usize,
    old_end: usize,
    new_start: usize,
    new_end: usize,
}

/// The composed edit log.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub(crate) fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.changes.clear();
    }

    /// Folds one more edit into the set. The edit's coordinates refer to
    /// the document produced by all previously recorded edits.
    pub(crate) fn record(&mut self, edit: InputEdit) {
        let removed_end = edit.position + edit.chars_removed;
        let delta = edit.chars_inserted as isize - edit.chars_removed as isize;

        let mut result = Vec::with_capacity(self.changes.len() + 1);
        let mut iter = self.changes.iter().copied().peekable();

        // Untouched changes strictly before the edit; track how far their
        // new coordinates have drifted from the old ones.
        let mut drift = 0isize;
        while let Some(&c) = iter.peek() {
            if c.new_end >= edit.position {
                break;
            }
            drift = c.new_end as isize - c.old_end as isize;
            result.push(c);
            iter.next();
        }
        let to_old = |pos: usize| (pos as isize - drift).unsigned_abs();

        // Changes whose new range overlaps or touches the edited range
        // merge with it into a single region.
        let mut merged: Option<Change> = None;
        while let Some(&c) = iter.peek() {
            if c.new_start > removed_end {
                break;
            }
            let m = merged.get_or_insert(Change {
                old_start: if edit.position < c.new_start {
                    to_old(edit.position)
                } else {
                    c.old_start
                },
                old_end: 0,
                new_start: edit.position.min(c.new_start),
                new_end: 0,
            });
            m.old_end = if removed_end > c.new_end {
                c.old_end + (removed_end - c.new_end)
            } else {
                c.old_end
            };
            m.new_end = removed_end.max(c.new_end);
            iter.next();
        }
        let merged = merged.unwrap_or(Change {
            old_start: to_old(edit.position),
            old_end: to_old(removed_end),
            new_start: edit.position,
            new_end: removed_end,
        });
        let merged = Change {
            new_end: (merged.new_end as isize + delta).unsigned_abs(),
            ..merged
        };
        // A region that nets out to nothing on both sides is dropped.
        if merged.old_start != merged.old_end || merged.new_start != merged.new_end {
            result.push(merged);
        }

        // Later changes shift by the edit's net length delta.
        for c in iter {
            result.push(Change {
                new_start: (c.new_start as isize + delta).unsigned_abs(),
                new_end: (c.new_end as isize + delta).unsigned_abs(),
                ..c
            });
        }

        self.changes = result;
    }

    /// Maps a character position in the current document back to the
    /// previous one. Positions inside a changed region have no old
    /// counterpart and return `None`.
    pub(crate) fn map_new_to_old(&self, pos: usize) -> Option<usize> {
        let mut delta = 0isize;
        for c in &self.changes {
            if pos < c.new_start {
                break;
            }
            if pos < c.new_end {
                return None;
            }
            delta = c.old_end as isize - c.new_end as isize;
        }
        Some((pos as isize + delta).unsigned_abs())
    }

    /// Whether any changed region touches `start..end` in old-document
    /// coordinates. A pure insertion (zero-width old range) touches the
    /// span only when it falls strictly inside it: an insertion exactly at
    /// a span's boundary belongs to the neighbor that re-lexes it.
    pub(crate) fn intersects_old(&self, start: usize, end: usize) -> bool {
        self.changes.iter().any(|c| {
            if c.old_start == c.old_end {
                start < c.old_start && c.old_start < end
            } else {
                c.old_start < end && c.old_end > start
            }
        })
    }
}
