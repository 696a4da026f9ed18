//! Pull-based input sources.
//!
//! The engine never assumes the whole document is resident in memory. Text
//! is pulled chunk by chunk through the [`Input`] trait, and the lexer may
//! reposition the source at any character/byte pair, for instance to resume
//! lexing just before an edited region.

use crate::error::InputError;

/// A pull-based source of document text.
///
/// `read` returns the next chunk of text after the current position; an
/// empty chunk signals end of input. `seek` repositions the source so the
/// next `read` starts at the given coordinates. Both offsets describe the
/// same location; adapters backed by byte storage will typically use
/// `bytes`, character-addressed ones `chars`.
///
/// Implementations must be synchronous: the engine calls them from within
/// `parse` on the calling thread.
pub trait Input {
    /// Returns the next chunk of text, or an empty string at end of input.
    fn read(&mut self) -> Result<&str, InputError>;

    /// Repositions the source. Fails (with [`InputError::Seek`]) if the
    /// coordinates cannot be honored, e.g. a byte offset that is not a
    /// character boundary; the engine aborts the parse in that case.
    fn seek(&mut self, chars: usize, bytes: usize) -> Result<(), InputError>;
}

/// An [`Input`] over an in-memory string.
///
/// By default the remaining text is handed out as one chunk. A maximum
/// chunk size (in bytes, rounded down to a character boundary) can be set
/// to exercise chunked reading.
#[derive(Debug, Clone)]
pub struct StringInput {
    text: String,
    byte_pos: usize,
    chunk_size: Option<usize>,
}

impl StringInput {
    /// Creates an input over the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            byte_pos: 0,
            chunk_size: None,
        }
    }

    /// Limits each `read` to at most `bytes` bytes.
    #[must_use]
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = Some(bytes.max(1));
        self
    }

    /// The full text backing this input.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Input for StringInput {
    fn read(&mut self) -> Result<&str, InputError> {
        let rest = &self.text[self.byte_pos..];
        let chunk = match self.chunk_size {
            Some(limit) if limit < rest.len() => {
                let mut end = limit;
                while !rest.is_char_boundary(end) {
                    end -= 1;
                }
                &rest[..end]
            }
            _ => rest,
        };
        self.byte_pos += chunk.len();
        Ok(chunk)
    }

    fn seek(&mut self, chars: usize, bytes: usize) -> Result<(), InputError> {
        if bytes > self.text.len() || !self.text.is_char_boundary(bytes) {
            return Err(InputError::Seek { chars, bytes });
        }
        self.byte_pos = bytes;
        Ok(())
    }
}
