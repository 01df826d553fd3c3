//! Incremental markup tokenizer.
//!
//! Input arrives as arbitrary text fragments; tag boundaries may be split
//! anywhere. The tokenizer carries two pieces of state between calls:
//!
//! - the **partial tag**: everything after an unmatched `<`, kept until the
//!   matching `>` arrives in a later fragment
//! - the **text buffer**: plain characters not yet flushed
//!
//! Text is flushed (emitted as [`Event::Text`]) at every space, before
//! every tag, and at end of input. Output is independent of how the input
//! was chunked.
//!
//! # Suppression
//!
//! An opening denylisted tag sets a single blocked flag and any other tag
//! clears it. Neither form creates or pops a node. While blocked, flushes
//! drop their text.
//!
//! The closing form of a denylisted tag clears the flag rather than setting
//! it again. If it set the flag, nothing after `</script>` could render;
//! clearing it is what makes `<script>bad</script>good` render `good`. The
//! flag is a boolean, not a depth: `<script><p></script>x` renders `x`
//! inside the `p`.
//!
//! ```
//! use tagstream_core::{Event, Tokenizer};
//!
//! let mut events = Vec::new();
//! let mut tokenizer = Tokenizer::new();
//! for chunk in ["<p", ">Hi<", "/p>"] {
//!     tokenizer.feed(chunk, |e| events.push(format!("{:?}", e)));
//! }
//! tokenizer.finish(|e| events.push(format!("{:?}", e)));
//! assert_eq!(events.len(), 3);
//! ```

use memchr::{memchr, memchr2};

use crate::event::Event;
use crate::tags;

/// Streaming tokenizer state.
#[derive(Debug, Default)]
pub struct Tokenizer {
    /// Characters accumulated since the last flush point.
    text: String,
    /// Content after an unmatched `<`; `Some` while waiting for `>`.
    partial: Option<String>,
    /// Set by an opening denylisted tag, cleared by any other tag.
    blocked: bool,
    /// Scratch buffer for the lower-cased tag name.
    name: String,
}

impl Tokenizer {
    /// Create a tokenizer with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize one fragment, emitting events as they are recognized.
    ///
    /// Carried state from previous calls logically precedes `input`.
    pub fn feed<F>(&mut self, input: &str, mut emit: F)
    where
        F: FnMut(Event<'_>),
    {
        let bytes = input.as_bytes();
        let mut pos = 0;

        if let Some(mut partial) = self.partial.take() {
            match memchr(b'>', bytes) {
                Some(end) => {
                    partial.push_str(&input[..end]);
                    self.resolve(&partial, &mut emit);
                    pos = end + 1;
                }
                None => {
                    partial.push_str(input);
                    self.partial = Some(partial);
                    return;
                }
            }
        }

        while pos < bytes.len() {
            let Some(offset) = memchr2(b'<', b' ', &bytes[pos..]) else {
                self.text.push_str(&input[pos..]);
                break;
            };
            let at = pos + offset;
            self.text.push_str(&input[pos..at]);

            if bytes[at] == b' ' {
                self.text.push(' ');
                self.flush(&mut emit);
                pos = at + 1;
                continue;
            }

            self.flush(&mut emit);
            match memchr(b'>', &bytes[at + 1..]) {
                Some(len) => {
                    let end = at + 1 + len;
                    self.resolve(&input[at + 1..end], &mut emit);
                    pos = end + 1;
                }
                None => {
                    self.partial = Some(input[at + 1..].to_owned());
                    return;
                }
            }
        }
    }

    /// Signal end of input.
    ///
    /// An unterminated partial tag is discarded; any buffered text is
    /// flushed once.
    pub fn finish<F>(&mut self, mut emit: F)
    where
        F: FnMut(Event<'_>),
    {
        if let Some(partial) = self.partial.take() {
            tracing::trace!(len = partial.len(), "discarding unterminated tag at end of input");
        }
        self.flush(&mut emit);
    }

    /// Drop all carried state without emitting anything.
    pub fn reset(&mut self) {
        self.text.clear();
        self.partial = None;
        self.blocked = false;
    }

    /// Whether text is currently being suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Content of the pending unterminated tag, if any.
    pub fn partial_tag(&self) -> Option<&str> {
        self.partial.as_deref()
    }

    /// Text accumulated since the last flush point.
    pub fn buffered_text(&self) -> &str {
        &self.text
    }

    fn flush<F>(&mut self, emit: &mut F)
    where
        F: FnMut(Event<'_>),
    {
        if self.partial.is_some() {
            return;
        }
        if !self.blocked && !self.text.is_empty() {
            emit(Event::Text { content: &self.text });
        }
        self.text.clear();
    }

    /// Resolve raw tag content (between `<` and `>`).
    fn resolve<F>(&mut self, content: &str, emit: &mut F)
    where
        F: FnMut(Event<'_>),
    {
        let raw = match content.find(' ') {
            Some(i) => &content[..i],
            None => content,
        };
        let (closing, bare) = match raw.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_suffix('/').unwrap_or(raw)),
        };

        // `<>`, `< b>` and `</>` name nothing; keep them as literal text.
        if bare.is_empty() {
            self.text.push('<');
            self.text.push_str(content);
            self.text.push('>');
            return;
        }

        self.name.clear();
        self.name.extend(bare.chars().flat_map(char::to_lowercase));

        if tags::is_blocked(&self.name) {
            self.blocked = !closing;
            return;
        }
        self.blocked = false;

        if closing {
            emit(Event::EndTag { name: &self.name });
        } else {
            emit(Event::StartTag { name: &self.name });
        }
    }
}
