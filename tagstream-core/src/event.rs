//! Tokenizer events - the seam between the tokenizer and the tree builder.
//!
//! SAX-style: events are emitted as soon as a tag boundary or a text flush
//! point is recognized, with no accumulation. The tokenizer has already
//! applied denylist suppression, so a consumer only ever sees content that
//! may be rendered.
//!
//! ## Event Sequences
//!
//! `<p>Hello world</p>` emits:
//! ```text
//! StartTag { name: "p" }
//! Text { content: "Hello " }
//! Text { content: "world" }
//! EndTag { name: "p" }
//! ```

/// Tokenizer events.
///
/// The lifetime `'a` borrows from the tokenizer's internal buffers; events
/// are only valid for the duration of the callback that receives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// Opening tag, lower-cased, attributes discarded: `<pre class="x">`
    StartTag { name: &'a str },

    /// Closing tag, lower-cased, without the leading `/`: `</pre>`
    EndTag { name: &'a str },

    /// A run of text ending at a space, a tag, or end of input.
    Text { content: &'a str },
}
