//! tagstream core
//!
//! Incremental markup rendering for streamed responses. Text arrives as
//! arbitrary fragments, optionally framed as Server-Sent Events, and is
//! rendered into an element tree as it arrives, with tag boundaries
//! reconstructed across fragments and a fixed denylist of tags suppressed.
//!
//! # Architecture
//!
//! - **decode.rs** - UTF-8 decoding with carry across fragments
//! - **sse.rs** - Event demultiplexing (SSE or plain text)
//! - **hooks.rs** - Transforms, tag-added and completion callbacks
//! - **tokenizer.rs** - Incremental tokenizer, emits [`Event`]s
//! - **tree.rs** - [`RenderTarget`], [`TreeBuilder`] and the arena [`Document`]
//! - **session.rs** - The driving loop over an async byte source
//! - **tags.rs** - Denylisted and self-closing tag sets
//!
//! Rendering in-memory text needs no runtime:
//!
//! ```
//! use tagstream_core::Document;
//!
//! let doc = Document::render_chunks(["<pre onclick=\"x\">A", "</pre><script>bad</script>good"]);
//! assert_eq!(doc.to_html(), "<pre>A</pre>good");
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod event;
pub mod hooks;
pub mod session;
pub mod sse;
pub mod tags;
pub mod tokenizer;
pub mod tree;

pub use config::{Framing, SessionConfig};
pub use decode::Utf8Decoder;
pub use error::{BoxError, Error, Result, TransformStage};
pub use event::Event;
pub use hooks::Hooks;
pub use session::{Outcome, Session};
pub use sse::{Demultiplexer, EventRecord};
pub use tags::{is_blocked, is_void};
pub use tokenizer::Tokenizer;
pub use tree::{Document, ElementView, Node, NodeId, NodeKind, RenderTarget, TreeBuilder};
