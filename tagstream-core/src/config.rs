//! Session configuration.

/// How SSE framing is recognized in the decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Detect framing once at the start of the stream and reassemble SSE
    /// records split across fragments. A fragment starting with `event:`
    /// or `data:` after an unterminated line ends the pending record.
    #[default]
    Persistent,

    /// Inspect each fragment on its own: a fragment starting with `event:`
    /// or `data:` is parsed as complete SSE records, anything else is one
    /// plain message. Records split across fragments are not recognized.
    PerFragment,
}

/// Options for a [`Session`](crate::Session).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// SSE framing mode.
    pub framing: Framing,
}

impl SessionConfig {
    /// Default configuration: persistent framing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the framing mode.
    pub fn framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }
}
