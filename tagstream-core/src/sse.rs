//! Event demultiplexing: splitting decoded text into event records.
//!
//! A stream is either SSE-framed or plain. SSE framing is recognized when
//! the text starts with `event:` or `data:`:
//!
//! ```text
//! event: completion
//! data: {"completion": "<p>Hello</p>"}
//!
//! event: error
//! data: {"message": "Rate limit exceeded"}
//! ```
//!
//! Records are separated by a blank line. Within a record, `event:` sets
//! the type (default `message`), the first `data:` line sets the payload,
//! values are trimmed, and any other line is ignored. A record without
//! data is dropped. Plain text becomes one `message` record per fragment.
//!
//! How much of the stream is inspected at once depends on [`Framing`].
//! With persistent framing a record may be split anywhere across
//! fragments. When the previous fragment left a line unterminated and the
//! next fragment starts with `event:` or `data:`, the fragment boundary
//! ends both the line and the record, so streams that send one
//! unterminated record per fragment parse the same way in both modes.

use memchr::memchr;

use crate::config::Framing;

/// Default event type for records without an `event:` line.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// Event type that routes a record to the error path.
pub const ERROR_EVENT_TYPE: &str = "error";

/// One demultiplexed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub event_type: String,
    pub data: String,
}

impl EventRecord {
    /// A `message` record.
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event_type: DEFAULT_EVENT_TYPE.to_owned(),
            data: data.into(),
        }
    }

    /// A record of a given type.
    pub fn new(event_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: data.into(),
        }
    }

    /// Check if this record reports a stream error.
    pub fn is_error(&self) -> bool {
        self.event_type == ERROR_EVENT_TYPE
    }
}

/// Check if text starts with an SSE field this module recognizes.
pub fn is_sse_framed(text: &str) -> bool {
    text.starts_with("event:") || text.starts_with("data:")
}

/// Parse one fragment in isolation.
///
/// Used by [`Framing::PerFragment`]: an SSE-framed fragment is split into
/// its complete records, anything else is a single `message` record.
/// `\n` and `\r\n` line endings are both accepted.
pub fn parse_fragment(fragment: &str) -> Vec<EventRecord> {
    if !is_sse_framed(fragment) {
        return vec![EventRecord::message(fragment)];
    }

    let normalized = fragment.replace("\r\n", "\n");
    let mut records = Vec::new();
    for block in normalized.split("\n\n") {
        let mut record = RecordBuilder::default();
        for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
            record.field(line);
        }
        records.extend(record.take());
    }
    records
}

/// Fields collected for the record being assembled.
#[derive(Debug, Default)]
struct RecordBuilder {
    event_type: Option<String>,
    data: Option<String>,
}

impl RecordBuilder {
    /// Apply one trimmed, non-empty line.
    fn field(&mut self, line: &str) {
        if let Some(value) = line.strip_prefix("event:") {
            self.event_type = Some(value.trim().to_owned());
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.trim();
            if self.data.is_none() && !value.is_empty() {
                self.data = Some(value.to_owned());
            }
        }
    }

    fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Finish the record only if it already carries data.
    fn take_if_data(&mut self) -> Option<EventRecord> {
        if self.has_data() {
            self.take()
        } else {
            None
        }
    }

    /// Finish the record, resetting the builder. Records without data are
    /// dropped.
    fn take(&mut self) -> Option<EventRecord> {
        let event_type = self.event_type.take();
        let data = self.data.take()?;
        Some(EventRecord {
            event_type: event_type.unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_owned()),
            data,
        })
    }
}

/// Detected stream mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Not enough text seen to tell.
    Undetected,
    Sse,
    Plain,
}

/// Stateful demultiplexer for one stream.
#[derive(Debug)]
pub struct Demultiplexer {
    framing: Framing,
    mode: Mode,
    /// Fragments held while the mode is undetected, one entry each.
    held: Vec<String>,
    /// Incomplete SSE line.
    buffer: String,
    record: RecordBuilder,
}

impl Demultiplexer {
    /// Create a demultiplexer for the given framing mode.
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            mode: Mode::Undetected,
            held: Vec::new(),
            buffer: String::new(),
            record: RecordBuilder::default(),
        }
    }

    /// Whether the stream has been recognized as SSE. `None` until enough
    /// text has arrived to decide (always `None` for per-fragment framing).
    pub fn is_sse(&self) -> Option<bool> {
        match self.mode {
            Mode::Undetected => None,
            Mode::Sse => Some(true),
            Mode::Plain => Some(false),
        }
    }

    /// Split one decoded fragment into complete records.
    pub fn push(&mut self, fragment: &str) -> Vec<EventRecord> {
        if fragment.is_empty() {
            return Vec::new();
        }
        match self.framing {
            Framing::PerFragment => parse_fragment(fragment),
            Framing::Persistent => self.push_persistent(fragment),
        }
    }

    /// Flush whatever is pending at end of stream.
    pub fn finish(&mut self) -> Vec<EventRecord> {
        let mut records = Vec::new();
        match self.mode {
            Mode::Undetected => {
                records.extend(self.held.drain(..).map(EventRecord::message));
            }
            Mode::Plain => {}
            Mode::Sse => {
                let line = std::mem::take(&mut self.buffer);
                self.line(line.trim(), &mut records);
                records.extend(self.record.take());
            }
        }
        records
    }

    fn push_persistent(&mut self, fragment: &str) -> Vec<EventRecord> {
        let mut records = Vec::new();
        match self.mode {
            Mode::Plain => records.push(EventRecord::message(fragment)),
            Mode::Sse => self.push_sse(fragment, &mut records),
            Mode::Undetected => {
                self.held.push(fragment.to_owned());
                let seen = self.held.concat();
                if is_sse_framed(&seen) {
                    tracing::debug!("detected SSE framing");
                    self.mode = Mode::Sse;
                    self.held.clear();
                    self.push_sse(&seen, &mut records);
                } else if !could_become_sse(&seen) {
                    tracing::debug!(held = self.held.len(), "detected plain framing");
                    self.mode = Mode::Plain;
                    records.extend(self.held.drain(..).map(EventRecord::message));
                }
            }
        }
        records
    }

    fn push_sse(&mut self, fragment: &str, records: &mut Vec<EventRecord>) {
        // A fragment opening with a field name while a line is still
        // unterminated ends that line and the pending record.
        if !self.buffer.is_empty() && is_sse_framed(fragment) {
            let line = std::mem::take(&mut self.buffer);
            self.line(line.trim(), records);
            records.extend(self.record.take_if_data());
        }
        self.buffer.push_str(fragment);
        self.drain_lines(records);
    }

    /// Consume every complete line in the buffer.
    fn drain_lines(&mut self, records: &mut Vec<EventRecord>) {
        let mut start = 0;
        while let Some(offset) = memchr(b'\n', &self.buffer.as_bytes()[start..]) {
            let end = start + offset;
            let line = self.buffer[start..end].trim().to_owned();
            self.line(&line, records);
            start = end + 1;
        }
        self.buffer.drain(..start);
    }

    /// Apply one trimmed line to the pending record.
    fn line(&mut self, line: &str, records: &mut Vec<EventRecord>) {
        if line.is_empty() {
            records.extend(self.record.take());
            return;
        }
        // A new `event:` after data starts the next record even without
        // the separating blank line.
        if line.starts_with("event:") && self.record.has_data() {
            records.extend(self.record.take());
        }
        self.record.field(line);
    }
}

impl Default for Demultiplexer {
    fn default() -> Self {
        Self::new(Framing::default())
    }
}

/// Check if `text` is still a prefix of an SSE field name.
fn could_become_sse(text: &str) -> bool {
    "event:".starts_with(text) || "data:".starts_with(text)
}
