//! The driving loop for one streamed response.
//!
//! A [`Session`] pulls byte fragments from a source, decodes them, splits
//! them into event records, routes each record through the transforms and
//! feeds the result to the tokenizer, which renders into the caller's tree.
//!
//! ```
//! use futures::executor::block_on;
//! use futures::stream;
//! use tagstream_core::{Document, Outcome, Session};
//!
//! let mut doc = Document::new();
//! let root = doc.root_id();
//! let chunks = ["<p>Hel", "lo</p>"].map(|s| Ok::<_, std::io::Error>(s.as_bytes()));
//!
//! let mut session = Session::new(stream::iter(chunks), &mut doc, root);
//! let outcome = block_on(session.run()).unwrap();
//! assert_eq!(outcome, Outcome::Completed);
//! assert_eq!(session.text(), "<p>Hello</p>");
//! drop(session);
//!
//! assert_eq!(doc.to_html(), "<p>Hello</p>");
//! ```

use std::future::Future;
use std::io;

use futures::{Stream, StreamExt};

use crate::config::SessionConfig;
use crate::decode::Utf8Decoder;
use crate::error::{BoxError, Error, Result};
use crate::hooks::{self, Hooks};
use crate::sse::{Demultiplexer, EventRecord};
use crate::tokenizer::Tokenizer;
use crate::tree::{RenderTarget, TreeBuilder};

/// How a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The source was exhausted; trailing text was flushed and completion
    /// callbacks ran.
    Completed,
    /// The cancel signal fired first. Nothing was flushed and completion
    /// callbacks did not run.
    Cancelled,
}

/// One streamed response rendering into a caller-owned tree.
///
/// Sessions are single-use: once [`run`](Session::run) returns, any
/// further run fails with [`Error::SessionFinished`].
pub struct Session<'a, S, R: RenderTarget> {
    source: S,
    decoder: Utf8Decoder,
    demux: Demultiplexer,
    tokenizer: Tokenizer,
    builder: TreeBuilder<R::Handle>,
    target: &'a mut R,
    hooks: Hooks<R>,
    output: Vec<String>,
    finished: bool,
}

impl<'a, S, B, R> Session<'a, S, R>
where
    S: Stream<Item = io::Result<B>> + Unpin,
    B: AsRef<[u8]>,
    R: RenderTarget,
{
    /// Create a session that renders under `root` in `target`.
    ///
    /// Nothing is read until the session is run.
    pub fn new(source: S, target: &'a mut R, root: R::Handle) -> Self {
        Session {
            source,
            decoder: Utf8Decoder::new(),
            demux: Demultiplexer::new(SessionConfig::default().framing),
            tokenizer: Tokenizer::new(),
            builder: TreeBuilder::new(root),
            target,
            hooks: Hooks::new(),
            output: Vec::new(),
            finished: false,
        }
    }

    /// Apply configuration. Call before running.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.demux = Demultiplexer::new(config.framing);
        self
    }

    /// Set the success transform. The last registration wins.
    pub fn on_success_event<F, E>(mut self, transform: F) -> Self
    where
        F: FnMut(String) -> std::result::Result<String, E> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.hooks.set_success(hooks::sync_transform(transform));
        self
    }

    /// Set an asynchronous success transform. The last registration wins.
    pub fn on_success_event_async<F, Fut, E>(mut self, transform: F) -> Self
    where
        F: FnMut(String) -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<String, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.hooks.set_success(hooks::async_transform(transform));
        self
    }

    /// Set the error transform, which turns an `error` record's data into
    /// the message of [`Error::Stream`]. The last registration wins.
    pub fn on_error_event<F, E>(mut self, transform: F) -> Self
    where
        F: FnMut(String) -> std::result::Result<String, E> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.hooks.set_error(hooks::sync_transform(transform));
        self
    }

    /// Set an asynchronous error transform. The last registration wins.
    pub fn on_error_event_async<F, Fut, E>(mut self, transform: F) -> Self
    where
        F: FnMut(String) -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<String, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.hooks.set_error(hooks::async_transform(transform));
        self
    }

    /// Register a callback run once with the output record at natural end
    /// of stream.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&[String]) + Send + 'static,
    {
        self.hooks.add_complete(Box::new(callback));
        self
    }

    /// Register a callback run with every element named `tag` as soon as
    /// it is attached. Names match case-insensitively.
    pub fn on_tag_added<F>(mut self, tag: &str, callback: F) -> Self
    where
        F: FnMut(&mut R, R::Handle) + Send + 'static,
    {
        self.hooks.add_tag_added(tag, Box::new(callback));
        self
    }

    /// Run until the source is exhausted or a record fails.
    pub async fn run(&mut self) -> Result<Outcome> {
        self.run_until(futures::future::pending::<()>()).await
    }

    /// Run until the source is exhausted, a record fails, or `cancel`
    /// resolves.
    ///
    /// Cancellation is checked before every read and interrupts a pending
    /// read or transform. It is silent: the result is
    /// `Ok(Outcome::Cancelled)`.
    pub async fn run_until<C>(&mut self, cancel: C) -> Result<Outcome>
    where
        C: Future<Output = ()>,
    {
        if self.finished {
            return Err(Error::SessionFinished);
        }
        self.finished = true;
        tracing::debug!("session started");

        tokio::pin!(cancel);
        loop {
            let step = tokio::select! {
                biased;
                () = &mut cancel => None,
                step = self.step() => Some(step),
            };
            match step {
                Some(Ok(true)) => {}
                Some(Ok(false)) => break,
                Some(Err(err)) => {
                    tracing::debug!(error = %err, "session failed");
                    self.tokenizer.reset();
                    self.hooks.release();
                    return Err(err);
                }
                None => {
                    tracing::debug!(records = self.output.len(), "session cancelled");
                    self.tokenizer.reset();
                    self.hooks.release();
                    return Ok(Outcome::Cancelled);
                }
            }
        }

        self.finish_tokens();
        tracing::debug!(records = self.output.len(), "session completed");
        self.hooks.complete(&self.output);
        Ok(Outcome::Completed)
    }

    /// Transformed success payloads, in arrival order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// The reconstructed reply: every output payload, concatenated.
    pub fn text(&self) -> String {
        self.output.concat()
    }

    /// Take the output record, consuming the session.
    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    /// Current construction stack depth, including the root.
    pub fn depth(&self) -> usize {
        self.builder.depth()
    }

    /// Read and process one fragment. Returns `false` once the source is
    /// exhausted and its tail has been processed.
    async fn step(&mut self) -> Result<bool> {
        match self.source.next().await {
            Some(Ok(bytes)) => {
                let bytes = bytes.as_ref();
                let text = self.decoder.decode(bytes);
                tracing::debug!(bytes = bytes.len(), chars = text.len(), "fragment received");
                if text.is_empty() {
                    return Ok(true);
                }
                let records = self.demux.push(&text);
                self.dispatch(records).await?;
                Ok(true)
            }
            Some(Err(err)) => Err(Error::Source(err)),
            None => {
                let tail = self.decoder.finish();
                let mut records = self.demux.push(&tail);
                records.extend(self.demux.finish());
                self.dispatch(records).await?;
                Ok(false)
            }
        }
    }

    async fn dispatch(&mut self, records: Vec<EventRecord>) -> Result<()> {
        if !records.is_empty() {
            tracing::debug!(count = records.len(), "records demultiplexed");
        }
        for record in records {
            let text = self.hooks.route(record).await?;
            self.feed(&text);
            self.output.push(text);
        }
        Ok(())
    }

    fn feed(&mut self, text: &str) {
        let Self {
            tokenizer,
            builder,
            target,
            hooks,
            ..
        } = &mut *self;
        let mut on_added = |t: &mut R, tag: &str, node: R::Handle| hooks.tag_added(t, tag, node);
        tokenizer.feed(text, |event| builder.handle_event(&mut **target, event, &mut on_added));
    }

    /// Final flush; a trailing partial tag is discarded.
    fn finish_tokens(&mut self) {
        let Self {
            tokenizer,
            builder,
            target,
            hooks,
            ..
        } = &mut *self;
        let mut on_added = |t: &mut R, tag: &str, node: R::Handle| hooks.tag_added(t, tag, node);
        tokenizer.finish(|event| builder.handle_event(&mut **target, event, &mut on_added));
    }
}

impl<S, R: RenderTarget> std::fmt::Debug for Session<'_, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tokenizer", &self.tokenizer)
            .field("builder", &self.builder)
            .field("hooks", &self.hooks)
            .field("output", &self.output)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
