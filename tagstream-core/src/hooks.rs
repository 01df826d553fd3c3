//! Hook registry and record routing.
//!
//! A session carries four kinds of caller extension:
//!
//! - a **success transform**, applied to every non-error record's data
//! - an **error transform**, applied to an `error` record's data before the
//!   session fails with it
//! - **tag-added callbacks**, keyed by lower-cased tag name, run when an
//!   element of that name is attached
//! - **completion callbacks**, run once at natural end of stream
//!
//! Transforms are stored as boxed async functions; synchronous ones are
//! wrapped in a ready future. Both default to identity.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::{BoxError, Error, Result, TransformStage};
use crate::sse::EventRecord;
use crate::tree::RenderTarget;

/// A boxed payload transform.
pub type Transform =
    Box<dyn FnMut(String) -> BoxFuture<'static, std::result::Result<String, BoxError>> + Send>;

/// Callback run with each newly attached element of a registered name.
pub type TagAddedFn<R> = Box<dyn FnMut(&mut R, <R as RenderTarget>::Handle) + Send>;

/// Callback run once with the output record at end of stream.
pub type CompleteFn = Box<dyn FnOnce(&[String]) + Send>;

/// Wrap a synchronous, fallible transform.
pub fn sync_transform<F, E>(mut f: F) -> Transform
where
    F: FnMut(String) -> std::result::Result<String, E> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    Box::new(move |data| future::ready(f(data).map_err(Into::into)).boxed())
}

/// Wrap an asynchronous, fallible transform.
pub fn async_transform<F, Fut, E>(mut f: F) -> Transform
where
    F: FnMut(String) -> Fut + Send + 'static,
    Fut: Future<Output = std::result::Result<String, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    Box::new(move |data| {
        let fut = f(data);
        async move { fut.await.map_err(Into::into) }.boxed()
    })
}

/// Registered transforms and callbacks for one session.
pub struct Hooks<R: RenderTarget> {
    success: Option<Transform>,
    error: Option<Transform>,
    tag_added: HashMap<String, Vec<TagAddedFn<R>>>,
    complete: Vec<CompleteFn>,
}

impl<R: RenderTarget> Hooks<R> {
    /// An empty registry: identity transforms, no callbacks.
    pub fn new() -> Self {
        Hooks {
            success: None,
            error: None,
            tag_added: HashMap::new(),
            complete: Vec::new(),
        }
    }

    /// Replace the success transform.
    pub fn set_success(&mut self, transform: Transform) {
        self.success = Some(transform);
    }

    /// Replace the error transform.
    pub fn set_error(&mut self, transform: Transform) {
        self.error = Some(transform);
    }

    /// Register a callback for elements named `tag` (case-insensitive).
    pub fn add_tag_added(&mut self, tag: &str, callback: TagAddedFn<R>) {
        self.tag_added
            .entry(tag.to_lowercase())
            .or_default()
            .push(callback);
    }

    /// Register a completion callback.
    pub fn add_complete(&mut self, callback: CompleteFn) {
        self.complete.push(callback);
    }

    /// Route one record through the transforms.
    ///
    /// Returns the transformed payload of a success record. An `error`
    /// record always fails: with [`Error::Stream`] carrying the error
    /// transform's output, or with [`Error::Transform`] if that transform
    /// itself failed.
    pub async fn route(&mut self, record: EventRecord) -> Result<String> {
        if record.is_error() {
            let message = apply(&mut self.error, TransformStage::Error, record.data).await?;
            tracing::warn!(%message, "stream reported an error");
            return Err(Error::Stream { message });
        }
        apply(&mut self.success, TransformStage::Success, record.data).await
    }

    /// Run the callbacks registered for `tag` on a newly attached node.
    pub fn tag_added(&mut self, target: &mut R, tag: &str, node: R::Handle) {
        if let Some(callbacks) = self.tag_added.get_mut(tag) {
            tracing::trace!(tag, count = callbacks.len(), "running tag-added callbacks");
            for callback in callbacks.iter_mut() {
                callback(target, node);
            }
        }
    }

    /// Run every completion callback once, in registration order, then
    /// release all registrations.
    pub fn complete(&mut self, output: &[String]) {
        for callback in self.complete.drain(..) {
            callback(output);
        }
        self.release();
    }

    /// Drop every registration.
    pub fn release(&mut self) {
        self.success = None;
        self.error = None;
        self.tag_added.clear();
        self.complete.clear();
    }
}

impl<R: RenderTarget> Default for Hooks<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RenderTarget> fmt::Debug for Hooks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.tag_added.keys().collect();
        tags.sort();
        f.debug_struct("Hooks")
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .field("tag_added", &tags)
            .field("complete", &self.complete.len())
            .finish()
    }
}

async fn apply(
    transform: &mut Option<Transform>,
    stage: TransformStage,
    data: String,
) -> Result<String> {
    let Some(transform) = transform else {
        return Ok(data);
    };
    transform(data).await.map_err(|source| {
        tracing::warn!(%stage, error = %source, "transform failed");
        Error::transform(stage, source)
    })
}
