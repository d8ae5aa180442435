//! Capabilities a tracing backend must provide to the middleware.
//!
//! The middleware never creates span identifiers or encodes propagation headers itself: both
//! concerns belong to a [`Tracer`]. Any backend implementing this contract can be plugged into
//! [`TracingLayer`].
//!
//! [`TracingLayer`]: crate::trace::TracingLayer

use std::borrow::Cow;

use http::HeaderMap;
use opentelemetry::{trace::SpanContext, KeyValue};

/// Format used to encode a [`SpanContext`] into a carrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Format {
    /// Propagation data written as HTTP headers.
    HttpHeaders,
    /// Propagation data written as plain text key-value pairs.
    TextMap,
}

/// Error returned when a [`SpanContext`] cannot be injected into a carrier.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InjectError {
    /// The tracer does not know how to encode the requested format.
    #[error("unsupported propagation format {0:?}")]
    UnsupportedFormat(Format),
    /// The tracer produced a key that is not a valid header name.
    #[error("invalid propagation header name {0:?}")]
    InvalidHeaderName(String),
    /// The tracer produced a value that is not a valid header value.
    #[error("invalid value for propagation header {0:?}")]
    InvalidHeaderValue(String),
}

/// Starts spans and propagates their context.
pub trait Tracer {
    /// The span type started by this tracer.
    type Span: Span;

    /// Starts a new span.
    ///
    /// When `parent` is `None` the span is the root of a new trace.
    fn start_span(
        &self,
        name: Cow<'static, str>,
        parent: Option<&SpanContext>,
        tags: Vec<KeyValue>,
    ) -> Self::Span;

    /// Writes the propagation data of `context` into `carrier` using the given `format`.
    fn inject(
        &self,
        context: &SpanContext,
        format: Format,
        carrier: &mut HeaderMap,
    ) -> Result<(), InjectError>;
}

/// A single unit of work started by a [`Tracer`].
///
/// A span is finished exactly once: [`Span::finish`] consumes it.
pub trait Span: Send + 'static {
    /// Sets a tag, replacing any previous value stored under the same key.
    fn set_tag(&mut self, tag: KeyValue);

    /// Records an event with its fields.
    fn log(&mut self, event: Cow<'static, str>, fields: Vec<KeyValue>);

    /// Returns the context used to reference this span as a parent.
    fn context(&self) -> SpanContext;

    /// Finishes the span.
    fn finish(self);
}
