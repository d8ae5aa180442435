//! Reference to the parent of the spans created by the middleware.

use std::{fmt, sync::Arc};

use opentelemetry::{
    trace::{SpanContext, TraceContextExt},
    Context,
};
use tracing_opentelemetry::OpenTelemetrySpanExt;

type ProduceParent = dyn Fn() -> Option<SpanContext> + Send + Sync;

/// Parent of a client span.
///
/// The reference is resolved every time a request is traced, so a single layer can follow an
/// ambient parent such as the currently active span.
#[derive(Clone)]
pub enum ParentRef {
    /// A fixed span context.
    Concrete(SpanContext),
    /// A producer invoked without arguments when the request is traced.
    Lazy(Arc<ProduceParent>),
}

impl ParentRef {
    /// Creates a reference resolved by calling `f` when the request is traced.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Option<SpanContext> + Send + Sync + 'static,
    {
        Self::Lazy(Arc::new(f))
    }

    /// Follows the span of the active OpenTelemetry [`Context`].
    pub fn current() -> Self {
        Self::lazy(|| Some(Context::current().span().span_context().clone()))
    }

    /// Follows the current [`tracing::Span`], as seen by `tracing-opentelemetry`.
    ///
    /// Without an OpenTelemetry layer installed in the subscriber the traced requests start new
    /// traces.
    pub fn current_tracing_span() -> Self {
        Self::lazy(|| {
            let context = tracing::Span::current().context();
            let span_context = context.span().span_context().clone();
            Some(span_context)
        })
    }

    /// Resolves the reference into the span context to use as parent.
    ///
    /// Returns `None` when the producer yields nothing or an invalid context, the span is then
    /// started as root.
    pub fn resolve(&self) -> Option<SpanContext> {
        let span_context = match self {
            Self::Concrete(span_context) => Some(span_context.clone()),
            Self::Lazy(produce) => produce(),
        };
        span_context.filter(SpanContext::is_valid)
    }
}

impl From<SpanContext> for ParentRef {
    fn from(span_context: SpanContext) -> Self {
        Self::Concrete(span_context)
    }
}

impl fmt::Debug for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(span_context) => f.debug_tuple("Concrete").field(span_context).finish(),
            Self::Lazy(_) => f.debug_tuple("Lazy").finish_non_exhaustive(),
        }
    }
}
