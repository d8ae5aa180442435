//! Process-wide default [`Tracer`].
//!
//! The registry is read once by [`TracingLayer::global`], the layer keeps its own handle
//! afterwards. Installing a new tracer therefore affects only layers built after the change.
//!
//! ```
//! use tower_opentracing::{global, noop::NoopTracer, trace::TracingLayer};
//!
//! global::set_tracer(NoopTracer::new());
//! let layer = TracingLayer::global();
//! # let _ = layer;
//! ```
//!
//! [`TracingLayer::global`]: crate::trace::TracingLayer::global

use std::{
    borrow::Cow,
    fmt,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use http::HeaderMap;
use opentelemetry::{trace::SpanContext, KeyValue};

use crate::{
    noop::NoopTracer,
    tracer::{Format, InjectError, Span, Tracer},
};

static GLOBAL_TRACER: OnceLock<RwLock<GlobalTracer>> = OnceLock::new();

fn global_tracer() -> &'static RwLock<GlobalTracer> {
    GLOBAL_TRACER.get_or_init(|| RwLock::new(GlobalTracer::new(NoopTracer::new())))
}

/// Installs `tracer` as the process-wide default and returns the previous one.
pub fn set_tracer<T>(tracer: T) -> GlobalTracer
where
    T: Tracer + Send + Sync + 'static,
{
    let mut global = global_tracer()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *global, GlobalTracer::new(tracer))
}

/// Returns a handle to the process-wide default tracer.
///
/// A [`NoopTracer`] is returned when no tracer has been installed.
pub fn tracer() -> GlobalTracer {
    global_tracer()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Object-safe counterpart of [`Span`].
pub trait ObjectSafeSpan: Send {
    fn set_tag(&mut self, tag: KeyValue);

    fn log(&mut self, event: Cow<'static, str>, fields: Vec<KeyValue>);

    fn context(&self) -> SpanContext;

    fn finish_boxed(self: Box<Self>);
}

impl<S: Span> ObjectSafeSpan for S {
    fn set_tag(&mut self, tag: KeyValue) {
        Span::set_tag(self, tag)
    }

    fn log(&mut self, event: Cow<'static, str>, fields: Vec<KeyValue>) {
        Span::log(self, event, fields)
    }

    fn context(&self) -> SpanContext {
        Span::context(self)
    }

    fn finish_boxed(self: Box<Self>) {
        Span::finish(*self)
    }
}

/// Type-erased [`Span`] started by a [`GlobalTracer`].
pub struct BoxedSpan(Box<dyn ObjectSafeSpan>);

impl BoxedSpan {
    fn new<S: Span>(span: S) -> Self {
        Self(Box::new(span))
    }
}

impl fmt::Debug for BoxedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxedSpan").finish_non_exhaustive()
    }
}

impl Span for BoxedSpan {
    fn set_tag(&mut self, tag: KeyValue) {
        self.0.set_tag(tag)
    }

    fn log(&mut self, event: Cow<'static, str>, fields: Vec<KeyValue>) {
        self.0.log(event, fields)
    }

    fn context(&self) -> SpanContext {
        self.0.context()
    }

    fn finish(self) {
        self.0.finish_boxed()
    }
}

/// Object-safe counterpart of [`Tracer`].
pub trait ObjectSafeTracer: Send + Sync {
    fn start_span_boxed(
        &self,
        name: Cow<'static, str>,
        parent: Option<&SpanContext>,
        tags: Vec<KeyValue>,
    ) -> BoxedSpan;

    fn inject(
        &self,
        context: &SpanContext,
        format: Format,
        carrier: &mut HeaderMap,
    ) -> Result<(), InjectError>;
}

impl<T> ObjectSafeTracer for T
where
    T: Tracer + Send + Sync,
{
    fn start_span_boxed(
        &self,
        name: Cow<'static, str>,
        parent: Option<&SpanContext>,
        tags: Vec<KeyValue>,
    ) -> BoxedSpan {
        BoxedSpan::new(self.start_span(name, parent, tags))
    }

    fn inject(
        &self,
        context: &SpanContext,
        format: Format,
        carrier: &mut HeaderMap,
    ) -> Result<(), InjectError> {
        Tracer::inject(self, context, format, carrier)
    }
}

/// Handle to a type-erased [`Tracer`] stored in the global registry.
#[derive(Clone)]
pub struct GlobalTracer(Arc<dyn ObjectSafeTracer>);

impl GlobalTracer {
    /// Erases the concrete type of `tracer`.
    pub fn new<T>(tracer: T) -> Self
    where
        T: Tracer + Send + Sync + 'static,
    {
        Self(Arc::new(tracer))
    }
}

impl fmt::Debug for GlobalTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobalTracer").finish_non_exhaustive()
    }
}

impl Tracer for GlobalTracer {
    type Span = BoxedSpan;

    fn start_span(
        &self,
        name: Cow<'static, str>,
        parent: Option<&SpanContext>,
        tags: Vec<KeyValue>,
    ) -> Self::Span {
        self.0.start_span_boxed(name, parent, tags)
    }

    fn inject(
        &self,
        context: &SpanContext,
        format: Format,
        carrier: &mut HeaderMap,
    ) -> Result<(), InjectError> {
        self.0.inject(context, format, carrier)
    }
}
