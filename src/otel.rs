//! [`Tracer`] backed by OpenTelemetry.
//!
//! Spans are created by any [`opentelemetry::trace::Tracer`], their context is written to the
//! request headers by the text map propagator registered with
//! [`opentelemetry::global::set_text_map_propagator`].
//!
//! ```no_run
//! use tower_opentracing::{otel::OtelTracer, trace::TracingLayer};
//!
//! let layer = TracingLayer::new(OtelTracer::global("my-client"));
//! # let _ = layer;
//! ```

use std::borrow::Cow;

use http::HeaderMap;
use opentelemetry::{
    global::BoxedTracer,
    trace::{self as otel, SpanContext, SpanKind, Status, TraceContextExt},
    Context, KeyValue, Value,
};

use crate::{
    tags,
    trace::injector::HeaderInjector,
    tracer::{Format, InjectError, Span, Tracer},
};

/// [`Tracer`] creating OpenTelemetry client spans.
#[derive(Clone, Debug)]
pub struct OtelTracer<T = BoxedTracer> {
    tracer: T,
}

impl OtelTracer {
    /// Uses the tracer with the given name of the global tracer provider.
    pub fn global(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(opentelemetry::global::tracer(name))
    }
}

impl<T> OtelTracer<T> {
    /// Wraps an OpenTelemetry tracer.
    pub fn new(tracer: T) -> Self {
        Self { tracer }
    }
}

impl<T> Tracer for OtelTracer<T>
where
    T: otel::Tracer,
    T::Span: Send + 'static,
{
    type Span = OtelSpan<T::Span>;

    fn start_span(
        &self,
        name: Cow<'static, str>,
        parent: Option<&SpanContext>,
        tags: Vec<KeyValue>,
    ) -> Self::Span {
        let parent_cx = match parent {
            Some(span_context) => Context::new().with_remote_span_context(span_context.clone()),
            None => Context::new(),
        };
        let builder = self
            .tracer
            .span_builder(name)
            .with_kind(SpanKind::Client)
            .with_attributes(tags);

        OtelSpan(self.tracer.build_with_context(builder, &parent_cx))
    }

    fn inject(
        &self,
        context: &SpanContext,
        _format: Format,
        carrier: &mut HeaderMap,
    ) -> Result<(), InjectError> {
        // both formats are written by the text map propagator
        let cx = Context::new().with_remote_span_context(context.clone());
        let mut injector = HeaderInjector::new(carrier);
        opentelemetry::global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&cx, &mut injector);
        });
        injector.finish()
    }
}

/// [`Span`] started by [`OtelTracer`].
#[derive(Debug)]
pub struct OtelSpan<S>(S);

impl<S> OtelSpan<S> {
    /// Returns the wrapped OpenTelemetry span.
    pub fn into_inner(self) -> S {
        self.0
    }
}

impl<S> Span for OtelSpan<S>
where
    S: otel::Span + Send + 'static,
{
    fn set_tag(&mut self, tag: KeyValue) {
        if tag.key.as_str() == tags::ERROR && tag.value == Value::Bool(true) {
            self.0.set_status(Status::error(""));
        }
        self.0.set_attribute(tag);
    }

    fn log(&mut self, event: Cow<'static, str>, fields: Vec<KeyValue>) {
        if event == tags::EVENT_ERROR {
            let description = fields
                .iter()
                .find(|field| {
                    let key = field.key.as_str();
                    key == tags::MESSAGE || key == tags::ERROR_OBJECT
                })
                .map(|field| field.value.to_string());
            if let Some(description) = description {
                self.0.set_status(Status::error(description));
            }
        }
        self.0.add_event(event, fields);
    }

    fn context(&self) -> SpanContext {
        self.0.span_context().clone()
    }

    fn finish(mut self) {
        self.0.end();
    }
}
