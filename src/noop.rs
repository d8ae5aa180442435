//! Tracer that records nothing.

use std::borrow::Cow;

use http::HeaderMap;
use opentelemetry::{trace::SpanContext, KeyValue};

use crate::tracer::{Format, InjectError, Span, Tracer};

/// [`Tracer`] whose spans are discarded and that never writes propagation headers.
///
/// This is the process-wide tracer until another one is installed with [`set_tracer`].
///
/// [`set_tracer`]: crate::global::set_tracer
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl NoopTracer {
    /// Creates a new noop tracer.
    pub fn new() -> Self {
        Self
    }
}

impl Tracer for NoopTracer {
    type Span = NoopSpan;

    fn start_span(
        &self,
        _name: Cow<'static, str>,
        _parent: Option<&SpanContext>,
        _tags: Vec<KeyValue>,
    ) -> Self::Span {
        NoopSpan
    }

    fn inject(
        &self,
        _context: &SpanContext,
        _format: Format,
        _carrier: &mut HeaderMap,
    ) -> Result<(), InjectError> {
        Ok(())
    }
}

/// [`Span`] started by [`NoopTracer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSpan;

impl Span for NoopSpan {
    fn set_tag(&mut self, _tag: KeyValue) {}

    fn log(&mut self, _event: Cow<'static, str>, _fields: Vec<KeyValue>) {}

    fn context(&self) -> SpanContext {
        SpanContext::empty_context()
    }

    fn finish(self) {}
}
