use std::borrow::Cow;

use opentelemetry::KeyValue;

use crate::tracer::Span;

/// Owns a started span and finishes it exactly once.
///
/// The span is finished by [`SpanGuard::finish`] or, if that never happens, when the guard is
/// dropped: on panic or when the response future is dropped before completion.
pub(crate) struct SpanGuard<S: Span>(Option<S>);

impl<S: Span> SpanGuard<S> {
    pub(crate) fn new(span: S) -> Self {
        Self(Some(span))
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) fn set_tag(&mut self, tag: KeyValue) {
        if let Some(span) = self.0.as_mut() {
            span.set_tag(tag);
        }
    }

    pub(crate) fn log(&mut self, event: Cow<'static, str>, fields: Vec<KeyValue>) {
        if let Some(span) = self.0.as_mut() {
            span.log(event, fields);
        }
    }

    pub(crate) fn finish(&mut self) {
        if let Some(span) = self.0.take() {
            span.finish();
        }
    }
}

impl<S: Span> Drop for SpanGuard<S> {
    fn drop(&mut self) {
        if !self.is_finished() {
            tracing::trace!("request ended without a response, finishing span");
            self.finish();
        }
    }
}
