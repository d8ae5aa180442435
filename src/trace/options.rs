//! Per-request overrides and their resolution against the layer defaults.

use std::borrow::Cow;

use http::Request;
use opentelemetry::trace::SpanContext;

use super::ParentRef;
use crate::util;

/// Tracing options of a request.
///
/// Used by [`TracingLayer`] as its defaults and, when inserted into the [`Extensions`] of a
/// request, as overrides for that request only. Request values take precedence over the layer
/// defaults, unset fields fall back to them.
///
/// ```
/// use tower_opentracing::trace::TraceOptions;
///
/// let mut request = http::Request::post("http://localhost/payments").body(()).unwrap();
/// request
///     .extensions_mut()
///     .insert(TraceOptions::new().with_span_name("create payment"));
/// ```
///
/// [`TracingLayer`]: super::TracingLayer
/// [`Extensions`]: http::Extensions
#[derive(Clone, Debug, Default)]
pub struct TraceOptions {
    /// Name of the span, instead of the request method.
    pub span_name: Option<Cow<'static, str>>,
    /// Parent of the span. When set on a request it wins even if it resolves to nothing.
    pub parent: Option<ParentRef>,
    /// Value of the `peer.service` tag.
    pub service_name: Option<Cow<'static, str>>,
}

impl TraceOptions {
    /// Creates options without any value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the span.
    pub fn with_span_name(mut self, span_name: impl Into<Cow<'static, str>>) -> Self {
        self.span_name = Some(span_name.into());
        self
    }

    /// Set the parent of the span.
    pub fn with_parent(mut self, parent: impl Into<ParentRef>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the name of the remote service, recorded as `peer.service`.
    pub fn with_service_name(mut self, service_name: impl Into<Cow<'static, str>>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }
}

fn overrides<B>(request: &Request<B>) -> Option<&TraceOptions> {
    request.extensions().get::<TraceOptions>()
}

/// Name of the span: request override, then layer default, then the upper-cased method.
pub(crate) fn span_name<B>(request: &Request<B>, defaults: &TraceOptions) -> Cow<'static, str> {
    overrides(request)
        .and_then(|options| options.span_name.clone())
        .or_else(|| defaults.span_name.clone())
        .unwrap_or_else(|| util::http_method(request.method()))
}

/// Parent of the span: request override, then layer default.
///
/// The winning reference is resolved here, lazy producers run once per request.
pub(crate) fn parent<B>(request: &Request<B>, defaults: &TraceOptions) -> Option<SpanContext> {
    overrides(request)
        .and_then(|options| options.parent.as_ref())
        .or(defaults.parent.as_ref())
        .and_then(ParentRef::resolve)
}

/// Name of the remote service: request override, then layer default.
pub(crate) fn service_name<B>(
    request: &Request<B>,
    defaults: &TraceOptions,
) -> Option<Cow<'static, str>> {
    overrides(request)
        .and_then(|options| options.service_name.clone())
        .or_else(|| defaults.service_name.clone())
}
