//! Middleware that traces outgoing HTTP requests.

use std::{
    borrow::Cow,
    fmt::Display,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{ready, Context, Poll},
};

use http::{Request, Response};
use opentelemetry::{KeyValue, Value};
use pin_project::pin_project;
use tower_layer::Layer;
use tower_service::Service;

use super::{
    guard::SpanGuard, options, BodyMessage, CaptureAll, CaptureErrors, ParentRef,
    ResponseMessage, TraceOptions,
};
use crate::{
    global::{self, GlobalTracer},
    tags,
    tracer::{Format, Span, Tracer},
    util,
};

/// [`Layer`] that traces the outgoing HTTP requests of a [`Service`].
///
/// Every request gets its own client span, started before the inner service is called and
/// finished when the response is received, the inner service fails, or the response future is
/// dropped. The context of the span is injected into the request headers.
///
/// ```
/// use tower_opentracing::{noop::NoopTracer, trace::TracingLayer};
///
/// let layer = TracingLayer::new(NoopTracer::new())
///     .with_span_name("inventory")
///     .with_service_name("inventory-service");
/// # let _ = layer;
/// ```
#[derive(Debug)]
pub struct TracingLayer<T, C = CaptureAll, M = BodyMessage> {
    tracer: Arc<T>,
    defaults: TraceOptions,
    capture: C,
    message: M,
}

impl TracingLayer<GlobalTracer> {
    /// Traces with the process-wide tracer.
    ///
    /// The global registry is read once, here: tracers installed later are not seen by this
    /// layer.
    pub fn global() -> Self {
        Self::new(global::tracer())
    }
}

impl<T> TracingLayer<T> {
    /// Traces with the given tracer.
    ///
    /// Server errors are logged with the response body by default, which needs a buffered body
    /// (`B: AsRef<[u8]>`). Clients with streaming bodies switch to the status line with
    /// [`message_with(StatusMessage)`](TracingLayer::message_with):
    ///
    /// ```
    /// use std::convert::Infallible;
    ///
    /// use http::{Request, Response};
    /// use tower::{service_fn, Layer, Service};
    /// use tower_opentracing::{
    ///     noop::NoopTracer,
    ///     trace::{StatusMessage, TracingLayer},
    /// };
    ///
    /// struct Streaming;
    ///
    /// fn client<S: Service<Request<()>, Response = Response<Streaming>>>(svc: S) -> S {
    ///     svc
    /// }
    ///
    /// let svc = client(
    ///     TracingLayer::new(NoopTracer::new())
    ///         .message_with(StatusMessage)
    ///         .layer(service_fn(|_req: Request<()>| async {
    ///             Ok::<_, Infallible>(Response::new(Streaming))
    ///         })),
    /// );
    /// # let _ = svc;
    /// ```
    pub fn new(tracer: T) -> Self {
        Self {
            tracer: Arc::new(tracer),
            defaults: TraceOptions::default(),
            capture: CaptureAll,
            message: BodyMessage,
        }
    }
}

impl<T, C, M> TracingLayer<T, C, M> {
    /// Default parent of the spans, used when the request does not set one.
    pub fn with_parent(mut self, parent: impl Into<ParentRef>) -> Self {
        self.defaults.parent = Some(parent.into());
        self
    }

    /// Default name of the spans, used when the request does not set one.
    ///
    /// Without a name the upper-cased HTTP method is used.
    pub fn with_span_name(mut self, span_name: impl Into<Cow<'static, str>>) -> Self {
        self.defaults.span_name = Some(span_name.into());
        self
    }

    /// Default name of the remote service, used when the request does not set one.
    pub fn with_service_name(mut self, service_name: impl Into<Cow<'static, str>>) -> Self {
        self.defaults.service_name = Some(service_name.into());
        self
    }

    /// Select which errors of the inner service mark the span as failed.
    pub fn capture_errors<C2>(self, capture: C2) -> TracingLayer<T, C2, M> {
        TracingLayer {
            tracer: self.tracer,
            defaults: self.defaults,
            capture,
            message: self.message,
        }
    }

    /// Select the message logged for server errors.
    pub fn message_with<M2>(self, message: M2) -> TracingLayer<T, C, M2> {
        TracingLayer {
            tracer: self.tracer,
            defaults: self.defaults,
            capture: self.capture,
            message,
        }
    }
}

impl<T, C: Clone, M: Clone> Clone for TracingLayer<T, C, M> {
    fn clone(&self) -> Self {
        Self {
            tracer: Arc::clone(&self.tracer),
            defaults: self.defaults.clone(),
            capture: self.capture.clone(),
            message: self.message.clone(),
        }
    }
}

impl<S, T, C: Clone, M: Clone> Layer<S> for TracingLayer<T, C, M> {
    type Service = Tracing<S, T, C, M>;

    fn layer(&self, inner: S) -> Self::Service {
        Tracing {
            inner,
            tracer: Arc::clone(&self.tracer),
            defaults: Arc::new(self.defaults.clone()),
            capture: self.capture.clone(),
            message: self.message.clone(),
        }
    }
}

/// Middleware that traces the outgoing HTTP requests of a [`Service`].
#[derive(Debug)]
pub struct Tracing<S, T, C = CaptureAll, M = BodyMessage> {
    inner: S,
    tracer: Arc<T>,
    defaults: Arc<TraceOptions>,
    capture: C,
    message: M,
}

impl<S: Clone, T, C: Clone, M: Clone> Clone for Tracing<S, T, C, M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            tracer: Arc::clone(&self.tracer),
            defaults: Arc::clone(&self.defaults),
            capture: self.capture.clone(),
            message: self.message.clone(),
        }
    }
}

impl<S, T, C, M, ReqBody, ResBody> Service<Request<ReqBody>> for Tracing<S, T, C, M>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Error: Display,
    T: Tracer,
    C: CaptureErrors<S::Error> + Clone,
    M: ResponseMessage<ResBody> + Clone,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future, T::Span, C, M>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    /// # Panics
    ///
    /// Panics if the tracer fails to inject the span context into the request headers.
    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let span = start_request_span(&*self.tracer, &self.defaults, &req);
        let context = span.context();
        let span = SpanGuard::new(span);

        if let Err(err) = self
            .tracer
            .inject(&context, Format::HttpHeaders, req.headers_mut())
        {
            tracing::error!(error = %err, "tracer failed to inject span context");
            panic!("failed to inject span context into request headers: {err}");
        }

        let inner = self.inner.call(req);

        ResponseFuture {
            inner,
            span,
            capture: self.capture.clone(),
            message: self.message.clone(),
        }
    }
}

/// Response future for [`Tracing`].
#[pin_project]
pub struct ResponseFuture<F, S: Span, C, M> {
    #[pin]
    inner: F,
    span: SpanGuard<S>,
    capture: C,
    message: M,
}

impl<F, S, C, M, ResBody, E> Future for ResponseFuture<F, S, C, M>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
    E: Display,
    S: Span,
    C: CaptureErrors<E>,
    M: ResponseMessage<ResBody>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match ready!(this.inner.poll(cx)) {
            Ok(response) => {
                record_response(this.span, &*this.message, &response);
                this.span.finish();
                Poll::Ready(Ok(response))
            }
            Err(err) => {
                if this.capture.capture(&err) {
                    record_error(this.span, &err);
                }
                this.span.finish();
                Poll::Ready(Err(err))
            }
        }
    }
}

fn string_value(value: Cow<'static, str>) -> Value {
    match value {
        Cow::Borrowed(value) => Value::from(value),
        Cow::Owned(value) => Value::from(value),
    }
}

/// Starts the span of the given request.
fn start_request_span<T: Tracer, B>(
    tracer: &T,
    defaults: &TraceOptions,
    request: &Request<B>,
) -> T::Span {
    let name = options::span_name(request, defaults);
    let parent = options::parent(request, defaults);

    let mut span_tags = vec![
        KeyValue::new(tags::COMPONENT, tags::COMPONENT_NAME),
        KeyValue::new(tags::SPAN_KIND, tags::SPAN_KIND_CLIENT),
        KeyValue::new(
            tags::HTTP_METHOD,
            string_value(util::http_method(request.method())),
        ),
        KeyValue::new(tags::HTTP_URL, request.uri().to_string()),
    ];
    if let Some(service_name) = options::service_name(request, defaults) {
        span_tags.push(KeyValue::new(tags::PEER_SERVICE, string_value(service_name)));
    }

    tracing::debug!(
        span.name = %name,
        span.root = parent.is_none(),
        "starting client span"
    );

    tracer.start_span(name, parent.as_ref(), span_tags)
}

/// Records fields associated to the response.
fn record_response<S, M, B>(span: &mut SpanGuard<S>, message: &M, response: &Response<B>)
where
    S: Span,
    M: ResponseMessage<B>,
{
    let status = response.status().as_u16();
    tracing::trace!(status, "client span received response");

    span.set_tag(KeyValue::new(tags::HTTP_STATUS_CODE, status as i64));

    // 5xx responses are recorded as failed, they are not turned into errors
    if status >= 500 {
        span.set_tag(KeyValue::new(tags::ERROR, true));
        span.log(
            Cow::Borrowed(tags::EVENT_ERROR),
            vec![KeyValue::new(tags::MESSAGE, message.message(response))],
        );
    }
}

/// Records the error returned by the inner service.
fn record_error<S: Span, E: Display>(span: &mut SpanGuard<S>, err: &E) {
    tracing::trace!(error = %err, "client span received error");

    span.set_tag(KeyValue::new(tags::ERROR, true));
    span.log(
        Cow::Borrowed(tags::EVENT_ERROR),
        vec![
            KeyValue::new(tags::ERROR_KIND, std::any::type_name::<E>()),
            KeyValue::new(tags::ERROR_OBJECT, err.to_string()),
        ],
    );
}
