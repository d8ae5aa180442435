use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};

use http::{HeaderMap, Method, Request, Response, StatusCode};
use opentelemetry::{
    global,
    trace::{
        SpanContext, SpanId, SpanKind, Status, TraceFlags, TraceId, TraceState,
        TracerProvider as _,
    },
    KeyValue, Value,
};
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    trace::{InMemorySpanExporter, SdkTracer, SdkTracerProvider},
};
use tower::{service_fn, Layer, ServiceExt};
use tower_opentracing::{otel::OtelTracer, tags, trace::TracingLayer, Span, Tracer};

/// The provider must outlive the request: spans ended after it is dropped are never exported.
fn setup() -> (SdkTracerProvider, SdkTracer, InMemorySpanExporter) {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let tracer = provider.tracer("tower-opentracing-tests");
    (provider, tracer, exporter)
}

fn attribute<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a Value> {
    attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

fn remote_parent() -> SpanContext {
    SpanContext::new(
        TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
        SpanId::from_hex("00f067aa0ba902b7").unwrap(),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    )
}

#[tokio::test]
async fn exports_client_span_with_tags() {
    let (provider, tracer, exporter) = setup();
    let inner = service_fn(|_req: Request<String>| async {
        let res = Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body("boom".to_owned())
            .unwrap();
        Ok::<_, Infallible>(res)
    });
    let svc = TracingLayer::new(OtelTracer::new(tracer))
        .with_service_name("inventory")
        .layer(inner);

    let req = Request::builder()
        .method(Method::GET)
        .uri("http://inventory.local/items")
        .body(String::new())
        .unwrap();
    svc.oneshot(req).await.unwrap();

    let spans = exporter.get_finished_spans().unwrap();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];

    assert_eq!(span.name, "GET");
    assert_eq!(span.span_kind, SpanKind::Client);
    assert_eq!(
        attribute(&span.attributes, tags::HTTP_URL),
        Some(&Value::from("http://inventory.local/items"))
    );
    assert_eq!(
        attribute(&span.attributes, tags::PEER_SERVICE),
        Some(&Value::from("inventory"))
    );
    assert_eq!(
        attribute(&span.attributes, tags::HTTP_STATUS_CODE),
        Some(&Value::I64(500))
    );
    assert!(matches!(span.status, Status::Error { .. }));

    let event = &span.events.events[0];
    assert_eq!(event.name, tags::EVENT_ERROR);
    assert_eq!(
        attribute(&event.attributes, tags::MESSAGE),
        Some(&Value::from("boom"))
    );

    provider.shutdown().unwrap();
}

#[tokio::test]
async fn injects_traceparent_header() {
    let (provider, tracer, exporter) = setup();
    let seen: Arc<Mutex<Option<HeaderMap>>> = Arc::default();
    let inner = service_fn({
        let seen = Arc::clone(&seen);
        move |req: Request<String>| {
            *seen.lock().unwrap() = Some(req.headers().clone());
            async { Ok::<_, Infallible>(Response::new(String::new())) }
        }
    });
    let svc = TracingLayer::new(OtelTracer::new(tracer)).layer(inner);

    let req = Request::post("http://inventory.local/items")
        .body(String::new())
        .unwrap();
    svc.oneshot(req).await.unwrap();

    let spans = exporter.get_finished_spans().unwrap();
    let context = &spans[0].span_context;
    let headers = seen.lock().unwrap().take().unwrap();
    let traceparent = headers["traceparent"].to_str().unwrap();

    assert_eq!(
        traceparent,
        format!("00-{}-{}-01", context.trace_id(), context.span_id())
    );

    provider.shutdown().unwrap();
}

#[tokio::test]
async fn child_span_joins_parent_trace() {
    let (provider, tracer, exporter) = setup();
    let parent = remote_parent();
    let inner = service_fn(|_req: Request<String>| async {
        Ok::<_, Infallible>(Response::new(String::new()))
    });
    let svc = TracingLayer::new(OtelTracer::new(tracer))
        .with_parent(parent.clone())
        .layer(inner);

    svc.oneshot(Request::new(String::new())).await.unwrap();

    let spans = exporter.get_finished_spans().unwrap();
    assert_eq!(spans[0].span_context.trace_id(), parent.trace_id());
    assert_eq!(spans[0].parent_span_id, parent.span_id());

    provider.shutdown().unwrap();
}

#[test]
fn tracer_can_be_used_directly() {
    let (provider, tracer, exporter) = setup();
    let tracer = OtelTracer::new(tracer);

    let mut span = tracer.start_span(
        "lookup".into(),
        None,
        vec![KeyValue::new(tags::SPAN_KIND, tags::SPAN_KIND_CLIENT)],
    );
    span.set_tag(KeyValue::new(tags::ERROR, true));
    let context = span.context();
    assert!(context.is_valid());

    let mut headers = HeaderMap::new();
    tracer
        .inject(&context, tower_opentracing::Format::HttpHeaders, &mut headers)
        .unwrap();
    assert!(headers.contains_key("traceparent"));

    span.finish();
    let spans = exporter.get_finished_spans().unwrap();
    assert_eq!(spans.len(), 1);
    assert!(matches!(spans[0].status, Status::Error { .. }));

    provider.shutdown().unwrap();
}
