use std::{convert::Infallible, time::Duration};

use http::{Request, Response, StatusCode};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::SdkTracerProvider, Resource};
use tower::{service_fn, Service, ServiceBuilder, ServiceExt};
use tower_opentracing::{
    global,
    otel::OtelTracer,
    trace::{ParentRef, TraceOptions, TracingLayer},
};
use tracing::{Instrument, Level};
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Stand-in for a remote inventory service.
async fn inventory(req: Request<String>) -> Result<Response<String>, Infallible> {
    tokio::time::sleep(Duration::from_millis(5)).await;

    let traceparent = req
        .headers()
        .get("traceparent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("<none>");
    tracing::info!(%traceparent, uri = %req.uri(), "inventory received request");

    let res = match req.uri().path() {
        "/items" => Response::new("[\"apple\",\"pear\"]".to_owned()),
        _ => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body("inventory database unavailable".to_owned())
            .unwrap(),
    };
    Ok(res)
}

#[tokio::main]
async fn main() {
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    const PKG_NAME: &str = env!("CARGO_PKG_NAME");

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .unwrap();
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(PKG_NAME).build())
        .build();
    opentelemetry::global::set_tracer_provider(provider.clone());

    let telemetry = tracing_opentelemetry::layer()
        .with_tracer(provider.tracer(PKG_NAME))
        .with_filter(LevelFilter::INFO);

    let fmt = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(Level::DEBUG))
        .with(telemetry)
        .with(fmt)
        .init();

    global::set_tracer(OtelTracer::global(PKG_NAME));

    let mut client = ServiceBuilder::new()
        .layer(
            TracingLayer::global()
                .with_service_name("inventory")
                .with_parent(ParentRef::current_tracing_span()),
        )
        .service(service_fn(inventory));

    async {
        let req = Request::get("http://inventory.local/items")
            .body(String::new())
            .unwrap();
        let res = client.ready().await.unwrap().call(req).await.unwrap();
        tracing::info!(status = %res.status(), body = %res.body(), "received response");

        let mut req = Request::get("http://inventory.local/stock")
            .body(String::new())
            .unwrap();
        req.extensions_mut()
            .insert(TraceOptions::new().with_span_name("GET /stock"));
        let res = client.ready().await.unwrap().call(req).await.unwrap();
        tracing::info!(status = %res.status(), body = %res.body(), "received response");
    }
    .instrument(tracing::info_span!("list inventory"))
    .await;

    provider.shutdown().unwrap();
}
