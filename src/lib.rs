//! Tracing middleware for outgoing HTTP requests.
//!
//! [`TracingLayer`] wraps any [`Service`] taking an [`http::Request`] and returning an
//! [`http::Response`]. Each request is covered by a client span that:
//!
//! - is named after the request method, unless a name is configured on the layer or on the
//!   request with [`TraceOptions`];
//! - carries the `component`, `span.kind`, `http.method`, `http.url` and, when known,
//!   `peer.service` tags;
//! - has its context injected into the request headers;
//! - records the status code of the response, server errors and errors of the inner service;
//! - is finished exactly once, whatever happens to the request.
//!
//! Spans are created by a pluggable [`Tracer`]. [`OtelTracer`] forwards them to OpenTelemetry,
//! any other backend can be used by implementing the trait.
//!
//! ```
//! use std::convert::Infallible;
//!
//! use tower::{service_fn, ServiceBuilder};
//! use tower_opentracing::{noop::NoopTracer, trace::TracingLayer};
//!
//! let client = ServiceBuilder::new()
//!     .layer(TracingLayer::new(NoopTracer::new()).with_service_name("inventory"))
//!     .service(service_fn(|_req: http::Request<String>| async {
//!         Ok::<_, Infallible>(http::Response::new(String::new()))
//!     }));
//! # let _ = client;
//! ```
//!
//! [`Service`]: tower_service::Service
//! [`TracingLayer`]: trace::TracingLayer
//! [`TraceOptions`]: trace::TraceOptions
//! [`OtelTracer`]: otel::OtelTracer

#[doc(inline)]
pub use self::tracer::{Format, InjectError, Span, Tracer};

pub mod global;
pub mod noop;
pub mod otel;
pub mod tags;
pub mod trace;
mod tracer;
mod util;
