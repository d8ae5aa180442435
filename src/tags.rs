//! Tag keys, log events and log fields written by the middleware.
//!
//! Names follow the OpenTracing semantic conventions.

/// Name of the library emitting the spans, stored under [`COMPONENT`].
pub const COMPONENT_NAME: &str = "tower-opentracing";

/// Software package, framework, library, or module that generated the span.
pub const COMPONENT: &str = "component";

/// Role of the span in the request, always [`SPAN_KIND_CLIENT`] for this middleware.
pub const SPAN_KIND: &str = "span.kind";

/// Value of [`SPAN_KIND`] for spans covering outgoing requests.
pub const SPAN_KIND_CLIENT: &str = "client";

/// HTTP method of the request, upper-cased.
pub const HTTP_METHOD: &str = "http.method";

/// URL of the request.
pub const HTTP_URL: &str = "http.url";

/// HTTP status code of the response.
pub const HTTP_STATUS_CODE: &str = "http.status_code";

/// Name of the remote service.
pub const PEER_SERVICE: &str = "peer.service";

/// Set to `true` when the request failed.
pub const ERROR: &str = "error";

/// Event logged when the request failed.
pub const EVENT_ERROR: &str = "error";

/// Log field holding a human readable message.
pub const MESSAGE: &str = "message";

/// Log field holding the error returned by the inner service.
pub const ERROR_OBJECT: &str = "error.object";

/// Log field holding the type of the error returned by the inner service.
pub const ERROR_KIND: &str = "error.kind";
