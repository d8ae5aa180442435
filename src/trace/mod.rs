//! Middleware that adds tracing to a [`Service`] making outgoing HTTP requests.
//!
//! [`Service`]: tower_service::Service

#[doc(inline)]
pub use self::{
    capture::{CaptureAll, CaptureErrors, CaptureNone, CaptureType},
    http::{ResponseFuture, Tracing, TracingLayer},
    message::{BodyMessage, ResponseMessage, StatusMessage},
    options::TraceOptions,
    parent::ParentRef,
};

mod capture;
mod guard;
pub mod http;
pub(crate) mod injector;
mod message;
mod options;
mod parent;
