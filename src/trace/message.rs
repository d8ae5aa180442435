//! Message logged when the remote service answers with a server error.

use http::Response;

/// Derives the message logged with the `error` event of a 5xx response.
pub trait ResponseMessage<B> {
    /// Message for `response`, only called for status codes of 500 and above.
    fn message(&self, response: &Response<B>) -> String;
}

/// Uses the body of the response, decoded as lossy UTF-8.
///
/// Requires a buffered body, for streaming bodies use [`StatusMessage`] or a closure.
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyMessage;

impl<B> ResponseMessage<B> for BodyMessage
where
    B: AsRef<[u8]>,
{
    fn message(&self, response: &Response<B>) -> String {
        String::from_utf8_lossy(response.body().as_ref()).into_owned()
    }
}

/// Uses the canonical reason of the status code.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusMessage;

impl<B> ResponseMessage<B> for StatusMessage {
    fn message(&self, response: &Response<B>) -> String {
        let status = response.status();
        match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_str(), reason),
            None => status.as_str().to_owned(),
        }
    }
}

impl<B, F> ResponseMessage<B> for F
where
    F: Fn(&Response<B>) -> String,
{
    fn message(&self, response: &Response<B>) -> String {
        self(response)
    }
}
