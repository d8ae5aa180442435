use std::borrow::Cow;

use http::Method;

/// Upper-cased string representation of HTTP method
pub fn http_method(method: &Method) -> Cow<'static, str> {
    match *method {
        Method::GET => Cow::Borrowed("GET"),
        Method::POST => Cow::Borrowed("POST"),
        Method::PUT => Cow::Borrowed("PUT"),
        Method::DELETE => Cow::Borrowed("DELETE"),
        Method::HEAD => Cow::Borrowed("HEAD"),
        Method::OPTIONS => Cow::Borrowed("OPTIONS"),
        Method::CONNECT => Cow::Borrowed("CONNECT"),
        Method::PATCH => Cow::Borrowed("PATCH"),
        Method::TRACE => Cow::Borrowed("TRACE"),
        // extension methods are case-sensitive, only the tag is normalized
        _ => Cow::Owned(method.as_str().to_ascii_uppercase()),
    }
}
