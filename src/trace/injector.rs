//! Implementation of headers injector.

use std::str::FromStr;

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::tracer::InjectError;

/// Writes propagation fields into a [`HeaderMap`], remembering the first invalid field.
pub struct HeaderInjector<'a> {
    headers: &'a mut HeaderMap,
    error: Option<InjectError>,
}

impl<'a> HeaderInjector<'a> {
    pub fn new(headers: &'a mut HeaderMap) -> Self {
        Self {
            headers,
            error: None,
        }
    }

    /// Returns the first field that could not be written.
    pub fn finish(self) -> Result<(), InjectError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl opentelemetry::propagation::Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if self.error.is_some() {
            return;
        }

        let Ok(header_name) = HeaderName::from_str(key) else {
            self.error = Some(InjectError::InvalidHeaderName(key.to_owned()));
            return;
        };
        let Ok(header_value) = HeaderValue::from_str(&value) else {
            self.error = Some(InjectError::InvalidHeaderValue(key.to_owned()));
            return;
        };
        self.headers.insert(header_name, header_value);
    }
}
