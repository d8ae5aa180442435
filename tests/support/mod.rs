//! Tracer recording every span it starts, used to inspect what the middleware does.

#![allow(dead_code)]

use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};

use http::{HeaderMap, HeaderValue};
use opentelemetry::{
    trace::{SpanContext, SpanId, TraceFlags, TraceId, TraceState},
    KeyValue, Value,
};
use tower_opentracing::{Format, InjectError, Span, Tracer};

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const SPAN_ID_HEADER: &str = "x-span-id";

#[derive(Clone, Debug)]
pub struct RecordedSpan {
    pub name: String,
    pub parent: Option<SpanContext>,
    pub context: SpanContext,
    pub tags: Vec<KeyValue>,
    pub logs: Vec<(String, Vec<KeyValue>)>,
}

impl RecordedSpan {
    pub fn tag(&self, key: &str) -> Option<&Value> {
        self.tags
            .iter()
            .find(|tag| tag.key.as_str() == key)
            .map(|tag| &tag.value)
    }

    pub fn log_field(&self, event: &str, key: &str) -> Option<&Value> {
        self.logs
            .iter()
            .filter(|(name, _)| name == event)
            .flat_map(|(_, fields)| fields.iter())
            .find(|field| field.key.as_str() == key)
            .map(|field| &field.value)
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    started: usize,
    finished: Vec<RecordedSpan>,
}

#[derive(Clone, Debug, Default)]
pub struct RecordingTracer {
    state: Arc<Mutex<State>>,
    fail_inject: bool,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracer whose `inject` always fails.
    pub fn failing_inject() -> Self {
        Self {
            fail_inject: true,
            ..Self::default()
        }
    }

    pub fn started(&self) -> usize {
        self.state.lock().unwrap().started
    }

    pub fn finished(&self) -> Vec<RecordedSpan> {
        self.state.lock().unwrap().finished.clone()
    }

    /// The single finished span.
    pub fn span(&self) -> RecordedSpan {
        let finished = self.finished();
        assert_eq!(finished.len(), 1, "expected exactly one finished span");
        finished.into_iter().next().unwrap()
    }
}

impl Tracer for RecordingTracer {
    type Span = RecordingSpan;

    fn start_span(
        &self,
        name: Cow<'static, str>,
        parent: Option<&SpanContext>,
        tags: Vec<KeyValue>,
    ) -> Self::Span {
        let mut state = self.state.lock().unwrap();
        state.started += 1;
        state.next_id += 1;

        let trace_id = parent
            .map(SpanContext::trace_id)
            .unwrap_or_else(|| TraceId::from_bytes((state.next_id as u128).to_be_bytes()));
        let context = SpanContext::new(
            trace_id,
            SpanId::from_bytes(state.next_id.to_be_bytes()),
            TraceFlags::SAMPLED,
            false,
            TraceState::default(),
        );

        RecordingSpan {
            state: Arc::clone(&self.state),
            record: RecordedSpan {
                name: name.into_owned(),
                parent: parent.cloned(),
                context,
                tags,
                logs: Vec::new(),
            },
        }
    }

    fn inject(
        &self,
        context: &SpanContext,
        format: Format,
        carrier: &mut HeaderMap,
    ) -> Result<(), InjectError> {
        if self.fail_inject {
            return Err(InjectError::UnsupportedFormat(format));
        }

        let trace_id = HeaderValue::from_str(&context.trace_id().to_string()).unwrap();
        let span_id = HeaderValue::from_str(&context.span_id().to_string()).unwrap();
        carrier.insert(TRACE_ID_HEADER, trace_id);
        carrier.insert(SPAN_ID_HEADER, span_id);
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingSpan {
    state: Arc<Mutex<State>>,
    record: RecordedSpan,
}

impl Span for RecordingSpan {
    fn set_tag(&mut self, tag: KeyValue) {
        self.record.tags.retain(|existing| existing.key != tag.key);
        self.record.tags.push(tag);
    }

    fn log(&mut self, event: Cow<'static, str>, fields: Vec<KeyValue>) {
        self.record.logs.push((event.into_owned(), fields));
    }

    fn context(&self) -> SpanContext {
        self.record.context.clone()
    }

    fn finish(self) {
        self.state.lock().unwrap().finished.push(self.record);
    }
}

/// Span context usable as an explicit parent.
pub fn parent_context(span_id: u64) -> SpanContext {
    SpanContext::new(
        TraceId::from_bytes(0x0af7651916cd43dd8448eb211c80319cu128.to_be_bytes()),
        SpanId::from_bytes(span_id.to_be_bytes()),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    )
}
