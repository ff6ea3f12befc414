use serde_json::Value;

use crate::record::Fields;

/// Per-request values carried alongside a log call.
///
/// A formatter only reads from the context; a missing key, a value of the
/// wrong type or the absence of an active span all mean "nothing to add".
pub trait RequestContext {
    /// Value stored under `key`, if any.
    fn value(&self, key: &str) -> Option<&Value>;

    /// Trace identifier of the active tracing span, in its native hex form.
    ///
    /// Default implementation reports no span.
    fn active_trace_id(&self) -> Option<String> {
        None
    }
}

/// Simple map-backed [`RequestContext`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextValues {
    values: Fields,
}

impl ContextValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Insert `value` only when no value is stored under `key` yet.
    pub fn insert_missing(&mut self, key: &str, value: &Value) {
        if !self.values.contains_key(key) {
            self.values.insert(key.to_string(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Fields> for ContextValues {
    fn from(values: Fields) -> Self {
        ContextValues { values }
    }
}

impl RequestContext for ContextValues {
    fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[cfg(feature = "opentelemetry")]
impl RequestContext for opentelemetry::Context {
    fn value(&self, _key: &str) -> Option<&Value> {
        None
    }

    fn active_trace_id(&self) -> Option<String> {
        use opentelemetry::trace::TraceContextExt;

        if !self.has_active_span() {
            return None;
        }
        let span = self.span();
        let span_context = span.span_context();
        if !span_context.is_valid() {
            return None;
        }
        Some(span_context.trace_id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_missing_keeps_first_value() {
        let mut ctx = ContextValues::new().with("traceid", "inner");
        ctx.insert_missing("traceid", &Value::from("outer"));
        ctx.insert_missing("user", &Value::from(7));

        assert_eq!(ctx.value("traceid"), Some(&Value::from("inner")));
        assert_eq!(ctx.value("user"), Some(&Value::from(7)));
        assert_eq!(ctx.active_trace_id(), None);
    }

    #[cfg(feature = "opentelemetry")]
    #[test]
    fn opentelemetry_context_reports_span_trace_id() {
        use opentelemetry::trace::{
            SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
        };

        assert_eq!(opentelemetry::Context::new().active_trace_id(), None);

        let span_context = SpanContext::new(
            TraceId::from_bytes([0xab; 16]),
            SpanId::from_bytes([0x01; 8]),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        let cx = opentelemetry::Context::new().with_remote_span_context(span_context);

        assert_eq!(cx.active_trace_id().as_deref(), Some("abababababababababababababababab"));
        assert_eq!(cx.value("anything"), None);
    }
}
