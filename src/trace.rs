use crate::context::RequestContext;

/// Typed accessor for the trace identifier of a log entry.
pub trait TraceSource {
    fn lookup_trace_id(&self) -> Option<String>;
}

/// Reads the trace id stored under a fixed key of a request context.
///
/// Only string values count; anything else is ignored.
pub struct KeyedTraceSource<'a> {
    context: &'a dyn RequestContext,
    key: &'a str,
}

impl<'a> KeyedTraceSource<'a> {
    pub fn new(context: &'a dyn RequestContext, key: &'a str) -> Self {
        KeyedTraceSource { context, key }
    }
}

impl TraceSource for KeyedTraceSource<'_> {
    fn lookup_trace_id(&self) -> Option<String> {
        self.context
            .value(self.key)
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }
}

/// Builds `projects/<project>/traces/<trace id>` from the active span.
pub struct SpanTraceSource<'a> {
    context: &'a dyn RequestContext,
    project_id: &'a str,
}

impl<'a> SpanTraceSource<'a> {
    pub fn new(context: &'a dyn RequestContext, project_id: &'a str) -> Self {
        SpanTraceSource { context, project_id }
    }
}

impl TraceSource for SpanTraceSource<'_> {
    fn lookup_trace_id(&self) -> Option<String> {
        self.context
            .active_trace_id()
            .map(|trace_id| format!("projects/{}/traces/{}", self.project_id, trace_id))
    }
}
