use std::fmt;
use std::io::{self, Write};

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{span, Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::context::{ContextValues, RequestContext};
use crate::formatter::Formatter;
use crate::record::{CallSite, Fields, LogRecord, Severity};

/// `tracing_subscriber` layer that renders every event through a
/// [`Formatter`] and writes the resulting line to a [`MakeWriter`].
///
/// Span fields are kept in span extensions and exposed to the formatter as
/// the request context of each event inside that span. With the
/// `opentelemetry` feature the current OpenTelemetry context supplies the
/// active span.
pub struct GoogleLogLayer<F, W = fn() -> io::Stdout> {
    formatter: F,
    make_writer: W,
    report_caller: bool,
}

impl<F: Formatter> GoogleLogLayer<F> {
    /// Create a layer writing to stdout without call-site reporting.
    pub fn new(formatter: F) -> Self {
        GoogleLogLayer {
            formatter,
            make_writer: io::stdout,
            report_caller: false,
        }
    }
}

impl<F, W> GoogleLogLayer<F, W> {
    /// Send output to `make_writer` instead.
    pub fn with_writer<W2>(self, make_writer: W2) -> GoogleLogLayer<F, W2>
    where
        W2: for<'writer> MakeWriter<'writer> + 'static,
    {
        GoogleLogLayer {
            formatter: self.formatter,
            make_writer,
            report_caller: self.report_caller,
        }
    }

    /// Attach file, line and module of the event to every record.
    pub fn with_caller(mut self, report_caller: bool) -> Self {
        self.report_caller = report_caller;
        self
    }

    pub fn formatter(&self) -> &F {
        &self.formatter
    }
}

/// Span fields stored in the span's extensions.
#[derive(Debug, Default)]
struct SpanFields(Fields);

/// Request context assembled for one event from its span scope.
struct ScopeContext {
    values: ContextValues,
    #[cfg(feature = "opentelemetry")]
    otel: opentelemetry::Context,
}

impl ScopeContext {
    fn from_event<S>(event: &Event<'_>, ctx: &Context<'_, S>) -> Self
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let mut values = ContextValues::new();
        if let Some(scope) = ctx.event_scope(event) {
            // Leaf first, so inner spans win.
            for span in scope {
                if let Some(fields) = span.extensions().get::<SpanFields>() {
                    for (key, value) in &fields.0 {
                        values.insert_missing(key, value);
                    }
                }
            }
        }

        ScopeContext {
            values,
            #[cfg(feature = "opentelemetry")]
            otel: opentelemetry::Context::current(),
        }
    }
}

impl RequestContext for ScopeContext {
    fn value(&self, key: &str) -> Option<&Value> {
        self.values.value(key)
    }

    fn active_trace_id(&self) -> Option<String> {
        #[cfg(feature = "opentelemetry")]
        {
            self.otel.active_trace_id()
        }
        #[cfg(not(feature = "opentelemetry"))]
        {
            None
        }
    }
}

impl<S, F, W> Layer<S> for GoogleLogLayer<F, W>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    F: Formatter + 'static,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(visitor.into_fields()));
        }
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(stored) => stored.0.extend(visitor.into_fields()),
            None => extensions.insert(SpanFields(visitor.into_fields())),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let scope = ScopeContext::from_event(event, &ctx);

        let mut record = LogRecord::new(Severity::from(*meta.level()), visitor.message.unwrap_or_default())
            .with_fields(visitor.fields)
            .with_context(&scope);

        if self.report_caller {
            if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
                let function = meta.module_path().unwrap_or_else(|| meta.target());
                record = record.with_caller(CallSite::new(file, line, function));
            }
        }

        let bytes = match self.formatter.format(&record) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("dropping log event: {}", e);
                return;
            }
        };

        let mut writer = self.make_writer.make_writer_for(meta);
        if let Err(e) = writer.write_all(&bytes) {
            eprintln!("error writing log entry: {}", e);
        }
    }
}

/// Collects event or span fields as JSON values.
///
/// The `message` field is kept apart so it can become the entry message.
#[derive(Default)]
pub struct FieldVisitor {
    pub fields: Fields,
    pub message: Option<String>,
}

impl FieldVisitor {
    /// All recorded fields, with `message` folded back in.
    pub fn into_fields(mut self) -> Fields {
        if let Some(message) = self.message.take() {
            self.fields.insert("message".to_string(), Value::String(message));
        }
        self.fields
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}
