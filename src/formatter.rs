use std::backtrace::Backtrace;

use serde_json::Value;

use crate::entry::{GoogleLogEntry, GrpcStatus, HttpRequest, SourceLocation, ERROR_REPORT_TYPE};
use crate::record::{Fields, LogRecord, Severity};
use crate::trace::{KeyedTraceSource, SpanTraceSource, TraceSource};

/// Field-map keys promoted into the `httpRequest` object.
pub const REQUEST_METHOD: &str = "requestMethod";
pub const REQUEST_URL: &str = "requestUrl";
pub const LATENCY: &str = "latency";

/// Field-map keys promoted into the `grpc` object.
pub const GRPC_CODE: &str = "grpcCode";
pub const GRPC_MESSAGE: &str = "grpcMessage";
pub const GRPC_DETAILS: &str = "grpcDetails";

/// Error returned when a record cannot be turned into an output line.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Turns a [`LogRecord`] into one newline-terminated JSON line.
///
/// Implementations hold only read-only configuration, so a single value can
/// be shared by every logging call site.
pub trait Formatter: Send + Sync {
    /// Format `record`.
    ///
    /// **Returns**
    /// - `Ok(bytes)` with the serialized entry followed by `\n`.
    /// - `Err(FormatError)` if the entry could not be serialized; no
    ///   partial output is produced in that case.
    fn format(&self, record: &LogRecord<'_>) -> Result<Vec<u8>, FormatError>;
}

/// Formatter that reads the trace id from a configurable context key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicFormatter {
    /// Context key holding the trace id. Non-string values are ignored.
    pub trace_key: String,
}

impl BasicFormatter {
    pub fn new(trace_key: impl Into<String>) -> Self {
        BasicFormatter {
            trace_key: trace_key.into(),
        }
    }
}

impl Formatter for BasicFormatter {
    fn format(&self, record: &LogRecord<'_>) -> Result<Vec<u8>, FormatError> {
        let mut entry = base_entry(record);

        if let Some(context) = record.context {
            entry.trace_id = KeyedTraceSource::new(context, &self.trace_key).lookup_trace_id();
        }

        finish(&entry)
    }
}

/// Formatter that derives the trace from the active span and promotes
/// HTTP request and gRPC status fields into their own objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedFormatter {
    /// Google Cloud project that owns the traces.
    pub project_id: String,
}

impl ExtendedFormatter {
    pub fn new(project_id: impl Into<String>) -> Self {
        ExtendedFormatter {
            project_id: project_id.into(),
        }
    }
}

impl Formatter for ExtendedFormatter {
    fn format(&self, record: &LogRecord<'_>) -> Result<Vec<u8>, FormatError> {
        let mut entry = base_entry(record);

        if let Some(context) = record.context {
            entry.trace_id = SpanTraceSource::new(context, &self.project_id).lookup_trace_id();
        }

        // Promoted keys stay in additional_info as well.
        let fields = &record.fields;
        if is_triggered(fields, REQUEST_METHOD) {
            entry.http_request = Some(HttpRequest {
                request_method: field_text(fields, REQUEST_METHOD),
                request_url: field_text(fields, REQUEST_URL),
                latency: field_text(fields, LATENCY),
            });
        }
        if is_triggered(fields, GRPC_CODE) {
            entry.grpc_status = Some(GrpcStatus {
                code: field_text(fields, GRPC_CODE),
                message: field_text(fields, GRPC_MESSAGE),
                details: field_text(fields, GRPC_DETAILS),
            });
        }

        finish(&entry)
    }
}

/// Entry members shared by every formatter: message, severity, fields,
/// source location and the error-report marker.
fn base_entry<'r>(record: &'r LogRecord<'_>) -> GoogleLogEntry<'r> {
    let mut entry = GoogleLogEntry {
        message: record.message.clone(),
        severity: record.level.as_str(),
        additional: &record.fields,
        trace_id: None,
        error_type: None,
        source_location: record.caller.as_ref().map(SourceLocation::from_call_site),
        http_request: None,
        grpc_status: None,
    };

    // The stack is the formatter's own, captured here rather than where the
    // error was raised.
    if record.level == Severity::Error {
        entry.error_type = Some(ERROR_REPORT_TYPE);
        entry.message = format!("{}\n{}", record.message, Backtrace::force_capture());
    }

    entry
}

fn finish(entry: &GoogleLogEntry<'_>) -> Result<Vec<u8>, FormatError> {
    let mut serialized = serde_json::to_vec(entry)?;
    serialized.push(b'\n');
    Ok(serialized)
}

/// String form of a field: strings verbatim, null or missing as "", other
/// values as their JSON text.
fn field_text(fields: &Fields, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_triggered(fields: &Fields, key: &str) -> bool {
    !field_text(fields, key).is_empty()
}
