use serde::Serialize;

use crate::record::{CallSite, Fields};

/// `@type` that routes an entry to Cloud Error Reporting.
pub const ERROR_REPORT_TYPE: &str =
    "type.googleapis.com/google.devtools.clouderrorreporting.v1beta1.ReportedErrorEvent";

/// One line of Cloud Logging structured output.
///
/// Optional members are left out of the JSON entirely when unset; the log
/// viewer treats presence of a key as meaningful.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleLogEntry<'a> {
    pub message: String,
    pub severity: &'static str,
    #[serde(rename = "additional_info", skip_serializing_if = "is_empty_fields")]
    pub additional: &'a Fields,
    #[serde(
        rename = "logging.googleapis.com/trace",
        skip_serializing_if = "Option::is_none"
    )]
    pub trace_id: Option<String>,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<&'static str>,
    #[serde(
        rename = "logging.googleapis.com/sourceLocation",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_location: Option<SourceLocation>,
    #[serde(rename = "httpRequest", skip_serializing_if = "Option::is_none")]
    pub http_request: Option<HttpRequest>,
    #[serde(rename = "grpc", skip_serializing_if = "Option::is_none")]
    pub grpc_status: Option<GrpcStatus>,
}

fn is_empty_fields(fields: &&Fields) -> bool {
    fields.is_empty()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl SourceLocation {
    /// Build from a call site, keeping only the base name of the file.
    pub fn from_call_site(caller: &CallSite) -> Self {
        SourceLocation {
            file: base_name(&caller.file).to_string(),
            line: caller.line,
            function: caller.function.clone(),
        }
    }
}

/// Request summary shown on the entry's header line in the log viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub request_method: String,
    pub request_url: String,
    pub latency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrpcStatus {
    pub code: String,
    pub message: String,
    pub details: String,
}

const SEPARATORS: &[char] = &['/', '\\'];

fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATORS);
    if trimmed.is_empty() {
        return if path.is_empty() { "" } else { "/" };
    }
    trimmed.rsplit(SEPARATORS).next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_directories() {
        assert_eq!(base_name("src/formatter.rs"), "formatter.rs");
        assert_eq!(base_name("/home/app/src/lib.rs"), "lib.rs");
        assert_eq!(base_name(r"C:\app\src\main.rs"), "main.rs");
        assert_eq!(base_name("main.rs"), "main.rs");
        assert_eq!(base_name("src/"), "src");
        assert_eq!(base_name("/"), "/");
        assert_eq!(base_name(""), "");
    }

    #[test]
    fn omitted_members_are_absent() {
        let fields = Fields::new();
        let entry = GoogleLogEntry {
            message: "Hello".to_string(),
            severity: "info",
            additional: &fields,
            trace_id: None,
            error_type: None,
            source_location: None,
            http_request: None,
            grpc_status: None,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"message":"Hello","severity":"info"}"#);
    }

    #[test]
    fn source_location_keys() {
        let location = SourceLocation::from_call_site(&CallSite::new("src/a/b.rs", 12, "app::run"));
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, r#"{"file":"b.rs","line":12,"function":"app::run"}"#);
    }
}
