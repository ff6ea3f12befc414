use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::context::RequestContext;

/// Structured payload attached to a single log call.
pub type Fields = BTreeMap<String, Value>;

/// Importance of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Panic,
}

impl Severity {
    /// String form written to the `severity` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Panic => "panic",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Severity::Trace,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

/// Location of the statement that produced a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Path of the source file, possibly with directories.
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl CallSite {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        CallSite {
            file: file.into(),
            line,
            function: function.into(),
        }
    }
}

/// A single log call as handed to a [`Formatter`](crate::formatter::Formatter).
///
/// Records are built per call and borrowed by the formatter; formatting
/// never mutates them.
#[derive(Clone)]
pub struct LogRecord<'a> {
    pub message: String,
    pub level: Severity,
    pub fields: Fields,
    pub caller: Option<CallSite>,
    pub context: Option<&'a dyn RequestContext>,
}

impl<'a> LogRecord<'a> {
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        LogRecord {
            message: message.into(),
            level,
            fields: Fields::new(),
            caller: None,
            context: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Merge `fields` into the record, replacing existing keys.
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_caller(mut self, caller: CallSite) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_context(mut self, context: &'a dyn RequestContext) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Debug for LogRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("message", &self.message)
            .field("level", &self.level)
            .field("fields", &self.fields)
            .field("caller", &self.caller)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_strings_and_order() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::from(tracing::Level::WARN), Severity::Warning);
        assert_eq!(Severity::from(tracing::Level::ERROR), Severity::Error);
    }

    #[test]
    fn builder_collects_fields() {
        let mut extra = Fields::new();
        extra.insert("number".to_string(), Value::from(1));
        extra.insert("animal".to_string(), Value::from("otter"));

        let record = LogRecord::new(Severity::Info, "hi")
            .with_field("animal", "walrus")
            .with_fields(extra);

        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields["animal"], "otter");
        assert!(record.caller.is_none());
        assert!(record.context.is_none());
    }
}
