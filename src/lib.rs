pub mod context;
pub mod entry;
pub mod formatter;
pub mod record;
pub mod trace;

pub mod init;
pub mod layer;

pub use formatter::{BasicFormatter, ExtendedFormatter, FormatError, Formatter};
pub use layer::GoogleLogLayer;
pub use record::{CallSite, Fields, LogRecord, Severity};
