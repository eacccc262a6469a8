pub mod pdf;

pub use pdf::{assemble, report_file_name, ReportDocument, PDF_MIME_TYPE};
