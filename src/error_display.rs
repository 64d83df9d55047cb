//! User-facing error message formatting.
//!
//! Uses typed error matching (PolarsError variants, io::ErrorKind, serde_json
//! categories) rather than string parsing to produce short status-line messages.

use color_eyre::eyre::Report;
use polars::prelude::PolarsError;
use std::io;

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!("Column not found: {}", msg),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::ComputeError(msg) => format!("Could not parse file: {}", msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("No space left") || msg.contains("space left") {
                return "No space left on device. Free up disk space and try again.".to_string();
            }
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return if context.is_some() {
                format!("I/O error: {}", msg)
            } else {
                msg
            };
        }
        _ => {
            let msg = err.to_string();
            if msg.contains("Is a directory") {
                "Path is a directory, not a file.".to_string()
            } else {
                msg
            }
        }
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a serde_json error by category, keeping the line/column position.
pub fn user_message_from_json(err: &serde_json::Error) -> String {
    use serde_json::error::Category;

    match err.classify() {
        Category::Io => "Could not read the project file.".to_string(),
        Category::Syntax => format!(
            "Malformed JSON at line {}, column {}",
            err.line(),
            err.column()
        ),
        Category::Eof => "Project file ends unexpectedly.".to_string(),
        Category::Data => format!("Unexpected project content: {}", err),
    }
}

/// Format a report for the status line.
///
/// The outermost message gives the context ("Failed to load project x.json");
/// the first typed cause in the chain supplies the detail.
pub fn user_message(report: &Report) -> String {
    let display = report.to_string();
    let outer = display
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or("An error occurred");

    let detail = report.chain().find_map(|cause| {
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return Some(user_message_from_polars(pe));
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(user_message_from_io(io_err, None));
        }
        cause
            .downcast_ref::<serde_json::Error>()
            .map(user_message_from_json)
    });

    match detail {
        Some(detail) if detail != outer => format!("{}: {}", outer, detail),
        _ => outer.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::{eyre, WrapErr};

    #[test]
    fn test_user_message_from_io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, None);
        assert!(
            msg.contains("not found"),
            "expected 'not found', got: {}",
            msg
        );
    }

    #[test]
    fn test_user_message_from_io_permission_denied() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied");
        let msg = user_message_from_io(&err, None);
        assert!(msg.to_lowercase().contains("permission"), "got: {}", msg);
    }

    #[test]
    fn test_user_message_from_polars_column_not_found() {
        let err = PolarsError::ColumnNotFound("foo".into());
        let msg = user_message_from_polars(&err);
        assert!(msg.contains("foo"), "expected 'foo', got: {}", msg);
        assert!(msg.contains("Column not found"), "got: {}", msg);
    }

    #[test]
    fn test_report_with_context_and_json_cause() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ oops").unwrap_err();
        let report = Err::<(), _>(json_err)
            .wrap_err("Failed to load project p.json")
            .unwrap_err();
        let msg = user_message(&report);
        assert!(msg.starts_with("Failed to load project p.json: Malformed JSON"), "got: {}", msg);
    }

    #[test]
    fn test_plain_report_uses_message() {
        let report = eyre!("File not found: data.csv");
        assert_eq!(user_message(&report), "File not found: data.csv");
    }

    #[test]
    fn test_io_cause_is_described() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let report = Err::<(), _>(io_err)
            .wrap_err("Failed to export chart to out.png")
            .unwrap_err();
        assert_eq!(
            user_message(&report),
            "Failed to export chart to out.png: Permission denied."
        );
    }
}
