//! Export and import of the task collection as a JSON document.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::dates::{self, Timestamp};
use crate::error::{Error, Result};
use crate::lock;
use crate::model::Task;

/// Format version written into every export.
pub const EXPORT_VERSION: &str = "2.0";

pub const INVALID_FORMAT: &str = "Invalid file format";
pub const PARSE_FAILED: &str = "Failed to parse file";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub tasks: Vec<Task>,
    /// ISO 8601 UTC with millisecond precision.
    pub exported_at: String,
    pub version: String,
}

pub fn export_document(tasks: &[Task]) -> ExportDocument {
    ExportDocument {
        tasks: tasks.to_vec(),
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: EXPORT_VERSION.to_string(),
    }
}

pub fn to_json(document: &ExportDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// `<prefix>-YYYY-MM-DD.json` for the local date of `now`.
pub fn export_file_name(prefix: &str, now: &Timestamp) -> String {
    format!("{prefix}-{}.json", dates::date_stamp(now))
}

/// Write an export of `tasks` to `path`, or to the default file name in
/// `dir` when no path is given. Returns the written path.
pub fn write_export(
    tasks: &[Task],
    path: Option<&Path>,
    dir: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => dir.join(export_file_name(prefix, &dates::now())),
    };
    let json = to_json(&export_document(tasks))?;
    lock::write_atomic(&target, json.as_bytes())?;
    debug!(path = %target.display(), count = tasks.len(), "export written");
    Ok(target)
}

/// Parse an export document or a bare task array.
///
/// An object with a non-null `tasks` field contributes that field; any other
/// value is taken as is. Whatever is chosen must be an array of tasks.
pub fn parse_import(content: &str) -> Result<Vec<Task>> {
    let value: Value =
        serde_json::from_str(content).map_err(|_| Error::ImportFormat(PARSE_FAILED.to_string()))?;

    let chosen = match value {
        Value::Object(mut map) => match map.remove("tasks") {
            Some(tasks) if !tasks.is_null() => tasks,
            _ => Value::Object(map),
        },
        other => other,
    };

    if !chosen.is_array() {
        return Err(Error::ImportFormat(INVALID_FORMAT.to_string()));
    }

    serde_json::from_value(chosen).map_err(|_| Error::ImportFormat(PARSE_FAILED.to_string()))
}

pub fn read_import(path: &Path) -> Result<Vec<Task>> {
    let content = fs::read_to_string(path)?;
    parse_import(&content)
}
