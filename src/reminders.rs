//! Reminder source: the user-maintained reminders text file.
//!
//! The file is plain UTF-8, one reminder per line. Blank lines, whitespace-only
//! lines, and lines whose first character is `#` are ignored. The file is
//! re-read on every firing so edits apply to the next reminder.

use crate::error::{BtwError, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Comment marker; must be the first character of the line.
pub const COMMENT_MARKER: char = '#';

/// Content written when the reminders file is first created.
pub const DEFAULT_TEMPLATE: &str =
    "# Lines starting with # or empty lines are ignored\n\nclean living room\ncheck mail\n";

/// Read the reminders file at `path` and return its reminder lines in order.
///
/// A file containing only comments and blank lines yields an empty list; the
/// caller decides what to do with it.
///
/// # Errors
///
/// - [`BtwError::EmptyReminders`] when the file has zero bytes.
/// - [`BtwError::ReminderSource`] when the file cannot be opened, read, or
///   decoded as UTF-8.
pub fn read_reminders(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| BtwError::ReminderSource {
        path: path.to_path_buf(),
        source,
    })?;

    if content.is_empty() {
        return Err(BtwError::EmptyReminders(path.to_path_buf()));
    }

    Ok(parse_reminders(&content))
}

/// Filter raw file content down to reminder lines.
pub fn parse_reminders(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| is_reminder_line(line))
        .map(str::to_owned)
        .collect()
}

fn is_reminder_line(line: &str) -> bool {
    !line.trim().is_empty() && !line.starts_with(COMMENT_MARKER)
}

/// Create the reminders file with [`DEFAULT_TEMPLATE`] if nothing exists at `path`.
///
/// Returns `true` when a new file was written. An existing file is never
/// touched, even if it is empty.
///
/// # Errors
///
/// Returns [`BtwError::Io`] if the parent directory or file cannot be created
/// or the template cannot be written.
pub fn ensure_reminders_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(BtwError::Io(e)),
    };
    file.write_all(DEFAULT_TEMPLATE.as_bytes())?;

    info!(path = %path.display(), "created reminders file from template");
    Ok(true)
}
