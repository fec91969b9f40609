use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use classnotes_core::services::{Dashboard, NoteEditor, Notice};
use classnotes_core::{Class, Note, NoteId, Subject};
use serde::Serialize;

use crate::error::CliError;

/// Characters of a UUID shown in listings
pub const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub is_public: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
}

pub fn note_to_list_item(note: &Note, now_ms: i64) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        is_public: note.is_public,
        created_at: note.created_at,
        updated_at: note.updated_at,
        relative_time: format_relative_time(note.updated_at, now_ms),
    }
}

pub fn short_id(id: &impl ToString) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// First line of the content, whitespace collapsed and truncated
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    truncate_line(note.content.lines().next().unwrap_or(""), max_chars)
}

pub fn truncate_line(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    const MINUTE: i64 = 60_000;
    const UNITS: [(i64, &str); 6] = [
        (365 * 24 * 60 * MINUTE, "y"),
        (30 * 24 * 60 * MINUTE, "mo"),
        (7 * 24 * 60 * MINUTE, "w"),
        (24 * 60 * MINUTE, "d"),
        (60 * MINUTE, "h"),
        (MINUTE, "m"),
    ];

    let elapsed = now_ms.saturating_sub(timestamp_ms);
    UNITS
        .iter()
        .find(|(size, _)| elapsed >= *size)
        .map_or_else(
            || "just now".to_string(),
            |(size, suffix)| format!("{}{suffix} ago", elapsed / size),
        )
}

/// Join free-form words from the command line; blank input is rejected.
pub fn join_words(words: &[String], what: &'static str) -> Result<String, CliError> {
    let joined = words.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyArgument(what))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Pick exactly one item whose id starts with `query` or whose label matches.
fn resolve_one<'a, T>(
    items: &'a [T],
    query: &str,
    id_of: impl Fn(&T) -> String,
    matches_label: impl Fn(&T, &str) -> bool,
    label_of: impl Fn(&T) -> String,
) -> Result<Option<&'a T>, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }

    if let Some(exact) = items.iter().find(|item| id_of(item) == query) {
        return Ok(Some(exact));
    }

    let lowered = query.to_lowercase();
    let matching = items
        .iter()
        .filter(|item| id_of(item).starts_with(&lowered) || matches_label(item, query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        several => {
            let options = several
                .iter()
                .take(3)
                .map(|item| format!("{} ({})", label_of(item), short_id(&id_of(item))))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::Ambiguous(format!(
                "'{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Find a class by id prefix, case-insensitive name or invite code.
pub fn resolve_class<'a>(classes: &'a [Class], query: &str) -> Result<&'a Class, CliError> {
    resolve_one(
        classes,
        query,
        |class| class.id.to_string(),
        |class, query| {
            class.name.eq_ignore_ascii_case(query.trim())
                || class.invite_code.eq_ignore_ascii_case(query.trim())
        },
        |class| class.name.clone(),
    )?
    .ok_or_else(|| CliError::ClassNotFound(query.trim().to_string()))
}

/// Find a subject by id prefix or case-insensitive name.
pub fn resolve_subject<'a>(subjects: &'a [Subject], query: &str) -> Result<&'a Subject, CliError> {
    resolve_one(
        subjects,
        query,
        |subject| subject.id.to_string(),
        |subject, query| subject.name.eq_ignore_ascii_case(query.trim()),
        |subject| subject.name.clone(),
    )?
    .ok_or_else(|| CliError::SubjectNotFound(query.trim().to_string()))
}

/// Resolve a note among the open subject's notes; a full id is accepted
/// without an open subject.
pub fn resolve_note_id(dashboard: &Dashboard, query: &str) -> Result<NoteId, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyArgument("Note ID"));
    }
    if let Ok(note_id) = trimmed.parse::<NoteId>() {
        return Ok(dashboard.open_note(&note_id).unwrap_or(note_id));
    }
    if dashboard.view().subject().is_none() {
        return Err(CliError::NoSubjectOpen);
    }

    let note = resolve_one(
        &dashboard.notes,
        trimmed,
        |note| note.id.to_string(),
        |_, _| false,
        |note| note.title.clone(),
    )?
    .ok_or_else(|| CliError::NoteNotFound(trimmed.to_string()))?;
    dashboard
        .open_note(&note.id)
        .ok_or_else(|| CliError::NoteNotFound(trimmed.to_string()))
}

/// Turn an editor operation's outcome into output or an error.
pub fn finish_editor_action(
    editor: &NoteEditor,
    succeeded: bool,
    fallback: &str,
) -> Result<(), CliError> {
    match editor.notice() {
        Some(Notice::Error(message)) => Err(CliError::Rejected(message.clone())),
        Some(Notice::Success(message)) => {
            println!("{message}");
            Ok(())
        }
        None if succeeded => {
            println!("{fallback}");
            Ok(())
        }
        None => Err(CliError::Rejected("Nothing was changed".to_string())),
    }
}

pub fn resolve_note_content(
    content_parts: &[String],
    current: &str,
) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input_with_initial(current)? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Let the user edit `initial_content` in their editor; blank results are `None`.
pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launched = launch_editor(&preferred_editor(), &temp_file);
    let edited = std::fs::read_to_string(&temp_file);
    if let Err(error) = std::fs::remove_file(&temp_file) {
        tracing::debug!("Could not remove {}: {}", temp_file.display(), error);
    }

    launched?;
    Ok(normalize_content(&edited?))
}

/// Run an editor command such as `code --wait` on `file_path`.
pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(CliError::EditorFailed("empty EDITOR command".into()));
    };

    let status = Command::new(program).args(parts).arg(file_path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .find_map(|key| env::var(key).ok().filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("classnotes-{}-{now}.md", std::process::id()))
}
