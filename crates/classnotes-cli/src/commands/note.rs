use chrono::Utc;
use classnotes_core::models::CommentThreads;
use classnotes_core::services::{Modal, NoteEditor};
use classnotes_core::{Note, NoteImage, NoteUrl};
use serde::Serialize;

use super::class::modal_rejection;
use super::comment::print_threads;
use super::common::{
    finish_editor_action, format_relative_time, format_timestamp, join_words, note_to_list_item,
    print_json, resolve_note_content, resolve_note_id, short_id, truncate_line,
};
use crate::cli::NoteCommands;
use crate::context::ClientContext;
use crate::error::CliError;

/// Open the note editor on a note named by id or id prefix.
pub async fn open_note_editor(ctx: &ClientContext, query: &str) -> Result<NoteEditor, CliError> {
    let dashboard = ctx.dashboard().await?;
    let note_id = resolve_note_id(&dashboard, query)?;
    Ok(NoteEditor::open(&ctx.db, &note_id, dashboard.user().user_id).await?)
}

#[derive(Debug, Serialize)]
struct NoteView<'a> {
    note: &'a Note,
    images: &'a [NoteImage],
    urls: &'a [NoteUrl],
    comments: CommentThreads,
}

pub async fn run_note(command: NoteCommands, ctx: &ClientContext) -> Result<(), CliError> {
    match command {
        NoteCommands::List { json } => {
            let dashboard = ctx.dashboard().await?;
            let subject = dashboard.view().subject().ok_or(CliError::NoSubjectOpen)?;
            let now_ms = Utc::now().timestamp_millis();
            if json {
                let items = dashboard
                    .notes
                    .iter()
                    .map(|note| note_to_list_item(note, now_ms))
                    .collect::<Vec<_>>();
                return print_json(&items);
            }

            if dashboard.notes.is_empty() {
                println!("No notes in '{}' yet.", subject.name);
                return Ok(());
            }
            for note in &dashboard.notes {
                println!(
                    "{:<13}  {:<40}  {}",
                    short_id(&note.id),
                    truncate_line(&note.title, 40),
                    format_relative_time(note.updated_at, now_ms)
                );
            }
            Ok(())
        }
        NoteCommands::Create { title } => {
            let title = join_words(&title, "Note title")?;
            let mut dashboard = ctx.dashboard().await?;
            dashboard.open_modal(Modal::CreateNote);
            let Some(note) = dashboard.create_note(&ctx.db, &title).await else {
                return Err(modal_rejection(dashboard.modal_error()));
            };
            println!("{}", note.id);
            Ok(())
        }
        NoteCommands::Show { id, json } => {
            let editor = open_note_editor(ctx, &id).await?;
            if json {
                return print_json(&NoteView {
                    note: editor.note(),
                    images: &editor.images,
                    urls: &editor.urls,
                    comments: editor.comment_threads(),
                });
            }
            print_note(&editor);
            Ok(())
        }
        NoteCommands::Save { id, content } => {
            let mut editor = open_note_editor(ctx, &id).await?;
            let content = resolve_note_content(&content, editor.buffer.text())?;
            editor.buffer.set_text(content);
            let saved = editor.save(&ctx.db).await;
            finish_editor_action(&editor, saved, &saved_message(&editor))
        }
        NoteCommands::Format {
            id,
            format,
            text,
            start,
            end,
        } => {
            let mut editor = open_note_editor(ctx, &id).await?;
            match (text, start, end) {
                (Some(text), _, _) => {
                    if !editor.buffer.select_text(&text) {
                        return Err(CliError::InvalidSelection);
                    }
                }
                (None, Some(start), Some(end)) => editor.buffer.select(start..end),
                _ => {
                    let len = editor.buffer.text().len();
                    editor.buffer.select(0..len);
                }
            }
            if !editor.apply_format(format) {
                return Err(CliError::InvalidSelection);
            }
            let saved = editor.save(&ctx.db).await;
            let message = format!("Applied {format}. {}", saved_message(&editor));
            finish_editor_action(&editor, saved, &message)
        }
        NoteCommands::History { id, json } => {
            let mut editor = open_note_editor(ctx, &id).await?;
            editor.load_history(&ctx.db).await?;
            if json {
                return print_json(&editor.history);
            }
            if editor.history.is_empty() {
                println!("No edits yet.");
                return Ok(());
            }
            for entry in &editor.history {
                let before = entry.history.content_before.as_deref().unwrap_or("");
                let after = entry.history.content_after.as_deref().unwrap_or("");
                println!(
                    "{}  {:<20}  {:<30} -> {}",
                    format_timestamp(entry.history.edited_at),
                    truncate_line(entry.editor_name(), 20),
                    truncate_line(before, 30),
                    truncate_line(after, 30)
                );
            }
            Ok(())
        }
    }
}

fn saved_message(editor: &NoteEditor) -> String {
    editor.last_saved().map_or_else(
        || "Saved".to_string(),
        |at| format!("Last saved: {}", format_timestamp(at)),
    )
}

fn print_note(editor: &NoteEditor) {
    let note = editor.note();
    println!("# {}", note.title);
    println!(
        "{}  updated {}",
        if note.is_public { "public" } else { "private" },
        format_timestamp(note.updated_at)
    );
    println!();
    if note.content.is_empty() {
        println!("(empty)");
    } else {
        println!("{}", note.content);
    }

    if !editor.images.is_empty() {
        println!();
        println!("Images ({})", editor.images.len());
        for image in &editor.images {
            println!(
                "  {}  {}",
                image.caption.as_deref().unwrap_or("(no caption)"),
                image.image_url
            );
        }
    }

    if !editor.urls.is_empty() {
        println!();
        println!("Links ({})", editor.urls.len());
        for link in &editor.urls {
            println!("  {}  {}", link.label(), link.url);
        }
    }

    let threads = editor.comment_threads();
    println!();
    println!("Comments ({})", threads.visible_count());
    print_threads(&threads);
}
