use classnotes_core::models::{CommentThreads, CommentWithAuthor};
use classnotes_core::CommentId;

use super::common::{finish_editor_action, join_words, print_json, short_id};
use super::note::open_note_editor;
use crate::cli::CommentCommands;
use crate::context::ClientContext;
use crate::error::CliError;

pub async fn run_comment(command: CommentCommands, ctx: &ClientContext) -> Result<(), CliError> {
    match command {
        CommentCommands::Add {
            note,
            content,
            reply_to,
        } => {
            let content = join_words(&content, "Comment")?;
            let mut editor = open_note_editor(ctx, &note).await?;
            let parent = reply_to
                .as_deref()
                .map(|id| resolve_comment_id(&editor.comments, id))
                .transpose()?;
            let added = editor.add_comment(&ctx.db, &content, parent).await;
            finish_editor_action(&editor, added, "Comment added")
        }
        CommentCommands::List { note, json } => {
            let editor = open_note_editor(ctx, &note).await?;
            let threads = editor.comment_threads();
            if json {
                return print_json(&threads);
            }
            print_threads(&threads);
            Ok(())
        }
    }
}

/// Match a full comment id or a unique prefix among the note's comments.
pub fn resolve_comment_id(
    comments: &[CommentWithAuthor],
    query: &str,
) -> Result<CommentId, CliError> {
    let query = query.trim();
    if let Ok(id) = query.parse::<CommentId>() {
        return Ok(id);
    }

    let matching = comments
        .iter()
        .map(|comment| comment.comment.id)
        .filter(|id| id.to_string().starts_with(&query.to_lowercase()))
        .collect::<Vec<_>>();
    match matching.as_slice() {
        [id] => Ok(*id),
        [] => Err(CliError::Rejected(format!("Comment not found: {query}"))),
        _ => Err(CliError::Ambiguous(format!(
            "Comment prefix '{query}' is ambiguous"
        ))),
    }
}

pub fn print_threads(threads: &CommentThreads) {
    if threads.threads.is_empty() {
        println!("  No comments yet.");
    }
    for thread in &threads.threads {
        print_comment(&thread.comment, "  ");
        for reply in &thread.replies {
            print_comment(reply, "      ");
        }
    }
    if !threads.hidden_replies.is_empty() {
        tracing::debug!(
            "{} nested replies are not shown",
            threads.hidden_replies.len()
        );
    }
}

fn print_comment(comment: &CommentWithAuthor, indent: &str) {
    println!(
        "{indent}[{}] {}: {}",
        short_id(&comment.comment.id),
        comment.author_name(),
        comment.comment.content
    );
}
