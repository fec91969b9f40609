use classnotes_core::ShareType;

use super::common::finish_editor_action;
use super::note::open_note_editor;
use crate::context::ClientContext;
use crate::error::CliError;

pub async fn run_share(
    note: &str,
    email: &str,
    share_type: ShareType,
    ctx: &ClientContext,
) -> Result<(), CliError> {
    if email.trim().is_empty() {
        return Err(CliError::EmptyArgument("Email"));
    }
    let mut editor = open_note_editor(ctx, note).await?;
    let shared = editor.share(&ctx.db, email, share_type).await;
    finish_editor_action(&editor, shared, "Note shared successfully!")
}
