use super::common::{finish_editor_action, format_timestamp, print_json};
use super::note::open_note_editor;
use crate::cli::{ImageCommands, LinkCommands};
use crate::context::ClientContext;
use crate::error::CliError;

pub async fn run_image(command: ImageCommands, ctx: &ClientContext) -> Result<(), CliError> {
    match command {
        ImageCommands::Attach { note, file_name } => {
            if file_name.trim().is_empty() {
                return Err(CliError::EmptyArgument("Image file name"));
            }
            let mut editor = open_note_editor(ctx, &note).await?;
            let attached = editor.attach_image(&ctx.db, &file_name).await;
            finish_editor_action(&editor, attached, "Image attached")?;
            if let Some(image) = editor.images.first() {
                println!("{}", image.image_url);
            }
            Ok(())
        }
        ImageCommands::List { note, json } => {
            let editor = open_note_editor(ctx, &note).await?;
            if json {
                return print_json(&editor.images);
            }
            for image in &editor.images {
                println!(
                    "{}  {:<30}  {}",
                    format_timestamp(image.uploaded_at),
                    image.caption.as_deref().unwrap_or(""),
                    image.image_url
                );
            }
            Ok(())
        }
    }
}

pub async fn run_link(command: LinkCommands, ctx: &ClientContext) -> Result<(), CliError> {
    match command {
        LinkCommands::Add { note, url, title } => {
            if url.trim().is_empty() {
                return Err(CliError::EmptyArgument("URL"));
            }
            let mut editor = open_note_editor(ctx, &note).await?;
            let added = editor.add_link(&ctx.db, &url, title.as_deref()).await;
            finish_editor_action(&editor, added, "Link added")
        }
        LinkCommands::List { note, json } => {
            let editor = open_note_editor(ctx, &note).await?;
            if json {
                return print_json(&editor.urls);
            }
            for link in &editor.urls {
                println!("{:<30}  {}", link.label(), link.url);
            }
            Ok(())
        }
    }
}
