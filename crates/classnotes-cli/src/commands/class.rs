use chrono::Utc;
use classnotes_core::services::Modal;
use serde::Serialize;

use super::common::{format_relative_time, join_words, print_json, resolve_class, short_id};
use crate::cli::ClassCommands;
use crate::context::ClientContext;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ClassListItem {
    id: String,
    name: String,
    invite_code: String,
    created_at: i64,
    open: bool,
}

pub async fn run_class(command: ClassCommands, ctx: &ClientContext) -> Result<(), CliError> {
    let mut dashboard = ctx.dashboard().await?;

    match command {
        ClassCommands::List { json } => {
            let open_id = dashboard.view().class().map(|class| class.id);
            if json {
                let items = dashboard
                    .classes
                    .iter()
                    .map(|class| ClassListItem {
                        id: class.id.to_string(),
                        name: class.name.clone(),
                        invite_code: class.invite_code.clone(),
                        created_at: class.created_at,
                        open: Some(class.id) == open_id,
                    })
                    .collect::<Vec<_>>();
                return print_json(&items);
            }

            println!("Welcome, {}!", dashboard.welcome_name());
            if dashboard.classes.is_empty() {
                println!("No classes yet. Create one or join with an invite code.");
                return Ok(());
            }
            let now_ms = Utc::now().timestamp_millis();
            for class in &dashboard.classes {
                let marker = if Some(class.id) == open_id { "*" } else { " " };
                println!(
                    "{marker} {:<13}  {:<30}  {}  {}",
                    short_id(&class.id),
                    class.name,
                    class.invite_code,
                    format_relative_time(class.created_at, now_ms)
                );
            }
            Ok(())
        }
        ClassCommands::Create { name } => {
            let name = join_words(&name, "Class name")?;
            dashboard.open_modal(Modal::CreateClass);
            let Some(class) = dashboard.create_class(&ctx.db, &name).await else {
                return Err(modal_rejection(dashboard.modal_error()));
            };
            println!("Created class '{}' ({})", class.name, class.id);
            println!("Invite code: {}", class.invite_code);
            Ok(())
        }
        ClassCommands::Join { code } => {
            dashboard.open_modal(Modal::JoinClass);
            let Some(class) = dashboard.join_class(&ctx.db, &code).await else {
                return Err(modal_rejection(dashboard.modal_error()));
            };
            println!("Joined class '{}'", class.name);
            Ok(())
        }
        ClassCommands::Open { class } => {
            let class = resolve_class(&dashboard.classes, &class)?.clone();
            let name = class.name.clone();
            dashboard.select_class(&ctx.db, class).await?;
            ctx.remember_view(&dashboard)?;
            println!("Opened class '{name}' ({} subjects)", dashboard.subjects.len());
            Ok(())
        }
        ClassCommands::Members { json } => {
            let class = dashboard.view().class().ok_or(CliError::NoClassOpen)?;
            let members = ctx.db.list_members(&class.id).await?;
            if json {
                return print_json(&members);
            }
            for member in &members {
                let label = match ctx.db.get_user(&member.user_id).await? {
                    Some(user) => format!("{} (@{})", user.display_name(), user.username),
                    None => member.user_id.to_string(),
                };
                println!("{:<7}  {label}", member.role.as_str());
            }
            Ok(())
        }
    }
}

pub fn modal_rejection(message: Option<&str>) -> CliError {
    CliError::Rejected(message.unwrap_or("Request failed").to_string())
}
