use classnotes_core::services::Modal;
use serde::Serialize;

use super::class::modal_rejection;
use super::common::{join_words, print_json, resolve_subject, short_id};
use crate::cli::SubjectCommands;
use crate::context::ClientContext;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SubjectListItem {
    id: String,
    name: String,
    color: String,
    icon: String,
    created_at: i64,
    open: bool,
}

pub async fn run_subject(command: SubjectCommands, ctx: &ClientContext) -> Result<(), CliError> {
    let mut dashboard = ctx.dashboard().await?;
    let class_name = dashboard
        .view()
        .class()
        .map(|class| class.name.clone())
        .ok_or(CliError::NoClassOpen)?;

    match command {
        SubjectCommands::List { json } => {
            let open_id = dashboard.view().subject().map(|subject| subject.id);
            if json {
                let items = dashboard
                    .subjects
                    .iter()
                    .map(|subject| SubjectListItem {
                        id: subject.id.to_string(),
                        name: subject.name.clone(),
                        color: subject.color.clone(),
                        icon: subject.icon.clone(),
                        created_at: subject.created_at,
                        open: Some(subject.id) == open_id,
                    })
                    .collect::<Vec<_>>();
                return print_json(&items);
            }

            if dashboard.subjects.is_empty() {
                println!("No subjects in '{class_name}' yet.");
                return Ok(());
            }
            for subject in &dashboard.subjects {
                let marker = if Some(subject.id) == open_id { "*" } else { " " };
                println!(
                    "{marker} {:<13}  {} {:<30}  {}",
                    short_id(&subject.id),
                    subject.icon,
                    subject.name,
                    subject.color
                );
            }
            Ok(())
        }
        SubjectCommands::Add { name } => {
            let name = join_words(&name, "Subject name")?;
            dashboard.open_modal(Modal::AddSubject);
            let Some(subject) = dashboard.add_subject(&ctx.db, &name).await else {
                return Err(modal_rejection(dashboard.modal_error()));
            };
            println!(
                "Added subject {} '{}' to '{class_name}'",
                subject.icon, subject.name
            );
            Ok(())
        }
        SubjectCommands::Open { subject } => {
            let subject = resolve_subject(&dashboard.subjects, &subject)?.clone();
            let name = subject.name.clone();
            dashboard.select_subject(&ctx.db, subject).await?;
            ctx.remember_view(&dashboard)?;
            println!("Opened subject '{name}' ({} notes)", dashboard.notes.len());
            Ok(())
        }
    }
}
