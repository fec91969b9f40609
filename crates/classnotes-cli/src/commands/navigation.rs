use classnotes_core::services::ViewState;

use super::common::print_json;
use crate::context::ClientContext;
use crate::error::CliError;

pub async fn run_status(json: bool, ctx: &ClientContext) -> Result<(), CliError> {
    let dashboard = ctx.dashboard().await?;
    if json {
        return print_json(dashboard.view());
    }

    println!("Signed in as {}", dashboard.welcome_name());
    match dashboard.view() {
        ViewState::NoClassSelected => {
            println!("No class open ({} classes)", dashboard.classes.len());
        }
        ViewState::ClassSelected { class } => {
            println!("Class:   {} [{}]", class.name, class.invite_code);
            println!("{} subjects, none open", dashboard.subjects.len());
        }
        ViewState::SubjectSelected { class, subject } => {
            println!("Class:   {} [{}]", class.name, class.invite_code);
            println!("Subject: {} {}", subject.icon, subject.name);
            println!("{} notes", dashboard.notes.len());
        }
    }
    Ok(())
}

pub async fn run_back(ctx: &ClientContext) -> Result<(), CliError> {
    let mut dashboard = ctx.dashboard().await?;
    dashboard.back();
    ctx.remember_view(&dashboard)?;
    match dashboard.view().class() {
        Some(class) => println!("Back in class '{}'", class.name),
        None => println!("Back to your classes"),
    }
    Ok(())
}
