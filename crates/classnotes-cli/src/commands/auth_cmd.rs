use classnotes_core::services::{AuthMode, AuthScreen, AuthenticatedUser};

use crate::cli::AuthCommands;
use crate::context::ClientContext;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, ctx: &ClientContext) -> Result<(), CliError> {
    match command {
        AuthCommands::Signup {
            email,
            password,
            full_name,
            username,
        } => {
            let mut screen = AuthScreen::sign_up_form(email, password, full_name, username);
            let user = submit(&mut screen, ctx).await?;
            print_banner(&screen);
            if user.session.is_none() {
                println!("Run `classnotes auth login` once your address is confirmed.");
            }
            Ok(())
        }
        AuthCommands::Login { email, password } => {
            let mut screen = AuthScreen::with_credentials(AuthMode::Login, email, password);
            let user = submit(&mut screen, ctx).await?;
            print_banner(&screen);
            if ctx.db.get_user(&user.user_id).await?.is_none() {
                tracing::warn!("No profile for {} in this database", user.user_id);
                println!(
                    "Signed in, but this database has no profile for {}; classes cannot be created from it.",
                    user.email
                );
            }
            Ok(())
        }
        AuthCommands::Status => {
            match ctx.current_user().await? {
                Some(user) => {
                    let expires = user
                        .session
                        .as_ref()
                        .map_or(0, |session| session.expires_at);
                    println!(
                        "Profile '{}' is signed in as {} via {} (expires_at={})",
                        ctx.profile_name,
                        user.email,
                        ctx.provider.label(),
                        expires
                    );
                }
                None => println!("Profile '{}' is not signed in.", ctx.profile_name),
            }
            Ok(())
        }
        AuthCommands::Logout => {
            if let Some(session) = ctx.stored_session()? {
                let mut screen = AuthScreen::new(AuthMode::Login);
                screen.sign_out(&ctx.provider, &session).await;
                if let Some(error) = screen.error() {
                    tracing::warn!("Provider sign-out failed: {}", error);
                }
            }
            ctx.forget_session()?;
            println!("Signed out profile '{}'", ctx.profile_name);
            Ok(())
        }
    }
}

async fn submit(
    screen: &mut AuthScreen,
    ctx: &ClientContext,
) -> Result<AuthenticatedUser, CliError> {
    let Some(user) = screen.submit(&ctx.provider, &ctx.db).await else {
        let message = screen.error().unwrap_or("Authentication failed").to_string();
        return Err(CliError::Auth(message));
    };

    if let Some(session) = user.session.as_ref() {
        ctx.save_session(session)?;
    }
    Ok(user)
}

fn print_banner(screen: &AuthScreen) {
    if let Some(message) = screen.success() {
        println!("{message}");
    }
}
