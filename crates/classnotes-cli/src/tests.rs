use clap::Parser;
use classnotes_core::config::ClientConfig;
use classnotes_core::markdown::MarkdownFormat;
use classnotes_core::models::{AuthorSummary, CommentWithAuthor};
use classnotes_core::services::{DatabaseService, ViewState};
use classnotes_core::{Class, ClassId, Comment, NoteId, ShareType, SubjectId, UserId};
use pretty_assertions::assert_eq;

use crate::cli::{
    AuthCommands, ClassCommands, Cli, Commands, CompletionShell, NoteCommands, SubjectCommands,
};
use crate::commands::auth_cmd::run_auth;
use crate::commands::class::run_class;
use crate::commands::comment::resolve_comment_id;
use crate::commands::common::{
    format_relative_time, join_words, resolve_class, truncate_line,
};
use crate::commands::completions::render_completions;
use crate::commands::config::mask_key;
use crate::commands::navigation::run_back;
use crate::commands::note::run_note;
use crate::commands::subject::run_subject;
use crate::context::{restore_navigation, ClientContext};
use crate::error::CliError;
use crate::session::{NavigationState, ProfilePaths};

#[test]
fn format_relative_time_units() {
    let now = 10_000_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
}

#[test]
fn truncate_line_collapses_whitespace() {
    assert_eq!(truncate_line("  lecture   one  ", 40), "lecture one");
    assert_eq!(truncate_line("abcdefghij", 8), "abcde...");
}

#[test]
fn join_words_rejects_blank_input() {
    assert_eq!(
        join_words(&["Linear".to_string(), "Algebra".to_string()], "Class name").unwrap(),
        "Linear Algebra"
    );
    assert!(matches!(
        join_words(&[" ".to_string()], "Class name"),
        Err(CliError::EmptyArgument("Class name"))
    ));
}

fn class_named(name: &str, code: &str) -> Class {
    Class::new(name, code.to_string(), UserId::new())
}

#[test]
fn resolve_class_by_name_code_or_prefix() {
    let classes = vec![class_named("Physics", "ABC123"), class_named("Poetry", "XYZ789")];

    assert_eq!(resolve_class(&classes, "physics").unwrap().name, "Physics");
    assert_eq!(resolve_class(&classes, "xyz789").unwrap().name, "Poetry");
    let prefix = classes[1].id.to_string()[..32].to_string();
    assert_eq!(resolve_class(&classes, &prefix).unwrap().name, "Poetry");
    assert!(matches!(
        resolve_class(&classes, "Chemistry"),
        Err(CliError::ClassNotFound(_))
    ));
}

#[test]
fn resolve_class_reports_ambiguity() {
    let classes = vec![class_named("Math", "AAAAAA"), class_named("math", "BBBBBB")];
    assert!(matches!(
        resolve_class(&classes, "MATH"),
        Err(CliError::Ambiguous(_))
    ));
}

#[test]
fn resolve_comment_id_accepts_unique_prefix() {
    let comment = CommentWithAuthor {
        comment: Comment::new(NoteId::new(), "hi", UserId::new(), None),
        author: Some(AuthorSummary {
            id: UserId::new(),
            full_name: "Ada".to_string(),
            username: "ada".to_string(),
        }),
    };
    let id = comment.comment.id;
    let prefix = id.to_string()[..32].to_string();

    assert_eq!(resolve_comment_id(&[comment.clone()], &prefix).unwrap(), id);
    assert_eq!(resolve_comment_id(&[], &id.to_string()).unwrap(), id);
    assert!(resolve_comment_id(&[comment], "zzz").is_err());
}

#[test]
fn mask_key_hides_middle() {
    assert_eq!(mask_key("abcdefghijkl"), "abcd...ijkl");
    assert_eq!(mask_key("short"), "*****");
}

#[test]
fn completions_name_the_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("classnotes"));
}

#[test]
fn cli_parses_format_and_share_arguments() {
    let cli = Cli::try_parse_from(["classnotes", "note", "format", "abc", "bold", "--text", "hi"])
        .unwrap();
    match cli.command {
        Some(Commands::Note {
            command: NoteCommands::Format { format, text, .. },
        }) => {
            assert_eq!(format, MarkdownFormat::Bold);
            assert_eq!(text.as_deref(), Some("hi"));
        }
        _ => panic!("expected note format"),
    }

    let cli = Cli::try_parse_from(["classnotes", "share", "abc", "b@example.com"]).unwrap();
    match cli.command {
        Some(Commands::Share { share_type, .. }) => assert_eq!(share_type, ShareType::View),
        _ => panic!("expected share"),
    }

    assert!(Cli::try_parse_from(["classnotes", "note", "format", "abc", "underline"]).is_err());
    assert!(
        Cli::try_parse_from(["classnotes", "note", "format", "abc", "h1", "--start", "1"]).is_err()
    );
}

async fn local_context(dir: &std::path::Path) -> ClientContext {
    let db = DatabaseService::open_in_memory().await.unwrap();
    ClientContext::new(
        "test".to_string(),
        &ClientConfig::default(),
        ProfilePaths::for_profile(dir, "test"),
        db,
    )
    .unwrap()
}

async fn sign_up(ctx: &ClientContext) {
    run_auth(
        AuthCommands::Signup {
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
            full_name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
        },
        ctx,
    )
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn commands_require_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = local_context(dir.path()).await;

    assert_eq!(ctx.provider.label(), "local");
    assert!(ctx.current_user().await.unwrap().is_none());
    assert!(matches!(
        run_class(ClassCommands::List { json: false }, &ctx).await,
        Err(CliError::NotSignedIn)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_login_surfaces_provider_message() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = local_context(dir.path()).await;

    let error = run_auth(
        AuthCommands::Login {
            email: "nobody@example.com".to_string(),
            password: "secret1".to_string(),
        },
        &ctx,
    )
    .await
    .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Authentication error: Invalid login credentials"
    );
    assert!(ctx.stored_session().unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn signup_with_taken_username_can_be_retried() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = local_context(dir.path()).await;
    sign_up(&ctx).await;
    ctx.forget_session().unwrap();

    let signup = |email: &str, username: &str| AuthCommands::Signup {
        email: email.to_string(),
        password: "secret1".to_string(),
        full_name: "Grace Hopper".to_string(),
        username: username.to_string(),
    };
    let error = run_auth(signup("grace@example.com", "Ada"), &ctx)
        .await
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Authentication error: Username is already taken"
    );
    assert!(ctx.stored_session().unwrap().is_none());

    run_auth(signup("grace@example.com", "grace"), &ctx)
        .await
        .unwrap();
    run_class(
        ClassCommands::Create {
            name: vec!["Compilers".to_string()],
        },
        &ctx,
    )
    .await
    .unwrap();
    let dashboard = ctx.dashboard().await.unwrap();
    assert_eq!(dashboard.welcome_name(), "Grace Hopper");
    assert_eq!(dashboard.classes[0].name, "Compilers");
}

#[tokio::test(flavor = "multi_thread")]
async fn navigation_survives_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = local_context(dir.path()).await;
    sign_up(&ctx).await;
    assert!(ctx.stored_session().unwrap().is_some());

    run_class(
        ClassCommands::Create {
            name: vec!["Physics".to_string()],
        },
        &ctx,
    )
    .await
    .unwrap();
    run_class(
        ClassCommands::Open {
            class: "physics".to_string(),
        },
        &ctx,
    )
    .await
    .unwrap();
    run_subject(
        SubjectCommands::Add {
            name: vec!["Optics".to_string()],
        },
        &ctx,
    )
    .await
    .unwrap();
    run_subject(
        SubjectCommands::Open {
            subject: "Optics".to_string(),
        },
        &ctx,
    )
    .await
    .unwrap();

    let dashboard = ctx.dashboard().await.unwrap();
    assert_eq!(dashboard.view().class().unwrap().name, "Physics");
    assert_eq!(dashboard.view().subject().unwrap().name, "Optics");

    run_back(&ctx).await.unwrap();
    let dashboard = ctx.dashboard().await.unwrap();
    assert!(matches!(dashboard.view(), ViewState::ClassSelected { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn note_save_records_history() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = local_context(dir.path()).await;
    sign_up(&ctx).await;
    run_class(
        ClassCommands::Create {
            name: vec!["Physics".to_string()],
        },
        &ctx,
    )
    .await
    .unwrap();
    run_class(
        ClassCommands::Open {
            class: "Physics".to_string(),
        },
        &ctx,
    )
    .await
    .unwrap();
    run_subject(
        SubjectCommands::Add {
            name: vec!["Optics".to_string()],
        },
        &ctx,
    )
    .await
    .unwrap();
    run_subject(
        SubjectCommands::Open {
            subject: "optics".to_string(),
        },
        &ctx,
    )
    .await
    .unwrap();
    run_note(
        NoteCommands::Create {
            title: vec!["Lenses".to_string()],
        },
        &ctx,
    )
    .await
    .unwrap();

    let note_id = ctx.dashboard().await.unwrap().notes[0].id;
    let prefix = note_id.to_string()[..32].to_string();
    run_note(
        NoteCommands::Save {
            id: prefix.clone(),
            content: vec!["say".to_string(), "hello".to_string()],
        },
        &ctx,
    )
    .await
    .unwrap();
    run_note(
        NoteCommands::Format {
            id: prefix,
            format: MarkdownFormat::Bold,
            text: Some("hello".to_string()),
            start: None,
            end: None,
        },
        &ctx,
    )
    .await
    .unwrap();

    let note = ctx.db.get_note(&note_id).await.unwrap().unwrap();
    assert_eq!(note.content, "say **hello**");
    let history = ctx.db.list_history(&note_id, 20).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].history.content_before.as_deref(), Some("say hello"));
    assert_eq!(history[1].history.content_before.as_deref(), Some(""));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_remembered_ids_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = local_context(dir.path()).await;
    sign_up(&ctx).await;

    let mut dashboard = ctx.dashboard().await.unwrap();
    let stale = NavigationState {
        class_id: Some(ClassId::new()),
        subject_id: Some(SubjectId::new()),
    };
    restore_navigation(&mut dashboard, &ctx.db, &stale)
        .await
        .unwrap();
    assert_eq!(dashboard.view(), &ViewState::NoClassSelected);
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_forgets_session_and_navigation() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = local_context(dir.path()).await;
    sign_up(&ctx).await;
    run_class(
        ClassCommands::Create {
            name: vec!["Physics".to_string()],
        },
        &ctx,
    )
    .await
    .unwrap();
    run_class(
        ClassCommands::Open {
            class: "Physics".to_string(),
        },
        &ctx,
    )
    .await
    .unwrap();
    let session = ctx.stored_session().unwrap().unwrap();

    run_auth(AuthCommands::Logout, &ctx).await.unwrap();

    assert!(ctx.current_user().await.unwrap().is_none());
    assert!(!ctx.paths.state_file.exists());
    assert!(ctx
        .db
        .find_auth_session(&session.access_token, 0)
        .await
        .unwrap()
        .is_none());
}
