use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use classnotes_core::markdown::MarkdownFormat;
use classnotes_core::ShareType;

#[derive(Parser)]
#[command(name = "classnotes")]
#[command(about = "Share class notes with your classmates from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name for auth configuration and saved session
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign up, sign in and out
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Manage CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Classes you belong to
    Class {
        #[command(subcommand)]
        command: ClassCommands,
    },
    /// Subjects of the open class
    Subject {
        #[command(subcommand)]
        command: SubjectCommands,
    },
    /// Notes of the open subject
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Images attached to a note
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Links attached to a note
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Comments on a note
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Share a note with another user
    Share {
        /// Note ID or unique ID prefix
        note: String,
        /// Email of the user to share with
        email: String,
        /// Permission to grant
        #[arg(long = "as", value_parser = parse_share_type, default_value = "view")]
        share_type: ShareType,
    },
    /// Show where you are: open class and subject
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Leave the open subject, or the open class when no subject is open
    Back,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account and its profile
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        username: String,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the signed-in user for the active profile
    Status,
    /// Sign out and forget the saved session
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update a profile
    Init {
        /// Supabase project URL (local accounts are used when omitted)
        #[arg(long)]
        supabase_url: Option<String>,
        /// Supabase anon key
        #[arg(long)]
        supabase_anon_key: Option<String>,
        /// Database file for this profile
        #[arg(long = "database", value_name = "PATH")]
        database: Option<PathBuf>,
        /// Keep the currently active profile
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand)]
pub enum ClassCommands {
    /// List your classes, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a class; you become its admin
    Create {
        /// Class name
        name: Vec<String>,
    },
    /// Join a class with its invite code
    Join {
        /// Six character invite code
        code: String,
    },
    /// Open a class by ID prefix, name or invite code
    Open {
        class: String,
    },
    /// List the members of the open class
    Members {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum SubjectCommands {
    /// List subjects of the open class, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a subject to the open class
    Add {
        /// Subject name
        name: Vec<String>,
    },
    /// Open a subject by ID prefix or name
    Open {
        subject: String,
    },
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// List notes of the open subject, most recently updated first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an empty note in the open subject
    Create {
        /// Note title
        title: Vec<String>,
    },
    /// Show a note with its attachments and comments
    Show {
        /// Note ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace a note's content and record the edit
    #[command(alias = "edit")]
    Save {
        /// Note ID or unique ID prefix
        id: String,
        /// New content (stdin or $EDITOR when omitted)
        content: Vec<String>,
    },
    /// Apply Markdown formatting to part of a note and save it
    Format {
        /// Note ID or unique ID prefix
        id: String,
        /// bold, italic, h1, h2, list or ordered
        #[arg(value_parser = parse_markdown_format)]
        format: MarkdownFormat,
        /// First occurrence of this text is formatted
        #[arg(long, conflicts_with_all = ["start", "end"])]
        text: Option<String>,
        /// Byte offset where the selection starts
        #[arg(long, requires = "end")]
        start: Option<usize>,
        /// Byte offset where the selection ends
        #[arg(long, requires = "start")]
        end: Option<usize>,
    },
    /// Show the most recent edits of a note
    History {
        /// Note ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ImageCommands {
    /// Attach an image by file name
    Attach {
        /// Note ID or unique ID prefix
        note: String,
        /// Image file name
        file_name: String,
    },
    /// List images attached to a note
    List {
        /// Note ID or unique ID prefix
        note: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum LinkCommands {
    /// Attach a link to a note
    Add {
        /// Note ID or unique ID prefix
        note: String,
        /// Link URL
        url: String,
        /// Display title (defaults to the URL)
        #[arg(long)]
        title: Option<String>,
    },
    /// List links attached to a note
    List {
        /// Note ID or unique ID prefix
        note: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Comment on a note
    Add {
        /// Note ID or unique ID prefix
        note: String,
        /// Comment text
        content: Vec<String>,
        /// Reply to this comment ID
        #[arg(long, value_name = "COMMENT_ID")]
        reply_to: Option<String>,
    },
    /// List comments on a note as threads
    List {
        /// Note ID or unique ID prefix
        note: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn parse_markdown_format(value: &str) -> Result<MarkdownFormat, String> {
    value.parse()
}

fn parse_share_type(value: &str) -> Result<ShareType, String> {
    value.parse()
}
