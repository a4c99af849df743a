use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "zeppelin", version, about = "Run and inspect notebook jobs on a Zeppelin server")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal, global = true)]
    pub log: LogTarget,

    /// Log at debug level instead of info.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// RON file holding a client config; flags below override it.
    #[arg(long, env = "ZEPPELIN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL, e.g. http://localhost:8080.
    #[arg(long, env = "ZEPPELIN_URL", global = true)]
    pub url: Option<String>,

    /// Milliseconds between two polls while waiting.
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// The server sits behind a Knox gateway.
    #[arg(long, global = true)]
    pub knox: bool,

    /// Log in as this user before running the command.
    #[arg(long, env = "ZEPPELIN_USER", global = true)]
    pub user: Option<String>,

    #[arg(long, env = "ZEPPELIN_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the server version.
    Version,
    /// Create an empty note and print its id.
    CreateNote {
        path: String,
        #[arg(long)]
        group: Option<String>,
    },
    DeleteNote {
        note: String,
    },
    /// Run a paragraph, optionally creating or replacing its text first.
    RunParagraph {
        #[arg(long)]
        note: String,
        /// Existing paragraph to run; a new one is appended when omitted.
        #[arg(long)]
        paragraph: Option<String>,
        /// Paragraph text, e.g. "%python print(1)".
        #[arg(long)]
        text: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        session: String,
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Return right after submission instead of waiting.
        #[arg(long)]
        no_wait: bool,
        /// Give up waiting after this many milliseconds.
        #[arg(long, conflicts_with = "no_wait")]
        timeout_ms: Option<u64>,
    },
    /// Run all paragraphs of a note.
    RunNote {
        #[arg(long)]
        note: String,
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        #[arg(long)]
        no_wait: bool,
    },
    QueryNote {
        note: String,
    },
    QueryParagraph {
        note: String,
        paragraph: String,
    },
    /// Request cancellation of a running paragraph.
    Cancel {
        note: String,
        paragraph: String,
    },
    NewSession {
        interpreter: String,
    },
    StopSession {
        interpreter: String,
        session: String,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}
