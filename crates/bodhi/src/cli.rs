//! Clap derive structures for the `bodhi` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bodhi -- manage database connections and migration pipelines
#[derive(Debug, Parser)]
#[command(
    name = "bodhi",
    version,
    about = "Manage Bodhi database connections and migration pipelines",
    long_about = "Talks to a running Bodhi desktop backend over its command bridge.\n\n\
        Registers and persists database connections, and creates and starts\n\
        migration pipeline tasks.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "BODHI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Command bridge URL (overrides profile)
    #[arg(long, short = 'b', env = "BODHI_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BODHI_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BODHI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage database connections
    #[command(alias = "conn", alias = "c")]
    Connections(ConnectionsArgs),

    /// Manage migration pipeline tasks
    #[command(alias = "t")]
    Tasks(TasksArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONNECTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConnectionsArgs {
    #[command(subcommand)]
    pub command: ConnectionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConnectionsCommand {
    /// List persisted connection configs
    #[command(alias = "ls")]
    List,

    /// Show a single connection config
    Get {
        /// Connection ID
        id: String,
    },

    /// Register and persist a new connection
    Add(ConnectionFields),

    /// Update a registered connection
    Update {
        /// Connection ID
        id: String,

        #[command(flatten)]
        fields: ConnectionUpdate,
    },

    /// Tear down and delete a connection
    #[command(alias = "rm")]
    Remove {
        /// Connection ID
        id: String,
    },

    /// Check whether the backend can reach a connection
    Test {
        /// Connection ID
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DbTypeArg {
    Mysql,
    Postgresql,
    Redis,
}

#[derive(Debug, Args)]
pub struct ConnectionFields {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Database type
    #[arg(long = "type", value_enum)]
    pub db_type: DbTypeArg,

    /// Database host
    #[arg(long)]
    pub host: Option<String>,

    /// Database port (defaults per type)
    #[arg(long)]
    pub port: Option<u16>,

    /// Username
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Password
    #[arg(long, env = "BODHI_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name (MySQL) or numeric index (Redis)
    #[arg(long, short = 'd')]
    pub database: Option<String>,

    /// Use TLS
    #[arg(long)]
    pub ssl: bool,
}

#[derive(Debug, Args)]
pub struct ConnectionUpdate {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Database host
    #[arg(long)]
    pub host: Option<String>,

    /// Database port
    #[arg(long)]
    pub port: Option<u16>,

    /// Username
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Password
    #[arg(long, env = "BODHI_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name (MySQL) or numeric index (Redis)
    #[arg(long, short = 'd')]
    pub database: Option<String>,

    /// Enable or disable TLS
    #[arg(long)]
    pub ssl: Option<bool>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TASKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Debug, Subcommand)]
pub enum TasksCommand {
    /// List pipeline tasks
    #[command(alias = "ls")]
    List,

    /// Create a pipeline task
    Create {
        /// Task name
        #[arg(long)]
        name: String,

        /// Source connection ID
        #[arg(long)]
        source: String,

        /// Target connection ID
        #[arg(long)]
        target: String,

        /// Migration strategy ID
        #[arg(long)]
        strategy: String,
    },

    /// Start a pipeline task
    Start {
        /// Task ID
        id: String,
    },

    /// Fetch the latest state of a pipeline task
    Refresh {
        /// Task ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Add or replace a backend profile
    SetProfile {
        /// Profile name
        name: String,

        /// Command bridge URL
        #[arg(long)]
        backend: String,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
