use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Terminal console for the charging-station service desk
#[derive(Parser, Debug)]
#[command(name = "servicedesk", author, version, about, long_about = None)]
pub struct Args {
    /// API base URL, overriding the configured or derived one
    #[arg(long, global = true, env = "SERVICEDESK_API_URL")]
    pub api_url: Option<String>,

    /// Path to an alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: Option<String>,
        /// Password; prompted for when omitted
        #[arg(long, env = "SERVICEDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Change the signed-in user's password
    Passwd,
    /// Inspect or write the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Work with tickets
    #[command(subcommand)]
    Tickets(TicketCommand),
    /// Look up charging stations
    #[command(subcommand)]
    Stations(StationCommand),
    /// Search the knowledge base
    #[command(subcommand)]
    Kb(KbCommand),
    /// Read and dismiss notifications
    #[command(subcommand)]
    Notifications(NotificationCommand),
    /// Run the AI log analyzer over a station log file
    AnalyzeLog {
        file: PathBuf,
        #[arg(long)]
        language: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration and resolved API URL
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct TicketFilters {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only tickets assigned to me
    #[arg(long, default_value_t = false)]
    pub mine: bool,
    /// Only tickets delegated to me
    #[arg(long, default_value_t = false)]
    pub delegated: bool,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub per_page: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum TicketCommand {
    /// List tickets
    List(TicketFilters),
    /// Show a ticket with its comments and history
    Show { id: i64 },
    /// Open a new ticket
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        station_id: Option<i64>,
        #[arg(long)]
        port: Option<i32>,
        #[arg(long)]
        reporter_name: Option<String>,
        #[arg(long)]
        reporter_phone: Option<String>,
        #[arg(long)]
        incident_type: Option<String>,
    },
    /// Change a ticket's status
    Status {
        id: i64,
        status: String,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Assign a ticket to a user, or unassign it without --user
    Assign {
        id: i64,
        #[arg(long)]
        user: Option<i64>,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Hand a ticket over to another department
    Delegate {
        id: i64,
        #[arg(long)]
        department: i64,
        #[arg(long)]
        user: Option<i64>,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Add a comment
    Comment {
        id: i64,
        text: String,
        /// Hide the comment from external parties
        #[arg(long, default_value_t = false)]
        internal: bool,
    },
    /// Attach a file
    Attach { id: i64, file: PathBuf },
    /// Upload a station log file
    UploadLog {
        id: i64,
        file: PathBuf,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Download a previously uploaded log
    DownloadLog {
        id: i64,
        log_id: i64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Let the backend extract ticket fields from a customer message
    Parse { message: String },
    /// Export matching tickets as a spreadsheet
    Export {
        #[command(flatten)]
        filters: TicketFilters,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum StationCommand {
    /// Search stations by id, name or address
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a station and its ports
    Show { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum KbCommand {
    /// Ranked search over articles
    Search {
        query: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show an article
    Show { id: i64 },
    /// List article categories
    Categories,
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    /// List notifications
    List {
        #[arg(long, default_value_t = false)]
        unread: bool,
    },
    /// Mark one notification as read
    Read { id: i64 },
    /// Mark all notifications as read
    ReadAll,
}
