use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface definition for rschedule
/// Live production schedule backed by SQLite
#[derive(Parser)]
#[command(
    name = "rschedule",
    version = env!("CARGO_PKG_VERSION"),
    about = "A live, row-editable production schedule: watch a work queue, edit jobs inline, print work orders",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Status flags a scheduler can set on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFlag {
    Running,
    Finished,
    Modifying,
}

impl StatusFlag {
    pub fn column(&self) -> &'static str {
        match self {
            StatusFlag::Running => "running",
            StatusFlag::Finished => "finished",
            StatusFlag::Modifying => "modifying",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagValue {
    On,
    Off,
    Unset,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,

        #[arg(
            long = "set",
            value_name = "KEY=VALUE",
            help = "Change one setting (e.g. prints_dir=~/prints)"
        )]
        set: Option<String>,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Schedule a new work order
    Add {
        /// Job number shown to operators
        job: String,

        #[arg(long = "ref", help = "Job reference used by the office system")]
        job_ref: String,

        #[arg(long, help = "Queue (machine) to schedule the job on")]
        queue: Option<String>,

        #[arg(long, default_value_t = 100, help = "Priority, 1 (first) to 999")]
        priority: i64,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        material: String,

        #[arg(long, default_value = "")]
        qty: String,

        #[arg(long, default_value = "")]
        notes: String,

        #[arg(long, default_value = "")]
        customer: String,

        #[arg(long, default_value = "", help = "Due date (free text, e.g. 2026-11-03)")]
        due: String,

        #[arg(
            long = "line",
            value_name = "PART;DESCRIPTION;QTY;MATERIAL",
            help = "Report line item (repeatable)"
        )]
        lines: Vec<String>,
    },

    /// Register a material in the catalogue
    Material { name: String },

    /// Set a status flag on a job
    Status {
        job: String,

        #[arg(value_enum)]
        flag: StatusFlag,

        #[arg(value_enum)]
        value: FlagValue,
    },

    /// Show a queue once
    List {
        /// Queue to show (default: `default_queue` setting)
        queue: Option<String>,

        #[arg(long, help = "Print the snapshot as JSON")]
        json: bool,
    },

    /// Keep a queue on screen, refreshing when it changes
    Watch {
        queue: Option<String>,

        #[arg(long, value_name = "MS", help = "Poll interval in milliseconds")]
        interval: Option<u64>,

        #[arg(long, value_name = "N", help = "Stop after N polls")]
        ticks: Option<usize>,

        #[arg(long, help = "Update changed rows only instead of redrawing")]
        diff: bool,
    },

    /// Edit a job's priority, material or quantity
    Edit {
        job: String,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        material: Option<String>,

        #[arg(long)]
        qty: Option<String>,
    },

    /// Hide a job from every queue
    Hide { job: String },

    /// Toggle a job's "modifying" flag
    Modify { job: String },

    /// Attach a PDF document to a job
    Upload {
        job: String,

        #[arg(long, value_name = "FILE")]
        file: Option<String>,
    },

    /// Open a job's document, or generate its work order
    Print { job: String },

    /// List catalogue materials starting with a prefix
    Materials {
        #[arg(default_value = "")]
        prefix: String,
    },
}
