//! Clap derive structures for the `iotlab` CLI.
//!
//! Defines the command tree and global flags. Kept free of crate
//! dependencies so build.rs can include it for man page generation.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// iotlab -- drive FIT IoT-LAB experiments from the command line
#[derive(Debug, Parser)]
#[command(
    name = "iotlab",
    version,
    about = "Manage FIT IoT-LAB testbed experiments from the command line",
    long_about = "Submit and control experiments, nodes and monitoring profiles\n\
        on the FIT IoT-LAB testbed through its REST API.",
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
    /// Testbed username
    #[arg(long = "user", short = 'u', global = true)]
    pub user: Option<String>,

    /// Testbed password (prefer `iotlab auth` and the keyring)
    #[arg(long, short = 'p', global = true)]
    pub password: Option<String>,

    /// REST API root URL
    #[arg(long, env = "IOTLAB_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format [default: json, or `output` from the config file]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Table for `items` lists, JSON otherwise
    Table,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store credentials (username in config, password in keyring)
    Auth,

    /// List testbed sites
    Sites,

    /// Submit, inspect and stop experiments
    #[command(alias = "exp")]
    Experiment(ExperimentArgs),

    /// Start, stop, reset and flash experiment nodes
    Node(NodeArgs),

    /// Manage monitoring profiles
    Profile(ProfileArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Experiments ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExperimentArgs {
    #[command(subcommand)]
    pub command: ExperimentCommand,
}

#[derive(Debug, Subcommand)]
pub enum ExperimentCommand {
    /// Describe testbed resources
    Info {
        /// Compact node id lists (e.g. `m3-1-12+35`) instead of full details
        #[arg(long)]
        list_id: bool,

        /// Restrict to one site
        #[arg(long)]
        site: Option<String>,
    },

    /// List your experiments
    List {
        /// Experiment state filter
        #[arg(long, default_value = "Running")]
        state: String,

        /// Maximum number of experiments (0 = no limit)
        #[arg(long, default_value = "0")]
        limit: u32,

        /// Number of experiments to skip
        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Submit a new experiment
    Submit(SubmitArgs),

    /// Show one experiment
    #[command(group(
        ArgGroup::new("what")
            .args(["print", "resources", "resources_id", "state", "archive"])
    ))]
    Get {
        /// Experiment id [default: your running experiment]
        #[arg(long, short = 'i')]
        id: Option<u32>,

        /// Experiment submission (default)
        #[arg(long)]
        print: bool,

        /// Experiment resources
        #[arg(long, short = 'r')]
        resources: bool,

        /// Experiment resources as compact id lists
        #[arg(long)]
        resources_id: bool,

        /// Experiment state
        #[arg(long, short = 's')]
        state: bool,

        /// Download the experiment archive to `<id>.tar.gz`
        #[arg(long, short = 'a')]
        archive: bool,
    },

    /// Stop an experiment
    Stop {
        /// Experiment id [default: your running experiment]
        #[arg(long, short = 'i')]
        id: Option<u32>,
    },
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Experiment duration in minutes
    #[arg(long, short = 'd', required_unless_present = "from_file")]
    pub duration: Option<u32>,

    /// Experiment name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Scheduled start (UNIX timestamp)
    #[arg(long, short = 'r')]
    pub reservation: Option<u64>,

    /// Node network addresses (repeatable or comma-separated)
    #[arg(
        long = "list",
        short = 'l',
        value_delimiter = ',',
        required_unless_present = "from_file"
    )]
    pub nodes: Vec<String>,

    /// Firmware to flash on every node
    #[arg(long)]
    pub firmware: Option<PathBuf>,

    /// Monitoring profile to apply on every node
    #[arg(long)]
    pub profile: Option<String>,

    /// Submit a ready-made JSON experiment description
    #[arg(long, conflicts_with_all = ["duration", "name", "reservation", "nodes", "profile"])]
    pub from_file: Option<PathBuf>,
}

// ── Nodes ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodeCommand {
    /// Power nodes on
    Start(NodeTarget),

    /// Power nodes off
    Stop(NodeTarget),

    /// Reset nodes
    Reset(NodeTarget),

    /// Flash a firmware
    Update {
        /// Firmware file
        firmware: PathBuf,

        #[command(flatten)]
        target: NodeTarget,
    },
}

#[derive(Debug, Args)]
pub struct NodeTarget {
    /// Experiment id [default: your running experiment]
    #[arg(long, short = 'i')]
    pub id: Option<u32>,

    /// Node network addresses [default: all experiment nodes]
    #[arg(long = "list", short = 'l', value_delimiter = ',')]
    pub nodes: Vec<String>,
}

// ── Profiles ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show one profile or list them all
    #[command(group(ArgGroup::new("which").args(["name", "list"]).required(true)))]
    Get {
        /// Profile name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// List all profiles
        #[arg(long, short = 'l')]
        list: bool,
    },

    /// Delete a profile
    Del {
        /// Profile name
        #[arg(long, short = 'n')]
        name: String,
    },

    /// Upload a profile from a JSON file (must contain `profilename`)
    Load {
        /// Profile JSON file
        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    /// Build and upload an m3 profile
    #[command(name = "addm3")]
    AddM3(M3ProfileArgs),

    /// Build and upload an a8 profile
    #[command(name = "adda8")]
    AddA8(M3ProfileArgs),

    /// Build and upload a wsn430 profile
    #[command(name = "addwsn430")]
    AddWsn430(Wsn430ProfileArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerArg {
    Dc,
    Battery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MeasureArg {
    Power,
    Voltage,
    Current,
}

#[derive(Debug, Args)]
pub struct ProfileBase {
    /// Profile name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Power source
    #[arg(long, value_enum, default_value_t = PowerArg::Dc)]
    pub power: PowerArg,

    /// Print the profile JSON instead of uploading it
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Consumption quantities to record (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',', help_heading = "Consumption")]
    pub consumption: Vec<MeasureArg>,
}

#[derive(Debug, Args)]
pub struct M3ProfileArgs {
    #[command(flatten)]
    pub base: ProfileBase,

    /// Consumption sampling period in µs
    #[arg(long, help_heading = "Consumption")]
    pub period: Option<u32>,

    /// Consumption samples averaged per value
    #[arg(long = "avg", help_heading = "Consumption")]
    pub average: Option<u32>,

    /// Record RSSI
    #[arg(long, requires_all = ["channels", "rperiod"], help_heading = "Radio")]
    pub rssi: bool,

    /// Channels to sweep, 11 to 26 (comma-separated)
    #[arg(long, value_delimiter = ',', requires = "rssi", help_heading = "Radio")]
    pub channels: Vec<u8>,

    /// RSSI measure period, 1 to 65535
    #[arg(long, requires = "rssi", help_heading = "Radio")]
    pub rperiod: Option<u32>,

    /// Measures per channel
    #[arg(long = "num", default_value_t = 0, help_heading = "Radio")]
    pub num_per_channel: u8,
}

#[derive(Debug, Args)]
pub struct Wsn430ProfileArgs {
    #[command(flatten)]
    pub base: ProfileBase,

    /// Consumption sampling frequency in ms
    #[arg(long, help_heading = "Consumption")]
    pub cfreq: Option<u32>,

    /// Radio sampling frequency in ms
    #[arg(long, help_heading = "Radio")]
    pub rfreq: Option<u32>,

    /// Sensor sampling frequency in ms
    #[arg(long, help_heading = "Sensors")]
    pub sfreq: Option<u32>,

    /// Record temperature
    #[arg(long, help_heading = "Sensors")]
    pub temperature: bool,

    /// Record luminosity
    #[arg(long, help_heading = "Sensors")]
    pub luminosity: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
