use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use truename_lib::NamingMode;

#[derive(Debug, Parser)]
#[command(name = "truename")]
#[command(about = "Rename files after what they contain", long_about = None)]
pub struct Cli {
    /// Settings file [default: ./truename.json]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Propose new names without touching any file
    Generate(RunArgs),
    /// Propose new names, then rename after confirmation
    Rename {
        #[command(flatten)]
        run: RunArgs,
        /// Rename without asking and do not offer to revert
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the effective configuration
    PrintConfig,
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Files or folders to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Descend into subfolders
    #[arg(short, long)]
    pub recursive: bool,

    /// Naming strategy for text documents
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Frequency,
    Summary,
}

impl From<ModeArg> for NamingMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Frequency => NamingMode::Frequency,
            ModeArg::Summary => NamingMode::Summary,
        }
    }
}
