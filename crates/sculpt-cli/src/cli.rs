use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "sculpt - assemble molecular structures from coordinate records, \
             repair missing atoms from internal-coordinate templates, and \
             report design-site bookkeeping.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a structure from atom records, completing missing atoms.
    Assemble(AssembleArgs),
}

/// Arguments for the `assemble` subcommand.
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Path to the input coordinate file (fixed-column atom records).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the reassembled output structure; stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Directory holding residues.toml and patches.toml template files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Optional small-molecule ligand file to attach (tag-delimited format).
    #[arg(long, value_name = "PATH")]
    pub ligand: Option<PathBuf>,

    /// Optional amino-acid propensity table (CSV: aa,phi,psi,energy).
    #[arg(long, value_name = "PATH")]
    pub propensity_table: Option<PathBuf>,

    /// Optional Ramachandran energy table (CSV: aa,phi,psi,energy).
    #[arg(long, value_name = "PATH")]
    pub rama_table: Option<PathBuf>,

    /// Print the 20-bucket amino-acid composition tally.
    #[arg(long)]
    pub composition: bool,
}
