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
    about = "molsel - inspect, select, and mutate molecular structures from the command line.",
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

    /// Path to a TOML configuration file (collision distance, user macros)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print atom, residue, chain, and frame counts for a structure.
    Info(InfoArgs),
    /// Evaluate a selection expression and report (or print) the matches.
    Select(SelectArgs),
    /// Keep only the atoms matching a selection and write the result.
    Filter(FilterArgs),
    /// Rename whole residues matched by a selection.
    Mutate(MutateArgs),
    /// Print the single-letter sequence of each chain.
    Sequence(SequenceArgs),
    /// Concatenate a second structure onto the first.
    Append(AppendArgs),
    /// Translate and/or rotate all coordinates of a structure.
    Transform(TransformArgs),
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the input structure file (PDB).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Path to the input structure file (PDB).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Selection expression, e.g. 'resname CYS and name CA'.
    #[arg(short, long, value_name = "SELECTION")]
    pub expr: String,

    /// Also print this attribute for every matched atom (e.g. 'resid').
    #[arg(long, value_name = "FIELD")]
    pub print: Option<String>,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Path to the input structure file (PDB).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Selection expression for the atoms to keep.
    #[arg(short, long, value_name = "SELECTION")]
    pub expr: String,

    /// Path for the output structure file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct MutateArgs {
    /// Path to the input structure file (PDB).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Selection covering the residues to rename (whole residues only).
    #[arg(short, long, value_name = "SELECTION")]
    pub expr: String,

    /// New residue name, e.g. 'HSE'.
    #[arg(long, value_name = "RESNAME")]
    pub to: String,

    /// Path for the output structure file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct SequenceArgs {
    /// Path to the input structure file (PDB).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Path to the input structure file (PDB).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to the structure to append.
    #[arg(value_name = "OTHER")]
    pub other: PathBuf,

    /// Drop incoming atoms that collide with existing ones.
    #[arg(long)]
    pub collisions: bool,

    /// Path for the output structure file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Path to the input structure file (PDB).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Translation vector as 'x,y,z' (Angstroms).
    #[arg(long, value_name = "X,Y,Z")]
    pub translate: Option<String>,

    /// Rotation as 'axis=degrees' with axis one of x, y, z.
    #[arg(long, value_name = "AXIS=DEG")]
    pub rotate: Option<String>,

    /// Rotation center as 'x,y,z' (defaults to the origin).
    #[arg(long, value_name = "X,Y,Z")]
    pub center: Option<String>,

    /// Path for the output structure file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
