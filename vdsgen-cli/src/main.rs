//! vdsgen CLI
//!
//! Combines per-stripe HDF5 files into one virtual dataset.
#![allow(clippy::uninlined_format_args)]

use clap::{ArgGroup, Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use vdsgen_core::{GeneratorConfig, GeneratorOptions, StackAxis};
use vdsgen_io::Hdf5Store;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Core(#[from] vdsgen_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Axis to stack fragments along.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Stack {
    /// Stack image rows with stripe and module gaps
    Rows,
    /// Concatenate along the leading frame dimension
    Frames,
}

impl From<Stack> for StackAxis {
    fn from(stack: Stack) -> Self {
        match stack {
            Stack::Rows => Self::Rows,
            Stack::Frames => Self::Frames,
        }
    }
}

/// Generate a virtual dataset from individual HDF5 stripe files.
#[derive(Parser, Debug)]
#[command(name = "vdsgen")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("selection").required(true).args(["prefix", "files"])))]
struct Cli {
    /// Root folder of source files and VDS
    path: PathBuf,

    /// Prefix of files to search <PATH> for - e.g 'stripe_' to combine
    /// 'stripe_1.hdf5' and 'stripe_2.hdf5'
    #[arg(short, long)]
    prefix: Option<String>,

    /// Explicit names of raw files in <PATH>
    #[arg(short, long, num_args = 1..)]
    files: Option<Vec<String>>,

    /// Make empty VDS pointing to datasets that don't exist yet
    #[arg(short, long, requires = "files")]
    empty: bool,

    /// Shape of dataset - 'frames height width', where frames is N dimensional
    #[arg(long, num_args = 2.., requires = "empty")]
    shape: Option<Vec<usize>>,

    /// Data type of raw datasets
    #[arg(long, requires = "empty")]
    data_type: Option<String>,

    /// Output file name. Default is input file prefix with vds suffix
    #[arg(short, long)]
    output: Option<String>,

    /// Spacing between two stripes in a module
    #[arg(short, long)]
    stripe_spacing: Option<usize>,

    /// Spacing between two modules
    #[arg(short, long)]
    module_spacing: Option<usize>,

    /// Data node in source HDF5 files
    #[arg(long)]
    source_node: Option<String>,

    /// Data node in VDS file
    #[arg(long)]
    target_node: Option<String>,

    /// Axis to stack fragments along
    #[arg(long, value_enum)]
    stack: Option<Stack>,

    /// Print the planned mappings as JSON without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Off
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    fn into_options(self) -> GeneratorOptions {
        GeneratorOptions {
            root: self.path,
            prefix: self.prefix,
            files: self.files,
            output: self.output,
            empty: self.empty,
            shape: self.shape,
            data_type: self.data_type,
            stripe_spacing: self.stripe_spacing,
            module_spacing: self.module_spacing,
            source_node: self.source_node,
            target_node: self.target_node,
            stack: self.stack.map(StackAxis::from),
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let dry_run = cli.dry_run;
    let config = GeneratorConfig::resolve(cli.into_options())?;
    let mut store = Hdf5Store::new();

    if dry_run {
        let plan = vdsgen_core::plan(&store, &config)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let (plan, mode) = vdsgen_core::generate(&mut store, &config)?;
    println!(
        "Created {} {:?} at {}:{} ({} mode)",
        plan.element_type,
        plan.layout.target_shape,
        plan.output_file.display(),
        plan.target_node,
        mode
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
