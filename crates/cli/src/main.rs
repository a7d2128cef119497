mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// ria - bootstrap and inspect RIA stores
#[derive(Parser)]
#[command(name = "ria")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Verify a RIA URL and show what it resolves to
  Url {
    /// ria+ssh:// or ria+file:// URL, aliases are expanded
    url: String,
  },

  /// Initialize a RIA store
  InitStore {
    /// URL of the store
    url: String,

    /// Store layout version, optionally followed by |<flags>
    #[arg(long, default_value = "1")]
    layout: String,
  },

  /// Initialize a dataset inside a RIA store
  InitDataset {
    /// URL of the store
    url: String,

    /// Dataset ID
    dataset_id: String,

    /// Object tree layout version of the dataset
    #[arg(long, default_value = "2")]
    object_layout: String,

    /// Layout version of the store
    #[arg(long, default_value = "1")]
    store_layout: String,
  },

  /// Show where a dataset lives inside a store
  Locate {
    /// URL of the store
    url: String,

    /// Dataset ID
    dataset_id: String,

    /// Layout version of the store
    #[arg(long, default_value = "1")]
    store_layout: String,
  },

  /// Pack files into an archive
  Compress {
    /// Archive to create; *.tar.<ext> produces a compressed tarball
    archive: PathBuf,

    /// Files to add, relative to the working directory
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Run the archiver in this directory
    #[arg(short = 'C', long)]
    directory: Option<PathBuf>,

    /// Fail instead of replacing an existing archive
    #[arg(long)]
    no_clobber: bool,
  },

  /// Extract an archive
  Extract {
    /// Archive to extract
    archive: PathBuf,

    /// Directory to extract into
    #[arg(short = 'C', long, default_value = ".")]
    directory: PathBuf,
  },

  /// Show configuration and tool availability
  Info,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  // Initialize logging
  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let output = cli.output;
  let result = match cli.command {
    Commands::Url { url } => cmd::cmd_url(&url, output),
    Commands::InitStore { url, layout } => cmd::cmd_init_store(&url, &layout, output),
    Commands::InitDataset {
      url,
      dataset_id,
      object_layout,
      store_layout,
    } => cmd::cmd_init_dataset(&url, &dataset_id, &object_layout, &store_layout, output),
    Commands::Locate {
      url,
      dataset_id,
      store_layout,
    } => cmd::cmd_locate(&url, &dataset_id, &store_layout, output),
    Commands::Compress {
      archive,
      files,
      directory,
      no_clobber,
    } => cmd::cmd_compress(&archive, &files, directory.as_deref(), !no_clobber, output),
    Commands::Extract { archive, directory } => cmd::cmd_extract(&archive, &directory, output),
    Commands::Info => cmd::cmd_info(output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
