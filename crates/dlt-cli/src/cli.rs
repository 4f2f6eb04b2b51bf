use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "dlt-merge",
    about = "Merge package download directories into one",
    version,
)]
pub struct Cli {
    /// Directories to merge. All but the last are sources; the last is
    /// the destination they are merged into.
    #[arg(required = true, num_args = 2..)]
    pub dirs: Vec<PathBuf>,

    /// Move artifacts instead of copying, and remove the source
    /// directories afterwards.
    #[arg(short = 'm', long = "move")]
    pub move_files: bool,

    #[arg(short, long)]
    pub verbose: bool,

    /// No console output unless an error occurs.
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,
}
