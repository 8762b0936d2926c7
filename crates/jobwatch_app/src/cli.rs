use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "jobwatch",
    version,
    about = "Watch a server-side data-load job until it finishes"
)]
pub struct Cli {
    /// Job handle to watch, e.g. pipeline_20240101.
    #[arg(required_unless_present = "print_config")]
    pub handle: Option<String>,

    /// RON config file. Defaults to ./jobwatch.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API root serving GET /progress/{handle}.
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Offset from UTC for displayed log times.
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset_minutes: Option<i32>,

    /// Exit as soon as the job finishes instead of waiting for Enter.
    #[arg(long)]
    pub no_wait: bool,

    /// Raise the log level; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the effective configuration as RON and exit.
    #[arg(long)]
    pub print_config: bool,
}
