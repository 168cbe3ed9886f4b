use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "report-importr",
    about = "Import license and copyright findings from a parsed report into a clearing database",
    version
)]
pub struct Cli {
    /// Parsed report (JSON) to import
    pub report: PathBuf,

    /// Clearing database file
    #[arg(long, default_value = ".report-importr/db.json")]
    pub db: PathBuf,

    /// Import config file [default: ./.report-importr/config.toml, fallback ~/.config/report-importr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Agent the findings are attributed to
    #[arg(long)]
    pub agent: i64,

    /// Group whose license scope is used
    #[arg(long)]
    pub group: i64,

    /// User the clearing decisions are attributed to
    #[arg(long)]
    pub user: i64,

    /// Job id stamped on events and candidate notes
    #[arg(long)]
    pub job: i64,

    /// Summary format
    #[arg(long = "summary", default_value = "terminal", value_name = "FORMAT")]
    pub summary_format: SummaryFormat,

    /// Run the import without saving the database
    #[arg(long)]
    pub dry_run: bool,

    /// Also list licenses that already existed
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum SummaryFormat {
    Terminal,
    Json,
}
