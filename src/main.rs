use anyhow::Result;
use clap::Parser;
use settleparse::{parse_files, Format};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Parse vendor settlement report files into JSON")]
struct Args {
    /// Report files, in their declared order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Delimiter override; inferred from the first file's extension if omitted
    #[arg(long)]
    format: Option<CliFormat>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum CliFormat {
    Tsv,
    Csv,
}

impl CliFormat {
    fn as_format(&self) -> Format {
        match self {
            CliFormat::Tsv => Format::Tsv,
            CliFormat::Csv => Format::Csv,
        }
    }
}

fn main() -> Result<()> {
    // ─── init logging ────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    info!(files = args.files.len(), "startup");

    match parse_files(&args.files, args.format.as_ref().map(CliFormat::as_format)) {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(err) => {
            error!(class = err.class(), "{err}");
            std::process::exit(match err.class() {
                500 => 2,
                _ => 1,
            });
        }
    }
}
