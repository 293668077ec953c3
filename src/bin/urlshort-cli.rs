use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use urlshort::{RedirectFormat, RedirectTable};

#[derive(Parser)]
#[command(name = "urlshort-cli")]
#[command(about = "Inspect urlshort redirect documents", long_about = None)]
struct Cli {
    /// Document format; inferred from the file extension when omitted
    #[arg(short, long, global = true)]
    format: Option<RedirectFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a redirect document and print its table
    Check {
        file: PathBuf,
    },
    /// Show where a request path would be sent
    Resolve {
        file: PathBuf,
        /// Request path including any query string, e.g. /docs?v=2
        path: String,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            let table = load_table(&file, cli.format)?;
            for (path, url) in table.sorted() {
                println!("{path}\t{url}");
            }
            eprintln!("{} redirect(s) in {}", table.len(), file.display());
        }
        Commands::Resolve { file, path } => {
            let table = load_table(&file, cli.format)?;
            match table.lookup(&path) {
                Some(url) => println!("301 {path} -> {url}"),
                None => {
                    println!("{path} -> fallback");
                    return Ok(ExitCode::from(2));
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_table(
    file: &Path,
    format: Option<RedirectFormat>,
) -> Result<RedirectTable, Box<dyn std::error::Error>> {
    let format = format
        .or_else(|| RedirectFormat::from_path(file))
        .ok_or_else(|| format!("cannot infer format of {}; pass --format", file.display()))?;
    let bytes = std::fs::read(file)?;
    let entries = format.parse(&bytes)?;
    Ok(RedirectTable::from_entries(entries))
}
