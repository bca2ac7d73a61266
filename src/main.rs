use bookwall::{config, output, pipeline};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bookwall")]
#[command(about = "Static book-cover page generator for e-book catalogs")]
#[command(long_about = "\
Static book-cover page generator for e-book catalogs

Reads a catalog export (Calibre's `calibredb catalog books.xml`) and writes a
single HTML page showing every book's cover. Hovering a cover reveals its
metadata and links to Google Books or Amazon.

Library structure:

  library/
  ├── bookwall.toml                # Optional config (overrides stock defaults)
  ├── books.xml                    # Catalog export
  ├── book-default-cover.jpg       # Placeholder for books without a cover
  └── Jane Austen/
      └── Emma (12)/
          └── cover.jpg            # Copied as covers/JaneAustenEmma12.jpg

Output:

  dist/
  ├── index.html
  └── covers/

Run 'bookwall gen-config' to generate a documented bookwall.toml.")]
#[command(version = env!("BOOKWALL_VERSION"))]
struct Cli {
    /// Library directory holding the catalog and covers
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Defaults to `build`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Read the catalog, copy covers and write the page
    Build,
    /// Validate the catalog and cover files without writing anything
    Check,
    /// Print the parsed catalog records as JSON
    Scan,
    /// Print a stock bookwall.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            println!(
                "==> Reading {}",
                pipeline::catalog_path(&cli.source, &config).display()
            );
            let report = pipeline::build(&cli.source, &cli.output, &config)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            println!(
                "==> Checking {}",
                pipeline::catalog_path(&cli.source, &config).display()
            );
            let records = pipeline::check(&cli.source, &cli.output, &config)?;
            output::print_catalog_output(&records);
            println!("==> Catalog is valid");
        }
        Command::Scan => {
            let config = config::load_config(&cli.source)?;
            let records = pipeline::load_records(&cli.source, &config)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
