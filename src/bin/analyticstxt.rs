//! analytics.txt CLI
//!
//! Validates, parses and serializes analytics.txt files and lists the
//! schema drafts known to this build.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use analyticstxt::config::{OutputFormat, Settings, CONFIG_FILE_NAME};
use analyticstxt::{Engine, Options};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const STDIN_MARKER: &str = "-";

#[derive(Parser)]
#[command(name = "analyticstxt")]
#[command(about = "Validate, parse and serialize analytics.txt files")]
struct Cli {
    /// Configuration file (in addition to the default locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a file is a valid analytics.txt file
    Validate {
        /// File to validate, or "-" for stdin
        file: String,
        /// Draft to validate against
        #[arg(short, long)]
        draft: Option<String>,
    },

    /// Parse an analytics.txt file and print it as JSON
    Parse {
        /// File to parse, or "-" for stdin
        file: String,
        #[arg(short, long)]
        draft: Option<String>,
        /// Accept unknown values for known fields
        #[arg(short, long)]
        lax: bool,
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Serialize a JSON document into analytics.txt format
    Serialize {
        /// JSON file to read, or "-" for stdin
        file: String,
        /// Write the result to this file instead of stdout
        outfile: Option<PathBuf>,
        #[arg(short, long)]
        draft: Option<String>,
        /// Accept unknown values for known fields
        #[arg(short, long)]
        lax: bool,
        /// Overwrite OUTFILE if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// List the known drafts
    Drafts {
        /// Show schema checksums
        #[arg(short, long)]
        verbose: bool,
    },

    /// View or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the version of this tool
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Write a config file with default settings
    Init {
        /// Output path
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        output: PathBuf,
        /// Overwrite OUTPUT if it exists
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let settings = Settings::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    let engine = Engine::bundled()?;

    match cli.command {
        Commands::Validate { file, draft } => {
            let options = settings.validate_options(draft);
            let content = read_input(&file)?;
            engine.validate(&content, &options)?;

            let draft_name = options.draft.as_deref().unwrap_or(engine.default_version());
            let file_name = if file == STDIN_MARKER { "Pipe from stdin" } else { file.as_str() };
            Ok(format!("{} is a valid analytics.txt file as per {}.", file_name, draft_name))
        }

        Commands::Parse { file, draft, lax, compact } => {
            let options = settings.options(draft, lax);
            let content = read_input(&file)?;
            let document = engine.parse(&content, &options)?.into_result()?;

            let format = if compact { OutputFormat::Compact } else { settings.output.format };
            Ok(format.to_json(&document)?)
        }

        Commands::Serialize { file, outfile, draft, lax, force } => {
            let options = settings.options(draft, lax);
            let content = read_input(&file)?;
            let input: serde_json::Value =
                serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", file))?;
            let text = engine.serialize(&input, &options)?;

            match outfile {
                Some(path) => {
                    if path.exists() && !(force || settings.output.force) {
                        bail!("{} already exists. Pass --force to overwrite it.", path.display());
                    }
                    fs::write(&path, &text).with_context(|| format!("Failed to write {}", path.display()))?;
                    Ok(format!("Content successfully written to {}.", path.display()))
                }
                None => Ok(text),
            }
        }

        Commands::Drafts { verbose } => {
            let mut lines = vec![
                format!(
                    "Draft versions of analytics.txt known to {}@{}:",
                    env!("CARGO_PKG_NAME"),
                    env!("CARGO_PKG_VERSION")
                ),
                String::new(),
            ];
            for info in engine.list_drafts() {
                let marker = if info.is_default { "  [default]" } else { "" };
                if verbose {
                    lines.push(format!("  - {}  {}{}", info.id, info.checksum.short(), marker));
                } else {
                    lines.push(format!("  - {}{}", info.id, marker));
                }
            }
            Ok(lines.join("\n"))
        }

        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                if json {
                    Ok(serde_json::to_string_pretty(&settings)?)
                } else {
                    Ok(settings.to_toml()?)
                }
            }
            ConfigAction::Init { output, force } => {
                if output.exists() && !force {
                    bail!("{} already exists. Pass --force to overwrite it.", output.display());
                }
                Settings::default()
                    .save(&output)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                Ok(format!("Created config file {}.", output.display()))
            }
        },

        Commands::Version => Ok(env!("CARGO_PKG_VERSION").to_string()),
    }
}

fn read_input(file: &str) -> anyhow::Result<String> {
    if file == STDIN_MARKER {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        return Ok(content);
    }

    let path = Path::new(file);
    if !path.exists() {
        bail!("File {} does not exist.", file);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", file))
}
