#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use save_model::archetype::{self, ArchetypeLibrary};
use save_model::config::{self, EngineConfig};
use save_model::diagnosis::{DiagnoseRequest, Engine};
use save_model::profile::render_profile_markdown;
use save_model::record::{AssessmentCreateRequest, AssessmentRecord};

#[derive(Parser)]
#[command(name = "save", version, about = "SAVE capital-flow diagnosis CLI")]
struct Cli {
    /// Archetype rule file (defaults to $SAVE_ARCHETYPES_PATH, then the built-in set)
    #[arg(long, global = true)]
    archetypes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a `{meta, responses}` request and print the results map
    Diagnose {
        /// Request JSON (`-` for stdin)
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Override the risk damping λ (defaults to $SAVE_LAMBDA or 0.8)
        #[arg(long)]
        lambda: Option<f64>,
    },
    /// Diagnose a `{profile_id, consent_research, meta_public, responses}`
    /// request into an assessment record
    Assess {
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        lambda: Option<f64>,
    },
    /// Build the profile of a stored assessment record
    Profile {
        /// Assessment record JSON (`-` for stdin)
        #[arg(long)]
        record: PathBuf,
        #[arg(long, default_value = "en")]
        lang: String,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Inspect the archetype rule set
    Archetypes {
        #[command(subcommand)]
        command: ArchetypeCommands,
    },
}

#[derive(Subcommand)]
enum ArchetypeCommands {
    /// List archetype ids in match order
    List,
    /// Validate the rule file and print its digest
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Md,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "save=info,save_model=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

fn write_output(out: Option<&Path>, body: &str) -> io::Result<()> {
    match out {
        Some(path) => {
            let mut file = File::create(path)?;
            writeln!(file, "{body}")
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{body}")
        }
    }
}

fn write_json<T: Serialize>(out: Option<&Path>, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::to_string_pretty(value)?;
    write_output(out, &body)?;
    Ok(())
}

fn engine(lambda: Option<f64>) -> Result<Engine, Box<dyn std::error::Error>> {
    let mut config = EngineConfig::from_env()?;
    if let Some(lambda) = lambda {
        if !lambda.is_finite() {
            return Err("--lambda must be a finite number".into());
        }
        config.lambda = lambda;
    }
    Ok(Engine::new(config))
}

fn load_library(path: Option<PathBuf>) -> Result<Arc<ArchetypeLibrary>, Box<dyn std::error::Error>> {
    let library = match path.or_else(config::archetypes_path_from_env) {
        Some(path) => ArchetypeLibrary::from_path(path)?,
        None => ArchetypeLibrary::builtin()?,
    };
    let registry = archetype::init_global(library)?;
    Ok(registry.snapshot())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A .env file may carry SAVE_LAMBDA, SAVE_ARCHETYPES_PATH or RUST_LOG.
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Diagnose {
            request,
            out,
            lambda,
        } => {
            let engine = engine(lambda)?;
            let request: DiagnoseRequest = serde_json::from_str(&read_input(&request)?)?;
            let diagnosis = engine.diagnose_request(&request)?;
            write_json(out.as_deref(), &diagnosis)?;
        }
        Commands::Assess {
            request,
            out,
            lambda,
        } => {
            let engine = engine(lambda)?;
            let request: AssessmentCreateRequest = serde_json::from_str(&read_input(&request)?)?;
            let record = AssessmentRecord::create(&engine, request)?;
            write_json(out.as_deref(), &record)?;
        }
        Commands::Profile {
            record,
            lang,
            format,
            out,
        } => {
            let library = load_library(cli.archetypes)?;
            let record: AssessmentRecord = serde_json::from_str(&read_input(&record)?)?;
            let profile = record.profile(&lang, &library);
            match format {
                OutputFormat::Json => write_json(out.as_deref(), &profile)?,
                OutputFormat::Md => write_output(out.as_deref(), &render_profile_markdown(&profile))?,
            }
        }
        Commands::Archetypes { command } => {
            let library = load_library(cli.archetypes)?;
            match command {
                ArchetypeCommands::List => {
                    for a in library.archetypes() {
                        println!("{}\t{}", a.id, a.label.resolve("en"));
                    }
                }
                ArchetypeCommands::Check => {
                    println!("ok: {} archetypes, digest {}", library.len(), library.digest());
                }
            }
        }
    }

    Ok(())
}
