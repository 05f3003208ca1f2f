//! Pagemark command line.
//!
//! Imports PDF bookmarks, stages drafts and publishes outlines to the
//! publication API.
//!
//! Usage:
//!   pagemark import book-uz.pdf --language uz --stage
//!   pagemark publish 42
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pagemark_cli::CliConfig;
use pagemark_types::{Language, PublicationId};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pagemark")]
#[command(about = "Import, stage and publish multilingual PDF outlines")]
struct Cli {
    /// Base URL of the publication API
    #[arg(long, env = "PAGEMARK_API_URL", default_value = "http://localhost:3001")]
    api_url: String,

    /// Draft file used while no publication exists
    #[arg(long, env = "PAGEMARK_DRAFTS", default_value = "pagemark-drafts.json")]
    drafts: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a PDF's bookmarks as an outline
    Import {
        pdf: PathBuf,
        #[arg(short, long, value_parser = Language::parse)]
        language: Language,
        /// Replace the language's draft with the imported outline
        #[arg(long)]
        stage: bool,
    },
    /// Outlines stored under a publication
    #[command(subcommand)]
    Outline(OutlineCommand),
    /// Drafts kept while no publication exists
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Publish every language of a publication, drafts included
    Publish {
        #[arg(value_parser = PublicationId::parse)]
        publication: PublicationId,
    },
    /// Check that the publication API is reachable
    Health,
}

#[derive(Subcommand, Debug)]
enum OutlineCommand {
    /// Print the stored outlines
    List {
        #[arg(value_parser = PublicationId::parse)]
        publication: PublicationId,
        #[arg(short, long, value_parser = Language::parse)]
        language: Option<Language>,
    },
    /// Replace one language's outline with a tree read from a JSON file
    Replace {
        #[arg(value_parser = PublicationId::parse)]
        publication: PublicationId,
        #[command(flatten)]
        tree: TreeArgs,
    },
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Replace one language's draft with a tree read from a JSON file
    Stage {
        #[command(flatten)]
        tree: TreeArgs,
    },
    /// Print the staged drafts
    Show {
        #[arg(short, long, value_parser = Language::parse)]
        language: Option<Language>,
    },
    /// Create the staged drafts under a publication
    Promote {
        #[arg(value_parser = PublicationId::parse)]
        publication: PublicationId,
    },
}

#[derive(Args, Debug)]
struct TreeArgs {
    /// JSON file holding a nested outline
    input: PathBuf,
    #[arg(short, long, value_parser = Language::parse)]
    language: Language,
    /// Reject pages past this number
    #[arg(long)]
    max_pages: Option<u32>,
}

#[derive(Serialize)]
struct Health {
    api_url: String,
    healthy: bool,
}

#[derive(Serialize)]
struct Staged {
    language: Language,
    staged: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = CliConfig {
        api_base_url: cli.api_url,
        drafts: cli.drafts,
        timeout_secs: cli.timeout_secs,
    };
    debug!("Using {:?}", config);

    match cli.command {
        Command::Import {
            pdf,
            language,
            stage,
        } => {
            let summary = pagemark_cli::import_pdf(&pdf, &language, &config.drafts, stage).await?;
            print_json(&summary)?;
        }
        Command::Outline(OutlineCommand::List {
            publication,
            language,
        }) => {
            let engine = config.engine()?;
            let outlines =
                pagemark_cli::list_outlines(&engine, &publication, language.as_ref()).await?;
            print_json(&outlines)?;
        }
        Command::Outline(OutlineCommand::Replace { publication, tree }) => {
            let engine = config.engine()?;
            let nodes = pagemark_cli::read_tree(&tree.input).await?;
            let created = pagemark_cli::replace_outline(
                &engine,
                &publication,
                &tree.language,
                nodes,
                tree.max_pages,
            )
            .await?;
            print_json(&created)?;
        }
        Command::Draft(DraftCommand::Stage { tree }) => {
            let nodes = pagemark_cli::read_tree(&tree.input).await?;
            let staged =
                pagemark_cli::stage_draft(&config.drafts, &tree.language, nodes, tree.max_pages)
                    .await?;
            print_json(&Staged {
                language: tree.language,
                staged,
            })?;
        }
        Command::Draft(DraftCommand::Show { language }) => {
            let drafts = pagemark_cli::show_drafts(&config.drafts, language.as_ref()).await?;
            print_json(&drafts)?;
        }
        Command::Draft(DraftCommand::Promote { publication }) => {
            let engine = config.engine()?;
            let report =
                pagemark_cli::promote_drafts(&engine, &publication, &config.drafts).await?;
            print_json(&report)?;
            if !report.is_complete() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Publish { publication } => {
            let engine = config.engine()?;
            let report = pagemark_cli::publish(engine, publication, &config.drafts).await?;
            print_json(&report)?;
            if !report.is_complete() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Health => {
            let collection = pagemark_sync::HttpOutlineCollection::new(config.http())?;
            let healthy = collection.health().await;
            print_json(&Health {
                api_url: config.api_base_url,
                healthy,
            })?;
            if !healthy {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // The outermost context names the action; causes are for the log.
            debug!("{:#}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
