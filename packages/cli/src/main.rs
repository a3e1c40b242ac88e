//! folio-admin - terminal admin front end for Folio projects
//!
//! Every invocation is one editing session: the project is loaded, the edit
//! applied, and the result saved (uploading any attached image) before the
//! command returns.
//!
//! # Usage
//!
//! ```text
//! export FOLIO_ADMIN_EMAIL=admin@example.com FOLIO_ADMIN_PASSWORD=secret1
//! export FOLIO_EMAIL=admin@example.com FOLIO_PASSWORD=secret1
//!
//! folio-admin new --title "Portfolio site" --slug portfolio-site
//! folio-admin add <project> image
//! folio-admin attach-image <project> 1 ./hero.png
//! folio-admin move <project> 2 1
//! folio-admin show <project>
//! ```

mod commands;

use clap::{Parser, Subcommand};
use commands::{BlockEdits, Context, FieldEdits};
use folio_core::config::{FolioConfig, ENV_DATA_DIR};
use folio_core::models::BlockKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "folio-admin", author, version, about)]
struct Cli {
    /// Admin account email
    #[arg(long, env = "FOLIO_EMAIL")]
    email: String,

    /// Admin account password
    #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true)]
    password: String,

    /// Data directory of the local backend (default: ~/.folio)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every project, newest first
    List,
    /// Print a project's fields and blocks
    Show { project: String },
    /// Create a project
    New {
        #[command(flatten)]
        fields: FieldEdits,
    },
    /// Change a project's title, slug, excerpt or status
    Set {
        project: String,
        #[command(flatten)]
        fields: FieldEdits,
    },
    /// Append a block with default content
    Add { project: String, kind: BlockKind },
    /// Edit a block's content
    Edit {
        project: String,
        /// Block id or 1-based position
        block: String,
        #[command(flatten)]
        edits: BlockEdits,
    },
    /// Upload a file into an image block
    #[command(name = "attach-image")]
    AttachImage {
        project: String,
        block: String,
        file: PathBuf,
    },
    /// Remove the image from an image block
    #[command(name = "clear-image")]
    ClearImage { project: String, block: String },
    /// Copy a block, inserting the copy right after it
    Duplicate { project: String, block: String },
    /// Move a block onto the position of another one
    Move {
        project: String,
        block: String,
        onto: String,
    },
    /// Delete a block
    Delete {
        project: String,
        block: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(data_dir: Option<PathBuf>) -> anyhow::Result<FolioConfig> {
    let data_dir = data_dir.map(|dir| dir.to_string_lossy().into_owned());
    let config = FolioConfig::from_lookup(|key| {
        if key == ENV_DATA_DIR {
            if let Some(dir) = &data_dir {
                return Some(dir.clone());
            }
        }
        std::env::var(key).ok()
    })?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.data_dir)?;
    let ctx = Context::connect(config, &cli.email, &cli.password).await?;

    match cli.command {
        Commands::List => commands::list(&ctx).await,
        Commands::Show { project } => commands::show(&ctx, &project).await,
        Commands::New { fields } => commands::create(&ctx, &fields).await,
        Commands::Set { project, fields } => commands::set_fields(&ctx, &project, &fields).await,
        Commands::Add { project, kind } => commands::add(&ctx, &project, kind).await,
        Commands::Edit {
            project,
            block,
            edits,
        } => commands::edit(&ctx, &project, &block, &edits).await,
        Commands::AttachImage {
            project,
            block,
            file,
        } => commands::attach_image(&ctx, &project, &block, &file).await,
        Commands::ClearImage { project, block } => {
            commands::clear_image(&ctx, &project, &block).await
        }
        Commands::Duplicate { project, block } => {
            commands::duplicate(&ctx, &project, &block).await
        }
        Commands::Move {
            project,
            block,
            onto,
        } => commands::move_block(&ctx, &project, &block, &onto).await,
        Commands::Delete {
            project,
            block,
            yes,
        } => commands::delete(&ctx, &project, &block, yes).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_edit_command() {
        let cli = Cli::try_parse_from([
            "folio-admin",
            "--email",
            "admin@example.com",
            "--password",
            "secret1",
            "edit",
            "abc",
            "2",
            "--text",
            "Results",
            "--level",
            "h3",
        ])
        .unwrap();

        match cli.command {
            Commands::Edit {
                project,
                block,
                edits,
            } => {
                assert_eq!(project, "abc");
                assert_eq!(block, "2");
                assert_eq!(edits.text.as_deref(), Some("Results"));
                assert_eq!(
                    edits.level,
                    Some(folio_core::models::HeadingLevel::H3)
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_block_kind_is_rejected() {
        let result = Cli::try_parse_from([
            "folio-admin",
            "--email",
            "a@b.co",
            "--password",
            "secret1",
            "add",
            "abc",
            "quote",
        ]);
        assert!(result.is_err());
    }
}
