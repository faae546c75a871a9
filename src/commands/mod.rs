//! CLI command definitions and dispatch.

pub mod document;
pub mod group;
pub mod migrate;
pub mod template;

use std::sync::Arc;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing::warn;
use uuid::Uuid;

use docreg_core::config::AppConfig;
use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::traits::pdf::PdfRenderer;
use docreg_core::types::{GroupId, RenderedContent, UserId};
use docreg_database::DatabasePool;
use docreg_render::GenPdfRenderer;
use docreg_service::{AllowAll, RequestContext, ServiceRegistry};

use crate::output::OutputFormat;

/// DocReg: organizational document registry
#[derive(Debug, Parser)]
#[command(name = "docreg", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from `config/<env>.toml`
    #[arg(short, long, env = "DOCREG_ENV", default_value = "development")]
    pub env: String,

    /// Acting user recorded on created and finalized documents
    #[arg(short, long, env = "DOCREG_USER")]
    pub user: Option<UserId>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Group and category management
    Group(group::GroupArgs),
    /// Template management
    Template(template::TemplateArgs),
    /// Document lifecycle
    Document(document::DocumentArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Group(args) => group::execute(args, config, self.actor(), self.format).await,
            Commands::Template(args) => template::execute(args, config, self.format).await,
            Commands::Document(args) => {
                document::execute(args, config, self.actor(), self.format).await
            }
        }
    }

    /// The acting user, or the nil "operator" user when none is given.
    fn actor(&self) -> UserId {
        self.user.unwrap_or_else(|| UserId::from_uuid(Uuid::nil()))
    }
}

/// Connected database plus every service wired over it.
pub struct Runtime {
    /// Database pool, closed when the command finishes.
    pub db: DatabasePool,
    /// Application services.
    pub services: ServiceRegistry,
}

impl Runtime {
    /// Connect to the database and wire the services.
    ///
    /// The CLI is an operator tool, so every group may be managed.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let db = DatabasePool::connect(&config.database).await?;
        let storage = docreg_storage::build_provider(&config.storage).await?;
        let services = ServiceRegistry::new(
            db.stores(),
            storage,
            pdf_backend(config),
            Arc::new(AllowAll),
            &config.sequencing,
        );
        Ok(Self { db, services })
    }

    /// Close the database pool.
    pub async fn close(self) {
        self.db.close().await;
    }
}

/// Request context for `user` working in `group`.
pub fn context(user: UserId, group: GroupId) -> RequestContext {
    RequestContext::new(user, group)
}

/// The genpdf backend, or a backend that reports why it is unavailable
/// so commands that never render still work without fonts installed.
fn pdf_backend(config: &AppConfig) -> Arc<dyn PdfRenderer> {
    match GenPdfRenderer::new(&config.render) {
        Ok(renderer) => Arc::new(renderer),
        Err(e) => {
            warn!(error = %e, "PDF rendering unavailable");
            Arc::new(UnavailableRenderer { reason: e.message })
        }
    }
}

#[derive(Debug)]
struct UnavailableRenderer {
    reason: String,
}

impl PdfRenderer for UnavailableRenderer {
    fn backend(&self) -> &str {
        "unavailable"
    }

    fn render(&self, _content: &RenderedContent) -> AppResult<Bytes> {
        Err(AppError::render(self.reason.clone()))
    }
}

/// Read a whole input file.
pub async fn read_file(path: &str) -> AppResult<Bytes> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|e| {
            AppError::with_source(
                docreg_core::ErrorKind::Storage,
                format!("Failed to read {path}: {e}"),
                e,
            )
        })
}
