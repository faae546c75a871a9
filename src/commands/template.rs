//! Template commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docreg_core::config::AppConfig;
use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_entity::template::{FieldMap, Template};
use docreg_service::{CreateLayoutTemplateRequest, CreatePlainTemplateRequest};

use super::{Runtime, read_file};
use crate::output::{self, OutputFormat};

/// Arguments for template commands
#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Template subcommand
    #[command(subcommand)]
    pub command: TemplateCommand,
}

/// Template subcommands
#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// List templates
    List,
    /// Create a plain-text template with `{{ key }}` placeholders
    Plain {
        /// Template name
        #[arg(short, long)]
        name: String,
        /// File holding the template body
        #[arg(short, long)]
        body: String,
    },
    /// Create a layout template from a layout file and a JSON field map
    Layout {
        /// Template name
        #[arg(short, long)]
        name: String,
        /// Layout file
        #[arg(short, long)]
        layout: String,
        /// JSON file with `[{"field": ..., "placeholder": ...}]` entries
        #[arg(short = 'm', long)]
        field_map: String,
    },
}

/// Template display row
#[derive(Debug, Serialize, Tabled)]
struct TemplateRow {
    /// Template ID
    id: String,
    /// Name
    name: String,
    /// Kind
    kind: String,
    /// Mapped fields
    fields: usize,
    /// Created at
    created_at: String,
}

impl From<&Template> for TemplateRow {
    fn from(template: &Template) -> Self {
        Self {
            id: template.id.to_string(),
            name: template.name.clone(),
            kind: template.kind.as_str().to_string(),
            fields: template.fields().len(),
            created_at: template.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute template commands
pub async fn execute(
    args: &TemplateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let runtime = Runtime::connect(config).await?;
    let templates = &runtime.services.templates;

    match &args.command {
        TemplateCommand::List => {
            let rows: Vec<TemplateRow> = templates
                .list()
                .await?
                .iter()
                .map(TemplateRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        TemplateCommand::Plain { name, body } => {
            let body = read_file(body).await?;
            let body = String::from_utf8(body.to_vec())
                .map_err(|_| AppError::validation("Template body must be UTF-8 text"))?;
            let template = templates
                .create_plain(CreatePlainTemplateRequest {
                    name: name.clone(),
                    body,
                })
                .await?;
            output::print_item(&TemplateRow::from(&template), format);
        }
        TemplateCommand::Layout {
            name,
            layout,
            field_map,
        } => {
            let layout = read_file(layout).await?;
            let field_map: FieldMap = serde_json::from_slice(&read_file(field_map).await?)?;
            let template = templates
                .create_layout(CreateLayoutTemplateRequest {
                    name: name.clone(),
                    layout,
                    field_map,
                })
                .await?;
            output::print_item(&TemplateRow::from(&template), format);
        }
    }

    runtime.close().await;
    Ok(())
}
