//! Document lifecycle commands.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docreg_core::config::AppConfig;
use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::types::{CategoryId, DocumentId, GroupId, TemplateId, UserId};
use docreg_entity::artifact::Artifact;
use docreg_entity::document::Document;
use docreg_service::{AttachmentUpload, CreateDocumentRequest, UpdateDocumentRequest};

use super::{Runtime, read_file};
use crate::output::{self, OutputFormat};

/// Arguments for document commands
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Active group
    #[arg(short, long, env = "DOCREG_GROUP")]
    pub group: GroupId,

    /// Document subcommand
    #[command(subcommand)]
    pub command: DocumentCommand,
}

/// Editable document fields shared by create and update
#[derive(Debug, Clone, Args)]
pub struct DocumentFields {
    /// Template used for PDF generation
    #[arg(short, long)]
    pub template: Option<TemplateId>,
    /// Sender line
    #[arg(long)]
    pub sender: String,
    /// Recipient line
    #[arg(long)]
    pub recipient: String,
    /// Subject line
    #[arg(long)]
    pub subject: String,
    /// Message body
    #[arg(long)]
    pub body: String,
    /// Document date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Code prefix, the category's when omitted
    #[arg(long)]
    pub prefix: Option<String>,
    /// Year (manual categories)
    #[arg(long)]
    pub year: Option<i32>,
    /// Sequential number (manual categories)
    #[arg(long)]
    pub sequential: Option<i32>,
    /// Explicit code (manual categories)
    #[arg(long)]
    pub code: Option<String>,
}

/// Document subcommands
#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// Create a draft document
    Create {
        /// Category ID
        #[arg(short, long)]
        category: CategoryId,
        /// Document fields
        #[command(flatten)]
        fields: DocumentFields,
    },
    /// Update a draft document
    Update {
        /// Document ID
        #[arg(long)]
        id: DocumentId,
        /// Document fields
        #[command(flatten)]
        fields: DocumentFields,
    },
    /// Finalize a draft document
    Finalize {
        /// Document ID
        #[arg(long)]
        id: DocumentId,
    },
    /// Copy a document into a new draft
    Clone {
        /// Document ID
        #[arg(long)]
        id: DocumentId,
    },
    /// Delete a draft document
    Delete {
        /// Document ID
        #[arg(long)]
        id: DocumentId,
    },
    /// List a category's documents for a year
    List {
        /// Category ID
        #[arg(short, long)]
        category: CategoryId,
        /// Year, the current one when omitted
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// List the years that have documents in a category
    Years {
        /// Category ID
        #[arg(short, long)]
        category: CategoryId,
    },
    /// Show a document and its artifacts
    Show {
        /// Document ID
        #[arg(long)]
        id: DocumentId,
    },
    /// Attach a file to a draft document
    Attach {
        /// Document ID
        #[arg(long)]
        id: DocumentId,
        /// File to attach
        #[arg(long)]
        file: String,
        /// MIME type
        #[arg(long, default_value = "application/octet-stream")]
        mime: String,
    },
    /// Generate (or fetch the cached) PDF of a document
    Pdf {
        /// Document ID
        #[arg(long)]
        id: DocumentId,
        /// Output file, the artifact name when omitted
        #[arg(short, long)]
        out: Option<String>,
    },
}

/// Document display row
#[derive(Debug, Serialize, Tabled)]
struct DocumentRow {
    /// Document ID
    id: String,
    /// Code
    code: String,
    /// Subject
    subject: String,
    /// Recipient
    recipient: String,
    /// Date
    date: String,
    /// Lifecycle state
    state: String,
}

impl From<&Document> for DocumentRow {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.to_string(),
            code: doc.code.clone().unwrap_or_else(|| "-".to_string()),
            subject: doc.subject.clone(),
            recipient: doc.recipient.clone(),
            date: doc.document_date.format("%Y-%m-%d").to_string(),
            state: doc.state().to_string(),
        }
    }
}

/// Artifact display row
#[derive(Debug, Serialize, Tabled)]
struct ArtifactRow {
    /// Artifact ID
    id: String,
    /// Kind
    kind: String,
    /// File name
    name: String,
    /// Size in bytes
    size: i64,
    /// Storage path
    path: String,
}

impl From<&Artifact> for ArtifactRow {
    fn from(artifact: &Artifact) -> Self {
        Self {
            id: artifact.id.to_string(),
            kind: artifact.kind.as_str().to_string(),
            name: artifact.original_name.clone(),
            size: artifact.size_bytes,
            path: artifact.storage_path.clone(),
        }
    }
}

/// Year display row
#[derive(Debug, Serialize, Tabled)]
struct YearRow {
    /// Year
    year: i32,
}

/// Execute document commands
pub async fn execute(
    args: &DocumentArgs,
    config: &AppConfig,
    user: UserId,
    format: OutputFormat,
) -> AppResult<()> {
    let runtime = Runtime::connect(config).await?;
    let result = run(&runtime, args, user, format).await;
    runtime.close().await;
    result
}

async fn run(
    runtime: &Runtime,
    args: &DocumentArgs,
    user: UserId,
    format: OutputFormat,
) -> AppResult<()> {
    let ctx = super::context(user, args.group);
    let documents = &runtime.services.documents;

    match &args.command {
        DocumentCommand::Create { category, fields } => {
            let doc = documents
                .create(&ctx, create_request(*category, fields.clone()))
                .await?;
            output::print_item(&DocumentRow::from(&doc), format);
            if doc.code.is_none() && fields.code.is_some() {
                output::print_warning(
                    "Requested code is already in use; document saved without a code",
                );
            }
        }
        DocumentCommand::Update { id, fields } => {
            let doc = documents
                .update(&ctx, *id, update_request(fields.clone()))
                .await?;
            output::print_item(&DocumentRow::from(&doc), format);
        }
        DocumentCommand::Finalize { id } => {
            let doc = documents.finalize(&ctx, *id).await?;
            output::print_success(&format!("Document {} finalized", doc.id));
        }
        DocumentCommand::Clone { id } => {
            let doc = documents.clone_document(&ctx, *id).await?;
            output::print_item(&DocumentRow::from(&doc), format);
        }
        DocumentCommand::Delete { id } => {
            documents.delete(&ctx, *id).await?;
            output::print_success(&format!("Document {id} deleted"));
        }
        DocumentCommand::List { category, year } => {
            let docs = documents.list(&ctx, *category, *year).await?;
            let rows: Vec<DocumentRow> = docs.iter().map(DocumentRow::from).collect();
            output::print_list(&rows, format);
        }
        DocumentCommand::Years { category } => {
            let rows: Vec<YearRow> = documents
                .list_years(&ctx, *category)
                .await?
                .into_iter()
                .map(|year| YearRow { year })
                .collect();
            output::print_list(&rows, format);
        }
        DocumentCommand::Show { id } => {
            let detail = documents.get(&ctx, *id).await?;
            match format {
                OutputFormat::Json => output::print_json(&detail),
                OutputFormat::Table => {
                    output::print_item(&DocumentRow::from(&detail.document), format);
                    let rows: Vec<ArtifactRow> =
                        detail.artifacts.iter().map(ArtifactRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        DocumentCommand::Attach { id, file, mime } => {
            let data = read_file(file).await?;
            let original_name = Path::new(file)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(file.as_str())
                .to_string();
            let artifact = runtime
                .services
                .attachments
                .attach(
                    &ctx,
                    *id,
                    AttachmentUpload {
                        original_name,
                        mime_type: mime.clone(),
                        data,
                    },
                )
                .await?;
            output::print_item(&ArtifactRow::from(&artifact), format);
        }
        DocumentCommand::Pdf { id, out } => {
            let pdf = documents.generate_pdf(&ctx, *id).await?;
            let target = out
                .clone()
                .unwrap_or_else(|| pdf.artifact.original_name.clone());
            tokio::fs::write(&target, &pdf.bytes).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write {target}: {e}"),
                    e,
                )
            })?;
            output::print_success(&format!(
                "Wrote {} ({} bytes, {})",
                target,
                pdf.bytes.len(),
                if pdf.cache_hit { "cached" } else { "generated" }
            ));
        }
    }

    Ok(())
}

fn create_request(category_id: CategoryId, fields: DocumentFields) -> CreateDocumentRequest {
    CreateDocumentRequest {
        category_id,
        template_id: fields.template,
        sender: fields.sender,
        recipient: fields.recipient,
        subject: fields.subject,
        body: fields.body,
        document_date: fields.date.unwrap_or_else(|| Utc::now().date_naive()),
        prefix: fields.prefix,
        year: fields.year,
        sequential: fields.sequential,
        code: fields.code,
    }
}

fn update_request(fields: DocumentFields) -> UpdateDocumentRequest {
    UpdateDocumentRequest {
        template_id: fields.template,
        sender: fields.sender,
        recipient: fields.recipient,
        subject: fields.subject,
        body: fields.body,
        document_date: fields.date.unwrap_or_else(|| Utc::now().date_naive()),
        prefix: fields.prefix,
        year: fields.year,
        sequential: fields.sequential,
        code: fields.code,
    }
}
