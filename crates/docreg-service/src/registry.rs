//! Wiring of every service over one set of stores.

use std::sync::Arc;

use docreg_core::config::SequencingConfig;
use docreg_core::traits::pdf::PdfRenderer;
use docreg_core::traits::storage::StorageProvider;
use docreg_database::StoreSet;

use crate::artifact::{ArtifactCache, AttachmentService};
use crate::document::DocumentService;
use crate::group::GroupService;
use crate::permission::GroupAuthorizer;
use crate::template::TemplateService;

/// All application services, constructed together.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    /// Document lifecycle.
    pub documents: DocumentService,
    /// Attachments.
    pub attachments: AttachmentService,
    /// Groups and categories.
    pub groups: GroupService,
    /// Templates.
    pub templates: TemplateService,
    /// Generated PDF cache.
    pub cache: Arc<ArtifactCache>,
}

impl ServiceRegistry {
    /// Build every service from its collaborators.
    pub fn new(
        stores: StoreSet,
        storage: Arc<dyn StorageProvider>,
        pdf: Arc<dyn PdfRenderer>,
        authorizer: Arc<dyn GroupAuthorizer>,
        sequencing: &SequencingConfig,
    ) -> Self {
        let cache = Arc::new(ArtifactCache::new(
            stores.artifacts.clone(),
            storage.clone(),
            pdf,
        ));
        Self {
            attachments: AttachmentService::new(
                stores.documents.clone(),
                stores.artifacts.clone(),
                storage.clone(),
                authorizer.clone(),
            ),
            groups: GroupService::new(
                stores.groups.clone(),
                stores.categories.clone(),
                authorizer.clone(),
            ),
            templates: TemplateService::new(stores.templates.clone(), storage.clone()),
            documents: DocumentService::new(
                stores,
                cache.clone(),
                storage,
                authorizer,
                sequencing,
            ),
            cache,
        }
    }
}
