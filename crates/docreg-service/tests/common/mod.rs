//! Shared harness for service integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use chrono::{NaiveDate, TimeZone, Utc};

use docreg_core::config::SequencingConfig;
use docreg_core::result::AppResult;
use docreg_core::traits::pdf::PdfRenderer;
use docreg_core::types::{CategoryId, RenderedContent, UserId};
use docreg_database::{MemoryStore, StoreSet};
use docreg_entity::category::Category;
use docreg_entity::group::Group;
use docreg_service::{
    CreateCategoryRequest, CreateDocumentRequest, CreateGroupRequest, MembershipAuthorizer,
    RequestContext, ServiceRegistry, UpdateDocumentRequest,
};
use docreg_storage::MemoryStorageProvider;

/// PDF backend that counts renders and echoes the content.
#[derive(Debug, Default)]
pub struct CountingRenderer {
    renders: AtomicUsize,
}

impl CountingRenderer {
    pub fn count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl PdfRenderer for CountingRenderer {
    fn backend(&self) -> &str {
        "counting"
    }

    fn render(&self, content: &RenderedContent) -> AppResult<Bytes> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        // Give concurrent callers a chance to pile up on the same content.
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(Bytes::from(format!("%PDF-test\n{}", content.text())))
    }
}

/// Services over an in-memory store, one group, and its default categories.
pub struct TestApp {
    pub services: ServiceRegistry,
    pub store: Arc<MemoryStore>,
    pub storage: MemoryStorageProvider,
    pub renderer: Arc<CountingRenderer>,
    pub authorizer: Arc<MembershipAuthorizer>,
    pub ctx: RequestContext,
    pub group: Group,
    /// "Memorando" (MEM, managed).
    pub memo: Category,
    /// "Ofício" (OFC, managed).
    pub letter: Category,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let storage = MemoryStorageProvider::new();
        let renderer = Arc::new(CountingRenderer::default());
        let authorizer = Arc::new(MembershipAuthorizer::new());
        let services = Self::wire(&store, &storage, &renderer, &authorizer);

        let (group, categories) = services
            .groups
            .create_group(CreateGroupRequest {
                name: "Finance".into(),
                description: None,
            })
            .await
            .expect("create group");
        let memo = categories
            .iter()
            .find(|c| c.prefix == "MEM")
            .cloned()
            .expect("memo category");
        let letter = categories
            .iter()
            .find(|c| c.prefix == "OFC")
            .cloned()
            .expect("letter category");

        let user = UserId::new();
        authorizer.grant(user, group.id);
        let ctx = RequestContext::new(user, group.id).at(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
                .single()
                .expect("valid time"),
        );

        Self {
            services,
            store,
            storage,
            renderer,
            authorizer,
            ctx,
            group,
            memo,
            letter,
        }
    }

    /// Services rebuilt over the same store and blob storage, as after a restart.
    pub fn restarted(&self) -> ServiceRegistry {
        Self::wire(&self.store, &self.storage, &self.renderer, &self.authorizer)
    }

    fn wire(
        store: &Arc<MemoryStore>,
        storage: &MemoryStorageProvider,
        renderer: &Arc<CountingRenderer>,
        authorizer: &Arc<MembershipAuthorizer>,
    ) -> ServiceRegistry {
        ServiceRegistry::new(
            StoreSet::from_memory(store.clone()),
            Arc::new(storage.clone()),
            renderer.clone(),
            authorizer.clone(),
            &SequencingConfig::default(),
        )
    }

    /// Context of the same user in another year.
    pub fn ctx_in_year(&self, year: i32) -> RequestContext {
        self.ctx.clone().at(
            Utc.with_ymd_and_hms(year, 3, 1, 9, 0, 0)
                .single()
                .expect("valid time"),
        )
    }

    pub async fn manual_category(&self, prefix: &str) -> Category {
        self.services
            .groups
            .create_category(
                &self.ctx,
                self.group.id,
                CreateCategoryRequest {
                    name: format!("Manual {prefix}"),
                    prefix: prefix.into(),
                    sequence_managed: false,
                },
            )
            .await
            .expect("create manual category")
    }
}

pub fn create_request(category_id: CategoryId) -> CreateDocumentRequest {
    CreateDocumentRequest {
        category_id,
        template_id: None,
        sender: "Board of Directors".into(),
        recipient: "All staff".into(),
        subject: "Budget review".into(),
        body: "Please review the attached budget.".into(),
        document_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        prefix: None,
        year: None,
        sequential: None,
        code: None,
    }
}

pub fn update_request(subject: &str) -> UpdateDocumentRequest {
    UpdateDocumentRequest {
        template_id: None,
        sender: "Board of Directors".into(),
        recipient: "All staff".into(),
        subject: subject.into(),
        body: "Please review the attached budget.".into(),
        document_date: NaiveDate::from_ymd_opt(2024, 6, 2).expect("valid date"),
        prefix: None,
        year: None,
        sequential: None,
        code: None,
    }
}
