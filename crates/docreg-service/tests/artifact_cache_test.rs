//! Idempotent PDF generation.

mod common;

use std::sync::Arc;

use bytes::Bytes;

use docreg_core::error::ErrorKind;
use docreg_core::traits::storage::StorageProvider;
use docreg_database::ArtifactStore;
use docreg_entity::artifact::{ArtifactKind, PDF_MIME};
use docreg_entity::document::Document;
use docreg_entity::template::{FieldMap, Template};
use docreg_render::generated_path;
use docreg_service::{CreateLayoutTemplateRequest, CreatePlainTemplateRequest};

use common::{TestApp, create_request, update_request};

async fn plain_template(app: &TestApp, body: &str) -> Template {
    app.services
        .templates
        .create_plain(CreatePlainTemplateRequest {
            name: "Memo".into(),
            body: body.into(),
        })
        .await
        .unwrap()
}

async fn document_with(app: &TestApp, template: &Template) -> Document {
    let mut req = create_request(app.memo.id);
    req.template_id = Some(template.id);
    app.services.documents.create(&app.ctx, req).await.unwrap()
}

fn layout_request(layout: &str) -> CreateLayoutTemplateRequest {
    CreateLayoutTemplateRequest {
        name: "Letterhead".into(),
        layout: Bytes::from(layout.to_string()),
        field_map: FieldMap::from_pairs([
            ("recipient", "[[RECIPIENT]]"),
            ("subject", "[[SUBJECT]]"),
            ("code", "[[CODE]]"),
        ]),
    }
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let app = TestApp::new().await;
    let template = plain_template(&app, "<b>{{ subject }}</b><br>{{ body }}").await;
    let doc = document_with(&app, &template).await;

    let first = app.services.documents.generate_pdf(&app.ctx, doc.id).await.unwrap();
    let second = app.services.documents.generate_pdf(&app.ctx, doc.id).await.unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.artifact.id, second.artifact.id);
    assert_eq!(app.renderer.count(), 1);

    let artifacts = app.store.list_artifacts(doc.id).await.unwrap();
    assert_eq!(artifacts.len(), 1);
    let artifact = &artifacts[0];
    assert_eq!(artifact.kind, ArtifactKind::Generated);
    assert_eq!(artifact.mime_type, PDF_MIME);
    assert_eq!(artifact.original_name, "Finance_MEM_001.pdf");
    assert_eq!(artifact.size_bytes, first.bytes.len() as i64);
    let hash = artifact.content_hash.as_deref().unwrap();
    assert_eq!(artifact.storage_path, generated_path(hash));
}

#[tokio::test]
async fn test_missing_file_is_regenerated() {
    let app = TestApp::new().await;
    let template = plain_template(&app, "{{ subject }}").await;
    let doc = document_with(&app, &template).await;

    let first = app.services.documents.generate_pdf(&app.ctx, doc.id).await.unwrap();
    app.storage.delete(&first.artifact.storage_path).await.unwrap();

    let again = app.services.documents.generate_pdf(&app.ctx, doc.id).await.unwrap();
    assert!(!again.cache_hit);
    assert_eq!(again.bytes, first.bytes);
    assert_eq!(again.artifact.id, first.artifact.id);
    assert_eq!(app.renderer.count(), 2);
    assert!(app.storage.exists(&first.artifact.storage_path).await.unwrap());
    assert_eq!(app.store.list_artifacts(doc.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_document_without_template_is_rejected() {
    let app = TestApp::new().await;
    let doc = app
        .services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();

    let err = app
        .services
        .documents
        .generate_pdf(&app.ctx, doc.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingTemplate);
    assert_eq!(app.renderer.count(), 0);
    assert!(app.store.list_artifacts(doc.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_identical_content_shares_one_file() {
    let app = TestApp::new().await;
    let template = plain_template(&app, "{{ subject }}").await;
    let first_doc = document_with(&app, &template).await;
    let second_doc = document_with(&app, &template).await;

    let first = app
        .services
        .documents
        .generate_pdf(&app.ctx, first_doc.id)
        .await
        .unwrap();
    let second = app
        .services
        .documents
        .generate_pdf(&app.ctx, second_doc.id)
        .await
        .unwrap();

    assert_eq!(first.artifact.storage_path, second.artifact.storage_path);
    assert_ne!(first.artifact.id, second.artifact.id);
    assert_eq!(
        app.store
            .count_by_path(&first.artifact.storage_path)
            .await
            .unwrap(),
        2
    );
    assert_eq!(app.storage.len(), 1);

    // Deleting one document keeps the file the other still references.
    app.services
        .documents
        .delete(&app.ctx, first_doc.id)
        .await
        .unwrap();
    assert!(
        app.storage
            .exists(&second.artifact.storage_path)
            .await
            .unwrap()
    );
    let served = app
        .services
        .documents
        .generate_pdf(&app.ctx, second_doc.id)
        .await
        .unwrap();
    assert!(served.cache_hit);
}

#[tokio::test]
async fn test_changed_content_gets_new_artifact() {
    let app = TestApp::new().await;
    let template = plain_template(&app, "{{ subject }}").await;
    let doc = document_with(&app, &template).await;

    let before = app.services.documents.generate_pdf(&app.ctx, doc.id).await.unwrap();

    let mut req = update_request("Revised budget");
    req.template_id = Some(template.id);
    app.services
        .documents
        .update(&app.ctx, doc.id, req)
        .await
        .unwrap();
    let after = app.services.documents.generate_pdf(&app.ctx, doc.id).await.unwrap();

    assert!(!after.cache_hit);
    assert_ne!(after.artifact.storage_path, before.artifact.storage_path);
    assert_ne!(after.bytes, before.bytes);
    assert_eq!(app.store.list_artifacts(doc.id).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_render_once() {
    let app = TestApp::new().await;
    let template = plain_template(&app, "{{ subject }}").await;
    let doc = document_with(&app, &template).await;

    let documents = Arc::new(app.services.documents.clone());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let documents = documents.clone();
        let ctx = app.ctx.clone();
        let id = doc.id;
        handles.push(tokio::spawn(async move {
            documents.generate_pdf(&ctx, id).await
        }));
    }

    let mut bytes = Vec::new();
    for handle in handles {
        bytes.push(handle.await.unwrap().unwrap().bytes);
    }
    assert!(bytes.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(app.renderer.count(), 1);
    assert_eq!(app.store.list_artifacts(doc.id).await.unwrap().len(), 1);
    assert_eq!(app.services.cache.in_flight(), 0);
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let app = TestApp::new().await;
    let template = plain_template(&app, "{{ code }} {{ subject }}").await;
    let doc = document_with(&app, &template).await;

    let first = app.services.documents.generate_pdf(&app.ctx, doc.id).await.unwrap();

    let restarted = app.restarted();
    let again = restarted
        .documents
        .generate_pdf(&app.ctx, doc.id)
        .await
        .unwrap();
    assert!(again.cache_hit);
    assert_eq!(again.artifact.storage_path, first.artifact.storage_path);
    assert_eq!(app.renderer.count(), 1);
}

#[tokio::test]
async fn test_layout_template_fills_placeholders() {
    let app = TestApp::new().await;
    let template = app
        .services
        .templates
        .create_layout(layout_request(
            "[[CODE]]\nTo: [[RECIPIENT]]\nRe: [[SUBJECT]]",
        ))
        .await
        .unwrap();
    let doc = document_with(&app, &template).await;

    let pdf = app.services.documents.generate_pdf(&app.ctx, doc.id).await.unwrap();
    let text = String::from_utf8(pdf.bytes.to_vec()).unwrap();
    assert!(text.contains("MEM Nº 001/2024"));
    assert!(text.contains("To: All staff"));
    assert!(text.contains("Re: Budget review"));
    assert!(!text.contains("[["));
}

#[tokio::test]
async fn test_layout_with_unmatched_placeholder_is_rejected() {
    let app = TestApp::new().await;
    let err = app
        .services
        .templates
        .create_layout(layout_request("To: [[RECIPIENT]]\nRe: [[SUBJECT]]"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.services.templates.list().await.unwrap().is_empty());
    assert!(app.storage.is_empty());

    let mut req = layout_request("[[CODE]] [[RECIPIENT]] [[SUBJECT]]");
    req.layout = Bytes::from_static(&[0xff, 0xfe, 0x00]);
    let err = app.services.templates.create_layout(req).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
