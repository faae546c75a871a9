//! Code sequencing through the document service.

mod common;

use std::collections::BTreeSet;

use docreg_core::error::ErrorKind;
use docreg_database::DocumentStore;
use docreg_entity::document::{NewDocument, SequenceSlot};

use common::{TestApp, create_request, update_request};

#[tokio::test]
async fn test_managed_codes_are_gapless() {
    let app = TestApp::new().await;

    for expected in 1..=5 {
        let doc = app
            .services
            .documents
            .create(&app.ctx, create_request(app.memo.id))
            .await
            .unwrap();
        assert_eq!(doc.sequential, Some(expected));
        assert_eq!(doc.year, Some(2024));
        assert_eq!(doc.code, Some(format!("MEM Nº {expected:03}/2024")));
        assert!(doc.sequence_managed);
    }
}

#[tokio::test]
async fn test_first_and_second_memo_of_the_year() {
    let app = TestApp::new().await;
    let first = app
        .services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();
    let second = app
        .services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();

    assert_eq!(first.code.as_deref(), Some("MEM Nº 001/2024"));
    assert_eq!(first.sequential, Some(1));
    assert_eq!(second.code.as_deref(), Some("MEM Nº 002/2024"));
    assert_eq!(second.sequential, Some(2));
}

#[tokio::test]
async fn test_managed_ignores_caller_sequencing() {
    let app = TestApp::new().await;
    let mut req = create_request(app.memo.id);
    req.year = Some(1999);
    req.sequential = Some(77);
    req.code = Some("CUSTOM-1".into());

    let doc = app.services.documents.create(&app.ctx, req).await.unwrap();
    assert_eq!(doc.code.as_deref(), Some("MEM Nº 001/2024"));
}

#[tokio::test]
async fn test_request_prefix_overrides_category_prefix() {
    let app = TestApp::new().await;
    let mut req = create_request(app.memo.id);
    req.prefix = Some("DIR".into());
    let doc = app.services.documents.create(&app.ctx, req).await.unwrap();
    assert_eq!(doc.code.as_deref(), Some("DIR Nº 001/2024"));

    let mut req = create_request(app.memo.id);
    req.prefix = Some("   ".into());
    let doc = app.services.documents.create(&app.ctx, req).await.unwrap();
    assert_eq!(doc.code.as_deref(), Some("MEM Nº 002/2024"));
}

#[tokio::test]
async fn test_partitions_are_independent() {
    let app = TestApp::new().await;
    let memo = app
        .services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();
    let letter = app
        .services
        .documents
        .create(&app.ctx, create_request(app.letter.id))
        .await
        .unwrap();
    let next_year = app
        .services
        .documents
        .create(&app.ctx_in_year(2025), create_request(app.memo.id))
        .await
        .unwrap();

    assert_eq!(memo.code.as_deref(), Some("MEM Nº 001/2024"));
    assert_eq!(letter.code.as_deref(), Some("OFC Nº 001/2024"));
    assert_eq!(next_year.code.as_deref(), Some("MEM Nº 001/2025"));
}

#[tokio::test]
async fn test_four_digit_sequentials_are_not_truncated() {
    let app = TestApp::new().await;
    app.store
        .insert_document(&NewDocument {
            group_id: app.group.id,
            category_id: app.memo.id,
            template_id: None,
            created_by: app.ctx.user_id,
            sender: "Legacy".into(),
            recipient: "Archive".into(),
            subject: "Imported".into(),
            body: "Imported".into(),
            document_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            slot: SequenceSlot {
                year: Some(2024),
                sequential: Some(999),
                code: Some("MEM Nº 999/2024".into()),
                managed: true,
            },
        })
        .await
        .unwrap();

    let doc = app
        .services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();
    assert_eq!(doc.sequential, Some(1000));
    assert_eq!(doc.code.as_deref(), Some("MEM Nº 1000/2024"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_sequentials() {
    let app = TestApp::new().await;
    let mut handles = Vec::new();
    for _ in 0..20 {
        let documents = app.services.documents.clone();
        let ctx = app.ctx.clone();
        let req = create_request(app.memo.id);
        handles.push(tokio::spawn(
            async move { documents.create(&ctx, req).await },
        ));
    }

    let mut sequentials = BTreeSet::new();
    for handle in handles {
        let doc = handle.await.unwrap().unwrap();
        sequentials.insert(doc.sequential.unwrap());
    }
    assert_eq!(sequentials, (1..=20).collect::<BTreeSet<i32>>());
}

#[tokio::test]
async fn test_manual_duplicate_code_degrades_to_null() {
    let app = TestApp::new().await;
    let category = app.manual_category("CIR").await;

    let mut req = create_request(category.id);
    req.code = Some("X-1".into());
    let first = app.services.documents.create(&app.ctx, req.clone()).await.unwrap();
    assert_eq!(first.code.as_deref(), Some("X-1"));
    assert!(!first.sequence_managed);

    let second = app.services.documents.create(&app.ctx, req).await.unwrap();
    assert_eq!(second.code, None);
    assert_ne!(second.id, first.id);
}

#[tokio::test]
async fn test_manual_code_synthesized_from_year_and_sequential() {
    let app = TestApp::new().await;
    let category = app.manual_category("CIR").await;

    let mut req = create_request(category.id);
    req.year = Some(2023);
    req.sequential = Some(12);
    let doc = app.services.documents.create(&app.ctx, req.clone()).await.unwrap();
    assert_eq!(doc.code.as_deref(), Some("CIR Nº 012/2023"));
    assert_eq!(doc.year, Some(2023));
    assert_eq!(doc.sequential, Some(12));

    // Same synthesized code again: kept without a code.
    let again = app.services.documents.create(&app.ctx, req).await.unwrap();
    assert_eq!(again.code, None);
    assert_eq!(again.sequential, Some(12));

    // Year alone does not produce a code.
    let mut req = create_request(category.id);
    req.year = Some(2023);
    let doc = app.services.documents.create(&app.ctx, req).await.unwrap();
    assert_eq!(doc.code, None);
    assert_eq!(doc.sequential, None);
}

#[tokio::test]
async fn test_managed_update_keeps_sequential() {
    let app = TestApp::new().await;
    let doc = app
        .services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();
    app.services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();

    let updated = app
        .services
        .documents
        .update(&app.ctx_in_year(2025), doc.id, update_request("Revised"))
        .await
        .unwrap();
    assert_eq!(updated.subject, "Revised");
    assert_eq!(updated.sequential, Some(1));
    assert_eq!(updated.code.as_deref(), Some("MEM Nº 001/2024"));
}

#[tokio::test]
async fn test_managed_update_to_taken_code_is_rejected() {
    let app = TestApp::new().await;
    app.services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();
    let second = app
        .services
        .documents
        .create(&app.ctx, create_request(app.memo.id))
        .await
        .unwrap();

    // An imported document already holds the code the prefix change would produce.
    app.store
        .insert_document(&NewDocument {
            group_id: app.group.id,
            category_id: app.memo.id,
            template_id: None,
            created_by: app.ctx.user_id,
            sender: "Legacy".into(),
            recipient: "Archive".into(),
            subject: "Imported".into(),
            body: "Imported".into(),
            document_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            slot: SequenceSlot {
                year: None,
                sequential: None,
                code: Some("DIR Nº 002/2024".into()),
                managed: false,
            },
        })
        .await
        .unwrap();

    let mut req = update_request("Clash");
    req.prefix = Some("DIR".into());
    let err = app
        .services
        .documents
        .update(&app.ctx, second.id, req)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateCode);

    let stored = app.store.find_document(second.id).await.unwrap().unwrap();
    assert_eq!(stored.code.as_deref(), Some("MEM Nº 002/2024"));
    assert_eq!(stored.subject, second.subject);

    let mut req = update_request("Moved");
    req.prefix = Some("OUT".into());
    let moved = app
        .services
        .documents
        .update(&app.ctx, second.id, req)
        .await
        .unwrap();
    assert_eq!(moved.code.as_deref(), Some("OUT Nº 002/2024"));
    assert_eq!(moved.sequential, Some(2));
}

#[tokio::test]
async fn test_manual_update_duplicate_aborts_whole_update() {
    let app = TestApp::new().await;
    let category = app.manual_category("CIR").await;

    let mut req = create_request(category.id);
    req.code = Some("X-1".into());
    app.services.documents.create(&app.ctx, req).await.unwrap();

    let mut req = create_request(category.id);
    req.code = Some("X-2".into());
    let doc = app.services.documents.create(&app.ctx, req).await.unwrap();

    let mut update = update_request("Changed subject");
    update.code = Some("X-1".into());
    let err = app
        .services
        .documents
        .update(&app.ctx, doc.id, update)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateCode);

    let stored = app.store.find_document(doc.id).await.unwrap().unwrap();
    assert_eq!(stored, doc);
}

#[tokio::test]
async fn test_manual_update_keeps_omitted_sequencing_fields() {
    let app = TestApp::new().await;
    let category = app.manual_category("CIR").await;

    let mut req = create_request(category.id);
    req.year = Some(2023);
    req.sequential = Some(7);
    req.code = Some("X-1".into());
    let doc = app.services.documents.create(&app.ctx, req).await.unwrap();

    let updated = app
        .services
        .documents
        .update(&app.ctx, doc.id, update_request("Subject only"))
        .await
        .unwrap();
    assert_eq!(updated.subject, "Subject only");
    assert_eq!(updated.year, Some(2023));
    assert_eq!(updated.sequential, Some(7));
    assert_eq!(updated.code.as_deref(), Some("X-1"));

    let mut req = update_request("New sequential");
    req.sequential = Some(8);
    let updated = app
        .services
        .documents
        .update(&app.ctx, doc.id, req)
        .await
        .unwrap();
    assert_eq!(updated.sequential, Some(8));
    assert_eq!(updated.year, Some(2023));
    assert_eq!(updated.code.as_deref(), Some("X-1"));
}

#[tokio::test]
async fn test_managed_update_allocates_in_stored_year() {
    let app = TestApp::new().await;
    let imported = app
        .store
        .insert_document(&NewDocument {
            group_id: app.group.id,
            category_id: app.memo.id,
            template_id: None,
            created_by: app.ctx.user_id,
            sender: "Legacy".into(),
            recipient: "Archive".into(),
            subject: "Imported".into(),
            body: "Imported".into(),
            document_date: chrono::NaiveDate::from_ymd_opt(2023, 11, 20).unwrap(),
            slot: SequenceSlot {
                year: Some(2023),
                sequential: None,
                code: None,
                managed: true,
            },
        })
        .await
        .unwrap();

    let updated = app
        .services
        .documents
        .update(&app.ctx_in_year(2024), imported.id, update_request("Renumbered"))
        .await
        .unwrap();
    assert_eq!(updated.year, Some(2023));
    assert_eq!(updated.sequential, Some(1));
    assert_eq!(updated.code.as_deref(), Some("MEM Nº 001/2023"));

    let current = app
        .services
        .documents
        .create(&app.ctx_in_year(2024), create_request(app.memo.id))
        .await
        .unwrap();
    assert_eq!(current.code.as_deref(), Some("MEM Nº 001/2024"));
}
