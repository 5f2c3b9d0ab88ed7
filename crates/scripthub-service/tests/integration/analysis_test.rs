//! Analysis lifecycle, versioning, env, and log tests through the service
//! API.

use scripthub_core::error::ErrorKind;
use scripthub_entity::tree;
use scripthub_service::{CreateAnalysisRequest, UpdateAnalysisRequest};

use crate::helpers::TestHub;

#[tokio::test]
async fn test_create_analysis_registers_record_and_tree_ref() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;
    let analysis_id = hub.create_analysis("report", Some(&team_id)).await;

    let record = hub.analyses.get_analysis(&analysis_id).await.unwrap();
    assert_eq!(record.name, "report");
    assert_eq!(record.team_id.as_deref(), Some(team_id.as_str()));
    assert!(record.enabled);
    assert_eq!(record.path, format!("analyses/{analysis_id}"));

    let doc = hub.config.get().await.unwrap();
    assert!(tree::find_item(&doc.team_structure[&team_id].items, &analysis_id).is_some());

    // Content was saved as version 1 and is live.
    let versions = hub.analyses.list_versions(&analysis_id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(
        hub.analyses.get_content(&analysis_id, None).await.unwrap(),
        "console.log('report');"
    );
}

#[tokio::test]
async fn test_create_analysis_requires_name() {
    let hub = TestHub::new().await;
    let err = hub
        .analyses
        .create_analysis(CreateAnalysisRequest {
            name: " ".to_string(),
            content: String::new(),
            team_id: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_update_content_versions_and_dedups() {
    let hub = TestHub::new().await;
    let analysis_id = hub.create_analysis("report", None).await;

    let v2 = hub
        .analyses
        .update_content(&analysis_id, "updated();")
        .await
        .unwrap();
    assert_eq!(v2.version, 2);

    // Saving identical content again returns the same descriptor.
    let again = hub
        .analyses
        .update_content(&analysis_id, "updated();")
        .await
        .unwrap();
    assert_eq!(again.version, 2);
    assert_eq!(hub.analyses.list_versions(&analysis_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rollback_restores_content_and_clears_logs() {
    let hub = TestHub::new().await;
    let analysis_id = hub.create_analysis("report", None).await;
    hub.analyses
        .update_content(&analysis_id, "version two")
        .await
        .unwrap();
    hub.analyses
        .append_log(&analysis_id, "run output")
        .await
        .unwrap();

    let outcome = hub.analyses.rollback(&analysis_id, 1).await.unwrap();
    assert_eq!(outcome.restored_version, 1);
    assert_eq!(outcome.preserved.expect("preserved").version, 3);

    assert_eq!(
        hub.analyses.get_content(&analysis_id, None).await.unwrap(),
        "console.log('report');"
    );
    assert_eq!(hub.analyses.read_logs(&analysis_id).await.unwrap(), "");

    let err = hub.analyses.rollback(&analysis_id, 42).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::VersionNotFound);
}

#[tokio::test]
async fn test_get_content_version_semantics() {
    let hub = TestHub::new().await;
    let analysis_id = hub.create_analysis("report", None).await;
    hub.analyses
        .update_content(&analysis_id, "version two")
        .await
        .unwrap();

    assert_eq!(
        hub.analyses.get_content(&analysis_id, Some(0)).await.unwrap(),
        "version two"
    );
    assert_eq!(
        hub.analyses.get_content(&analysis_id, Some(1)).await.unwrap(),
        "console.log('report');"
    );
    let err = hub
        .analyses
        .get_content(&analysis_id, Some(9))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::VersionNotFound);

    let err = hub.analyses.get_content("missing", None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_analysis_patch() {
    let hub = TestHub::new().await;
    let analysis_id = hub.create_analysis("report", None).await;

    let err = hub
        .analyses
        .update_analysis(&analysis_id, UpdateAnalysisRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let updated = hub
        .analyses
        .update_analysis(&analysis_id, UpdateAnalysisRequest {
            name: Some("renamed".into()),
            enabled: Some(false),
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "renamed");
    assert!(!updated.enabled);
    // The id is stable across renames.
    assert_eq!(updated.id, analysis_id);
}

#[tokio::test]
async fn test_delete_analysis_cascades() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;
    let analysis_id = hub.create_analysis("report", Some(&team_id)).await;
    hub.analyses
        .set_env(&analysis_id, "KEY=value\n")
        .await
        .unwrap();
    assert!(hub.layout.analysis_dir(&analysis_id).exists());

    hub.analyses.delete_analysis(&analysis_id).await.unwrap();

    let err = hub.analyses.get_analysis(&analysis_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let doc = hub.config.get().await.unwrap();
    assert!(tree::find_item(&doc.team_structure[&team_id].items, &analysis_id).is_none());
    assert!(!hub.layout.analysis_dir(&analysis_id).exists());

    let err = hub.analyses.delete_analysis(&analysis_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_env_round_trip() {
    let hub = TestHub::new().await;
    let analysis_id = hub.create_analysis("report", None).await;

    assert_eq!(hub.analyses.get_env(&analysis_id).await.unwrap(), "");

    hub.analyses
        .set_env(&analysis_id, "API_KEY=secret\nMODE=fast\n")
        .await
        .unwrap();
    assert_eq!(
        hub.analyses.get_env(&analysis_id).await.unwrap(),
        "API_KEY=secret\nMODE=fast\n"
    );

    let err = hub.analyses.get_env("missing").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_logs_append_read_clear() {
    let hub = TestHub::new().await;
    let analysis_id = hub.create_analysis("report", None).await;

    hub.analyses.append_log(&analysis_id, "started").await.unwrap();
    hub.analyses.append_log(&analysis_id, "done").await.unwrap();
    assert_eq!(
        hub.analyses.read_logs(&analysis_id).await.unwrap(),
        "started\ndone\n"
    );

    hub.analyses.clear_logs(&analysis_id).await.unwrap();
    assert_eq!(hub.analyses.read_logs(&analysis_id).await.unwrap(), "");
}
