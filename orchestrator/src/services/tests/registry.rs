//! Tests for GhProjectRegistry

use std::time::Duration;

use super::common::{failed_output, ok_output};
use crate::error::OrchestratorError;
use crate::services::registry::GhProjectRegistry;
use crate::traits::{MockCommandRunner, ProjectRegistry};

#[tokio::test]
async fn test_lists_projects_for_configured_user() {
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(|spec| {
            spec.program == "gh"
                && spec.args == ["repo", "list", "octo", "--limit", "100", "--json", "name,description"]
                && spec.timeout == Duration::from_secs(5)
        })
        .times(1)
        .returning(|_| Ok(ok_output(r#"[{"name":"vibe-notes","description":"Notes"},{"name":"dots","description":null}]"#)));

    let registry =
        GhProjectRegistry::with_runner(runner, Some("octo".to_string())).with_timeout(Duration::from_secs(5));
    let projects = registry.list_projects(100).await.unwrap();

    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].name, "vibe-notes");
    assert_eq!(projects[1].description, None);
}

#[tokio::test]
async fn test_authenticated_user_omits_owner_argument() {
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(|spec| spec.args[..2] == ["repo", "list"] && spec.args[2] == "--limit")
        .returning(|_| Ok(ok_output("")));

    let projects = GhProjectRegistry::with_runner(runner, None).list_projects(10).await.unwrap();

    assert!(projects.is_empty());
}

#[tokio::test]
async fn test_nonzero_exit_is_collaborator_error() {
    let mut runner = MockCommandRunner::new();
    runner.expect_run().returning(|_| Ok(failed_output("gh: not logged in")));

    let err = GhProjectRegistry::with_runner(runner, None).list_projects(100).await.unwrap_err();

    match err {
        OrchestratorError::CollaboratorError { source_tag, message } => {
            assert_eq!(source_tag, "registry");
            assert!(message.contains("not logged in"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_output_is_an_error() {
    let mut runner = MockCommandRunner::new();
    runner.expect_run().returning(|_| Ok(ok_output("not json")));

    let result = GhProjectRegistry::with_runner(runner, None).list_projects(100).await;

    assert!(matches!(result, Err(OrchestratorError::JsonError(_))));
}
