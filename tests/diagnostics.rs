//! Diagnostics Integration Tests
//!
//! Tests for the sharing self-test, including the end-to-end test share.

mod common;

use clipshare::adapters::SharePayload;
use clipshare::core::run_diagnostics_with_share;
use clipshare::domain::ShareMethod;
use common::{Harness, ScriptedPlatform};
use tempfile::TempDir;

fn harness(platform: ScriptedPlatform) -> Harness {
    Harness::new(TempDir::new().unwrap(), Vec::new(), Vec::new(), platform)
}

#[tokio::test]
async fn test_share_test_uses_local_file_path() {
    let harness = harness(ScriptedPlatform::default());

    let report = run_diagnostics_with_share(&harness.orchestrator).await;

    assert!(report.sharing_available);
    assert!(report.file_system_access);
    assert!(report.is_healthy());
    assert_eq!(report.test_results.len(), 1);
    assert!(report.test_results[0].success);
    assert_eq!(report.test_results[0].method, ShareMethod::LocalFile);

    let test_audio = harness.path().join("shared").join("test_audio.mp3");
    let calls = harness.platform.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, SharePayload::File(test_audio.clone()));
    assert_eq!(calls[0].1.dialog_title, "Share Test Audio");

    // Both throwaway files are removed
    assert!(!test_audio.exists());
    assert!(!harness.path().join("shared").join("test_sharing.txt").exists());
}

#[tokio::test]
async fn test_failed_test_share_is_unhealthy() {
    let harness = harness(ScriptedPlatform {
        fail_files: true,
        ..Default::default()
    });

    let report = run_diagnostics_with_share(&harness.orchestrator).await;

    assert!(report.file_system_access);
    assert!(!report.is_healthy());
    assert!(!report.test_results[0].success);
    assert!(!harness.path().join("shared").join("test_audio.mp3").exists());
}

#[tokio::test]
async fn test_share_test_skipped_when_unavailable() {
    let harness = harness(ScriptedPlatform {
        unavailable: true,
        ..Default::default()
    });

    let report = run_diagnostics_with_share(&harness.orchestrator).await;

    assert!(!report.sharing_available);
    assert_eq!(report.test_results.len(), 1);
    assert_eq!(report.test_results[0].method, ShareMethod::Unsupported);
    assert!(harness.platform.calls().is_empty());
}
