//! Sharing self-test.
//!
//! Reports whether the share surface is available and whether the private
//! directory can be written, read back and cleaned up. The full run also
//! shares a throwaway audio file through the orchestrator.

use serde::Serialize;
use tracing::warn;

use crate::adapters::{FileSystem, SharePlatform};
use crate::domain::{ShareOutcome, ShareRequest};

use super::debug_log::DebugLog;
use super::orchestrator::ShareOrchestrator;

const PROBE_FILE: &str = "test_sharing.txt";
const PROBE_CONTENT: &str = "Test file for sharing service";

const TEST_AUDIO_FILE: &str = "test_audio.mp3";
const TEST_AUDIO_CONTENT: &str = "fake mp3 content";
const TEST_AUDIO_TITLE: &str = "Test Audio";

/// Result of a diagnostics run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub platform: String,
    pub sharing_available: bool,
    pub file_system_access: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system_error: Option<String>,

    /// Outcomes of end-to-end test shares
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test_results: Vec<ShareOutcome>,
}

impl Diagnostics {
    pub fn is_healthy(&self) -> bool {
        self.sharing_available
            && self.file_system_access
            && self.test_results.iter().all(|outcome| outcome.success)
    }
}

pub async fn run_diagnostics(
    fs: &dyn FileSystem,
    platform: &dyn SharePlatform,
    log: &DebugLog,
) -> Diagnostics {
    log.log("Starting sharing diagnostics");

    let sharing_available = platform.is_available().await;
    log.log(format!("Sharing available: {}", sharing_available));

    let file_system_error = probe_file_system(fs).await.err();
    match &file_system_error {
        None => log.log("File system access: ok"),
        Some(error) => {
            warn!(%error, "File system probe failed");
            log.log(format!("File system access failed: {}", error));
        }
    }

    Diagnostics {
        platform: platform.name().to_string(),
        sharing_available,
        file_system_access: file_system_error.is_none(),
        file_system_error,
        test_results: Vec::new(),
    }
}

/// Diagnostics plus a test share of a throwaway audio file
///
/// The test share only runs when the private directory is usable.
pub async fn run_diagnostics_with_share(orchestrator: &ShareOrchestrator) -> Diagnostics {
    let fs = orchestrator.file_system();
    let log = orchestrator.debug_log();

    let mut report = run_diagnostics(fs.as_ref(), orchestrator.platform().as_ref(), log).await;
    if report.file_system_access {
        report.test_results = share_test_audio(orchestrator).await;
    }

    report
}

async fn share_test_audio(orchestrator: &ShareOrchestrator) -> Vec<ShareOutcome> {
    let fs = orchestrator.file_system();
    let log = orchestrator.debug_log();
    let path = fs.private_dir().join(TEST_AUDIO_FILE);

    if let Err(e) = fs.write(&path, TEST_AUDIO_CONTENT).await {
        warn!(error = %e, "Could not create test audio file");
        log.log(format!("Test audio sharing failed: {:#}", e));
        return Vec::new();
    }

    let request = ShareRequest::location(path.to_string_lossy(), TEST_AUDIO_TITLE);
    let outcome = orchestrator.share(&request).await;

    if let Err(e) = fs.delete(&path).await {
        warn!(error = %e, "Could not remove test audio file");
        log.log(format!("Failed to clean up test audio: {:#}", e));
    }

    vec![outcome]
}

async fn probe_file_system(fs: &dyn FileSystem) -> Result<(), String> {
    let probe = fs.private_dir().join(PROBE_FILE);

    fs.write(&probe, PROBE_CONTENT)
        .await
        .map_err(|e| format!("{:#}", e))?;

    let read_back = fs.read(&probe).await.map_err(|e| format!("{:#}", e));
    let deleted = fs.delete(&probe).await.map_err(|e| format!("{:#}", e));

    if read_back? != PROBE_CONTENT {
        return Err(format!("{} did not read back what was written", probe.display()));
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{CommandShare, LocalFileSystem};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_diagnostics_with_writable_dir() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFileSystem::new(temp.path().join("shared"));
        let platform = CommandShare::new("/nonexistent/clipshare-opener");
        let log = DebugLog::new(temp.path().join("debug.log"));

        let report = run_diagnostics(&fs, &platform, &log).await;

        assert!(report.file_system_access);
        assert!(!report.sharing_available);
        assert!(!report.is_healthy());
        assert!(!temp.path().join("shared").join(PROBE_FILE).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_diagnostics_with_unwritable_dir() {
        let temp = TempDir::new().unwrap();
        // A regular file cannot act as a directory
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let fs = LocalFileSystem::new(blocker.join("shared"));
        let platform = CommandShare::new("true");
        let log = DebugLog::new(temp.path().join("debug.log"));

        let report = run_diagnostics(&fs, &platform, &log).await;
        assert!(!report.file_system_access);
        assert!(report.file_system_error.is_some());
        assert!(report.test_results.is_empty());
    }
}
