//! Share surface backed by a system opener command.
//!
//! Files and URLs are passed to the opener (`xdg-open`, `open`, ...) as the
//! last argument. Text payloads are piped to a separate text command when one
//! is configured (e.g. a clipboard tool).

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::{SharePayload, ShareOptions, SharePlatform};

/// Default opener for the current operating system
pub fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Share surface that shells out to an opener command
pub struct CommandShare {
    program: String,
    args: Vec<String>,
    text_program: Option<String>,
    share_timeout: Duration,
}

impl Default for CommandShare {
    fn default() -> Self {
        Self::new(default_opener())
    }
}

impl CommandShare {
    /// Create a share surface using `program` as the opener
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            text_program: None,
            share_timeout: Duration::from_secs(60),
        }
    }

    /// Extra arguments placed before the payload
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Command receiving text payloads on stdin
    pub fn with_text_program(mut self, program: impl Into<String>) -> Self {
        self.text_program = Some(program.into());
        self
    }

    pub fn with_timeout(mut self, share_timeout: Duration) -> Self {
        self.share_timeout = share_timeout;
        self
    }

    async fn run(
        &self,
        mut command: Command,
        stdin_text: Option<&str>,
        options: &ShareOptions,
    ) -> Result<()> {
        // A timed-out opener must not outlive the share
        command
            .kill_on_drop(true)
            .env("CLIPSHARE_MIME_TYPE", &options.mime_type)
            .env("CLIPSHARE_DIALOG_TITLE", &options.dialog_title)
            .stdin(if stdin_text.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn share command '{}'", self.program))?;

        if let Some(text) = stdin_text {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(text.as_bytes())
                    .await
                    .context("Failed to write to share command stdin")?;
                // Drop stdin to signal EOF
            }
        }

        let output = timeout(self.share_timeout, child.wait_with_output())
            .await
            .with_context(|| format!("Share command timed out after {:?}", self.share_timeout))?
            .context("Failed to wait for share command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "Share command exited with code {}: {}",
                exit_code,
                stderr.trim()
            );
        }

        Ok(())
    }
}

#[async_trait]
impl SharePlatform for CommandShare {
    fn name(&self) -> &str {
        &self.program
    }

    async fn is_available(&self) -> bool {
        // Spawnable is good enough; openers disagree on --help exit codes
        Command::new(&self.program)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .is_ok()
    }

    async fn share(&self, payload: &SharePayload, options: &ShareOptions) -> Result<()> {
        match payload {
            SharePayload::File(path) => {
                let mut command = Command::new(&self.program);
                command.args(&self.args).arg(path);
                self.run(command, None, options).await
            }
            SharePayload::Url(url) => {
                let mut command = Command::new(&self.program);
                command.args(&self.args).arg(url);
                self.run(command, None, options).await
            }
            SharePayload::Text(text) => {
                let program = self.text_program.as_deref().with_context(|| {
                    format!("Text sharing is not supported by '{}'", self.program)
                })?;
                self.run(Command::new(program), Some(text), options).await
            }
        }
    }
}
