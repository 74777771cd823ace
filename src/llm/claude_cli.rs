//! Claude Code backend.
//!
//! Spawns `claude --print` inside a pseudo-terminal, since the CLI expects an
//! interactive terminal, and reads its output until EOF or the timeout.

use std::io::Read;
use std::process::Command;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use portable_pty::{CommandBuilder, NativePtySystem, PtySize, PtySystem};
use regex::Regex;

use super::{GenerationError, TextGenerator};

/// Default timeout for a plan request (5 minutes)
pub const DEFAULT_CLAUDE_TIMEOUT_SECS: u64 = 300;

pub struct ClaudeCliGenerator {
    timeout_secs: u64,
    model: Option<String>,
}

impl Default for ClaudeCliGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeCliGenerator {
    pub fn new() -> Self {
        Self {
            timeout_secs: DEFAULT_CLAUDE_TIMEOUT_SECS,
            model: None,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Check if Claude Code CLI is on the PATH
    pub fn is_claude_available() -> bool {
        Command::new("which")
            .arg("claude")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run_blocking(
        prompt: &str,
        model: Option<&str>,
        timeout_secs: u64,
    ) -> Result<String, GenerationError> {
        if !Self::is_claude_available() {
            return Err(GenerationError::ClaudeCodeNotFound);
        }

        let pty_system = NativePtySystem::default();
        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 200,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| GenerationError::Io(format!("Failed to open PTY: {}", e)))?;

        let mut cmd = CommandBuilder::new("claude");
        cmd.args(["--print", prompt]);
        if let Some(model) = model {
            cmd.args(["--model", model]);
        }

        let _child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| GenerationError::Io(format!("Failed to spawn claude: {}", e)))?;

        // Drop the slave so the reader sees EOF when the child exits
        drop(pair.slave);

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| GenerationError::Io(format!("Failed to clone PTY reader: {}", e)))?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut bytes = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => bytes.extend_from_slice(&buf[..n]),
                    Err(_) => break,
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&bytes).into_owned());
        });

        let output = rx
            .recv_timeout(Duration::from_secs(timeout_secs))
            .map_err(|_| GenerationError::Timeout(timeout_secs))?;

        check_output(&clean_terminal_output(&output))
    }
}

/// Remove ANSI escape sequences and carriage returns added by the terminal.
pub fn clean_terminal_output(raw: &str) -> String {
    let ansi = Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").ok();
    let stripped = match ansi {
        Some(re) => re.replace_all(raw, "").into_owned(),
        None => raw.to_string(),
    };
    stripped.replace('\r', "")
}

fn looks_like_list_item(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '*' | '\u{2022}'))
}

/// The CLI reports failures as a lone line of text. A plan never matches:
/// it is several lines, or a numbered/bulleted item.
fn failure_line(output: &str) -> Option<String> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next()?;
    if lines.next().is_some() || looks_like_list_item(first) {
        return None;
    }
    Some(first.to_lowercase())
}

/// Map known CLI failure text to typed errors.
fn check_output(output: &str) -> Result<String, GenerationError> {
    if output.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    if let Some(line) = failure_line(output) {
        if line.contains("not authenticated")
            || line.contains("please login")
            || line.contains("login required")
        {
            return Err(GenerationError::ClaudeCodeNotAuthenticated);
        }
        if line.contains("rate limit") || line.contains("too many requests") {
            return Err(GenerationError::RateLimited);
        }
    }
    Ok(output.to_string())
}

#[async_trait]
impl TextGenerator for ClaudeCliGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let prompt = prompt.to_string();
        let model = self.model.clone();
        let timeout_secs = self.timeout_secs;
        tokio::task::spawn_blocking(move || {
            Self::run_blocking(&prompt, model.as_deref(), timeout_secs)
        })
        .await
        .map_err(|e| GenerationError::Io(format!("Generator task failed: {}", e)))?
    }
}
