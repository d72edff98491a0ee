//! External media tool invocation.
//!
//! Everything the render core asks of ffmpeg/ffprobe goes through the
//! [`MediaTool`] trait as an argument list. The production implementation
//! spawns the binaries; tests substitute a scripted one.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use reelsmith_common::config::ToolConfig;
use reelsmith_common::error::{ReelError, ReelResult};

/// Lines of stderr kept when a tool fails.
pub const STDERR_TAIL_LINES: usize = 20;

/// Byte cap on the kept stderr tail.
pub const STDERR_TAIL_BYTES: usize = 4096;

/// Which binary an invocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// ffprobe, inspection only.
    Probe,
    /// ffmpeg, produces an output file.
    Encode,
}

/// A single external tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub kind: ToolKind,

    /// Short description used in logs (e.g. `scene-2 motion`).
    pub label: String,

    /// Arguments, excluding the program name.
    pub args: Vec<String>,
}

impl Invocation {
    pub fn encode(label: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind: ToolKind::Encode,
            label: label.into(),
            args,
        }
    }

    pub fn probe(label: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind: ToolKind::Probe,
            label: label.into(),
            args,
        }
    }

    /// The trailing positional argument: the output file for encodes, the
    /// inspected file for probes.
    pub fn target(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }

    /// Value following the first occurrence of `flag`.
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// Trait for the external media tool (ffmpeg/ffprobe, or a test double).
#[async_trait::async_trait]
pub trait MediaTool: Send + Sync {
    /// Run the invocation to completion and return its stdout.
    ///
    /// Non-zero exit is [`ReelError::ToolFailed`] with a stderr tail;
    /// exceeding the time limit is [`ReelError::ToolTimeout`].
    async fn run(&self, invocation: &Invocation) -> ReelResult<String>;

    /// Check if the tool is available on the system.
    fn is_available(&self) -> bool;

    /// Tool name.
    fn name(&self) -> &str;
}

/// Spawns ffmpeg/ffprobe as child processes with per-call timeouts.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    config: ToolConfig,
}

impl FfmpegTool {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    fn binary(&self, kind: ToolKind) -> &Path {
        match kind {
            ToolKind::Probe => &self.config.ffprobe_path,
            ToolKind::Encode => &self.config.ffmpeg_path,
        }
    }

    fn time_limit(&self, kind: ToolKind) -> Duration {
        match kind {
            ToolKind::Probe => self.config.probe_timeout(),
            ToolKind::Encode => self.config.encode_timeout(),
        }
    }
}

impl Default for FfmpegTool {
    fn default() -> Self {
        Self::new(ToolConfig::default())
    }
}

#[async_trait::async_trait]
impl MediaTool for FfmpegTool {
    async fn run(&self, invocation: &Invocation) -> ReelResult<String> {
        let program = self.binary(invocation.kind);
        let tool = program_name(program);
        let limit = self.time_limit(invocation.kind);

        tracing::debug!(label = %invocation.label, args = ?invocation.args, "Running {tool}");

        let child = tokio::process::Command::new(program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReelError::render(format!("Failed to start {tool}: {e}")))?;

        let started = Instant::now();
        // Dropping the wait future on timeout kills the child (kill_on_drop).
        let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => {
                result.map_err(|e| ReelError::render(format!("Failed to wait on {tool}: {e}")))?
            }
            Err(_) => {
                tracing::warn!(
                    label = %invocation.label,
                    limit_secs = limit.as_secs(),
                    "{tool} timed out"
                );
                return Err(ReelError::ToolTimeout {
                    tool,
                    secs: limit.as_secs(),
                });
            }
        };

        tracing::debug!(
            label = %invocation.label,
            status = %output.status,
            elapsed_ms = started.elapsed().as_millis(),
            "{tool} finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReelError::ToolFailed {
                tool,
                status: output.status.to_string(),
                stderr: stderr_tail(&stderr),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn is_available(&self) -> bool {
        command_exists(&self.config.ffmpeg_path) && command_exists(&self.config.ffprobe_path)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Keep the last [`STDERR_TAIL_LINES`] lines of `stderr`, capped at
/// [`STDERR_TAIL_BYTES`].
pub fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    let tail = lines[start..].join("\n");

    if tail.len() <= STDERR_TAIL_BYTES {
        return tail;
    }
    let mut cut = tail.len() - STDERR_TAIL_BYTES;
    while !tail.is_char_boundary(cut) {
        cut += 1;
    }
    tail[cut..].to_string()
}

fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

/// Whether `binary` resolves to an executable (PATH lookup or explicit path).
pub fn command_exists(binary: &Path) -> bool {
    std::process::Command::new("sh")
        .arg("-c")
        .arg("command -v \"$1\" >/dev/null 2>&1")
        .arg("sh")
        .arg(binary)
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Render a path as a tool argument.
pub fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// Resolve `path` against the current directory without requiring it to exist.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
