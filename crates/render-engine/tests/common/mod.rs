//! Scripted media tool and fixtures shared by the render-engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use reelsmith_common::error::{ReelError, ReelResult};
use reelsmith_render_engine::tool::{Invocation, MediaTool, ToolKind};

/// Records every invocation and plays back scripted results.
///
/// Encodes write a small placeholder file to their output path. Probes answer
/// from the configured duration table. Any invocation whose label contains a
/// configured failure fragment exits non-zero, leaving a partial output
/// behind the way a crashed ffmpeg would.
#[derive(Default)]
pub struct ScriptedTool {
    calls: Mutex<Vec<Invocation>>,
    durations: HashMap<String, f64>,
    failing_labels: Vec<String>,
}

impl ScriptedTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(mut self, path: &Path, secs: f64) -> Self {
        self.durations.insert(path.display().to_string(), secs);
        self
    }

    pub fn failing(mut self, label_fragment: &str) -> Self {
        self.failing_labels.push(label_fragment.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.label).collect()
    }

    pub fn call(&self, label: &str) -> Option<Invocation> {
        self.calls().into_iter().find(|c| c.label == label)
    }
}

#[async_trait::async_trait]
impl MediaTool for ScriptedTool {
    async fn run(&self, invocation: &Invocation) -> ReelResult<String> {
        self.calls.lock().unwrap().push(invocation.clone());

        let fails = self
            .failing_labels
            .iter()
            .any(|fragment| invocation.label.contains(fragment.as_str()));

        match invocation.kind {
            ToolKind::Probe => {
                let target = invocation.target().unwrap_or_default();
                match self.durations.get(target) {
                    Some(secs) if !fails => Ok(format!("{secs:.6}\n")),
                    _ => Err(ReelError::ToolFailed {
                        tool: "ffprobe".to_string(),
                        status: "exit status: 1".to_string(),
                        stderr: format!("{target}: Invalid data found when processing input"),
                    }),
                }
            }
            ToolKind::Encode => {
                if let Some(target) = invocation.target() {
                    std::fs::write(target, b"scripted output")?;
                }
                if fails {
                    return Err(ReelError::ToolFailed {
                        tool: "ffmpeg".to_string(),
                        status: "exit status: 1".to_string(),
                        stderr: format!("{}: scripted failure", invocation.label),
                    });
                }
                Ok(String::new())
            }
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Create an asset file under `dir`.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"asset").unwrap();
    path
}

/// Names of every file left in `dir`, sorted.
pub fn leftover_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
