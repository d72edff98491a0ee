//! Media probing via ffprobe.

use std::path::Path;

use reelsmith_common::error::{ReelError, ReelResult};

use crate::tool::{path_arg, Invocation, MediaTool};

/// Probe invocation that prints the container duration as a bare number.
pub fn duration_probe(path: &Path) -> Invocation {
    Invocation::probe(
        format!("probe {}", path.display()),
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path_arg(path),
        ],
    )
}

/// Return the real duration of a media file in seconds.
pub async fn probe_duration(tool: &dyn MediaTool, path: &Path) -> ReelResult<f64> {
    if !path.exists() {
        return Err(ReelError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let stdout = tool.run(&duration_probe(path)).await?;
    let secs = parse_probe_duration(&stdout)
        .map_err(|e| ReelError::probe(format!("{}: {e}", path.display())))?;

    tracing::debug!(path = %path.display(), duration_secs = secs, "Probed duration");
    Ok(secs)
}

/// Parse ffprobe's single-number duration output.
pub fn parse_probe_duration(stdout: &str) -> ReelResult<f64> {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| ReelError::probe("ffprobe printed no duration"))?;

    let secs: f64 = line
        .parse()
        .map_err(|_| ReelError::probe(format!("unparseable duration '{line}'")))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(ReelError::probe(format!("non-positive duration '{line}'")));
    }
    Ok(secs)
}
