//! Single-frame thumbnail extraction.

use std::path::{Path, PathBuf};

use reelsmith_common::error::{ReelError, ReelResult};

use crate::encode::{base_args, fit_to_frame, secs};
use crate::filter_graph::simple_chain;
use crate::tool::{path_arg, Invocation, MediaTool};

pub const THUMBNAIL_WIDTH: u32 = 1280;
pub const THUMBNAIL_HEIGHT: u32 = 720;
pub const DEFAULT_THUMBNAIL_AT_SECS: f64 = 1.0;

pub fn thumbnail_args(video: &Path, output: &Path, at_secs: f64) -> Vec<String> {
    let mut args = base_args();
    args.extend([
        "-ss".to_string(),
        secs(at_secs.max(0.0)),
        "-i".to_string(),
        path_arg(video),
        "-frames:v".to_string(),
        "1".to_string(),
        "-vf".to_string(),
        simple_chain(&fit_to_frame(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT)),
        "-q:v".to_string(),
        "2".to_string(),
        path_arg(output),
    ]);
    args
}

/// Grab the frame at `at_secs` from `video` as a 1280x720 letterboxed JPEG.
pub async fn extract_thumbnail(
    tool: &dyn MediaTool,
    video: &Path,
    output: &Path,
    at_secs: f64,
) -> ReelResult<PathBuf> {
    if !video.exists() {
        return Err(ReelError::FileNotFound {
            path: video.to_path_buf(),
        });
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(
        video = %video.display(),
        output = %output.display(),
        at_secs,
        "Extracting thumbnail"
    );

    tool.run(&Invocation::encode(
        "thumbnail",
        thumbnail_args(video, output, at_secs),
    ))
    .await?;
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_args_seek_before_input() {
        let args = thumbnail_args(Path::new("in.mp4"), Path::new("thumb.jpg"), 2.5);
        let joined = args.join(" ");
        assert!(joined.contains("-ss 2.500 -i in.mp4 -frames:v 1"));
        assert!(joined.contains("pad=1280:720:(ow-iw)/2:(oh-ih)/2"));
        assert!(joined.ends_with("-q:v 2 thumb.jpg"));
    }
}
