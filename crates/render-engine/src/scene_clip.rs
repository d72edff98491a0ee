//! Per-scene clip rendering: still image + motion, then optional narration.

use std::path::{Path, PathBuf};

use reelsmith_common::error::{ReelError, ReelResult};
use reelsmith_scene_model::Scene;
use serde::{Deserialize, Serialize};

use crate::encode::{
    base_args, intermediate_audio_args, intermediate_video_args, secs, silent_audio_input,
};
use crate::filter_graph::simple_chain;
use crate::motion::motion_filters;
use crate::probe::probe_duration;
use crate::tool::{path_arg, Invocation, MediaTool};

/// Silence kept after the narration ends.
pub const AUDIO_DURATION_BUFFER_SECS: f64 = 0.1;

/// A rendered intermediate clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneClip {
    /// Manifest position of the scene.
    pub index: usize,
    pub scene_id: String,
    pub path: PathBuf,
    /// Realized duration in seconds.
    pub duration_secs: f64,
    /// Whether the clip's audio track is narration rather than silence.
    pub has_audio: bool,
}

/// Frame geometry and audio settings for intermediate clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipFormat {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub audio_bitrate_kbps: u32,
}

pub fn video_clip_path(work_dir: &Path, index: usize) -> PathBuf {
    work_dir.join(format!("scene-{index}-video.mp4"))
}

pub fn muxed_clip_path(work_dir: &Path, index: usize) -> PathBuf {
    work_dir.join(format!("scene-{index}-with-audio.mp4"))
}

/// Clip length given the nominal duration and the probed narration length.
pub fn realized_duration(nominal_secs: f64, audio_secs: Option<f64>) -> f64 {
    match audio_secs {
        Some(audio) => nominal_secs.max(audio + AUDIO_DURATION_BUFFER_SECS),
        None => nominal_secs,
    }
}

/// Render one scene into `work_dir`.
///
/// Every clip carries a stereo AAC track; a silent scene gets generated
/// silence. Audio problems never fail the scene: an unreadable narration
/// file makes the scene silent, and a failed mux keeps the silent clip.
pub async fn build_scene_clip(
    tool: &dyn MediaTool,
    scene: &Scene,
    work_dir: &Path,
    index: usize,
    format: ClipFormat,
) -> ReelResult<SceneClip> {
    let image = match &scene.image_file {
        Some(path) if path.is_file() => path.clone(),
        Some(path) => {
            return Err(ReelError::MissingAsset {
                scene_id: scene.id.clone(),
                path: path.clone(),
            })
        }
        None => {
            return Err(ReelError::manifest(format!(
                "scene '{}' has no imageFile",
                scene.id
            )))
        }
    };

    let audio = narration(tool, scene).await;
    let duration_secs = realized_duration(scene.nominal_duration(), audio.as_ref().map(|a| a.1));

    tracing::info!(
        scene = %scene.id,
        index,
        duration_secs,
        motion = scene.motion.as_str(),
        has_audio = audio.is_some(),
        "Rendering scene clip"
    );

    let video_path = video_clip_path(work_dir, index);
    let vf = simple_chain(&motion_filters(
        scene.motion,
        duration_secs,
        format.fps,
        format.width,
        format.height,
    ));

    let mut args = base_args();
    args.extend([
        "-loop".to_string(),
        "1".to_string(),
        "-framerate".to_string(),
        format.fps.to_string(),
        "-i".to_string(),
        path_arg(&image),
    ]);
    args.extend(silent_audio_input());
    args.extend([
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-vf".to_string(),
        vf,
        "-t".to_string(),
        secs(duration_secs),
        "-r".to_string(),
        format.fps.to_string(),
    ]);
    args.extend(intermediate_video_args());
    args.extend(intermediate_audio_args(format.audio_bitrate_kbps));
    args.push(path_arg(&video_path));

    let invocation = Invocation::encode(format!("scene-{index} motion"), args);
    if let Err(e) = tool.run(&invocation).await {
        remove_partial(&video_path);
        return Err(e);
    }

    let Some((audio_path, _)) = audio else {
        return Ok(SceneClip {
            index,
            scene_id: scene.id.clone(),
            path: video_path,
            duration_secs,
            has_audio: false,
        });
    };

    let muxed_path = muxed_clip_path(work_dir, index);
    let mut args = base_args();
    args.extend([
        "-i".to_string(),
        path_arg(&video_path),
        "-i".to_string(),
        path_arg(&audio_path),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
    ]);
    args.extend(intermediate_audio_args(format.audio_bitrate_kbps));
    // Pad narration with silence so -shortest stops at the video's end.
    args.extend([
        "-af".to_string(),
        "apad".to_string(),
        "-shortest".to_string(),
        path_arg(&muxed_path),
    ]);

    let invocation = Invocation::encode(format!("scene-{index} mux"), args);
    match tool.run(&invocation).await {
        Ok(_) => {
            remove_partial(&video_path);
            Ok(SceneClip {
                index,
                scene_id: scene.id.clone(),
                path: muxed_path,
                duration_secs,
                has_audio: true,
            })
        }
        Err(e) => {
            tracing::warn!(
                scene = %scene.id,
                error = %e,
                "Audio mux failed; keeping silent clip"
            );
            remove_partial(&muxed_path);
            Ok(SceneClip {
                index,
                scene_id: scene.id.clone(),
                path: video_path,
                duration_secs,
                has_audio: false,
            })
        }
    }
}

/// The scene's narration file and its probed length, if usable.
async fn narration(tool: &dyn MediaTool, scene: &Scene) -> Option<(PathBuf, f64)> {
    let path = scene.audio_file.as_ref()?;
    if !path.is_file() {
        tracing::warn!(
            scene = %scene.id,
            path = %path.display(),
            "Audio file not found; rendering scene silent"
        );
        return None;
    }

    match probe_duration(tool, path).await {
        Ok(secs) => Some((path.clone(), secs)),
        Err(e) => {
            tracing::warn!(
                scene = %scene.id,
                error = %e,
                "Audio probe failed; rendering scene silent"
            );
            None
        }
    }
}

/// Best-effort removal of a file a failed step may have left behind.
pub(crate) fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realized_duration_rules() {
        assert_eq!(realized_duration(5.0, None), 5.0);
        assert!((realized_duration(5.0, Some(8.2)) - 8.3).abs() < 1e-9);
        assert_eq!(realized_duration(5.0, Some(3.0)), 5.0);
    }

    #[test]
    fn test_intermediate_names() {
        let dir = Path::new("/work");
        assert_eq!(video_clip_path(dir, 2), Path::new("/work/scene-2-video.mp4"));
        assert_eq!(
            muxed_clip_path(dir, 2),
            Path::new("/work/scene-2-with-audio.mp4")
        );
    }
}
