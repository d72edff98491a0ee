//! Hard-cut join through the concat demuxer, used when transitions are not
//! wanted or the transition pass fails.

use std::path::{Path, PathBuf};

use reelsmith_common::error::{ReelError, ReelResult};

use crate::compositor::{plan_hard_cuts, TimelinePlan};
use crate::encode::{base_args, delivery_codec_args, fit_to_frame, OutputSettings};
use crate::filter_graph::simple_chain;
use crate::scene_clip::{remove_partial, SceneClip};
use crate::tool::{absolute_path, path_arg, Invocation, MediaTool};

pub const CONCAT_LIST_NAME: &str = "concat-list.txt";

/// Contents of a concat demuxer list: one `file '<path>'` line per clip.
pub fn concat_list_contents(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| {
            let resolved = path
                .canonicalize()
                .unwrap_or_else(|_| absolute_path(path));
            let escaped = resolved.display().to_string().replace('\'', "'\\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}

/// Concatenate `clips` into `output`, re-encoding at `settings`.
///
/// The list file is written to `work_dir` and removed afterwards whether
/// or not the encode succeeds.
pub async fn concatenate(
    tool: &dyn MediaTool,
    clips: &[SceneClip],
    work_dir: &Path,
    output: &Path,
    settings: &OutputSettings,
) -> ReelResult<TimelinePlan> {
    if clips.is_empty() {
        return Err(ReelError::render("Nothing to concatenate"));
    }

    let paths: Vec<PathBuf> = clips.iter().map(|c| c.path.clone()).collect();
    let list_path = work_dir.join(CONCAT_LIST_NAME);
    std::fs::write(&list_path, concat_list_contents(&paths))?;

    let mut args = base_args();
    args.extend([
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        path_arg(&list_path),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "0:a?".to_string(),
        "-vf".to_string(),
        simple_chain(&fit_to_frame(settings.width, settings.height)),
    ]);
    args.extend(delivery_codec_args(settings));
    args.push(path_arg(output));

    let durations: Vec<f64> = clips.iter().map(|c| c.duration_secs).collect();
    let plan = plan_hard_cuts(&durations);

    tracing::info!(
        clips = clips.len(),
        total_secs = plan.total_secs,
        output = %output.display(),
        "Concatenating clips"
    );

    let result = tool.run(&Invocation::encode("concat", args)).await;
    remove_partial(&list_path);
    result.map(|_| plan)
}
