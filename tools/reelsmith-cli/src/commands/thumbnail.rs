//! Extract a thumbnail from a rendered video.

use std::path::PathBuf;

use reelsmith_common::config::AppConfig;
use reelsmith_render_engine::thumbnail::extract_thumbnail;
use reelsmith_render_engine::tool::FfmpegTool;

pub async fn run(
    config: &AppConfig,
    video: PathBuf,
    output: PathBuf,
    at: Option<f64>,
) -> anyhow::Result<()> {
    let at_secs = at.unwrap_or(config.render.thumbnail_at_secs);
    let tool = FfmpegTool::new(config.tools.clone());

    let written = extract_thumbnail(&tool, &video, &output, at_secs)
        .await
        .map_err(|e| anyhow::anyhow!("Thumbnail failed: {e}"))?;

    println!("Thumbnail written: {} (at {at_secs:.2}s)", written.display());
    Ok(())
}
