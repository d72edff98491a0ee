//! Render a manifest to video.

use std::path::{Path, PathBuf};

use reelsmith_common::config::{AppConfig, RenderDefaults};
use reelsmith_render_engine::chapters::save_chapters;
use reelsmith_render_engine::export::{export_manifest, ExportJob, ProgressCallback, RenderStage};
use reelsmith_render_engine::thumbnail::extract_thumbnail;
use reelsmith_render_engine::tool::FfmpegTool;
use reelsmith_scene_model::{ExportQuality, Manifest};

pub struct RenderArgs {
    pub manifest: PathBuf,
    pub output: PathBuf,
    pub work_dir: Option<PathBuf>,
    pub size: Option<(u32, u32)>,
    pub bitrate_kbps: Option<u32>,
    pub thumbnail: Option<PathBuf>,
    pub chapters: Option<PathBuf>,
    pub json: bool,
}

pub async fn run(config: &AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    let manifest = Manifest::load(&args.manifest)
        .map_err(|e| anyhow::anyhow!("Failed to load manifest: {e}"))?;

    let quality = quality_override(&manifest, args.size, args.bitrate_kbps, &config.render);
    let (work_dir, temporary) = match args.work_dir {
        Some(dir) => (dir, false),
        None => (default_work_dir(&args.output), true),
    };

    if !args.json {
        println!("Rendering manifest: {}", args.manifest.display());
        println!("  Scenes: {}", manifest.scenes.len());
        println!("  Output: {}", args.output.display());
        let (width, height) = quality
            .map(|q| (q.width, q.height))
            .unwrap_or((manifest.width, manifest.height));
        println!("  Resolution: {width}x{height} @ {} fps", manifest.fps);
    }

    let job = ExportJob {
        manifest: manifest.clone(),
        output_path: args.output.clone(),
        work_dir: work_dir.clone(),
        quality,
    };

    let progress_cb: ProgressCallback = Box::new(|p| {
        let detail = match (&p.stage, &p.scene_id) {
            (RenderStage::RenderingScenes, Some(id)) => format!("scene {id}"),
            (stage, _) => format!("{stage:?}"),
        };
        eprint!(
            "\r  Progress: {:>5.1}% ({}/{} scenes) {detail:<24}",
            p.progress * 100.0,
            p.scenes_done,
            p.total_scenes,
        );
    });

    let result = export_manifest(job, config, Some(progress_cb)).await;
    eprintln!();

    if temporary {
        if let Err(e) = std::fs::remove_dir_all(&work_dir) {
            tracing::debug!(path = %work_dir.display(), error = %e, "Could not remove work dir");
        }
    }

    let report = result.map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;

    if let Some(thumb) = &args.thumbnail {
        let tool = FfmpegTool::new(config.tools.clone());
        extract_thumbnail(&tool, &report.output_path, thumb, config.render.thumbnail_at_secs)
            .await
            .map_err(|e| anyhow::anyhow!("Thumbnail failed: {e}"))?;
    }

    let chapters = report.chapters(&manifest);
    if let Some(path) = &args.chapters {
        save_chapters(&chapters, path)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Render complete: {}", report.output_path.display());
    println!("  Compositor: {:?}", report.compositor);
    println!("  Duration: {:.2}s", report.total_duration_secs);
    println!("  Elapsed: {:.1}s", report.elapsed_secs);
    if let Some(thumb) = &args.thumbnail {
        println!("  Thumbnail: {}", thumb.display());
    }
    if let Some(path) = &args.chapters {
        println!("  Chapters: {} ({} entries)", path.display(), chapters.len());
    }
    if !report.failures.is_empty() {
        println!("\nSkipped scenes:");
        for failure in &report.failures {
            println!("  - [{}] {}: {}", failure.index, failure.scene_id, failure.message);
        }
    }

    Ok(())
}

/// Build an override only when the user asked for one.
fn quality_override(
    manifest: &Manifest,
    size: Option<(u32, u32)>,
    bitrate_kbps: Option<u32>,
    defaults: &RenderDefaults,
) -> Option<ExportQuality> {
    if size.is_none() && bitrate_kbps.is_none() {
        return None;
    }
    let (width, height) = size.unwrap_or((manifest.width, manifest.height));
    Some(ExportQuality {
        width,
        height,
        video_bitrate_kbps: bitrate_kbps.unwrap_or(defaults.video_bitrate_kbps),
    })
}

fn default_work_dir(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());
    output
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!(".reelsmith-work-{stem}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsmith_scene_model::Scene;

    #[test]
    fn test_quality_override_only_when_requested() {
        let manifest = Manifest::new(vec![Scene::new("a", "a.png")]);
        let defaults = RenderDefaults::default();
        assert!(quality_override(&manifest, None, None, &defaults).is_none());

        let q = quality_override(&manifest, None, Some(5000), &defaults).unwrap();
        assert_eq!((q.width, q.height, q.video_bitrate_kbps), (1920, 1080, 5000));

        let q = quality_override(&manifest, Some((1280, 720)), None, &defaults).unwrap();
        assert_eq!((q.width, q.height, q.video_bitrate_kbps), (1280, 720, 8000));
    }

    #[test]
    fn test_default_work_dir_sits_next_to_output() {
        assert_eq!(
            default_work_dir(Path::new("/videos/launch.mp4")),
            PathBuf::from("/videos/.reelsmith-work-launch")
        );
    }
}
