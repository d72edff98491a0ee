//! Print chapters for a manifest.

use std::path::PathBuf;

use reelsmith_render_engine::chapters::{build_chapters, chapters_json, format_chapter_list};
use reelsmith_scene_model::{Manifest, Scene};

pub fn run(path: PathBuf, durations: Option<Vec<f64>>, json: bool) -> anyhow::Result<()> {
    let manifest =
        Manifest::load(&path).map_err(|e| anyhow::anyhow!("Failed to load manifest: {e}"))?;

    let durations = match durations {
        Some(durations) => {
            if durations.len() != manifest.scenes.len() {
                anyhow::bail!(
                    "Got {} durations for {} scenes",
                    durations.len(),
                    manifest.scenes.len()
                );
            }
            if let Some(bad) = durations.iter().find(|d| !d.is_finite() || **d < 0.0) {
                anyhow::bail!("Invalid duration: {bad}");
            }
            durations
        }
        None => manifest.scenes.iter().map(Scene::nominal_duration).collect(),
    };

    let chapters = build_chapters(&manifest.scenes, &durations);
    if json {
        println!("{}", chapters_json(&chapters)?);
    } else {
        print!("{}", format_chapter_list(&chapters));
    }
    Ok(())
}
