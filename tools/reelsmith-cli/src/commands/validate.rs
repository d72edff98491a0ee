//! Validate a scene manifest.

use std::path::PathBuf;

use reelsmith_scene_model::Manifest;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating manifest at: {}", path.display());

    let manifest =
        Manifest::load(&path).map_err(|e| anyhow::anyhow!("Failed to load manifest: {e}"))?;

    println!("  Scenes: {}", manifest.scenes.len());
    println!("  Resolution: {}x{}", manifest.width, manifest.height);
    println!("  FPS: {}", manifest.fps);
    println!(
        "  Nominal length: {:.1}s (before narration and overlaps)",
        manifest.nominal_duration()
    );

    // Asset problems are warnings: render skips or silences the scene.
    let mut issues = Vec::new();
    for (index, scene) in manifest.scenes.iter().enumerate() {
        match &scene.image_file {
            Some(image) if !image.is_file() => {
                issues.push(format!("scene {index} ({}): image not found: {}", scene.id, image.display()))
            }
            None => issues.push(format!("scene {index} ({}): no imageFile", scene.id)),
            _ => {}
        }
        if let Some(audio) = scene.audio_file.as_ref().filter(|a| !a.is_file()) {
            issues.push(format!(
                "scene {index} ({}): audio not found, scene will be silent: {}",
                scene.id,
                audio.display()
            ));
        }
    }

    if issues.is_empty() {
        println!("  Assets: All present");
        println!("\nManifest is valid.");
    } else {
        println!("\nAsset issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Affected scenes will be skipped or rendered silent.",
            issues.len()
        );
    }

    Ok(())
}
