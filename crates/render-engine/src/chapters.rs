//! Chapter markers derived from scene order and realized durations.

use std::path::Path;

use reelsmith_common::error::ReelResult;
use reelsmith_scene_model::Scene;
use serde::{Deserialize, Serialize};

/// A titled span of the final video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    /// Seconds from the start of the video.
    pub start_time: f64,
    pub end_time: f64,
}

/// One chapter per scene, laid end to end over `durations`.
///
/// Scenes without a matching duration are dropped.
pub fn build_chapters(scenes: &[Scene], durations: &[f64]) -> Vec<Chapter> {
    let mut clock = 0.0;
    scenes
        .iter()
        .zip(durations)
        .enumerate()
        .map(|(i, (_scene, &duration))| {
            let start_time = clock;
            clock += duration;
            Chapter {
                title: format!("Scene {}", i + 1),
                start_time,
                end_time: clock,
            }
        })
        .collect()
}

/// Render chapters as `MM:SS Title` lines, the form video descriptions use.
///
/// Switches to `H:MM:SS` for every line once any chapter starts past an hour.
pub fn format_chapter_list(chapters: &[Chapter]) -> String {
    let long = chapters.iter().any(|c| c.start_time >= 3600.0);
    let mut output = String::new();
    for chapter in chapters {
        output.push_str(&format_chapter_time(chapter.start_time, long));
        output.push(' ');
        output.push_str(&chapter.title);
        output.push('\n');
    }
    output
}

/// Serialize chapters as pretty JSON.
pub fn chapters_json(chapters: &[Chapter]) -> ReelResult<String> {
    Ok(serde_json::to_string_pretty(chapters)?)
}

/// Save chapters to a file: JSON for `.json`, the text list otherwise.
pub fn save_chapters(chapters: &[Chapter], path: &Path) -> ReelResult<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => chapters_json(chapters)?,
        _ => format_chapter_list(chapters),
    };
    std::fs::write(path, content)?;
    Ok(())
}

fn format_chapter_time(secs: f64, with_hours: bool) -> String {
    let total = secs.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if with_hours {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
