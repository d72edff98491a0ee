//! Render manifests and scenes.
//!
//! A manifest is the full, immutable description of one render job. It is
//! built entirely by the caller and never mutated by the render core.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::effects::{MotionEffect, TransitionStyle};

/// Frame rate used when a manifest omits `fps`.
pub const DEFAULT_FPS: u32 = 30;

/// Shared cross-dissolve length used when a manifest omits it.
pub const DEFAULT_TRANSITION_SECS: f64 = 0.5;

/// Scene length used when a scene has no (or a zero) nominal duration.
pub const DEFAULT_SCENE_DURATION_SECS: f64 = 5.0;

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Top-level render job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Output frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Output width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Ordered scenes. Must not be empty.
    pub scenes: Vec<Scene>,

    /// Overlap length for scenes that do not carry their own.
    #[serde(default = "default_transition_secs")]
    pub transition_duration_seconds: f64,
}

/// One segment of the final video.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Stable identifier, used in logs and error messages.
    pub id: String,

    /// Narration text. Carried for callers; never rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Still image for this scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<PathBuf>,

    /// Narration audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<PathBuf>,

    /// Nominal duration. Only authoritative when the scene has no audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_seconds: Option<f64>,

    /// Ken Burns motion.
    #[serde(default)]
    pub motion: MotionEffect,

    /// Style used to dissolve into the next scene.
    #[serde(default)]
    pub transition: TransitionStyle,

    /// Overlap length for this scene's outgoing transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_duration_seconds: Option<f64>,
}

/// Output override for a single render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuality {
    pub width: u32,
    pub height: u32,
    /// Target video bitrate in kbps.
    pub video_bitrate_kbps: u32,
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_transition_secs() -> f64 {
    DEFAULT_TRANSITION_SECS
}

impl Scene {
    /// Create a scene with an image and every other field defaulted.
    pub fn new(id: impl Into<String>, image_file: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            text: None,
            image_file: Some(image_file.into()),
            audio_file: None,
            duration_in_seconds: None,
            motion: MotionEffect::default(),
            transition: TransitionStyle::default(),
            transition_duration_seconds: None,
        }
    }

    pub fn with_audio(mut self, audio_file: impl Into<PathBuf>) -> Self {
        self.audio_file = Some(audio_file.into());
        self
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_in_seconds = Some(secs);
        self
    }

    pub fn with_motion(mut self, motion: MotionEffect) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_transition(mut self, transition: TransitionStyle) -> Self {
        self.transition = transition;
        self
    }

    /// Nominal duration, falling back to five seconds when absent or not positive.
    pub fn nominal_duration(&self) -> f64 {
        match self.duration_in_seconds {
            Some(secs) if secs.is_finite() && secs > 0.0 => secs,
            _ => DEFAULT_SCENE_DURATION_SECS,
        }
    }

    /// Overlap length of this scene's outgoing transition.
    ///
    /// Zero when the transition is `none`.
    pub fn outgoing_overlap(&self, shared_secs: f64) -> f64 {
        if !self.transition.is_overlap() {
            return 0.0;
        }
        self.transition_duration_seconds
            .unwrap_or(shared_secs)
            .max(0.0)
    }
}

impl Manifest {
    /// Create a manifest with default dimensions, fps and transition length.
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            fps: DEFAULT_FPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scenes,
            transition_duration_seconds: DEFAULT_TRANSITION_SECS,
        }
    }

    /// Load a manifest from a JSON file.
    ///
    /// Relative asset paths are resolved against the manifest's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ManifestError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut manifest: Manifest =
            serde_json::from_str(&json).map_err(|e| ManifestError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        if let Some(base) = path.parent() {
            manifest.resolve_paths(base);
        }
        manifest.validate()?;
        Ok(manifest)
    }

    /// Join every relative image/audio path onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for scene in &mut self.scenes {
            if let Some(image) = scene.image_file.as_mut() {
                resolve(image);
            }
            if let Some(audio) = scene.audio_file.as_mut() {
                resolve(audio);
            }
        }
    }

    /// List every structural problem with this manifest.
    ///
    /// Asset existence is not checked here; a missing image only fails its scene.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = vec![];

        if self.scenes.is_empty() {
            problems.push("manifest contains no scenes".to_string());
        }
        if self.fps == 0 {
            problems.push("fps must be greater than zero".to_string());
        }
        if self.width == 0 || self.height == 0 {
            problems.push(format!(
                "output size {}x{} must be non-zero",
                self.width, self.height
            ));
        } else if self.width % 2 != 0 || self.height % 2 != 0 {
            problems.push(format!(
                "output size {}x{} must have even dimensions",
                self.width, self.height
            ));
        }
        if !self.transition_duration_seconds.is_finite() || self.transition_duration_seconds < 0.0
        {
            problems.push(format!(
                "transitionDurationSeconds {} must be a non-negative number",
                self.transition_duration_seconds
            ));
        }

        let mut seen = HashSet::new();
        for (index, scene) in self.scenes.iter().enumerate() {
            if scene.id.trim().is_empty() {
                problems.push(format!("scene {index} has an empty id"));
            } else if !seen.insert(scene.id.as_str()) {
                problems.push(format!("scene id '{}' is used more than once", scene.id));
            }
            if let Some(secs) = scene.transition_duration_seconds {
                if !secs.is_finite() || secs < 0.0 {
                    problems.push(format!(
                        "scene '{}' has invalid transitionDurationSeconds {secs}",
                        scene.id
                    ));
                }
            }
        }

        problems
    }

    /// Validate the manifest, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ManifestError::ValidationError {
                message: problems.join("; "),
            })
        }
    }

    /// Nominal total length, ignoring overlaps and audio.
    pub fn nominal_duration(&self) -> f64 {
        self.scenes.iter().map(Scene::nominal_duration).sum()
    }
}

/// Errors that can occur when loading or validating a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid manifest: {message}")]
    ValidationError { message: String },
}
