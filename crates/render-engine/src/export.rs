//! Render orchestration: manifest in, finished MP4 out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use reelsmith_common::config::{AppConfig, RenderDefaults};
use reelsmith_common::error::{ReelError, ReelResult};
use reelsmith_scene_model::{ExportQuality, Manifest, Scene};
use serde::{Deserialize, Serialize};

use crate::chapters::{build_chapters, Chapter};
use crate::compositor::{Boundary, TimelinePlan};
use crate::concat::concatenate;
use crate::encode::OutputSettings;
use crate::scene_clip::{build_scene_clip, remove_partial, ClipFormat, SceneClip};
use crate::tool::{FfmpegTool, MediaTool};
use crate::transition::{compose_with_transitions, needs_transitions};

/// A render job ready to be executed.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub manifest: Manifest,

    /// Output file path.
    pub output_path: PathBuf,

    /// Directory for intermediate clips. Created if missing.
    pub work_dir: PathBuf,

    /// Size and bitrate override.
    pub quality: Option<ExportQuality>,
}

/// Progress callback for rendering.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send + Sync>;

/// Render progress report.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Scenes attempted so far.
    pub scenes_done: usize,

    pub total_scenes: usize,

    /// Scene being rendered, when in [`RenderStage::RenderingScenes`].
    pub scene_id: Option<String>,

    pub stage: RenderStage,
}

/// Stages of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Preparing,
    RenderingScenes,
    Composing,
    Finalizing,
    Complete,
    Failed,
}

/// Which path produced the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compositor {
    /// Cross-dissolve composition.
    Transitions,
    /// Hard-cut concatenation, no transitions requested.
    Concat,
    /// Hard-cut concatenation after the transition pass failed.
    ConcatFallback,
}

/// A scene that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFailure {
    pub index: usize,
    pub scene_id: String,
    pub message: String,
}

/// A scene that made it into the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedScene {
    pub index: usize,
    pub scene_id: String,
    pub duration_secs: f64,
    pub has_audio: bool,
}

/// Outcome of a successful render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub compositor: Compositor,
    /// Composite length from the timeline plan.
    pub total_duration_secs: f64,
    pub settings: OutputSettings,
    pub scenes: Vec<RenderedScene>,
    pub failures: Vec<SceneFailure>,
}

impl RenderReport {
    /// Realized durations of the rendered scenes, in output order.
    pub fn realized_durations(&self) -> Vec<f64> {
        self.scenes.iter().map(|s| s.duration_secs).collect()
    }

    /// Chapters for the rendered scenes of `manifest`.
    pub fn chapters(&self, manifest: &Manifest) -> Vec<Chapter> {
        let scenes: Vec<Scene> = self
            .scenes
            .iter()
            .filter_map(|s| manifest.scenes.get(s.index).cloned())
            .collect();
        build_chapters(&scenes, &self.realized_durations())
    }
}

/// Removes tracked intermediate files when dropped.
#[derive(Debug, Default)]
struct IntermediateFiles {
    paths: Vec<PathBuf>,
}

impl IntermediateFiles {
    fn track(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }
}

impl Drop for IntermediateFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            remove_partial(path);
        }
    }
}

/// Drives a full render: scene clips, composition, cleanup.
pub struct RenderOrchestrator {
    tool: Arc<dyn MediaTool>,
    defaults: RenderDefaults,
    progress: Option<ProgressCallback>,
}

impl RenderOrchestrator {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self {
            tool,
            defaults: RenderDefaults::default(),
            progress: None,
        }
    }

    pub fn with_defaults(mut self, defaults: RenderDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    fn report(&self, stage: RenderStage, scenes_done: usize, total_scenes: usize, scene_id: Option<&str>) {
        let Some(cb) = &self.progress else {
            return;
        };
        let progress = match stage {
            RenderStage::Preparing | RenderStage::Failed => 0.0,
            RenderStage::RenderingScenes if total_scenes > 0 => {
                0.8 * scenes_done as f64 / total_scenes as f64
            }
            RenderStage::RenderingScenes => 0.0,
            RenderStage::Composing => 0.8,
            RenderStage::Finalizing => 0.95,
            RenderStage::Complete => 1.0,
        };
        cb(RenderProgress {
            progress,
            scenes_done,
            total_scenes,
            scene_id: scene_id.map(str::to_string),
            stage,
        });
    }

    /// Render `manifest` to `output`, using `work_dir` for intermediates.
    ///
    /// Scenes that fail are skipped and listed in the report. The render
    /// fails only when no scene survives or the final join fails; either
    /// way, no intermediate clip is left in `work_dir`.
    pub async fn render(
        &self,
        manifest: &Manifest,
        output: &Path,
        work_dir: &Path,
        quality: Option<&ExportQuality>,
    ) -> ReelResult<RenderReport> {
        let started_at = Utc::now();
        let started = Instant::now();
        let total_scenes = manifest.scenes.len();

        let problems = manifest.problems();
        if !problems.is_empty() {
            return Err(ReelError::manifest(problems.join("; ")));
        }
        let settings = OutputSettings::resolve(manifest, quality, &self.defaults);
        settings.validate()?;

        tracing::info!(
            scenes = total_scenes,
            output = %output.display(),
            work_dir = %work_dir.display(),
            "Starting render"
        );
        self.report(RenderStage::Preparing, 0, total_scenes, None);

        std::fs::create_dir_all(work_dir)?;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let format = ClipFormat {
            width: settings.width,
            height: settings.height,
            fps: manifest.fps,
            audio_bitrate_kbps: settings.audio_bitrate_kbps,
        };

        let mut intermediates = IntermediateFiles::default();
        let mut clips: Vec<SceneClip> = Vec::with_capacity(total_scenes);
        let mut failures = Vec::new();

        for (index, scene) in manifest.scenes.iter().enumerate() {
            self.report(RenderStage::RenderingScenes, index, total_scenes, Some(scene.id.as_str()));
            match build_scene_clip(self.tool.as_ref(), scene, work_dir, index, format).await {
                Ok(clip) => {
                    intermediates.track(&clip.path);
                    clips.push(clip);
                }
                Err(e) => {
                    tracing::warn!(scene = %scene.id, index, error = %e, "Skipping scene");
                    failures.push(SceneFailure {
                        index,
                        scene_id: scene.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
        self.report(RenderStage::RenderingScenes, total_scenes, total_scenes, None);

        if clips.is_empty() {
            self.report(RenderStage::Failed, total_scenes, total_scenes, None);
            let failures = failures
                .iter()
                .map(|f| format!("scene {} ({}): {}", f.index, f.scene_id, f.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ReelError::NoUsableClips { failures });
        }

        self.report(RenderStage::Composing, total_scenes, total_scenes, None);
        let boundaries = boundaries_between(manifest, &clips);

        let composed = self
            .compose(&clips, &boundaries, work_dir, output, &settings)
            .await;
        let (compositor, plan) = match composed {
            Ok(result) => result,
            Err(e) => {
                remove_partial(output);
                self.report(RenderStage::Failed, total_scenes, total_scenes, None);
                tracing::error!(error = %e, "Render failed");
                return Err(e);
            }
        };

        self.report(RenderStage::Finalizing, total_scenes, total_scenes, None);
        drop(intermediates);

        let report = RenderReport {
            output_path: output.to_path_buf(),
            started_at,
            elapsed_secs: started.elapsed().as_secs_f64(),
            compositor,
            total_duration_secs: plan.total_secs,
            settings,
            scenes: clips
                .iter()
                .map(|c| RenderedScene {
                    index: c.index,
                    scene_id: c.scene_id.clone(),
                    duration_secs: c.duration_secs,
                    has_audio: c.has_audio,
                })
                .collect(),
            failures,
        };

        tracing::info!(
            output = %output.display(),
            compositor = ?report.compositor,
            rendered = report.scenes.len(),
            skipped = report.failures.len(),
            total_secs = report.total_duration_secs,
            elapsed_secs = report.elapsed_secs,
            "Render finished"
        );
        self.report(RenderStage::Complete, total_scenes, total_scenes, None);
        Ok(report)
    }

    async fn compose(
        &self,
        clips: &[SceneClip],
        boundaries: &[Boundary],
        work_dir: &Path,
        output: &Path,
        settings: &OutputSettings,
    ) -> ReelResult<(Compositor, TimelinePlan)> {
        let tool = self.tool.as_ref();

        if !needs_transitions(clips.len(), boundaries) {
            let plan = concatenate(tool, clips, work_dir, output, settings).await?;
            return Ok((Compositor::Concat, plan));
        }

        match compose_with_transitions(tool, clips, boundaries, output, settings).await {
            Ok(plan) => Ok((Compositor::Transitions, plan)),
            Err(e) => {
                tracing::warn!(error = %e, "Transition composition failed; falling back to concat");
                remove_partial(output);
                let plan = concatenate(tool, clips, work_dir, output, settings).await?;
                Ok((Compositor::ConcatFallback, plan))
            }
        }
    }
}

/// Boundaries between consecutive surviving clips, taken from the outgoing
/// scene of each pair.
fn boundaries_between(manifest: &Manifest, clips: &[SceneClip]) -> Vec<Boundary> {
    clips
        .windows(2)
        .map(|pair| {
            let scene = &manifest.scenes[pair[0].index];
            Boundary::new(
                scene.transition,
                scene.outgoing_overlap(manifest.transition_duration_seconds),
            )
        })
        .collect()
}

/// Render a job with the system ffmpeg.
///
/// This is the main entry point for callers that do not supply their own
/// [`MediaTool`].
pub async fn export_manifest(
    job: ExportJob,
    config: &AppConfig,
    progress: Option<ProgressCallback>,
) -> ReelResult<RenderReport> {
    let tool = FfmpegTool::new(config.tools.clone());
    if !tool.is_available() {
        return Err(ReelError::render(format!(
            "ffmpeg/ffprobe not found (looked for {} and {})",
            config.tools.ffmpeg_path.display(),
            config.tools.ffprobe_path.display()
        )));
    }

    let mut orchestrator =
        RenderOrchestrator::new(Arc::new(tool)).with_defaults(config.render.clone());
    if let Some(cb) = progress {
        orchestrator = orchestrator.with_progress(cb);
    }

    orchestrator
        .render(
            &job.manifest,
            &job.output_path,
            &job.work_dir,
            job.quality.as_ref(),
        )
        .await
}
