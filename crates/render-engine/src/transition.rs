//! Cross-dissolve composition of scene clips in one ffmpeg pass.

use std::path::Path;

use reelsmith_common::error::{ReelError, ReelResult};

use crate::compositor::{plan_transitions, Boundary, TimelinePlan};
use crate::encode::{base_args, delivery_codec_args, fit_to_frame, secs, OutputSettings, AUDIO_SAMPLE_RATE};
use crate::filter_graph::{Filter, FilterGraphBuilder};
use crate::scene_clip::SceneClip;
use crate::tool::{path_arg, Invocation, MediaTool};

const VIDEO_OUT: &str = "vout";
const AUDIO_OUT: &str = "aout";
const VIDEO_MIX: &str = "vmix";

/// Whether `boundaries` need the transition composer rather than concat.
pub fn needs_transitions(clip_count: usize, boundaries: &[Boundary]) -> bool {
    clip_count >= 2
        && boundaries
            .iter()
            .take(clip_count - 1)
            .any(Boundary::is_overlap)
}

/// Build the `-filter_complex` graph joining `clips` with `boundaries`.
pub fn transition_graph(
    clips: &[SceneClip],
    plan: &TimelinePlan,
    settings: &OutputSettings,
) -> ReelResult<String> {
    if clips.len() < 2 || plan.placements.len() != clips.len() {
        return Err(ReelError::render(
            "Transition composition needs at least two planned clips",
        ));
    }

    let mut graph = FilterGraphBuilder::new();

    for i in 0..clips.len() {
        graph.chain(
            [format!("{i}:v")],
            vec![
                Filter::new("settb").arg("AVTB"),
                Filter::new("setpts").arg("PTS-STARTPTS"),
                Filter::new("format").arg("yuv420p"),
            ],
            [format!("v{i}")],
        );
    }

    let last = clips.len() - 1;
    let mut previous = "v0".to_string();
    for placement in &plan.placements[1..] {
        let i = placement.index;
        let out = if i == last {
            VIDEO_MIX.to_string()
        } else {
            format!("x{i}")
        };
        let boundary = placement.entry.unwrap_or_else(Boundary::hard_cut);

        let join = match boundary.style.xfade_name() {
            Some(name) if boundary.is_overlap() => Filter::new("xfade")
                .opt("transition", name)
                .opt("duration", secs(boundary.overlap_secs))
                .opt("offset", secs(placement.start_secs)),
            _ => Filter::new("concat").opt("n", 2).opt("v", 1).opt("a", 0),
        };
        graph.chain([previous, format!("v{i}")], vec![join], [out.clone()]);
        previous = out;
    }

    let mut finish = fit_to_frame(settings.width, settings.height);
    finish.push(Filter::new("format").arg("yuv420p"));
    graph.chain([VIDEO_MIX], finish, [VIDEO_OUT]);

    let voiced: Vec<usize> = clips
        .iter()
        .enumerate()
        .filter(|(_, clip)| clip.has_audio)
        .map(|(i, _)| i)
        .collect();

    if voiced.is_empty() {
        graph.chain(
            Vec::<String>::new(),
            vec![
                Filter::new("anullsrc")
                    .opt("channel_layout", "stereo")
                    .opt("sample_rate", AUDIO_SAMPLE_RATE),
                Filter::new("atrim").opt("duration", secs(plan.total_secs)),
            ],
            [AUDIO_OUT],
        );
    } else {
        for &i in &voiced {
            let delay = plan.placements[i].audio_delay_ms();
            graph.chain(
                [format!("{i}:a")],
                vec![
                    Filter::new("aformat")
                        .opt("sample_rates", AUDIO_SAMPLE_RATE)
                        .opt("channel_layouts", "stereo"),
                    Filter::new("adelay").arg(format!("{delay}|{delay}")),
                ],
                [format!("a{i}")],
            );
        }
        graph.chain(
            voiced.iter().map(|i| format!("a{i}")),
            vec![Filter::new("amix")
                .opt("inputs", voiced.len())
                .opt("duration", "longest")
                .opt("normalize", 0)],
            [AUDIO_OUT],
        );
    }

    graph.build()
}

/// Full ffmpeg argument list for the transition pass.
pub fn transition_args(
    clips: &[SceneClip],
    plan: &TimelinePlan,
    output: &Path,
    settings: &OutputSettings,
) -> ReelResult<Vec<String>> {
    let graph = transition_graph(clips, plan, settings)?;

    let mut args = base_args();
    for clip in clips {
        args.push("-i".to_string());
        args.push(path_arg(&clip.path));
    }
    args.extend([
        "-filter_complex".to_string(),
        graph,
        "-map".to_string(),
        format!("[{VIDEO_OUT}]"),
        "-map".to_string(),
        format!("[{AUDIO_OUT}]"),
    ]);
    args.extend(delivery_codec_args(settings));
    args.push("-t".to_string());
    args.push(secs(plan.total_secs));
    args.push(path_arg(output));
    Ok(args)
}

/// Join `clips` with cross-dissolves into `output`.
///
/// `boundaries[i]` joins clip `i` to clip `i + 1`. One tool invocation; a
/// failure is returned as-is for the caller to fall back on.
pub async fn compose_with_transitions(
    tool: &dyn MediaTool,
    clips: &[SceneClip],
    boundaries: &[Boundary],
    output: &Path,
    settings: &OutputSettings,
) -> ReelResult<TimelinePlan> {
    if !needs_transitions(clips.len(), boundaries) {
        return Err(ReelError::render(
            "Transition composition needs two clips and an overlapping boundary",
        ));
    }

    let durations: Vec<f64> = clips.iter().map(|c| c.duration_secs).collect();
    let plan = plan_transitions(&durations, boundaries);
    let args = transition_args(clips, &plan, output, settings)?;

    tracing::info!(
        clips = clips.len(),
        total_secs = plan.total_secs,
        output = %output.display(),
        "Composing with transitions"
    );

    tool.run(&Invocation::encode("transitions", args)).await?;
    Ok(plan)
}
