//! Output settings and the ffmpeg argument fragments shared by every encode.

use reelsmith_common::config::RenderDefaults;
use reelsmith_common::error::{ReelError, ReelResult};
use reelsmith_scene_model::{ExportQuality, Manifest};
use serde::{Deserialize, Serialize};

use crate::filter_graph::Filter;

/// Sample rate every intermediate audio track is normalised to.
pub const AUDIO_SAMPLE_RATE: u32 = 44_100;

/// Channel count every intermediate audio track is normalised to.
pub const AUDIO_CHANNELS: u32 = 2;

pub const MIN_VIDEO_BITRATE_KBPS: u32 = 500;
pub const MIN_AUDIO_BITRATE_KBPS: u32 = 64;

/// Effective output parameters for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    pub width: u32,
    pub height: u32,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
}

impl OutputSettings {
    /// Take size and bitrate from `quality` when given, else from the manifest
    /// and the configured defaults.
    pub fn resolve(
        manifest: &Manifest,
        quality: Option<&ExportQuality>,
        defaults: &RenderDefaults,
    ) -> Self {
        match quality {
            Some(q) => Self {
                width: q.width,
                height: q.height,
                video_bitrate_kbps: q.video_bitrate_kbps,
                audio_bitrate_kbps: defaults.audio_bitrate_kbps,
            },
            None => Self {
                width: manifest.width,
                height: manifest.height,
                video_bitrate_kbps: defaults.video_bitrate_kbps,
                audio_bitrate_kbps: defaults.audio_bitrate_kbps,
            },
        }
    }

    /// Reject sizes and bitrates the encoder cannot honour.
    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(ReelError::config(format!(
                "export size {}x{} must be non-zero and even",
                self.width, self.height
            )));
        }
        if self.video_bitrate_kbps < MIN_VIDEO_BITRATE_KBPS {
            return Err(ReelError::config(format!(
                "video bitrate {} kbps is below the {MIN_VIDEO_BITRATE_KBPS} kbps minimum",
                self.video_bitrate_kbps
            )));
        }
        if self.audio_bitrate_kbps < MIN_AUDIO_BITRATE_KBPS {
            return Err(ReelError::config(format!(
                "audio bitrate {} kbps is below the {MIN_AUDIO_BITRATE_KBPS} kbps minimum",
                self.audio_bitrate_kbps
            )));
        }
        Ok(())
    }
}

/// Common leading arguments for every ffmpeg call.
pub fn base_args() -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ]
}

/// Scale into `width x height` preserving aspect ratio, then letterbox.
pub fn fit_to_frame(width: u32, height: u32) -> Vec<Filter> {
    vec![
        Filter::new("scale")
            .opt("w", width)
            .opt("h", height)
            .opt("force_original_aspect_ratio", "decrease"),
        Filter::new("pad")
            .arg(width)
            .arg(height)
            .arg("(ow-iw)/2")
            .arg("(oh-ih)/2"),
        Filter::new("setsar").arg(1),
    ]
}

/// Codec arguments for per-scene intermediate clips (quality-targeted).
pub fn intermediate_video_args() -> Vec<String> {
    vec![
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-crf".to_string(),
        "18".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
    ]
}

/// AAC audio arguments.
pub fn aac_args(audio_bitrate_kbps: u32) -> Vec<String> {
    vec![
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        format!("{audio_bitrate_kbps}k"),
    ]
}

/// AAC at the shared intermediate sample rate and channel layout, so every
/// clip can be stream-copied by the concat demuxer.
pub fn intermediate_audio_args(audio_bitrate_kbps: u32) -> Vec<String> {
    let mut args = aac_args(audio_bitrate_kbps);
    args.extend([
        "-ar".to_string(),
        AUDIO_SAMPLE_RATE.to_string(),
        "-ac".to_string(),
        AUDIO_CHANNELS.to_string(),
    ]);
    args
}

/// An endless silent stereo input; bound it with `-t` or `-shortest`.
pub fn silent_audio_input() -> Vec<String> {
    let source = Filter::new("anullsrc")
        .opt("channel_layout", "stereo")
        .opt("sample_rate", AUDIO_SAMPLE_RATE);
    vec![
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        source.render(),
    ]
}

/// Codec arguments for the final deliverable.
pub fn delivery_codec_args(settings: &OutputSettings) -> Vec<String> {
    let mut args = vec![
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-profile:v".to_string(),
        "high".to_string(),
        "-level".to_string(),
        "4.1".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-b:v".to_string(),
        format!("{}k", settings.video_bitrate_kbps),
    ];
    args.append(&mut aac_args(settings.audio_bitrate_kbps));
    args.push("-movflags".to_string());
    args.push("+faststart".to_string());
    args
}

/// Format seconds for tool arguments and filter options.
pub fn secs(value: f64) -> String {
    format!("{value:.3}")
}
