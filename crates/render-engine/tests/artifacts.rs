mod common;

use common::{leftover_files, touch, ScriptedTool};
use reelsmith_common::error::ReelError;
use reelsmith_render_engine::concat::{concatenate, CONCAT_LIST_NAME};
use reelsmith_render_engine::encode::OutputSettings;
use reelsmith_render_engine::scene_clip::{build_scene_clip, ClipFormat, SceneClip};
use reelsmith_render_engine::thumbnail::extract_thumbnail;
use reelsmith_scene_model::{MotionEffect, Scene};

fn format() -> ClipFormat {
    ClipFormat {
        width: 1920,
        height: 1080,
        fps: 30,
        audio_bitrate_kbps: 192,
    }
}

#[tokio::test]
async fn thumbnail_requires_existing_source() {
    let dir = tempfile::tempdir().unwrap();
    let tool = ScriptedTool::new();

    let err = extract_thumbnail(
        &tool,
        &dir.path().join("missing.mp4"),
        &dir.path().join("thumb.jpg"),
        1.0,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReelError::FileNotFound { .. }));
    assert!(tool.calls().is_empty());
}

#[tokio::test]
async fn thumbnail_grabs_one_frame() {
    let dir = tempfile::tempdir().unwrap();
    let video = touch(dir.path(), "final.mp4");
    let output = dir.path().join("thumbs").join("cover.jpg");
    let tool = ScriptedTool::new();

    let written = extract_thumbnail(&tool, &video, &output, 2.0).await.unwrap();

    assert_eq!(written, output);
    assert!(output.exists());
    let call = tool.call("thumbnail").unwrap();
    assert_eq!(call.arg_after("-ss"), Some("2.000"));
    assert_eq!(call.arg_after("-frames:v"), Some("1"));
}

#[tokio::test]
async fn concat_list_is_removed_even_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let clips: Vec<SceneClip> = (0..2)
        .map(|i| SceneClip {
            index: i,
            scene_id: format!("s{i}"),
            path: touch(dir.path(), &format!("scene-{i}-video.mp4")),
            duration_secs: 4.0,
            has_audio: false,
        })
        .collect();
    let settings = OutputSettings {
        width: 1920,
        height: 1080,
        video_bitrate_kbps: 8000,
        audio_bitrate_kbps: 192,
    };
    let output = dir.path().join("final.mp4");
    let tool = ScriptedTool::new().failing("concat");

    let err = concatenate(&tool, &clips, dir.path(), &output, &settings)
        .await
        .unwrap_err();

    assert!(err.is_tool_failure());
    assert!(!leftover_files(dir.path()).contains(&CONCAT_LIST_NAME.to_string()));
    let call = tool.call("concat").unwrap();
    assert!(call.arg_after("-i").unwrap().ends_with(CONCAT_LIST_NAME));
}

#[tokio::test]
async fn scene_encode_failure_removes_partial_clip() {
    let dir = tempfile::tempdir().unwrap();
    let scene = Scene::new("s0", touch(dir.path(), "s0.png"));
    let tool = ScriptedTool::new().failing("motion");

    let err = build_scene_clip(&tool, &scene, dir.path(), 0, format())
        .await
        .unwrap_err();

    assert!(err.is_tool_failure());
    assert_eq!(leftover_files(dir.path()), vec!["s0.png".to_string()]);
}

#[tokio::test]
async fn scene_clip_loops_still_through_motion_filter() {
    let dir = tempfile::tempdir().unwrap();
    let scene = Scene::new("s0", touch(dir.path(), "s0.png"))
        .with_duration(0.0)
        .with_motion(MotionEffect::ZoomOut);
    let tool = ScriptedTool::new();

    let clip = build_scene_clip(&tool, &scene, dir.path(), 3, format())
        .await
        .unwrap();

    assert_eq!(clip.duration_secs, 5.0);
    assert!(clip.path.ends_with("scene-3-video.mp4"));
    assert!(!clip.has_audio);

    let call = tool.call("scene-3 motion").unwrap();
    assert_eq!(call.arg_after("-loop"), Some("1"));
    assert_eq!(call.arg_after("-t"), Some("5.000"));
    assert_eq!(call.arg_after("-pix_fmt"), Some("yuv420p"));
    assert!(!call.has_arg("-an"));
    assert_eq!(call.arg_after("-f"), Some("lavfi"));
    assert!(call.has_arg("anullsrc=channel_layout=stereo:sample_rate=44100"));
    assert!(call.has_arg("1:a:0"));
    assert_eq!(call.arg_after("-ar"), Some("44100"));
    assert_eq!(call.arg_after("-ac"), Some("2"));
    assert!(call.arg_after("-vf").unwrap().contains("if(lte(zoom,1.00),1.25"));
}
