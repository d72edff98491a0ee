//! Reelsmith Render Engine
//!
//! Offline pipeline that turns a scene manifest into one finished MP4 by
//! driving ffmpeg/ffprobe.
//!
//! # Pipeline Architecture
//!
//! ```text
//! scene 0: image ──┬── Ken Burns (zoompan) ── scene-0-video.mp4
//!          audio ──┘        probe + mux ───── scene-0-with-audio.mp4 ──┐
//! scene 1: ...                                                         ├── xfade / amix ── output.mp4
//! scene N: ...                                                         ┘   (concat on failure)
//!
//! output.mp4 ── thumbnail.jpg
//! report     ── chapters
//! ```
//!
//! Every external call goes through [`tool::MediaTool`], so the whole
//! pipeline can run against a scripted tool in tests.

pub mod chapters;
pub mod compositor;
pub mod concat;
pub mod encode;
pub mod export;
pub mod filter_graph;
pub mod motion;
pub mod probe;
pub mod scene_clip;
pub mod thumbnail;
pub mod tool;
pub mod transition;

pub use export::*;
