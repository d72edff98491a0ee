//! Reelsmith Scene Model
//!
//! Defines the data contracts handed to the render core:
//! - **Manifest:** Output dimensions, frame rate, shared transition length, ordered scenes
//! - **Scene:** One still image, optional narration, nominal duration, motion and outgoing transition
//! - **Effects:** The Ken Burns motion variants and cross-dissolve styles
//!
//! Manifests are plain JSON with camelCase keys so that the asset layer
//! producing them does not need to know anything about Rust.

pub mod effects;
pub mod manifest;

pub use effects::*;
pub use manifest::*;
