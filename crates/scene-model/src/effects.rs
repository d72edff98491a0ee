//! Motion and transition styles attached to scenes.
//!
//! Both enums deserialize leniently: unknown names fall back to a default
//! instead of rejecting the whole manifest.

use serde::{Deserialize, Serialize};

/// Ken Burns camera motion applied to a scene's still image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "Option<String>")]
pub enum MotionEffect {
    #[default]
    ZoomIn,
    ZoomOut,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
}

impl MotionEffect {
    pub const ALL: [MotionEffect; 6] = [
        MotionEffect::ZoomIn,
        MotionEffect::ZoomOut,
        MotionEffect::PanLeft,
        MotionEffect::PanRight,
        MotionEffect::PanUp,
        MotionEffect::PanDown,
    ];

    /// Parse a motion name; anything unrecognized is zoom-in.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "zoom-out" => MotionEffect::ZoomOut,
            "pan-left" => MotionEffect::PanLeft,
            "pan-right" => MotionEffect::PanRight,
            "pan-up" => MotionEffect::PanUp,
            "pan-down" => MotionEffect::PanDown,
            _ => MotionEffect::ZoomIn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionEffect::ZoomIn => "zoom-in",
            MotionEffect::ZoomOut => "zoom-out",
            MotionEffect::PanLeft => "pan-left",
            MotionEffect::PanRight => "pan-right",
            MotionEffect::PanUp => "pan-up",
            MotionEffect::PanDown => "pan-down",
        }
    }
}

impl From<String> for MotionEffect {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<Option<String>> for MotionEffect {
    fn from(value: Option<String>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

/// Style used to dissolve out of a scene into the next one.
///
/// Every variant except `None` names an ffmpeg `xfade` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum TransitionStyle {
    /// Hard cut, no overlap at this boundary.
    None,
    #[default]
    Fade,
    Dissolve,
    FadeBlack,
    FadeWhite,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    CircleOpen,
    CircleClose,
    Radial,
    SmoothLeft,
    SmoothRight,
    Pixelize,
    ZoomIn,
}

impl TransitionStyle {
    /// Parse a transition name; unknown names become `Fade`.
    pub fn parse_lenient(name: &str) -> Self {
        let normalized: String = name
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "none" | "cut" | "hardcut" => TransitionStyle::None,
            "dissolve" => TransitionStyle::Dissolve,
            "fadeblack" => TransitionStyle::FadeBlack,
            "fadewhite" => TransitionStyle::FadeWhite,
            "wipe" | "wipeleft" => TransitionStyle::WipeLeft,
            "wiperight" => TransitionStyle::WipeRight,
            "wipeup" => TransitionStyle::WipeUp,
            "wipedown" => TransitionStyle::WipeDown,
            "slide" | "slideleft" => TransitionStyle::SlideLeft,
            "slideright" => TransitionStyle::SlideRight,
            "slideup" => TransitionStyle::SlideUp,
            "slidedown" => TransitionStyle::SlideDown,
            "circleopen" => TransitionStyle::CircleOpen,
            "circleclose" => TransitionStyle::CircleClose,
            "radial" => TransitionStyle::Radial,
            "smoothleft" => TransitionStyle::SmoothLeft,
            "smoothright" => TransitionStyle::SmoothRight,
            "pixelize" => TransitionStyle::Pixelize,
            "zoom" | "zoomin" => TransitionStyle::ZoomIn,
            _ => TransitionStyle::Fade,
        }
    }

    /// Whether this boundary overlaps the two clips.
    pub fn is_overlap(&self) -> bool {
        !matches!(self, TransitionStyle::None)
    }

    /// The `xfade` transition name, or `None` for a hard cut.
    pub fn xfade_name(&self) -> Option<&'static str> {
        let name = match self {
            TransitionStyle::None => return None,
            TransitionStyle::Fade => "fade",
            TransitionStyle::Dissolve => "dissolve",
            TransitionStyle::FadeBlack => "fadeblack",
            TransitionStyle::FadeWhite => "fadewhite",
            TransitionStyle::WipeLeft => "wipeleft",
            TransitionStyle::WipeRight => "wiperight",
            TransitionStyle::WipeUp => "wipeup",
            TransitionStyle::WipeDown => "wipedown",
            TransitionStyle::SlideLeft => "slideleft",
            TransitionStyle::SlideRight => "slideright",
            TransitionStyle::SlideUp => "slideup",
            TransitionStyle::SlideDown => "slidedown",
            TransitionStyle::CircleOpen => "circleopen",
            TransitionStyle::CircleClose => "circleclose",
            TransitionStyle::Radial => "radial",
            TransitionStyle::SmoothLeft => "smoothleft",
            TransitionStyle::SmoothRight => "smoothright",
            TransitionStyle::Pixelize => "pixelize",
            TransitionStyle::ZoomIn => "zoomin",
        };
        Some(name)
    }
}

impl From<String> for TransitionStyle {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<Option<String>> for TransitionStyle {
    fn from(value: Option<String>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}
