//! Ken Burns pan/zoom filters for still images.
//!
//! Every motion runs `zoompan` one output frame per looped input frame
//! (`d=1`), so `on` counts output frames and `zoom` carries the previous
//! frame's zoom forward.

use reelsmith_scene_model::MotionEffect;

use crate::filter_graph::Filter;

pub const ZOOM_START: f64 = 1.0;
pub const ZOOM_END: f64 = 1.25;

/// The source image is scaled to this multiple of the output size before
/// zooming, which keeps sub-pixel crop offsets from visibly jittering.
const OVERSCAN: u32 = 2;

/// Frame budget for one clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPlan {
    /// Total output frames, `ceil(duration * fps)`.
    pub frames: u64,
    /// Zoom change per frame for the zooming variants.
    pub increment: f64,
}

impl MotionPlan {
    pub fn new(duration_secs: f64, fps: u32) -> Self {
        let frames = (duration_secs * fps as f64).ceil().max(1.0) as u64;
        Self {
            frames,
            increment: (ZOOM_END - ZOOM_START) / frames as f64,
        }
    }

    /// Denominator for linear pans so the last frame lands on the far edge.
    fn pan_span(&self) -> u64 {
        self.frames.saturating_sub(1).max(1)
    }
}

/// `zoompan` expressions for one motion.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionExpr {
    pub zoom: String,
    pub x: String,
    pub y: String,
}

const CENTER_X: &str = "iw/2-(iw/zoom/2)";
const CENTER_Y: &str = "ih/2-(ih/zoom/2)";

pub fn motion_expr(motion: MotionEffect, plan: &MotionPlan) -> MotionExpr {
    let inc = format!("{:.8}", plan.increment);
    let span = plan.pan_span();
    let fixed_zoom = format!("{ZOOM_END:.2}");

    match motion {
        MotionEffect::ZoomIn => MotionExpr {
            zoom: format!("min(zoom+{inc},{ZOOM_END:.2})"),
            x: CENTER_X.to_string(),
            y: CENTER_Y.to_string(),
        },
        // Starts at the first frame's zoom of 1.0, which trips the reset to
        // ZOOM_END, then walks down.
        MotionEffect::ZoomOut => MotionExpr {
            zoom: format!(
                "if(lte(zoom,{ZOOM_START:.2}),{ZOOM_END:.2},max({floor:.3},zoom-{inc}))",
                floor = ZOOM_START + 0.001
            ),
            x: CENTER_X.to_string(),
            y: CENTER_Y.to_string(),
        },
        MotionEffect::PanLeft => MotionExpr {
            zoom: fixed_zoom,
            x: format!("(iw-iw/zoom)*(1-on/{span})"),
            y: CENTER_Y.to_string(),
        },
        MotionEffect::PanRight => MotionExpr {
            zoom: fixed_zoom,
            x: format!("(iw-iw/zoom)*on/{span}"),
            y: CENTER_Y.to_string(),
        },
        MotionEffect::PanUp => MotionExpr {
            zoom: fixed_zoom,
            x: CENTER_X.to_string(),
            y: format!("(ih-ih/zoom)*(1-on/{span})"),
        },
        MotionEffect::PanDown => MotionExpr {
            zoom: fixed_zoom,
            x: CENTER_X.to_string(),
            y: format!("(ih-ih/zoom)*on/{span}"),
        },
    }
}

/// Full `-vf` filter list turning a looped still into a `width x height` clip.
pub fn motion_filters(
    motion: MotionEffect,
    duration_secs: f64,
    fps: u32,
    width: u32,
    height: u32,
) -> Vec<Filter> {
    let plan = MotionPlan::new(duration_secs, fps);
    let expr = motion_expr(motion, &plan);
    let (canvas_w, canvas_h) = (width * OVERSCAN, height * OVERSCAN);

    vec![
        Filter::new("scale")
            .opt("w", canvas_w)
            .opt("h", canvas_h)
            .opt("force_original_aspect_ratio", "increase"),
        Filter::new("crop").arg(canvas_w).arg(canvas_h),
        Filter::new("zoompan")
            .opt("z", expr.zoom)
            .opt("x", expr.x)
            .opt("y", expr.y)
            .opt("d", 1)
            .opt("s", format!("{width}x{height}"))
            .opt("fps", fps),
        Filter::new("setsar").arg(1),
        Filter::new("format").arg("yuv420p"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_graph::simple_chain;

    #[test]
    fn test_frame_count_rounds_up() {
        let plan = MotionPlan::new(5.1, 30);
        assert_eq!(plan.frames, 153);
        assert!((plan.increment - 0.25 / 153.0).abs() < 1e-12);
        assert_eq!(MotionPlan::new(2.0, 30).frames, 60);
    }

    #[test]
    fn test_zoom_in_is_centered_and_capped() {
        let expr = motion_expr(MotionEffect::ZoomIn, &MotionPlan::new(5.0, 30));
        assert_eq!(expr.zoom, "min(zoom+0.00166667,1.25)");
        assert_eq!(expr.x, CENTER_X);
        assert_eq!(expr.y, CENTER_Y);
    }

    #[test]
    fn test_zoom_out_resets_to_max_first() {
        let expr = motion_expr(MotionEffect::ZoomOut, &MotionPlan::new(5.0, 30));
        assert!(expr.zoom.starts_with("if(lte(zoom,1.00),1.25,"));
        assert!(expr.zoom.contains("zoom-0.00166667"));
    }

    #[test]
    fn test_pans_interpolate_over_frame_range() {
        let plan = MotionPlan::new(5.0, 30);
        let left = motion_expr(MotionEffect::PanLeft, &plan);
        let right = motion_expr(MotionEffect::PanRight, &plan);
        assert_eq!(left.zoom, "1.25");
        assert_eq!(left.x, "(iw-iw/zoom)*(1-on/149)");
        assert_eq!(right.x, "(iw-iw/zoom)*on/149");
        assert_eq!(left.y, CENTER_Y);

        let up = motion_expr(MotionEffect::PanUp, &plan);
        let down = motion_expr(MotionEffect::PanDown, &plan);
        assert_eq!(up.y, "(ih-ih/zoom)*(1-on/149)");
        assert_eq!(down.y, "(ih-ih/zoom)*on/149");
        assert_eq!(down.x, CENTER_X);
    }

    #[test]
    fn test_filter_chain_targets_output_size() {
        let vf = simple_chain(&motion_filters(MotionEffect::PanRight, 4.0, 25, 1280, 720));
        assert!(vf.starts_with("scale=w=2560:h=1440:force_original_aspect_ratio=increase,crop=2560:1440,"));
        assert!(vf.contains(":d=1:s=1280x720:fps=25,"));
        assert!(vf.ends_with("setsar=1,format=yuv420p"));
    }
}
