use proptest::prelude::*;
use reelsmith_scene_model::{Manifest, MotionEffect, Scene, TransitionStyle};

proptest! {
    #[test]
    fn arbitrary_motion_and_transition_names_always_parse(name in ".{0,24}") {
        let json = serde_json::json!({
            "scenes": [{
                "id": "s0",
                "imageFile": "s0.png",
                "motion": name,
                "transition": name,
            }]
        });
        let manifest: Manifest = serde_json::from_value(json).unwrap();
        let scene = &manifest.scenes[0];
        prop_assert!(MotionEffect::ALL.contains(&scene.motion));
        prop_assert_eq!(scene.transition, TransitionStyle::parse_lenient(&name));
    }

    #[test]
    fn nominal_duration_is_always_positive(secs in proptest::num::f64::ANY) {
        let scene = Scene::new("s", "s.png").with_duration(secs);
        let nominal = scene.nominal_duration();
        prop_assert!(nominal.is_finite());
        prop_assert!(nominal > 0.0);
    }
}

#[test]
fn null_motion_and_transition_take_defaults() {
    let json = r#"{"scenes":[{"id":"s0","imageFile":"s0.png","motion":null,"transition":null}]}"#;
    let manifest: Manifest = serde_json::from_str(json).unwrap();
    let scene = &manifest.scenes[0];
    assert_eq!(scene.motion, MotionEffect::ZoomIn);
    assert_eq!(scene.transition, TransitionStyle::Fade);
    assert!(manifest.validate().is_ok());
}
