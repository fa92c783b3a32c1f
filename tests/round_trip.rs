//! Cross-architecture, cross-format and general round-trip properties.
use pretty_assertions::assert_eq;

use aep::model::{
    AlphaKeyframe, AnchorPointKeyframe, BlendMode, ColourKeyframe, Composition, Layer, LayerType,
    Marker, PositionKeyframe, Project, RotationKeyframe, ScaleKeyframe, Texture, Timeline,
};
use aep::{decode_binary, decode_json, encode_binary, encode_json, Architecture};

fn sample_project() -> Project {
    let layer = Layer {
        name: "L-bg".to_string(),
        layer_type: LayerType::Texture,
        blend_mode: BlendMode::Additive,
        timeline: Some(Timeline {
            start: 0,
            unknown1: 1,
            duration: 120,
            unknown2: 4096,
        }),
        position_keyframes: Some(vec![PositionKeyframe {
            frame: 0,
            x: 10.0,
            y: -5.5,
            z: 0.0,
        }]),
        anchor_point_keyframes: Some(vec![AnchorPointKeyframe {
            frame: 0,
            x: 0.25,
            y: 0.5,
            z: 0.75,
        }]),
        colour_keyframes: Some(vec![ColourKeyframe {
            frame: 0,
            r: 255,
            g: 128,
            b: 64,
            a: 255,
        }]),
        scale_keyframes: Some(vec![
            ScaleKeyframe {
                frame: 0,
                x: 1.0,
                y: 1.0,
            },
            ScaleKeyframe {
                frame: 30,
                x: 1.5,
                y: 1.5,
            },
        ]),
        alpha_keyframes: Some(vec![AlphaKeyframe {
            frame: 0,
            value: 1.0,
        }]),
        rotation_x_keyframes: None,
        rotation_y_keyframes: None,
        rotation_z_keyframes: Some(vec![RotationKeyframe {
            frame: 0,
            degrees: 90.0,
        }]),
        size_keyframes: None,
        markers: Some(vec![Marker {
            frame: 10,
            unknown: 7,
            name: "cue".to_string(),
        }]),
    };

    let composition = Composition {
        name: "scene".to_string(),
        width: 1920,
        height: 1080,
        layers: vec![layer],
    };

    Project::new(
        vec![Texture {
            name: "bg".to_string(),
            width: 1920,
            height: 1080,
        }],
        vec![composition],
    )
    .unwrap()
}

#[test]
fn model_round_trips_both_architectures() {
    for arch in [Architecture::X86, Architecture::X64] {
        let project = sample_project();
        let bytes = encode_binary(&project, arch).unwrap();
        let decoded = decode_binary(&bytes, arch).unwrap();
        assert_eq!(decoded, project);
    }
}

#[test]
fn cross_architecture_equivalence() {
    let project = sample_project();
    let x86 = decode_binary(&encode_binary(&project, Architecture::X86).unwrap(), Architecture::X86).unwrap();
    let x64 = decode_binary(&encode_binary(&project, Architecture::X64).unwrap(), Architecture::X64).unwrap();
    assert_eq!(x86, x64);
}

#[test]
fn cross_format_equivalence() {
    let project = sample_project();
    let binary_decoded =
        decode_binary(&encode_binary(&project, Architecture::X86).unwrap(), Architecture::X86).unwrap();

    let json_bytes = encode_json(&binary_decoded).unwrap();
    let json_decoded = decode_json(&json_bytes).unwrap();

    assert_eq!(json_decoded, binary_decoded);
}

#[test]
fn string_deduplication_reuses_offsets() {
    // Two layers whose derived asset name is the same string as the
    // referenced texture: the string table should hold one copy of "bg".
    let layer_a = Layer {
        name: "A-bg".to_string(),
        layer_type: LayerType::Texture,
        blend_mode: BlendMode::Normal,
        timeline: None,
        position_keyframes: None,
        anchor_point_keyframes: None,
        colour_keyframes: None,
        scale_keyframes: None,
        alpha_keyframes: None,
        rotation_x_keyframes: None,
        rotation_y_keyframes: None,
        rotation_z_keyframes: None,
        size_keyframes: None,
        markers: None,
    };
    let layer_b = Layer {
        name: "B-bg".to_string(),
        ..clone_layer(&layer_a)
    };

    let composition = Composition {
        name: "scene".to_string(),
        width: 100,
        height: 100,
        layers: vec![layer_a, layer_b],
    };

    let project = Project::new(
        vec![Texture {
            name: "bg".to_string(),
            width: 10,
            height: 10,
        }],
        vec![composition],
    )
    .unwrap();

    let bytes = encode_binary(&project, Architecture::X86).unwrap();
    let occurrences = bytes
        .windows(b"bg\0".len())
        .filter(|window| *window == b"bg\0")
        .count();
    assert_eq!(occurrences, 1, "the \"bg\" string should be written once and shared by both layers and the texture");

    let decoded = decode_binary(&bytes, Architecture::X86).unwrap();
    assert_eq!(decoded, project);
}

fn clone_layer(layer: &Layer) -> Layer {
    layer.clone()
}

#[test]
fn timeline_unknown2_must_be_4096() {
    let layer = Layer {
        name: "L-bg".to_string(),
        layer_type: LayerType::Texture,
        blend_mode: BlendMode::Normal,
        timeline: Some(Timeline {
            start: 0,
            unknown1: 0,
            duration: 1,
            unknown2: 4095,
        }),
        position_keyframes: None,
        anchor_point_keyframes: None,
        colour_keyframes: None,
        scale_keyframes: None,
        alpha_keyframes: None,
        rotation_x_keyframes: None,
        rotation_y_keyframes: None,
        rotation_z_keyframes: None,
        size_keyframes: None,
        markers: None,
    };
    let composition = Composition {
        name: "scene".to_string(),
        width: 1,
        height: 1,
        layers: vec![layer],
    };
    let project = Project::new(
        vec![Texture {
            name: "bg".to_string(),
            width: 1,
            height: 1,
        }],
        vec![composition],
    )
    .unwrap();

    let bytes = encode_binary(&project, Architecture::X86).unwrap();
    let err = decode_binary(&bytes, Architecture::X86).unwrap_err();
    assert!(matches!(
        err,
        aep::Error::Structural(aep::StructuralError::TimelineUnknown2 { .. })
    ));
}
