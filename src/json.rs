//! The JSON mirror codec: a structural twin of the binary format with the
//! same field names and bounds checks, but no pointer graph, no string
//! deduplication and no `*100`/`/100` wire rescaling.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::bounds::{check_u16, check_u32};
use crate::error::{Error, FormatError};
use crate::model::{
    AlphaKeyframe, AnchorPointKeyframe, BlendMode, ColourKeyframe, Composition, Layer, LayerType,
    Marker, PositionKeyframe, Project, RotationKeyframe, ScaleKeyframe, SizeKeyframe, Texture,
    Timeline,
};

/// Parse a project from its JSON representation.
pub fn decode(input: &[u8]) -> Result<Project, Error> {
    let doc: ProjectJson = serde_json::from_slice(input)?;

    let textures = doc
        .textures
        .into_iter()
        .map(|(name, t)| decode_texture(name, t))
        .collect::<Result<Vec<_>, Error>>()?;

    let compositions = doc
        .compositions
        .into_iter()
        .map(|(name, c)| decode_composition(name, c))
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(Project::new(textures, compositions)?)
}

/// Serialize a project to its pretty-printed JSON representation.
pub fn encode(project: &Project) -> Result<Vec<u8>, Error> {
    let doc = ProjectJson {
        textures: project
            .textures
            .iter()
            .map(|t| (t.name.clone(), encode_texture(t)))
            .collect(),
        compositions: project
            .compositions
            .iter()
            .map(|c| (c.name.clone(), encode_composition(c)))
            .collect(),
    };

    Ok(serde_json::to_vec_pretty(&doc)?)
}

#[derive(Debug, Serialize, Deserialize)]
struct ProjectJson {
    textures: IndexMap<String, TextureJson>,
    compositions: IndexMap<String, CompositionJson>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextureJson {
    width: i64,
    height: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CompositionJson {
    width: i64,
    height: i64,
    layers: Vec<LayerJson>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LayerJson {
    name: String,
    #[serde(rename = "type")]
    layer_type: String,
    blend_mode: String,
    timeline_start: Option<i64>,
    timeline_unknown1: Option<i64>,
    timeline_duration: Option<i64>,
    timeline_unknown2: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position_keyframes: Option<Vec<PositionKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anchor_point_keyframes: Option<Vec<AnchorPointKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    colour_keyframes: Option<Vec<ColourKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale_keyframes: Option<Vec<ScaleKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alpha_keyframes: Option<Vec<AlphaKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation_x_keyframes: Option<Vec<RotationKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation_y_keyframes: Option<Vec<RotationKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation_z_keyframes: Option<Vec<RotationKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size_keyframes: Option<Vec<SizeKeyframeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    markers: Option<Vec<MarkerJson>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PositionKeyframeJson {
    frame: i64,
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnchorPointKeyframeJson {
    frame: i64,
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColourKeyframeJson {
    frame: i64,
    rgba: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScaleKeyframeJson {
    frame: i64,
    x: f32,
    y: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct AlphaKeyframeJson {
    frame: i64,
    value: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct RotationKeyframeJson {
    frame: i64,
    rotation: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct SizeKeyframeJson {
    frame: i64,
    width: i64,
    height: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct MarkerJson {
    frame: i64,
    unknown: i64,
    name: String,
}

fn decode_texture(name: String, t: TextureJson) -> Result<Texture, Error> {
    Ok(Texture {
        width: check_u16(t.width, format!("texture '{name}' width"))?,
        height: check_u16(t.height, format!("texture '{name}' height"))?,
        name,
    })
}

fn encode_texture(t: &Texture) -> TextureJson {
    TextureJson {
        width: t.width as i64,
        height: t.height as i64,
    }
}

fn decode_composition(name: String, c: CompositionJson) -> Result<Composition, Error> {
    let width = check_u16(c.width, format!("composition '{name}' width"))?;
    let height = check_u16(c.height, format!("composition '{name}' height"))?;
    let layers = c
        .layers
        .into_iter()
        .map(decode_layer)
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(Composition {
        name,
        width,
        height,
        layers,
    })
}

fn encode_composition(c: &Composition) -> CompositionJson {
    CompositionJson {
        width: c.width as i64,
        height: c.height as i64,
        layers: c.layers.iter().map(encode_layer).collect(),
    }
}

fn layer_type_from_name(value: &str) -> Result<LayerType, Error> {
    match value {
        "composition" => Ok(LayerType::Composition),
        "colour" => Ok(LayerType::Colour),
        "texture" => Ok(LayerType::Texture),
        _ => Err(FormatError::UnknownLayerTypeName {
            value: value.to_string(),
        }
        .into()),
    }
}

fn layer_type_to_name(ty: LayerType) -> &'static str {
    match ty {
        LayerType::Composition => "composition",
        LayerType::Colour => "colour",
        LayerType::Texture => "texture",
    }
}

fn blend_mode_from_name(value: &str) -> Result<BlendMode, Error> {
    match value {
        "normal" => Ok(BlendMode::Normal),
        "additive" => Ok(BlendMode::Additive),
        "unknown" => Ok(BlendMode::Unknown),
        _ => Err(FormatError::UnknownBlendModeName {
            value: value.to_string(),
        }
        .into()),
    }
}

fn blend_mode_to_name(mode: BlendMode) -> &'static str {
    match mode {
        BlendMode::Normal => "normal",
        BlendMode::Additive => "additive",
        BlendMode::Unknown => "unknown",
    }
}

fn decode_layer(input: LayerJson) -> Result<Layer, Error> {
    let name = input.name;
    let layer_type = layer_type_from_name(&input.layer_type)?;
    let blend_mode = blend_mode_from_name(&input.blend_mode)?;
    let timeline = decode_timeline(
        &name,
        input.timeline_start,
        input.timeline_unknown1,
        input.timeline_duration,
        input.timeline_unknown2,
    )?;

    Ok(Layer {
        position_keyframes: decode_keyframes(input.position_keyframes, decode_position_keyframe)?,
        anchor_point_keyframes: decode_keyframes(
            input.anchor_point_keyframes,
            decode_anchor_point_keyframe,
        )?,
        colour_keyframes: decode_keyframes(input.colour_keyframes, decode_colour_keyframe)?,
        scale_keyframes: decode_keyframes(input.scale_keyframes, decode_scale_keyframe)?,
        alpha_keyframes: decode_keyframes(input.alpha_keyframes, decode_alpha_keyframe)?,
        rotation_x_keyframes: decode_keyframes(
            input.rotation_x_keyframes,
            decode_rotation_keyframe,
        )?,
        rotation_y_keyframes: decode_keyframes(
            input.rotation_y_keyframes,
            decode_rotation_keyframe,
        )?,
        rotation_z_keyframes: decode_keyframes(
            input.rotation_z_keyframes,
            decode_rotation_keyframe,
        )?,
        size_keyframes: decode_keyframes(input.size_keyframes, decode_size_keyframe)?,
        markers: decode_keyframes(input.markers, decode_marker_keyframe)?,
        name,
        layer_type,
        blend_mode,
        timeline,
    })
}

fn encode_layer(layer: &Layer) -> LayerJson {
    let (timeline_start, timeline_unknown1, timeline_duration, timeline_unknown2) =
        match layer.timeline {
            Some(t) => (
                Some(t.start as i64),
                Some(t.unknown1 as i64),
                Some(t.duration as i64),
                Some(t.unknown2 as i64),
            ),
            None => (None, None, None, None),
        };

    LayerJson {
        name: layer.name.clone(),
        layer_type: layer_type_to_name(layer.layer_type).to_string(),
        blend_mode: blend_mode_to_name(layer.blend_mode).to_string(),
        timeline_start,
        timeline_unknown1,
        timeline_duration,
        timeline_unknown2,
        position_keyframes: encode_keyframes(&layer.position_keyframes, encode_position_keyframe),
        anchor_point_keyframes: encode_keyframes(
            &layer.anchor_point_keyframes,
            encode_anchor_point_keyframe,
        ),
        colour_keyframes: encode_keyframes(&layer.colour_keyframes, encode_colour_keyframe),
        scale_keyframes: encode_keyframes(&layer.scale_keyframes, encode_scale_keyframe),
        alpha_keyframes: encode_keyframes(&layer.alpha_keyframes, encode_alpha_keyframe),
        rotation_x_keyframes: encode_keyframes(
            &layer.rotation_x_keyframes,
            encode_rotation_keyframe,
        ),
        rotation_y_keyframes: encode_keyframes(
            &layer.rotation_y_keyframes,
            encode_rotation_keyframe,
        ),
        rotation_z_keyframes: encode_keyframes(
            &layer.rotation_z_keyframes,
            encode_rotation_keyframe,
        ),
        size_keyframes: encode_keyframes(&layer.size_keyframes, encode_size_keyframe),
        markers: encode_keyframes(&layer.markers, encode_marker_keyframe),
    }
}

/// The timeline's four fields are either all present or all absent; any
/// other combination has no binary representation.
fn decode_timeline(
    name: &str,
    start: Option<i64>,
    unknown1: Option<i64>,
    duration: Option<i64>,
    unknown2: Option<i64>,
) -> Result<Option<Timeline>, Error> {
    match (start, unknown1, duration, unknown2) {
        (None, None, None, None) => Ok(None),
        (Some(start), Some(unknown1), Some(duration), Some(unknown2)) => Ok(Some(Timeline {
            start: check_u16(start, format!("layer '{name}' timeline_start"))?,
            unknown1: check_u16(unknown1, format!("layer '{name}' timeline_unknown1"))?,
            duration: check_u16(duration, format!("layer '{name}' timeline_duration"))?,
            unknown2: check_u32(unknown2, format!("layer '{name}' timeline_unknown2"))?,
        })),
        _ => Err(FormatError::PartialTimeline {
            name: name.to_string(),
        }
        .into()),
    }
}

/// Decodes a keyframe track, treating a present-but-empty array the same
/// as an absent one.
fn decode_keyframes<T, J>(
    input: Option<Vec<J>>,
    decode_item: impl Fn(J) -> Result<T, Error>,
) -> Result<Option<Vec<T>>, Error> {
    let Some(input) = input else {
        return Ok(None);
    };

    let items = input
        .into_iter()
        .map(decode_item)
        .collect::<Result<Vec<_>, Error>>()?;

    if items.is_empty() {
        Ok(None)
    } else {
        Ok(Some(items))
    }
}

fn encode_keyframes<T, J>(track: &Option<Vec<T>>, encode_item: impl Fn(&T) -> J) -> Option<Vec<J>> {
    track
        .as_ref()
        .map(|items| items.iter().map(encode_item).collect())
}

fn decode_position_keyframe(k: PositionKeyframeJson) -> Result<PositionKeyframe, Error> {
    Ok(PositionKeyframe {
        frame: check_u16(k.frame, "keyframe frame")?,
        x: k.x,
        y: k.y,
        z: k.z,
    })
}

fn encode_position_keyframe(k: &PositionKeyframe) -> PositionKeyframeJson {
    PositionKeyframeJson {
        frame: k.frame as i64,
        x: k.x,
        y: k.y,
        z: k.z,
    }
}

fn decode_anchor_point_keyframe(k: AnchorPointKeyframeJson) -> Result<AnchorPointKeyframe, Error> {
    Ok(AnchorPointKeyframe {
        frame: check_u16(k.frame, "keyframe frame")?,
        x: k.x,
        y: k.y,
        z: k.z,
    })
}

fn encode_anchor_point_keyframe(k: &AnchorPointKeyframe) -> AnchorPointKeyframeJson {
    AnchorPointKeyframeJson {
        frame: k.frame as i64,
        x: k.x,
        y: k.y,
        z: k.z,
    }
}

fn decode_colour_keyframe(k: ColourKeyframeJson) -> Result<ColourKeyframe, Error> {
    let frame = check_u16(k.frame, "keyframe frame")?;
    let (r, g, b, a) = parse_rgba(&k.rgba)?;
    Ok(ColourKeyframe { frame, r, g, b, a })
}

fn encode_colour_keyframe(k: &ColourKeyframe) -> ColourKeyframeJson {
    ColourKeyframeJson {
        frame: k.frame as i64,
        rgba: format!("#{:02x}{:02x}{:02x}{:02x}", k.r, k.g, k.b, k.a),
    }
}

fn parse_rgba(value: &str) -> Result<(u8, u8, u8, u8), Error> {
    let invalid = || FormatError::InvalidRgba {
        value: value.to_string(),
    };

    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 8 {
        return Err(invalid().into());
    }

    let byte = |i: usize| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid());
    Ok((byte(0)?, byte(1)?, byte(2)?, byte(3)?))
}

fn decode_scale_keyframe(k: ScaleKeyframeJson) -> Result<ScaleKeyframe, Error> {
    Ok(ScaleKeyframe {
        frame: check_u16(k.frame, "keyframe frame")?,
        x: k.x,
        y: k.y,
    })
}

fn encode_scale_keyframe(k: &ScaleKeyframe) -> ScaleKeyframeJson {
    ScaleKeyframeJson {
        frame: k.frame as i64,
        x: k.x,
        y: k.y,
    }
}

fn decode_alpha_keyframe(k: AlphaKeyframeJson) -> Result<AlphaKeyframe, Error> {
    Ok(AlphaKeyframe {
        frame: check_u16(k.frame, "keyframe frame")?,
        value: k.value,
    })
}

fn encode_alpha_keyframe(k: &AlphaKeyframe) -> AlphaKeyframeJson {
    AlphaKeyframeJson {
        frame: k.frame as i64,
        value: k.value,
    }
}

fn decode_rotation_keyframe(k: RotationKeyframeJson) -> Result<RotationKeyframe, Error> {
    Ok(RotationKeyframe {
        frame: check_u16(k.frame, "keyframe frame")?,
        degrees: k.rotation,
    })
}

fn encode_rotation_keyframe(k: &RotationKeyframe) -> RotationKeyframeJson {
    RotationKeyframeJson {
        frame: k.frame as i64,
        rotation: k.degrees,
    }
}

fn decode_size_keyframe(k: SizeKeyframeJson) -> Result<SizeKeyframe, Error> {
    Ok(SizeKeyframe {
        frame: check_u16(k.frame, "keyframe frame")?,
        width: check_u16(k.width, "size keyframe width")?,
        height: check_u16(k.height, "size keyframe height")?,
    })
}

fn encode_size_keyframe(k: &SizeKeyframe) -> SizeKeyframeJson {
    SizeKeyframeJson {
        frame: k.frame as i64,
        width: k.width as i64,
        height: k.height as i64,
    }
}

fn decode_marker_keyframe(k: MarkerJson) -> Result<Marker, Error> {
    Ok(Marker {
        frame: check_u16(k.frame, "keyframe frame")?,
        unknown: check_u32(k.unknown, "marker unknown")?,
        name: k.name,
    })
}

fn encode_marker_keyframe(k: &Marker) -> MarkerJson {
    MarkerJson {
        frame: k.frame as i64,
        unknown: k.unknown as i64,
        name: k.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_round_trips() {
        let (r, g, b, a) = parse_rgba("#11223344").unwrap();
        assert_eq!((r, g, b, a), (0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn rgba_rejects_missing_hash() {
        assert!(parse_rgba("11223344").is_err());
    }

    #[test]
    fn rgba_rejects_wrong_length() {
        assert!(parse_rgba("#112233").is_err());
    }

    #[test]
    fn empty_keyframe_array_decodes_to_none() {
        let decoded: Option<Vec<PositionKeyframe>> =
            decode_keyframes(Some(Vec::<PositionKeyframeJson>::new()), decode_position_keyframe)
                .unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn partial_timeline_is_rejected() {
        let err = decode_timeline("L", Some(0), None, None, None).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::PartialTimeline { .. })));
    }

    #[test]
    fn full_timeline_round_trips() {
        let decoded = decode_timeline("L", Some(1), Some(2), Some(3), Some(4096))
            .unwrap()
            .unwrap();
        assert_eq!(
            decoded,
            Timeline {
                start: 1,
                unknown1: 2,
                duration: 3,
                unknown2: 4096,
            }
        );
    }
}
