//! The binary decoder: walks the asset table, layers section, keyframes
//! section and strings section following pointers eagerly into owned data.
use log::{debug, trace};

use crate::arch::Architecture;
use crate::binary::layout::{
    self, ASSET_TYPE_COMPOSITION, ASSET_TYPE_TEXTURE,
};
use crate::error::{Error, StructuralError};
use crate::io::BinaryReader;
use crate::model::{
    AlphaKeyframe, AnchorPointKeyframe, ColourKeyframe, Composition, Layer, Marker, Project,
    PositionKeyframe, RotationKeyframe, ScaleKeyframe, SizeKeyframe, Texture, Timeline,
    TIMELINE_UNKNOWN2,
};

enum Asset {
    Texture(Texture),
    Composition(Composition),
}

/// Decode a complete project from a `buffer` written in the given
/// `architecture`'s dialect.
pub fn decode(buffer: &[u8], architecture: Architecture) -> Result<Project, Error> {
    debug!("decoding {architecture} project ({} bytes)", buffer.len());
    let mut reader = BinaryReader::new(buffer, architecture);

    let terminator = vec![0u8; architecture.asset_terminator_size() as usize];
    let mut assets = Vec::new();
    while reader.peek(terminator.len()) != terminator.as_slice() {
        assets.push(decode_asset(&mut reader)?);
    }

    let mut textures = Vec::new();
    let mut compositions = Vec::new();
    for asset in assets {
        match asset {
            Asset::Texture(t) => textures.push(t),
            Asset::Composition(c) => compositions.push(c),
        }
    }

    Ok(Project::new(textures, compositions)?)
}

fn decode_asset(reader: &mut BinaryReader) -> Result<Asset, Error> {
    let arch = reader.architecture();
    let start = reader.tell();

    let size;
    let type_code;
    let name;
    let width;
    let height;
    let num_layers;
    let layers_pointer;

    match arch {
        Architecture::X86 => {
            size = reader.read_u16()?;
            type_code = reader.read_u16()?;
            name = reader.read_string()?;
            width = reader.read_u16()?;
            height = reader.read_u16()?;
            num_layers = reader.read_count()?;
            layers_pointer = reader.read_pointer()?;
        }
        Architecture::X64 => {
            name = reader.read_string()?;
            size = reader.read_u16()?;
            type_code = reader.read_u16()?;
            width = reader.read_u16()?;
            height = reader.read_u16()?;
            layers_pointer = reader.read_pointer()?;
            num_layers = reader.read_count()?;
        }
    }

    if size != arch.asset_size() {
        return Err(StructuralError::AssetSize {
            name,
            expected: arch.asset_size(),
            actual: size,
        }
        .into());
    }

    let asset = match type_code {
        ASSET_TYPE_TEXTURE => {
            if num_layers != 0 || layers_pointer != 0 {
                return Err(StructuralError::TextureHasLayers {
                    name,
                    num_layers,
                    layers_pointer,
                }
                .into());
            }
            Asset::Texture(Texture {
                name,
                width,
                height,
            })
        }
        ASSET_TYPE_COMPOSITION => {
            if layers_pointer == 0 {
                return Err(StructuralError::CompositionMissingLayers { name }.into());
            }
            reader.seek(layers_pointer);
            let mut layers = Vec::with_capacity(num_layers as usize);
            for _ in 0..num_layers {
                layers.push(decode_layer(reader)?);
            }
            Asset::Composition(Composition {
                name,
                width,
                height,
                layers,
            })
        }
        other => {
            return Err(StructuralError::UnknownAssetType {
                offset: start,
                code: other,
            }
            .into())
        }
    };

    reader.seek(start + size as u64);
    Ok(asset)
}

fn decode_layer(reader: &mut BinaryReader) -> Result<Layer, Error> {
    let arch = reader.architecture();
    let start = reader.tell();

    let size = reader.read_u16()?;
    let type_blend = reader.read_u8()?;
    let pad = reader.read_u8()?;
    let pad64 = if arch == Architecture::X64 {
        Some(reader.read_u32()?)
    } else {
        None
    };

    let name = reader.read_string()?;
    let timeline_pointer = reader.read_pointer()?;
    let position_pointer = reader.read_pointer()?;
    let anchor_point_pointer = reader.read_pointer()?;
    let colour_pointer = reader.read_pointer()?;
    let scale_pointer = reader.read_pointer()?;
    let alpha_pointer = reader.read_pointer()?;
    let reserved_pointer = reader.read_pointer()?;
    let rotation_x_pointer = reader.read_pointer()?;
    let rotation_y_pointer = reader.read_pointer()?;
    let rotation_z_pointer = reader.read_pointer()?;
    let size_pointer = reader.read_pointer()?;
    let marker_pointer = reader.read_pointer()?;

    if size != arch.layer_size() {
        return Err(StructuralError::LayerSize {
            name,
            expected: arch.layer_size(),
            actual: size,
        }
        .into());
    }

    if pad != 0 || pad64.unwrap_or(0) != 0 {
        return Err(StructuralError::LayerPaddingNonZero { offset: start }.into());
    }

    let layer_type = layout::layer_type_from_nibble((type_blend >> 4) & 0xf, start)?;
    let blend_mode = layout::blend_mode_from_nibble(type_blend & 0xf, start)?;

    let timeline = if timeline_pointer != 0 {
        reader.seek(timeline_pointer);
        let timeline_size = reader.read_u16()?;
        let tstart = reader.read_u16()?;
        let unknown1 = reader.read_u16()?;
        let duration = reader.read_u16()?;
        let unknown2 = reader.read_u32()?;

        if timeline_size != arch.layer_timeline_size() {
            return Err(StructuralError::TimelineSize {
                name,
                expected: arch.layer_timeline_size(),
                actual: timeline_size,
            }
            .into());
        }
        if unknown2 != TIMELINE_UNKNOWN2 {
            return Err(StructuralError::TimelineUnknown2 {
                name,
                actual: unknown2,
            }
            .into());
        }

        Some(Timeline {
            start: tstart,
            unknown1,
            duration,
            unknown2,
        })
    } else {
        None
    };

    let position_keyframes =
        decode_keyframe_list(reader, position_pointer, "position", arch.position_keyframe_size(), decode_position_keyframe)?;
    let anchor_point_keyframes = decode_keyframe_list(
        reader,
        anchor_point_pointer,
        "anchor point",
        arch.anchor_point_keyframe_size(),
        decode_anchor_point_keyframe,
    )?;
    let colour_keyframes =
        decode_colour_keyframe_list(reader, colour_pointer, arch)?;
    let scale_keyframes = decode_keyframe_list(
        reader,
        scale_pointer,
        "scale",
        arch.scale_keyframe_size(),
        decode_scale_keyframe,
    )?;
    let alpha_keyframes = decode_keyframe_list(
        reader,
        alpha_pointer,
        "alpha",
        arch.alpha_keyframe_size(),
        decode_alpha_keyframe,
    )?;

    if reserved_pointer != 0 {
        return Err(StructuralError::ReservedKeyframesPresent {
            name,
            pointer: reserved_pointer,
        }
        .into());
    }

    let rotation_x_keyframes = decode_keyframe_list(
        reader,
        rotation_x_pointer,
        "rotation",
        arch.rotation_keyframe_size(),
        decode_rotation_keyframe,
    )?;
    let rotation_y_keyframes = decode_keyframe_list(
        reader,
        rotation_y_pointer,
        "rotation",
        arch.rotation_keyframe_size(),
        decode_rotation_keyframe,
    )?;
    let rotation_z_keyframes = decode_keyframe_list(
        reader,
        rotation_z_pointer,
        "rotation",
        arch.rotation_keyframe_size(),
        decode_rotation_keyframe,
    )?;
    let size_keyframes = decode_keyframe_list(
        reader,
        size_pointer,
        "size",
        arch.size_keyframe_size(),
        decode_size_keyframe,
    )?;
    let markers = decode_keyframe_list(
        reader,
        marker_pointer,
        "marker",
        arch.marker_keyframe_size(),
        decode_marker_keyframe,
    )?;

    reader.seek(start + size as u64);

    Ok(Layer {
        name,
        layer_type,
        blend_mode,
        timeline,
        position_keyframes,
        anchor_point_keyframes,
        colour_keyframes,
        scale_keyframes,
        alpha_keyframes,
        rotation_x_keyframes,
        rotation_y_keyframes,
        rotation_z_keyframes,
        size_keyframes,
        markers,
    })
}

/// Decodes a sentinel-terminated, homogeneously-sized keyframe list, or
/// `None` if `pointer` is null.
fn decode_keyframe_list<T>(
    reader: &mut BinaryReader,
    pointer: u64,
    kind: &'static str,
    expected_size: u16,
    decode_item: impl Fn(&mut BinaryReader, u16, u16) -> Result<T, Error>,
) -> Result<Option<Vec<T>>, Error> {
    if pointer == 0 {
        return Ok(None);
    }

    reader.seek(pointer);
    let mut items = Vec::new();
    loop {
        let item_start = reader.tell();
        let size = reader.read_u16()?;
        let frame = reader.read_u16()?;
        if frame == 0xffff {
            break;
        }

        if size != expected_size {
            return Err(StructuralError::KeyframeSize {
                kind,
                expected: expected_size,
                actual: size,
            }
            .into());
        }

        items.push(decode_item(reader, size, frame)?);
        reader.seek(item_start + size as u64);
    }

    trace!("decoded {} {kind} keyframes at {pointer:#x}", items.len());
    Ok(Some(items))
}

fn decode_position_keyframe(reader: &mut BinaryReader, _size: u16, frame: u16) -> Result<PositionKeyframe, Error> {
    Ok(PositionKeyframe {
        frame,
        x: reader.read_f32()?,
        y: reader.read_f32()?,
        z: reader.read_f32()?,
    })
}

fn decode_anchor_point_keyframe(
    reader: &mut BinaryReader,
    _size: u16,
    frame: u16,
) -> Result<AnchorPointKeyframe, Error> {
    Ok(AnchorPointKeyframe {
        frame,
        x: reader.read_f32()? / 100.0,
        y: reader.read_f32()? / 100.0,
        z: reader.read_f32()? / 100.0,
    })
}

/// Colour keyframes are the only shape accepting two distinct on-wire
/// sizes, so they are decoded outside the homogeneous [`decode_keyframe_list`]
/// dispatch.
fn decode_colour_keyframe_list(
    reader: &mut BinaryReader,
    pointer: u64,
    arch: Architecture,
) -> Result<Option<Vec<ColourKeyframe>>, Error> {
    if pointer == 0 {
        return Ok(None);
    }

    reader.seek(pointer);
    let mut items = Vec::new();
    loop {
        let item_start = reader.tell();
        let size = reader.read_u16()?;
        let frame = reader.read_u16()?;
        if frame == 0xffff {
            break;
        }

        let keyframe = if size == arch.colour_keyframe_size() {
            ColourKeyframe {
                frame,
                r: reader.read_u8()?,
                g: reader.read_u8()?,
                b: reader.read_u8()?,
                a: reader.read_u8()?,
            }
        } else if size == arch.colour_keyframe_f32_size() {
            ColourKeyframe {
                frame,
                r: (reader.read_f32()? * 255.0) as u8,
                g: (reader.read_f32()? * 255.0) as u8,
                b: (reader.read_f32()? * 255.0) as u8,
                a: (reader.read_f32()? * 255.0) as u8,
            }
        } else {
            return Err(crate::error::FormatError::ColourKeyframeSize { actual: size }.into());
        };

        items.push(keyframe);
        reader.seek(item_start + size as u64);
    }

    Ok(Some(items))
}

fn decode_scale_keyframe(reader: &mut BinaryReader, _size: u16, frame: u16) -> Result<ScaleKeyframe, Error> {
    Ok(ScaleKeyframe {
        frame,
        x: reader.read_f32()? / 100.0,
        y: reader.read_f32()? / 100.0,
    })
}

fn decode_alpha_keyframe(reader: &mut BinaryReader, _size: u16, frame: u16) -> Result<AlphaKeyframe, Error> {
    Ok(AlphaKeyframe {
        frame,
        value: reader.read_f32()? / 100.0,
    })
}

fn decode_rotation_keyframe(reader: &mut BinaryReader, _size: u16, frame: u16) -> Result<RotationKeyframe, Error> {
    Ok(RotationKeyframe {
        frame,
        degrees: reader.read_f32()?,
    })
}

fn decode_size_keyframe(reader: &mut BinaryReader, _size: u16, frame: u16) -> Result<SizeKeyframe, Error> {
    Ok(SizeKeyframe {
        frame,
        width: reader.read_u16()?,
        height: reader.read_u16()?,
    })
}

fn decode_marker_keyframe(reader: &mut BinaryReader, _size: u16, frame: u16) -> Result<Marker, Error> {
    let unknown = reader.read_u32()?;
    let name = reader.read_string()?;
    Ok(Marker {
        frame,
        unknown,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BinaryWriter;

    #[test]
    fn colour_keyframe_accepts_f32_form() {
        let arch = Architecture::X86;
        let mut w = BinaryWriter::new(arch);
        // Null (0) is reserved as the "absent track" pointer, so pad the
        // buffer's start with a few unread bytes to keep the record's own
        // offset non-zero.
        w.write_u32(0);
        let pointer = w.tell();
        w.write_u16(arch.colour_keyframe_f32_size());
        w.write_u16(0);
        w.write_f32(1.0);
        w.write_f32(0.5);
        w.write_f32(0.0);
        w.write_f32(1.0);
        // sentinel
        w.write_u16(arch.colour_keyframe_f32_size());
        w.write_u16(0xffff);
        w.write_terminator(arch.colour_keyframe_f32_size() as u64 - 4);

        let bytes = w.into_bytes();
        let mut reader = BinaryReader::new(&bytes, arch);
        let keyframes = decode_colour_keyframe_list(&mut reader, pointer, arch)
            .unwrap()
            .unwrap();

        assert_eq!(keyframes.len(), 1);
        assert_eq!(keyframes[0].r, 255);
        assert_eq!(keyframes[0].g, (0.5 * 255.0) as u8);
        assert_eq!(keyframes[0].b, 0);
        assert_eq!(keyframes[0].a, 255);
    }

    #[test]
    fn colour_keyframe_rejects_unknown_size() {
        let arch = Architecture::X86;
        let mut w = BinaryWriter::new(arch);
        w.write_u32(0);
        let pointer = w.tell();
        w.write_u16(7);
        w.write_u16(0);
        w.write_terminator(5);

        let bytes = w.into_bytes();
        let mut reader = BinaryReader::new(&bytes, arch);
        let err = decode_colour_keyframe_list(&mut reader, pointer, arch).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(crate::error::FormatError::ColourKeyframeSize { actual: 7 })
        ));
    }
}
