//! The binary encoder: a two-pass writer that precomputes exact per-section
//! byte sizes (because the format embeds absolute file offsets) before
//! emitting any bytes.
use std::collections::HashSet;

use log::debug;

use crate::arch::Architecture;
use crate::binary::layout::{self, ASSET_TYPE_COMPOSITION, ASSET_TYPE_TEXTURE};
use crate::error::{Error, StructuralError};
use crate::io::{BinaryWriter, StringWriter};
use crate::model::{
    AlphaKeyframe, AnchorPointKeyframe, ColourKeyframe, Composition, Layer, Marker, Project,
    PositionKeyframe, RotationKeyframe, ScaleKeyframe, SizeKeyframe, Timeline,
};

/// Absolute base offsets for each of the four sections, derived from their
/// exact sizes in a size-calculation pass that runs before any bytes are
/// written.
struct SectionOffsets {
    assets_size: u64,
    layers_size: u64,
    keyframes_size: u64,
    strings_size: u64,
}

impl SectionOffsets {
    fn assets(&self) -> u64 {
        0
    }

    fn layers(&self) -> u64 {
        self.assets_size
    }

    fn keyframes(&self) -> u64 {
        self.layers() + self.layers_size
    }

    fn strings(&self) -> u64 {
        self.keyframes() + self.keyframes_size
    }
}

/// Encode a complete project into the given `architecture`'s dialect.
pub fn encode(project: &Project, architecture: Architecture) -> Result<Vec<u8>, Error> {
    debug!(
        "encoding {architecture} project ({} textures, {} compositions)",
        project.textures.len(),
        project.compositions.len()
    );
    let offsets = compute_section_sizes(project, architecture);

    let mut assets_writer = BinaryWriter::new(architecture);
    let mut layers_writer = BinaryWriter::new(architecture);
    let mut keyframes_writer = BinaryWriter::new(architecture);
    let mut strings_writer = StringWriter::new(architecture);

    for texture in &project.textures {
        encode_asset(
            architecture,
            &texture.name,
            ASSET_TYPE_TEXTURE,
            texture.width,
            texture.height,
            0,
            0,
            &offsets,
            &mut assets_writer,
            &mut strings_writer,
        );
    }

    for composition in &project.compositions {
        encode_composition(
            composition,
            architecture,
            &offsets,
            &mut assets_writer,
            &mut layers_writer,
            &mut keyframes_writer,
            &mut strings_writer,
        );
    }

    assets_writer.write_terminator(architecture.asset_terminator_size());
    assets_writer.write_pointer(offsets.layers());
    assets_writer.write_terminator(
        architecture.layers_section_pointer_size() - architecture.pointer_size(),
    );

    check_section_size("assets", offsets.assets_size, assets_writer.tell())?;
    check_section_size("layers", offsets.layers_size, layers_writer.tell())?;
    check_section_size("keyframes", offsets.keyframes_size, keyframes_writer.tell())?;
    check_section_size("strings", offsets.strings_size, strings_writer.tell())?;

    let mut out = assets_writer.into_bytes();
    out.extend(layers_writer.into_bytes());
    out.extend(keyframes_writer.into_bytes());
    out.extend(strings_writer.into_bytes());
    Ok(out)
}

fn check_section_size(section: &'static str, expected: u64, actual: u64) -> Result<(), Error> {
    if expected != actual {
        return Err(StructuralError::SectionSizeMismatch {
            section,
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

fn compute_section_sizes(project: &Project, arch: Architecture) -> SectionOffsets {
    let mut assets_size = 0u64;
    let mut layers_size = 0u64;
    let mut keyframes_size = 0u64;
    let mut strings_size = 0u64;
    let mut existing_strings: HashSet<&str> = HashSet::new();

    for texture in &project.textures {
        assets_size += arch.asset_size() as u64;
        account_string(&texture.name, &mut strings_size, &mut existing_strings);
    }

    for composition in &project.compositions {
        assets_size += arch.asset_size() as u64;
        account_string(&composition.name, &mut strings_size, &mut existing_strings);

        for layer in &composition.layers {
            layers_size += arch.layer_size() as u64;
            account_string(&layer.name, &mut strings_size, &mut existing_strings);

            if layer.timeline.is_some() {
                keyframes_size += arch.layer_timeline_size() as u64;
            }

            keyframes_size += track_size(&layer.position_keyframes, arch.position_keyframe_size());
            keyframes_size += track_size(&layer.anchor_point_keyframes, arch.anchor_point_keyframe_size());
            keyframes_size += track_size(&layer.colour_keyframes, arch.colour_keyframe_size());
            keyframes_size += track_size(&layer.scale_keyframes, arch.scale_keyframe_size());
            keyframes_size += track_size(&layer.alpha_keyframes, arch.alpha_keyframe_size());
            keyframes_size += track_size(&layer.rotation_x_keyframes, arch.rotation_keyframe_size());
            keyframes_size += track_size(&layer.rotation_y_keyframes, arch.rotation_keyframe_size());
            keyframes_size += track_size(&layer.rotation_z_keyframes, arch.rotation_keyframe_size());
            keyframes_size += track_size(&layer.size_keyframes, arch.size_keyframe_size());

            keyframes_size += track_size(&layer.markers, arch.marker_keyframe_size());
            if let Some(markers) = &layer.markers {
                for marker in markers {
                    account_string(&marker.name, &mut strings_size, &mut existing_strings);
                }
            }
        }
    }

    assets_size += arch.asset_terminator_size();
    assets_size += arch.layers_section_pointer_size();

    SectionOffsets {
        assets_size,
        layers_size,
        keyframes_size,
        strings_size,
    }
}

fn account_string<'a>(value: &'a str, strings_size: &mut u64, existing: &mut HashSet<&'a str>) {
    if existing.insert(value) {
        *strings_size += string_encoded_size(value);
    }
}

fn track_size<T>(track: &Option<Vec<T>>, record_size: u16) -> u64 {
    match track {
        Some(items) => record_size as u64 * (items.len() as u64 + 1),
        None => 0,
    }
}

fn string_encoded_size(value: &str) -> u64 {
    value.len() as u64 + 1
}

#[allow(clippy::too_many_arguments)]
fn encode_asset(
    arch: Architecture,
    name: &str,
    type_code: u16,
    width: u16,
    height: u16,
    num_layers: u64,
    layers_pointer: u64,
    offsets: &SectionOffsets,
    assets_writer: &mut BinaryWriter,
    strings_writer: &mut StringWriter,
) {
    let name_pointer = offsets.strings() + strings_writer.write_string(name);

    match arch {
        Architecture::X86 => {
            assets_writer.write_u16(arch.asset_size());
            assets_writer.write_u16(type_code);
            assets_writer.write_pointer(name_pointer);
            assets_writer.write_u16(width);
            assets_writer.write_u16(height);
            assets_writer.write_count(num_layers);
            assets_writer.write_pointer(layers_pointer);
        }
        Architecture::X64 => {
            assets_writer.write_pointer(name_pointer);
            assets_writer.write_u16(arch.asset_size());
            assets_writer.write_u16(type_code);
            assets_writer.write_u16(width);
            assets_writer.write_u16(height);
            assets_writer.write_pointer(layers_pointer);
            assets_writer.write_count(num_layers);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn encode_composition(
    composition: &Composition,
    arch: Architecture,
    offsets: &SectionOffsets,
    assets_writer: &mut BinaryWriter,
    layers_writer: &mut BinaryWriter,
    keyframes_writer: &mut BinaryWriter,
    strings_writer: &mut StringWriter,
) {
    let layers_pointer = offsets.layers() + layers_writer.tell();
    encode_asset(
        arch,
        &composition.name,
        ASSET_TYPE_COMPOSITION,
        composition.width,
        composition.height,
        composition.layers.len() as u64,
        layers_pointer,
        offsets,
        assets_writer,
        strings_writer,
    );

    for layer in &composition.layers {
        encode_layer(layer, arch, offsets, layers_writer, keyframes_writer, strings_writer);
    }
}

fn encode_layer(
    layer: &Layer,
    arch: Architecture,
    offsets: &SectionOffsets,
    layers_writer: &mut BinaryWriter,
    keyframes_writer: &mut BinaryWriter,
    strings_writer: &mut StringWriter,
) {
    let type_nibble = layout::layer_type_to_nibble(layer.layer_type);
    let blend_nibble = layout::blend_mode_to_nibble(layer.blend_mode);

    layers_writer.write_u16(arch.layer_size());
    layers_writer.write_u8((type_nibble << 4) | blend_nibble);
    layers_writer.write_u8(0);
    if arch == Architecture::X64 {
        layers_writer.write_u32(0);
    }

    let name_pointer = offsets.strings() + strings_writer.write_string(&layer.name);
    layers_writer.write_pointer(name_pointer);

    layers_writer.write_pointer(encode_timeline(layer.timeline, arch, offsets, keyframes_writer));

    layers_writer.write_pointer(encode_keyframe_list(
        &layer.position_keyframes,
        arch.position_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_position_keyframe,
    ));
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.anchor_point_keyframes,
        arch.anchor_point_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_anchor_point_keyframe,
    ));
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.colour_keyframes,
        arch.colour_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_colour_keyframe,
    ));
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.scale_keyframes,
        arch.scale_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_scale_keyframe,
    ));
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.alpha_keyframes,
        arch.alpha_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_alpha_keyframe,
    ));
    // Reserved slot: always a null pointer.
    layers_writer.write_pointer(0);
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.rotation_x_keyframes,
        arch.rotation_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_rotation_keyframe,
    ));
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.rotation_y_keyframes,
        arch.rotation_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_rotation_keyframe,
    ));
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.rotation_z_keyframes,
        arch.rotation_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_rotation_keyframe,
    ));
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.size_keyframes,
        arch.size_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_size_keyframe,
    ));
    layers_writer.write_pointer(encode_keyframe_list(
        &layer.markers,
        arch.marker_keyframe_size(),
        offsets,
        keyframes_writer,
        strings_writer,
        encode_marker_keyframe,
    ));
}

fn encode_timeline(
    timeline: Option<Timeline>,
    arch: Architecture,
    offsets: &SectionOffsets,
    keyframes_writer: &mut BinaryWriter,
) -> u64 {
    let Some(timeline) = timeline else {
        return 0;
    };

    let pointer = offsets.keyframes() + keyframes_writer.tell();
    keyframes_writer.write_u16(arch.layer_timeline_size());
    keyframes_writer.write_u16(timeline.start);
    keyframes_writer.write_u16(timeline.unknown1);
    keyframes_writer.write_u16(timeline.duration);
    keyframes_writer.write_u32(timeline.unknown2);
    pointer
}

/// Every keyframe variant, including markers, leads with a `frame` field.
trait HasFrame {
    fn frame(&self) -> crate::model::Frame;
}

impl HasFrame for PositionKeyframe {
    fn frame(&self) -> crate::model::Frame {
        self.frame
    }
}
impl HasFrame for AnchorPointKeyframe {
    fn frame(&self) -> crate::model::Frame {
        self.frame
    }
}
impl HasFrame for ColourKeyframe {
    fn frame(&self) -> crate::model::Frame {
        self.frame
    }
}
impl HasFrame for ScaleKeyframe {
    fn frame(&self) -> crate::model::Frame {
        self.frame
    }
}
impl HasFrame for AlphaKeyframe {
    fn frame(&self) -> crate::model::Frame {
        self.frame
    }
}
impl HasFrame for RotationKeyframe {
    fn frame(&self) -> crate::model::Frame {
        self.frame
    }
}
impl HasFrame for SizeKeyframe {
    fn frame(&self) -> crate::model::Frame {
        self.frame
    }
}
impl HasFrame for Marker {
    fn frame(&self) -> crate::model::Frame {
        self.frame
    }
}

/// Encodes a homogeneous keyframe track into the keyframes buffer,
/// terminated by its `0xFFFF`-frame sentinel, and returns the section-
/// relative pointer to its first record (or 0 if the track is absent).
fn encode_keyframe_list<T: HasFrame>(
    track: &Option<Vec<T>>,
    record_size: u16,
    offsets: &SectionOffsets,
    keyframes_writer: &mut BinaryWriter,
    strings_writer: &mut StringWriter,
    encode_item: impl Fn(&mut BinaryWriter, &mut StringWriter, u64, &T),
) -> u64 {
    let Some(items) = track else {
        return 0;
    };

    let pointer = offsets.keyframes() + keyframes_writer.tell();
    let strings_base = offsets.strings();

    for item in items {
        keyframes_writer.write_u16(record_size);
        keyframes_writer.write_u16(item.frame());
        encode_item(keyframes_writer, strings_writer, strings_base, item);
    }

    keyframes_writer.write_u16(record_size);
    keyframes_writer.write_u16(0xffff);
    keyframes_writer.write_terminator(record_size as u64 - 4);

    pointer
}

fn encode_position_keyframe(kw: &mut BinaryWriter, _sw: &mut StringWriter, _sb: u64, k: &PositionKeyframe) {
    kw.write_f32(k.x);
    kw.write_f32(k.y);
    kw.write_f32(k.z);
}

fn encode_anchor_point_keyframe(
    kw: &mut BinaryWriter,
    _sw: &mut StringWriter,
    _sb: u64,
    k: &AnchorPointKeyframe,
) {
    kw.write_f32(k.x * 100.0);
    kw.write_f32(k.y * 100.0);
    kw.write_f32(k.z * 100.0);
}

fn encode_colour_keyframe(kw: &mut BinaryWriter, _sw: &mut StringWriter, _sb: u64, k: &ColourKeyframe) {
    kw.write_u8(k.r);
    kw.write_u8(k.g);
    kw.write_u8(k.b);
    kw.write_u8(k.a);
}

fn encode_scale_keyframe(kw: &mut BinaryWriter, _sw: &mut StringWriter, _sb: u64, k: &ScaleKeyframe) {
    kw.write_f32(k.x * 100.0);
    kw.write_f32(k.y * 100.0);
}

fn encode_alpha_keyframe(kw: &mut BinaryWriter, _sw: &mut StringWriter, _sb: u64, k: &AlphaKeyframe) {
    kw.write_f32(k.value * 100.0);
}

fn encode_rotation_keyframe(kw: &mut BinaryWriter, _sw: &mut StringWriter, _sb: u64, k: &RotationKeyframe) {
    kw.write_f32(k.degrees);
}

fn encode_size_keyframe(kw: &mut BinaryWriter, _sw: &mut StringWriter, _sb: u64, k: &SizeKeyframe) {
    kw.write_u16(k.width);
    kw.write_u16(k.height);
}

fn encode_marker_keyframe(kw: &mut BinaryWriter, sw: &mut StringWriter, strings_base: u64, k: &Marker) {
    kw.write_u32(k.unknown);
    kw.write_pointer(strings_base + sw.write_string(&k.name));
}
