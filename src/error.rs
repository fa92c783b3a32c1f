//! Error types for read and write operations.
use thiserror::Error;

/// Top-level error returned at the codec-call boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("error reading or writing file data")]
    Io(#[from] std::io::Error),

    #[error("error decoding json")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Referential(#[from] ReferentialError),

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Fixed-size invariant violations detected while walking the pointer graph.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StructuralError {
    #[error("asset '{name}' not {expected} bytes ({actual})")]
    AssetSize {
        name: String,
        expected: u16,
        actual: u16,
    },

    #[error("texture '{name}' has non-zero layers ({num_layers} at {layers_pointer:#x})")]
    TextureHasLayers {
        name: String,
        num_layers: u64,
        layers_pointer: u64,
    },

    #[error("composition '{name}' has a null layers pointer")]
    CompositionMissingLayers { name: String },

    #[error("asset at {offset:#x} has an unrecognized type code ({code})")]
    UnknownAssetType { offset: u64, code: u16 },

    #[error("layer '{name}' not {expected} bytes ({actual})")]
    LayerSize {
        name: String,
        expected: u16,
        actual: u16,
    },

    #[error("layer at {offset:#x} has non-zero padding")]
    LayerPaddingNonZero { offset: u64 },

    #[error("layer at {offset:#x} has an unrecognized type nibble ({nibble:#x})")]
    UnknownLayerType { offset: u64, nibble: u8 },

    #[error("layer at {offset:#x} has an unrecognized blend mode nibble ({nibble:#x})")]
    UnknownBlendMode { offset: u64, nibble: u8 },

    #[error("layer '{name}' has unknown keyframes at {pointer:#x}")]
    ReservedKeyframesPresent { name: String, pointer: u64 },

    #[error("layer '{name}' timeline not {expected} bytes ({actual})")]
    TimelineSize {
        name: String,
        expected: u16,
        actual: u16,
    },

    #[error("layer '{name}' unknown2 not 4096 ({actual})")]
    TimelineUnknown2 { name: String, actual: u32 },

    #[error("{kind} keyframe not {expected} bytes ({actual})")]
    KeyframeSize {
        kind: &'static str,
        expected: u16,
        actual: u16,
    },

    #[error("keyframe list is missing its sentinel terminator")]
    MissingSentinel,

    #[error("encoder wrote {actual} {section} section bytes, expected {expected}")]
    SectionSizeMismatch {
        section: &'static str,
        expected: u64,
        actual: u64,
    },
}

/// A named reference that does not resolve to an asset in the same project.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ReferentialError {
    #[error("layer '{layer}' in composition '{composition}' references unknown asset '{asset_name}'")]
    UnresolvedAsset {
        composition: String,
        layer: String,
        asset_name: String,
    },
}

/// An integer field observed outside its declared unsigned range.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("{field} ({value}) is outside of bounds (0 to {max})")]
pub struct BoundsError {
    pub field: String,
    pub value: i64,
    pub max: u64,
}

/// Failures specific to one wire dialect (colour keyframe sizing, JSON shape).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FormatError {
    #[error("colour keyframe not 8 or 20 bytes ({actual})")]
    ColourKeyframeSize { actual: u16 },

    #[error("invalid rgba colour string '{value}'")]
    InvalidRgba { value: String },

    #[error("unrecognized layer type '{value}'")]
    UnknownLayerTypeName { value: String },

    #[error("unrecognized blend mode '{value}'")]
    UnknownBlendModeName { value: String },

    #[error("layer '{name}' has some but not all timeline fields present")]
    PartialTimeline { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
