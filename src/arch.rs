//! Architecture-parameterized sizing for the two on-wire pointer dialects.
use std::fmt;

/// The on-wire pointer width dialect. Carried as a plain runtime value on
/// readers, writers, decoders and encoders rather than a compile-time
/// generic, since a single conversion may need to read one dialect and
/// write the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    X64,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X64 => write!(f, "x64"),
        }
    }
}

impl Architecture {
    /// Width in bytes of a pointer or count field for this dialect.
    pub const fn pointer_size(self) -> u64 {
        match self {
            Architecture::X86 => 4,
            Architecture::X64 => 8,
        }
    }

    pub const fn count_size(self) -> u64 {
        self.pointer_size()
    }

    pub const fn asset_size(self) -> u16 {
        match self {
            Architecture::X86 => 20,
            Architecture::X64 => 32,
        }
    }

    pub const fn asset_terminator_size(self) -> u64 {
        16
    }

    /// Size of the trailing block after the asset terminator: one pointer
    /// to the layers section base, padded out to 16 bytes total.
    pub const fn layers_section_pointer_size(self) -> u64 {
        16
    }

    pub const fn layer_size(self) -> u16 {
        match self {
            Architecture::X86 => 56,
            Architecture::X64 => 112,
        }
    }

    pub const fn layer_timeline_size(self) -> u16 {
        12
    }

    pub const fn position_keyframe_size(self) -> u16 {
        16
    }

    pub const fn anchor_point_keyframe_size(self) -> u16 {
        16
    }

    /// The size the encoder always emits for colour keyframes. The decoder
    /// additionally accepts 20 (see [`Architecture::colour_keyframe_f32_size`]).
    pub const fn colour_keyframe_size(self) -> u16 {
        8
    }

    pub const fn colour_keyframe_f32_size(self) -> u16 {
        20
    }

    pub const fn scale_keyframe_size(self) -> u16 {
        12
    }

    pub const fn alpha_keyframe_size(self) -> u16 {
        8
    }

    pub const fn rotation_keyframe_size(self) -> u16 {
        8
    }

    pub const fn size_keyframe_size(self) -> u16 {
        8
    }

    pub const fn marker_keyframe_size(self) -> u16 {
        match self {
            Architecture::X86 => 12,
            Architecture::X64 => 16,
        }
    }
}
