//! The in-memory project model.
//!
//! Projects are immutable after successful construction: [`Project::new`]
//! re-runs cross-reference validation every time, so a [`Project`] value is
//! always known-valid for the lifetime of the program.
use crate::error::ReferentialError;

/// A named bitmap asset. Textures carry no pixel data; only the name and
/// declared dimensions are part of this format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub name: String,
    pub width: u16,
    pub height: u16,
}

/// A named scene containing an ordered list of layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Composition,
    Colour,
    Texture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Normal,
    Additive,
    Unknown,
}

/// The layer's timeline group. Either fully present or fully absent on a
/// [`Layer`]; never partially populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub start: u16,
    pub unknown1: u16,
    pub duration: u16,
    pub unknown2: u32,
}

/// The wire-observed constant for [`Timeline::unknown2`]. Any other value
/// is rejected at decode time.
pub const TIMELINE_UNKNOWN2: u32 = 4096;

/// A single animated element within a composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub layer_type: LayerType,
    pub blend_mode: BlendMode,
    pub timeline: Option<Timeline>,
    pub position_keyframes: Option<Vec<PositionKeyframe>>,
    pub anchor_point_keyframes: Option<Vec<AnchorPointKeyframe>>,
    pub colour_keyframes: Option<Vec<ColourKeyframe>>,
    pub scale_keyframes: Option<Vec<ScaleKeyframe>>,
    pub alpha_keyframes: Option<Vec<AlphaKeyframe>>,
    pub rotation_x_keyframes: Option<Vec<RotationKeyframe>>,
    pub rotation_y_keyframes: Option<Vec<RotationKeyframe>>,
    pub rotation_z_keyframes: Option<Vec<RotationKeyframe>>,
    pub size_keyframes: Option<Vec<SizeKeyframe>>,
    pub markers: Option<Vec<Marker>>,
}

impl Layer {
    /// The asset this layer references: the substring after the first
    /// hyphen in the layer's name, or the full name if there is none.
    pub fn asset_name(&self) -> &str {
        match self.name.split_once('-') {
            Some((_, rest)) => rest,
            None => &self.name,
        }
    }
}

/// Frame index shared by every keyframe variant. `0xFFFF` is reserved as the
/// in-stream sentinel and is never a valid frame value in the model.
pub type Frame = u16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionKeyframe {
    pub frame: Frame,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPointKeyframe {
    pub frame: Frame,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourKeyframe {
    pub frame: Frame,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleKeyframe {
    pub frame: Frame,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaKeyframe {
    pub frame: Frame,
    pub value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationKeyframe {
    pub frame: Frame,
    pub degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeKeyframe {
    pub frame: Frame,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub frame: Frame,
    pub unknown: u32,
    pub name: String,
}

/// A project: an ordered set of textures and an ordered set of compositions.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub textures: Vec<Texture>,
    pub compositions: Vec<Composition>,
}

impl Project {
    /// Construct a project, validating that every layer's derived asset
    /// name resolves to a texture or composition in the same project.
    pub fn new(
        textures: Vec<Texture>,
        compositions: Vec<Composition>,
    ) -> Result<Self, ReferentialError> {
        let project = Self {
            textures,
            compositions,
        };
        project.validate_references()?;
        Ok(project)
    }

    fn validate_references(&self) -> Result<(), ReferentialError> {
        for composition in &self.compositions {
            for layer in &composition.layers {
                let asset_name = layer.asset_name();
                let resolves = self.textures.iter().any(|t| t.name == asset_name)
                    || self.compositions.iter().any(|c| c.name == asset_name);
                if !resolves {
                    return Err(ReferentialError::UnresolvedAsset {
                        composition: composition.name.clone(),
                        layer: layer.name.clone(),
                        asset_name: asset_name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &str) -> Layer {
        Layer {
            name: name.to_string(),
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
        }
    }

    #[test]
    fn asset_name_splits_on_first_hyphen() {
        assert_eq!(layer("L-a").asset_name(), "a");
        assert_eq!(layer("L-a-b").asset_name(), "a-b");
        assert_eq!(layer("noop").asset_name(), "noop");
    }

    #[test]
    fn unresolved_reference_is_rejected() {
        let compositions = vec![Composition {
            name: "c".to_string(),
            width: 1,
            height: 1,
            layers: vec![layer("L-missing")],
        }];
        let err = Project::new(Vec::new(), compositions).unwrap_err();
        assert!(matches!(err, ReferentialError::UnresolvedAsset { .. }));
    }

    #[test]
    fn resolved_reference_is_accepted() {
        let textures = vec![Texture {
            name: "a".to_string(),
            width: 2,
            height: 3,
        }];
        let compositions = vec![Composition {
            name: "c".to_string(),
            width: 1,
            height: 1,
            layers: vec![layer("L-a")],
        }];
        assert!(Project::new(textures, compositions).is_ok());
    }
}
