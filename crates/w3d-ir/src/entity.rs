use serde::{Deserialize, Serialize};
use w3d_core::{Color, Vec3};

use crate::link::Link;
use crate::placement::Placement;

/// Horizontal alignment of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Light source variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    Point,
    Directional,
    /// A cone of light; `angle` is the full cone angle in degrees.
    Spot { angle: f32 },
}

/// Primitive shapes that need no asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Sphere { radius: f32 },
    Cube { size: Vec3 },
    Cylinder { radius: f32, height: f32 },
    Cone { radius: f32, height: f32 },
}

/// The exactly-one piece of content an entity renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Content {
    /// A block of text.
    Text {
        text: String,
        #[serde(default)]
        font: Option<String>,
        #[serde(default)]
        align: TextAlign,
    },
    /// A flat image.
    Image { filename: String },
    /// A 3D model loaded by the host.
    Model { filename: String },
    /// A light source.
    Light {
        kind: LightKind,
        #[serde(default = "default_true")]
        diffuse: bool,
        #[serde(default = "default_true")]
        specular: bool,
        /// Constant, linear and quadratic attenuation.
        #[serde(default = "default_attenuation")]
        attenuation: [f32; 3],
    },
    /// A particle emitter. Its behaviour is the host's business; the runtime
    /// only places and shows it.
    ParticleSystem {
        #[serde(default)]
        particle_count: u32,
        #[serde(default)]
        speed: f32,
    },
    /// A primitive shape.
    Shape { shape: ShapeKind },
}

fn default_true() -> bool {
    true
}

fn default_attenuation() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

/// Content discriminant, for hosts that dispatch on capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Text,
    Image,
    Model,
    Light,
    ParticleSystem,
    Shape,
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Text { .. } => ContentKind::Text,
            Content::Image { .. } => ContentKind::Image,
            Content::Model { .. } => ContentKind::Model,
            Content::Light { .. } => ContentKind::Light,
            Content::ParticleSystem { .. } => ContentKind::ParticleSystem,
            Content::Shape { .. } => ContentKind::Shape,
        }
    }

    /// Asset file the host must load for this content, if any.
    pub fn asset_file(&self) -> Option<&str> {
        match self {
            Content::Image { filename } | Content::Model { filename } => Some(filename),
            _ => None,
        }
    }
}

/// A named scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique name. Entity and frame names share one namespace.
    pub name: String,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Whether scene lights affect this entity.
    #[serde(default)]
    pub lighting: bool,
    /// Pointer rays pass through this entity.
    #[serde(default)]
    pub click_through: bool,
    /// Relative rotations compose about the entity's own axes instead of world axes.
    #[serde(default)]
    pub around_own_axis: bool,
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Name of the sound played by `ObjectChange::Sound`.
    #[serde(default)]
    pub sound: Option<String>,
    #[serde(default)]
    pub link: Option<Link>,
    pub content: Content,
}

fn default_scale() -> f32 {
    1.0
}

impl Entity {
    /// A visible, white, unscaled entity at the center with the given content.
    pub fn new(name: impl Into<String>, content: Content) -> Self {
        Self {
            name: name.into(),
            placement: Placement::default(),
            color: Color::WHITE,
            visible: true,
            lighting: false,
            click_through: false,
            around_own_axis: false,
            scale: 1.0,
            sound: None,
            link: None,
            content,
        }
    }

    /// Shorthand for a text entity.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            name,
            Content::Text {
                text: text.into(),
                font: None,
                align: TextAlign::Center,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind() {
        let light = Content::Light {
            kind: LightKind::Point,
            diffuse: true,
            specular: true,
            attenuation: [1.0, 0.0, 0.0],
        };
        assert_eq!(light.kind(), ContentKind::Light);
        assert_eq!(
            Content::Shape {
                shape: ShapeKind::Sphere { radius: 1.0 }
            }
            .kind(),
            ContentKind::Shape
        );
    }

    #[test]
    fn test_asset_file() {
        let model = Content::Model {
            filename: "chair.obj".into(),
        };
        assert_eq!(model.asset_file(), Some("chair.obj"));
        assert_eq!(Entity::text("t", "hi").content.asset_file(), None);
    }

    #[test]
    fn test_entity_deserializes_with_defaults() {
        let json = r#"{
            "name": "hello",
            "content": {"Text": {"text": "Hello"}}
        }"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert!(entity.visible);
        assert!((entity.scale - 1.0).abs() < 1e-6);
        assert_eq!(entity.color, Color::WHITE);
        assert!(entity.link.is_none());
        assert_eq!(entity.content.kind(), ContentKind::Text);
    }
}
