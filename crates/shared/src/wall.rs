use serde::{Deserialize, Serialize};

use crate::segment::WallSegment;

/// Размер стены по умолчанию: ширина, высота, толщина
pub const DEFAULT_SIZE: [f64; 3] = [1.0, 2.0, 0.2];

/// Нейтральный цвет для стен без явного цвета
pub const DEFAULT_COLOR: &str = "gray";

/// Материал поверхности стены (закрытый список)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Texture {
    Brick,
    Wood,
    Concrete,
}

impl Texture {
    pub fn all() -> &'static [Texture] {
        &[Texture::Brick, Texture::Wood, Texture::Concrete]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Texture::Brick => "brick",
            Texture::Wood => "wood",
            Texture::Concrete => "concrete",
        }
    }

    /// Case-insensitive lookup; `None` for empty or unknown identifiers.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Внешний вид стены: либо простой цвет, либо текстура.
///
/// On the wire both `color` and `texture` are flat optional fields; a
/// textured wall keeps its color only as the fallback shown while the
/// texture loads.
#[derive(Debug, Clone, PartialEq)]
pub enum Appearance {
    Plain { color: Option<String> },
    Textured { texture: Texture, fallback: Option<String> },
}

impl Default for Appearance {
    fn default() -> Self {
        Appearance::Plain { color: None }
    }
}

impl Appearance {
    /// Build from the flat wire fields. Unknown textures degrade to plain.
    pub fn from_wire(color: Option<String>, texture: Option<String>) -> Self {
        let color = color.filter(|c| !c.trim().is_empty());
        match texture.as_deref().map(str::trim) {
            None | Some("") => Appearance::Plain { color },
            Some(name) => match Texture::parse(name) {
                Some(texture) => Appearance::Textured {
                    texture,
                    fallback: color,
                },
                None => {
                    tracing::warn!("Unknown wall texture '{name}', using plain appearance");
                    Appearance::Plain { color }
                }
            },
        }
    }

    /// Stored color, if any (the fallback color for textured walls)
    pub fn color(&self) -> Option<&str> {
        match self {
            Appearance::Plain { color } => color.as_deref(),
            Appearance::Textured { fallback, .. } => fallback.as_deref(),
        }
    }

    pub fn texture(&self) -> Option<Texture> {
        match self {
            Appearance::Plain { .. } => None,
            Appearance::Textured { texture, .. } => Some(*texture),
        }
    }

    /// Color to paint with, falling back to [`DEFAULT_COLOR`]
    pub fn resolved_color(&self) -> &str {
        self.color().unwrap_or(DEFAULT_COLOR)
    }

    pub fn is_textured(&self) -> bool {
        matches!(self, Appearance::Textured { .. })
    }
}

/// Стена — прямоугольный параллелепипед
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WallWire", into = "BoxWire")]
pub struct Wall {
    /// Optional identifier assigned by the inference backend
    pub id: Option<String>,
    /// World-space center
    pub position: [f64; 3],
    /// Width, height, depth
    pub size: [f64; 3],
    /// Euler angles in radians
    pub rotation: [f64; 3],
    pub appearance: Appearance,
}

impl Wall {
    /// Wall of the default size centered at `position`
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            id: None,
            position,
            size: DEFAULT_SIZE,
            rotation: [0.0; 3],
            appearance: Appearance::default(),
        }
    }

    pub fn new(position: [f64; 3], size: [f64; 3]) -> Self {
        Self {
            size,
            ..Self::at(position)
        }
    }

    pub fn with_rotation(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        let color = Some(color.into());
        self.appearance = match self.appearance {
            Appearance::Plain { .. } => Appearance::Plain { color },
            Appearance::Textured { texture, .. } => Appearance::Textured {
                texture,
                fallback: color,
            },
        };
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        let fallback = self.appearance.color().map(str::to_string);
        self.appearance = Appearance::Textured { texture, fallback };
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// All extents finite and strictly positive
    pub fn is_solid(&self) -> bool {
        self.size.iter().all(|s| s.is_finite() && *s > 0.0)
            && self.position.iter().all(|p| p.is_finite())
            && self.rotation.iter().all(|r| r.is_finite())
    }

    /// Overwrite the fields present in `patch`, leaving the rest untouched
    pub fn apply(&mut self, patch: &WallPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(appearance) = &patch.appearance {
            self.appearance = appearance.clone();
        }
    }
}

/// Частичное обновление стены
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallPatch {
    pub position: Option<[f64; 3]>,
    pub size: Option<[f64; 3]>,
    pub rotation: Option<[f64; 3]>,
    pub appearance: Option<Appearance>,
}

impl WallPatch {
    pub fn position(position: [f64; 3]) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn appearance(appearance: Appearance) -> Self {
        Self {
            appearance: Some(appearance),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.size.is_none()
            && self.rotation.is_none()
            && self.appearance.is_none()
    }
}

// ── Wire forms ──────────────────────────────────────────────

/// Стена в том виде, в каком её присылает бэкенд: либо бокс, либо отрезок.
#[derive(Deserialize)]
#[serde(untagged)]
enum WallWire {
    Segment {
        #[serde(default)]
        id: Option<String>,
        start: [f64; 2],
        end: [f64; 2],
        #[serde(default)]
        thickness: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        texture: Option<String>,
    },
    Box {
        #[serde(default)]
        id: Option<String>,
        position: [f64; 3],
        #[serde(default)]
        size: Option<[f64; 3]>,
        #[serde(default)]
        rotation: Option<[f64; 3]>,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        texture: Option<String>,
    },
}

impl From<WallWire> for Wall {
    fn from(wire: WallWire) -> Self {
        match wire {
            WallWire::Box {
                id,
                position,
                size,
                rotation,
                color,
                texture,
            } => Wall {
                id,
                position,
                size: size.unwrap_or(DEFAULT_SIZE),
                rotation: rotation.unwrap_or([0.0; 3]),
                appearance: Appearance::from_wire(color, texture),
            },
            WallWire::Segment {
                id,
                start,
                end,
                thickness,
                height,
                color,
                texture,
            } => {
                let segment = WallSegment::new(start, end)
                    .with_thickness(thickness)
                    .with_height(height);
                let mut wall = segment.to_wall();
                wall.id = id;
                wall.appearance = Appearance::from_wire(color, texture);
                wall
            }
        }
    }
}

#[derive(Serialize)]
struct BoxWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    position: [f64; 3],
    size: [f64; 3],
    rotation: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    texture: Option<Texture>,
}

impl From<Wall> for BoxWire {
    fn from(wall: Wall) -> Self {
        let (color, texture) = match wall.appearance {
            Appearance::Plain { color } => (color, None),
            Appearance::Textured { texture, fallback } => (fallback, Some(texture)),
        };
        BoxWire {
            id: wall.id,
            position: wall.position,
            size: wall.size,
            rotation: wall.rotation,
            color,
            texture,
        }
    }
}
