//! Data-block Identity
//!
//! Every piece of scene data that the dependency graph can reference is a
//! data-block: an object, a mesh, a material, a node tree, and so on. A
//! data-block is addressed by its [`SessionUuid`], which stays stable for the
//! lifetime of the process even when the graph is rebuilt from scratch.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::types::*;

/// Process-unique identifier of a data-block.
///
/// Uuids are never reused within one process, so the graph can key carried
/// state on them across structural rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SessionUuid(u64);

impl SessionUuid {
    /// Generate a new unique session uuid.
    pub fn new() -> Self {
        // Zero is reserved for "unset".
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw uuid value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SessionUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for SessionUuid {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SessionUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type tag of a data-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdType {
    Object,
    Mesh,
    Curve,
    MetaBall,
    Lattice,
    Volume,
    GreasePencil,
    PointCloud,
    ShapeKey,
    Action,
    Armature,
    Camera,
    Collection,
    Light,
    LightProbe,
    NodeTree,
    Material,
    Texture,
    Image,
    World,
    Mask,
    LineStyle,
    MovieClip,
    Speaker,
    Sound,
    CacheFile,
    Scene,
    Simulation,
    ParticleSettings,
    Text,
    Font,
    Library,
    Brush,
    Palette,
    WindowManager,
    Screen,
    WorkSpace,
}

impl IdType {
    /// Whether data-blocks of this type get a private evaluation copy.
    ///
    /// Types that return `false` are evaluated in place: the graph references
    /// the original data-block directly.
    pub fn needs_shadow_copy(self) -> bool {
        !matches!(
            self,
            IdType::Library
                | IdType::Text
                | IdType::Font
                | IdType::Brush
                | IdType::Palette
                | IdType::WindowManager
                | IdType::Screen
                | IdType::WorkSpace
                | IdType::Image
        )
    }

    /// Two-letter code used in diagnostics.
    pub fn code(self) -> &'static str {
        match self {
            IdType::Object => "OB",
            IdType::Mesh => "ME",
            IdType::Curve => "CU",
            IdType::MetaBall => "MB",
            IdType::Lattice => "LT",
            IdType::Volume => "VO",
            IdType::GreasePencil => "GD",
            IdType::PointCloud => "PT",
            IdType::ShapeKey => "KE",
            IdType::Action => "AC",
            IdType::Armature => "AR",
            IdType::Camera => "CA",
            IdType::Collection => "GR",
            IdType::Light => "LA",
            IdType::LightProbe => "LP",
            IdType::NodeTree => "NT",
            IdType::Material => "MA",
            IdType::Texture => "TE",
            IdType::Image => "IM",
            IdType::World => "WO",
            IdType::Mask => "MS",
            IdType::LineStyle => "LS",
            IdType::MovieClip => "MC",
            IdType::Speaker => "SK",
            IdType::Sound => "SO",
            IdType::CacheFile => "CF",
            IdType::Scene => "SC",
            IdType::Simulation => "SI",
            IdType::ParticleSettings => "PA",
            IdType::Text => "TX",
            IdType::Font => "VF",
            IdType::Library => "LI",
            IdType::Brush => "BR",
            IdType::Palette => "PL",
            IdType::WindowManager => "WM",
            IdType::Screen => "SR",
            IdType::WorkSpace => "WS",
        }
    }
}

/// Data-block types that carry no evaluation state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericKind {
    Library,
    Brush,
    Palette,
    WindowManager,
    Screen,
    WorkSpace,
}

/// Type-specific payload of a data-block.
///
/// The variant decides the data-block's [`IdType`]; there is no separate tag
/// that could disagree with the payload.
#[derive(Debug, Clone)]
pub enum IdBody {
    Object(Object),
    Geometry(Geometry),
    ShapeKey(ShapeKey),
    Action(Action),
    Armature(Armature),
    Camera(Camera),
    Collection(Collection),
    Light(Light),
    LightProbe,
    NodeTree(NodeTree),
    Material(Material),
    Texture(Texture),
    Image,
    World(World),
    Mask(Mask),
    LineStyle(LineStyle),
    MovieClip,
    Speaker(Speaker),
    Sound,
    CacheFile,
    Scene(Scene),
    Simulation(Simulation),
    ParticleSettings(ParticleSettings),
    Text,
    Font,
    Generic(GenericKind),
}

impl IdBody {
    /// The type tag implied by this payload.
    pub fn id_type(&self) -> IdType {
        match self {
            IdBody::Object(_) => IdType::Object,
            IdBody::Geometry(geometry) => geometry.kind.id_type(),
            IdBody::ShapeKey(_) => IdType::ShapeKey,
            IdBody::Action(_) => IdType::Action,
            IdBody::Armature(_) => IdType::Armature,
            IdBody::Camera(_) => IdType::Camera,
            IdBody::Collection(_) => IdType::Collection,
            IdBody::Light(_) => IdType::Light,
            IdBody::LightProbe => IdType::LightProbe,
            IdBody::NodeTree(_) => IdType::NodeTree,
            IdBody::Material(_) => IdType::Material,
            IdBody::Texture(_) => IdType::Texture,
            IdBody::Image => IdType::Image,
            IdBody::World(_) => IdType::World,
            IdBody::Mask(_) => IdType::Mask,
            IdBody::LineStyle(_) => IdType::LineStyle,
            IdBody::MovieClip => IdType::MovieClip,
            IdBody::Speaker(_) => IdType::Speaker,
            IdBody::Sound => IdType::Sound,
            IdBody::CacheFile => IdType::CacheFile,
            IdBody::Scene(_) => IdType::Scene,
            IdBody::Simulation(_) => IdType::Simulation,
            IdBody::ParticleSettings(_) => IdType::ParticleSettings,
            IdBody::Text => IdType::Text,
            IdBody::Font => IdType::Font,
            IdBody::Generic(kind) => match kind {
                GenericKind::Library => IdType::Library,
                GenericKind::Brush => IdType::Brush,
                GenericKind::Palette => IdType::Palette,
                GenericKind::WindowManager => IdType::WindowManager,
                GenericKind::Screen => IdType::Screen,
                GenericKind::WorkSpace => IdType::WorkSpace,
            },
        }
    }
}

/// A single data-block in the scene database.
#[derive(Debug, Clone)]
pub struct Datablock {
    /// Process-unique identifier.
    pub uuid: SessionUuid,

    /// Human readable name, used only for diagnostics.
    pub name: String,

    /// Type-specific payload.
    pub body: IdBody,

    /// Animation and drivers attached to this data-block.
    pub anim: Option<AnimData>,

    /// Custom properties, only the data-block references matter here.
    pub properties: Option<IdProperties>,

    /// Embedded data-blocks are owned by another data-block (a material's
    /// node tree, a scene's master collection) and managed by that owner.
    pub embedded: bool,
}

impl Datablock {
    /// Create a data-block with a fresh uuid.
    pub fn new(name: impl Into<String>, body: IdBody) -> Self {
        Self {
            uuid: SessionUuid::new(),
            name: name.into(),
            body,
            anim: None,
            properties: None,
            embedded: false,
        }
    }

    /// Attach animation data.
    pub fn with_anim(mut self, anim: AnimData) -> Self {
        self.anim = Some(anim);
        self
    }

    /// Attach custom properties.
    pub fn with_properties(mut self, properties: IdProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Mark the data-block as embedded in its owner.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// The data-block's type tag.
    pub fn id_type(&self) -> IdType {
        self.body.id_type()
    }
}

impl fmt::Display for Datablock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.id_type().code(), self.name)
    }
}
