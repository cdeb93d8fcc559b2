//! Data-block Payloads
//!
//! Per-type payloads of the scene database. Only the fields the graph builder
//! traverses are modelled: references to other data-blocks and the handful
//! of flags that change which operations get created.

use super::id::{IdType, SessionUuid};

/// Custom properties of a data-block, bone or node.
#[derive(Debug, Clone, Default)]
pub struct IdProperties {
    /// Data-blocks referenced from property values.
    pub id_refs: Vec<SessionUuid>,
}

/// An animation curve targeting one property.
#[derive(Debug, Clone)]
pub struct FCurve {
    pub rna_path: String,
    pub array_index: i32,
}

impl FCurve {
    pub fn new(rna_path: impl Into<String>, array_index: i32) -> Self {
        Self {
            rna_path: rna_path.into(),
            array_index,
        }
    }
}

/// A driver variable, reading properties of other data-blocks.
#[derive(Debug, Clone, Default)]
pub struct DriverVariable {
    pub name: String,
    pub targets: Vec<SessionUuid>,
}

/// A driven property.
#[derive(Debug, Clone)]
pub struct Driver {
    /// Path of the driven property, disambiguates drivers of one data-block.
    pub rna_path: String,
    /// Index into the driven property array.
    pub array_index: i32,
    pub variables: Vec<DriverVariable>,
}

impl Driver {
    pub fn new(rna_path: impl Into<String>, array_index: i32) -> Self {
        Self {
            rna_path: rna_path.into(),
            array_index,
            variables: Vec::new(),
        }
    }

    /// Add a variable reading from the given data-blocks.
    pub fn with_variable(mut self, name: impl Into<String>, targets: Vec<SessionUuid>) -> Self {
        self.variables.push(DriverVariable {
            name: name.into(),
            targets,
        });
        self
    }
}

/// Animation data of a data-block.
#[derive(Debug, Clone, Default)]
pub struct AnimData {
    /// Active action.
    pub action: Option<SessionUuid>,
    /// Actions referenced from NLA strips.
    pub nla_actions: Vec<SessionUuid>,
    pub drivers: Vec<Driver>,
}

impl AnimData {
    /// Whether keyframe animation (as opposed to drivers only) is present.
    pub fn has_animation(&self) -> bool {
        self.action.is_some() || !self.nla_actions.is_empty()
    }
}

/// An action: a set of animation curves.
#[derive(Debug, Clone, Default)]
pub struct Action {
    pub fcurves: Vec<FCurve>,
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// Kind of an object modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Armature,
    Hook,
    Boolean,
    Subdivision,
    Nodes,
    Cloth,
    SoftBody,
    Fluid,
    DynamicPaint,
    Other,
}

impl ModifierKind {
    /// Modifiers which keep simulation state in a point cache.
    pub fn uses_point_cache(self) -> bool {
        matches!(
            self,
            ModifierKind::Cloth
                | ModifierKind::SoftBody
                | ModifierKind::Fluid
                | ModifierKind::DynamicPaint
        )
    }
}

/// Object modifier. Only its data-block references are modelled.
#[derive(Debug, Clone)]
pub struct Modifier {
    pub name: String,
    pub kind: ModifierKind,
    pub id_refs: Vec<SessionUuid>,
}

impl Modifier {
    pub fn new(name: impl Into<String>, kind: ModifierKind, id_refs: Vec<SessionUuid>) -> Self {
        Self {
            name: name.into(),
            kind,
            id_refs,
        }
    }
}

/// Shader effect of a grease pencil object.
#[derive(Debug, Clone, Default)]
pub struct ShaderFx {
    pub name: String,
    pub id_refs: Vec<SessionUuid>,
}

/// Kind of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Inverse kinematics. `chain_len == 0` means "up to the root".
    Kinematic { chain_len: u32 },
    SplineIk { chain_len: u32 },
    Other,
}

/// Object or bone constraint.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub targets: Vec<SessionUuid>,
}

impl Constraint {
    pub fn new(name: impl Into<String>, kind: ConstraintKind, targets: Vec<SessionUuid>) -> Self {
        Self {
            name: name.into(),
            kind,
            targets,
        }
    }
}

/// A particle system on an object.
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    pub name: String,
    pub settings: Option<SessionUuid>,
    /// Objects used as keyed or boid targets.
    pub targets: Vec<SessionUuid>,
}

/// A pose bone of an armature object.
#[derive(Debug, Clone, Default)]
pub struct PoseChannel {
    pub name: String,
    pub parent: Option<String>,
    pub constraints: Vec<Constraint>,
    /// Object drawn in place of the bone.
    pub custom_shape: Option<SessionUuid>,
    /// Number of B-Bone segments, values above one need segment evaluation.
    pub bbone_segments: u32,
    pub properties: Option<IdProperties>,
}

impl PoseChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bbone_segments: 1,
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Pose of an armature object.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    pub channels: Vec<PoseChannel>,
}

impl Pose {
    pub fn channel(&self, name: &str) -> Option<&PoseChannel> {
        self.channels.iter().find(|channel| channel.name == name)
    }
}

/// Rigid body constraint between two objects.
#[derive(Debug, Clone, Default)]
pub struct RigidBodyConstraint {
    pub object1: Option<SessionUuid>,
    pub object2: Option<SessionUuid>,
}

/// Kind of force field carried by an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceField {
    Wind,
    Vortex,
    /// Texture force field; only this kind references a data-block.
    Texture(Option<SessionUuid>),
}

/// An object: a placement of data in the scene.
#[derive(Debug, Clone, Default)]
pub struct Object {
    /// Object data (mesh, armature, camera, ...). Empties carry none.
    pub data: Option<SessionUuid>,
    pub parent: Option<SessionUuid>,
    pub modifiers: Vec<Modifier>,
    pub shader_fx: Vec<ShaderFx>,
    pub constraints: Vec<Constraint>,
    /// Object level material slots.
    pub materials: Vec<Option<SessionUuid>>,
    pub particle_systems: Vec<ParticleSystem>,
    pub instance_collection: Option<SessionUuid>,
    pub pose: Option<Pose>,
    pub force_field: Option<ForceField>,
    pub rigid_body: bool,
    pub rigid_body_constraint: Option<RigidBodyConstraint>,
}

impl Object {
    /// An object using the given data.
    pub fn with_data(data: SessionUuid) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    /// Whether the object keeps simulation state in a point cache.
    pub fn has_point_cache(&self) -> bool {
        self.rigid_body
            || !self.particle_systems.is_empty()
            || self.modifiers.iter().any(|modifier| modifier.kind.uses_point_cache())
    }
}

// ---------------------------------------------------------------------------
// Object data
// ---------------------------------------------------------------------------

/// Kind of geometry data-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Mesh,
    Curve,
    MetaBall,
    Lattice,
    Volume,
    GreasePencil,
    PointCloud,
}

impl GeometryKind {
    pub fn id_type(self) -> IdType {
        match self {
            GeometryKind::Mesh => IdType::Mesh,
            GeometryKind::Curve => IdType::Curve,
            GeometryKind::MetaBall => IdType::MetaBall,
            GeometryKind::Lattice => IdType::Lattice,
            GeometryKind::Volume => IdType::Volume,
            GeometryKind::GreasePencil => IdType::GreasePencil,
            GeometryKind::PointCloud => IdType::PointCloud,
        }
    }
}

/// Geometry data-block shared by mesh-like object data.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub materials: Vec<Option<SessionUuid>>,
    pub shape_key: Option<SessionUuid>,
    /// Curve only: object defining the bevel profile.
    pub bevel_object: Option<SessionUuid>,
    /// Curve only: object defining the taper.
    pub taper_object: Option<SessionUuid>,
    /// Curve only: text follows this curve object.
    pub text_on_curve: Option<SessionUuid>,
}

impl Geometry {
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            materials: Vec::new(),
            shape_key: None,
            bevel_object: None,
            taper_object: None,
            text_on_curve: None,
        }
    }

    pub fn with_materials(mut self, materials: Vec<SessionUuid>) -> Self {
        self.materials = materials.into_iter().map(Some).collect();
        self
    }
}

/// Shape keys of a geometry data-block.
#[derive(Debug, Clone, Default)]
pub struct ShapeKey {
    /// Key block names.
    pub blocks: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Bone {
    pub name: String,
    pub properties: Option<IdProperties>,
}

#[derive(Debug, Clone, Default)]
pub struct Armature {
    pub bones: Vec<Bone>,
}

#[derive(Debug, Clone, Default)]
pub struct Camera {
    /// Depth of field focus object.
    pub dof_object: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub struct Light {
    pub node_tree: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub struct Speaker {
    pub sound: Option<SessionUuid>,
}

// ---------------------------------------------------------------------------
// Shading
// ---------------------------------------------------------------------------

/// Kind of a shading node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderNodeKind {
    Regular,
    Group,
    Script,
}

/// A node of a node tree.
#[derive(Debug, Clone)]
pub struct ShaderNode {
    pub name: String,
    pub kind: ShaderNodeKind,
    /// Data-block the node itself points to (image, texture, group tree, ...).
    pub id: Option<SessionUuid>,
    /// Data-blocks referenced from input and output socket values.
    pub socket_ids: Vec<SessionUuid>,
    pub properties: Option<IdProperties>,
}

impl ShaderNode {
    pub fn new(name: impl Into<String>, kind: ShaderNodeKind, id: Option<SessionUuid>) -> Self {
        Self {
            name: name.into(),
            kind,
            id,
            socket_ids: Vec::new(),
            properties: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    pub nodes: Vec<ShaderNode>,
}

#[derive(Debug, Clone, Default)]
pub struct Material {
    pub node_tree: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub image: Option<SessionUuid>,
    pub node_tree: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub struct World {
    pub node_tree: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub struct LineStyle {
    pub node_tree: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub struct Simulation {
    pub node_tree: Option<SessionUuid>,
}

/// A mask; spline points may be parented to tracks of other data-blocks.
#[derive(Debug, Clone, Default)]
pub struct Mask {
    pub parents: Vec<SessionUuid>,
}

// ---------------------------------------------------------------------------
// Particles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticlePhysics {
    None,
    #[default]
    Newton,
    Keyed,
    Boids,
    Fluid,
}

impl ParticlePhysics {
    /// Physics types which read target objects.
    pub fn uses_targets(self) -> bool {
        matches!(self, ParticlePhysics::Keyed | ParticlePhysics::Boids)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleRender {
    None,
    #[default]
    Halo,
    Object,
    Collection,
}

#[derive(Debug, Clone, Default)]
pub struct ParticleSettings {
    pub physics: ParticlePhysics,
    pub render_as: ParticleRender,
    pub instance_object: Option<SessionUuid>,
    pub instance_collection: Option<SessionUuid>,
    /// Texture slots.
    pub textures: Vec<Option<SessionUuid>>,
}

// ---------------------------------------------------------------------------
// Collections and scenes
// ---------------------------------------------------------------------------

/// A collection of objects and child collections.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub objects: Vec<SessionUuid>,
    pub children: Vec<SessionUuid>,
    pub hide_viewport: bool,
    pub hide_render: bool,
}

impl Collection {
    pub fn with_objects(objects: Vec<SessionUuid>) -> Self {
        Self {
            objects,
            ..Default::default()
        }
    }
}

/// Presence of an object in a view layer.
#[derive(Debug, Clone)]
pub struct Base {
    pub object: SessionUuid,
    pub enabled_viewport: bool,
    pub enabled_render: bool,
}

impl Base {
    /// A base enabled in both viewport and render.
    pub fn new(object: SessionUuid) -> Self {
        Self {
            object,
            enabled_viewport: true,
            enabled_render: true,
        }
    }
}

/// View layer state of a collection.
#[derive(Debug, Clone)]
pub struct LayerCollection {
    pub collection: SessionUuid,
    pub exclude: bool,
    pub children: Vec<LayerCollection>,
}

impl LayerCollection {
    pub fn new(collection: SessionUuid) -> Self {
        Self {
            collection,
            exclude: false,
            children: Vec::new(),
        }
    }
}

/// Line-art set of a view layer.
#[derive(Debug, Clone, Default)]
pub struct LineSet {
    pub line_style: Option<SessionUuid>,
    pub collection: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewLayer {
    pub name: String,
    pub bases: Vec<Base>,
    pub layer_collections: Vec<LayerCollection>,
    pub material_override: Option<SessionUuid>,
    pub line_sets: Vec<LineSet>,
}

impl ViewLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A strip of the sequence editor.
#[derive(Debug, Clone, Default)]
pub struct Strip {
    pub name: String,
    pub sound: Option<SessionUuid>,
    pub scene: Option<SessionUuid>,
    pub properties: Option<IdProperties>,
}

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    pub strips: Vec<Strip>,
}

#[derive(Debug, Clone, Default)]
pub struct RigidBodyWorld {
    /// Collection of simulated objects.
    pub collection: Option<SessionUuid>,
    /// Collection of objects carrying rigid body constraints.
    pub constraints: Option<SessionUuid>,
}

/// Timeline marker, optionally switching the active camera.
#[derive(Debug, Clone, Default)]
pub struct Marker {
    pub name: String,
    pub camera: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub camera: Option<SessionUuid>,
    pub world: Option<SessionUuid>,
    /// Embedded collection at the root of the collection hierarchy.
    pub master_collection: Option<SessionUuid>,
    pub view_layers: Vec<ViewLayer>,
    /// Background scene drawn behind this one.
    pub set_scene: Option<SessionUuid>,
    pub sequencer: Option<Sequencer>,
    /// Embedded compositor node tree.
    pub compositor: Option<SessionUuid>,
    pub rigid_body_world: Option<RigidBodyWorld>,
    pub markers: Vec<Marker>,
}

impl Scene {
    /// View layer used when this scene is drawn as a background set.
    pub fn default_render_layer(&self) -> Option<&ViewLayer> {
        self.view_layers.first()
    }
}
