//! Node Keys
//!
//! Components and operations are addressed by composite keys rather than by
//! pointer. A component is unique per (ID node, node type, name); an
//! operation is unique per (component, opcode, name, name tag).

use std::fmt;

use serde::Serialize;

/// Category of evaluation work a component groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    Parameters,
    Animation,
    Transform,
    Geometry,
    Sequencer,
    LayerCollections,
    CopyOnWrite,
    ObjectFromLayer,
    Audio,
    Armature,
    GenericDatablock,
    Visibility,
    Simulation,
    EvalPose,
    Bone,
    ParticleSystem,
    ParticleSettings,
    Shading,
    ShadingParameters,
    Cache,
    PointCache,
    BatchCache,
    Dupli,
    Synchronization,
}

impl NodeType {
    /// Bit of this type in a component visibility mask.
    pub fn mask_bit(self) -> u64 {
        1 << (self as u64)
    }
}

/// What an operation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperationCode {
    /// Generic placeholder.
    Operation,

    // Parameters.
    ParametersEntry,
    ParametersEval,
    ParametersExit,
    Dimensions,
    Driver,

    // Animation.
    AnimationEntry,
    AnimationEval,
    AnimationExit,

    // Transform.
    TransformInit,
    TransformLocal,
    TransformParent,
    TransformConstraints,
    TransformEval,
    TransformSimulationInit,
    TransformFinal,
    RigidbodyRebuild,
    RigidbodySim,
    RigidbodyTransformCopy,

    // Layer and base flags.
    ObjectFromLayerEntry,
    ObjectBaseFlags,
    ObjectFromLayerExit,
    ViewLayerEval,

    // Geometry.
    GeometryEvalInit,
    GeometryEval,
    GeometryEvalDone,
    GeometryShapekey,
    GeometrySelectUpdate,

    // Armature and pose.
    ArmatureEval,
    PoseInit,
    PoseInitIk,
    PoseCleanup,
    PoseDone,
    PoseIkSolver,
    PoseSplineIkSolver,
    BoneLocal,
    BonePoseParent,
    BoneConstraints,
    BoneReady,
    BoneDone,
    BoneSegments,

    // Particles.
    ParticleSystemInit,
    ParticleSystemEval,
    ParticleSystemDone,
    ParticleSettingsInit,
    ParticleSettingsEval,
    ParticleSettingsReset,
    PointCacheReset,

    // Shading.
    LightUpdate,
    WorldUpdate,
    MaterialUpdate,
    LightProbeEval,

    // Audio and sequencer.
    AudioEntry,
    AudioVolume,
    SpeakerEval,
    SoundEval,
    SequencesEval,

    // Miscellaneous data-blocks.
    SceneEval,
    MaskAnimation,
    MaskEval,
    MovieClipEval,
    MovieClipSelectUpdate,
    FileCacheUpdate,
    GenericDatablockUpdate,
    SimulationEval,

    // Bookkeeping.
    CopyOnWrite,
    Dupli,
    SynchronizeToOriginal,
}

/// Key of a component within its ID node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComponentKey {
    pub node_type: NodeType,
    /// Sub-name, so one type can repeat per sub-entity (one bone component
    /// per bone). Empty for singleton components.
    pub name: String,
}

impl ComponentKey {
    pub fn new(node_type: NodeType, name: impl Into<String>) -> Self {
        Self {
            node_type,
            name: name.into(),
        }
    }
}

impl From<NodeType> for ComponentKey {
    fn from(node_type: NodeType) -> Self {
        Self::new(node_type, "")
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{:?}", self.node_type)
        } else {
            write!(f, "{:?}['{}']", self.node_type, self.name)
        }
    }
}

/// Key of an operation within its component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OperationIdKey {
    pub opcode: OperationCode,
    pub name: String,
    /// Disambiguates operations sharing opcode and name, such as drivers of
    /// different elements of one array property. `-1` when unused.
    pub name_tag: i32,
}

impl OperationIdKey {
    pub fn new(opcode: OperationCode, name: impl Into<String>, name_tag: i32) -> Self {
        Self {
            opcode,
            name: name.into(),
            name_tag,
        }
    }

    /// Key with a name and no tag.
    pub fn named(opcode: OperationCode, name: impl Into<String>) -> Self {
        Self::new(opcode, name, -1)
    }
}

impl From<OperationCode> for OperationIdKey {
    fn from(opcode: OperationCode) -> Self {
        Self::new(opcode, "", -1)
    }
}

impl fmt::Display for OperationIdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.opcode)?;
        if !self.name.is_empty() {
            write!(f, "('{}')", self.name)?;
        }
        if self.name_tag != -1 {
            write!(f, "[{}]", self.name_tag)?;
        }
        Ok(())
    }
}

/// Typed arena positions. An index is only meaningful until the graph is
/// next cleared.
macro_rules! arena_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(usize);

        impl $name {
            /// Position in the owning arena.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }
    };
}

arena_index!(
    /// Index of an ID node in the graph arena.
    IdNodeIndex
);
arena_index!(
    /// Index of a component node in the graph arena.
    ComponentIndex
);
arena_index!(
    /// Index of an operation in the graph's flat operation list.
    OperationIndex
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_keys_with_names_are_distinct() {
        let pose = ComponentKey::from(NodeType::Bone);
        let arm = ComponentKey::new(NodeType::Bone, "Arm");
        assert_ne!(pose, arm);
        assert_eq!(arm.to_string(), "Bone['Arm']");
    }

    #[test]
    fn operation_key_display_includes_tag() {
        let key = OperationIdKey::new(OperationCode::Driver, "location", 2);
        assert_eq!(key.to_string(), "Driver('location')[2]");
        assert_eq!(OperationIdKey::from(OperationCode::BoneDone).to_string(), "BoneDone");
    }

    #[test]
    fn mask_bits_do_not_overlap() {
        assert_ne!(NodeType::Geometry.mask_bit(), NodeType::Transform.mask_bit());
        assert_eq!(NodeType::Parameters.mask_bit(), 1);
    }
}
