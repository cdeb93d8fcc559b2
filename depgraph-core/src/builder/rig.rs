//! Armatures and pose evaluation.

use super::{BuildContext, BuildTag, GraphBuilder};
use crate::graph::{ComponentKey, LinkedState, NodeType, OperationCode, OperationIdKey};
use crate::scene::{Armature, ConstraintKind, Datablock, IdBody, Object, Pose, PoseChannel};

/// Root of the bone chain a solver constraint on `channel` affects.
///
/// `chain_len == 0` walks up to the topmost bone. The walk is bounded by
/// the number of channels so a malformed parent loop cannot hang it.
pub(crate) fn chain_root<'p>(
    pose: &'p Pose,
    channel: &'p PoseChannel,
    chain_len: u32,
) -> &'p PoseChannel {
    let mut root = channel;
    let mut segments = 0;
    for _ in 0..pose.channels.len() {
        let Some(parent) = root.parent.as_deref().and_then(|name| pose.channel(name)) else {
            break;
        };
        segments += 1;
        if segments == chain_len {
            break;
        }
        root = parent;
    }
    root
}

impl GraphBuilder<'_> {
    pub(super) fn build_rig(&mut self, ctx: BuildContext, block: &Datablock, object: &Object) {
        let Some(data) = object.data.and_then(|data| self.datablock(data)) else {
            return;
        };
        if let IdBody::Armature(armature) = &data.body {
            self.build_armature(ctx, data, armature);
        }
        self.add_operation_node(block, NodeType::Parameters, OperationCode::ArmatureEval);

        let init = self.add_operation_node(block, NodeType::EvalPose, OperationCode::PoseInit);
        self.set_entry(init);
        self.add_operation_node(block, NodeType::EvalPose, OperationCode::PoseInitIk);
        self.add_operation_node(block, NodeType::EvalPose, OperationCode::PoseCleanup);
        let done = self.add_operation_node(block, NodeType::EvalPose, OperationCode::PoseDone);
        self.set_exit(done);

        let Some(pose) = &object.pose else {
            return;
        };
        let is_visible = self
            .graph
            .find_id_node(block.uuid)
            .is_some_and(|node| node.is_directly_visible);

        for channel in &pose.channels {
            let bone = ComponentKey::new(NodeType::Bone, channel.name.as_str());
            let local = self.add_operation_node(block, bone.clone(), OperationCode::BoneLocal);
            self.set_entry(local);
            self.add_operation_node(block, bone.clone(), OperationCode::BonePoseParent);
            self.add_operation_node(block, bone.clone(), OperationCode::BoneReady);
            let mut last = self.add_operation_node(block, bone.clone(), OperationCode::BoneDone);
            if channel.bbone_segments > 1 {
                last = self.add_operation_node(block, bone.clone(), OperationCode::BoneSegments);
            }
            self.set_exit(last);

            if let Some(properties) = &channel.properties {
                self.build_idproperties(ctx, Some(properties));
                self.add_operation_node(
                    block,
                    NodeType::Parameters,
                    OperationIdKey::named(OperationCode::ParametersEval, channel.name.as_str()),
                );
            }

            if !channel.constraints.is_empty() {
                for constraint in &channel.constraints {
                    for target in &constraint.targets {
                        if self.database.object(*target).is_some() {
                            self.build_object(
                                ctx,
                                None,
                                *target,
                                LinkedState::Indirectly,
                                is_visible,
                            );
                        } else {
                            self.visit_id(ctx, *target);
                        }
                    }
                }
                self.add_operation_node(block, bone, OperationCode::BoneConstraints);
            }

            for constraint in &channel.constraints {
                let (opcode, chain_len) = match constraint.kind {
                    ConstraintKind::Kinematic { chain_len } => {
                        (OperationCode::PoseIkSolver, chain_len)
                    }
                    ConstraintKind::SplineIk { chain_len } => {
                        (OperationCode::PoseSplineIkSolver, chain_len)
                    }
                    ConstraintKind::Other => continue,
                };
                let root = chain_root(pose, channel, chain_len);
                let solver = ComponentKey::new(NodeType::EvalPose, root.name.as_str());
                if self.has_operation_node(block.uuid, &solver, &opcode.into()) {
                    continue;
                }
                self.add_operation_node(block, solver, opcode);
            }

            // Custom shapes are only drawn, never evaluated as part of the
            // pose, so they stay invisible here.
            if let Some(shape) = channel.custom_shape {
                self.build_object(ctx, None, shape, LinkedState::Indirectly, false);
            }
        }
    }

    pub(super) fn build_armature(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        armature: &Armature,
    ) {
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::COMPLETE) {
            return;
        }
        self.add_id_node(block);
        self.build_idproperties(ctx, block.properties.as_ref());
        self.build_animdata(ctx, block);
        self.build_parameters(block);
        self.add_operation_node(block, NodeType::Armature, OperationCode::ArmatureEval);
        for bone in &armature.bones {
            self.build_idproperties(ctx, bone.properties.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::config::BuilderConfig;
    use crate::graph::Graph;
    use crate::scene::*;

    fn arm_pose() -> Pose {
        Pose {
            channels: vec![
                PoseChannel::new("Root"),
                PoseChannel::new("Upper").with_parent("Root"),
                PoseChannel::new("Lower").with_parent("Upper"),
                PoseChannel::new("Hand").with_parent("Lower"),
            ],
        }
    }

    #[test]
    fn chain_root_honours_chain_length() {
        let pose = arm_pose();
        let hand = pose.channel("Hand").unwrap();
        assert_eq!(chain_root(&pose, hand, 0).name, "Root");
        assert_eq!(chain_root(&pose, hand, 1).name, "Hand");
        assert_eq!(chain_root(&pose, hand, 2).name, "Lower");
        assert_eq!(chain_root(&pose, pose.channel("Root").unwrap(), 0).name, "Root");
    }

    #[test]
    fn chain_root_survives_parent_loop() {
        let pose = Pose {
            channels: vec![
                PoseChannel::new("A").with_parent("B"),
                PoseChannel::new("B").with_parent("A"),
            ],
        };
        let a = pose.channel("A").unwrap();
        let root = chain_root(&pose, a, 0);
        assert!(root.name == "A" || root.name == "B");
    }

    #[test]
    fn rig_builds_one_component_per_bone_and_shared_solver() {
        let mut database = Database::new();
        let armature = database.add(
            "Skeleton",
            IdBody::Armature(Armature {
                bones: vec![Bone {
                    name: "Root".into(),
                    properties: None,
                }],
            }),
        );
        let target = database.add("IkTarget", IdBody::Object(Object::default()));
        let mut pose = arm_pose();
        pose.channels[3].constraints = vec![Constraint::new(
            "IK",
            ConstraintKind::Kinematic { chain_len: 0 },
            vec![target],
        )];
        pose.channels[2].constraints = vec![Constraint::new(
            "IK",
            ConstraintKind::Kinematic { chain_len: 0 },
            vec![],
        )];
        pose.channels[1].bbone_segments = 4;
        let rig = database.add(
            "Rig",
            IdBody::Object(Object {
                data: Some(armature),
                pose: Some(pose),
                ..Default::default()
            }),
        );

        let mut graph = Graph::new();
        let config = BuilderConfig::default();
        {
            let mut builder = GraphBuilder::new(&mut graph, &database, &config);
            builder.begin_build().unwrap();
            builder.build_id(rig).unwrap();
            builder.end_build().unwrap();
        }

        let node = graph.find_id_node(rig).unwrap();
        assert_eq!(node.components_of_type(NodeType::Bone).count(), 4);

        let upper = graph.find_component(rig, NodeType::Bone, "Upper").unwrap();
        let upper = graph.component(upper);
        let exit = upper.exit_operation().unwrap();
        assert_eq!(graph.operation(exit).opcode(), OperationCode::BoneSegments);

        let hand = graph.find_component(rig, NodeType::Bone, "Hand").unwrap();
        assert!(graph
            .component(hand)
            .find_operation(OperationCode::BoneConstraints, "", -1)
            .is_some());

        let solver = graph.find_component(rig, NodeType::EvalPose, "Root").unwrap();
        assert_eq!(graph.component(solver).operation_count(), 1);
        assert!(graph.find_id_node(target).is_some());
        assert!(graph.find_component(armature, NodeType::Armature, "").is_some());
    }
}
