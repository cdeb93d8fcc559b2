//! Objects and object data.
//!
//! An object can be reached many times: through a base, as a parent, as a
//! modifier or constraint target, from an instanced collection. Only the
//! first visit builds nodes; later visits merge visibility, linked state and
//! base presence into the existing ID node.

use super::{BuildContext, BuildTag, GraphBuilder};
use crate::graph::{LinkedState, NodeType, OperationCode, OperationIdKey};
use crate::scene::{Datablock, ForceField, Geometry, IdBody, Object, ParticleRender, SessionUuid};

impl GraphBuilder<'_> {
    pub(super) fn build_object(
        &mut self,
        ctx: BuildContext,
        base_index: Option<usize>,
        uuid: SessionUuid,
        linked_state: LinkedState,
        is_visible: bool,
    ) {
        let Some(block) = self.datablock(uuid) else {
            return;
        };
        let IdBody::Object(object) = &block.body else {
            self.visit_id(ctx, uuid);
            return;
        };

        if self.built.check_is_built_and_tag(uuid, BuildTag::COMPLETE) {
            let mut previous_linked_state = None;
            if let Some(node) = self.graph.find_id_node_mut(uuid) {
                previous_linked_state = Some(node.linked_state);
                node.linked_state = node.linked_state.max(linked_state);
                node.is_directly_visible |= is_visible;
                node.has_base |= base_index.is_some();
            }
            // Only an object first reached indirectly can be missing its base
            // flags.
            if previous_linked_state == Some(LinkedState::Indirectly) {
                self.build_object_flags(block, base_index);
            }
            // Instances do not depend on the instancer, so visibility has to
            // be pushed into the collection again.
            if object.instance_collection.is_some() {
                self.build_object_instance_collection(ctx, block, object, is_visible);
            }
            return;
        }

        let id_node = self.add_id_node(block);
        let is_scene_camera = ctx
            .scene
            .and_then(|scene| self.database.scene(scene))
            .is_some_and(|scene| scene.camera == Some(uuid));
        {
            let node = self.graph.id_node_mut(id_node);
            node.linked_state = linked_state;
            node.is_directly_visible = is_scene_camera || is_visible;
            node.has_base |= base_index.is_some();
        }

        self.build_object_from_layer(block, base_index);
        self.build_object_transform(block, object);

        if let Some(parent) = object.parent {
            self.build_object(ctx, None, parent, LinkedState::Indirectly, is_visible);
        }
        for modifier in &object.modifiers {
            self.build_object_reference_targets(ctx, &modifier.id_refs, is_visible);
        }
        for fx in &object.shader_fx {
            self.build_object_reference_targets(ctx, &fx.id_refs, is_visible);
        }
        for constraint in &object.constraints {
            self.build_object_reference_targets(ctx, &constraint.targets, is_visible);
        }

        self.build_object_data(ctx, block, object);
        self.build_parameters(block);
        self.build_idproperties(ctx, block.properties.as_ref());
        // Object data may drive object level animation, so animation comes
        // after the data.
        self.build_animdata(ctx, block);

        if !object.particle_systems.is_empty() {
            self.build_particle_systems(ctx, block, object, is_visible);
        }
        if let Some(ForceField::Texture(Some(texture))) = object.force_field {
            self.visit_id(ctx, texture);
        }
        if object.instance_collection.is_some() {
            self.build_object_instance_collection(ctx, block, object, is_visible);
        }
        self.build_object_pointcache(block, object);

        if self.config.is_active {
            self.add_operation_node(
                block,
                NodeType::Synchronization,
                OperationCode::SynchronizeToOriginal,
            );
        }
    }

    /// Objects referenced from modifiers, effects and constraints inherit the
    /// owner's visibility; anything else is built on its own.
    fn build_object_reference_targets(
        &mut self,
        ctx: BuildContext,
        targets: &[SessionUuid],
        is_visible: bool,
    ) {
        for target in targets {
            if self.database.object(*target).is_some() {
                self.build_object(ctx, None, *target, LinkedState::Indirectly, is_visible);
            } else {
                self.visit_id(ctx, *target);
            }
        }
    }

    fn build_object_instance_collection(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        object: &Object,
        is_visible: bool,
    ) {
        let Some(collection) = object.instance_collection else {
            return;
        };
        self.build_collection(ctx.with_parent_visibility(is_visible), false, collection);
        self.add_operation_node(block, NodeType::Dupli, OperationCode::Dupli);
    }

    fn build_object_from_layer(&mut self, block: &Datablock, base_index: Option<usize>) {
        let entry = self.add_operation_node(
            block,
            NodeType::ObjectFromLayer,
            OperationCode::ObjectFromLayerEntry,
        );
        self.set_entry(entry);
        let exit = self.add_operation_node(
            block,
            NodeType::ObjectFromLayer,
            OperationCode::ObjectFromLayerExit,
        );
        self.set_exit(exit);
        self.build_object_flags(block, base_index);
    }

    /// Flags copied from the base; only objects with a base get them.
    fn build_object_flags(&mut self, block: &Datablock, base_index: Option<usize>) {
        if base_index.is_none() {
            return;
        }
        self.add_operation_node(block, NodeType::ObjectFromLayer, OperationCode::ObjectBaseFlags);
    }

    fn build_object_transform(&mut self, block: &Datablock, object: &Object) {
        let init =
            self.add_operation_node(block, NodeType::Transform, OperationCode::TransformInit);
        self.set_entry(init);
        self.add_operation_node(block, NodeType::Transform, OperationCode::TransformLocal);
        if object.parent.is_some() {
            self.add_operation_node(block, NodeType::Transform, OperationCode::TransformParent);
        }
        if !object.constraints.is_empty() {
            self.add_operation_node(
                block,
                NodeType::Transform,
                OperationCode::TransformConstraints,
            );
        }
        self.add_operation_node(block, NodeType::Transform, OperationCode::TransformEval);
        self.add_operation_node(block, NodeType::Transform, OperationCode::TransformSimulationInit);
        let done =
            self.add_operation_node(block, NodeType::Transform, OperationCode::TransformFinal);
        self.set_exit(done);
    }

    fn build_object_pointcache(&mut self, block: &Datablock, object: &Object) {
        if !object.has_point_cache() {
            return;
        }
        self.add_operation_node(block, NodeType::PointCache, OperationCode::PointCacheReset);
    }

    fn build_object_data(&mut self, ctx: BuildContext, block: &Datablock, object: &Object) {
        let Some(data) = object.data.and_then(|data| self.datablock(data)) else {
            return;
        };
        match &data.body {
            IdBody::Geometry(geometry) => {
                self.build_object_data_geometry(ctx, block, object, data, geometry)
            }
            IdBody::Armature(_) => self.build_rig(ctx, block, object),
            IdBody::Light(light) => self.build_light(ctx, data, light),
            IdBody::Camera(camera) => self.build_camera(ctx, data, camera),
            IdBody::LightProbe => {
                self.build_lightprobe(ctx, data);
                self.add_operation_node(block, NodeType::Parameters, OperationCode::LightProbeEval);
            }
            IdBody::Speaker(speaker) => {
                self.build_speaker(ctx, data, speaker);
                self.add_operation_node(block, NodeType::Audio, OperationCode::SpeakerEval);
            }
            _ => {
                if !self.built.check_is_built(data.uuid, BuildTag::COMPLETE) {
                    self.build_animdata(ctx, data);
                }
            }
        }
    }

    fn build_object_data_geometry(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        object: &Object,
        data: &Datablock,
        geometry: &Geometry,
    ) {
        let init =
            self.add_operation_node(block, NodeType::Geometry, OperationCode::GeometryEvalInit);
        self.set_entry(init);
        let eval = self.add_operation_node(block, NodeType::Geometry, OperationCode::GeometryEval);
        self.set_exit(eval);

        self.build_materials(ctx, &object.materials);
        self.build_object_pointcache(block, object);
        self.build_geometry_datablock(ctx, data, geometry);
        self.add_operation_node(block, NodeType::Parameters, OperationCode::Dimensions);
        self.add_operation_node(block, NodeType::BatchCache, OperationCode::GeometrySelectUpdate);
    }

    pub(super) fn build_materials(&mut self, ctx: BuildContext, materials: &[Option<SessionUuid>]) {
        for material in materials.iter().flatten() {
            self.visit_id(ctx, *material);
        }
    }

    fn build_particle_systems(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        object: &Object,
        is_visible: bool,
    ) {
        let init = self.add_operation_node(
            block,
            NodeType::ParticleSystem,
            OperationCode::ParticleSystemInit,
        );
        self.set_entry(init);

        for system in &object.particle_systems {
            let Some(settings_block) =
                system.settings.and_then(|settings| self.datablock(settings))
            else {
                continue;
            };
            let IdBody::ParticleSettings(settings) = &settings_block.body else {
                continue;
            };
            self.build_particle_settings(ctx, settings_block, settings);
            self.add_operation_node(
                block,
                NodeType::ParticleSystem,
                OperationIdKey::named(OperationCode::ParticleSystemEval, system.name.as_str()),
            );

            if settings.physics.uses_targets() {
                for target in &system.targets {
                    if *target == block.uuid {
                        continue;
                    }
                    self.build_object(ctx, None, *target, LinkedState::Indirectly, is_visible);
                }
            }
            match settings.render_as {
                ParticleRender::Object => {
                    if let Some(instance) = settings.instance_object {
                        self.build_object(ctx, None, instance, LinkedState::Indirectly, is_visible);
                    }
                }
                ParticleRender::Collection => {
                    if let Some(collection) = settings.instance_collection {
                        self.build_collection(ctx, false, collection);
                    }
                }
                ParticleRender::None | ParticleRender::Halo => {}
            }
        }

        let done = self.add_operation_node(
            block,
            NodeType::ParticleSystem,
            OperationCode::ParticleSystemDone,
        );
        self.set_exit(done);
    }
}
