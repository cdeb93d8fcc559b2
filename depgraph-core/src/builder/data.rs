//! Builders for object data, shading and the remaining data-block types.
//!
//! Most of these follow one shape: memoize, add the ID node, follow custom
//! property references, build animation and parameters, then add the
//! type's own evaluation operations and recurse into what it references.

use super::{BuildContext, BuildTag, GraphBuilder};
use crate::graph::{LinkedState, NodeType, OperationCode, OperationIdKey};
use crate::scene::{
    Camera, Datablock, Geometry, GeometryKind, IdBody, Light, LineStyle, Mask, Material, NodeTree,
    ParticleSettings, SessionUuid, ShaderNodeKind, ShapeKey, Simulation, Speaker, Texture, World,
};

impl GraphBuilder<'_> {
    /// Common prologue of the data-block builders. Returns `false` when the
    /// data-block was already built.
    fn begin_datablock(&mut self, ctx: BuildContext, block: &Datablock) -> bool {
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::COMPLETE) {
            return false;
        }
        self.add_id_node(block);
        self.build_idproperties(ctx, block.properties.as_ref());
        self.build_animdata(ctx, block);
        self.build_parameters(block);
        true
    }

    pub(super) fn build_camera(&mut self, ctx: BuildContext, block: &Datablock, camera: &Camera) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        if let Some(focus) = camera.dof_object {
            self.build_object(ctx, None, focus, LinkedState::Indirectly, false);
        }
    }

    pub(super) fn build_light(&mut self, ctx: BuildContext, block: &Datablock, light: &Light) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        if let Some(tree) = light.node_tree {
            self.visit_id(ctx, tree);
        }
        self.add_operation_node(block, NodeType::Shading, OperationCode::LightUpdate);
    }

    pub(super) fn build_lightprobe(&mut self, ctx: BuildContext, block: &Datablock) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        // Anchor for relations and update tags.
        self.add_operation_node(block, NodeType::Parameters, OperationCode::LightProbeEval);
    }

    pub(super) fn build_speaker(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        speaker: &Speaker,
    ) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(block, NodeType::Audio, OperationCode::SpeakerEval);
        if let Some(sound) = speaker.sound {
            self.visit_id(ctx, sound);
        }
    }

    pub(super) fn build_sound(&mut self, ctx: BuildContext, block: &Datablock) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(block, NodeType::Audio, OperationCode::SoundEval);
    }

    pub(super) fn build_cachefile(&mut self, ctx: BuildContext, block: &Datablock) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(block, NodeType::Cache, OperationCode::FileCacheUpdate);
    }

    pub(super) fn build_mask(&mut self, ctx: BuildContext, block: &Datablock, mask: &Mask) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(block, NodeType::Animation, OperationCode::MaskAnimation);
        self.add_operation_node(block, NodeType::Parameters, OperationCode::MaskEval);
        for parent in &mask.parents {
            self.visit_id(ctx, *parent);
        }
    }

    pub(super) fn build_movieclip(&mut self, ctx: BuildContext, block: &Datablock) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(block, NodeType::Parameters, OperationCode::MovieClipEval);
        self.add_operation_node(block, NodeType::BatchCache, OperationCode::MovieClipSelectUpdate);
    }

    pub(super) fn build_linestyle(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        line_style: &LineStyle,
    ) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        if let Some(tree) = line_style.node_tree {
            self.visit_id(ctx, tree);
        }
    }

    pub(super) fn build_world(&mut self, ctx: BuildContext, block: &Datablock, world: &World) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(block, NodeType::Shading, OperationCode::WorldUpdate);
        if let Some(tree) = world.node_tree {
            self.visit_id(ctx, tree);
        }
    }

    pub(super) fn build_material(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        material: &Material,
    ) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(block, NodeType::Shading, OperationCode::MaterialUpdate);
        if let Some(tree) = material.node_tree {
            self.visit_id(ctx, tree);
        }
    }

    pub(super) fn build_texture(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        texture: &Texture,
    ) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        if let Some(tree) = texture.node_tree {
            self.visit_id(ctx, tree);
        }
        if let Some(image) = texture.image {
            self.visit_id(ctx, image);
        }
        self.add_operation_node(
            block,
            NodeType::GenericDatablock,
            OperationCode::GenericDatablockUpdate,
        );
    }

    /// Images are evaluated in place; they only get an update anchor.
    pub(super) fn build_image(&mut self, ctx: BuildContext, block: &Datablock) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(
            block,
            NodeType::GenericDatablock,
            OperationCode::GenericDatablockUpdate,
        );
    }

    pub(super) fn build_vfont(&mut self, ctx: BuildContext, block: &Datablock) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(
            block,
            NodeType::GenericDatablock,
            OperationCode::GenericDatablockUpdate,
        );
    }

    pub(super) fn build_nodetree(&mut self, ctx: BuildContext, block: &Datablock, tree: &NodeTree) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        self.add_operation_node(block, NodeType::Shading, OperationCode::MaterialUpdate);
        self.add_operation_node(block, NodeType::ShadingParameters, OperationCode::MaterialUpdate);

        for node in &tree.nodes {
            self.build_idproperties(ctx, node.properties.as_ref());
            for socket_id in &node.socket_ids {
                self.build_nodetree_socket(ctx, *socket_id);
            }
            let Some(id) = node.id else {
                continue;
            };
            match node.kind {
                // Script nodes are not evaluated by the graph.
                ShaderNodeKind::Script => {}
                ShaderNodeKind::Group => self.visit_id(ctx, id),
                ShaderNodeKind::Regular => self.build_nodetree_node_id(ctx, id),
            }
        }
    }

    fn build_nodetree_node_id(&mut self, ctx: BuildContext, id: SessionUuid) {
        let Some(target) = self.datablock(id) else {
            return;
        };
        match &target.body {
            IdBody::Text => {}
            // TODO: use the visibility of the tree's owner once node trees
            // know their owner.
            IdBody::Object(_) => self.build_object(ctx, None, id, LinkedState::Indirectly, true),
            IdBody::Scene(scene) => {
                self.build_scene_parameters(ctx, id);
                // The defocus node reads the scene camera.
                if let Some(camera) = scene.camera {
                    self.build_object(ctx, None, camera, LinkedState::Indirectly, true);
                }
            }
            _ => self.visit_id(ctx, id),
        }
    }

    fn build_nodetree_socket(&mut self, ctx: BuildContext, id: SessionUuid) {
        let Some(target) = self.datablock(id) else {
            return;
        };
        match &target.body {
            IdBody::Object(_) => self.build_object(ctx, None, id, LinkedState::Indirectly, true),
            IdBody::Collection(_) => self.build_collection(ctx, false, id),
            _ => self.visit_id(ctx, id),
        }
    }

    pub(super) fn build_shapekeys(&mut self, ctx: BuildContext, block: &Datablock, key: &ShapeKey) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        // Exit of the whole key data-block, used by modifier evaluation.
        self.add_operation_node(block, NodeType::Geometry, OperationCode::GeometryShapekey);
        for key_block in &key.blocks {
            self.add_operation_node(
                block,
                NodeType::Parameters,
                OperationIdKey::named(OperationCode::ParametersEval, key_block.as_str()),
            );
        }
    }

    pub(super) fn build_simulation(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        simulation: &Simulation,
    ) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        if let Some(tree) = simulation.node_tree {
            self.visit_id(ctx, tree);
        }
        self.add_operation_node(block, NodeType::Simulation, OperationCode::SimulationEval);
    }

    pub(super) fn build_particle_settings(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        settings: &ParticleSettings,
    ) {
        if !self.begin_datablock(ctx, block) {
            return;
        }
        let init = self.add_operation_node(
            block,
            NodeType::ParticleSettings,
            OperationCode::ParticleSettingsInit,
        );
        self.set_entry(init);
        self.add_operation_node(
            block,
            NodeType::ParticleSettings,
            OperationCode::ParticleSettingsReset,
        );
        let eval = self.add_operation_node(
            block,
            NodeType::ParticleSettings,
            OperationCode::ParticleSettingsEval,
        );
        self.set_exit(eval);

        for texture in settings.textures.iter().flatten() {
            self.visit_id(ctx, *texture);
        }
    }

    /// Geometry data-block shared between objects.
    pub(super) fn build_geometry_datablock(
        &mut self,
        ctx: BuildContext,
        block: &Datablock,
        geometry: &Geometry,
    ) {
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::COMPLETE) {
            return;
        }
        self.add_id_node(block);
        self.build_idproperties(ctx, block.properties.as_ref());
        self.build_animdata(ctx, block);
        if let Some(key) = geometry.shape_key {
            self.visit_id(ctx, key);
        }

        let eval = self.add_operation_node(block, NodeType::Geometry, OperationCode::GeometryEval);
        self.set_entry(eval);
        if geometry.kind == GeometryKind::Curve {
            // Curve helpers may live outside of the scene.
            for helper in [geometry.bevel_object, geometry.taper_object, geometry.text_on_curve]
                .into_iter()
                .flatten()
            {
                self.build_object(ctx, None, helper, LinkedState::Indirectly, false);
            }
        }
        let done =
            self.add_operation_node(block, NodeType::Geometry, OperationCode::GeometryEvalDone);
        self.set_exit(done);

        self.build_parameters(block);
        self.add_operation_node(block, NodeType::BatchCache, OperationCode::GeometrySelectUpdate);
        self.build_materials(ctx, &geometry.materials);
    }
}
