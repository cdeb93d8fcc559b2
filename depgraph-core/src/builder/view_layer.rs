//! View layers, collections and scenes.

use tracing::debug;

use super::{BuildContext, BuildTag, GraphBuilder};
use crate::config::EvalMode;
use crate::graph::{LinkedState, NodeType, OperationCode};
use crate::scene::{
    Base, Collection, Datablock, GeometryKind, IdBody, IdType, LayerCollection, Scene, SessionUuid,
};

impl GraphBuilder<'_> {
    pub(super) fn build_scene_view_layer(
        &mut self,
        scene_uuid: SessionUuid,
        view_layer_index: usize,
        linked_state: LinkedState,
    ) {
        let Some(block) = self.datablock(scene_uuid) else {
            return;
        };
        let IdBody::Scene(scene) = &block.body else {
            return;
        };
        let Some(view_layer) = scene.view_layers.get(view_layer_index) else {
            return;
        };
        debug!(
            scene = %block,
            view_layer = view_layer.name.as_str(),
            ?linked_state,
            "build view layer"
        );
        let ctx = BuildContext::for_view_layer(scene_uuid);

        let id_node = self.add_id_node(block);
        {
            let node = self.graph.id_node_mut(id_node);
            node.linked_state = node.linked_state.max(linked_state);
        }
        self.graph.add_time_source();

        // Objects with a base are considered visible even when their base is
        // restricted, otherwise their drivers would never run.
        let mut base_index = 0;
        for base in &view_layer.bases {
            if !self.need_pull_base_into_graph(base) {
                continue;
            }
            self.build_object(ctx, Some(base_index), base.object, linked_state, true);
            base_index += 1;
        }
        self.build_layer_collections(ctx, &view_layer.layer_collections);

        if let Some(camera) = scene.camera {
            self.build_object(ctx, None, camera, LinkedState::Indirectly, true);
        }
        if scene.rigid_body_world.is_some() {
            self.build_rigidbody(ctx, block, scene);
        }
        self.build_animdata_once(ctx, block);
        if let Some(world) = scene.world {
            self.visit_id(ctx, world);
        }

        // Some data-blocks are evaluated whether or not anything in the
        // scene references them.
        let database = self.database;
        for cache_file in database.iter_type(IdType::CacheFile) {
            self.build_cachefile(ctx, cache_file);
        }
        for mask in database.iter_type(IdType::Mask) {
            if let IdBody::Mask(data) = &mask.body {
                self.build_mask(ctx, mask, data);
            }
        }
        for clip in database.iter_type(IdType::MovieClip) {
            self.build_movieclip(ctx, clip);
        }

        if let Some(material) = view_layer.material_override {
            self.visit_id(ctx, material);
        }
        for line_set in &view_layer.line_sets {
            if let Some(collection) = line_set.collection {
                self.build_collection(ctx, false, collection);
            }
            if let Some(line_style) = line_set.line_style {
                self.visit_id(ctx, line_style);
            }
        }

        if linked_state == LinkedState::Directly {
            self.build_scene_audio(block);
            self.build_scene_sequencer(ctx, block, scene);
        }
        self.add_operation_node(block, NodeType::LayerCollections, OperationCode::ViewLayerEval);
        self.build_scene_compositor(ctx, block, scene);
        self.build_scene_parameters(ctx, scene_uuid);

        if let Some(set_scene) = scene.set_scene {
            let already_linked = self
                .graph
                .find_id_node(set_scene)
                .is_some_and(|node| node.linked_state >= LinkedState::ViaSet);
            let has_layer = self
                .database
                .scene(set_scene)
                .is_some_and(|set| set.default_render_layer().is_some());
            if !already_linked && has_layer {
                self.build_scene_view_layer(set_scene, 0, LinkedState::ViaSet);
            }
        }
    }

    /// Whether a base needs evaluation in the current mode.
    ///
    /// Disabled bases are still pulled in when their visibility is animated,
    /// since the graph cannot change topology during playback.
    fn need_pull_base_into_graph(&self, base: &Base) -> bool {
        let (enabled, property) = match self.config.eval_mode {
            EvalMode::Viewport => (base.enabled_viewport, "hide_viewport"),
            EvalMode::Render => (base.enabled_render, "hide_render"),
        };
        enabled || self.database.is_property_animated(base.object, property)
    }

    fn build_layer_collections(
        &mut self,
        ctx: BuildContext,
        layer_collections: &[LayerCollection],
    ) {
        for layer_collection in layer_collections {
            if layer_collection.exclude {
                continue;
            }
            let is_hidden = self
                .database
                .get(layer_collection.collection)
                .is_some_and(|block| match &block.body {
                    IdBody::Collection(collection) => self.collection_is_hidden(collection),
                    _ => false,
                });
            if !is_hidden {
                self.build_collection(ctx, true, layer_collection.collection);
            }
            self.build_layer_collections(ctx, &layer_collection.children);
        }
    }

    fn collection_is_hidden(&self, collection: &Collection) -> bool {
        match self.config.eval_mode {
            EvalMode::Viewport => collection.hide_viewport,
            EvalMode::Render => collection.hide_render,
        }
    }

    /// Build a collection.
    ///
    /// Coming from a layer collection only the collection itself is added;
    /// the view layer walks the hierarchy and bases provide the objects.
    /// Otherwise objects and children are built with the collection's
    /// visibility. A collection first added from a layer, or first reached
    /// while invisible, is expanded again on a later request.
    pub(super) fn build_collection(
        &mut self,
        ctx: BuildContext,
        from_layer: bool,
        uuid: SessionUuid,
    ) {
        let Some(block) = self.datablock(uuid) else {
            return;
        };
        let IdBody::Collection(collection) = &block.body else {
            return;
        };
        let is_visible = !self.collection_is_hidden(collection) && ctx.is_parent_collection_visible;

        if self.built.check_is_built_and_tag(uuid, BuildTag::COMPLETE) {
            let Some(node) = self.graph.find_id_node_mut(uuid) else {
                return;
            };
            let became_visible =
                is_visible && !node.is_directly_visible && node.is_collection_fully_expanded;
            let needs_expansion = !from_layer && !node.is_collection_fully_expanded;
            if !became_visible && !needs_expansion {
                return;
            }
            node.is_directly_visible |= is_visible;
        } else {
            let id_node = self.add_id_node(block);
            self.graph.id_node_mut(id_node).is_directly_visible = is_visible;
            self.build_idproperties(ctx, block.properties.as_ref());
            self.add_operation_node(block, NodeType::Geometry, OperationCode::GeometryEvalDone);
        }
        if from_layer {
            return;
        }

        // Marked before recursing so a collection nested in itself stops.
        if let Some(node) = self.graph.find_id_node_mut(uuid) {
            node.is_collection_fully_expanded = true;
        }
        let inner = ctx.with_parent_visibility(is_visible);
        for object in &collection.objects {
            self.build_object(inner, None, *object, LinkedState::Indirectly, is_visible);
        }
        for child in &collection.children {
            self.build_collection(inner, false, *child);
        }
    }

    /// Scene parameters, reachable from strips and data-block references
    /// without building the whole scene.
    pub(super) fn build_scene_parameters(&mut self, ctx: BuildContext, uuid: SessionUuid) {
        let Some(block) = self.datablock(uuid) else {
            return;
        };
        let IdBody::Scene(scene) = &block.body else {
            return;
        };
        if self.built.check_is_built_and_tag(uuid, BuildTag::PARAMETERS) {
            return;
        }
        self.add_id_node(block);
        self.build_parameters(block);
        self.build_idproperties(ctx, block.properties.as_ref());
        self.add_operation_node(block, NodeType::Parameters, OperationCode::SceneEval);
        for camera in scene.markers.iter().filter_map(|marker| marker.camera) {
            self.build_object(ctx, None, camera, LinkedState::Indirectly, false);
        }
    }

    fn build_scene_compositor(&mut self, ctx: BuildContext, block: &Datablock, scene: &Scene) {
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::SCENE_COMPOSITOR) {
            return;
        }
        if let Some(tree) = scene.compositor {
            self.visit_id(ctx, tree);
        }
    }

    fn build_scene_audio(&mut self, block: &Datablock) {
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::SCENE_AUDIO) {
            return;
        }
        let entry = self.add_operation_node(block, NodeType::Audio, OperationCode::AudioEntry);
        self.set_entry(entry);
        self.add_operation_node(block, NodeType::Audio, OperationCode::SoundEval);
        self.add_operation_node(block, NodeType::Audio, OperationCode::AudioVolume);
    }

    fn build_scene_sequencer(&mut self, ctx: BuildContext, block: &Datablock, scene: &Scene) {
        let Some(sequencer) = &scene.sequencer else {
            return;
        };
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::SCENE_SEQUENCER) {
            return;
        }
        self.build_scene_audio(block);
        self.add_operation_node(block, NodeType::Sequencer, OperationCode::SequencesEval);

        for strip in &sequencer.strips {
            self.build_idproperties(ctx, strip.properties.as_ref());
            if let Some(sound) = strip.sound {
                self.visit_id(ctx, sound);
            }
            if let Some(strip_scene) = strip.scene {
                self.build_scene_parameters(ctx, strip_scene);
                // Speakers of the strip scene drive 3D audio.
                self.build_scene_speakers(ctx, strip_scene);
            }
        }
    }

    fn build_scene_speakers(&mut self, ctx: BuildContext, uuid: SessionUuid) {
        let Some(block) = self.datablock(uuid) else {
            return;
        };
        let IdBody::Scene(scene) = &block.body else {
            return;
        };
        if self.built.check_is_built_and_tag(uuid, BuildTag::SCENE_SPEAKERS) {
            return;
        }
        let Some(view_layer) = scene.view_layers.first() else {
            return;
        };
        for base in &view_layer.bases {
            let is_speaker = self
                .database
                .object(base.object)
                .and_then(|object| object.data)
                .and_then(|data| self.database.get(data))
                .is_some_and(|data| matches!(data.body, IdBody::Speaker(_)));
            if !is_speaker || !self.need_pull_base_into_graph(base) {
                continue;
            }
            // The base belongs to another scene, so it is not passed on.
            self.build_object(ctx, None, base.object, LinkedState::Indirectly, true);
        }
    }

    fn build_rigidbody(&mut self, ctx: BuildContext, block: &Datablock, scene: &Scene) {
        let Some(world) = &scene.rigid_body_world else {
            return;
        };
        self.add_operation_node(block, NodeType::Transform, OperationCode::RigidbodyRebuild);
        let sim = self.add_operation_node(block, NodeType::Transform, OperationCode::RigidbodySim);
        self.set_entry(sim);
        self.set_exit(sim);

        let database = self.database;
        if let Some(collection) = world.collection {
            self.build_collection(ctx, false, collection);
            for uuid in database.collection_objects_recursive(collection) {
                let Some(object_block) = database.get(uuid) else {
                    continue;
                };
                let IdBody::Object(object) = &object_block.body else {
                    continue;
                };
                let is_mesh = object
                    .data
                    .and_then(|data| database.get(data))
                    .is_some_and(|data| {
                        matches!(
                            &data.body,
                            IdBody::Geometry(geometry) if geometry.kind == GeometryKind::Mesh
                        )
                    });
                if !is_mesh || !object.rigid_body {
                    continue;
                }
                self.add_operation_node(
                    object_block,
                    NodeType::Transform,
                    OperationCode::RigidbodyTransformCopy,
                );
            }
        }

        if let Some(constraints) = world.constraints {
            for uuid in database.collection_objects_recursive(constraints) {
                let Some(constraint) = database
                    .object(uuid)
                    .and_then(|object| object.rigid_body_constraint.as_ref())
                else {
                    continue;
                };
                let (Some(object1), Some(object2)) = (constraint.object1, constraint.object2) else {
                    continue;
                };
                self.build_object(ctx, None, uuid, LinkedState::Indirectly, false);
                self.build_object(ctx, None, object1, LinkedState::Indirectly, false);
                self.build_object(ctx, None, object2, LinkedState::Indirectly, false);
            }
        }
    }
}
