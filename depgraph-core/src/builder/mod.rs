//! Graph Builder
//!
//! This module turns the data-blocks reachable from a view layer (or from an
//! explicit list of roots) into ID, component and operation nodes.
//!
//! # Lifecycle
//!
//! A [`GraphBuilder`] borrows a [`Graph`] for one rebuild and walks through
//! four states:
//!
//! 1. `NotBuilding`: created, nothing touched yet.
//! 2. `Began`: [`GraphBuilder::begin_build`] moved reusable state (shadow
//!    copies, masks, pending update tags) out of the old graph and cleared
//!    it.
//! 3. `Building`: one or more `build_*` entry points ran.
//! 4. `Ended`: [`GraphBuilder::end_build`] replayed the saved update tags and
//!    flushed shadow copies whose links went stale.
//!
//! # Traversal
//!
//! Every reference is followed through [`GraphBuilder::build_id`] style
//! dispatch: one exhaustive `match` over the data-block payload selects a
//! type-specific builder. Each builder checks the [`BuiltSet`] first, so a
//! data-block reached along many paths is processed once. Node creation is
//! idempotent, which makes repeated visits harmless even where the memo is
//! bypassed on purpose (object visibility merging, collection expansion).
//!
//! Missing data is never an error here: a dangling reference, an object
//! without data or a particle system without settings simply builds nothing.

mod anim;
mod built_set;
mod carry_over;
mod context;
mod data;
mod hooks;
mod object;
mod rig;
mod view_layer;

pub use built_set::{BuildTag, BuiltSet};
pub use context::BuildContext;
pub use hooks::{EvalHooks, NoopHooks};

use indexmap::IndexMap;
use tracing::{debug, info, trace};

use crate::config::BuilderConfig;
use crate::error::{BuildError, BuildState, Result};
use crate::graph::{
    ComponentIndex, ComponentKey, Graph, IdNodeIndex, LinkedState, NodeType, OperationCode,
    OperationIdKey, OperationIndex,
};
use crate::scene::{Database, Datablock, IdBody, IdProperties, SessionUuid};

use carry_over::{IdInfo, SavedEntryTag};

/// Builds the nodes of a dependency graph.
pub struct GraphBuilder<'a> {
    graph: &'a mut Graph,
    database: &'a Database,
    config: &'a BuilderConfig,
    hooks: &'a dyn EvalHooks,
    state: BuildState,
    built: BuiltSet,
    /// State carried over from the previous graph, keyed by uuid.
    id_info: IndexMap<SessionUuid, IdInfo>,
    saved_entry_tags: Vec<SavedEntryTag>,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder for `graph`, reading data-blocks from `database`.
    pub fn new(graph: &'a mut Graph, database: &'a Database, config: &'a BuilderConfig) -> Self {
        Self {
            graph,
            database,
            config,
            hooks: &NoopHooks,
            state: BuildState::NotBuilding,
            built: BuiltSet::new(),
            id_info: IndexMap::new(),
            saved_entry_tags: Vec::new(),
        }
    }

    /// Use `hooks` to bind evaluation callbacks to new operations.
    pub fn with_hooks(mut self, hooks: &'a dyn EvalHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    fn require_state(
        &self,
        operation: &'static str,
        expected: &'static str,
        allowed: &[BuildState],
    ) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(BuildError::InvalidState {
                operation,
                expected,
                actual: self.state,
            })
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Move reusable state out of the previous graph and clear it.
    pub fn begin_build(&mut self) -> Result<()> {
        self.require_state("begin_build", "NotBuilding", &[BuildState::NotBuilding])?;
        self.snapshot_previous_graph();
        debug!(
            carried = self.id_info.len(),
            saved_tags = self.saved_entry_tags.len(),
            "begin build"
        );
        self.state = BuildState::Began;
        Ok(())
    }

    /// Build the nodes of one view layer of `scene`.
    pub fn build_view_layer(
        &mut self,
        scene: SessionUuid,
        view_layer_index: usize,
        linked_state: LinkedState,
    ) -> Result<()> {
        self.require_state(
            "build_view_layer",
            "Began or Building",
            &[BuildState::Began, BuildState::Building],
        )?;
        let layer_count = self
            .database
            .scene(scene)
            .ok_or(BuildError::MissingRoot(scene))?
            .view_layers
            .len();
        if view_layer_index >= layer_count {
            return Err(BuildError::MissingViewLayer {
                scene,
                index: view_layer_index,
            });
        }
        self.state = BuildState::Building;
        self.build_scene_view_layer(scene, view_layer_index, linked_state);
        Ok(())
    }

    /// Build the nodes of one data-block and everything it references.
    pub fn build_id(&mut self, uuid: SessionUuid) -> Result<()> {
        self.require_state(
            "build_id",
            "Began or Building",
            &[BuildState::Began, BuildState::Building],
        )?;
        if !self.database.contains(uuid) {
            return Err(BuildError::MissingRoot(uuid));
        }
        self.state = BuildState::Building;
        // Explicitly requested objects are evaluated, so they count as
        // visible.
        if self.database.object(uuid).is_some() {
            self.build_object(BuildContext::root(), None, uuid, LinkedState::Indirectly, true);
        } else {
            self.visit_id(BuildContext::root(), uuid);
        }
        Ok(())
    }

    /// Replay saved update tags and flush stale shadow copies.
    pub fn end_build(&mut self) -> Result<()> {
        self.require_state(
            "end_build",
            "Began or Building",
            &[BuildState::Began, BuildState::Building],
        )?;
        let replayed = self.tag_previously_tagged_nodes();
        let stale = self.update_invalid_shadow_copies()?;
        self.update_visible_components();
        self.release_unused_shadow_copies();
        debug!(replayed, stale, "end build");

        if self.config.log_stats {
            let stats = self.graph.stats();
            info!(
                id_nodes = stats.id_nodes,
                components = stats.components,
                operations = stats.operations,
                shadow_copies = stats.shadow_copies,
                entry_tags = stats.entry_tags,
                "dependency graph built"
            );
        }
        self.state = BuildState::Ended;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Node creation
    // -----------------------------------------------------------------------

    fn datablock(&self, uuid: SessionUuid) -> Option<&'a Datablock> {
        let database: &'a Database = self.database;
        let block = database.get(uuid);
        if block.is_none() {
            trace!(%uuid, "skipping reference to missing data-block");
        }
        block
    }

    /// Find or create the ID node of `block`, consuming carried state on
    /// creation.
    fn add_id_node(&mut self, block: &Datablock) -> IdNodeIndex {
        if let Some(index) = self.graph.find_id_node_index(block.uuid) {
            return index;
        }
        let (shadow, previous) = match self.id_info.get_mut(&block.uuid) {
            Some(info) => (info.shadow.take(), Some(info.previous())),
            None => (None, None),
        };
        let index = self.graph.add_id_node(block, shadow);
        if let Some((visible_mask, eval_flags, customdata_mask)) = previous {
            let node = self.graph.id_node_mut(index);
            node.previously_visible_components_mask = visible_mask;
            node.previous_eval_flags = eval_flags;
            node.previous_customdata_mask = customdata_mask;
        }
        index
    }

    fn add_component_node(&mut self, block: &Datablock, key: ComponentKey) -> ComponentIndex {
        let id_node = self.add_id_node(block);
        self.graph.add_component(id_node, key)
    }

    /// Find or create an operation.
    fn add_operation_node(
        &mut self,
        block: &Datablock,
        component: impl Into<ComponentKey>,
        operation: impl Into<OperationIdKey>,
    ) -> OperationIndex {
        let component_key = component.into();
        let key = operation.into();
        let component = self.add_component_node(block, component_key.clone());
        if let Some(index) = self.graph.find_operation(component, &key) {
            return index;
        }
        self.create_operation_node(block, component, &component_key, key)
    }

    /// Create an operation whose key must be unused; panics otherwise.
    fn create_operation_node(
        &mut self,
        block: &Datablock,
        component: ComponentIndex,
        component_key: &ComponentKey,
        key: OperationIdKey,
    ) -> OperationIndex {
        let evaluate = self.hooks.operation_callback(block, component_key, &key);
        self.graph.add_operation(component, key, evaluate)
    }

    fn has_operation_node(
        &self,
        uuid: SessionUuid,
        component: &ComponentKey,
        key: &OperationIdKey,
    ) -> bool {
        self.graph
            .find_component(uuid, component.node_type, &component.name)
            .and_then(|index| self.graph.find_operation(index, key))
            .is_some()
    }

    fn set_entry(&mut self, operation: OperationIndex) {
        self.graph.set_as_entry(operation);
    }

    fn set_exit(&mut self, operation: OperationIndex) {
        self.graph.set_as_exit(operation);
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Build whatever `uuid` refers to.
    fn visit_id(&mut self, ctx: BuildContext, uuid: SessionUuid) {
        let Some(block) = self.datablock(uuid) else {
            return;
        };
        trace!(id = %block, "build");
        match &block.body {
            IdBody::Action(_) => self.build_action(block),
            IdBody::Armature(armature) => self.build_armature(ctx, block, armature),
            IdBody::Camera(camera) => self.build_camera(ctx, block, camera),
            IdBody::Collection(_) => self.build_collection(ctx, false, uuid),
            // Drivers or modifiers pointing at an object do not make it
            // visible; a visible user pulls it in with its own visibility.
            IdBody::Object(_) => self.build_object(ctx, None, uuid, LinkedState::Indirectly, false),
            IdBody::ShapeKey(key) => self.build_shapekeys(ctx, block, key),
            IdBody::Light(light) => self.build_light(ctx, block, light),
            IdBody::LightProbe => self.build_lightprobe(ctx, block),
            IdBody::NodeTree(tree) => self.build_nodetree(ctx, block, tree),
            IdBody::Material(material) => self.build_material(ctx, block, material),
            IdBody::Texture(texture) => self.build_texture(ctx, block, texture),
            IdBody::Image => self.build_image(ctx, block),
            IdBody::World(world) => self.build_world(ctx, block, world),
            IdBody::Mask(mask) => self.build_mask(ctx, block, mask),
            IdBody::LineStyle(line_style) => self.build_linestyle(ctx, block, line_style),
            IdBody::MovieClip => self.build_movieclip(ctx, block),
            IdBody::Geometry(geometry) => self.build_geometry_datablock(ctx, block, geometry),
            IdBody::Speaker(speaker) => self.build_speaker(ctx, block, speaker),
            IdBody::Sound => self.build_sound(ctx, block),
            // Scripts are not part of the dependency graph.
            IdBody::Text => {}
            IdBody::CacheFile => self.build_cachefile(ctx, block),
            IdBody::Scene(_) => self.build_scene_parameters(ctx, uuid),
            IdBody::Simulation(simulation) => self.build_simulation(ctx, block, simulation),
            IdBody::ParticleSettings(settings) => {
                self.build_particle_settings(ctx, block, settings)
            }
            IdBody::Font => self.build_vfont(ctx, block),
            IdBody::Generic(_) => self.build_generic_id(ctx, block),
        }
    }

    // -----------------------------------------------------------------------
    // Shared sub-builders
    // -----------------------------------------------------------------------

    /// Follow data-block references stored in custom properties.
    fn build_idproperties(&mut self, ctx: BuildContext, properties: Option<&IdProperties>) {
        let Some(properties) = properties else {
            return;
        };
        for uuid in &properties.id_refs {
            self.visit_id(ctx, *uuid);
        }
    }

    /// Parameters component: entry, generic evaluation and exit.
    fn build_parameters(&mut self, block: &Datablock) {
        let entry =
            self.add_operation_node(block, NodeType::Parameters, OperationCode::ParametersEntry);
        self.set_entry(entry);
        self.add_operation_node(block, NodeType::Parameters, OperationCode::ParametersEval);
        let exit =
            self.add_operation_node(block, NodeType::Parameters, OperationCode::ParametersExit);
        self.set_exit(exit);
    }

    /// Residual builder for types without evaluation of their own.
    fn build_generic_id(&mut self, ctx: BuildContext, block: &Datablock) {
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::COMPLETE) {
            return;
        }
        self.add_id_node(block);
        self.build_idproperties(ctx, block.properties.as_ref());
        self.build_animdata(ctx, block);
        self.build_parameters(block);
    }
}

impl Drop for GraphBuilder<'_> {
    fn drop(&mut self) {
        self.release_unused_shadow_copies();
    }
}
