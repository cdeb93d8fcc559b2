//! Dependency Graph Handle
//!
//! [`DependencyGraph`] bundles a [`Graph`] with the configuration and hooks
//! it is built with, and runs complete build cycles against a database.

use std::sync::Arc;

use tracing::debug;

use crate::builder::{EvalHooks, GraphBuilder, NoopHooks};
use crate::config::BuilderConfig;
use crate::error::{BuildError, GraphError, Result};
use crate::graph::{Graph, GraphStats, LinkedState, UpdateSource};
use crate::scene::{Database, SessionUuid};
use crate::shadow::{IdRecalc, ShadowCopyAllocator};

/// A dependency graph together with its build settings.
pub struct DependencyGraph {
    graph: Graph,
    config: BuilderConfig,
    hooks: Arc<dyn EvalHooks>,
}

impl DependencyGraph {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            graph: Graph::new(),
            config,
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Create a graph whose shadow copies come from `allocator`.
    pub fn with_allocator(config: BuilderConfig, allocator: Box<dyn ShadowCopyAllocator>) -> Self {
        Self {
            graph: Graph::with_allocator(allocator),
            config,
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Bind evaluation callbacks through `hooks` on every later build.
    pub fn with_hooks(mut self, hooks: Arc<dyn EvalHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Rebuild the graph from one view layer of `scene`.
    ///
    /// The request is validated before the previous graph is torn down, so
    /// an error leaves the graph untouched.
    pub fn build_from_view_layer(
        &mut self,
        database: &Database,
        scene: SessionUuid,
        view_layer_index: usize,
    ) -> Result<()> {
        let layers = database
            .scene(scene)
            .ok_or(BuildError::MissingRoot(scene))?
            .view_layers
            .len();
        if view_layer_index >= layers {
            return Err(BuildError::MissingViewLayer {
                scene,
                index: view_layer_index,
            });
        }
        debug!(%scene, view_layer_index, "rebuild from view layer");

        let mut builder =
            GraphBuilder::new(&mut self.graph, database, &self.config).with_hooks(&*self.hooks);
        builder.begin_build()?;
        builder.build_view_layer(scene, view_layer_index, LinkedState::Directly)?;
        builder.end_build()
    }

    /// Rebuild the graph from an explicit list of data-blocks.
    pub fn build_from_ids(&mut self, database: &Database, ids: &[SessionUuid]) -> Result<()> {
        if let Some(missing) = ids.iter().find(|uuid| !database.contains(**uuid)) {
            return Err(BuildError::MissingRoot(*missing));
        }
        debug!(roots = ids.len(), "rebuild from data-blocks");

        let mut builder =
            GraphBuilder::new(&mut self.graph, database, &self.config).with_hooks(&*self.hooks);
        builder.begin_build()?;
        for uuid in ids {
            builder.build_id(*uuid)?;
        }
        builder.end_build()
    }

    /// Tag a data-block as edited by the user.
    pub fn tag_id_update(&mut self, uuid: SessionUuid, recalc: IdRecalc) -> Result<(), GraphError> {
        self.graph.tag_id_update(uuid, recalc, UpdateSource::UserEdit)
    }

    /// Tag everything that depends on scene time, as after a frame change.
    pub fn tag_time_update(&mut self) {
        self.graph.tag_time_update();
    }

    /// Refresh every shadow copy from its original.
    pub fn expand_shadow_copies(&self, database: &Database, frame: f64) {
        self.graph.run_copy_on_write(database, frame);
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::*;

    #[test]
    fn failed_validation_keeps_previous_graph() {
        let mut database = Database::new();
        let material = database.add("Steel", IdBody::Material(Material::default()));
        let mut depsgraph = DependencyGraph::default();
        depsgraph.build_from_ids(&database, &[material]).unwrap();
        let before = depsgraph.stats();

        let missing = SessionUuid::new();
        assert_eq!(
            depsgraph.build_from_ids(&database, &[material, missing]),
            Err(BuildError::MissingRoot(missing))
        );
        assert_eq!(
            depsgraph.build_from_view_layer(&database, material, 0),
            Err(BuildError::MissingRoot(material))
        );
        assert_eq!(depsgraph.stats(), before);
    }
}
