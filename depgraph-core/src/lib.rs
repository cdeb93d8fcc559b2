//! Depgraph Core
//!
//! This crate builds the nodes of a scene evaluation dependency graph.
//! It implements:
//!
//! - An in-memory scene database of typed data-blocks
//! - ID, component and operation nodes with keyed, idempotent creation
//! - A graph builder that walks view layers, collections and object data
//! - Carry-over of shadow copies and pending update tags across rebuilds
//!
//! Edges between operations and the evaluator that runs them are built
//! elsewhere; this crate stops at the node set.
//!
//! # Architecture
//!
//! - `scene`: data-blocks and the link iterator the builder traverses
//! - `graph`: node storage, keys and update tagging
//! - `builder`: the per-type graph builders and the build lifecycle
//! - `shadow`: shadow copies and their allocator
//! - `config`, `error`: builder settings and error types
//!
//! # Example
//!
//! ```rust
//! use depgraph_core::scene::{Base, Database, IdBody, Object, Scene, ViewLayer};
//! use depgraph_core::{BuilderConfig, DependencyGraph};
//!
//! let mut database = Database::new();
//! let cube = database.add("Cube", IdBody::Object(Object::default()));
//! let mut layer = ViewLayer::new("View Layer");
//! layer.bases.push(Base::new(cube));
//! let scene = database.add(
//!     "Scene",
//!     IdBody::Scene(Scene {
//!         view_layers: vec![layer],
//!         ..Default::default()
//!     }),
//! );
//!
//! let mut depsgraph = DependencyGraph::new(BuilderConfig::default());
//! depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
//! assert!(depsgraph.graph().find_id_node(cube).is_some());
//! ```

pub mod builder;
pub mod config;
pub mod dependency_graph;
pub mod error;
pub mod graph;
pub mod scene;
pub mod shadow;

pub use builder::{EvalHooks, GraphBuilder, NoopHooks};
pub use config::{BuilderConfig, EvalMode};
pub use dependency_graph::DependencyGraph;
pub use error::{BuildError, BuildState, ConfigError, GraphError};
pub use graph::{Graph, GraphStats, LinkedState, UpdateSource};
pub use shadow::{IdRecalc, ShadowCopy, ShadowCopyAllocator};
