//! Scene Data
//!
//! This module holds the data-blocks the dependency graph is built from.
//!
//! # Overview
//!
//! A scene is a web of data-blocks referencing each other: objects point to
//! their mesh, meshes to materials, materials to node trees, collections to
//! objects, and so on. The graph builder walks this web starting from a view
//! layer (or an explicit list of data-blocks) and creates evaluation nodes for
//! everything it reaches.
//!
//! The model here is deliberately narrow. It only records references and the
//! flags that influence graph topology; the actual geometry, shading and
//! animation values live with the evaluation code that consumes the graph.

mod database;
mod foreach;
mod id;
mod types;

pub use database::Database;
pub use foreach::{IdLink, IdLinks, IdWalk};
pub use id::{Datablock, GenericKind, IdBody, IdType, SessionUuid};
pub use types::*;
