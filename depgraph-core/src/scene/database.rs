//! Scene Database
//!
//! In-memory store of data-blocks keyed by session uuid. The graph builder
//! only reads from it; edits happen between builds.

use indexmap::{IndexMap, IndexSet};

use super::id::{Datablock, IdBody, IdType, SessionUuid};
use super::types::{Object, Scene};

/// All data-blocks known to the application.
///
/// Insertion order is preserved so that whole-database passes (cache files,
/// masks, movie clips) visit data-blocks deterministically.
#[derive(Debug, Clone, Default)]
pub struct Database {
    blocks: IndexMap<SessionUuid, Datablock>,
}

impl Database {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data-block, returning its uuid.
    pub fn insert(&mut self, block: Datablock) -> SessionUuid {
        let uuid = block.uuid;
        self.blocks.insert(uuid, block);
        uuid
    }

    /// Create and add a data-block in one step.
    pub fn add(&mut self, name: impl Into<String>, body: IdBody) -> SessionUuid {
        self.insert(Datablock::new(name, body))
    }

    /// Remove a data-block. References to it from other data-blocks are left
    /// dangling; the builder treats them as missing data.
    pub fn remove(&mut self, uuid: SessionUuid) -> Option<Datablock> {
        self.blocks.shift_remove(&uuid)
    }

    pub fn get(&self, uuid: SessionUuid) -> Option<&Datablock> {
        self.blocks.get(&uuid)
    }

    pub fn get_mut(&mut self, uuid: SessionUuid) -> Option<&mut Datablock> {
        self.blocks.get_mut(&uuid)
    }

    pub fn contains(&self, uuid: SessionUuid) -> bool {
        self.blocks.contains_key(&uuid)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over all data-blocks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Datablock> {
        self.blocks.values()
    }

    /// Iterate over data-blocks of one type.
    pub fn iter_type(&self, id_type: IdType) -> impl Iterator<Item = &Datablock> {
        self.blocks
            .values()
            .filter(move |block| block.id_type() == id_type)
    }

    /// Look up an object payload.
    pub fn object(&self, uuid: SessionUuid) -> Option<&Object> {
        match &self.get(uuid)?.body {
            IdBody::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Look up a scene payload.
    pub fn scene(&self, uuid: SessionUuid) -> Option<&Scene> {
        match &self.get(uuid)?.body {
            IdBody::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    /// Mutable access to an object payload, for edits between builds.
    pub fn object_mut(&mut self, uuid: SessionUuid) -> Option<&mut Object> {
        match &mut self.get_mut(uuid)?.body {
            IdBody::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Mutable access to a scene payload, for edits between builds.
    pub fn scene_mut(&mut self, uuid: SessionUuid) -> Option<&mut Scene> {
        match &mut self.get_mut(uuid)?.body {
            IdBody::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    /// Whether the property at `rna_path` of `uuid` is animated, either by a
    /// curve of the active action or by a driver.
    pub fn is_property_animated(&self, uuid: SessionUuid, rna_path: &str) -> bool {
        let Some(anim) = self.get(uuid).and_then(|block| block.anim.as_ref()) else {
            return false;
        };
        if anim.drivers.iter().any(|driver| driver.rna_path == rna_path) {
            return true;
        }
        let Some(action) = anim.action.and_then(|action| self.get(action)) else {
            return false;
        };
        match &action.body {
            IdBody::Action(action) => action
                .fcurves
                .iter()
                .any(|fcurve| fcurve.rna_path == rna_path),
            _ => false,
        }
    }

    /// Collect all objects of a collection and its children, depth first.
    ///
    /// Each object is reported once even when reachable through several
    /// child collections.
    pub fn collection_objects_recursive(&self, collection: SessionUuid) -> Vec<SessionUuid> {
        let mut objects = IndexSet::new();
        let mut visited = IndexSet::new();
        self.collect_collection_objects(collection, &mut objects, &mut visited);
        objects.into_iter().collect()
    }

    fn collect_collection_objects(
        &self,
        collection: SessionUuid,
        objects: &mut IndexSet<SessionUuid>,
        visited: &mut IndexSet<SessionUuid>,
    ) {
        if !visited.insert(collection) {
            return;
        }
        let Some(IdBody::Collection(data)) = self.get(collection).map(|block| &block.body) else {
            return;
        };
        objects.extend(data.objects.iter().copied());
        for child in &data.children {
            self.collect_collection_objects(*child, objects, visited);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::types::*;

    #[test]
    fn insert_and_remove() {
        let mut db = Database::new();
        let image = db.add("Grid", IdBody::Image);
        assert!(db.contains(image));
        assert_eq!(db.len(), 1);

        let removed = db.remove(image).unwrap();
        assert_eq!(removed.uuid, image);
        assert!(db.is_empty());
    }

    #[test]
    fn animated_property_through_action_and_driver() {
        let mut db = Database::new();
        let action = db.add(
            "Blink",
            IdBody::Action(Action {
                fcurves: vec![FCurve::new("hide_viewport", 0)],
            }),
        );
        let animated = db.insert(
            Datablock::new("Animated", IdBody::Object(Object::default())).with_anim(AnimData {
                action: Some(action),
                ..Default::default()
            }),
        );
        let driven = db.insert(
            Datablock::new("Driven", IdBody::Object(Object::default())).with_anim(AnimData {
                drivers: vec![Driver::new("hide_render", 0)],
                ..Default::default()
            }),
        );

        assert!(db.is_property_animated(animated, "hide_viewport"));
        assert!(!db.is_property_animated(animated, "hide_render"));
        assert!(db.is_property_animated(driven, "hide_render"));
    }

    #[test]
    fn recursive_collection_objects_are_unique() {
        let mut db = Database::new();
        let a = db.add("A", IdBody::Object(Object::default()));
        let b = db.add("B", IdBody::Object(Object::default()));
        let child = db.add("Child", IdBody::Collection(Collection::with_objects(vec![a, b])));
        let root = db.add(
            "Root",
            IdBody::Collection(Collection {
                objects: vec![a],
                children: vec![child],
                ..Default::default()
            }),
        );

        assert_eq!(db.collection_objects_recursive(root), vec![a, b]);
    }

    #[test]
    fn recursive_collection_objects_survive_cycles() {
        let mut db = Database::new();
        let a = db.add("A", IdBody::Object(Object::default()));
        let b = db.add("B", IdBody::Object(Object::default()));
        let inner = db.add("Inner", IdBody::Collection(Collection::with_objects(vec![b, a])));
        let outer = db.add(
            "Outer",
            IdBody::Collection(Collection {
                objects: vec![a],
                children: vec![inner],
                ..Default::default()
            }),
        );
        if let Some(IdBody::Collection(data)) = db.get_mut(inner).map(|block| &mut block.body) {
            data.children.push(outer);
        }

        assert_eq!(db.collection_objects_recursive(outer), vec![a, b]);
        assert_eq!(db.collection_objects_recursive(inner), vec![b, a]);
    }
}
