//! Integration Tests for the Graph Builder
//!
//! These tests drive complete build cycles through `DependencyGraph` and
//! check the node set, visibility state and what survives a rebuild.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use depgraph_core::graph::{
    ComponentKey, EvalCallback, EvalContext, NodeType, OperationCode, OperationIdKey,
};
use depgraph_core::scene::*;
use depgraph_core::{
    BuildError, BuildState, BuilderConfig, DependencyGraph, EvalHooks, Graph, GraphBuilder,
    IdRecalc, LinkedState,
};

/// A scene with one view layer holding a base for each object.
fn add_scene(database: &mut Database, objects: &[SessionUuid]) -> SessionUuid {
    let mut layer = ViewLayer::new("View Layer");
    layer.bases = objects.iter().map(|object| Base::new(*object)).collect();
    database.add(
        "Scene",
        IdBody::Scene(Scene {
            view_layers: vec![layer],
            ..Default::default()
        }),
    )
}

/// Whether `opcode` on the given component of `uuid` is tagged for update.
fn is_tagged(graph: &Graph, uuid: SessionUuid, node_type: NodeType, opcode: OperationCode) -> bool {
    graph
        .find_component(uuid, node_type, "")
        .and_then(|component| graph.component(component).find_operation(opcode, "", -1))
        .is_some_and(|op| graph.is_entry_tagged(op))
}

/// Test that every data-block reachable from a view layer gets one ID node.
#[test]
fn view_layer_reaches_object_data() {
    let mut database = Database::new();
    let material = database.add("Steel", IdBody::Material(Material::default()));
    let mesh = database.add(
        "CubeMesh",
        IdBody::Geometry(Geometry::new(GeometryKind::Mesh).with_materials(vec![material])),
    );
    let cube = database.add("Cube", IdBody::Object(Object::with_data(mesh)));
    let orphan = database.add("Unused", IdBody::Material(Material::default()));
    let scene = add_scene(&mut database, &[cube]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    let graph = depsgraph.graph();

    for uuid in [scene, cube, mesh, material] {
        assert!(graph.find_id_node(uuid).is_some());
    }
    assert!(graph.find_id_node(orphan).is_none());
    assert!(graph.time_source().is_some());

    let node = graph.find_id_node(cube).unwrap();
    assert_eq!(node.linked_state, LinkedState::Directly);
    assert!(node.has_base);
    assert!(node.is_directly_visible);
    assert_ne!(node.visible_components_mask, 0);
}

/// Test that reaching an object many times never duplicates nodes.
#[test]
fn repeated_references_share_nodes() {
    let mut database = Database::new();
    let mesh = database.add("Mesh", IdBody::Geometry(Geometry::new(GeometryKind::Mesh)));
    let target = database.add("Target", IdBody::Object(Object::default()));
    let mut owner = Object::with_data(mesh);
    owner.parent = Some(target);
    owner.constraints = vec![Constraint::new("Track", ConstraintKind::Other, vec![target])];
    owner.modifiers = vec![Modifier::new("Hook", ModifierKind::Hook, vec![target])];
    let owner = database.add("Owner", IdBody::Object(owner));
    let other = database.add("Other", IdBody::Object(Object::with_data(mesh)));
    let scene = add_scene(&mut database, &[owner, other, target]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    let first = depsgraph.stats();
    assert_eq!(first.id_nodes, 5);

    // A second build from scratch produces the same node set.
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    assert_eq!(depsgraph.stats(), first);

    let graph = depsgraph.graph();
    let transform = graph.find_component(target, NodeType::Transform, "").unwrap();
    let ops: Vec<_> = graph
        .component(transform)
        .operations()
        .map(|op| graph.operation(op).opcode())
        .collect();
    let mut unique = ops.clone();
    unique.dedup();
    assert_eq!(ops, unique);
}

/// Test that visibility and linked state only ever grow while building.
#[test]
fn visibility_and_linked_state_are_merged_upwards() {
    let mut database = Database::new();
    let driven = database.add("Driven", IdBody::Object(Object::default()));
    let driver = database.insert(
        Datablock::new("Driver", IdBody::Object(Object::default())).with_anim(AnimData {
            drivers: vec![Driver::new("location", 0).with_variable("x", vec![driven])],
            ..Default::default()
        }),
    );
    // The driver's base comes first, so `driven` is first reached as an
    // invisible driver variable.
    let scene = add_scene(&mut database, &[driver, driven]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();

    let node = depsgraph.graph().find_id_node(driven).unwrap();
    assert_eq!(node.linked_state, LinkedState::Directly);
    assert!(node.is_directly_visible);
    assert!(node.has_base);
}

/// Test that a later, weaker reference never downgrades an object that a
/// base already reached.
#[test]
fn later_indirect_reference_keeps_base_state() {
    let mut database = Database::new();
    let driven = database.add("Driven", IdBody::Object(Object::default()));
    let driver = database.insert(
        Datablock::new("Driver", IdBody::Object(Object::default())).with_anim(AnimData {
            drivers: vec![Driver::new("location", 0).with_variable("x", vec![driven])],
            ..Default::default()
        }),
    );
    let scene = add_scene(&mut database, &[driven, driver]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();

    let node = depsgraph.graph().find_id_node(driven).unwrap();
    assert_eq!(node.linked_state, LinkedState::Directly);
    assert!(node.is_directly_visible);
    assert!(node.has_base);
}

/// Test that an object first reached without a base gets its base flags
/// once its own base is built.
#[test]
fn base_flags_are_added_on_later_base_visit() {
    let mut database = Database::new();
    let parent = database.add("Parent", IdBody::Object(Object::default()));
    let child = database.add(
        "Child",
        IdBody::Object(Object {
            parent: Some(parent),
            ..Default::default()
        }),
    );
    let scene = add_scene(&mut database, &[child, parent]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    let graph = depsgraph.graph();

    for uuid in [child, parent] {
        let from_layer = graph.find_component(uuid, NodeType::ObjectFromLayer, "").unwrap();
        let from_layer = graph.component(from_layer);
        assert!(from_layer.find_operation(OperationCode::ObjectBaseFlags, "", -1).is_some());
    }
    assert_eq!(graph.find_id_node(parent).unwrap().linked_state, LinkedState::Directly);
}

/// Test that an object only reached through a driver stays invisible.
#[test]
fn driver_targets_are_not_visible() {
    let mut database = Database::new();
    let driven = database.add("Driven", IdBody::Object(Object::default()));
    let driver = database.insert(
        Datablock::new("Driver", IdBody::Object(Object::default())).with_anim(AnimData {
            drivers: vec![Driver::new("location", 0).with_variable("x", vec![driven])],
            ..Default::default()
        }),
    );
    let scene = add_scene(&mut database, &[driver]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();

    let node = depsgraph.graph().find_id_node(driven).unwrap();
    assert_eq!(node.linked_state, LinkedState::Indirectly);
    assert!(!node.is_directly_visible);
    assert!(!node.has_base);
    assert_eq!(node.visible_components_mask, 0);
}

/// Test that objects of a background set scene are linked via the set.
#[test]
fn set_scene_objects_are_linked_via_set() {
    let mut database = Database::new();
    let backdrop = database.add("Backdrop", IdBody::Object(Object::default()));
    let set = add_scene(&mut database, &[backdrop]);
    let actor = database.add("Actor", IdBody::Object(Object::default()));
    let scene = add_scene(&mut database, &[actor]);
    database.scene_mut(scene).unwrap().set_scene = Some(set);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    let graph = depsgraph.graph();

    assert_eq!(graph.find_id_node(actor).unwrap().linked_state, LinkedState::Directly);
    assert_eq!(graph.find_id_node(backdrop).unwrap().linked_state, LinkedState::ViaSet);
    assert_eq!(graph.find_id_node(set).unwrap().linked_state, LinkedState::ViaSet);
}

/// Test that expanded shadow copies survive a rebuild when the data-block
/// is still in use, and are released when it is not.
#[test]
fn rebuild_reuses_shadow_copies_of_surviving_ids() {
    let mut database = Database::new();
    let material = database.add("Steel", IdBody::Material(Material::default()));
    let mesh = database.add(
        "Mesh",
        IdBody::Geometry(Geometry::new(GeometryKind::Mesh).with_materials(vec![material])),
    );
    let a = database.add("A", IdBody::Object(Object::with_data(mesh)));
    let collection =
        database.add("Instanced", IdBody::Collection(Collection::with_objects(vec![a])));
    let b = database.add(
        "B",
        IdBody::Object(Object {
            instance_collection: Some(collection),
            ..Default::default()
        }),
    );
    let scene = add_scene(&mut database, &[a, b]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    depsgraph.expand_shadow_copies(&database, 1.0);

    let graph = depsgraph.graph();
    let a_copy = graph.shadow_copy_id(a).unwrap();
    let mesh_copy = graph.shadow_copy_id(mesh).unwrap();
    let material_copy = graph.shadow_copy_id(material).unwrap();
    assert!(graph.find_id_node(collection).is_some());
    let released_before = graph.allocator_stats().released;

    database.remove(b);
    database.scene_mut(scene).unwrap().view_layers[0]
        .bases
        .retain(|base| base.object != b);
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    let graph = depsgraph.graph();

    assert_eq!(graph.shadow_copy_id(a), Some(a_copy));
    assert_eq!(graph.shadow_copy_id(mesh), Some(mesh_copy));
    assert_eq!(graph.shadow_copy_id(material), Some(material_copy));
    assert!(graph.find_id_node(b).is_none());
    assert!(graph.find_id_node(collection).is_none());
    // B and the collection it instanced.
    assert_eq!(graph.allocator_stats().released, released_before + 2);

    let node = graph.find_id_node(a).unwrap();
    assert!(node.is_shadow_reused());
    assert!(node.is_directly_visible);
    assert!(!is_tagged(graph, a, NodeType::CopyOnWrite, OperationCode::CopyOnWrite));

    // The scene copy still links to B, which is gone.
    assert!(is_tagged(graph, scene, NodeType::CopyOnWrite, OperationCode::CopyOnWrite));
}

/// Test that unexpanded shadow copies are never carried into a rebuild.
#[test]
fn unexpanded_copies_are_reallocated() {
    let mut database = Database::new();
    let material = database.add("Steel", IdBody::Material(Material::default()));

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_ids(&database, &[material]).unwrap();
    let first = depsgraph.graph().shadow_copy_id(material).unwrap();

    depsgraph.build_from_ids(&database, &[material]).unwrap();
    let graph = depsgraph.graph();
    assert_ne!(graph.shadow_copy_id(material), Some(first));
    assert!(!graph.find_id_node(material).unwrap().is_shadow_reused());
    assert_eq!(graph.allocator_stats().live(), 1);
}

/// Test that a reused copy linking to an original which now has its own
/// copy is flushed.
#[test]
fn link_to_newly_copied_original_is_stale() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));
    let scene = add_scene(&mut database, &[cube]);

    // Building the scene alone does not reach its bases.
    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_ids(&database, &[scene]).unwrap();
    assert!(depsgraph.graph().find_id_node(cube).is_none());
    depsgraph.expand_shadow_copies(&database, 1.0);

    depsgraph.build_from_ids(&database, &[scene, cube]).unwrap();
    let graph = depsgraph.graph();
    let node = graph.find_id_node(scene).unwrap();
    assert!(node.is_shadow_reused());
    assert!(node.shadow().unwrap().recalc().contains(IdRecalc::COPY_ON_WRITE));
    assert!(is_tagged(graph, scene, NodeType::CopyOnWrite, OperationCode::CopyOnWrite));
}

/// Test that a reused copy linking to a copy that was released is flushed.
#[test]
fn link_to_released_copy_is_stale() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));
    let scene = add_scene(&mut database, &[cube]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_ids(&database, &[scene, cube]).unwrap();
    depsgraph.expand_shadow_copies(&database, 1.0);

    depsgraph.build_from_ids(&database, &[scene]).unwrap();
    let graph = depsgraph.graph();
    assert!(graph.find_id_node(cube).is_none());
    assert!(is_tagged(graph, scene, NodeType::CopyOnWrite, OperationCode::CopyOnWrite));
}

/// Test that copies whose links still match the graph are left alone.
#[test]
fn matching_links_are_not_flushed() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));
    let scene = add_scene(&mut database, &[cube]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_ids(&database, &[scene, cube]).unwrap();
    depsgraph.expand_shadow_copies(&database, 1.0);

    depsgraph.build_from_ids(&database, &[scene, cube]).unwrap();
    let graph = depsgraph.graph();
    assert!(graph.find_id_node(scene).unwrap().is_shadow_reused());
    assert!(graph.find_id_node(cube).unwrap().is_shadow_reused());
    assert!(!is_tagged(graph, scene, NodeType::CopyOnWrite, OperationCode::CopyOnWrite));
    assert_eq!(graph.stats().entry_tags, 0);
}

/// Test that pending update tags are replayed onto the rebuilt graph.
#[test]
fn pending_tags_survive_rebuild() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_ids(&database, &[cube]).unwrap();
    depsgraph.tag_id_update(cube, IdRecalc::TRANSFORM).unwrap();
    let tagged = depsgraph.stats().entry_tags;
    assert!(tagged > 0);

    depsgraph.build_from_ids(&database, &[cube]).unwrap();
    let graph = depsgraph.graph();
    assert_eq!(graph.stats().entry_tags, tagged);

    let transform = graph.find_component(cube, NodeType::Transform, "").unwrap();
    for op in graph.component(transform).operations() {
        assert!(graph.is_entry_tagged(op));
        assert!(graph.operation(op).user_modified());
    }
}

/// Test that tags on data-blocks which are no longer built are dropped.
#[test]
fn orphaned_tags_are_dropped() {
    let mut database = Database::new();
    let kept = database.add("Kept", IdBody::Object(Object::default()));
    let dropped = database.add("Dropped", IdBody::Object(Object::default()));

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_ids(&database, &[kept, dropped]).unwrap();
    depsgraph.tag_id_update(dropped, IdRecalc::TRANSFORM).unwrap();

    depsgraph.build_from_ids(&database, &[kept]).unwrap();
    assert_eq!(depsgraph.stats().entry_tags, 0);
    assert!(depsgraph.tag_id_update(dropped, IdRecalc::TRANSFORM).is_err());
}

/// Test that clearing updates forgets every tag.
#[test]
fn clear_updates_resets_tags() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_ids(&database, &[cube]).unwrap();
    depsgraph
        .tag_id_update(cube, IdRecalc::TRANSFORM | IdRecalc::PARAMETERS)
        .unwrap();
    depsgraph.graph_mut().clear_updates();

    let graph = depsgraph.graph();
    assert_eq!(graph.stats().entry_tags, 0);
    assert!(graph.operations().iter().all(|op| !op.needs_update()));
}

/// Test that a frame change tags animation but not other evaluation.
#[test]
fn time_update_tags_animated_objects() {
    let mut database = Database::new();
    let action = database.add("Walk", IdBody::Action(Action::default()));
    let walker = database.insert(
        Datablock::new("Walker", IdBody::Object(Object::default())).with_anim(AnimData {
            action: Some(action),
            ..Default::default()
        }),
    );
    let statue = database.add("Statue", IdBody::Object(Object::default()));
    let scene = add_scene(&mut database, &[walker, statue]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    depsgraph.graph_mut().clear_updates();
    depsgraph.tag_time_update();

    let graph = depsgraph.graph();
    assert!(graph.time_source().unwrap().needs_update());
    assert!(is_tagged(graph, walker, NodeType::Animation, OperationCode::AnimationEval));
    assert!(!is_tagged(graph, statue, NodeType::Transform, OperationCode::TransformLocal));
    assert!(graph.operations().iter().all(|op| !op.user_modified()));
}

/// Test that builder entry points reject calls out of order.
#[test]
fn builder_lifecycle_is_enforced() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));
    let config = BuilderConfig::default();
    let mut graph = Graph::new();

    let mut builder = GraphBuilder::new(&mut graph, &database, &config);
    assert!(matches!(
        builder.end_build(),
        Err(BuildError::InvalidState {
            operation: "end_build",
            actual: BuildState::NotBuilding,
            ..
        })
    ));
    assert!(builder.build_id(cube).is_err());

    builder.begin_build().unwrap();
    assert!(matches!(
        builder.begin_build(),
        Err(BuildError::InvalidState {
            actual: BuildState::Began,
            ..
        })
    ));
    builder.build_id(cube).unwrap();
    assert_eq!(builder.state(), BuildState::Building);
    builder.end_build().unwrap();
    assert_eq!(builder.state(), BuildState::Ended);
    assert!(builder.build_id(cube).is_err());
}

/// Test that drivers of one property array get one operation per element.
#[test]
fn drivers_are_keyed_by_path_and_index() {
    let mut database = Database::new();
    let light = database.insert(
        Datablock::new("Sun", IdBody::Light(Light::default())).with_anim(AnimData {
            drivers: vec![
                Driver::new("energy", 0),
                Driver::new("color", 0),
                Driver::new("color", 1),
                Driver::new("color", 1),
            ],
            ..Default::default()
        }),
    );

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_ids(&database, &[light]).unwrap();
    let graph = depsgraph.graph();

    let parameters = graph.find_component(light, NodeType::Parameters, "").unwrap();
    let parameters = graph.component(parameters);
    let drivers = parameters
        .operations()
        .filter(|op| graph.operation(*op).opcode() == OperationCode::Driver)
        .count();
    assert_eq!(drivers, 3);
    assert!(parameters
        .find_operation_by_key(&OperationIdKey::new(OperationCode::Driver, "color", 1))
        .is_some());
}

/// Test that an armature object gets a bone component per pose channel.
#[test]
fn armature_object_builds_pose() {
    let mut database = Database::new();
    let armature = database.add("Skeleton", IdBody::Armature(Armature::default()));
    let shape = database.add("Widget", IdBody::Object(Object::default()));
    let mut hand = PoseChannel::new("Hand").with_parent("Arm");
    hand.custom_shape = Some(shape);
    let rig = database.add(
        "Rig",
        IdBody::Object(Object {
            data: Some(armature),
            pose: Some(Pose {
                channels: vec![PoseChannel::new("Arm"), hand],
            }),
            ..Default::default()
        }),
    );
    let scene = add_scene(&mut database, &[rig]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    let graph = depsgraph.graph();

    let node = graph.find_id_node(rig).unwrap();
    assert_eq!(node.components_of_type(NodeType::Bone).count(), 2);
    let pose = graph.find_component(rig, NodeType::EvalPose, "").unwrap();
    let entry = graph.component(pose).entry_operation().unwrap();
    assert_eq!(graph.operation(entry).opcode(), OperationCode::PoseInit);
    assert!(!graph.find_id_node(shape).unwrap().is_directly_visible);
}

/// Test that a render configuration skips viewport-only work.
#[test]
fn render_config_changes_node_set() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));
    let hidden = database.add("ViewportOnly", IdBody::Object(Object::default()));
    let scene = add_scene(&mut database, &[cube, hidden]);
    database.scene_mut(scene).unwrap().view_layers[0].bases[1].enabled_render = false;

    let config =
        BuilderConfig::from_json(r#"{ "eval_mode": "render", "is_active": false }"#).unwrap();
    assert_eq!(config, BuilderConfig::render());

    let mut depsgraph = DependencyGraph::new(config);
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    let graph = depsgraph.graph();
    assert!(graph.find_id_node(cube).is_some());
    assert!(graph.find_id_node(hidden).is_none());
    assert!(graph.find_component(cube, NodeType::Synchronization, "").is_none());

    let mut viewport = DependencyGraph::default();
    viewport.build_from_view_layer(&database, scene, 0).unwrap();
    assert!(viewport.graph().find_id_node(hidden).is_some());
    assert!(viewport
        .graph()
        .find_component(cube, NodeType::Synchronization, "")
        .is_some());
}

struct TransformHooks {
    asked: AtomicUsize,
}

impl EvalHooks for TransformHooks {
    fn operation_callback(
        &self,
        _: &Datablock,
        component: &ComponentKey,
        _: &OperationIdKey,
    ) -> Option<EvalCallback> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        if component.node_type != NodeType::Transform {
            return None;
        }
        let callback: EvalCallback = Arc::new(|_: &EvalContext<'_>| {});
        Some(callback)
    }
}

/// Test that hooks are consulted for every operation the builder creates.
#[test]
fn hooks_bind_callbacks() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));
    let hooks = Arc::new(TransformHooks {
        asked: AtomicUsize::new(0),
    });

    let mut depsgraph = DependencyGraph::default().with_hooks(hooks.clone());
    depsgraph.build_from_ids(&database, &[cube]).unwrap();
    let graph = depsgraph.graph();

    let asked = hooks.asked.load(Ordering::SeqCst);
    assert!(asked > 0 && asked < graph.stats().operations);

    let transform = graph.find_component(cube, NodeType::Transform, "").unwrap();
    assert!(graph
        .component(transform)
        .operations()
        .all(|op| graph.operation(op).has_callback()));
    let parameters = graph.find_component(cube, NodeType::Parameters, "").unwrap();
    assert!(graph
        .component(parameters)
        .operations()
        .all(|op| !graph.operation(op).has_callback()));
}

/// Test that the JSON dump reflects the graph.
#[test]
fn json_dump_matches_stats() {
    let mut database = Database::new();
    let cube = database.add("Cube", IdBody::Object(Object::default()));
    let scene = add_scene(&mut database, &[cube]);

    let mut depsgraph = DependencyGraph::default();
    depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
    let json = depsgraph.graph().to_json().unwrap();
    let dump: serde_json::Value = serde_json::from_str(&json).unwrap();

    let stats = depsgraph.stats();
    assert_eq!(dump["stats"]["id_nodes"], stats.id_nodes);
    assert_eq!(dump["stats"]["operations"], stats.operations);
    assert_eq!(dump["has_time_source"], true);
    assert!(dump["id_nodes"]
        .as_array()
        .unwrap()
        .iter()
        .any(|node| node["name"] == "Cube"));
}
