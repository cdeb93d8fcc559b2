//! Data-block Link Iteration
//!
//! Visits every outgoing data-block reference held by a data-block. This is
//! the single place that knows where references live inside each payload;
//! the graph builder uses it for generic recursion and for detecting stale
//! shadow copies after a rebuild.

use smallvec::SmallVec;

use super::id::{Datablock, IdBody, SessionUuid};
use super::types::*;

/// One outgoing reference of a data-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdLink {
    /// Referenced data-block.
    pub target: SessionUuid,
    /// The referenced data-block is embedded in (owned by) the referencing one.
    pub embedded: bool,
}

impl IdLink {
    fn regular(target: SessionUuid) -> Self {
        Self {
            target,
            embedded: false,
        }
    }

    fn owned(target: SessionUuid) -> Self {
        Self {
            target,
            embedded: true,
        }
    }
}

/// Options of a link walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdWalk {
    /// Do not report links to embedded data-blocks.
    pub ignore_embedded: bool,
}

impl IdWalk {
    /// Walk every link.
    pub const ALL: IdWalk = IdWalk {
        ignore_embedded: false,
    };

    /// Skip links to embedded data-blocks.
    pub const IGNORE_EMBEDDED: IdWalk = IdWalk {
        ignore_embedded: true,
    };
}

/// Inline capacity covers the common case of a handful of references.
pub type IdLinks = SmallVec<[IdLink; 8]>;

impl Datablock {
    /// Invoke `visitor` once per outgoing reference.
    pub fn foreach_id_link<F>(&self, walk: IdWalk, mut visitor: F)
    where
        F: FnMut(IdLink),
    {
        for link in self.id_links() {
            if walk.ignore_embedded && link.embedded {
                continue;
            }
            visitor(link);
        }
    }

    /// Collect every outgoing reference, embedded ones included.
    pub fn id_links(&self) -> IdLinks {
        let mut links = IdLinks::new();
        let mut add = |target: Option<SessionUuid>| {
            if let Some(target) = target {
                links.push(IdLink::regular(target));
            }
        };

        if let Some(properties) = &self.properties {
            properties.id_refs.iter().for_each(|id| add(Some(*id)));
        }
        if let Some(anim) = &self.anim {
            add(anim.action);
            anim.nla_actions.iter().for_each(|id| add(Some(*id)));
            for driver in &anim.drivers {
                for variable in &driver.variables {
                    variable.targets.iter().for_each(|id| add(Some(*id)));
                }
            }
        }

        let mut owned: SmallVec<[SessionUuid; 2]> = SmallVec::new();
        match &self.body {
            IdBody::Object(object) => object_links(object, &mut add),
            IdBody::Geometry(geometry) => {
                geometry.materials.iter().for_each(|id| add(*id));
                add(geometry.shape_key);
                add(geometry.bevel_object);
                add(geometry.taper_object);
                add(geometry.text_on_curve);
            }
            IdBody::Camera(camera) => add(camera.dof_object),
            IdBody::Collection(collection) => {
                collection.objects.iter().for_each(|id| add(Some(*id)));
                collection.children.iter().for_each(|id| add(Some(*id)));
            }
            IdBody::Light(light) => owned.extend(light.node_tree),
            IdBody::NodeTree(tree) => {
                for node in &tree.nodes {
                    add(node.id);
                    node.socket_ids.iter().for_each(|id| add(Some(*id)));
                    if let Some(properties) = &node.properties {
                        properties.id_refs.iter().for_each(|id| add(Some(*id)));
                    }
                }
            }
            IdBody::Material(material) => owned.extend(material.node_tree),
            IdBody::Texture(texture) => {
                add(texture.image);
                owned.extend(texture.node_tree);
            }
            IdBody::World(world) => owned.extend(world.node_tree),
            IdBody::Mask(mask) => mask.parents.iter().for_each(|id| add(Some(*id))),
            IdBody::LineStyle(line_style) => owned.extend(line_style.node_tree),
            IdBody::Speaker(speaker) => add(speaker.sound),
            IdBody::Scene(scene) => {
                scene_links(scene, &mut add);
                owned.extend(scene.master_collection);
                owned.extend(scene.compositor);
            }
            IdBody::Simulation(simulation) => owned.extend(simulation.node_tree),
            IdBody::ParticleSettings(settings) => {
                add(settings.instance_object);
                add(settings.instance_collection);
                settings.textures.iter().for_each(|id| add(*id));
            }
            IdBody::ShapeKey(_)
            | IdBody::Action(_)
            | IdBody::Armature(_)
            | IdBody::LightProbe
            | IdBody::Image
            | IdBody::MovieClip
            | IdBody::Sound
            | IdBody::CacheFile
            | IdBody::Text
            | IdBody::Font
            | IdBody::Generic(_) => {}
        }
        links.extend(owned.into_iter().map(IdLink::owned));
        links
    }
}

fn object_links(object: &Object, add: &mut impl FnMut(Option<SessionUuid>)) {
    add(object.data);
    add(object.parent);
    add(object.instance_collection);
    object.materials.iter().for_each(|id| add(*id));
    for modifier in &object.modifiers {
        modifier.id_refs.iter().for_each(|id| add(Some(*id)));
    }
    for fx in &object.shader_fx {
        fx.id_refs.iter().for_each(|id| add(Some(*id)));
    }
    for constraint in &object.constraints {
        constraint.targets.iter().for_each(|id| add(Some(*id)));
    }
    for psys in &object.particle_systems {
        add(psys.settings);
        psys.targets.iter().for_each(|id| add(Some(*id)));
    }
    if let Some(pose) = &object.pose {
        for channel in &pose.channels {
            add(channel.custom_shape);
            for constraint in &channel.constraints {
                constraint.targets.iter().for_each(|id| add(Some(*id)));
            }
        }
    }
    if let Some(ForceField::Texture(texture)) = object.force_field {
        add(texture);
    }
    if let Some(constraint) = &object.rigid_body_constraint {
        add(constraint.object1);
        add(constraint.object2);
    }
}

fn scene_links(scene: &Scene, add: &mut impl FnMut(Option<SessionUuid>)) {
    add(scene.camera);
    add(scene.world);
    add(scene.set_scene);
    for layer in &scene.view_layers {
        layer.bases.iter().for_each(|base| add(Some(base.object)));
        add(layer.material_override);
        for line_set in &layer.line_sets {
            add(line_set.line_style);
            add(line_set.collection);
        }
    }
    if let Some(sequencer) = &scene.sequencer {
        for strip in &sequencer.strips {
            add(strip.sound);
            add(strip.scene);
        }
    }
    if let Some(world) = &scene.rigid_body_world {
        add(world.collection);
        add(world.constraints);
    }
    scene.markers.iter().for_each(|marker| add(marker.camera));
}
