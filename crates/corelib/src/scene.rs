//! Scene graph: a flat set of renderable objects addressed by generational
//! handles. Slots are reused after detach; a stale handle never aliases the
//! object that later takes its slot.

use crate::{Color, CoreError, CoreResult, PlacementOptions, transform::Transform};

/// Index of a mesh in the model library. Clones of an object share it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub flat_shading: bool,
}

impl Material {
    pub fn flat(color: Color) -> Self {
        Self {
            color,
            flat_shading: true,
        }
    }
}

/// A renderable object: shared geometry plus its own material and transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Object3d {
    pub name: String,
    pub mesh: MeshId,
    pub material: Material,
    pub transform: Transform,
}

impl Object3d {
    pub fn new(name: impl Into<String>, mesh: MeshId, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            transform: Transform::identity(),
        }
    }

    /// Overwrite name, material colour, position and rotation. Scale is kept.
    pub fn apply_placement(&mut self, opts: &PlacementOptions) {
        self.name.clone_from(&opts.name);
        self.material.color = opts.color;
        self.transform.set_position(opts.position);
        self.transform.set_rotation(opts.rotation);
    }
}

#[derive(Default)]
pub struct SceneGraph {
    objects: Vec<Option<Object3d>>,
    generations: Vec<u32>,
    free: Vec<u32>,
    len: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, object: Object3d) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let i = index as usize;
            self.objects[i] = Some(object);
            return NodeId {
                index,
                generation: self.generations[i],
            };
        }
        let index = self.objects.len() as u32;
        self.objects.push(Some(object));
        self.generations.push(0);
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Remove the node and hand its object back. `None` for stale handles.
    pub fn detach(&mut self, id: NodeId) -> Option<Object3d> {
        if !self.contains(id) {
            return None;
        }
        let i = id.index as usize;
        let object = self.objects[i].take();
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        object
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        let i = id.index as usize;
        self.generations.get(i) == Some(&id.generation)
            && self.objects.get(i).is_some_and(Option::is_some)
    }

    pub fn get(&self, id: NodeId) -> Option<&Object3d> {
        if self.contains(id) {
            self.objects[id.index as usize].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Object3d> {
        if self.contains(id) {
            self.objects[id.index as usize].as_mut()
        } else {
            None
        }
    }

    pub fn apply_placement(&mut self, id: NodeId, opts: &PlacementOptions) -> CoreResult<()> {
        let object = self.get_mut(id).ok_or(CoreError::StaleNode(id))?;
        object.apply_placement(opts);
        Ok(())
    }

    /// First attached node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, o)| o.name == name).map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Object3d)> {
        self.objects.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|object| {
                (
                    NodeId {
                        index: i as u32,
                        generation: self.generations[i],
                    },
                    object,
                )
            })
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
