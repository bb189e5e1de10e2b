use cgmath::{Vector2, Vector3};

use super::{NodeHandle, Outline, RenderBackend, SceneHierarchy};
use crate::config::RoomConfig;
use crate::error::RenderFault;
use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    picking::{Ray, RayHit, AABB},
};

struct SceneNode {
    name: String,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    /// World-space bounds of this node's own geometry
    bounds: Option<AABB>,
}

/// Handles of the nodes created by [`SceneTree::build_room`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomNodes {
    pub root: NodeHandle,
    pub floor: NodeHandle,
    pub ceiling: NodeHandle,
    /// Back, front, left, right
    pub walls: [NodeHandle; 4],
}

/// In-memory scene graph with world-space boxes as geometry.
#[derive(Default)]
pub struct SceneTree {
    nodes: Vec<Option<SceneNode>>,
    outline: Option<Outline>,
    frames_rendered: u64,
    fault: Option<RenderFault>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. A parent that is not attached is ignored and the node
    /// becomes a root.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeHandle>,
        bounds: Option<AABB>,
    ) -> NodeHandle {
        let handle = NodeHandle::from_raw(self.nodes.len() as u64);
        let parent = parent.filter(|p| self.is_attached(*p));
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.push(handle);
        }

        self.nodes.push(Some(SceneNode {
            name: name.into(),
            parent,
            children: Vec::new(),
            bounds,
        }));
        handle
    }

    /// Removes `node` and its whole subtree. Returns the removed handles,
    /// `node` first.
    pub fn detach(&mut self, node: NodeHandle) -> Vec<NodeHandle> {
        let Some(parent) = self.node(node).map(|n| n.parent) else {
            return Vec::new();
        };
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.retain(|c| *c != node);
        }

        let mut removed = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(current.raw() as usize) {
                if let Some(n) = slot.take() {
                    stack.extend(n.children);
                    removed.push(current);
                }
            }
        }

        if self.outline.is_some_and(|o| removed.contains(&o.node)) {
            self.outline = None;
        }
        removed
    }

    pub fn is_attached(&self, node: NodeHandle) -> bool {
        self.node(node).is_some()
    }

    pub fn children(&self, node: NodeHandle) -> &[NodeHandle] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.iter_attached()
            .find(|(_, n)| n.name == name)
            .map(|(handle, _)| handle)
    }

    pub fn len(&self) -> usize {
        self.iter_attached().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outline currently shown, if any.
    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Makes every backend call fail with `fault` until cleared with `None`.
    pub fn set_fault(&mut self, fault: Option<RenderFault>) {
        self.fault = fault;
    }

    /// Adds the floor, ceiling and four walls of a box room under one root.
    pub fn build_room(&mut self, room: &RoomConfig, floor_name: &str) -> RoomNodes {
        let hw = room.width / 2.0;
        let hd = room.depth / 2.0;
        let slab = room.wall_thickness / 2.0;

        let root = self.add_node("room", None, None);
        let floor = self.add_node(
            floor_name,
            Some(root),
            Some(AABB::new(
                Vector3::new(-hw, -slab, -hd),
                Vector3::new(hw, 0.0, hd),
            )),
        );
        let ceiling = self.add_node(
            "ceiling",
            Some(root),
            Some(AABB::new(
                Vector3::new(-hw, room.height, -hd),
                Vector3::new(hw, room.height + slab, hd),
            )),
        );

        let names = ["wall_back", "wall_front", "wall_left", "wall_right"];
        let colliders = room.wall_colliders();
        let mut walls = [root; 4];
        for (slot, (name, bounds)) in walls.iter_mut().zip(names.iter().zip(colliders)) {
            *slot = self.add_node(*name, Some(root), Some(bounds));
        }

        log::debug!(
            "built {}x{}x{} room with floor '{}'",
            room.width,
            room.height,
            room.depth,
            floor_name
        );

        RoomNodes {
            root,
            floor,
            ceiling,
            walls,
        }
    }

    fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.raw() as usize)?.as_ref()
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        self.nodes.get_mut(handle.raw() as usize)?.as_mut()
    }

    fn iter_attached(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeHandle::from_raw(i as u64), n)))
    }

    fn check_fault(&self) -> Result<(), RenderFault> {
        match &self.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }
}

impl SceneHierarchy for SceneTree {
    fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node)?.parent
    }

    fn name(&self, node: NodeHandle) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    fn world_bounds(&self, node: NodeHandle) -> Option<AABB> {
        let mut bounds: Option<AABB> = None;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(n) = self.node(current) else {
                continue;
            };
            if let Some(own) = n.bounds {
                bounds = Some(match bounds {
                    Some(acc) => acc.union(&own),
                    None => own,
                });
            }
            stack.extend(n.children.iter().copied());
        }
        bounds
    }
}

impl RenderBackend for SceneTree {
    fn cast_ray(&self, ndc: Vector2<f32>, camera: &OrbitCamera) -> Result<Vec<RayHit>, RenderFault> {
        self.check_fault()?;

        let ray = Ray::from_ndc(ndc, camera);
        let hits = self
            .iter_attached()
            .filter_map(|(handle, n)| {
                let distance = n.bounds?.intersect_ray(&ray)?;
                Some(RayHit {
                    node: handle,
                    point: ray.point_at(distance),
                    distance,
                })
            })
            .collect();
        Ok(hits)
    }

    fn render_frame(&mut self, _camera: &OrbitCamera) -> Result<(), RenderFault> {
        self.check_fault()?;
        self.frames_rendered += 1;
        Ok(())
    }

    fn show_outline(&mut self, outline: &Outline) -> Result<(), RenderFault> {
        self.check_fault()?;
        self.outline = Some(*outline);
        Ok(())
    }

    fn clear_outline(&mut self) -> Result<(), RenderFault> {
        self.check_fault()?;
        self.outline = None;
        Ok(())
    }
}
