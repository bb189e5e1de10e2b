use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::gfx::scene::{NodeHandle, SceneHierarchy};

/// Display metadata attached to a selectable object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub name: String,
    pub description: String,
}

impl ObjectInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Maps the root node of each loaded model to its metadata.
///
/// Handles are non-owning; the scene graph decides when a node goes away and
/// the owner is expected to [`unregister`](Self::unregister) it at that point.
#[derive(Debug, Default)]
pub struct SpatialRegistry {
    entries: HashMap<NodeHandle, ObjectInfo>,
}

impl SpatialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `info` for `node`, returning whatever was registered before.
    pub fn register(&mut self, node: NodeHandle, info: ObjectInfo) -> Option<ObjectInfo> {
        log::debug!("registered '{}' at {:?}", info.name, node);
        self.entries.insert(node, info)
    }

    pub fn unregister(&mut self, node: NodeHandle) -> Option<ObjectInfo> {
        self.entries.remove(&node)
    }

    pub fn get(&self, node: NodeHandle) -> Option<&ObjectInfo> {
        self.entries.get(&node)
    }

    pub fn contains(&self, node: NodeHandle) -> bool {
        self.entries.contains_key(&node)
    }

    /// Walks from `node` up the parent chain and returns the first registered
    /// node together with its metadata.
    ///
    /// Picks usually land on a leaf mesh several levels below the model root,
    /// so `node` itself is rarely the registered one.
    pub fn resolve<H: SceneHierarchy + ?Sized>(
        &self,
        node: NodeHandle,
        hierarchy: &H,
    ) -> Option<(NodeHandle, &ObjectInfo)> {
        let mut current = Some(node);
        while let Some(handle) = current {
            if let Some(info) = self.entries.get(&handle) {
                return Some((handle, info));
            }
            current = hierarchy.parent(handle);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &ObjectInfo)> {
        self.entries.iter().map(|(handle, info)| (*handle, info))
    }
}
