use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::instance::Instance;

/// A node of a scene or prefab hierarchy.
///
/// A game object carries its own data instance, an ordered list of
/// component instances and ordered children. Names are not unique among
/// siblings; see `rsz-paths` for the addressing scheme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    pub name: String,
    #[serde(default)]
    pub guid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Instance>,
    #[serde(default)]
    pub components: Vec<Instance>,
    #[serde(default)]
    pub children: Vec<GameObject>,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid: Uuid::nil(),
            prefab: None,
            data: None,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_guid(mut self, guid: Uuid) -> Self {
        self.guid = guid;
        self
    }

    pub fn with_data(mut self, data: Instance) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_component(mut self, component: Instance) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_child(mut self, child: GameObject) -> Self {
        self.children.push(child);
        self
    }

    /// First component of the given class.
    pub fn component(&self, class: &str) -> Option<&Instance> {
        self.components.iter().find(|c| c.class == class)
    }

    /// Mutable access to the first component of the given class.
    pub fn component_mut(&mut self, class: &str) -> Option<&mut Instance> {
        self.components.iter_mut().find(|c| c.class == class)
    }

    /// Total number of objects in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(GameObject::subtree_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_lookup_by_class() {
        let go = GameObject::new("Player")
            .with_component(Instance::new("via.Transform", vec![]))
            .with_component(Instance::new("app.Health", vec![]));
        assert!(go.component("app.Health").is_some());
        assert!(go.component("app.Missing").is_none());
    }

    #[test]
    fn subtree_len_counts_descendants() {
        let go = GameObject::new("Root")
            .with_child(GameObject::new("A").with_child(GameObject::new("B")))
            .with_child(GameObject::new("C"));
        assert_eq!(go.subtree_len(), 4);
    }

    #[test]
    fn serde_skips_absent_prefab() {
        let go = GameObject::new("Root");
        let json = serde_json::to_value(&go).unwrap();
        assert!(json.get("prefab").is_none());
        let back: GameObject = serde_json::from_value(json).unwrap();
        assert_eq!(back, go);
    }
}
