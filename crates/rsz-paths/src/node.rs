use rsz_types::GameObject;

/// A named node with ordered children.
pub trait PathNode: Sized {
    fn name(&self) -> &str;
    fn children(&self) -> &[Self];
    fn children_mut(&mut self) -> &mut Vec<Self>;
}

impl PathNode for GameObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}
