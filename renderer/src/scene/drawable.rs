use super::PropertyList;
use crate::attributes::BlockId;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// A shape about to be drawn, as the binder sees it
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub block: BlockId,
    /// Geometry data block, when separate from the shape
    pub data: Option<BlockId>,
    pub properties: PropertyList,
    pub world: Mat4,
    pub view: Mat4,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    /// Skinned tangents, preferred over the raw arrays when present
    pub transformed_tangents: Vec<Vec3>,
    pub transformed_bitangents: Vec<Vec3>,
    /// Texture coordinate sets
    pub coords: Vec<Vec<Vec2>>,
    pub translucent: bool,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl Drawable {
    pub fn new(block: BlockId) -> Self {
        Self {
            block,
            data: None,
            properties: PropertyList::default(),
            world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            normals: Vec::new(),
            colors: Vec::new(),
            tangents: Vec::new(),
            bitangents: Vec::new(),
            transformed_tangents: Vec::new(),
            transformed_bitangents: Vec::new(),
            coords: Vec::new(),
            translucent: false,
            depth_test: true,
            depth_write: true,
        }
    }

    /// Blocks condition paths are resolved against: the shape, its data,
    /// then every attached property
    pub fn active_blocks(&self) -> Vec<BlockId> {
        let mut blocks = vec![self.block];
        blocks.extend(self.data);
        blocks.extend(self.properties.blocks());
        blocks
    }

    /// A coordinate set if it exists and is non-empty
    pub fn coord_set(&self, set: i32) -> Option<&[Vec2]> {
        let set = usize::try_from(set).ok()?;
        self.coords
            .get(set)
            .map(Vec::as_slice)
            .filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ShaderFamily, ShaderProperty};

    #[test]
    fn test_active_block_order() {
        let mut drawable = Drawable::new(BlockId(10));
        drawable.data = Some(BlockId(11));
        drawable.properties.shader = Some(ShaderProperty::new(BlockId(12), ShaderFamily::Other));
        assert_eq!(
            drawable.active_blocks(),
            vec![BlockId(10), BlockId(11), BlockId(12)]
        );
    }

    #[test]
    fn test_coord_set_bounds() {
        let mut drawable = Drawable::new(BlockId(0));
        drawable.coords = vec![vec![Vec2::ZERO; 3], Vec::new()];
        assert_eq!(drawable.coord_set(0).map(<[Vec2]>::len), Some(3));
        assert!(drawable.coord_set(1).is_none());
        assert!(drawable.coord_set(2).is_none());
        assert!(drawable.coord_set(-1).is_none());
    }
}
