//! In-memory attribute source

use super::{AttributeSource, BlockId, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// A header entry: either a value or a named group of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldNode {
    Value(FieldValue),
    Group(BTreeMap<String, FieldValue>),
}

/// One block instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub type_name: String,
    /// Ancestor type names, nearest first
    #[serde(default)]
    pub ancestors: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

/// Serializable model for tests and offline validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryModel {
    #[serde(default)]
    pub bs_version: u32,
    #[serde(default)]
    pub header: BTreeMap<String, FieldNode>,
    /// Blocks indexed by [`BlockId`]
    #[serde(default)]
    pub blocks: Vec<MemoryBlock>,
}

impl MemoryModel {
    pub fn new(bs_version: u32) -> Self {
        Self {
            bs_version,
            ..Default::default()
        }
    }

    /// Set a top-level header field
    pub fn with_header(mut self, name: &str, value: FieldValue) -> Self {
        self.header.insert(name.to_string(), FieldNode::Value(value));
        self
    }

    /// Append a block and return its id
    pub fn add_block(&mut self, type_name: &str, ancestors: &[&str]) -> BlockId {
        self.blocks.push(MemoryBlock {
            type_name: type_name.to_string(),
            ancestors: ancestors.iter().map(|a| a.to_string()).collect(),
            fields: BTreeMap::new(),
        });
        BlockId(self.blocks.len() as u32 - 1)
    }

    /// Set a field on an existing block; unknown ids are ignored
    pub fn set_field(&mut self, block: BlockId, name: &str, value: FieldValue) {
        if let Some(b) = self.blocks.get_mut(block.0 as usize) {
            b.fields.insert(name.to_string(), value);
        }
    }

    fn block(&self, block: BlockId) -> Option<&MemoryBlock> {
        self.blocks.get(block.0 as usize)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, crate::error::ConfigError> {
        let path = path.as_ref();
        info!(path = ?path, "Loading attribute model from file");
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl AttributeSource for MemoryModel {
    fn bs_version(&self) -> u32 {
        self.bs_version
    }

    fn header_field(&self, group: Option<&str>, field: &str) -> Option<FieldValue> {
        match group {
            None => match self.header.get(field)? {
                FieldNode::Value(v) => Some(v.clone()),
                FieldNode::Group(_) => Some(FieldValue::Other),
            },
            Some(group) => match self.header.get(group)? {
                FieldNode::Group(fields) => fields.get(field).cloned(),
                FieldNode::Value(_) => None,
            },
        }
    }

    fn block_inherits(&self, block: BlockId, type_name: &str) -> bool {
        self.block(block).is_some_and(|b| {
            b.type_name == type_name || b.ancestors.iter().any(|a| a == type_name)
        })
    }

    fn block_field(&self, block: BlockId, field: &str) -> Option<FieldValue> {
        self.block(block)?.fields.get(field).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Resolved;

    fn sample() -> (MemoryModel, BlockId, BlockId) {
        let mut model = MemoryModel::new(100)
            .with_header("Version", FieldValue::FileVersion(0x14020007));
        let mut group = BTreeMap::new();
        group.insert("BS Version".to_string(), FieldValue::Count(100));
        model
            .header
            .insert("BS Header".to_string(), FieldNode::Group(group));

        let shape = model.add_block("BSTriShape", &["BSShape", "NiAVObject"]);
        let prop = model.add_block("BSLightingShaderProperty", &["BSShaderProperty"]);
        model.set_field(prop, "Skyrim Shader Type", FieldValue::Count(1));
        (model, shape, prop)
    }

    #[test]
    fn test_header_paths() {
        let (model, _, _) = sample();
        assert_eq!(
            model.resolve(&[], "HEADER/Version"),
            Some(Resolved::Field(FieldValue::FileVersion(0x14020007)))
        );
        assert_eq!(
            model.resolve(&[], "HEADER/BS Header/BS Version"),
            Some(Resolved::Field(FieldValue::Count(100)))
        );
        assert_eq!(model.resolve(&[], "HEADER/Missing"), None);
        assert_eq!(model.resolve(&[], "HEADER"), None);
    }

    #[test]
    fn test_block_paths_use_inheritance() {
        let (model, shape, prop) = sample();
        let blocks = [shape, prop];
        assert_eq!(
            model.resolve(&blocks, "BSShaderProperty"),
            Some(Resolved::Block(prop))
        );
        assert_eq!(
            model.resolve(&blocks, "BSShaderProperty/Skyrim Shader Type"),
            Some(Resolved::Field(FieldValue::Count(1)))
        );
        assert_eq!(model.resolve(&blocks, "NiTexturingProperty"), None);
    }

    #[test]
    fn test_first_matching_block_decides() {
        let mut model = MemoryModel::new(100);
        let a = model.add_block("NiAlphaProperty", &["NiProperty"]);
        let b = model.add_block("NiMaterialProperty", &["NiProperty"]);
        model.set_field(b, "Alpha", FieldValue::Float(1.0));

        // `a` matches NiProperty first and has no Alpha field
        assert_eq!(model.resolve(&[a, b], "NiProperty/Alpha"), None);
        assert_eq!(
            model.resolve(&[b, a], "NiProperty/Alpha"),
            Some(Resolved::Field(FieldValue::Float(1.0)))
        );
    }

    #[test]
    fn test_model_json_round_trip_from_disk() {
        let (model, _, _) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_string_pretty(&model).unwrap()).unwrap();

        let loaded = MemoryModel::load_from_file(&path).unwrap();
        assert_eq!(loaded, model);
    }
}
