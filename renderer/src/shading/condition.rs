//! Condition expressions and groups
//!
//! A program definition guards itself with a tree of conditions. Leaves are
//! single comparisons like `BSShaderProperty/Shader Flags 1 & 0x1000` or bare
//! existence checks; inner nodes are AND/OR groups. Evaluation is a pure
//! function of the attribute source and the active block list.

use crate::attributes::{parse_unsigned, AttributeSource, BlockId, FieldValue, Resolved};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator of a single expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    /// `(value & literal) != 0`
    And,
    /// `(value & literal) == 0`
    Nand,
    /// Existence check only
    None,
}

/// Operator tokens in match priority: two-character tokens win over their
/// one-character prefixes at the same position.
const TOKENS: [(&str, Comparison); 8] = [
    ("!&", Comparison::Nand),
    ("!=", Comparison::Ne),
    ("==", Comparison::Eq),
    ("<=", Comparison::Le),
    (">=", Comparison::Ge),
    ("<", Comparison::Lt),
    (">", Comparison::Gt),
    ("&", Comparison::And),
];

impl Comparison {
    pub fn token(self) -> &'static str {
        TOKENS
            .iter()
            .find(|(_, c)| *c == self)
            .map(|(t, _)| *t)
            .unwrap_or("")
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Le => ordering != Ordering::Greater,
            Comparison::Ge => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::And | Comparison::Nand | Comparison::None => false,
        }
    }

    fn compare_bits(self, value: u64, literal: u64) -> bool {
        match self {
            Comparison::And => value & literal != 0,
            Comparison::Nand => value & literal == 0,
            _ => self.holds(value.cmp(&literal)),
        }
    }
}

/// A single `left OP right` check, optionally inverted
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionExpr {
    pub left: String,
    pub comparison: Comparison,
    pub right: String,
    pub invert: bool,
}

impl ConditionExpr {
    /// Parse the text following `check` / `check not`
    ///
    /// The first operator token found at a position past the start splits the
    /// text. Without one the whole text is a path to test for existence.
    pub fn parse(text: &str, invert: bool) -> Self {
        let found = text
            .char_indices()
            .skip(1)
            .find_map(|(pos, _)| {
                TOKENS
                    .iter()
                    .find(|(token, _)| text[pos..].starts_with(token))
                    .map(|(token, comparison)| (pos, token.len(), *comparison))
            });

        match found {
            Some((pos, len, comparison)) => {
                let right = text[pos + len..].trim();
                let right = right
                    .strip_prefix('"')
                    .and_then(|r| r.strip_suffix('"'))
                    .unwrap_or(right);
                Self {
                    left: text[..pos].trim().to_string(),
                    comparison,
                    right: right.to_string(),
                    invert,
                }
            }
            None => Self {
                left: text.trim().to_string(),
                comparison: Comparison::None,
                right: String::new(),
                invert,
            },
        }
    }

    pub fn eval(&self, source: &dyn AttributeSource, blocks: &[BlockId]) -> bool {
        let Some(resolved) = source.resolve(blocks, &self.left) else {
            return self.invert;
        };

        if self.comparison == Comparison::None {
            return !self.invert;
        }

        let value = match resolved {
            Resolved::Field(value) => value,
            Resolved::Block(_) => return false,
        };

        let result = match &value {
            FieldValue::String(s) => match self.comparison {
                Comparison::And | Comparison::Nand => return false,
                c => c.holds(s.as_str().cmp(self.right.as_str())),
            },
            FieldValue::Count(v) => self.comparison.compare_bits(*v, parse_unsigned(&self.right)),
            FieldValue::Float(v) => {
                let literal = self.right.trim().parse::<f32>().unwrap_or(0.0);
                match v.partial_cmp(&literal) {
                    Some(ordering) => match self.comparison {
                        Comparison::And | Comparison::Nand => return false,
                        c => c.holds(ordering),
                    },
                    None => self.comparison == Comparison::Ne,
                }
            }
            FieldValue::FileVersion(v) | FieldValue::VertexFlags(v) => {
                let literal = u32::try_from(parse_unsigned(&self.right)).unwrap_or(0);
                self.comparison.compare_bits(u64::from(*v), u64::from(literal))
            }
            FieldValue::Other => return false,
        };

        result ^ self.invert
    }
}

impl fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert {
            write!(f, "not ")?;
        }
        write!(f, "{}", self.left)?;
        if self.comparison != Comparison::None {
            write!(f, " {} {}", self.comparison.token(), self.right)?;
        }
        Ok(())
    }
}

/// AND or OR collection of conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionGroup {
    pub is_or: bool,
    pub children: Vec<Condition>,
}

impl ConditionGroup {
    pub fn new(is_or: bool) -> Self {
        Self {
            is_or,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, condition: Condition) {
        self.children.push(condition);
    }

    /// An empty group holds for both AND and OR
    pub fn eval(&self, source: &dyn AttributeSource, blocks: &[BlockId]) -> bool {
        if self.children.is_empty() {
            return true;
        }
        if self.is_or {
            self.children.iter().any(|c| c.eval(source, blocks))
        } else {
            self.children.iter().all(|c| c.eval(source, blocks))
        }
    }

    /// Nesting depth, counting this group as 1
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| match c {
                Condition::Group(g) => g.depth(),
                Condition::Expr(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Node of a condition tree
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Expr(ConditionExpr),
    Group(ConditionGroup),
}

impl Condition {
    pub fn eval(&self, source: &dyn AttributeSource, blocks: &[BlockId]) -> bool {
        match self {
            Condition::Expr(e) => e.eval(source, blocks),
            Condition::Group(g) => g.eval(source, blocks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::MemoryModel;

    fn model_with(field: &str, value: FieldValue) -> (MemoryModel, Vec<BlockId>) {
        let mut model = MemoryModel::new(100);
        let block = model.add_block("BSLightingShaderProperty", &["BSShaderProperty"]);
        model.set_field(block, field, value);
        (model, vec![block])
    }

    #[test]
    fn test_parse_two_char_operator() {
        let expr = ConditionExpr::parse("DoubleSided==1", false);
        assert_eq!(expr.left, "DoubleSided");
        assert_eq!(expr.comparison, Comparison::Eq);
        assert_eq!(expr.right, "1");
        assert!(!expr.invert);
    }

    #[test]
    fn test_parse_prefers_two_char_tokens() {
        assert_eq!(ConditionExpr::parse("a <= 3", false).comparison, Comparison::Le);
        assert_eq!(ConditionExpr::parse("a >= 3", false).comparison, Comparison::Ge);
        assert_eq!(ConditionExpr::parse("a != 3", false).comparison, Comparison::Ne);
        assert_eq!(ConditionExpr::parse("a !& 3", false).comparison, Comparison::Nand);
        assert_eq!(ConditionExpr::parse("a & 3", false).comparison, Comparison::And);
        assert_eq!(ConditionExpr::parse("a < 3", false).comparison, Comparison::Lt);
    }

    #[test]
    fn test_parse_first_token_wins() {
        let expr = ConditionExpr::parse("Name == a<b", false);
        assert_eq!(expr.left, "Name");
        assert_eq!(expr.comparison, Comparison::Eq);
        assert_eq!(expr.right, "a<b");
    }

    #[test]
    fn test_parse_strips_quotes_and_keeps_spaces_in_path() {
        let expr = ConditionExpr::parse(" NiTriShape/Has Normals == \"yes\" ", true);
        assert_eq!(expr.left, "NiTriShape/Has Normals");
        assert_eq!(expr.right, "yes");
        assert!(expr.invert);
    }

    #[test]
    fn test_parse_existence_check() {
        let expr = ConditionExpr::parse("BSEffectShaderProperty", false);
        assert_eq!(expr.comparison, Comparison::None);
        assert_eq!(expr.left, "BSEffectShaderProperty");
    }

    #[test]
    fn test_unresolved_path_returns_invert() {
        let (model, blocks) = model_with("Flags", FieldValue::Count(6));
        let plain = ConditionExpr::parse("Missing == 1", false);
        let inverted = ConditionExpr::parse("Missing == 1", true);
        assert!(!plain.eval(&model, &blocks));
        assert!(inverted.eval(&model, &blocks));
    }

    #[test]
    fn test_existence_checks() {
        let (model, blocks) = model_with("Flags", FieldValue::Count(6));
        assert!(ConditionExpr::parse("BSShaderProperty", false).eval(&model, &blocks));
        assert!(!ConditionExpr::parse("BSShaderProperty", true).eval(&model, &blocks));
        assert!(!ConditionExpr::parse("NiAlphaProperty", false).eval(&model, &blocks));
    }

    #[test]
    fn test_bit_operators_on_counts() {
        let (model, blocks) = model_with("Flags", FieldValue::Count(6));
        let blocks = &blocks[..];
        let and = ConditionExpr::parse("BSShaderProperty/Flags&4", false);
        let nand = ConditionExpr::parse("BSShaderProperty/Flags!&4", false);
        assert!(and.eval(&model, blocks));
        assert!(!nand.eval(&model, blocks));
        assert!(!ConditionExpr::parse("BSShaderProperty/Flags&1", false).eval(&model, blocks));
        assert!(ConditionExpr::parse("BSShaderProperty/Flags & 0x4", false).eval(&model, blocks));
    }

    #[test]
    fn test_numeric_comparisons_and_invert() {
        let (model, blocks) = model_with("Count", FieldValue::Count(10));
        let check = |text: &str, invert: bool| {
            ConditionExpr::parse(text, invert).eval(&model, &blocks)
        };
        assert!(check("BSShaderProperty/Count >= 10", false));
        assert!(check("BSShaderProperty/Count < 0xB", false));
        assert!(!check("BSShaderProperty/Count > 10", false));
        assert!(check("BSShaderProperty/Count > 10", true));
    }

    #[test]
    fn test_float_and_string_fields() {
        let (mut model, blocks) = model_with("Alpha", FieldValue::Float(0.5));
        model.set_field(blocks[0], "Name", FieldValue::String("skin".into()));
        assert!(ConditionExpr::parse("BSShaderProperty/Alpha < 1.0", false).eval(&model, &blocks));
        assert!(ConditionExpr::parse("BSShaderProperty/Name == \"skin\"", false).eval(&model, &blocks));
        assert!(ConditionExpr::parse("BSShaderProperty/Name != hair", false).eval(&model, &blocks));
        // bit operators do not apply to strings or floats, inverted or not
        assert!(!ConditionExpr::parse("BSShaderProperty/Name & 1", true).eval(&model, &blocks));
        assert!(!ConditionExpr::parse("BSShaderProperty/Alpha & 1", false).eval(&model, &blocks));
    }

    #[test]
    fn test_unsupported_kinds_are_false_even_when_inverted() {
        let (model, blocks) = model_with("Data", FieldValue::Other);
        assert!(!ConditionExpr::parse("BSShaderProperty/Data == 1", false).eval(&model, &blocks));
        assert!(!ConditionExpr::parse("BSShaderProperty/Data == 1", true).eval(&model, &blocks));
        // comparing a bare block is unsupported too
        assert!(!ConditionExpr::parse("BSShaderProperty == 1", true).eval(&model, &blocks));
    }

    #[test]
    fn test_header_version_comparison() {
        let model = MemoryModel::new(172).with_header("User Version 2", FieldValue::Count(172));
        assert!(ConditionExpr::parse("HEADER/User Version 2 >= 172", false).eval(&model, &[]));
        assert!(!ConditionExpr::parse("HEADER/User Version 2 < 151", false).eval(&model, &[]));
    }

    #[test]
    fn test_empty_groups_are_true() {
        let model = MemoryModel::new(100);
        assert!(ConditionGroup::new(false).eval(&model, &[]));
        assert!(ConditionGroup::new(true).eval(&model, &[]));
    }

    #[test]
    fn test_group_semantics() {
        let (model, blocks) = model_with("Flags", FieldValue::Count(6));
        let yes = Condition::Expr(ConditionExpr::parse("BSShaderProperty/Flags & 2", false));
        let no = Condition::Expr(ConditionExpr::parse("BSShaderProperty/Flags & 1", false));

        let mut and = ConditionGroup::new(false);
        and.push(yes.clone());
        and.push(no.clone());
        assert!(!and.eval(&model, &blocks));

        let mut or = ConditionGroup::new(true);
        or.push(no);
        or.push(yes);
        assert!(or.eval(&model, &blocks));

        let mut outer = ConditionGroup::new(false);
        outer.push(Condition::Group(or));
        assert!(outer.eval(&model, &blocks));
        assert_eq!(outer.depth(), 2);
    }

    #[test]
    fn test_eval_is_repeatable() {
        let (model, blocks) = model_with("Flags", FieldValue::Count(6));
        let expr = ConditionExpr::parse("BSShaderProperty/Flags!&4", true);
        let first = expr.eval(&model, &blocks);
        for _ in 0..3 {
            assert_eq!(expr.eval(&model, &blocks), first);
        }
    }

    #[test]
    fn test_oversized_version_literal_reads_as_zero() {
        let (model, blocks) = model_with("Version", FieldValue::FileVersion(0x14));
        let wide = ConditionExpr::parse("BSShaderProperty/Version == 0x100000014", false);
        assert!(!wide.eval(&model, &blocks));

        let (model, blocks) = model_with("Version", FieldValue::FileVersion(0));
        assert!(wide.eval(&model, &blocks));
    }

    #[test]
    fn test_display() {
        let expr = ConditionExpr::parse("a==1", true);
        assert_eq!(expr.to_string(), "not a == 1");
    }
}
