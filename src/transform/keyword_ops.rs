//! Edits over keyword leaves.

use crate::error::Result;
use crate::query::{Keyword, QueryNode, fields};
use crate::transform::{TransformationId, Transformer};

/// Toggles the exploded flag on a MeSH-heading keyword.
#[derive(Debug, Default)]
pub struct MeshExplosion;

impl Transformer for MeshExplosion {
    fn id(&self) -> TransformationId {
        TransformationId::MeshExplosion
    }

    fn apply(&self, node: &QueryNode) -> Result<Vec<QueryNode>> {
        let keyword = match node {
            QueryNode::Keyword(k) => k,
            QueryNode::Boolean(_) => return Ok(Vec::new()),
        };
        if !keyword.has_field(fields::MESH) {
            return Ok(Vec::new());
        }

        let mut toggled = keyword.clone();
        toggled.exploded = !keyword.exploded;
        Ok(vec![QueryNode::Keyword(toggled)])
    }
}

/// Swaps, adds, or drops title/abstract field markers on a keyword.
///
/// A keyword restricted to one of the two fields yields a swap variant
/// and an add-the-other variant; a keyword carrying both yields one
/// variant per dropped field.
#[derive(Debug, Default)]
pub struct FieldRestrictions;

impl FieldRestrictions {
    fn replace_field(keyword: &Keyword, from: &str, to: &str) -> Keyword {
        let mut out = keyword.clone();
        out.fields = keyword
            .fields
            .iter()
            .map(|f| {
                if f == from {
                    to.to_string()
                } else {
                    f.clone()
                }
            })
            .collect();
        out
    }

    fn drop_field(keyword: &Keyword, field: &str) -> Keyword {
        let mut out = keyword.clone();
        out.fields.retain(|f| f != field);
        out
    }
}

impl Transformer for FieldRestrictions {
    fn id(&self) -> TransformationId {
        TransformationId::FieldRestrictions
    }

    fn apply(&self, node: &QueryNode) -> Result<Vec<QueryNode>> {
        let keyword = match node {
            QueryNode::Keyword(k) => k,
            QueryNode::Boolean(_) => return Ok(Vec::new()),
        };

        let has_title = keyword.has_field(fields::TITLE);
        let has_abstract = keyword.has_field(fields::ABSTRACT);

        let variants = match (has_title, has_abstract) {
            (true, false) => vec![
                Self::replace_field(keyword, fields::TITLE, fields::ABSTRACT),
                keyword.clone().with_field(fields::ABSTRACT),
            ],
            (false, true) => vec![
                Self::replace_field(keyword, fields::ABSTRACT, fields::TITLE),
                keyword.clone().with_field(fields::TITLE),
            ],
            (true, true) => vec![
                Self::drop_field(keyword, fields::TITLE),
                Self::drop_field(keyword, fields::ABSTRACT),
            ],
            (false, false) => Vec::new(),
        };

        Ok(variants.into_iter().map(QueryNode::Keyword).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_explosion_toggles() {
        let heading = QueryNode::Keyword(Keyword::new("Neoplasms").with_field(fields::MESH));
        let variants = MeshExplosion.apply(&heading).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].canonical(), "Neoplasms[mh]/exp");

        let exploded = &variants[0];
        let back = MeshExplosion.apply(exploded).unwrap();
        assert_eq!(back[0].canonical(), "Neoplasms[mh]");
    }

    #[test]
    fn test_mesh_explosion_requires_mesh_field() {
        let plain = QueryNode::Keyword(Keyword::new("cancer").with_field(fields::TITLE));
        assert!(MeshExplosion.apply(&plain).unwrap().is_empty());
    }

    #[test]
    fn test_title_only_yields_exactly_two_variants() {
        let keyword = QueryNode::Keyword(Keyword::new("stroke").with_field(fields::TITLE));
        let variants = FieldRestrictions.apply(&keyword).unwrap();

        let canonicals: Vec<String> = variants.iter().map(|v| v.canonical()).collect();
        assert_eq!(canonicals, vec!["stroke[ab]", "stroke[ab,ti]"]);
    }

    #[test]
    fn test_both_fields_yields_two_drops() {
        let keyword = QueryNode::Keyword(
            Keyword::new("stroke")
                .with_field(fields::TITLE)
                .with_field(fields::ABSTRACT),
        );
        let variants = FieldRestrictions.apply(&keyword).unwrap();

        let canonicals: Vec<String> = variants.iter().map(|v| v.canonical()).collect();
        assert_eq!(canonicals, vec!["stroke[ab]", "stroke[ti]"]);
    }

    #[test]
    fn test_unmarked_keyword_is_skipped() {
        let keyword = QueryNode::Keyword(Keyword::new("stroke").with_field(fields::MESH));
        assert!(FieldRestrictions.apply(&keyword).unwrap().is_empty());
    }
}
