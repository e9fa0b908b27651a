//! Query node types: the closed sum of keyword leaves and boolean clauses.

use serde::{Deserialize, Serialize};

use crate::query::fingerprint::Fingerprint;

/// Well-known field markers used by literature-search strategies.
pub mod fields {
    /// Title field marker.
    pub const TITLE: &str = "ti";
    /// Abstract field marker.
    pub const ABSTRACT: &str = "ab";
    /// MeSH heading field marker.
    pub const MESH: &str = "mh";
}

/// Boolean operator connecting the children of a clause.
///
/// `Adj(n)` is an adjacency operator requiring its terms to appear within
/// `n` positions of each other; it is executed verbatim by the backend and
/// never decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    And,
    Or,
    Not,
    Adj(u32),
}

impl Operator {
    /// Parse an operator string. Unrecognized operators default to `Or`.
    pub fn parse(s: &str) -> Operator {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "AND" => Operator::And,
            "OR" => Operator::Or,
            "NOT" => Operator::Not,
            _ => {
                if let Some(n) = upper.strip_prefix("ADJ") {
                    if let Ok(n) = n.parse::<u32>() {
                        return Operator::Adj(n);
                    }
                }
                Operator::Or
            }
        }
    }

    /// Render the operator label as it appears in a search strategy.
    pub fn label(&self) -> String {
        match self {
            Operator::And => "AND".to_string(),
            Operator::Or => "OR".to_string(),
            Operator::Not => "NOT".to_string(),
            Operator::Adj(n) => format!("ADJ{n}"),
        }
    }

    /// Whether this operator is an adjacency operator.
    pub fn is_adjacency(&self) -> bool {
        matches!(self, Operator::Adj(_))
    }
}

/// A keyword leaf: free text plus the fields it is restricted to and the
/// per-keyword flags a strategy can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// The query text.
    pub text: String,
    /// Field restrictions, empty means all fields.
    pub fields: Vec<String>,
    /// Whether a MeSH heading is exploded to include narrower terms.
    pub exploded: bool,
    /// Whether the term carries a truncation wildcard.
    pub truncated: bool,
}

impl Keyword {
    /// Create a keyword with no field restrictions.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Keyword {
            text: text.into(),
            fields: Vec::new(),
            exploded: false,
            truncated: false,
        }
    }

    /// Add a field restriction.
    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Set the exploded flag.
    pub fn exploded(mut self, exploded: bool) -> Self {
        self.exploded = exploded;
        self
    }

    /// Set the truncated flag.
    pub fn truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Whether this keyword is restricted to the given field.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Canonical textual form: text, sorted fields, then flags.
    pub fn canonical(&self) -> String {
        let mut out = self.text.clone();
        if !self.fields.is_empty() {
            let mut sorted = self.fields.clone();
            sorted.sort();
            sorted.dedup();
            out.push('[');
            out.push_str(&sorted.join(","));
            out.push(']');
        }
        if self.exploded {
            out.push_str("/exp");
        }
        if self.truncated {
            out.push_str("/trunc");
        }
        out
    }
}

/// An internal boolean clause: an operator over one or more children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanNode {
    /// The connecting operator.
    pub operator: Operator,
    /// Child nodes, in strategy order. Order matters for NOT.
    pub children: Vec<QueryNode>,
}

impl BooleanNode {
    /// Create a boolean clause.
    pub fn new(operator: Operator, children: Vec<QueryNode>) -> Self {
        BooleanNode { operator, children }
    }

    /// Copy of this clause with the child at `index` replaced.
    pub fn with_child_replaced(&self, index: usize, child: QueryNode) -> BooleanNode {
        let mut children = self.children.clone();
        children[index] = child;
        BooleanNode {
            operator: self.operator,
            children,
        }
    }

    /// Copy of this clause with the child at `index` omitted.
    pub fn with_child_removed(&self, index: usize) -> BooleanNode {
        let mut children = self.children.clone();
        children.remove(index);
        BooleanNode {
            operator: self.operator,
            children,
        }
    }
}

/// A query node: either a keyword leaf or a boolean clause.
///
/// The query AST is produced externally (by a parser out of scope here)
/// and treated as read-only; transformations always build fresh copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    Keyword(Keyword),
    Boolean(BooleanNode),
}

impl QueryNode {
    /// Create a keyword leaf.
    pub fn keyword<S: Into<String>>(text: S) -> QueryNode {
        QueryNode::Keyword(Keyword::new(text))
    }

    /// Create an AND clause.
    pub fn and(children: Vec<QueryNode>) -> QueryNode {
        QueryNode::Boolean(BooleanNode::new(Operator::And, children))
    }

    /// Create an OR clause.
    pub fn or(children: Vec<QueryNode>) -> QueryNode {
        QueryNode::Boolean(BooleanNode::new(Operator::Or, children))
    }

    /// Create a NOT clause. The first child is kept, the rest subtracted.
    pub fn not(children: Vec<QueryNode>) -> QueryNode {
        QueryNode::Boolean(BooleanNode::new(Operator::Not, children))
    }

    /// Create an adjacency clause.
    pub fn adj(n: u32, children: Vec<QueryNode>) -> QueryNode {
        QueryNode::Boolean(BooleanNode::new(Operator::Adj(n), children))
    }

    /// The node's children; empty for keyword leaves.
    pub fn children(&self) -> &[QueryNode] {
        match self {
            QueryNode::Keyword(_) => &[],
            QueryNode::Boolean(b) => &b.children,
        }
    }

    /// Canonical textual form. Equal canonical strings imply equal
    /// fingerprints.
    pub fn canonical(&self) -> String {
        match self {
            QueryNode::Keyword(k) => k.canonical(),
            QueryNode::Boolean(b) => {
                let children: Vec<String> = b.children.iter().map(|c| c.canonical()).collect();
                format!("{}({})", b.operator.label(), children.join(","))
            }
        }
    }

    /// Content fingerprint of the canonical form.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.canonical())
    }

    /// Number of keyword leaves in the tree.
    pub fn keyword_count(&self) -> usize {
        match self {
            QueryNode::Keyword(_) => 1,
            QueryNode::Boolean(b) => b.children.iter().map(|c| c.keyword_count()).sum(),
        }
    }

    /// Number of boolean clauses in the tree.
    pub fn clause_count(&self) -> usize {
        match self {
            QueryNode::Keyword(_) => 0,
            QueryNode::Boolean(b) => {
                1 + b.children.iter().map(|c| c.clause_count()).sum::<usize>()
            }
        }
    }

    /// Number of clauses carrying the given operator.
    pub fn operator_count(&self, operator: Operator) -> usize {
        match self {
            QueryNode::Keyword(_) => 0,
            QueryNode::Boolean(b) => {
                let own = usize::from(b.operator == operator);
                own + b
                    .children
                    .iter()
                    .map(|c| c.operator_count(operator))
                    .sum::<usize>()
            }
        }
    }

    /// Maximum depth of the tree. A lone keyword has depth 1.
    pub fn max_depth(&self) -> usize {
        match self {
            QueryNode::Keyword(_) => 1,
            QueryNode::Boolean(b) => {
                1 + b
                    .children
                    .iter()
                    .map(|c| c.max_depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Count of minimal differing regions between two trees.
    ///
    /// Clauses with the same child count are compared position by position,
    /// the operator counting as its own region; any change of shape (leaf
    /// vs clause, differing child counts) counts as a single region. A
    /// single transformation application therefore yields exactly 1.
    pub fn edit_distance(a: &QueryNode, b: &QueryNode) -> usize {
        match (a, b) {
            (QueryNode::Keyword(ka), QueryNode::Keyword(kb)) => usize::from(ka != kb),
            (QueryNode::Boolean(ba), QueryNode::Boolean(bb))
                if ba.children.len() == bb.children.len() =>
            {
                let op = usize::from(ba.operator != bb.operator);
                op + ba
                    .children
                    .iter()
                    .zip(bb.children.iter())
                    .map(|(ca, cb)| QueryNode::edit_distance(ca, cb))
                    .sum::<usize>()
            }
            _ => 1,
        }
    }
}

impl std::fmt::Display for QueryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse("AND"), Operator::And);
        assert_eq!(Operator::parse("and"), Operator::And);
        assert_eq!(Operator::parse("OR"), Operator::Or);
        assert_eq!(Operator::parse("NOT"), Operator::Not);
        assert_eq!(Operator::parse("ADJ3"), Operator::Adj(3));
        assert_eq!(Operator::parse("adj12"), Operator::Adj(12));
        // Unrecognized operators fall back to OR.
        assert_eq!(Operator::parse("NEAR"), Operator::Or);
        assert_eq!(Operator::parse("ADJx"), Operator::Or);
    }

    #[test]
    fn test_keyword_canonical() {
        let kw = Keyword::new("heart failure")
            .with_field(fields::ABSTRACT)
            .with_field(fields::TITLE);

        // Fields are sorted so field order does not change the canonical form.
        assert_eq!(kw.canonical(), "heart failure[ab,ti]");

        let kw = Keyword::new("Neoplasms").with_field(fields::MESH).exploded(true);
        assert_eq!(kw.canonical(), "Neoplasms[mh]/exp");
    }

    #[test]
    fn test_node_canonical() {
        let q = QueryNode::and(vec![
            QueryNode::or(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]),
            QueryNode::keyword("c"),
        ]);
        assert_eq!(q.canonical(), "AND(OR(a,b),c)");

        let q = QueryNode::adj(2, vec![QueryNode::keyword("x"), QueryNode::keyword("y")]);
        assert_eq!(q.canonical(), "ADJ2(x,y)");
    }

    #[test]
    fn test_fingerprint_determinism() {
        let a = QueryNode::and(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]);
        let b = QueryNode::and(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = QueryNode::or(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_structural_counts() {
        let q = QueryNode::and(vec![
            QueryNode::or(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]),
            QueryNode::keyword("c"),
        ]);

        assert_eq!(q.keyword_count(), 3);
        assert_eq!(q.clause_count(), 2);
        assert_eq!(q.max_depth(), 3);
        assert_eq!(q.operator_count(Operator::Or), 1);
        assert_eq!(q.operator_count(Operator::And), 1);
        assert_eq!(q.operator_count(Operator::Not), 0);
    }

    #[test]
    fn test_edit_distance_single_flip() {
        let seed = QueryNode::and(vec![
            QueryNode::or(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]),
            QueryNode::keyword("c"),
        ]);
        let top_flip = QueryNode::or(vec![
            QueryNode::or(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]),
            QueryNode::keyword("c"),
        ]);
        let inner_flip = QueryNode::and(vec![
            QueryNode::and(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]),
            QueryNode::keyword("c"),
        ]);
        let double_flip = QueryNode::or(vec![
            QueryNode::and(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]),
            QueryNode::keyword("c"),
        ]);

        assert_eq!(QueryNode::edit_distance(&seed, &seed), 0);
        assert_eq!(QueryNode::edit_distance(&seed, &top_flip), 1);
        assert_eq!(QueryNode::edit_distance(&seed, &inner_flip), 1);
        assert_eq!(QueryNode::edit_distance(&seed, &double_flip), 2);
    }

    #[test]
    fn test_edit_distance_shape_changes() {
        let seed = QueryNode::and(vec![
            QueryNode::keyword("a"),
            QueryNode::keyword("b"),
            QueryNode::keyword("c"),
        ]);

        // Leave-one-out changes the child count: one region.
        let removed = QueryNode::and(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]);
        assert_eq!(QueryNode::edit_distance(&seed, &removed), 1);

        // Expanding a keyword into an OR clause: one region.
        let expanded = QueryNode::and(vec![
            QueryNode::or(vec![QueryNode::keyword("a"), QueryNode::keyword("a2")]),
            QueryNode::keyword("b"),
            QueryNode::keyword("c"),
        ]);
        assert_eq!(QueryNode::edit_distance(&seed, &expanded), 1);
    }
}
