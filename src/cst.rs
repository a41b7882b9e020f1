use crate::Position;
use ptree::TreeItem;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};

#[derive(Debug, Clone)]
/// The result of evaluating a rule: either absence (discarded keywords,
/// an unmatched [optional](crate::Rule::optional)), a captured node, a list
/// (from a [sequence](crate::Rule::sequence) of more than one captured
/// child, or a [repetition](crate::Rule::repeated)), or a terminal scalar.
pub enum CstValue {
    None,
    Node(CstNode),
    List(Vec<CstValue>),
    Str(String),
    Number(f64),
}

impl CstValue {
    pub fn is_none(&self) -> bool {
        matches!(self, CstValue::None)
    }

    pub fn as_node(&self) -> Option<&CstNode> {
        match self {
            CstValue::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CstValue]> {
        match self {
            CstValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CstValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CstValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// A CST node produced by a [captured](crate::Rule::capture) rule: a string
/// tag plus the value of the rule it wraps. `position` is set only when the
/// parser is constructed with `debug = true`.
pub struct CstNode {
    pub node_type: String,
    pub value: Box<CstValue>,
    pub position: Option<Position>,
}

impl CstNode {
    pub fn new(node_type: impl Into<String>, value: CstValue, position: Option<Position>) -> Self {
        Self {
            node_type: node_type.into(),
            value: Box::new(value),
            position,
        }
    }

    /// Depth-first search for the first descendant (including self) tagged
    /// `node_type`.
    pub fn find(&self, node_type: &str) -> Option<&CstNode> {
        if self.node_type == node_type {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(node_type))
    }

    /// All descendants (including self) tagged `node_type`, in document order.
    pub fn find_all(&self, node_type: &str) -> Vec<&CstNode> {
        let mut found = Vec::new();
        self.walk(&mut found, node_type);
        found
    }

    fn walk<'a>(&'a self, found: &mut Vec<&'a CstNode>, node_type: &str) {
        if self.node_type == node_type {
            found.push(self);
        }
        for child in self.children() {
            child.walk(found, node_type);
        }
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.find(node_type).is_some()
    }

    /// Direct child CST nodes, looking through `List`/`None` wrapping.
    pub fn children(&self) -> Vec<&CstNode> {
        fn collect<'a>(value: &'a CstValue, out: &mut Vec<&'a CstNode>) {
            match value {
                CstValue::Node(n) => out.push(n),
                CstValue::List(items) => {
                    for item in items {
                        collect(item, out);
                    }
                }
                CstValue::Str(_) | CstValue::Number(_) | CstValue::None => {}
            }
        }
        let mut out = Vec::new();
        collect(&self.value, &mut out);
        out
    }

    pub fn print(&self) -> std::io::Result<()> {
        ptree::print_tree(self)
    }
}

impl TreeItem for CstNode {
    type Child = CstNode;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _style: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.node_type)?;
        match self.value.as_ref() {
            CstValue::Str(s) => write!(f, " # {:?}", s)?,
            CstValue::Number(n) => write!(f, " # {}", n)?,
            _ => {}
        }
        Ok(())
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(self.children().into_iter().cloned().collect::<Vec<_>>())
    }
}

impl std::fmt::Display for CstValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CstValue::None => write!(f, "<none>"),
            CstValue::Node(n) => write!(f, "{:?}", n),
            CstValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            CstValue::Str(s) => write!(f, "{:?}", s),
            CstValue::Number(n) => write!(f, "{}", n),
        }
    }
}
