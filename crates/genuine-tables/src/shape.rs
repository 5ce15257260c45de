//! Tag-name skeletons of cell markup.
//!
//! Two cells are shape-equal when their element trees carry the same tag names
//! in the same nesting and order. Text never takes part in the comparison.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A wrapper tag that is ignored without failing the comparison.
    Transparent,
    Element { tag: String, children: Vec<Shape> },
}

impl Shape {
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        matches!(self, Self::Transparent)
    }
}

/// Tags treated as transparent wrappers when extracting shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRules {
    transparent: BTreeSet<String>,
}

impl ShapeRules {
    pub fn new<I, S>(transparent: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            transparent: transparent
                .into_iter()
                .map(|tag| tag.as_ref().trim().to_ascii_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_transparent(&self, tag: &str) -> bool {
        self.transparent.contains(&tag.to_ascii_lowercase())
    }
}

impl Default for ShapeRules {
    fn default() -> Self {
        Self::new(["span"])
    }
}

impl FromStr for ShapeRules {
    type Err = Infallible;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(spec.split(',')))
    }
}

/// Payloads whose markup can be reduced to a [`Shape`].
pub trait TagShape {
    fn tag_shape(&self, rules: &ShapeRules) -> Option<Shape>;
}

impl TagShape for ElementRef<'_> {
    fn tag_shape(&self, rules: &ShapeRules) -> Option<Shape> {
        shape(**self, rules)
    }
}

/// Shape of a markup node. Text and comment nodes have no shape.
#[must_use]
pub fn shape(node: NodeRef<'_, Node>, rules: &ShapeRules) -> Option<Shape> {
    let element = ElementRef::wrap(node)?;
    let tag = element.value().name();
    if rules.is_transparent(tag) {
        return Some(Shape::Transparent);
    }

    let children = node
        .children()
        .filter_map(|child| shape(child, rules))
        .filter(|child| !child.is_transparent())
        .collect();

    Some(Shape::Element {
        tag: tag.to_string(),
        children,
    })
}
