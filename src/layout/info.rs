//! Serializable layout metadata for debug overlays and tooling.

use serde::Serialize;

use super::{Composition, LayoutNode, Rect};
use crate::style::Color;

/// Everything a composition placed, as plain JSON-friendly data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub width: f64,
    pub height: f64,
    pub background_color: Color,
    /// Union of all placed content.
    pub bounds: Rect,
    pub elements: Vec<ElementInfo>,
}

/// One placed node. Spacers carry no position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elastic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementInfo>,
}

impl LayoutInfo {
    pub fn from_composition(composition: &Composition) -> Self {
        LayoutInfo {
            width: composition.width,
            height: composition.height,
            background_color: composition.background_color,
            bounds: composition.bounds,
            elements: Self::build_element_tree(&composition.nodes),
        }
    }

    fn build_element_tree(nodes: &[LayoutNode]) -> Vec<ElementInfo> {
        nodes
            .iter()
            .map(|node| {
                let bounds = node.bounds();
                let (lines, color): (Vec<String>, Option<Color>) = match node {
                    LayoutNode::Text(block) => (
                        block.lines.iter().map(|l| l.text.clone()).collect(),
                        Some(block.color),
                    ),
                    LayoutNode::Rectangle { fill_color, .. }
                    | LayoutNode::Shape { fill_color, .. } => (Vec::new(), Some(*fill_color)),
                    _ => (Vec::new(), None),
                };
                let (dimension, elastic) = match node {
                    LayoutNode::Spacer { dimension, elastic } => (Some(*dimension), Some(*elastic)),
                    _ => (None, None),
                };
                let text_content = if lines.is_empty() {
                    None
                } else {
                    Some(lines.join(" "))
                };
                ElementInfo {
                    kind: node.kind_name().to_string(),
                    x: bounds.map(|b| b.min_x),
                    y: bounds.map(|b| b.min_y),
                    width: bounds.map(|b| b.width()),
                    height: bounds.map(|b| b.height()),
                    text_content,
                    lines,
                    dimension,
                    elastic,
                    color,
                    children: Self::build_element_tree(node.children()),
                }
            })
            .collect()
    }
}
