//! # Content Model
//!
//! The input representation for the layout core. A poster is a tree of
//! primitives (text, spacers, images, rectangles, vector shapes, gradients)
//! arranged by three containers: horizontal, vertical and overlay stacks.
//!
//! The tree is immutable input data. Every node is exclusively owned by its
//! parent, so there is no sharing and no cycles; layout borrows it for the
//! duration of one render and never hands pieces of it back.

use serde::{Deserialize, Serialize};

use crate::image_loader::ImageHandle;
use crate::layout::Rect;
use crate::style::{Alignment, Color, FontSpec, Point, TextAlign};

/// A complete render request: canvas options plus the root content node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Canvas size, insets and global centering.
    #[serde(default)]
    pub canvas: Canvas,
    /// The root of the content tree. Usually a stack.
    pub content: Content,
}

/// Canvas configuration for one render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    /// Canvas width in pixels.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Canvas height in pixels.
    #[serde(default = "default_height")]
    pub height: f64,
    /// Horizontal margin on both sides of the content frame.
    #[serde(default)]
    pub inset_x: f64,
    /// Vertical margin above and below the content frame.
    #[serde(default)]
    pub inset_y: f64,
    /// Center the composition horizontally within the content frame.
    #[serde(default)]
    pub center_x: bool,
    /// Center the composition vertically within the content frame.
    #[serde(default)]
    pub center_y: bool,
    /// Fill color for the whole canvas. Only the paint stage uses it.
    #[serde(default = "default_background")]
    pub background_color: Color,
}

fn default_width() -> f64 {
    1200.0
}

fn default_height() -> f64 {
    630.0
}

fn default_background() -> Color {
    Color::hex("#eeeeee")
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            inset_x: 0.0,
            inset_y: 0.0,
            center_x: false,
            center_y: false,
            background_color: default_background(),
        }
    }
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// The area content is laid out in: the canvas minus its insets.
    /// Degenerate sizes collapse to an empty frame at the inset origin.
    pub fn content_frame(&self) -> Rect {
        let min_x = sanitize(self.inset_x);
        let min_y = sanitize(self.inset_y);
        let max_x = (sanitize(self.width) - min_x).max(min_x);
        let max_y = (sanitize(self.height) - min_y).max(min_y);
        Rect {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

/// Clamp a caller-provided measure to a finite, non-negative value.
pub(crate) fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Margins around a stack's content, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "InsetRepr")]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Accepted JSON spellings of an inset: `12`, `{ "x": 8, "y": 4 }` or
/// `{ "l": 1, "r": 2, "t": 3, "b": 4 }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum InsetRepr {
    Uniform(f64),
    Axes { x: f64, y: f64 },
    Sides { l: f64, r: f64, t: f64, b: f64 },
    Edges {
        top: f64,
        right: f64,
        bottom: f64,
        left: f64,
    },
}

impl From<InsetRepr> for Edges {
    fn from(repr: InsetRepr) -> Self {
        match repr {
            InsetRepr::Uniform(v) => Edges::uniform(v),
            InsetRepr::Axes { x, y } => Edges::symmetric(y, x),
            InsetRepr::Sides { l, r, t, b } => Edges {
                top: t,
                right: r,
                bottom: b,
                left: l,
            },
            InsetRepr::Edges {
                top,
                right,
                bottom,
                left,
            } => Edges {
                top,
                right,
                bottom,
                left,
            },
        }
    }
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        sanitize(self.left) + sanitize(self.right)
    }

    pub fn vertical(&self) -> f64 {
        sanitize(self.top) + sanitize(self.bottom)
    }
}

/// A node in the content tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Content {
    /// A paragraph of text in a single font.
    Text {
        text: String,
        font: FontSpec,
        #[serde(default)]
        color: Color,
        #[serde(default, alias = "multilineTextAlignment")]
        paragraph_alignment: TextAlign,
    },

    /// Empty space. Without a dimension it absorbs leftover space.
    Spacer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimension: Option<f64>,
    },

    /// A decoded raster image.
    Image {
        #[serde(alias = "src")]
        image: ImageHandle,
        /// Scale up to fill the available space (never upscales when false).
        #[serde(default)]
        grow: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_height: Option<f64>,
        /// Clip to the inscribed ellipse when painting.
        #[serde(default)]
        rounded: bool,
    },

    /// A solid rectangle of fixed size.
    Rectangle {
        width: f64,
        height: f64,
        fill_color: Color,
    },

    /// Vector paths scaled relative to the container they sit in.
    Shape {
        #[serde(alias = "svgPaths")]
        paths: Vec<String>,
        fill_color: Color,
        /// Fraction of the horizontal leftover space placed before the shape.
        #[serde(default = "half")]
        offset_x_fraction: f64,
        /// Fraction of the vertical leftover space placed above the shape.
        #[serde(default)]
        offset_y_fraction: f64,
        #[serde(default = "one")]
        scale: f64,
    },

    /// A linear gradient filling its container's frame.
    LinearGradient {
        colors: Vec<Color>,
        start_point: Point,
        end_point: Point,
    },

    /// Children placed left to right.
    #[serde(rename = "hstack")]
    HStack {
        #[serde(default)]
        children: Vec<Content>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alignment: Option<Alignment>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<f64>,
        #[serde(default)]
        inset: Edges,
    },

    /// Children placed top to bottom.
    #[serde(rename = "vstack")]
    VStack {
        #[serde(default)]
        children: Vec<Content>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alignment: Option<Alignment>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<f64>,
    },

    /// Children placed on top of each other.
    #[serde(rename = "zstack")]
    ZStack {
        #[serde(default)]
        children: Vec<Content>,
        #[serde(default = "center")]
        alignment: Alignment,
    },
}

fn half() -> f64 {
    0.5
}

fn one() -> f64 {
    1.0
}

fn center() -> Alignment {
    Alignment::Center
}

impl Content {
    /// Create a leading-aligned text node.
    pub fn text(text: &str, font: FontSpec, color: Color) -> Self {
        Content::Text {
            text: text.to_string(),
            font,
            color,
            paragraph_alignment: TextAlign::Leading,
        }
    }

    /// Create an elastic spacer.
    pub fn spacer() -> Self {
        Content::Spacer { dimension: None }
    }

    /// Create a spacer of fixed extent.
    pub fn fixed_spacer(dimension: f64) -> Self {
        Content::Spacer {
            dimension: Some(dimension),
        }
    }

    pub fn rectangle(width: f64, height: f64, fill_color: Color) -> Self {
        Content::Rectangle {
            width,
            height,
            fill_color,
        }
    }

    /// Create an image that never upscales.
    pub fn image(image: ImageHandle) -> Self {
        Content::Image {
            image,
            grow: false,
            max_width: None,
            max_height: None,
            rounded: false,
        }
    }

    /// Create a shape centered horizontally and pinned to the top.
    pub fn shape(paths: Vec<String>, fill_color: Color) -> Self {
        Content::Shape {
            paths,
            fill_color,
            offset_x_fraction: 0.5,
            offset_y_fraction: 0.0,
            scale: 1.0,
        }
    }

    pub fn linear_gradient(colors: Vec<Color>, start_point: Point, end_point: Point) -> Self {
        Content::LinearGradient {
            colors,
            start_point,
            end_point,
        }
    }

    pub fn hstack(children: Vec<Content>) -> Self {
        Content::HStack {
            children,
            alignment: None,
            max_width: None,
            inset: Edges::default(),
        }
    }

    pub fn vstack(children: Vec<Content>) -> Self {
        Content::VStack {
            children,
            alignment: None,
            max_width: None,
        }
    }

    pub fn zstack(children: Vec<Content>) -> Self {
        Content::ZStack {
            children,
            alignment: Alignment::Center,
        }
    }

    /// Set the alignment of a stack. No effect on other kinds.
    pub fn aligned(mut self, value: Alignment) -> Self {
        match &mut self {
            Content::HStack { alignment, .. } | Content::VStack { alignment, .. } => {
                *alignment = Some(value)
            }
            Content::ZStack { alignment, .. } => *alignment = value,
            _ => {}
        }
        self
    }

    /// Clamp the measure of an HStack or VStack. No effect on other kinds.
    pub fn max_width(mut self, value: f64) -> Self {
        if let Content::HStack { max_width, .. } | Content::VStack { max_width, .. } = &mut self {
            *max_width = Some(value);
        }
        self
    }

    /// Set the inset of an HStack. No effect on other kinds.
    pub fn inset(mut self, value: Edges) -> Self {
        if let Content::HStack { inset, .. } = &mut self {
            *inset = value;
        }
        self
    }

    /// Child nodes of a stack; empty for primitives.
    pub fn children(&self) -> &[Content] {
        match self {
            Content::HStack { children, .. }
            | Content::VStack { children, .. }
            | Content::ZStack { children, .. } => children,
            _ => &[],
        }
    }

    /// Is this a spacer, fixed or elastic?
    pub fn is_spacer(&self) -> bool {
        matches!(self, Content::Spacer { .. })
    }

    /// Is this a spacer without an explicit dimension?
    pub fn is_elastic_spacer(&self) -> bool {
        matches!(self, Content::Spacer { dimension: None })
    }

    /// Does this node, or any stack descendant, contain an image that grows?
    pub fn is_growable(&self) -> bool {
        match self {
            Content::Image { grow, .. } => *grow,
            Content::HStack { children, .. }
            | Content::VStack { children, .. }
            | Content::ZStack { children, .. } => children.iter().any(Content::is_growable),
            _ => false,
        }
    }

    /// Human-readable name of the node kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Content::Text { .. } => "Text",
            Content::Spacer { .. } => "Spacer",
            Content::Image { .. } => "Image",
            Content::Rectangle { .. } => "Rectangle",
            Content::Shape { .. } => "Shape",
            Content::LinearGradient { .. } => "LinearGradient",
            Content::HStack { .. } => "HStack",
            Content::VStack { .. } => "VStack",
            Content::ZStack { .. } => "ZStack",
        }
    }
}
