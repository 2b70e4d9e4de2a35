//! # Layout Resolver
//!
//! Turns a content tree and a canvas frame into absolutely positioned
//! geometry.
//!
//! ## How sizing works
//!
//! Nothing in a content tree has a size of its own except rectangles and
//! fixed spacers. Everything else answers a question: "given this much room,
//! how big would you be?" The resolver asks that question through a probe
//! function with per-kind rules (text wraps, images scale to fit, shapes scale
//! to the smaller side of the proposal, stacks ask their own children), and
//! the negotiator in [`flex`] uses the answers to divide each stack's budget.
//!
//! 1. For a stack, probe every child at zero and at an unbounded proposal to
//!    learn its flexibility.
//! 2. Size the children from least to most flexible, each offered an equal
//!    share of the unclaimed budget.
//! 3. Walk the children in document order, placing each in its allotted slot
//!    and recursing into nested stacks with that slot as their frame.
//! 4. Recenter the placed children if the stack's alignment asks for it.
//!
//! Probe answers are memoized for the duration of one pass, keyed by node
//! identity, proposal and direction, since step 1 and step 2 ask the same
//! nested stacks the same questions many times.

pub mod align;
pub mod flex;
pub mod info;

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{PlacardError, Result};
use crate::image_loader::ImageHandle;
use crate::model::{sanitize, Content, Document, Edges};
use crate::style::{Alignment, Color, FontSpec, Point};
use crate::svg::{PathGeometry, PathHandle};
use crate::text::{TextLayout, TextLine, TextMeasurer};

// ── Geometry ────────────────────────────────────────────────────────

/// An axis-aligned box in canvas coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// The box a stack lays its children out in.
pub type Frame = Rect;

impl Rect {
    pub const ZERO: Rect = Rect {
        min_x: 0.0,
        max_x: 0.0,
        min_y: 0.0,
        max_y: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x,
            max_x: x + width,
            min_y: y,
            max_y: y + height,
        }
    }

    /// A zero-size box at a point.
    pub fn at(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn mid_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        (self.min_y + self.max_y) / 2.0
    }

    pub fn mid(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.mid_x(),
            Axis::Vertical => self.mid_y(),
        }
    }

    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width(),
            Axis::Vertical => self.height(),
        }
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.min_x += dx;
        self.max_x += dx;
        self.min_y += dy;
        self.max_y += dy;
    }

    /// Shrink by `edges`, never past an empty box at the top-left corner.
    pub fn inset(&self, edges: &Edges) -> Rect {
        let min_x = self.min_x + sanitize(edges.left);
        let min_y = self.min_y + sanitize(edges.top);
        Rect {
            min_x,
            max_x: (self.max_x - sanitize(edges.right)).max(min_x),
            min_y,
            max_y: (self.max_y - sanitize(edges.bottom)).max(min_y),
        }
    }
}

/// A width/height pair: a proposal going down, a measurement coming back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The main axis of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn extent(self, size: Size) -> f64 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }
}

/// The context an item is sized in: along a stack's axis, or overlaid on a
/// frame where both axes are constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
    Overlay,
}

// ── Layout tree ─────────────────────────────────────────────────────

/// A wrapped, positioned paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Lines in absolute canvas coordinates.
    pub lines: Vec<TextLine>,
    pub font: FontSpec,
    pub color: Color,
    /// Union of the line boxes.
    pub bounds: Rect,
}

/// A positioned node. Mirrors the content kinds, plus composites for stacks.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Text(TextBlock),
    /// Space taken along the stack axis. Spacers have no geometry.
    Spacer {
        dimension: f64,
        elastic: bool,
    },
    Image {
        image: ImageHandle,
        bounds: Rect,
        rounded: bool,
    },
    Rectangle {
        bounds: Rect,
        fill_color: Color,
    },
    /// Paint a path point `p` at `bounds.min + (p - origin) * scale`.
    Shape {
        paths: Vec<PathHandle>,
        fill_color: Color,
        scale: f64,
        /// Offset of the shape within its slot.
        offset: Point,
        /// Top-left of the unscaled path geometry.
        origin: Point,
        bounds: Rect,
    },
    LinearGradient {
        colors: Vec<Color>,
        start: Point,
        end: Point,
        bounds: Rect,
    },
    /// Output of an HStack.
    Row {
        children: Vec<LayoutNode>,
        bounds: Rect,
    },
    /// Output of a VStack or ZStack.
    Stack {
        children: Vec<LayoutNode>,
        bounds: Rect,
    },
}

impl LayoutNode {
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            LayoutNode::Text(block) => Some(block.bounds),
            LayoutNode::Spacer { .. } => None,
            LayoutNode::Image { bounds, .. }
            | LayoutNode::Rectangle { bounds, .. }
            | LayoutNode::Shape { bounds, .. }
            | LayoutNode::LinearGradient { bounds, .. }
            | LayoutNode::Row { bounds, .. }
            | LayoutNode::Stack { bounds, .. } => Some(*bounds),
        }
    }

    pub fn children(&self) -> &[LayoutNode] {
        match self {
            LayoutNode::Row { children, .. } | LayoutNode::Stack { children, .. } => children,
            _ => &[],
        }
    }

    /// Shift this node and everything inside it (children, text lines,
    /// gradient endpoints).
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            LayoutNode::Text(block) => {
                block.bounds.translate(dx, dy);
                for line in &mut block.lines {
                    line.left += dx;
                    line.top += dy;
                    line.baseline += dy;
                    line.bottom += dy;
                }
            }
            LayoutNode::Spacer { .. } => {}
            LayoutNode::Image { bounds, .. }
            | LayoutNode::Rectangle { bounds, .. }
            | LayoutNode::Shape { bounds, .. } => bounds.translate(dx, dy),
            LayoutNode::LinearGradient {
                start, end, bounds, ..
            } => {
                bounds.translate(dx, dy);
                for p in [start, end] {
                    p.x += dx;
                    p.y += dy;
                }
            }
            LayoutNode::Row { children, bounds } | LayoutNode::Stack { children, bounds } => {
                bounds.translate(dx, dy);
                for child in children {
                    child.translate(dx, dy);
                }
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            LayoutNode::Text(_) => "Text",
            LayoutNode::Spacer { .. } => "Spacer",
            LayoutNode::Image { .. } => "Image",
            LayoutNode::Rectangle { .. } => "Rectangle",
            LayoutNode::Shape { .. } => "Shape",
            LayoutNode::LinearGradient { .. } => "LinearGradient",
            LayoutNode::Row { .. } => "Row",
            LayoutNode::Stack { .. } => "Stack",
        }
    }
}

/// Positioned nodes plus their aggregate box.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub nodes: Vec<LayoutNode>,
    pub bounds: Rect,
}

impl Resolved {
    /// Bounds are the union of `nodes`, or a zero box at `origin` when none
    /// of them has geometry.
    fn collect(nodes: Vec<LayoutNode>, origin: (f64, f64)) -> Self {
        let bounds = align::union_bounds(&nodes).unwrap_or_else(|| Rect::at(origin.0, origin.1));
        Self { nodes, bounds }
    }
}

/// A finished canvas, ready for a paint stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub nodes: Vec<LayoutNode>,
    pub bounds: Rect,
    pub width: f64,
    pub height: f64,
    pub background_color: Color,
}

// ── Engine ──────────────────────────────────────────────────────────

/// The layout engine. Holds shared references to its collaborators only, so
/// one engine can serve any number of renders.
pub struct LayoutEngine<'a> {
    measurer: &'a dyn TextMeasurer,
    paths: &'a dyn PathGeometry,
    text_layout: TextLayout,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, paths: &'a dyn PathGeometry) -> Self {
        Self {
            measurer,
            paths,
            text_layout: TextLayout::new(),
        }
    }

    /// Lay out a document on its canvas: resolve the content within the
    /// inset frame, then apply the canvas's global centering.
    ///
    /// Global centering moves the composition as one group, so siblings keep
    /// their positions relative to each other.
    pub fn compose(&self, document: &Document) -> Result<Composition> {
        let canvas = &document.canvas;
        let frame = canvas.content_frame();
        let Resolved { mut nodes, .. } =
            self.resolve(&document.content, frame, Alignment::default())?;

        for (axis, wanted) in [
            (Axis::Horizontal, canvas.center_x),
            (Axis::Vertical, canvas.center_y),
        ] {
            if wanted {
                align::center_within(&mut nodes, axis, frame);
            }
        }

        let bounds =
            align::union_bounds(&nodes).unwrap_or_else(|| Rect::at(frame.min_x, frame.min_y));
        debug!(
            nodes = nodes.len(),
            width = bounds.width(),
            height = bounds.height(),
            "composed canvas"
        );
        Ok(Composition {
            nodes,
            bounds,
            width: sanitize(canvas.width),
            height: sanitize(canvas.height),
            background_color: canvas.background_color,
        })
    }

    /// Resolve `content` within `frame`.
    ///
    /// A stack's children are returned directly rather than wrapped in a
    /// composite. Any other kind is sized as if overlaid on the frame and
    /// placed at its top-left corner.
    pub fn resolve(&self, content: &Content, frame: Frame, alignment: Alignment) -> Result<Resolved> {
        let pass = self.pass();
        match content {
            Content::HStack { .. } | Content::VStack { .. } | Content::ZStack { .. } => {
                pass.layout_stack(content, frame, alignment)
            }
            _ => {
                let size = flex::Probe::probe(&pass, content, frame.size(), Direction::Overlay)?;
                let slot = Rect::new(frame.min_x, frame.min_y, size.width, size.height);
                let mut nodes = Vec::new();
                pass.place(content, slot, frame, alignment, Direction::Overlay, &mut nodes)?;
                Ok(Resolved::collect(nodes, (frame.min_x, frame.min_y)))
            }
        }
    }

    /// Size a single node against a proposal.
    pub fn size_of(&self, content: &Content, proposed: Size, direction: Direction) -> Result<Size> {
        flex::Probe::probe(&self.pass(), content, proposed, direction)
    }

    /// Negotiate sizes for a sibling list, as a stack along `axis` would.
    pub fn allot(&self, items: &[Content], axis: Axis, proposed: Size) -> Result<Vec<Size>> {
        flex::allot(items, axis, proposed, &self.pass())
    }

    fn pass(&self) -> Pass<'_> {
        Pass {
            measurer: self.measurer,
            paths: self.paths,
            text_layout: &self.text_layout,
            probes: RefCell::new(HashMap::new()),
        }
    }
}

/// (node address, proposed width bits, proposed height bits, direction)
type ProbeKey = (usize, u64, u64, Direction);

/// State for one render. The probe cache keys on node addresses, which are
/// stable because the content tree stays borrowed for the whole pass.
struct Pass<'a> {
    measurer: &'a dyn TextMeasurer,
    paths: &'a dyn PathGeometry,
    text_layout: &'a TextLayout,
    probes: RefCell<HashMap<ProbeKey, Size>>,
}

impl flex::Probe for Pass<'_> {
    fn probe(&self, item: &Content, proposed: Size, direction: Direction) -> Result<Size> {
        let proposed = Size::new(sanitize(proposed.width), sanitize(proposed.height));
        let key = (
            item as *const Content as usize,
            proposed.width.to_bits(),
            proposed.height.to_bits(),
            direction,
        );
        let cached = self.probes.borrow().get(&key).copied();
        if let Some(size) = cached {
            return Ok(size);
        }

        let size = self.measure(item, proposed, direction)?;
        trace!(
            kind = item.kind_name(),
            ?direction,
            proposed_w = proposed.width,
            proposed_h = proposed.height,
            width = size.width,
            height = size.height,
            "probe"
        );
        self.probes.borrow_mut().insert(key, size);
        Ok(size)
    }
}

impl Pass<'_> {
    /// The per-kind sizing rules.
    fn measure(&self, item: &Content, proposed: Size, direction: Direction) -> Result<Size> {
        match item {
            Content::Spacer { dimension } => {
                let along = dimension.map(sanitize).unwrap_or(f64::INFINITY);
                let width = match direction {
                    Direction::Horizontal | Direction::Overlay => proposed.width.min(along),
                    Direction::Vertical => 0.0,
                };
                let height = match direction {
                    Direction::Vertical | Direction::Overlay => proposed.height.min(along),
                    Direction::Horizontal => 0.0,
                };
                Ok(Size::new(width, height))
            }

            Content::Rectangle { width, height, .. } => {
                Ok(Size::new(sanitize(*width), sanitize(*height)))
            }

            Content::Text {
                text,
                font,
                paragraph_alignment,
                ..
            } => {
                let paragraph = self.text_layout.layout_paragraph(
                    self.measurer,
                    text,
                    font,
                    *paragraph_alignment,
                    proposed.width,
                )?;
                if paragraph.is_empty() {
                    Ok(Size::ZERO)
                } else if direction == Direction::Overlay {
                    Ok(Size::new(proposed.width, paragraph.height.ceil()))
                } else {
                    Ok(Size::new(paragraph.width.ceil(), paragraph.height.ceil()))
                }
            }

            Content::Image {
                image,
                grow,
                max_width,
                max_height,
                ..
            } => Ok(image_size(
                image,
                *grow,
                (*max_width, *max_height),
                proposed,
                direction == Direction::Overlay,
            )),

            Content::Shape { paths, scale, .. } => {
                let Some(bounds) = self.shape_bounds(paths)? else {
                    return Ok(Size::ZERO);
                };
                let s = shape_scale(&bounds, *scale, proposed);
                Ok(Size::new(bounds.width() * s, bounds.height() * s))
            }

            Content::LinearGradient { .. } => Ok(match direction {
                Direction::Overlay => proposed,
                _ => Size::ZERO,
            }),

            Content::HStack {
                children,
                max_width,
                inset,
                ..
            } => {
                let width = clamp_measure(proposed.width, *max_width);
                let inner = Size::new(
                    (width - inset.horizontal()).max(0.0),
                    (proposed.height - inset.vertical()).max(0.0),
                );
                let sizes = flex::allot(children, Axis::Horizontal, inner, self)?;
                Ok(Size::new(
                    sizes.iter().map(|s| s.width).sum::<f64>() + inset.horizontal(),
                    sizes.iter().map(|s| s.height).fold(0.0, f64::max) + inset.vertical(),
                ))
            }

            Content::VStack {
                children,
                max_width,
                ..
            } => {
                let width = clamp_measure(proposed.width, *max_width);
                let sizes = flex::allot(
                    children,
                    Axis::Vertical,
                    Size::new(width, proposed.height),
                    self,
                )?;
                Ok(Size::new(
                    sizes.iter().map(|s| s.width).fold(0.0, f64::max),
                    sizes.iter().map(|s| s.height).sum(),
                ))
            }

            Content::ZStack { .. } => Ok(proposed),
        }
    }

    /// Union of the tight bounds of every path source; `None` for no sources.
    /// Bounds whose extents are not finite are rejected as invalid paths.
    fn shape_bounds(&self, paths: &[String]) -> Result<Option<Rect>> {
        let mut acc: Option<Rect> = None;
        for source in paths {
            let bounds = self.paths.tight_bounds(source)?;
            if !(bounds.width().is_finite() && bounds.height().is_finite()) {
                return Err(PlacardError::invalid_path(source, "path extends past finite coordinates"));
            }
            acc = Some(match acc {
                Some(r) => r.union(&bounds),
                None => bounds,
            });
        }
        Ok(acc)
    }

    /// Lay out a stack's children inside `frame` and recenter them as the
    /// stack's alignment asks.
    fn layout_stack(&self, content: &Content, frame: Frame, inherited: Alignment) -> Result<Resolved> {
        let mut nodes = Vec::new();
        let origin;

        match content {
            Content::HStack {
                children,
                alignment,
                max_width,
                inset,
            } => {
                let alignment = alignment.unwrap_or(inherited);
                let mut outer = frame;
                outer.max_x = outer.min_x + clamp_measure(frame.width(), *max_width);
                let inner = outer.inset(inset);
                origin = (inner.min_x, inner.min_y);

                let sizes = flex::allot(children, Axis::Horizontal, inner.size(), self)?;
                let mut cursor = inner.min_x;
                for (child, size) in children.iter().zip(&sizes) {
                    let slot = Rect::new(cursor, inner.min_y, size.width, size.height);
                    self.place(child, slot, inner, alignment, Direction::Horizontal, &mut nodes)?;
                    if !matches!(child, Content::LinearGradient { .. }) {
                        cursor += size.width;
                    }
                }
                if alignment.centers_y() {
                    align::center_siblings(&mut nodes, Axis::Vertical);
                }
                debug!(children = children.len(), ?alignment, "resolved hstack");
            }

            Content::VStack {
                children,
                alignment,
                max_width,
            } => {
                let alignment = alignment.unwrap_or(inherited);
                let mut inner = frame;
                inner.max_x = inner.min_x + clamp_measure(frame.width(), *max_width);
                origin = (inner.min_x, inner.min_y);

                let sizes = flex::allot(children, Axis::Vertical, inner.size(), self)?;
                let mut cursor = inner.min_y;
                for (child, size) in children.iter().zip(&sizes) {
                    let slot = Rect::new(inner.min_x, cursor, size.width, size.height);
                    self.place(child, slot, inner, alignment, Direction::Vertical, &mut nodes)?;
                    if !matches!(child, Content::LinearGradient { .. }) {
                        cursor += size.height;
                    }
                }
                if alignment.centers_x() {
                    align::center_siblings(&mut nodes, Axis::Horizontal);
                }
                debug!(children = children.len(), ?alignment, "resolved vstack");
            }

            Content::ZStack {
                children,
                alignment,
            } => {
                origin = (frame.min_x, frame.min_y);
                for child in children {
                    let size = flex::Probe::probe(self, child, frame.size(), Direction::Overlay)?;
                    let slot = Rect::new(frame.min_x, frame.min_y, size.width, size.height);
                    self.place(child, slot, frame, *alignment, Direction::Overlay, &mut nodes)?;
                }
                if alignment.centers_x() {
                    align::center_siblings(&mut nodes, Axis::Horizontal);
                }
                if alignment.centers_y() {
                    align::center_siblings(&mut nodes, Axis::Vertical);
                }
                debug!(children = children.len(), ?alignment, "resolved zstack");
            }

            // Primitives are placed by their container.
            _ => origin = (frame.min_x, frame.min_y),
        }

        Ok(Resolved::collect(nodes, origin))
    }

    /// Emit the layout node for `item` in its allotted `slot`. `frame` is the
    /// frame of the container being resolved.
    fn place(
        &self,
        item: &Content,
        slot: Rect,
        frame: Frame,
        alignment: Alignment,
        direction: Direction,
        out: &mut Vec<LayoutNode>,
    ) -> Result<()> {
        match item {
            Content::Spacer { dimension } => {
                let extent = match direction {
                    Direction::Horizontal => slot.width(),
                    Direction::Vertical => slot.height(),
                    Direction::Overlay => slot.width().min(slot.height()),
                };
                out.push(LayoutNode::Spacer {
                    dimension: extent,
                    elastic: dimension.is_none(),
                });
            }

            Content::Rectangle { fill_color, .. } => out.push(LayoutNode::Rectangle {
                bounds: slot,
                fill_color: *fill_color,
            }),

            Content::Text {
                text,
                font,
                color,
                paragraph_alignment,
            } => {
                let paragraph = self.text_layout.layout_paragraph(
                    self.measurer,
                    text,
                    font,
                    *paragraph_alignment,
                    slot.width(),
                )?;
                if paragraph.is_empty() {
                    return Ok(());
                }
                let mut lines = paragraph.lines;
                let mut bounds: Option<Rect> = None;
                for line in &mut lines {
                    line.left += slot.min_x;
                    line.top += slot.min_y;
                    line.baseline += slot.min_y;
                    line.bottom += slot.min_y;
                    let line_box = Rect {
                        min_x: line.left,
                        max_x: line.left + line.width,
                        min_y: line.top,
                        max_y: line.bottom,
                    };
                    bounds = Some(bounds.map_or(line_box, |b| b.union(&line_box)));
                }
                out.push(LayoutNode::Text(TextBlock {
                    lines,
                    font: font.clone(),
                    color: *color,
                    bounds: bounds.unwrap_or_else(|| Rect::at(slot.min_x, slot.min_y)),
                }));
            }

            Content::Image { image, rounded, .. } => out.push(LayoutNode::Image {
                image: image.clone(),
                bounds: slot,
                rounded: *rounded,
            }),

            Content::Shape {
                paths,
                fill_color,
                offset_x_fraction,
                offset_y_fraction,
                scale,
            } => {
                let Some(path_bounds) = self.shape_bounds(paths)? else {
                    return Ok(());
                };
                let viewport = frame.size();
                let s = shape_scale(&path_bounds, *scale, viewport);
                let scaled = Size::new(path_bounds.width() * s, path_bounds.height() * s);
                let offset = Point::new(
                    finite(*offset_x_fraction) * (viewport.width - scaled.width),
                    finite(*offset_y_fraction) * (viewport.height - scaled.height),
                );
                let handles = paths
                    .iter()
                    .map(|source| self.paths.materialize(source))
                    .collect::<Result<Vec<_>>>()?;
                out.push(LayoutNode::Shape {
                    paths: handles,
                    fill_color: *fill_color,
                    scale: s,
                    offset,
                    origin: Point::new(path_bounds.min_x, path_bounds.min_y),
                    bounds: Rect::new(
                        slot.min_x + offset.x,
                        slot.min_y + offset.y,
                        scaled.width,
                        scaled.height,
                    ),
                });
            }

            Content::LinearGradient {
                colors,
                start_point,
                end_point,
            } => {
                if colors.is_empty() {
                    return Ok(());
                }
                let absolute = |p: &Point| {
                    Point::new(
                        frame.min_x + finite(p.x) * frame.width(),
                        frame.min_y + finite(p.y) * frame.height(),
                    )
                };
                out.push(LayoutNode::LinearGradient {
                    colors: colors.clone(),
                    start: absolute(start_point),
                    end: absolute(end_point),
                    bounds: frame,
                });
            }

            Content::HStack { .. } => {
                let Resolved { nodes, bounds } = self.layout_stack(item, slot, alignment)?;
                out.push(LayoutNode::Row {
                    children: nodes,
                    bounds,
                });
            }

            Content::VStack { .. } | Content::ZStack { .. } => {
                let Resolved { nodes, bounds } = self.layout_stack(item, slot, alignment)?;
                out.push(LayoutNode::Stack {
                    children: nodes,
                    bounds,
                });
            }
        }
        Ok(())
    }
}

/// Clamp a stack's measure by its optional `maxWidth`.
fn clamp_measure(width: f64, max_width: Option<f64>) -> f64 {
    match max_width {
        Some(limit) => width.min(sanitize(limit)),
        None => width,
    }
}

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Scale an image into the room it is offered. Images that don't grow never
/// exceed their natural size; overlaid images cover rather than fit.
fn image_size(
    image: &ImageHandle,
    grow: bool,
    (max_width, max_height): (Option<f64>, Option<f64>),
    proposed: Size,
    cover: bool,
) -> Size {
    let natural = Size::new(image.natural_width(), image.natural_height());
    if !(natural.width > 0.0 && natural.height > 0.0) {
        return Size::ZERO;
    }
    let limit = |proposed: f64, cap: Option<f64>, natural: f64| {
        let mut m = proposed;
        if let Some(cap) = cap {
            m = m.min(sanitize(cap));
        }
        if !grow {
            m = m.min(natural);
        }
        m
    };
    let sx = limit(proposed.width, max_width, natural.width) / natural.width;
    let sy = limit(proposed.height, max_height, natural.height) / natural.height;
    let scale = if cover { sx.max(sy) } else { sx.min(sy) };
    Size::new(natural.width * scale, natural.height * scale)
}

/// Scale factor mapping path geometry onto the smaller side of `viewport`.
fn shape_scale(bounds: &Rect, factor: f64, viewport: Size) -> f64 {
    let (w, h) = (bounds.width(), bounds.height());
    let reference = if w.min(h) > 0.0 { w.min(h) } else { w.max(h) };
    if !(reference > 0.0) {
        return 0.0;
    }
    sanitize(factor) * viewport.width.min(viewport.height) / reference
}
