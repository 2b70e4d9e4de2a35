//! Centering of positioned siblings.
//!
//! The `axis` argument throughout is the axis nodes move along: centering a
//! VStack's children horizontally passes [`Axis::Horizontal`].

use tracing::trace;

use super::{Axis, LayoutNode, Rect};

/// Union of every node's bounds. Spacers have none and are skipped.
pub fn union_bounds(nodes: &[LayoutNode]) -> Option<Rect> {
    nodes
        .iter()
        .filter_map(LayoutNode::bounds)
        .reduce(|acc, r| acc.union(&r))
}

/// How far each node would move to share the union's midpoint on `axis`.
/// `None` for nodes without geometry.
pub fn centering_offsets(nodes: &[LayoutNode], axis: Axis) -> Vec<Option<f64>> {
    let Some(union) = union_bounds(nodes) else {
        return vec![None; nodes.len()];
    };
    let target = union.mid(axis);
    nodes
        .iter()
        .map(|node| node.bounds().map(|b| target - b.mid(axis)))
        .collect()
}

/// Center every node on the union of all of them, along `axis`. The union's
/// own midpoint is unchanged. Returns the new union.
pub fn center_siblings(nodes: &mut [LayoutNode], axis: Axis) -> Option<Rect> {
    let offsets = centering_offsets(nodes, axis);
    for (node, offset) in nodes.iter_mut().zip(offsets) {
        let Some(offset) = offset else { continue };
        match axis {
            Axis::Horizontal => node.translate(offset, 0.0),
            Axis::Vertical => node.translate(0.0, offset),
        }
    }
    union_bounds(nodes)
}

/// Shift the whole group so its union is centered in `frame` along `axis`.
///
/// Groups larger than the frame on that axis stay where they are. Returns
/// the shift applied.
pub fn center_within(nodes: &mut [LayoutNode], axis: Axis, frame: Rect) -> Option<f64> {
    let union = union_bounds(nodes)?;
    if union.extent(axis) > frame.extent(axis) {
        trace!(?axis, "content overflows frame; not centering");
        return None;
    }
    let shift = frame.mid(axis) - union.mid(axis);
    for node in nodes.iter_mut() {
        match axis {
            Axis::Horizontal => node.translate(shift, 0.0),
            Axis::Vertical => node.translate(0.0, shift),
        }
    }
    Some(shift)
}
