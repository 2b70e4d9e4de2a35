//! # Size Negotiation
//!
//! Divides a stack's budget among its children by flexibility.
//!
//! Every child is probed twice, against a zero and an effectively unbounded
//! proposal, to learn how far it can stretch. Children are then sized from the
//! least flexible to the most, each offered an equal share of whatever is
//! still unclaimed. Rigid children take what they need first and the slack
//! pools toward the ones that can use it.
//!
//! Horizontally, growable images (and stacks holding one) get first claim and
//! elastic spacers are sized last, after everything else has settled.
//! Vertically every non-spacer is sized before any spacer, and while
//! non-spacers remain unsized the remainder is divided among those only.

use tracing::debug;

use super::{Axis, Direction, Size};
use crate::error::Result;
use crate::model::{sanitize, Content};

/// The proposal used for the upper flexibility probe.
pub const UNBOUNDED: f64 = 1e15;

/// Sizes a content node against a proposal.
///
/// The layout engine implements this with its memoized per-kind rules; tests
/// and callers with their own sizing can pass a closure.
pub trait Probe {
    fn probe(&self, item: &Content, proposed: Size, direction: Direction) -> Result<Size>;
}

impl<F> Probe for F
where
    F: Fn(&Content, Size, Direction) -> Result<Size>,
{
    fn probe(&self, item: &Content, proposed: Size, direction: Direction) -> Result<Size> {
        self(item, proposed, direction)
    }
}

struct Entry {
    index: usize,
    priority: i8,
    lower: f64,
    flexibility: f64,
}

/// Horizontal claim order: growables, ordinary items, elastic spacers.
fn priority(item: &Content) -> i8 {
    if item.is_elastic_spacer() {
        -1
    } else if item.is_growable() {
        1
    } else {
        0
    }
}

/// Allot each of `items` a size within `proposed` along `axis`.
///
/// Returns one size per item, in input order. The allotted extents along the
/// axis never sum to more than the (sanitized) budget. The cross extent of
/// each size is whatever the item measured at its share.
pub fn allot<P: Probe + ?Sized>(
    items: &[Content],
    axis: Axis,
    proposed: Size,
    probe: &P,
) -> Result<Vec<Size>> {
    let proposed = Size::new(sanitize(proposed.width), sanitize(proposed.height));
    let sizes = match axis {
        Axis::Horizontal => allot_horizontal(items, proposed, probe)?,
        Axis::Vertical => allot_vertical(items, proposed, probe)?,
    };
    debug!(
        ?axis,
        items = items.len(),
        budget = axis.extent(proposed),
        used = sizes.iter().map(|s| axis.extent(*s)).sum::<f64>(),
        "negotiated stack"
    );
    Ok(sizes)
}

fn allot_horizontal<P: Probe + ?Sized>(
    items: &[Content],
    proposed: Size,
    probe: &P,
) -> Result<Vec<Size>> {
    let cross = proposed.height;
    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let lower = probe.probe(item, Size::new(0.0, cross), Direction::Horizontal)?;
        let upper = probe.probe(item, Size::new(UNBOUNDED, cross), Direction::Horizontal)?;
        entries.push(Entry {
            index,
            priority: priority(item),
            lower: lower.width,
            flexibility: upper.width - lower.width,
        });
    }
    entries.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.flexibility.total_cmp(&b.flexibility))
            .then_with(|| a.index.cmp(&b.index))
    });

    let mut sizes = vec![Size::ZERO; items.len()];
    let mut remaining = proposed.width - entries.iter().map(|e| e.lower).sum::<f64>();

    for group in entries.chunk_by(|a, b| a.priority == b.priority) {
        remaining += group.iter().map(|e| e.lower).sum::<f64>();
        for (k, entry) in group.iter().enumerate() {
            let unsized_count = (group.len() - k) as f64;
            let share = (remaining / unsized_count).max(0.0);
            let measured = probe.probe(
                &items[entry.index],
                Size::new(share, cross),
                Direction::Horizontal,
            )?;
            let width = measured.width.min(remaining.max(0.0));
            sizes[entry.index] = Size::new(width, measured.height);
            remaining -= width;
        }
    }
    Ok(sizes)
}

fn allot_vertical<P: Probe + ?Sized>(
    items: &[Content],
    proposed: Size,
    probe: &P,
) -> Result<Vec<Size>> {
    let cross = proposed.width;
    let mut order: Vec<(usize, f64)> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let lower = probe.probe(item, Size::new(cross, 0.0), Direction::Vertical)?;
        let upper = probe.probe(item, Size::new(cross, UNBOUNDED), Direction::Vertical)?;
        order.push((index, upper.height - lower.height));
    }
    // Every non-spacer is sized before any spacer.
    order.sort_by(|a, b| {
        items[a.0]
            .is_spacer()
            .cmp(&items[b.0].is_spacer())
            .then_with(|| a.1.total_cmp(&b.1))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut sizes = vec![Size::ZERO; items.len()];
    let mut remaining = proposed.height;

    for k in 0..order.len() {
        let pending = &order[k..];
        let spacers = pending
            .iter()
            .filter(|(index, _)| items[*index].is_spacer())
            .count();
        let divisor = if spacers == pending.len() {
            spacers
        } else {
            pending.len() - spacers
        };
        let share = (remaining / divisor.max(1) as f64).max(0.0);

        let index = order[k].0;
        let measured = probe.probe(&items[index], Size::new(cross, share), Direction::Vertical)?;
        let height = measured.height.min(remaining.max(0.0));
        sizes[index] = Size::new(measured.width, height);
        remaining -= height;
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    /// Rectangles are rigid and spacers take everything up to their
    /// dimension on the stack axis. Anything else fills its proposal up to
    /// 300 x 300.
    fn simple(item: &Content, proposed: Size, direction: Direction) -> Result<Size> {
        Ok(match item {
            Content::Rectangle { width, height, .. } => Size::new(*width, *height),
            Content::Spacer { dimension } => {
                let along = dimension.unwrap_or(f64::INFINITY);
                match direction {
                    Direction::Horizontal => Size::new(proposed.width.min(along), 0.0),
                    Direction::Vertical => Size::new(0.0, proposed.height.min(along)),
                    Direction::Overlay => {
                        Size::new(proposed.width.min(along), proposed.height.min(along))
                    }
                }
            }
            _ => Size::new(proposed.width.min(300.0), proposed.height.min(300.0)),
        })
    }

    fn rect(w: f64, h: f64) -> Content {
        Content::rectangle(w, h, Color::BLACK)
    }

    fn filler() -> Content {
        Content::vstack(vec![])
    }

    fn sum(sizes: &[Size], axis: Axis) -> f64 {
        sizes.iter().map(|s| axis.extent(*s)).sum()
    }

    #[test]
    fn spacer_takes_the_remainder() {
        let items = vec![rect(100.0, 50.0), rect(100.0, 50.0), rect(100.0, 50.0), Content::spacer()];
        let sizes = allot(&items, Axis::Horizontal, Size::new(1000.0, 100.0), &simple).unwrap();
        assert_eq!(sizes[0].width, 100.0);
        assert_eq!(sizes[2].width, 100.0);
        assert_eq!(sizes[3].width, 700.0);
    }

    #[test]
    fn two_spacers_split_equally() {
        let items = vec![Content::spacer(), rect(200.0, 10.0), Content::spacer()];
        let sizes = allot(&items, Axis::Horizontal, Size::new(1000.0, 100.0), &simple).unwrap();
        assert_eq!(sizes[0].width, 400.0);
        assert_eq!(sizes[2].width, 400.0);
    }

    #[test]
    fn spacers_yield_to_flexible_items() {
        let items = vec![Content::spacer(), filler(), Content::spacer()];
        let sizes = allot(&items, Axis::Horizontal, Size::new(1000.0, 100.0), &simple).unwrap();
        // The filler is sized before the spacers and caps at 300.
        assert_eq!(sizes[1].width, 300.0);
        assert_eq!(sizes[0].width, 350.0);
        assert_eq!(sizes[2].width, 350.0);
    }

    #[test]
    fn oversubscribed_budget_is_never_exceeded() {
        let items = vec![rect(80.0, 10.0), rect(80.0, 10.0), Content::spacer()];
        let sizes = allot(&items, Axis::Horizontal, Size::new(100.0, 10.0), &simple).unwrap();
        assert_eq!(sizes[0].width, 80.0);
        assert_eq!(sizes[1].width, 20.0);
        assert_eq!(sizes[2].width, 0.0);
        assert!(sum(&sizes, Axis::Horizontal) <= 100.0);
    }

    #[test]
    fn vertical_spacers_wait_for_content() {
        let items = vec![Content::spacer(), filler(), Content::fixed_spacer(40.0)];
        let sizes = allot(&items, Axis::Vertical, Size::new(100.0, 1000.0), &simple).unwrap();
        // The filler is offered the whole remainder, not a third of it.
        assert_eq!(sizes[1].height, 300.0);
        assert_eq!(sizes[2].height, 40.0);
        assert_eq!(sizes[0].height, 660.0);
    }

    #[test]
    fn vertical_spacers_share_among_themselves() {
        let items = vec![Content::spacer(), rect(10.0, 100.0), Content::spacer()];
        let sizes = allot(&items, Axis::Vertical, Size::new(100.0, 500.0), &simple).unwrap();
        assert_eq!(sizes[1].height, 100.0);
        assert_eq!(sizes[0].height, 200.0);
        assert_eq!(sizes[2].height, 200.0);
    }

    #[test]
    fn vertical_content_is_sized_before_a_tied_spacer() {
        // Stacks fill whatever they are offered, so they tie with an elastic
        // spacer on flexibility. Document order must not decide who wins.
        let filling = |item: &Content, proposed: Size, direction: Direction| -> Result<Size> {
            match item {
                Content::Rectangle { .. } | Content::Spacer { .. } => simple(item, proposed, direction),
                _ => Ok(Size::new(proposed.width, proposed.height.min(UNBOUNDED))),
            }
        };
        let font = crate::style::FontSpec::new("Mono", 20.0, 400);
        let column = || {
            Content::vstack(vec![
                Content::text("top", font.clone(), Color::BLACK),
                Content::spacer(),
                Content::text("bottom", font.clone(), Color::BLACK),
            ])
        };
        let budget = Size::new(300.0, 400.0);

        let leading = allot(&[Content::spacer(), column()], Axis::Vertical, budget, &filling).unwrap();
        let trailing = allot(&[column(), Content::spacer()], Axis::Vertical, budget, &filling).unwrap();
        assert_eq!(leading[1].height, 400.0);
        assert_eq!(leading[0].height, 0.0);
        assert_eq!(trailing[0].height, leading[1].height);
        assert_eq!(trailing[1].height, leading[0].height);
    }

    #[test]
    fn vertical_order_does_not_move_space_between_content_and_spacer() {
        let budget = Size::new(300.0, 400.0);
        let overlay = || Content::zstack(vec![rect(50.0, 50.0)]);

        let leading = allot(&[Content::spacer(), overlay()], Axis::Vertical, budget, &simple).unwrap();
        let trailing = allot(&[overlay(), Content::spacer()], Axis::Vertical, budget, &simple).unwrap();
        assert_eq!(leading[1].height, 300.0);
        assert_eq!(leading[0].height, 100.0);
        assert_eq!(trailing[0].height, 300.0);
        assert_eq!(trailing[1].height, 100.0);
    }

    #[test]
    fn fixed_spacers_yield_to_content_when_short() {
        // The spacer is the less flexible of the two but is still sized last.
        let items = vec![Content::fixed_spacer(40.0), filler()];
        let sizes = allot(&items, Axis::Vertical, Size::new(100.0, 100.0), &simple).unwrap();
        assert_eq!(sizes[1].height, 100.0);
        assert_eq!(sizes[0].height, 0.0);
    }

    #[test]
    fn degenerate_budgets_clamp_to_zero() {
        let items = vec![Content::spacer(), filler()];
        for budget in [-50.0, f64::NAN, f64::NEG_INFINITY] {
            let sizes = allot(&items, Axis::Horizontal, Size::new(budget, budget), &simple).unwrap();
            assert!(sizes.iter().all(|s| s.width == 0.0 && s.height == 0.0));
        }
        assert!(allot(&[], Axis::Vertical, Size::new(10.0, 10.0), &simple)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn extents_sum_within_budget() {
        let items = vec![
            rect(120.0, 30.0),
            Content::spacer(),
            filler(),
            Content::fixed_spacer(75.0),
            rect(10.0, 400.0),
            filler(),
            Content::spacer(),
        ];
        for budget in [0.0, 1.0, 99.0, 250.0, 640.0, 1200.0, 5000.0] {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                let sizes = allot(&items, axis, Size::new(budget, budget), &simple).unwrap();
                assert!(
                    sum(&sizes, axis) <= budget + 1e-9,
                    "{axis:?} at {budget}: {}",
                    sum(&sizes, axis)
                );
            }
        }
    }

    #[test]
    fn sizing_errors_propagate() {
        let failing = |_: &Content, _: Size, _: Direction| -> Result<Size> {
            Err(crate::error::PlacardError::Measure("nope".to_string()))
        };
        assert!(allot(&[rect(1.0, 1.0)], Axis::Horizontal, Size::new(10.0, 10.0), &failing).is_err());
    }
}
