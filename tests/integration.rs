//! Integration tests for the Placard layout pipeline.
//!
//! These tests drive the public API from content trees (built in code or
//! parsed from JSON) to positioned geometry. They verify:
//! - Stack negotiation hands out space in the documented order
//! - Text wraps the same way during sizing and placement
//! - Images, shapes and gradients land where the canvas says
//! - Canvas insets and global centering
//! - Errors from collaborators abort the render

use placard::cache::{CachedMeasurer, CachedPaths};
use placard::error::PlacardError;
use placard::font::FixedAdvance;
use placard::image_loader::ImageHandle;
use placard::layout::align::{center_siblings, centering_offsets, union_bounds};
use placard::layout::{Axis, Composition, LayoutEngine, LayoutNode, Rect};
use placard::model::*;
use placard::style::*;
use placard::svg::SvgPathProvider;
use placard::text::TextLayout;

// ─── Helpers ────────────────────────────────────────────────────

fn mono() -> FontSpec {
    FontSpec::new("Mono", 20.0, 400)
}

fn text(s: &str) -> Content {
    Content::text(s, mono(), Color::BLACK)
}

fn rect(w: f64, h: f64) -> Content {
    Content::rectangle(w, h, Color::hex("#336699"))
}

fn compose(canvas: Canvas, content: Content) -> Composition {
    let measurer = FixedAdvance::default();
    let engine = LayoutEngine::new(&measurer, &SvgPathProvider);
    engine.compose(&Document { canvas, content }).unwrap()
}

fn count_kind(nodes: &[LayoutNode], kind: &str) -> usize {
    nodes
        .iter()
        .map(|n| (n.kind_name() == kind) as usize + count_kind(n.children(), kind))
        .sum()
}

// ─── Negotiation ────────────────────────────────────────────────

#[test]
fn test_spacer_absorbs_the_rest_of_a_row() {
    let content = Content::hstack(vec![
        rect(100.0, 40.0),
        rect(100.0, 40.0),
        rect(100.0, 40.0),
        Content::spacer(),
    ]);
    let composition = compose(Canvas::new(1000.0, 200.0), content);

    assert_eq!(composition.nodes.len(), 4);
    let xs: Vec<f64> = composition.nodes[..3]
        .iter()
        .map(|n| n.bounds().unwrap().min_x)
        .collect();
    assert_eq!(xs, vec![0.0, 100.0, 200.0]);
    match composition.nodes[3] {
        LayoutNode::Spacer { dimension, elastic } => {
            assert_eq!(dimension, 700.0);
            assert!(elastic);
        }
        ref other => panic!("expected spacer, got {}", other.kind_name()),
    }
}

#[test]
fn test_growable_image_claims_space_first() {
    let image = Content::Image {
        image: ImageHandle::with_dimensions(200, 100),
        grow: true,
        max_width: None,
        max_height: None,
        rounded: false,
    };
    let content = Content::hstack(vec![rect(100.0, 50.0), image]).aligned(Alignment::TopLeading);
    let composition = compose(Canvas::new(600.0, 1000.0), content);

    let image_box = composition.nodes[1].bounds().unwrap();
    assert_eq!(image_box, Rect::new(100.0, 0.0, 500.0, 250.0));
    assert_eq!(composition.nodes[0].bounds().unwrap().width(), 100.0);
}

#[test]
fn test_image_fills_binding_dimension() {
    let image = Content::Image {
        image: ImageHandle::with_dimensions(200, 100),
        grow: true,
        max_width: Some(400.0),
        max_height: None,
        rounded: true,
    };
    let composition = compose(
        Canvas::new(400.0, 400.0),
        Content::vstack(vec![image]).aligned(Alignment::TopLeading),
    );
    match &composition.nodes[0] {
        LayoutNode::Image { bounds, rounded, .. } => {
            assert_eq!((bounds.width(), bounds.height()), (400.0, 200.0));
            assert!(*rounded);
        }
        other => panic!("expected image, got {}", other.kind_name()),
    }
}

#[test]
fn test_fixed_image_never_upscales() {
    let composition = compose(
        Canvas::new(1000.0, 1000.0),
        Content::vstack(vec![Content::image(ImageHandle::with_dimensions(120, 80))]),
    );
    let b = composition.nodes[0].bounds().unwrap();
    assert_eq!((b.width(), b.height()), (120.0, 80.0));
}

#[test]
fn test_column_with_spacers_fills_height() {
    let content = Content::vstack(vec![
        rect(50.0, 100.0),
        Content::spacer(),
        rect(50.0, 60.0),
    ])
    .aligned(Alignment::TopLeading);
    let composition = compose(Canvas::new(300.0, 500.0), content);
    let last = composition.nodes[2].bounds().unwrap();
    assert_eq!(last.max_y, 500.0);
    assert!(matches!(
        composition.nodes[1],
        LayoutNode::Spacer { dimension, .. } if dimension == 340.0
    ));
}

// ─── Text ───────────────────────────────────────────────────────

#[test]
fn test_quick_brown_fox_wraps_to_two_lines() {
    let measurer = FixedAdvance::default();
    let paragraph = TextLayout::new()
        .layout_paragraph(&measurer, "The quick brown fox", &mono(), TextAlign::Leading, 90.0)
        .unwrap();
    assert_eq!(paragraph.lines.len(), 2);
    assert_eq!(paragraph.lines[0].text, "The quick");
    assert_eq!(paragraph.lines[1].text, "brown fox");
    assert_eq!(paragraph.lines[1].top, 20.0);

    // The same wrap comes out of a full layout pass.
    let composition = compose(
        Canvas::new(400.0, 400.0),
        Content::vstack(vec![text("The quick brown fox")]).max_width(90.0),
    );
    match &composition.nodes[0] {
        LayoutNode::Text(block) => {
            let lines: Vec<&str> = block.lines.iter().map(|l| l.text.as_str()).collect();
            assert_eq!(lines, vec!["The quick", "brown fox"]);
            assert_eq!(block.bounds.height(), 40.0);
        }
        other => panic!("expected text, got {}", other.kind_name()),
    }
}

#[test]
fn test_empty_text_emits_nothing_in_any_container() {
    let content = Content::vstack(vec![
        text(""),
        Content::hstack(vec![text("   "), rect(10.0, 10.0)]),
        Content::zstack(vec![text("\n\t")]),
    ]);
    let composition = compose(Canvas::new(300.0, 300.0), content);
    assert_eq!(count_kind(&composition.nodes, "Text"), 0);
    assert_eq!(count_kind(&composition.nodes, "Rectangle"), 1);
}

#[test]
fn test_text_alignment_within_allotted_width() {
    let content = Content::Text {
        text: "ab abcdef".to_string(),
        font: mono(),
        color: Color::BLACK,
        paragraph_alignment: TextAlign::Trailing,
    };
    let composition = compose(
        Canvas::new(400.0, 400.0),
        Content::vstack(vec![content]).max_width(60.0),
    );
    match &composition.nodes[0] {
        LayoutNode::Text(block) => {
            // Allotted the longest line (60px); the short line hugs the right edge.
            assert_eq!(block.lines[0].left, 40.0);
            assert_eq!(block.lines[1].left, 0.0);
        }
        other => panic!("expected text, got {}", other.kind_name()),
    }
}

// ─── Centering ──────────────────────────────────────────────────

#[test]
fn test_alignment_pass_preserves_union_center() {
    let composition = compose(
        Canvas::new(500.0, 500.0),
        Content::vstack(vec![rect(300.0, 20.0), rect(80.0, 20.0), rect(140.0, 20.0)])
            .aligned(Alignment::TopLeading),
    );
    let mut nodes = composition.nodes;
    let before = union_bounds(&nodes).unwrap();
    let deviations: Vec<f64> = nodes
        .iter()
        .map(|n| n.bounds().unwrap().mid_x() - before.mid_x())
        .collect();
    let offsets = centering_offsets(&nodes, Axis::Horizontal);
    for (offset, deviation) in offsets.iter().zip(&deviations) {
        assert_eq!(offset.unwrap(), -deviation);
    }

    let after = center_siblings(&mut nodes, Axis::Horizontal).unwrap();
    assert_eq!(after.mid_x(), before.mid_x());
    for node in &nodes {
        assert_eq!(node.bounds().unwrap().mid_x(), before.mid_x());
    }
}

#[test]
fn test_canvas_insets_and_global_centering() {
    let mut canvas = Canvas::new(400.0, 300.0);
    canvas.inset_x = 20.0;
    canvas.inset_y = 10.0;
    canvas.center_x = true;
    canvas.center_y = true;
    let composition = compose(canvas, Content::vstack(vec![rect(100.0, 50.0)]));

    assert_eq!(composition.bounds, Rect::new(150.0, 125.0, 100.0, 50.0));
    assert_eq!((composition.width, composition.height), (400.0, 300.0));
}

fn rect_bounds(composition: &Composition) -> Vec<Rect> {
    composition
        .nodes
        .iter()
        .filter_map(|node| match node {
            LayoutNode::Rectangle { bounds, .. } => Some(*bounds),
            _ => None,
        })
        .collect()
}

#[test]
fn test_global_centering_keeps_a_column_stacked() {
    let mut canvas = Canvas::new(400.0, 400.0);
    canvas.center_y = true;
    let content = Content::vstack(vec![rect(100.0, 50.0), rect(100.0, 50.0)]);
    let rects = rect_bounds(&compose(canvas, content));

    assert_eq!(rects.len(), 2);
    assert_eq!((rects[0].min_y, rects[0].max_y), (150.0, 200.0));
    assert_eq!((rects[1].min_y, rects[1].max_y), (200.0, 250.0));
}

#[test]
fn test_global_centering_keeps_a_row_side_by_side() {
    let mut canvas = Canvas::new(400.0, 400.0);
    canvas.center_x = true;
    let content = Content::hstack(vec![rect(100.0, 50.0), rect(100.0, 50.0)]);
    let rects = rect_bounds(&compose(canvas, content));

    assert_eq!(rects.len(), 2);
    assert_eq!((rects[0].min_x, rects[0].max_x), (100.0, 200.0));
    assert_eq!((rects[1].min_x, rects[1].max_x), (200.0, 300.0));
    assert_eq!(rects[0].min_y, rects[1].min_y);
}

#[test]
fn test_global_centering_moves_the_group_as_one() {
    let mut canvas = Canvas::new(400.0, 400.0);
    canvas.center_x = true;
    canvas.center_y = true;
    let content = Content::vstack(vec![rect(100.0, 50.0), rect(200.0, 50.0)])
        .aligned(Alignment::TopLeading);
    let composition = compose(canvas, content);
    let rects = rect_bounds(&composition);

    // Both left edges move by the same offset.
    assert_eq!(rects[0], Rect::new(100.0, 150.0, 100.0, 50.0));
    assert_eq!(rects[1], Rect::new(100.0, 200.0, 200.0, 50.0));
    assert_eq!(composition.bounds, Rect::new(100.0, 150.0, 200.0, 100.0));
}

#[test]
fn test_oversized_content_is_not_centered() {
    let mut canvas = Canvas::new(200.0, 200.0);
    canvas.center_x = true;
    let composition = compose(canvas, Content::zstack(vec![rect(500.0, 50.0)]));
    assert_eq!(composition.bounds.min_x, 0.0);
}

#[test]
fn test_hstack_inset_offsets_children() {
    let content = Content::vstack(vec![
        Content::hstack(vec![rect(40.0, 40.0)]).inset(Edges::symmetric(8.0, 12.0)),
    ])
    .aligned(Alignment::TopLeading);
    let composition = compose(Canvas::new(300.0, 300.0), content);
    match &composition.nodes[0] {
        LayoutNode::Row { children, bounds } => {
            assert_eq!(children[0].bounds().unwrap().min_x, 12.0);
            assert_eq!(children[0].bounds().unwrap().min_y, 8.0);
            assert_eq!(*bounds, Rect::new(12.0, 8.0, 40.0, 40.0));
        }
        other => panic!("expected row, got {}", other.kind_name()),
    }
}

// ─── JSON pipeline ──────────────────────────────────────────────

#[test]
fn test_compose_json_with_standard_fonts() {
    let json = r##"{
        "canvas": { "width": 800, "height": 400, "insetX": 40, "insetY": 40 },
        "content": {
            "type": "vstack",
            "alignment": "topLeading",
            "children": [
                { "type": "text", "text": "Hello, world", "font": { "size": 32, "weight": 700 } },
                { "type": "spacer" },
                {
                    "type": "hstack",
                    "children": [
                        { "type": "shape", "paths": ["<svg viewBox=\"0 0 10 10\"><path d=\"M0 0 L10 0 L10 10 Z\"/></svg>"], "fillColor": "#000" },
                        { "type": "image", "image": { "width": 64, "height": 64 } }
                    ]
                }
            ]
        }
    }"##;
    let composition = placard::compose_json(json).unwrap();
    assert_eq!(composition.nodes.len(), 3);
    let frame = Rect::new(40.0, 40.0, 720.0, 320.0);
    let bounds = composition.bounds;
    assert!(bounds.min_x >= frame.min_x && bounds.max_x <= frame.max_x);
    assert!(bounds.min_y >= frame.min_y && bounds.max_y <= frame.max_y + 1e-9);
    assert_eq!(count_kind(&composition.nodes, "Shape"), 1);
    assert_eq!(count_kind(&composition.nodes, "Image"), 1);

    let info = placard::layout_info_json(json).unwrap();
    let value = serde_json::to_value(&info).unwrap();
    assert_eq!(value["elements"][0]["textContent"], "Hello, world");
}

#[test]
fn test_invalid_json_reports_parse_error() {
    match placard::compose_json(r#"{ "content": { "type": "pyramid" } }"#) {
        Err(PlacardError::Parse { hint, .. }) => assert!(hint.contains("schema")),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_invalid_path_aborts_render() {
    let json = r##"{ "content": { "type": "zstack", "children": [
        { "type": "shape", "paths": ["Q 1 2"], "fillColor": "#000" }
    ] } }"##;
    assert!(matches!(
        placard::compose_json(json),
        Err(PlacardError::InvalidPath { .. })
    ));
}

#[test]
fn test_out_of_range_path_numbers_are_rejected() {
    let json = r##"{ "content": { "type": "vstack", "children": [
        { "type": "shape", "paths": ["M0 0 L1e999 10"], "fillColor": "#000" }
    ] } }"##;
    assert!(matches!(
        placard::compose_json(json),
        Err(PlacardError::InvalidPath { .. })
    ));
}

#[test]
fn test_extreme_paths_never_emit_nan() {
    // Every coordinate is representable but the extent overflows.
    let json = r##"{ "content": { "type": "vstack", "children": [
        { "type": "shape", "paths": ["M-1e308 0 L1e308 10"], "fillColor": "#000" }
    ] } }"##;
    assert!(matches!(
        placard::compose_json(json),
        Err(PlacardError::InvalidPath { .. })
    ));

    let json = r##"{ "content": { "type": "vstack", "children": [
        { "type": "shape", "paths": ["M0 0 L1e300 1e300"], "fillColor": "#000" },
        { "type": "rectangle", "width": 10, "height": 10, "fillColor": "#000" }
    ] } }"##;
    let composition = placard::compose_json(json).unwrap();
    let finite = |r: Rect| [r.min_x, r.max_x, r.min_y, r.max_y].iter().all(|v| v.is_finite());
    assert!(finite(composition.bounds));
    for node in &composition.nodes {
        assert!(node.bounds().map_or(true, finite), "{} has non-finite bounds", node.kind_name());
    }
}

// ─── Concurrency ────────────────────────────────────────────────

#[test]
fn test_renders_share_cached_providers_across_threads() {
    let measurer = CachedMeasurer::new(FixedAdvance::default());
    let paths = CachedPaths::new(SvgPathProvider);
    let content = Content::vstack(vec![
        text("shared measurements across renders"),
        Content::shape(vec!["M0 0 C 10 20 20 20 30 0".to_string()], Color::BLACK),
    ]);
    let document = Document {
        canvas: Canvas::new(300.0, 300.0),
        content,
    };

    let results: Vec<Composition> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    LayoutEngine::new(&measurer, &paths)
                        .compose(&document)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for composition in &results[1..] {
        assert_eq!(composition, &results[0]);
    }
    assert!(measurer.cached() > 0);
}
