//! # Placard
//!
//! A layout core for posters and social cards.
//!
//! A card is described as a tree of text, images, rectangles, vector shapes
//! and gradients arranged by horizontal, vertical and overlay stacks. Nothing
//! in the tree says where anything goes. Placard works that out by asking each
//! node how big it would be for a given amount of room, and dividing every
//! stack's space among its children from the least flexible to the most.
//! Rigid content claims what it needs first, and elastic spacers soak up
//! whatever is left.
//!
//! The output is an absolutely positioned geometry tree, ready for a paint
//! stage to rasterize.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    : content tree and canvas options
//!       ↓
//!   [layout]   : size negotiation, positioning, centering
//!       ↑
//!   [text]     : greedy line breaking over a measurer
//!   [font]     : Helvetica metrics, font-file measurement
//!   [svg]      : path parsing and tight bounds
//!   [cache]    : memoizing wrappers for the providers
//!       ↓
//!   Composition → paint stage (external)
//! ```

pub mod cache;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod style;
pub mod svg;
pub mod text;

use cache::{CachedMeasurer, CachedPaths};
use error::Result;
use font::FontContext;
use layout::info::LayoutInfo;
use layout::{Composition, LayoutEngine};
use model::Document;
use svg::SvgPathProvider;

/// Lay out a document with the built-in providers: Helvetica metrics (plus
/// any fonts registered on `fonts`) and the SVG path parser, both memoized.
pub fn compose_with(document: &Document, fonts: FontContext) -> Result<Composition> {
    let measurer = CachedMeasurer::new(fonts);
    let paths = CachedPaths::new(SvgPathProvider);
    let engine = LayoutEngine::new(&measurer, &paths);
    engine.compose(document)
}

/// Lay out a document with the built-in providers and standard fonts only.
pub fn compose(document: &Document) -> Result<Composition> {
    compose_with(document, FontContext::new())
}

/// Lay out a document described as JSON.
pub fn compose_json(json: &str) -> Result<Composition> {
    let document: Document = serde_json::from_str(json)?;
    compose(&document)
}

/// Lay out a JSON document and return its layout metadata.
pub fn layout_info_json(json: &str) -> Result<LayoutInfo> {
    compose_json(json).map(|composition| LayoutInfo::from_composition(&composition))
}
