//! # Vector Paths
//!
//! The path-geometry collaborator and its SVG implementation.
//!
//! A path source is either bare path data (`"M0 0 L10 0 …"`) or an `<svg>`
//! fragment, in which case every `<path d="…">` element is parsed and the
//! results are concatenated. Everything is normalized to absolute move, line,
//! cubic and close commands: quadratics are raised to cubics exactly and
//! elliptical arcs are approximated with one cubic per quarter turn.

use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{PlacardError, Result};
use crate::layout::Rect;
use crate::style::Point;

/// A normalized drawing command in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    ClosePath,
}

/// A materialized vector path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    commands: Vec<PathCommand>,
}

/// Materialized paths are shared between the layout tree and the painter.
pub type PathHandle = Arc<Path>;

impl Path {
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The tight bounding box, including the extrema of curved segments.
    /// `None` for a path without commands.
    pub fn bounds(&self) -> Option<Rect> {
        let mut acc: Option<Rect> = None;
        let mut include = |p: Point| {
            acc = Some(match acc {
                Some(r) => Rect {
                    min_x: r.min_x.min(p.x),
                    max_x: r.max_x.max(p.x),
                    min_y: r.min_y.min(p.y),
                    max_y: r.max_y.max(p.y),
                },
                None => Rect::at(p.x, p.y),
            });
        };

        let mut current = Point::default();
        let mut start = Point::default();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    include(p);
                    current = p;
                    start = p;
                }
                PathCommand::LineTo(p) => {
                    include(p);
                    current = p;
                }
                PathCommand::CurveTo(c1, c2, p) => {
                    include(p);
                    let xs = cubic_extrema(current.x, c1.x, c2.x, p.x);
                    let ys = cubic_extrema(current.y, c1.y, c2.y, p.y);
                    for t in xs.into_iter().chain(ys).flatten() {
                        include(Point::new(
                            cubic_at(current.x, c1.x, c2.x, p.x, t),
                            cubic_at(current.y, c1.y, c2.y, p.y, t),
                        ));
                    }
                    current = p;
                }
                PathCommand::ClosePath => current = start,
            }
        }
        acc
    }
}

/// The path-geometry collaborator.
pub trait PathGeometry: Send + Sync {
    /// Minimal axis-aligned box enclosing the geometry of `source`.
    fn tight_bounds(&self, source: &str) -> Result<Rect>;

    /// Parse `source` into drawable geometry.
    fn materialize(&self, source: &str) -> Result<PathHandle>;
}

impl<T: PathGeometry + ?Sized> PathGeometry for &T {
    fn tight_bounds(&self, source: &str) -> Result<Rect> {
        (**self).tight_bounds(source)
    }

    fn materialize(&self, source: &str) -> Result<PathHandle> {
        (**self).materialize(source)
    }
}

impl<T: PathGeometry + ?Sized> PathGeometry for Arc<T> {
    fn tight_bounds(&self, source: &str) -> Result<Rect> {
        (**self).tight_bounds(source)
    }

    fn materialize(&self, source: &str) -> Result<PathHandle> {
        (**self).materialize(source)
    }
}

/// Path geometry from SVG path data or `<svg>` markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgPathProvider;

impl PathGeometry for SvgPathProvider {
    fn tight_bounds(&self, source: &str) -> Result<Rect> {
        let path = parse_source(source)?;
        path.bounds()
            .ok_or_else(|| PlacardError::invalid_path(source, "path has no geometry"))
    }

    fn materialize(&self, source: &str) -> Result<PathHandle> {
        parse_source(source).map(Arc::new)
    }
}

/// Parse a path source: `<svg>` markup when it starts with `<`, path data otherwise.
pub fn parse_source(source: &str) -> Result<Path> {
    let trimmed = source.trim();
    if trimmed.starts_with('<') {
        let mut commands = Vec::new();
        for d in collect_path_data(trimmed)? {
            commands.extend(parse_path_data(&d)?.commands);
        }
        Ok(Path::new(commands))
    } else {
        parse_path_data(trimmed)
    }
}

/// Pull the `d` attribute of every `<path>` element out of SVG markup.
fn collect_path_data(markup: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(markup);
    let mut buf = Vec::new();
    let mut found = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"path" {
                    if let Some(d) = get_attr(&e, "d") {
                        found.push(d);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PlacardError::invalid_path(markup, e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if found.is_empty() {
        return Err(PlacardError::invalid_path(
            markup,
            "svg markup contains no <path> elements",
        ));
    }
    Ok(found)
}

fn get_attr(e: &quick_xml::events::BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return String::from_utf8(attr.value.to_vec()).ok();
        }
    }
    None
}

/// The reflected-control-point state carried between segments.
#[derive(Clone, Copy)]
enum Control {
    None,
    Cubic(Point),
    Quad(Point),
}

/// Parse SVG path data into absolute commands.
pub fn parse_path_data(d: &str) -> Result<Path> {
    let mut parser = PathParser::new(d);
    let mut commands: Vec<PathCommand> = Vec::new();
    let mut current = Point::default();
    let mut start = Point::default();
    let mut control = Control::None;
    let mut prev: Option<u8> = None;

    while let Some(cmd) = parser.next_command(prev)? {
        if commands.is_empty() && !matches!(cmd, b'M' | b'm') {
            return Err(parser.error("path must start with a moveto"));
        }
        let relative = cmd.is_ascii_lowercase();
        let base = if relative { current } else { Point::default() };
        let mut next_control = Control::None;

        match cmd.to_ascii_uppercase() {
            b'M' => {
                let p = parser.point(base)?;
                commands.push(PathCommand::MoveTo(p));
                current = p;
                start = p;
            }
            b'L' => {
                let p = parser.point(base)?;
                commands.push(PathCommand::LineTo(p));
                current = p;
            }
            b'H' => {
                let x = parser.number()? + base.x;
                current = Point::new(x, current.y);
                commands.push(PathCommand::LineTo(current));
            }
            b'V' => {
                let y = parser.number()? + base.y;
                current = Point::new(current.x, y);
                commands.push(PathCommand::LineTo(current));
            }
            b'C' => {
                let c1 = parser.point(base)?;
                let c2 = parser.point(base)?;
                let p = parser.point(base)?;
                commands.push(PathCommand::CurveTo(c1, c2, p));
                next_control = Control::Cubic(c2);
                current = p;
            }
            b'S' => {
                let c1 = match control {
                    Control::Cubic(c) => reflect(c, current),
                    _ => current,
                };
                let c2 = parser.point(base)?;
                let p = parser.point(base)?;
                commands.push(PathCommand::CurveTo(c1, c2, p));
                next_control = Control::Cubic(c2);
                current = p;
            }
            b'Q' => {
                let q = parser.point(base)?;
                let p = parser.point(base)?;
                commands.push(quad_to_cubic(current, q, p));
                next_control = Control::Quad(q);
                current = p;
            }
            b'T' => {
                let q = match control {
                    Control::Quad(c) => reflect(c, current),
                    _ => current,
                };
                let p = parser.point(base)?;
                commands.push(quad_to_cubic(current, q, p));
                next_control = Control::Quad(q);
                current = p;
            }
            b'A' => {
                let rx = parser.number()?;
                let ry = parser.number()?;
                let rotation = parser.number()?;
                let large_arc = parser.flag()?;
                let sweep = parser.flag()?;
                let p = parser.point(base)?;
                arc_to_cubics(current, rx, ry, rotation, large_arc, sweep, p, &mut commands);
                current = p;
            }
            b'Z' => {
                commands.push(PathCommand::ClosePath);
                current = start;
            }
            other => {
                return Err(parser.error(format!("unknown command '{}'", other as char)));
            }
        }

        control = next_control;
        prev = Some(cmd);
    }

    if commands.is_empty() {
        return Err(parser.error("empty path data"));
    }
    Ok(Path::new(commands))
}

struct PathParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PathParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> PlacardError {
        PlacardError::invalid_path(self.src, reason)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn at_number(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+'))
    }

    /// The next command letter, or the implicit repeat of `prev` when a
    /// number follows a complete segment. A repeated moveto becomes a lineto.
    fn next_command(&mut self, prev: Option<u8>) -> Result<Option<u8>> {
        self.skip_separators();
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        if b.is_ascii_alphabetic() {
            self.pos += 1;
            return Ok(Some(b));
        }
        match prev {
            Some(p) if self.at_number() && !matches!(p, b'Z' | b'z') => Ok(Some(match p {
                b'M' => b'L',
                b'm' => b'l',
                other => other,
            })),
            _ => Err(self.error(format!(
                "unexpected character '{}' at offset {}",
                self.src[self.pos..].chars().next().unwrap_or('?'),
                self.pos
            ))),
        }
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_separators();
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut digits = self.eat_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            digits += self.eat_digits();
        }
        if digits == 0 {
            self.pos = start;
            return Err(self.error(format!("expected a number at offset {}", start)));
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            if self.eat_digits() == 0 {
                self.pos = mark;
            }
        }
        let value = self.src[start..self.pos]
            .parse::<f64>()
            .map_err(|e| self.error(format!("bad number at offset {}: {}", start, e)))?;
        if !value.is_finite() {
            return Err(self.error(format!("number out of range at offset {}", start)));
        }
        Ok(value)
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Arc flags are a single `0` or `1` and may be written without separators.
    fn flag(&mut self) -> Result<bool> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error(format!("expected an arc flag at offset {}", self.pos))),
        }
    }

    fn point(&mut self, base: Point) -> Result<Point> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Point::new(base.x + x, base.y + y))
    }
}

fn reflect(control: Point, around: Point) -> Point {
    Point::new(2.0 * around.x - control.x, 2.0 * around.y - control.y)
}

fn quad_to_cubic(from: Point, q: Point, to: Point) -> PathCommand {
    let c1 = Point::new(
        from.x + 2.0 / 3.0 * (q.x - from.x),
        from.y + 2.0 / 3.0 * (q.y - from.y),
    );
    let c2 = Point::new(to.x + 2.0 / 3.0 * (q.x - to.x), to.y + 2.0 / 3.0 * (q.y - to.y));
    PathCommand::CurveTo(c1, c2, to)
}

/// Endpoint-parameterized elliptical arc to cubic segments.
#[allow(clippy::too_many_arguments)]
fn arc_to_cubics(
    from: Point,
    rx: f64,
    ry: f64,
    rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
    out: &mut Vec<PathCommand>,
) {
    if from == to {
        return;
    }
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx == 0.0 || ry == 0.0 {
        out.push(PathCommand::LineTo(to));
        return;
    }

    let phi = rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Radii too small to span the endpoints scale up uniformly.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coef = if den > 0.0 {
        sign * (num.max(0.0) / den).sqrt()
    } else {
        0.0
    };
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;
    let cx = cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0;

    let angle = |ux: f64, uy: f64, vx: f64, vy: f64| (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
    let theta1 = angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
    let mut delta = angle(
        (x1p - cxp) / rx,
        (y1p - cyp) / ry,
        (-x1p - cxp) / rx,
        (-y1p - cyp) / ry,
    );
    if !sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    }

    let segments = (delta.abs() / std::f64::consts::FRAC_PI_2).ceil().max(1.0) as usize;
    let step = delta / segments as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let point_at = |a: f64| {
        let (sin_a, cos_a) = a.sin_cos();
        Point::new(
            cx + rx * cos_a * cos_phi - ry * sin_a * sin_phi,
            cy + rx * cos_a * sin_phi + ry * sin_a * cos_phi,
        )
    };
    let tangent_at = |a: f64| {
        let (sin_a, cos_a) = a.sin_cos();
        Point::new(
            -rx * sin_a * cos_phi - ry * cos_a * sin_phi,
            -rx * sin_a * sin_phi + ry * cos_a * cos_phi,
        )
    };

    let mut a1 = theta1;
    let mut p1 = from;
    for i in 0..segments {
        let a2 = a1 + step;
        let p2 = if i + 1 == segments { to } else { point_at(a2) };
        let d1 = tangent_at(a1);
        let d2 = tangent_at(a2);
        out.push(PathCommand::CurveTo(
            Point::new(p1.x + k * d1.x, p1.y + k * d1.y),
            Point::new(p2.x - k * d2.x, p2.y - k * d2.y),
            p2,
        ));
        a1 = a2;
        p1 = p2;
    }
}

fn cubic_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
}

/// Parameters in (0, 1) where one coordinate of a cubic has zero derivative.
fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> [Option<f64>; 2] {
    let a = p3 - 3.0 * p2 + 3.0 * p1 - p0;
    let b = 2.0 * (p2 - 2.0 * p1 + p0);
    let c = p1 - p0;
    let inside = |t: f64| (t > 0.0 && t < 1.0).then_some(t);

    if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            return [None, None];
        }
        return [inside(-c / b), None];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return [None, None];
    }
    let root = disc.sqrt();
    [
        inside((-b + root) / (2.0 * a)),
        inside((-b - root) / (2.0 * a)),
    ]
}
