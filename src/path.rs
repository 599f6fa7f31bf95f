//! SVG path text for curves through device-space points.
//!
//! Three strategies, picked from the kind and the point count:
//!
//! * `bezier` kinds: monotone cubic spline, `C` then `S` segments;
//! * fewer than [`DENSE_POINTS`] points: integer polyline where runs of
//!   horizontal or vertical moves collapse into single `h`/`v` commands;
//! * dense data: samples sharing a pixel column collapse into at most three
//!   vertical moves.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::number::{js_round, to_fixed, to_js_string};

/// Point count from which the column-envelope strategy takes over.
pub const DENSE_POINTS: usize = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct PathPoint {
    pub grx: f64,
    pub gry: f64,
}

impl PathPoint {
    pub fn new(grx: f64, gry: f64) -> Self {
        Self { grx, gry }
    }
}

/// Accepts both `{"grx": 1, "gry": 2}` and `[1, 2]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Named { grx: f64, gry: f64 },
    Pair([f64; 2]),
}

impl From<PointRepr> for PathPoint {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Named { grx, gry } => Self { grx, gry },
            PointRepr::Pair([grx, gry]) => Self { grx, gry },
        }
    }
}

/// Parses a JSON array of points.
pub fn points_from_json(text: &str) -> Result<Vec<PathPoint>> {
    Ok(serde_json::from_str(text)?)
}

/// Control point offsets of a spline knot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tangent {
    pub dgrx: f64,
    pub dgry: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathResult {
    pub path: String,
    /// Segment closing the curve down to the fill baseline, empty unless a
    /// positive height was requested.
    pub close: String,
    /// Per-point tangents, filled for `bezier` and `calc` kinds.
    pub tangents: Vec<Tangent>,
}

struct PathKind {
    smooth: bool,
    calc: bool,
    continues: bool,
}

impl PathKind {
    fn parse(kind: &str) -> Self {
        Self {
            smooth: kind.contains("bezier"),
            calc: kind.contains("calc"),
            continues: kind.starts_with('L'),
        }
    }
}

/// Coordinate text: integers stay integers, the rest get `ndig` decimals
/// without trailing zeros.
struct CoordFormat {
    ndig: usize,
}

impl CoordFormat {
    fn fmt(&self, v: f64) -> String {
        let rounded = js_round(v);
        if self.ndig == 0 || rounded == v {
            return to_js_string(rounded);
        }
        let s = to_fixed(v, self.ndig);
        let s = if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.')
        } else {
            &s
        };
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }
}

/// Builds the path through `points`.
///
/// `kind` containing `"bezier"` smooths the curve, `"calc"` only computes
/// tangents, and a leading `L` continues an existing path instead of
/// starting with a move. `height` adds the fill closing segment; `ndig`
/// defaults to 2 for smooth curves and 0 otherwise.
pub fn build_svg_path(
    kind: &str,
    points: &[PathPoint],
    height: Option<f64>,
    ndig: Option<usize>,
) -> Result<PathResult> {
    let first = *points.first().ok_or(Error::EmptyPoints)?;
    let last = points[points.len() - 1];
    let kind = PathKind::parse(kind);
    let ctx = CoordFormat {
        ndig: ndig.unwrap_or(if kind.smooth { 2 } else { 0 }),
    };
    let height = height.unwrap_or(0.0);

    let mut res = PathResult::default();
    res.path.push(if kind.continues { 'L' } else { 'M' });
    res.path.push_str(&format!("{},{}", ctx.fmt(first.grx), ctx.fmt(first.gry)));

    if kind.smooth || kind.calc {
        res.tangents = monotone_tangents(points);
    }

    let mut maxy = first.gry.max(height + 5.0);
    if kind.smooth {
        trace!("smooth path through {} points", points.len());
        append_smooth(&mut res.path, &ctx, points, &res.tangents, &mut maxy);
    } else if points.len() < DENSE_POINTS {
        trace!("polyline through {} points", points.len());
        append_polyline(&mut res.path, points, &mut maxy);
    } else {
        trace!("dense polyline through {} points", points.len());
        append_dense(&mut res.path, points, &mut maxy);
    }

    if height > 0.0 {
        res.close = format!(
            "L{},{}h{}Z",
            ctx.fmt(last.grx),
            ctx.fmt(maxy),
            ctx.fmt(first.grx - last.grx)
        );
    }

    Ok(res)
}

fn append_smooth(
    path: &mut String,
    ctx: &CoordFormat,
    points: &[PathPoint],
    tangents: &[Tangent],
    maxy: &mut f64,
) {
    if points.len() < 2 {
        return;
    }
    let (p0, t0) = (points[0], tangents[0]);
    path.push_str(&format!(
        "C{},{},",
        ctx.fmt(p0.grx + t0.dgrx),
        ctx.fmt(p0.gry + t0.dgry)
    ));
    for n in 1..points.len() {
        let (p, t) = (points[n], tangents[n]);
        if n > 1 {
            path.push('S');
        }
        path.push_str(&format!(
            "{},{},{},{}",
            ctx.fmt(p.grx - t.dgrx),
            ctx.fmt(p.gry - t.dgry),
            ctx.fmt(p.grx),
            ctx.fmt(p.gry)
        ));
        *maxy = maxy.max(points[n - 1].gry);
    }
}

fn pixel(v: f64) -> i64 {
    js_round(v) as i64
}

/// Pending horizontal and vertical moves of a straight run.
#[derive(Default)]
struct Run {
    dx: i64,
    dy: i64,
}

impl Run {
    fn flush(&mut self, path: &mut String) {
        if self.dx != 0 {
            path.push_str(&format!("h{}", self.dx));
            self.dx = 0;
        }
        if self.dy != 0 {
            path.push_str(&format!("v{}", self.dy));
            self.dy = 0;
        }
    }
}

fn append_polyline(path: &mut String, points: &[PathPoint], maxy: &mut f64) {
    let mut currx = pixel(points[0].grx);
    let mut curry = pixel(points[0].gry);
    let mut run = Run::default();

    for p in &points[1..] {
        let dx = pixel(p.grx) - currx;
        let dy = pixel(p.gry) - curry;
        match (dx != 0, dy != 0) {
            (true, true) => {
                run.flush(path);
                path.push_str(&format!("l{},{}", dx, dy));
            }
            (false, true) => {
                if run.dy == 0 || (dy < 0) != (run.dy < 0) {
                    run.flush(path);
                }
                run.dy += dy;
            }
            (true, false) => {
                if run.dx == 0 || (dx < 0) != (run.dx < 0) {
                    run.flush(path);
                }
                run.dx += dx;
            }
            (false, false) => {}
        }
        currx += dx;
        curry += dy;
        *maxy = maxy.max(curry as f64);
    }

    run.flush(path);
}

/// Vertical excursion of the samples in one pixel column.
struct Column {
    min: i64,
    max: i64,
    last: i64,
}

impl Column {
    fn at(y: i64) -> Self {
        Self {
            min: y,
            max: y,
            last: y,
        }
    }

    fn add(&mut self, y: i64) {
        self.min = self.min.min(y);
        self.max = self.max.max(y);
        self.last = y;
    }

    /// Emits the excursion starting from `curry`, ending on the last sample.
    fn flush(&self, path: &mut String, curry: i64) -> bool {
        if self.min == self.max {
            return false;
        }
        if self.min != curry {
            path.push_str(&format!("v{}", self.min - curry));
        }
        path.push_str(&format!("v{}", self.max - self.min));
        if self.max != self.last {
            path.push_str(&format!("v{}", self.last - self.max));
        }
        true
    }
}

fn append_dense(path: &mut String, points: &[PathPoint], maxy: &mut f64) {
    let mut currx = pixel(points[0].grx);
    let mut curry = pixel(points[0].gry);
    let mut column = Column::at(curry);

    for p in &points[1..] {
        let lastx = pixel(p.grx);
        let lasty = pixel(p.gry);
        *maxy = maxy.max(lasty as f64);

        let dx = lastx - currx;
        if dx == 0 {
            column.add(lasty);
            continue;
        }

        if column.flush(path, curry) {
            curry = column.last;
        }
        let dy = lasty - curry;
        if dy != 0 {
            path.push_str(&format!("l{},{}", dx, dy));
        } else {
            path.push_str(&format!("h{}", dx));
        }
        currx = lastx;
        curry = lasty;
        column = Column::at(lasty);
    }

    column.flush(path, curry);
}

fn slope(p0: PathPoint, p1: PathPoint) -> f64 {
    (p1.gry - p0.gry) / (p1.grx - p0.grx)
}

/// Zero for NaN, like `x || 0`.
fn or_zero(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

/// Slopes averaged over the segments meeting at each point.
fn finite_differences(points: &[PathPoint]) -> Vec<f64> {
    let j = points.len() - 1;
    let mut m = vec![0.0; points.len()];
    let mut d = slope(points[0], points[1]);
    m[0] = d;
    for i in 1..j {
        let next = slope(points[i], points[i + 1]);
        m[i] = (d + next) / 2.0;
        d = next;
    }
    m[j] = d;
    m
}

/// Fritsch-Carlson tangents turned into control point offsets: a sixth of
/// the horizontal span around each point, shortened for steep tangents.
pub fn monotone_tangents(points: &[PathPoint]) -> Vec<Tangent> {
    if points.len() < 2 {
        return vec![Tangent::default(); points.len()];
    }

    let j = points.len() - 1;
    let mut m = finite_differences(points);
    for i in 0..j {
        let d = slope(points[i], points[i + 1]);
        if d.abs() < 1e-6 {
            m[i] = 0.0;
            m[i + 1] = 0.0;
        } else {
            let a = m[i] / d;
            let b = m[i + 1] / d;
            let s = a * a + b * b;
            if s > 9.0 {
                let s = d * 3.0 / s.sqrt();
                m[i] = s * a;
                m[i + 1] = s * b;
            }
        }
    }

    (0..=j)
        .map(|i| {
            let span = points[(i + 1).min(j)].grx - points[i.saturating_sub(1)].grx;
            let s = span / (6.0 * (1.0 + m[i] * m[i]));
            Tangent {
                dgrx: or_zero(s),
                dgry: or_zero(m[i] * s),
            }
        })
        .collect()
}
