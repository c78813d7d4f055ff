use egui::{Color32, Pos2, Vec2, pos2};

use crate::config::CanvasConfig;
use crate::db::{ComponentId, Terminal};

pub const DEFAULT_WIRE_COLOR: Color32 = Color32::from_rgb(0x2e, 0xd5, 0x73);

/// Axis a segment drag moves along. A horizontal segment slides on Y, a
/// vertical one on X, so orthogonality is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// An orthogonally routed wire. `a`/`b` reference component terminals by id
/// and are resolved through the store; `points` is the full waypoint
/// polyline, whose first and last entries track the live terminal positions.
#[derive(Debug, Clone)]
pub struct Wire {
    pub a: Option<Terminal>,
    pub b: Option<Terminal>,
    pub points: Vec<Pos2>,
    pub color: Color32,
}

/// Intermediate corner of the default L route: run along the dominant axis
/// first, then turn.
pub fn orthogonal_point(from: Pos2, to: Pos2) -> Pos2 {
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    if dx > dy {
        pos2(to.x, from.y)
    } else {
        pos2(from.x, to.y)
    }
}

pub fn closest_point_on_segment(a: Pos2, b: Pos2, p: Pos2) -> Pos2 {
    let ab: Vec2 = b - a;
    let ap: Vec2 = p - a;
    let ab_len2 = ab.x * ab.x + ab.y * ab.y;
    if ab_len2 == 0.0 {
        return a;
    }
    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len2).clamp(0.0, 1.0);
    a + ab * t
}

impl Wire {
    /// A freshly completed wire with no manual bends: a single-bend L path,
    /// or a straight segment when source and target already share an axis.
    pub fn between(a: Terminal, b: Terminal, from: Pos2, to: Pos2, color: Color32) -> Self {
        let mut points = vec![from];
        let corner = orthogonal_point(from, to);
        if corner != from && corner != to {
            points.push(corner);
        }
        points.push(to);
        Self {
            a: Some(a),
            b: Some(b),
            points,
            color,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.a.is_some() && self.b.is_some()
    }

    pub fn involves(&self, comp: ComponentId) -> bool {
        self.a.is_some_and(|t| t.comp == comp) || self.b.is_some_and(|t| t.comp == comp)
    }

    /// Minimum distance from `p` to the polyline.
    pub fn distance_to(&self, p: Pos2) -> f32 {
        let mut min_dist = f32::INFINITY;
        for seg in self.points.windows(2) {
            let closest = closest_point_on_segment(seg[0], seg[1], p);
            min_dist = min_dist.min((p - closest).length());
        }
        min_dist
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn segment_midpoint(&self, index: usize) -> Option<Pos2> {
        let p1 = self.points.get(index)?;
        let p2 = self.points.get(index + 1)?;
        Some(pos2((p1.x + p2.x) * 0.5, (p1.y + p2.y) * 0.5))
    }

    /// A segment is draggable when it is long enough and not pinned to a
    /// terminal. A two-point wire is exempt from the terminal rule because
    /// `materialize_bend` duplicates both ends when it is grabbed.
    pub fn segment_draggable(&self, index: usize, cfg: &CanvasConfig) -> bool {
        let (Some(p1), Some(p2)) = (self.points.get(index), self.points.get(index + 1)) else {
            return false;
        };
        if (*p2 - *p1).length() < cfg.min_drag_segment {
            return false;
        }
        if self.points.len() > 2 {
            if index == 0 && self.a.is_some() {
                return false;
            }
            if index == self.points.len() - 2 && self.b.is_some() {
                return false;
            }
        }
        true
    }

    pub fn draggable_segments(&self, cfg: &CanvasConfig) -> Vec<usize> {
        (0..self.segment_count())
            .filter(|&i| self.segment_draggable(i, cfg))
            .collect()
    }

    /// Which axis a drag of segment `index` moves along.
    pub fn drag_axis(&self, index: usize) -> Axis {
        let p1 = self.points[index];
        let p2 = self.points[index + 1];
        let horizontal = (p1.x - p2.x).abs() > (p1.y - p2.y).abs();
        if horizontal { Axis::Y } else { Axis::X }
    }

    /// Prepares segment `index` for dragging by duplicating terminal-end
    /// waypoints, so the stub touching a terminal stays put and a new
    /// draggable segment appears in its place. Returns the index the drag
    /// should actually operate on.
    pub fn materialize_bend(&mut self, index: usize) -> usize {
        let mut index = index;
        if index == 0 && self.a.is_some() {
            let start = self.points[0];
            self.points.insert(0, start);
            index += 1;
        }
        if index == self.points.len().saturating_sub(2) && self.b.is_some() {
            let end = self.points[self.points.len() - 1];
            self.points.push(end);
        }
        index
    }

    /// Translates both endpoints of segment `index` along its drag axis.
    pub fn drag_segment(&mut self, index: usize, delta: Vec2) {
        if index + 1 >= self.points.len() {
            return;
        }
        match self.drag_axis(index) {
            Axis::X => {
                self.points[index].x += delta.x;
                self.points[index + 1].x += delta.x;
            }
            Axis::Y => {
                self.points[index].y += delta.y;
                self.points[index + 1].y += delta.y;
            }
        }
    }

    /// Pins the first/last waypoint to the current terminal positions.
    /// Interior waypoints stay fixed, which is what bends a wire when a
    /// connected component moves.
    pub fn sync_endpoints(&mut self, a_pos: Option<Pos2>, b_pos: Option<Pos2>) {
        if let Some(p) = a_pos
            && let Some(first) = self.points.first_mut()
        {
            *first = p;
        }
        if let Some(p) = b_pos
            && let Some(last) = self.points.last_mut()
        {
            *last = p;
        }
    }
}

/// Flattens the polyline into a renderable path with rounded bends.
/// Purely cosmetic; hit testing always uses the raw waypoints.
pub fn rounded_path(points: &[Pos2], radius: f32) -> Vec<Pos2> {
    const CORNER_STEPS: usize = 6;

    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * CORNER_STEPS);
    out.push(points[0]);
    for i in 1..points.len() - 1 {
        let corner = points[i];
        let v_in: Vec2 = corner - points[i - 1];
        let v_out: Vec2 = points[i + 1] - corner;
        let len_in = v_in.length();
        let len_out = v_out.length();
        if len_in <= f32::EPSILON || len_out <= f32::EPSILON {
            out.push(corner);
            continue;
        }
        let r = radius.min(len_in * 0.5).min(len_out * 0.5);
        let enter = corner - v_in / len_in * r;
        let exit = corner + v_out / len_out * r;
        out.push(enter);
        for s in 1..CORNER_STEPS {
            let t = s as f32 / CORNER_STEPS as f32;
            let a = enter.lerp(corner, t);
            let b = corner.lerp(exit, t);
            out.push(a.lerp(b, t));
        }
        out.push(exit);
    }
    out.push(points[points.len() - 1]);
    out
}
