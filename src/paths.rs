//! User-drawn attractor curves.
//!
//! Each polyline pulls nearby agents toward its closest point and pushes them
//! along its direction of travel. Polylines are stored flat (one point buffer
//! plus start offsets) so the host can redraw every frame without the engine
//! chasing nested vectors.
//!
//! # Overlapping polylines
//!
//! When several polylines are within range, the closest point wins. Exact
//! ties go to the most recently added polyline: newer strokes override older
//! ones where they cross.

use glam::Vec3;

/// Closest path point found for an agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathHit {
    /// Closest point on the winning polyline.
    pub point: Vec3,
    /// Unit direction toward the next point of that polyline.
    pub flow: Vec3,
    /// Distance from the query position to `point`.
    pub distance: f32,
    /// Index of the winning polyline in draw order.
    pub polyline: usize,
}

/// Ordered set of polylines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawnPaths {
    points: Vec<Vec3>,
    /// Start offset of each polyline in `points`.
    starts: Vec<usize>,
}

impl DrawnPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a polyline. Later polylines win exact ties.
    pub fn push<I: IntoIterator<Item = Vec3>>(&mut self, polyline: I) {
        self.starts.push(self.points.len());
        self.points.extend(polyline);
    }

    /// Remove every polyline, keeping the buffers.
    pub fn clear(&mut self) {
        self.points.clear();
        self.starts.clear();
    }

    /// Number of polylines, including degenerate ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Points of polyline `index`.
    pub fn polyline(&self, index: usize) -> &[Vec3] {
        let start = self.starts[index];
        let end = self
            .starts
            .get(index + 1)
            .copied()
            .unwrap_or(self.points.len());
        &self.points[start..end]
    }

    /// Closest point within `radius` of `position` across all polylines.
    ///
    /// Empty polylines are ignored. A single-point polyline attracts but has
    /// no flow direction.
    pub fn nearest(&self, position: Vec3, radius: f32) -> Option<PathHit> {
        let mut best: Option<PathHit> = None;
        let mut best_dist = radius;

        for index in 0..self.len() {
            let line = self.polyline(index);
            match line {
                [] => continue,
                [only] => {
                    if !only.is_finite() {
                        continue;
                    }
                    let d = position.distance(*only);
                    if d <= best_dist {
                        best_dist = d;
                        best = Some(PathHit {
                            point: *only,
                            flow: Vec3::ZERO,
                            distance: d,
                            polyline: index,
                        });
                    }
                }
                _ => {
                    for seg in line.windows(2) {
                        let (a, b) = (seg[0], seg[1]);
                        if !(a.is_finite() && b.is_finite()) {
                            continue;
                        }
                        let point = closest_on_segment(position, a, b);
                        let d = position.distance(point);
                        // `<=` lets later polylines take exact ties.
                        if d <= best_dist {
                            best_dist = d;
                            best = Some(PathHit {
                                point,
                                flow: (b - a).try_normalize().unwrap_or(Vec3::ZERO),
                                distance: d,
                                polyline: index,
                            });
                        }
                    }
                }
            }
        }
        best
    }
}

/// Closest point to `p` on segment `ab`.
#[inline]
fn closest_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
