use egui::{Pos2, Rect};

/// Number of samples taken along a fitted spline.
pub const CURVE_SAMPLES: usize = 100;

/// Minimum number of distinct control points needed for a cubic fit.
pub const MIN_SPLINE_POINTS: usize = 4;

/// Distance from `p` to the segment `a..b`, clamping the projection to the segment.
pub fn distance_point_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    if a == b {
        return p.distance(a);
    }

    let ab = b - a;
    let t = ((p - a).dot(ab) / ab.length_sq()).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Minimum distance from `p` to a polyline. A single point counts as a degenerate segment.
pub fn polyline_distance(points: &[Pos2], p: Pos2) -> Option<f32> {
    match points {
        [] => None,
        [only] => Some(p.distance(*only)),
        _ => points
            .windows(2)
            .map(|w| distance_point_to_segment(p, w[0], w[1]))
            .reduce(f32::min),
    }
}

/// Returns the index a new control point should be inserted at so that it lands
/// on the segment closest to `point`. Ties resolve to the lowest segment.
pub fn nearest_segment_index(control_points: &[Pos2], point: Pos2) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, w) in control_points.windows(2).enumerate() {
        let distance = distance_point_to_segment(point, w[0], w[1]);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((i + 1, distance)),
        }
    }
    best.map(|(index, _)| index)
}

/// Axis-aligned bounds of a set of points
pub fn bounding_rect(points: &[Pos2]) -> Rect {
    points.iter().fold(Rect::NOTHING, |rect, p| rect.union(Rect::from_min_max(*p, *p)))
}

/// Douglas-Peucker polyline reduction.
///
/// Endpoints are always kept. Interior points closer than `tolerance` to the
/// segment that replaces them are dropped. With a non-positive tolerance, or
/// fewer than two points, the input is returned unchanged.
pub fn simplify(points: &[Pos2], tolerance: f32) -> Vec<Pos2> {
    if tolerance <= 0.0 || points.len() < 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut spans = vec![(0, last)];
    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }

        let (a, b) = (points[start], points[end]);
        let (index, distance) = (start + 1..end)
            .map(|i| (i, distance_point_to_segment(points[i], a, b)))
            .fold((start, -1.0), |best, candidate| if candidate.1 > best.1 { candidate } else { best });

        if distance > tolerance {
            keep[index] = true;
            spans.push((start, index));
            spans.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Runs `strength` passes of three-point averaging over the interior points.
///
/// Every pass reads only the previous pass's values. The first and last points never move.
pub fn smooth(points: &[Pos2], strength: u32) -> Vec<Pos2> {
    let mut current = points.to_vec();
    if strength == 0 || points.len() < 3 {
        return current;
    }

    let mut next = current.clone();
    for _ in 0..strength {
        for i in 1..current.len() - 1 {
            let sum = current[i - 1].to_vec2() + current[i].to_vec2() + current[i + 1].to_vec2();
            next[i] = (sum / 3.0).to_pos2();
        }
        std::mem::swap(&mut current, &mut next);
    }
    current
}

/// Fits renderable geometry through the control points.
///
/// * fewer than 2 points: empty
/// * 2 or 3 points: the straight polyline through them
/// * 4 or more: a not-a-knot cubic spline parameterized by chord length and
///   sampled [`CURVE_SAMPLES`] times. It passes through every control point.
pub fn fit_curve(control_points: &[Pos2]) -> Vec<Pos2> {
    if control_points.len() < 2 {
        return Vec::new();
    }
    if control_points.len() < MIN_SPLINE_POINTS {
        return control_points.to_vec();
    }

    // Repeated points have zero chord length and cannot be parameterized.
    let mut distinct = control_points.to_vec();
    distinct.dedup();
    if distinct.len() < MIN_SPLINE_POINTS {
        return control_points.to_vec();
    }

    let mut knots = Vec::with_capacity(distinct.len());
    let mut total = 0.0f64;
    knots.push(0.0);
    for w in distinct.windows(2) {
        total += f64::from(w[0].distance(w[1]));
        knots.push(total);
    }
    for t in &mut knots {
        *t /= total;
    }

    let xs: Vec<f64> = distinct.iter().map(|p| f64::from(p.x)).collect();
    let ys: Vec<f64> = distinct.iter().map(|p| f64::from(p.y)).collect();
    let spline_x = CubicSpline::not_a_knot(&knots, &xs);
    let spline_y = CubicSpline::not_a_knot(&knots, &ys);

    (0..CURVE_SAMPLES)
        .map(|i| {
            let t = i as f64 / (CURVE_SAMPLES - 1) as f64;
            Pos2::new(spline_x.eval(t) as f32, spline_y.eval(t) as f32)
        })
        .collect()
}

/// One coordinate of an interpolating cubic spline, stored as knot values and
/// second derivatives.
struct CubicSpline<'a> {
    knots: &'a [f64],
    values: &'a [f64],
    second: Vec<f64>,
}

impl<'a> CubicSpline<'a> {
    /// Requires at least four strictly increasing knots.
    fn not_a_knot(knots: &'a [f64], values: &'a [f64]) -> Self {
        let n = knots.len() - 1;
        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        let slope = |i: usize| (values[i + 1] - values[i]) / h[i];

        // Unknowns are M_1..M_{n-1}. M_0 and M_n are eliminated with the
        // third-derivative continuity conditions at the first and last interior knots.
        let m = n - 1;
        let mut lower = vec![0.0; m];
        let mut diag = vec![0.0; m];
        let mut upper = vec![0.0; m];
        let mut rhs = vec![0.0; m];

        for row in 0..m {
            let i = row + 1;
            lower[row] = h[i - 1];
            diag[row] = 2.0 * (h[i - 1] + h[i]);
            upper[row] = h[i];
            rhs[row] = 6.0 * (slope(i) - slope(i - 1));
        }

        // M_0 = (1 + h0/h1) M_1 - (h0/h1) M_2
        let r0 = h[0] / h[1];
        diag[0] += h[0] * (1.0 + r0);
        upper[0] -= h[0] * r0;
        // M_n = (1 + h_{n-1}/h_{n-2}) M_{n-1} - (h_{n-1}/h_{n-2}) M_{n-2}
        let rn = h[n - 1] / h[n - 2];
        diag[m - 1] += h[n - 1] * (1.0 + rn);
        lower[m - 1] -= h[n - 1] * rn;

        let interior = solve_tridiagonal(&lower, &diag, &upper, &mut rhs);

        let mut second = Vec::with_capacity(n + 1);
        second.push((1.0 + r0) * interior[0] - r0 * interior[1]);
        second.extend_from_slice(&interior);
        second.push((1.0 + rn) * interior[m - 1] - rn * interior[m - 2]);

        Self {
            knots,
            values,
            second,
        }
    }

    fn eval(&self, t: f64) -> f64 {
        let last = self.knots.len() - 2;
        let k = self
            .knots
            .windows(2)
            .position(|w| t <= w[1])
            .unwrap_or(last);

        let (t0, t1) = (self.knots[k], self.knots[k + 1]);
        let h = t1 - t0;
        let (a, b) = (t1 - t, t - t0);
        let (m0, m1) = (self.second[k], self.second[k + 1]);

        m0 * a * a * a / (6.0 * h)
            + m1 * b * b * b / (6.0 * h)
            + (self.values[k] / h - m0 * h / 6.0) * a
            + (self.values[k + 1] / h - m1 * h / 6.0) * b
    }
}

/// Thomas algorithm. `lower[0]` and `upper[last]` are ignored.
fn solve_tridiagonal(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &mut [f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = diag.to_vec();

    for i in 1..n {
        let w = lower[i] / d[i - 1];
        d[i] -= w * upper[i - 1];
        rhs[i] -= w * rhs[i - 1];
    }

    c[n - 1] = rhs[n - 1] / d[n - 1];
    for i in (0..n - 1).rev() {
        c[i] = (rhs[i] - upper[i] * c[i + 1]) / d[i];
    }
    c
}
