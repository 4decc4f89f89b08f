//! Centripetal Catmull-Rom resampling of graph waypoints

use bevy::math::DVec3;

const CENTRIPETAL_ALPHA: f64 = 0.5;

/// Resample `points` with a centripetal Catmull-Rom spline.
///
/// Every input point is kept and `samples_per_segment - 1` interpolated
/// points are inserted between each consecutive pair. Callers re-project
/// the result onto the terrain.
pub fn catmull_rom_smooth(points: &[DVec3], samples_per_segment: u32) -> Vec<DVec3> {
    if points.len() < 3 || samples_per_segment <= 1 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut smoothed = Vec::with_capacity(last * samples_per_segment as usize + 1);

    for i in 0..last {
        let p1 = points[i];
        let p2 = points[i + 1];
        let p0 = if i == 0 { p1 * 2.0 - p2 } else { points[i - 1] };
        let p3 = if i + 2 > last {
            p2 * 2.0 - p1
        } else {
            points[i + 2]
        };

        smoothed.push(p1);
        for step in 1..samples_per_segment {
            let u = step as f64 / samples_per_segment as f64;
            smoothed.push(centripetal_point(p0, p1, p2, p3, u));
        }
    }
    smoothed.push(points[last]);
    smoothed
}

/// Barry-Goldman evaluation between `p1` and `p2` at fraction `u`
fn centripetal_point(p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3, u: f64) -> DVec3 {
    let knot = |a: DVec3, b: DVec3| a.distance(b).powf(CENTRIPETAL_ALPHA);

    let t0 = 0.0;
    let t1 = t0 + knot(p0, p1);
    let t2 = t1 + knot(p1, p2);
    let t3 = t2 + knot(p2, p3);

    if t2 - t1 <= f64::EPSILON {
        return p1.lerp(p2, u);
    }

    let blend = |a: DVec3, b: DVec3, ta: f64, tb: f64, t: f64| {
        if tb - ta <= f64::EPSILON {
            a
        } else {
            a * ((tb - t) / (tb - ta)) + b * ((t - ta) / (tb - ta))
        }
    };

    let t = t1 + (t2 - t1) * u;
    let a1 = blend(p0, p1, t0, t1, t);
    let a2 = blend(p1, p2, t1, t2, t);
    let a3 = blend(p2, p3, t2, t3, t);
    let b1 = blend(a1, a2, t0, t2, t);
    let b2 = blend(a2, a3, t1, t3, t);
    blend(b1, b2, t1, t2, t)
}

/// Total polyline length
pub fn path_length(points: &[DVec3]) -> f64 {
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}
