use shared::Coordinate;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two WGS84 coordinates.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Point a fraction `f` of the great-circle arc from `a` to `b`.
///
/// `f = 0` returns `a`, `f = 1` returns `b`. Coincident or antipodal pairs
/// degrade to linear interpolation, where the slerp denominator vanishes.
pub fn interpolate(a: Coordinate, b: Coordinate, f: f64) -> Coordinate {
    let (ax, ay, az) = to_unit_vector(a);
    let (bx, by, bz) = to_unit_vector(b);

    let dot = (ax * bx + ay * by + az * bz).clamp(-1.0, 1.0);
    let omega = dot.acos();
    let sin_omega = omega.sin();

    if sin_omega.abs() < 1e-12 {
        return Coordinate {
            lat: a.lat + (b.lat - a.lat) * f,
            lon: a.lon + (b.lon - a.lon) * f,
        };
    }

    let wa = ((1.0 - f) * omega).sin() / sin_omega;
    let wb = (f * omega).sin() / sin_omega;

    from_unit_vector(wa * ax + wb * bx, wa * ay + wb * by, wa * az + wb * bz)
}

/// Total great-circle length of a polyline in meters.
pub fn path_length_m(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}

/// Per-segment great-circle lengths, `segment_lengths_m(path).len() == path.len() - 1`.
pub fn segment_lengths_m(path: &[Coordinate]) -> Vec<f64> {
    path.windows(2).map(|w| haversine_m(w[0], w[1])).collect()
}

/// Snap `point` to the closest position on `path`.
///
/// Each segment is searched with a clamped planar projection (longitude
/// scaled by cos(latitude)), then candidates are ranked by great-circle
/// distance. The planar step is an approximation, acceptable because route
/// polylines are locally near-linear at snapping scale. Paths with fewer
/// than two points return the input unchanged.
pub fn snap_to_path(point: Coordinate, path: &[Coordinate]) -> Coordinate {
    if path.len() < 2 {
        return point;
    }

    let mut best = point;
    let mut best_dist = f64::INFINITY;

    for w in path.windows(2) {
        let f = projection_fraction(point, w[0], w[1]).clamp(0.0, 1.0);
        let candidate = interpolate(w[0], w[1], f);
        let dist = haversine_m(point, candidate);
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    }

    best
}

/// Fractional position of `p`'s projection along segment `a -> b`, unclamped.
fn projection_fraction(p: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let mean_lat = ((a.lat + b.lat) / 2.0).to_radians();
    let scale = mean_lat.cos();

    let dx = (b.lon - a.lon) * scale;
    let dy = b.lat - a.lat;
    let px = (p.lon - a.lon) * scale;
    let py = p.lat - a.lat;

    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        return 0.0;
    }
    (px * dx + py * dy) / len_sq
}

fn to_unit_vector(c: Coordinate) -> (f64, f64, f64) {
    let lat = c.lat.to_radians();
    let lon = c.lon.to_radians();
    (lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

fn from_unit_vector(x: f64, y: f64, z: f64) -> Coordinate {
    let hyp = (x * x + y * y).sqrt();
    Coordinate {
        lat: z.atan2(hyp).to_degrees(),
        lon: y.atan2(x).to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_haversine_same_point() {
        let point = Coordinate::new(45.0, 5.0);
        assert_eq!(haversine_m(point, point), 0.0);
    }

    #[test]
    fn test_haversine_symmetry() {
        let a = Coordinate::new(45.0, 5.0);
        let b = Coordinate::new(46.0, 6.0);
        assert_eq!(haversine_m(a, b), haversine_m(b, a));
    }

    #[test]
    fn test_haversine_known_distance() {
        // Paris to London, ~343 km
        let paris = Coordinate::new(48.8566, 2.3522);
        let london = Coordinate::new(51.5074, -0.1278);
        let dist = haversine_m(paris, london);
        assert!((dist - 343_000.0).abs() < 5_000.0);
    }

    #[test]
    fn test_one_degree_of_equator() {
        let dist = haversine_m(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((dist - 111_195.0).abs() < 10.0);
    }

    #[test]
    fn test_interpolate_endpoints() {
        let a = Coordinate::new(45.0, 5.0);
        let b = Coordinate::new(46.0, 7.0);
        let start = interpolate(a, b, 0.0);
        let end = interpolate(a, b, 1.0);
        assert!(close(start.lat, a.lat, 1e-9) && close(start.lon, a.lon, 1e-9));
        assert!(close(end.lat, b.lat, 1e-9) && close(end.lon, b.lon, 1e-9));
    }

    #[test]
    fn test_interpolate_midpoint_on_equator() {
        let mid = interpolate(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 2.0), 0.5);
        assert!(close(mid.lat, 0.0, 1e-9));
        assert!(close(mid.lon, 1.0, 1e-9));
    }

    #[test]
    fn test_interpolate_identical_points() {
        let a = Coordinate::new(51.0, -114.0);
        let mid = interpolate(a, a, 0.5);
        assert!(close(mid.lat, a.lat, 1e-9) && close(mid.lon, a.lon, 1e-9));
    }

    #[test]
    fn test_path_length_empty_and_single() {
        assert_eq!(path_length_m(&[]), 0.0);
        assert_eq!(path_length_m(&[Coordinate::new(45.0, 5.0)]), 0.0);
    }

    #[test]
    fn test_snap_short_path_returns_input() {
        let p = Coordinate::new(45.0, 5.0);
        let snapped = snap_to_path(p, &[Coordinate::new(44.0, 4.0)]);
        assert_eq!(snapped, p);
    }

    #[test]
    fn test_snap_onto_straight_segment() {
        // Point just north of the equator snaps down onto it.
        let path = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)];
        let snapped = snap_to_path(Coordinate::new(0.01, 0.5), &path);
        assert!(close(snapped.lat, 0.0, 1e-4));
        assert!(close(snapped.lon, 0.5, 1e-4));
    }

    #[test]
    fn test_snap_clamps_to_segment_ends() {
        let path = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)];
        let snapped = snap_to_path(Coordinate::new(0.0, 2.0), &path);
        assert!(close(snapped.lon, 1.0, 1e-6));
    }

    #[test]
    fn test_snap_picks_globally_closest_segment() {
        // An L-shaped path; the point sits near the second arm.
        let path = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
        ];
        let snapped = snap_to_path(Coordinate::new(0.5, 1.01), &path);
        assert!(close(snapped.lon, 1.0, 1e-3));
        assert!(close(snapped.lat, 0.5, 1e-3));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-80.0..=80.0, -179.0..=179.0).prop_map(|(lat, lon)| Coordinate { lat, lon })
        }

        proptest! {
            #[test]
            fn prop_haversine_non_negative(a in valid_coord(), b in valid_coord()) {
                prop_assert!(haversine_m(a, b) >= 0.0);
            }

            #[test]
            fn prop_haversine_symmetric(a in valid_coord(), b in valid_coord()) {
                let ab = haversine_m(a, b);
                let ba = haversine_m(b, a);
                prop_assert!((ab - ba).abs() < 1e-6);
            }

            #[test]
            fn prop_haversine_bounded_by_half_circumference(
                a in valid_coord(),
                b in valid_coord()
            ) {
                let max = std::f64::consts::PI * 6_371_000.0;
                prop_assert!(haversine_m(a, b) <= max + 1.0);
            }

            #[test]
            fn prop_interpolate_stays_between_endpoints(
                a in valid_coord(),
                b in valid_coord(),
                f in 0.0f64..=1.0
            ) {
                // The distance from a to the interpolated point never exceeds
                // the full arc length (with a small float allowance).
                let arc = haversine_m(a, b);
                let p = interpolate(a, b, f);
                prop_assert!(haversine_m(a, p) <= arc + 1.0);
            }

            #[test]
            fn prop_interpolate_fraction_scales_distance(
                a in valid_coord(),
                b in valid_coord(),
                f in 0.0f64..=1.0
            ) {
                prop_assume!(haversine_m(a, b) > 1_000.0);
                let p = interpolate(a, b, f);
                let expected = haversine_m(a, b) * f;
                let got = haversine_m(a, p);
                prop_assert!((got - expected).abs() < expected.max(1.0) * 0.01 + 1.0);
            }

            #[test]
            fn prop_snap_result_no_farther_than_vertices(
                base in valid_coord(),
                offsets in prop::collection::vec((-0.1f64..=0.1, -0.1f64..=0.1), 3..8),
                (dp_lat, dp_lon) in (-0.1f64..=0.1, -0.1f64..=0.1)
            ) {
                // Local-scale path, where the planar projection holds.
                let path: Vec<Coordinate> = offsets
                    .iter()
                    .map(|(dlat, dlon)| Coordinate::new(base.lat + dlat, base.lon + dlon))
                    .collect();
                let p = Coordinate::new(base.lat + dp_lat, base.lon + dp_lon);
                let snapped = snap_to_path(p, &path);
                let nearest_vertex = path
                    .iter()
                    .map(|v| haversine_m(p, *v))
                    .fold(f64::INFINITY, f64::min);
                // Clamped projection always considers the segment endpoints,
                // so snapping never does worse than the best vertex.
                prop_assert!(haversine_m(p, snapped) <= nearest_vertex + 1.0);
            }
        }
    }
}
