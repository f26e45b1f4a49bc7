use flagline_common::{ClothDims, WindParams};

/// Weight of the horizontal coordinate in the freedom blend. The right edge
/// of a flag hangs free while the left edge is stitched to the rope.
const FREEDOM_X: f32 = 0.7;
/// Weight of the vertical coordinate in the freedom blend. The bottom edge
/// hangs free while the top edge is attached.
const FREEDOM_Y: f32 = 0.3;

/// Map a rest-pose vertex position to normalized flag coordinates:
/// nx is 0 at the attached left edge and 1 at the free right edge;
/// ny is 0 at the top edge and 1 at the bottom edge.
pub fn normalized(x: f32, y: f32, dims: &ClothDims) -> (f32, f32) {
    let nx = x / dims.width + 0.5;
    let ny = 1.0 - (y / dims.height + 0.5);
    (nx, ny)
}

/// How unconstrained a vertex is relative to the attachment edge.
/// 0 at the stitched top-left corner, 1 at the free bottom-right corner.
pub fn freedom(nx: f32, ny: f32) -> f32 {
    nx * FREEDOM_X + ny * FREEDOM_Y
}

/// Displace one vertex for elapsed time `t` and flag phase `phase`.
///
/// Returns `(z, dy)`: the depth offset and the vertical offset to add to the
/// rest-pose y. Pure function of its arguments; total for all inputs.
pub fn displace(nx: f32, ny: f32, t: f32, phase: f32, wind: &WindParams) -> (f32, f32) {
    let freedom = freedom(nx, ny);

    let gust = (nx * wind.gust_spatial + t * wind.gust_speed + phase).sin()
        * wind.gust_amplitude
        * freedom;
    let ripple = (nx * wind.ripple_spatial + t * wind.ripple_speed
        + phase * wind.ripple_phase_scale)
        .sin()
        * wind.ripple_amplitude
        * freedom;
    let cross = (ny * wind.cross_spatial + t * wind.cross_speed
        + phase * wind.cross_phase_scale)
        .cos()
        * wind.cross_amplitude
        * freedom;

    let sway = (t * wind.sway_speed + nx * wind.sway_spatial + phase).sin()
        * wind.sway_amplitude
        * ny;

    (gust + ripple + cross, sway)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freedom_bounded_on_unit_square() {
        for i in 0..=10 {
            for j in 0..=10 {
                let nx = i as f32 / 10.0;
                let ny = j as f32 / 10.0;
                let f = freedom(nx, ny);
                assert!((0.0..=1.0).contains(&f), "freedom {f} out of range");
            }
        }
        assert_eq!(freedom(0.0, 0.0), 0.0);
        assert!((freedom(1.0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_edges() {
        let dims = ClothDims::default();
        // Attached top-left corner.
        let (nx, ny) = normalized(-dims.width / 2.0, dims.height / 2.0, &dims);
        assert!(nx.abs() < 1e-6);
        assert!(ny.abs() < 1e-6);
        // Free bottom-right corner.
        let (nx, ny) = normalized(dims.width / 2.0, -dims.height / 2.0, &dims);
        assert!((nx - 1.0).abs() < 1e-6);
        assert!((ny - 1.0).abs() < 1e-6);
    }

    #[test]
    fn displacement_matches_formula_at_origin_of_time() {
        let wind = WindParams::default();
        let (nx, ny) = (0.75, 0.25);
        let (z, dy) = displace(nx, ny, 0.0, 0.0, &wind);

        let f = 0.7 * nx + 0.3 * ny;
        let expected_z = (4.0 * nx).sin() * 0.12 * f
            + (7.0 * nx).sin() * 0.04 * f
            + (3.0 * ny).cos() * 0.03 * f;
        let expected_dy = (2.0 * nx).sin() * 0.015 * ny;

        assert!((z - expected_z).abs() < 1e-6);
        assert!((dy - expected_dy).abs() < 1e-6);
    }

    #[test]
    fn depth_bounded_by_wind_amplitudes() {
        let wind = WindParams::default();
        let bound = wind.max_depth();
        for step in 0..200 {
            let t = step as f32 * 0.173;
            let (z, dy) = displace(0.9, 0.8, t, 1.4, &wind);
            assert!(z.abs() <= bound + 1e-6);
            assert!(dy.abs() <= wind.max_sway() + 1e-6);
        }
    }

    #[test]
    fn attached_corner_never_moves() {
        let wind = WindParams::default();
        for step in 0..50 {
            let t = step as f32 * 0.31;
            let (z, dy) = displace(0.0, 0.0, t, 2.1, &wind);
            assert_eq!(z, 0.0);
            assert_eq!(dy, 0.0);
        }
    }

    #[test]
    fn phases_desynchronize() {
        let wind = WindParams::default();
        let a = displace(0.5, 0.5, 1.0, 0.0, &wind);
        let b = displace(0.5, 0.5, 1.0, 0.7, &wind);
        assert_ne!(a, b);
    }
}
