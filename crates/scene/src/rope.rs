use glam::Vec3;

/// Catmull-Rom spline through a set of control points, endpoints clamped.
///
/// Uniform parameterization: `sample(i / (n - 1))` returns control point `i`
/// exactly, and the curve interpolates smoothly between neighbors.
pub struct RopeCurve {
    points: Vec<Vec3>,
}

impl RopeCurve {
    pub fn new(points: Vec<Vec3>) -> Self {
        assert!(points.len() >= 2, "rope curve needs at least 2 points");
        Self { points }
    }

    /// The drooping rope span the flag line hangs from. `total_width` is the
    /// distance between the first and last flag centers.
    pub fn spanning(total_width: f32) -> Self {
        let tw = total_width;
        Self::new(vec![
            Vec3::new(-tw / 2.0 - 0.8, 0.55, 0.0),
            Vec3::new(-tw / 4.0, 0.48, 0.05),
            Vec3::new(0.0, 0.45, 0.0),
            Vec3::new(tw / 4.0, 0.48, -0.05),
            Vec3::new(tw / 2.0 + 0.8, 0.55, 0.0),
        ])
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Evaluate the curve at `u` in [0, 1] (clamped).
    pub fn sample(&self, u: f32) -> Vec3 {
        let n_seg = self.points.len() - 1;
        let scaled = u.clamp(0.0, 1.0) * n_seg as f32;
        let i = (scaled.floor() as usize).min(n_seg - 1);
        let t = scaled - i as f32;

        let p0 = self.points[i.saturating_sub(1)];
        let p1 = self.points[i];
        let p2 = self.points[i + 1];
        let p3 = self.points[(i + 2).min(self.points.len() - 1)];

        let t2 = t * t;
        let t3 = t2 * t;
        0.5 * (2.0 * p1
            + (p2 - p0) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
    }

    /// Curve tangent at `u`, via central differences (one-sided at the ends).
    pub fn tangent(&self, u: f32) -> Vec3 {
        let eps = 1e-3;
        let a = self.sample((u - eps).max(0.0));
        let b = self.sample((u + eps).min(1.0));
        (b - a).try_normalize().unwrap_or(Vec3::X)
    }
}

/// Triangle mesh of a tube swept along a rope curve.
pub struct RopeMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl RopeMesh {
    /// Sweep a circular cross-section of `radius` along `curve`.
    /// `tubular_segments` rings along the length, `radial_segments` vertices
    /// per ring.
    pub fn sweep(
        curve: &RopeCurve,
        tubular_segments: u32,
        radius: f32,
        radial_segments: u32,
    ) -> Self {
        let tubular = tubular_segments as usize;
        let radial = radial_segments as usize;
        let mut positions = Vec::with_capacity((tubular + 1) * radial);
        let mut normals = Vec::with_capacity((tubular + 1) * radial);

        for i in 0..=tubular {
            let u = i as f32 / tubular as f32;
            let center = curve.sample(u);
            let tangent = curve.tangent(u);

            // Reference frame: project the world up vector off the tangent.
            let up = if tangent.dot(Vec3::Y).abs() > 0.99 {
                Vec3::Z
            } else {
                Vec3::Y
            };
            let normal = (up - tangent * tangent.dot(up)).normalize();
            let binormal = tangent.cross(normal);

            for j in 0..radial {
                let angle = j as f32 / radial as f32 * std::f32::consts::TAU;
                let dir = normal * angle.cos() + binormal * angle.sin();
                positions.push(center + dir * radius);
                normals.push(dir);
            }
        }

        let mut indices = Vec::with_capacity(tubular * radial * 6);
        for i in 0..tubular {
            for j in 0..radial {
                let j1 = (j + 1) % radial;
                let a = (i * radial + j) as u32;
                let a1 = (i * radial + j1) as u32;
                let b = ((i + 1) * radial + j) as u32;
                let b1 = ((i + 1) * radial + j1) as u32;
                // Wound so face normals point outward.
                indices.extend_from_slice(&[a, a1, b, a1, b1, b]);
            }
        }

        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_interpolates_control_points() {
        let curve = RopeCurve::spanning(5.0);
        let points = curve.points().to_vec();
        assert_eq!(points.len(), 5);

        assert!((curve.sample(0.0) - points[0]).length() < 1e-5);
        assert!((curve.sample(0.25) - points[1]).length() < 1e-5);
        assert!((curve.sample(0.5) - points[2]).length() < 1e-5);
        assert!((curve.sample(1.0) - points[4]).length() < 1e-5);
    }

    #[test]
    fn curve_droops_at_center() {
        let curve = RopeCurve::spanning(5.0);
        let end_y = curve.sample(0.0).y;
        let mid_y = curve.sample(0.5).y;
        assert!(mid_y < end_y);
    }

    #[test]
    fn sample_clamps_out_of_range() {
        let curve = RopeCurve::spanning(5.0);
        assert_eq!(curve.sample(-1.0), curve.sample(0.0));
        assert_eq!(curve.sample(2.0), curve.sample(1.0));
    }

    #[test]
    fn tube_counts() {
        let curve = RopeCurve::spanning(5.0);
        let mesh = RopeMesh::sweep(&curve, 40, 0.012, 6);
        assert_eq!(mesh.positions().len(), 41 * 6);
        assert_eq!(mesh.indices().len(), 40 * 6 * 6);
        assert_eq!(mesh.normals().len(), mesh.positions().len());
    }

    #[test]
    fn tube_ring_sits_on_radius() {
        let curve = RopeCurve::spanning(5.0);
        let mesh = RopeMesh::sweep(&curve, 40, 0.012, 6);
        let center = curve.sample(0.0);
        for p in &mesh.positions()[..6] {
            assert!(((*p - center).length() - 0.012).abs() < 1e-5);
        }
    }

    #[test]
    fn tube_normals_unit_length() {
        let curve = RopeCurve::spanning(5.0);
        let mesh = RopeMesh::sweep(&curve, 40, 0.012, 6);
        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }
}
