use crate::wave;
use flagline_common::{ClothDims, WindParams};
use glam::Vec3;

/// Errors from cloth grid construction.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("cloth extents must be positive, got {width} x {height}")]
    NonPositiveExtent { width: f32, height: f32 },
    #[error("cloth subdivision must be nonzero, got {cols} x {rows}")]
    ZeroSubdivision { cols: u32, rows: u32 },
}

/// A flat rectangular cloth mesh centered on the origin, deformed in place
/// by the wind wave field.
///
/// Vertices are laid out row-major, top row first, left to right, matching a
/// plane subdivided into `cols` x `rows` cells. The rest-pose y snapshot is
/// captured once at construction and never written again; `apply_wind`
/// rewrites only the live y and z components.
pub struct ClothGrid {
    dims: ClothDims,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    rest_y: Vec<f32>,
}

impl ClothGrid {
    pub fn new(dims: ClothDims) -> Result<Self, GridError> {
        if dims.width <= 0.0 || dims.height <= 0.0 {
            return Err(GridError::NonPositiveExtent {
                width: dims.width,
                height: dims.height,
            });
        }
        if dims.cols == 0 || dims.rows == 0 {
            return Err(GridError::ZeroSubdivision {
                cols: dims.cols,
                rows: dims.rows,
            });
        }

        let cols = dims.cols as usize;
        let rows = dims.rows as usize;
        let mut positions = Vec::with_capacity(dims.vertex_count());
        for iy in 0..=rows {
            let y = dims.height / 2.0 - iy as f32 * dims.height / rows as f32;
            for ix in 0..=cols {
                let x = ix as f32 * dims.width / cols as f32 - dims.width / 2.0;
                positions.push(Vec3::new(x, y, 0.0));
            }
        }

        let mut indices = Vec::with_capacity(dims.index_count());
        for iy in 0..rows {
            for ix in 0..cols {
                let a = (ix + (cols + 1) * iy) as u32;
                let b = (ix + (cols + 1) * (iy + 1)) as u32;
                let c = (ix + 1 + (cols + 1) * (iy + 1)) as u32;
                let d = (ix + 1 + (cols + 1) * iy) as u32;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let rest_y = positions.iter().map(|p| p.y).collect();
        let normals = vec![Vec3::Z; positions.len()];

        tracing::debug!(
            vertices = positions.len(),
            triangles = indices.len() / 3,
            "built cloth grid"
        );

        Ok(Self {
            dims,
            positions,
            normals,
            indices,
            rest_y,
        })
    }

    pub fn dims(&self) -> &ClothDims {
        &self.dims
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

    /// Rest-pose y snapshot captured at construction.
    pub fn rest_y(&self) -> &[f32] {
        &self.rest_y
    }

    /// Deform the grid for elapsed time `t` and flag phase `phase`.
    ///
    /// Recomputes every vertex's y and z from the rest pose — nothing
    /// accumulates frame to frame — then refreshes vertex normals.
    pub fn apply_wind(&mut self, t: f32, phase: f32, wind: &WindParams) {
        for (i, pos) in self.positions.iter_mut().enumerate() {
            let (nx, ny) = wave::normalized(pos.x, self.rest_y[i], &self.dims);
            let (z, dy) = wave::displace(nx, ny, t, phase, wind);
            pos.z = z;
            pos.y = self.rest_y[i] + dy;
        }
        self.recompute_normals();
    }

    /// Area-weighted vertex normals: accumulate face cross products, then
    /// normalize. Degenerate vertices fall back to +Z.
    fn recompute_normals(&mut self) {
        self.normals.fill(Vec3::ZERO);
        for tri in self.indices.chunks_exact(3) {
            let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let a = self.positions[ia];
            let face = (self.positions[ib] - a).cross(self.positions[ic] - a);
            self.normals[ia] += face;
            self.normals[ib] += face;
            self.normals[ic] += face;
        }
        for n in &mut self.normals {
            *n = n.try_normalize().unwrap_or(Vec3::Z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ClothGrid {
        ClothGrid::new(ClothDims::default()).unwrap()
    }

    #[test]
    fn construction_counts() {
        let g = grid();
        let dims = ClothDims::default();
        assert_eq!(g.positions().len(), dims.vertex_count());
        assert_eq!(g.indices().len(), dims.index_count());
        assert_eq!(g.rest_y().len(), g.positions().len());
    }

    #[test]
    fn rest_pose_is_flat_and_centered() {
        let g = grid();
        for p in g.positions() {
            assert_eq!(p.z, 0.0);
            assert!(p.x.abs() <= 1.1 / 2.0 + 1e-6);
            assert!(p.y.abs() <= 0.85 / 2.0 + 1e-6);
        }
        // Top-left vertex comes first.
        let first = g.positions()[0];
        assert!((first.x + 0.55).abs() < 1e-6);
        assert!((first.y - 0.425).abs() < 1e-6);
    }

    #[test]
    fn invalid_dims_rejected() {
        let bad = ClothDims {
            width: 0.0,
            ..ClothDims::default()
        };
        assert!(matches!(
            ClothGrid::new(bad),
            Err(GridError::NonPositiveExtent { .. })
        ));

        let bad = ClothDims {
            rows: 0,
            ..ClothDims::default()
        };
        assert!(matches!(
            ClothGrid::new(bad),
            Err(GridError::ZeroSubdivision { .. })
        ));
    }

    #[test]
    fn rest_y_invariant_over_many_frames() {
        let mut g = grid();
        let before = g.rest_y().to_vec();
        let wind = WindParams::default();
        for frame in 0..200 {
            g.apply_wind(frame as f32 / 60.0, 0.7, &wind);
        }
        assert_eq!(g.rest_y(), &before[..]);
    }

    #[test]
    fn x_coordinates_never_move() {
        let mut g = grid();
        let before: Vec<f32> = g.positions().iter().map(|p| p.x).collect();
        g.apply_wind(3.7, 1.4, &WindParams::default());
        let after: Vec<f32> = g.positions().iter().map(|p| p.x).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn deformation_is_stateless_in_time() {
        let wind = WindParams::default();
        let mut a = grid();
        a.apply_wind(1.0, 0.7, &wind);
        a.apply_wind(5.0, 0.7, &wind);
        a.apply_wind(1.0, 0.7, &wind);

        let mut b = grid();
        b.apply_wind(1.0, 0.7, &wind);

        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn depth_stays_within_wind_bound() {
        let wind = WindParams::default();
        let mut g = grid();
        for frame in 0..120 {
            g.apply_wind(frame as f32 * 0.05, 2.1, &wind);
            for p in g.positions() {
                assert!(p.z.abs() <= wind.max_depth() + 1e-6);
            }
        }
    }

    #[test]
    fn normals_unit_length_after_deformation() {
        let mut g = grid();
        g.apply_wind(2.3, 0.0, &WindParams::default());
        for n in g.normals() {
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn distinct_phases_give_distinct_shapes() {
        let wind = WindParams::default();
        let mut a = grid();
        let mut b = grid();
        a.apply_wind(1.0, 0.0, &wind);
        b.apply_wind(1.0, 0.7, &wind);
        assert_ne!(a.positions(), b.positions());
    }
}
