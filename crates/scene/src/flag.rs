use flagline_cloth::{ClothGrid, GridError};
use flagline_common::{ClothDims, WindParams};

/// One flag hanging on the rope: a cloth grid plus its placement on the line.
pub struct Flag {
    grid: ClothGrid,
    x_offset: f32,
    phase: f32,
    color: [f32; 3],
}

impl Flag {
    pub fn new(
        dims: ClothDims,
        x_offset: f32,
        phase: f32,
        color: [f32; 3],
    ) -> Result<Self, GridError> {
        Ok(Self {
            grid: ClothGrid::new(dims)?,
            x_offset,
            phase,
            color,
        })
    }

    /// Horizontal placement of the flag center along the rope.
    pub fn x_offset(&self) -> f32 {
        self.x_offset
    }

    /// Phase offset shifting this flag's wave arguments.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn grid(&self) -> &ClothGrid {
        &self.grid
    }

    /// Deform the cloth for elapsed time `t`.
    pub fn deform(&mut self, t: f32, wind: &WindParams) {
        self.grid.apply_wind(t, self.phase, wind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_carries_placement() {
        let flag = Flag::new(ClothDims::default(), 1.25, 0.7, [1.0, 0.0, 0.0]).unwrap();
        assert_eq!(flag.x_offset(), 1.25);
        assert_eq!(flag.phase(), 0.7);
    }

    #[test]
    fn deform_uses_own_phase() {
        let wind = WindParams::default();
        let mut a = Flag::new(ClothDims::default(), 0.0, 0.0, [1.0; 3]).unwrap();
        let mut b = Flag::new(ClothDims::default(), 0.0, 1.4, [1.0; 3]).unwrap();
        a.deform(1.0, &wind);
        b.deform(1.0, &wind);
        assert_ne!(a.grid().positions(), b.grid().positions());
    }
}
