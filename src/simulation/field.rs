use rand::Rng;

use crate::config::{ConfigError, FieldConfig};
use crate::simulation::pointer::PointerState;

/// Decaying impulse field driven by pointer motion.
///
/// Cells are stored as a flat row-major buffer of `4 * width * height`
/// floats, four channels per cell at `4 * (i + width * j)`. The renderer
/// uploads this buffer verbatim as an RGBA float texture, sampled
/// nearest-neighbor, and uses the per-cell values to displace the photo.
///
/// Channel convention on impulse injection (the historical variants of
/// this effect disagree on channel 2; we keep the shipping behavior):
/// channel 0 adds the x-velocity, channel 2 adds the y-velocity, and
/// channels 1 and 3 subtract the y-velocity, each weighted by the
/// inverse-distance power falloff.
pub struct VelocityField {
    cells: Vec<f32>,
    width: u32,
    height: u32,
    config: FieldConfig,
    dirty: bool,
}

impl VelocityField {
    /// Allocate the grid and seed each cell with `(r, r, r, 255)` for an
    /// independent uniform `r` in `[0, 1)`.
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = rand::thread_rng();
        let cell_count = (config.grid_width * config.grid_height) as usize;
        let mut cells = Vec::with_capacity(cell_count * 4);
        for _ in 0..cell_count {
            let r = rng.gen::<f32>();
            cells.extend_from_slice(&[r, r, r, 255.0]);
        }
        Ok(Self {
            cells,
            width: config.grid_width,
            height: config.grid_height,
            config,
            dirty: true,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The flat channel buffer, row-major by `(i + width * j)`.
    pub fn as_slice(&self) -> &[f32] {
        &self.cells
    }

    /// Four channels of the cell at `(i, j)`.
    #[allow(dead_code)]
    pub fn cell(&self, i: u32, j: u32) -> [f32; 4] {
        let idx = 4 * (i + self.width * j) as usize;
        [
            self.cells[idx],
            self.cells[idx + 1],
            self.cells[idx + 2],
            self.cells[idx + 3],
        ]
    }

    /// Returns whether the buffer changed since the last call, clearing
    /// the flag. The renderer re-uploads the texture only when this is
    /// true.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Advance the field by one frame: decay every channel, inject the
    /// pointer's velocity into cells within the impulse radius, then decay
    /// the pointer velocity itself so a stationary pointer fades out.
    ///
    /// Values are deliberately unclamped; sustained fast motion grows
    /// them without bound and the shader side owns any tone mapping.
    pub fn tick(&mut self, pointer: &mut PointerState) {
        for channel in &mut self.cells {
            *channel *= self.config.decay;
        }

        let grid_x = self.width as f32 * pointer.x;
        // Pointer Y grows downward in the viewport; grid rows grow the
        // other way, so flip before mapping into grid space.
        let grid_y = self.height as f32 * (1.0 - pointer.y);
        let max_distance = self.width as f32 / self.config.radius_divisor;
        let max_distance_sq = max_distance * max_distance;
        let amp = self.config.amplification;

        for j in 0..self.height {
            for i in 0..self.width {
                let dx = grid_x - i as f32;
                let dy = grid_y - j as f32;
                let distance_sq = dx * dx + dy * dy;
                if distance_sq >= max_distance_sq {
                    continue;
                }
                // Inverse-distance falloff, clamped to 1 at the pointer's
                // own cell to avoid the near-zero denominator.
                let power = if distance_sq < 1.0 {
                    1.0
                } else {
                    max_distance / distance_sq.sqrt()
                };
                let idx = 4 * (i + self.width * j) as usize;
                self.cells[idx] += pointer.vx * power * amp;
                self.cells[idx + 1] -= pointer.vy * power * amp;
                self.cells[idx + 2] += pointer.vy * power * amp;
                self.cells[idx + 3] -= pointer.vy * power * amp;
            }
        }

        pointer.decay_velocity(self.config.pointer_velocity_decay);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(width: u32, height: u32) -> FieldConfig {
        FieldConfig {
            grid_width: width,
            grid_height: height,
            decay: 0.9,
            radius_divisor: 2.0,
            amplification: 12.0,
            pointer_velocity_decay: 0.9,
        }
    }

    #[test]
    fn test_construction_seeds_cells() {
        let field = VelocityField::new(FieldConfig::desktop()).unwrap();
        assert_eq!(field.as_slice().len(), 4 * 64 * 32);
        for j in 0..field.height() {
            for i in 0..field.width() {
                let [a, b, c, d] = field.cell(i, j);
                assert!((0.0..1.0).contains(&a), "seed out of range: {}", a);
                assert_eq!(a, b);
                assert_eq!(a, c);
                assert_eq!(d, 255.0);
            }
        }
    }

    #[test]
    fn test_zero_dimensions_fail_fast() {
        assert!(matches!(
            VelocityField::new(test_config(0, 4)),
            Err(ConfigError::InvalidGridSize { .. })
        ));
        assert!(matches!(
            VelocityField::new(test_config(4, 0)),
            Err(ConfigError::InvalidGridSize { .. })
        ));
    }

    #[test]
    fn test_zero_velocity_tick_is_pure_decay() {
        let mut field = VelocityField::new(test_config(8, 8)).unwrap();
        let before = field.as_slice().to_vec();
        // Pointer inside the radius but motionless.
        let mut pointer = PointerState::default();
        pointer.x = 0.5;
        pointer.y = 0.5;

        field.tick(&mut pointer);
        for (after, before) in field.as_slice().iter().zip(&before) {
            assert_eq!(*after, before * 0.9);
        }
    }

    #[test]
    fn test_repeated_decay_is_geometric() {
        let mut field = VelocityField::new(test_config(4, 4)).unwrap();
        let initial = field.as_slice().to_vec();
        let mut pointer = PointerState::default();

        let ticks = 10;
        for _ in 0..ticks {
            field.tick(&mut pointer);
        }
        let factor = 0.9f32.powi(ticks);
        for (after, before) in field.as_slice().iter().zip(&initial) {
            let expected = before * factor;
            assert!(
                (after - expected).abs() <= 1e-4 * expected.abs().max(1.0),
                "expected geometric decay {} after {} ticks, got {}",
                expected,
                ticks,
                after
            );
            assert!(*after >= 0.0, "decay must not oscillate below zero");
        }
    }

    #[test]
    fn test_impulse_confined_to_radius() {
        // 16x16 grid, radius 16/2 = 8 around the center (8, 8).
        let mut field = VelocityField::new(test_config(16, 16)).unwrap();
        let before = field.as_slice().to_vec();

        let mut pointer = PointerState::default();
        pointer.move_to(0.5, 0.5);
        pointer.vx = 0.1;
        pointer.vy = 0.0;
        field.tick(&mut pointer);

        for j in 0..16u32 {
            for i in 0..16u32 {
                let dx = 8.0 - i as f32;
                let dy = 8.0 - j as f32;
                let idx = 4 * (i + 16 * j) as usize;
                let decayed = before[idx] * 0.9;
                if dx * dx + dy * dy < 64.0 {
                    assert!(
                        field.as_slice()[idx] > decayed,
                        "cell ({}, {}) inside radius got no impulse",
                        i,
                        j
                    );
                } else {
                    assert_eq!(
                        field.as_slice()[idx],
                        decayed,
                        "cell ({}, {}) outside radius was modified",
                        i,
                        j
                    );
                }
            }
        }

        // Boundary check: (0, 8) is at distance 8, exactly on the radius,
        // so it only decays; (1, 8) at distance 7 is inside.
        let on_edge = 4 * (0 + 16 * 8) as usize;
        assert_eq!(field.as_slice()[on_edge], before[on_edge] * 0.9);
        let just_inside = 4 * (1 + 16 * 8) as usize;
        assert!(field.as_slice()[just_inside] > before[just_inside] * 0.9);
    }

    #[test]
    fn test_singularity_guard_at_pointer_cell() {
        // Pointer lands exactly on cell (2, 2) of a 4x4 grid, so the
        // distance is 0 and power must clamp to 1 rather than divide.
        let mut field = VelocityField::new(test_config(4, 4)).unwrap();
        let before = field.cell(2, 2);

        let mut pointer = PointerState::default();
        pointer.move_to(0.5, 0.5);
        pointer.vx = 0.1;
        pointer.vy = 0.0;
        field.tick(&mut pointer);

        // power = 1 => injection is exactly vx * 12 = 1.2, not
        // max_distance / 0 which would be infinite.
        let after = field.cell(2, 2);
        assert!((after[0] - (before[0] * 0.9 + 1.2)).abs() < 1e-5);
        assert!(after[0].is_finite());
    }

    #[test]
    fn test_pointer_velocity_decays_each_tick() {
        let mut field = VelocityField::new(test_config(4, 4)).unwrap();
        let mut pointer = PointerState::default();
        pointer.vx = 1.0;
        pointer.vy = -0.5;

        field.tick(&mut pointer);
        assert!((pointer.vx - 0.9).abs() < 1e-6);
        assert!((pointer.vy + 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_tick_marks_buffer_dirty() {
        let mut field = VelocityField::new(test_config(4, 4)).unwrap();
        // Construction uploads once.
        assert!(field.take_dirty());
        assert!(!field.take_dirty());

        let mut pointer = PointerState::default();
        field.tick(&mut pointer);
        assert!(field.take_dirty());
    }

    #[test]
    fn test_exact_values_4x4() {
        // W=H=4, decay 0.9, k=2 => max_distance = 2. Pointer at the
        // center (0.5, 0.5) maps to grid (2, 2); vx = 0.1, vy = 0,
        // amp = 12.
        let mut field = VelocityField::new(test_config(4, 4)).unwrap();
        let before = field.as_slice().to_vec();

        let mut pointer = PointerState::default();
        pointer.move_to(0.5, 0.5);
        pointer.vx = 0.1;
        pointer.vy = 0.0;
        field.tick(&mut pointer);

        for j in 0..4u32 {
            for i in 0..4u32 {
                let dx = 2.0 - i as f32;
                let dy = 2.0 - j as f32;
                let distance_sq = dx * dx + dy * dy;
                let power = if distance_sq >= 4.0 {
                    0.0
                } else if distance_sq < 1.0 {
                    1.0
                } else {
                    2.0 / distance_sq.sqrt()
                };

                let idx = 4 * (i + 4 * j) as usize;
                let expected = [
                    before[idx] * 0.9 + 0.1 * power * 12.0,
                    before[idx + 1] * 0.9,
                    before[idx + 2] * 0.9,
                    before[idx + 3] * 0.9,
                ];
                for ch in 0..4 {
                    assert!(
                        (field.as_slice()[idx + ch] - expected[ch]).abs() < 1e-4,
                        "cell ({}, {}) channel {}: expected {}, got {}",
                        i,
                        j,
                        ch,
                        expected[ch],
                        field.as_slice()[idx + ch]
                    );
                }
            }
        }

        // Spot-check the three power rings: the pointer's own cell gets
        // power 1, the four axis neighbors at distance 1 get power 2, the
        // diagonals at distance sqrt(2) get 2/sqrt(2).
        let center = field.cell(2, 2)[0] - before[4 * (2 + 4 * 2) as usize] * 0.9;
        assert!((center - 1.2).abs() < 1e-5);
        let axis = field.cell(1, 2)[0] - before[4 * (1 + 4 * 2) as usize] * 0.9;
        assert!((axis - 2.4).abs() < 1e-5);
        let diagonal = field.cell(1, 1)[0] - before[4 * (1 + 4 * 1) as usize] * 0.9;
        assert!((diagonal - 1.2 * 2.0 / 2.0f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_y_axis_is_flipped_into_grid_space() {
        // Pointer near the top of the viewport (y close to 0) must land
        // in high-j rows of the grid.
        let mut field = VelocityField::new(test_config(8, 8)).unwrap();
        let before = field.as_slice().to_vec();

        let mut pointer = PointerState::default();
        pointer.move_to(0.5, 0.05);
        pointer.vx = 0.2;
        pointer.vy = 0.0;
        field.tick(&mut pointer);

        // Bottom row of the grid (j = 0) maps to the viewport bottom and
        // is out of the radius-4 reach of grid position (4, 7.6).
        for i in 0..8u32 {
            let idx = 4 * i as usize;
            assert_eq!(field.as_slice()[idx], before[idx] * 0.9);
        }
        // The cell under the pointer got an impulse.
        let idx = 4 * (4 + 8 * 7) as usize;
        assert!(field.as_slice()[idx] > before[idx] * 0.9);
    }
}
