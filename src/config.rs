use thiserror::Error;

/// Window clear color, the 0x242424 page background of the effect.
/// wgpu clears in linear space, so this is sRGB 36/255 linearized.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01764,
    g: 0.01764,
    b: 0.01764,
    a: 1.0,
};

/// Per-frame increment of the shader time accumulator.
pub const TIME_STEP: f32 = 0.05;

/// UV displacement applied by the fragment shader per unit of field value.
pub const DISPLACEMENT_SCALE: f32 = 0.02;

/// Invalid construction parameters for the velocity field.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid dimensions must be at least 1x1, got {width}x{height}")]
    InvalidGridSize { width: u32, height: u32 },
    #[error("decay constants must be finite and positive, got {0}")]
    InvalidDecay(f32),
    #[error("radius divisor must be finite and positive, got {0}")]
    InvalidRadiusDivisor(f32),
}

/// Tunable parameters for the velocity field simulation.
///
/// Two presets exist for the two deployment profiles: [`desktop`] uses a
/// wide low grid with a tight impulse radius, [`compact`] (small screens)
/// a tall narrow grid with a proportionally larger radius and stronger
/// impulses so touch gestures read at the lower resolution.
///
/// [`desktop`]: FieldConfig::desktop
/// [`compact`]: FieldConfig::compact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    /// Grid width in cells.
    pub grid_width: u32,
    /// Grid height in cells.
    pub grid_height: u32,
    /// Per-tick multiplicative attenuation applied to every channel.
    pub decay: f32,
    /// Impulse radius is `grid_width / radius_divisor`, in grid units.
    pub radius_divisor: f32,
    /// Multiplier applied to pointer velocity when injecting impulses.
    pub amplification: f32,
    /// Per-tick attenuation of the pointer's velocity components.
    pub pointer_velocity_decay: f32,
}

impl FieldConfig {
    /// Desktop profile: 64x32 grid, decay 0.9, radius W/8, amplification 12.
    pub fn desktop() -> Self {
        Self {
            grid_width: 64,
            grid_height: 32,
            decay: 0.9,
            radius_divisor: 8.0,
            amplification: 12.0,
            pointer_velocity_decay: 0.9,
        }
    }

    /// Small-screen profile: 24x48 grid, slower decay, radius W/4,
    /// amplification 24.
    pub fn compact() -> Self {
        Self {
            grid_width: 24,
            grid_height: 48,
            decay: 0.92,
            radius_divisor: 4.0,
            amplification: 24.0,
            pointer_velocity_decay: 0.9,
        }
    }

    /// Check the configuration, rejecting parameters that would make the
    /// field degenerate (zero-size grid, non-positive decay or radius).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::InvalidGridSize {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        for decay in [self.decay, self.pointer_velocity_decay] {
            if !decay.is_finite() || decay <= 0.0 {
                return Err(ConfigError::InvalidDecay(decay));
            }
        }
        if !self.radius_divisor.is_finite() || self.radius_divisor <= 0.0 {
            return Err(ConfigError::InvalidRadiusDivisor(self.radius_divisor));
        }
        Ok(())
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::desktop()
    }
}
