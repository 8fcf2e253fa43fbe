/// Normalized pointer state fed into the velocity field each tick.
///
/// Position lives in `[0, 1]^2` with the origin at the top-left of the
/// viewport. Velocity is measured once per input event as the delta from
/// the previous event's position; the field decays it every tick so a
/// pointer that stops moving fades out even without further events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    prev_x: f32,
    prev_y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl PointerState {
    /// Record a new normalized position and derive the event velocity.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.vx = x - self.prev_x;
        self.vy = y - self.prev_y;
        self.prev_x = x;
        self.prev_y = y;
    }

    /// Attenuate the velocity components by `factor`.
    pub fn decay_velocity(&mut self, factor: f32) {
        self.vx *= factor;
        self.vy *= factor;
    }
}

/// Which platform event stream drives the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// Normalizes device pointer coordinates into a [`PointerState`].
///
/// Exactly one input source drives the tracker: the first event seen
/// (mouse or touch) locks the source and events from the other kind are
/// ignored afterwards, so a trackpad tap arriving alongside synthesized
/// mouse events cannot double-inject velocity.
#[derive(Debug)]
pub struct PointerTracker {
    state: PointerState,
    source: Option<PointerSource>,
    viewport_width: f32,
    viewport_height: f32,
}

impl PointerTracker {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            state: PointerState::default(),
            source: None,
            viewport_width: viewport_width.max(1.0),
            viewport_height: viewport_height.max(1.0),
        }
    }

    /// Update the viewport size used for normalization. Called on window
    /// resize; it does not touch the current pointer state.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }

    /// Feed a device-coordinate event from the given source. Returns true
    /// if the event was accepted (matching or establishing the source).
    pub fn handle_event(&mut self, source: PointerSource, device_x: f64, device_y: f64) -> bool {
        match self.source {
            None => {
                log::info!("Pointer input locked to {:?}", source);
                self.source = Some(source);
            }
            Some(locked) if locked != source => return false,
            Some(_) => {}
        }
        let x = device_x as f32 / self.viewport_width;
        let y = device_y as f32 / self.viewport_height;
        self.state.move_to(x, y);
        true
    }

    #[allow(dead_code)]
    pub fn source(&self) -> Option<PointerSource> {
        self.source
    }

    /// Mutable access for the per-frame tick, which decays the velocity.
    pub fn state_mut(&mut self) -> &mut PointerState {
        &mut self.state
    }
}
