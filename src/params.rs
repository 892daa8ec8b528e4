// User-adjustable numbers that steer the visualizer.
// Providers clamp; the visualizer trusts whatever it is handed.

pub const PERSISTENCE_RANGE: (u32, u32) = (1, 60);
pub const WORKING_WIDTH_RANGE: (u32, u32) = (2, 1280);

pub const DEFAULT_PERSISTENCE_FRAMES: u32 = 60;
pub const DEFAULT_WORKING_WIDTH: u32 = 20;
pub const DEFAULT_CHANGE_THRESHOLD: u32 = 90;

/// Values read once at tick start and held for the whole tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    /// Ticks a changed pixel stays marked after its last change.
    pub persistence_frames: u32,
    /// Columns of the working grid; rows follow the source aspect ratio.
    pub working_width: u32,
    /// A pixel counts as changed when its summed RGB delta is strictly above this.
    pub change_threshold: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            persistence_frames: DEFAULT_PERSISTENCE_FRAMES,
            working_width: DEFAULT_WORKING_WIDTH,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
        }
    }
}

pub trait ParameterProvider {
    fn persistence_frames(&self) -> u32;
    fn working_width(&self) -> u32;
    fn change_threshold(&self) -> u32;

    /// Sample every value exactly once.
    fn snapshot(&self) -> Parameters {
        Parameters {
            persistence_frames: self.persistence_frames(),
            working_width: self.working_width(),
            change_threshold: self.change_threshold(),
        }
    }
}

impl ParameterProvider for Parameters {
    fn persistence_frames(&self) -> u32 {
        self.persistence_frames
    }

    fn working_width(&self) -> u32 {
        self.working_width
    }

    fn change_threshold(&self) -> u32 {
        self.change_threshold
    }

    fn snapshot(&self) -> Parameters {
        *self
    }
}

/// An integer slider with an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slider {
    min: u32,
    max: u32,
    value: u32,
}

impl Slider {
    pub fn new(min: u32, max: u32, value: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            value: value.clamp(min, max),
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn range(&self) -> (u32, u32) {
        (self.min, self.max)
    }

    pub fn set(&mut self, value: u32) -> u32 {
        self.value = value.clamp(self.min, self.max);
        self.value
    }

    /// Move by a signed step, saturating at either end.
    pub fn nudge(&mut self, delta: i64) -> u32 {
        let target = (self.value as i64 + delta).clamp(self.min as i64, self.max as i64);
        self.set(target as u32)
    }
}

/// The on-screen controls: two sliders and a fixed threshold.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    pub persistence: Slider,
    pub resolution: Slider,
    threshold: u32,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new(
            DEFAULT_PERSISTENCE_FRAMES,
            DEFAULT_WORKING_WIDTH,
            DEFAULT_CHANGE_THRESHOLD,
        )
    }
}

impl ControlPanel {
    pub fn new(persistence_frames: u32, working_width: u32, change_threshold: u32) -> Self {
        Self {
            persistence: Slider::new(
                PERSISTENCE_RANGE.0,
                PERSISTENCE_RANGE.1,
                persistence_frames,
            ),
            resolution: Slider::new(
                WORKING_WIDTH_RANGE.0,
                WORKING_WIDTH_RANGE.1,
                working_width,
            ),
            threshold: change_threshold,
        }
    }
}

impl ParameterProvider for ControlPanel {
    fn persistence_frames(&self) -> u32 {
        self.persistence.value()
    }

    fn working_width(&self) -> u32 {
        self.resolution.value()
    }

    fn change_threshold(&self) -> u32 {
        self.threshold
    }
}
