//! Change-persistence visualizer.
//!
//! Each tick takes one capture frame, shrinks it to the working grid, compares it
//! with the previous working frame and keeps a per-pixel countdown so changes stay
//! marked in red for a while before fading out. The result is the delta buffer:
//! opaque red where something changed recently, transparent everywhere else.

use tracing::{debug, trace};

use crate::error::Result;
use crate::history::{DEFAULT_HISTORY_CAPACITY, FrameHistory};
use crate::params::{ParameterProvider, Parameters};
use crate::types::{CLEAR, Frame, MARK};
use crate::vision::{change_magnitude, downsample, working_height};

/// Where frames come from.
pub trait CaptureSource {
    /// `None` means the source is not ready yet. That is not an error; the tick is skipped.
    fn try_frame(&mut self) -> Option<Frame>;
}

/// Where the delta buffer goes.
pub trait DisplaySink {
    /// Show `buffer` scaled to `target_width` x `target_height`.
    fn present(&mut self, buffer: &Frame, target_width: u32, target_height: u32) -> Result<()>;

    /// Size the delta buffer should be scaled to.
    fn target_size(&self) -> (u32, u32);
}

/// What a tick did.
/// Visual: only `Diffed` refreshes the red overlay; the other two leave the screen as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No frame from the source; nothing changed.
    Skipped,
    /// Frame stored but there was nothing comparable to diff against.
    Primed { reset: bool },
    /// Diff ran; `active` pixels are currently marked.
    Diffed { reset: bool, active: usize },
}

impl TickOutcome {
    pub fn diffed(&self) -> bool {
        matches!(self, TickOutcome::Diffed { .. })
    }

    pub fn reset(&self) -> bool {
        match *self {
            TickOutcome::Skipped => false,
            TickOutcome::Primed { reset } | TickOutcome::Diffed { reset, .. } => reset,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeVisualizer {
    history: FrameHistory,
    /// Ticks left visible, one per working pixel, row-major.
    persistence: Vec<u32>,
    delta: Frame,
}

impl Default for ChangeVisualizer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ChangeVisualizer {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: FrameHistory::new(history_capacity),
            persistence: Vec::new(),
            delta: Frame::new(0, 0),
        }
    }

    /// Run one full cycle against the host's collaborators.
    ///
    /// Parameters are sampled once up front, so a slider moving mid-tick cannot
    /// split buffer shape and indexing across two widths. The sink is only called
    /// when a diff actually ran.
    pub fn on_tick_start<P, S, D>(
        &mut self,
        provider: &P,
        source: &mut S,
        sink: &mut D,
    ) -> Result<TickOutcome>
    where
        P: ParameterProvider + ?Sized,
        S: CaptureSource + ?Sized,
        D: DisplaySink + ?Sized,
    {
        let params = provider.snapshot();
        let frame = source.try_frame();
        let outcome = self.tick(params, frame.as_ref());
        if outcome.diffed() {
            let (tw, th) = sink.target_size();
            sink.present(&self.delta, tw, th)?;
        }
        Ok(outcome)
    }

    /// Advance the visualizer by one frame.
    /// Visual: a moving edge turns its grid cell red and the cell stays red while the
    /// countdown runs, so motion leaves a trail that shortens as persistence drops.
    pub fn tick(&mut self, params: Parameters, source: Option<&Frame>) -> TickOutcome {
        let Some(source) = source else {
            trace!("capture not ready, skipping tick");
            return TickOutcome::Skipped;
        };

        let width = params.working_width.max(1);
        let height = working_height(width, source.width(), source.height());
        self.history.push(downsample(source, width, height));

        let reset = self.ensure_capacity(width, height);
        let stale = self
            .history
            .previous()
            .is_some_and(|prev| prev.dimensions() != (width, height));
        if reset || stale {
            // Older entries are at a different resolution and cannot be compared.
            // Visual: the trail vanishes for one tick when the resolution slider moves.
            self.history.keep_latest();
        }

        let (Some(current), Some(previous)) = (self.history.current(), self.history.previous())
        else {
            return TickOutcome::Primed { reset };
        };

        let n = params.persistence_frames;
        let threshold = params.change_threshold;
        let mut active = 0usize;

        for (((cur, prev), counter), out) in current
            .pixels()
            .zip(previous.pixels())
            .zip(self.persistence.iter_mut())
            .zip(self.delta.pixels_mut())
        {
            // The trigger tick does not decrement: the counter reads N right after a
            // change and the cell stays marked for N further ticks. Decrementing here
            // too would leave a persistence of 1 visible on the trigger tick only.
            let visible = if change_magnitude(cur, prev) > threshold {
                // Restart the countdown; never accumulate.
                *counter = n;
                n > 0
            } else if *counter > 0 {
                *counter -= 1;
                true
            } else {
                false
            };

            if visible {
                *out = MARK;
                active += 1;
            } else {
                *out = CLEAR;
            }
        }

        TickOutcome::Diffed { reset, active }
    }

    /// Make the persistence map and delta buffer match `width` x `height`.
    /// Visual: a fresh buffer is fully transparent, so nothing is red until the next diff.
    /// Returns true when they had to be reinitialised.
    pub fn ensure_capacity(&mut self, width: u32, height: u32) -> bool {
        let len = width as usize * height as usize;
        if self.delta.dimensions() == (width, height) && self.persistence.len() == len {
            return false;
        }
        debug!(width, height, "working resolution changed, clearing persistence");
        self.persistence = vec![0; len];
        self.delta = Frame::from_pixel(width, height, CLEAR);
        true
    }

    /// Forget everything: history, countdowns and the overlay.
    pub fn reset(&mut self) {
        debug!("visualizer reset");
        self.history.clear();
        self.persistence.clear();
        self.delta = Frame::new(0, 0);
    }

    /// Release every owned buffer. The visualizer is empty but still usable afterwards.
    pub fn dispose(&mut self) {
        self.history.release();
        self.persistence = Vec::new();
        self.delta = Frame::new(0, 0);
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    pub fn persistence(&self) -> &[u32] {
        &self.persistence
    }

    pub fn delta(&self) -> &Frame {
        &self.delta
    }

    /// Newest working-resolution frame, if any.
    pub fn latest_frame(&self) -> Option<&Frame> {
        self.history.current()
    }

    pub fn working_size(&self) -> (u32, u32) {
        self.delta.dimensions()
    }
}
