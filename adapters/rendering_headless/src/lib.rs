#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Window-less rendering adapter for Popcorn.
//!
//! The backend steps the scene at a fixed frame delta for a bounded number
//! of frames, pulling input from an [`InputSource`]. Nothing is drawn, which
//! makes it suitable for automated runs and tests.

use anyhow::{ensure, Result};
use log::{debug, info};
use popcorn_rendering::{FrameInput, Presentation, RenderingBackend, Scene};
use std::time::{Duration, Instant};

/// Control panel buttons pressed during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelClicks {
    /// Warp toggle button.
    pub warp: bool,
    /// Inverted-rule toggle button.
    pub inverted: bool,
    /// Restart button.
    pub restart: bool,
}

/// Tracks control-panel interactions so they can be merged with physical input on the next frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    warp_latched: bool,
    inverted_latched: bool,
    restart_latched: bool,
}

impl ControlPanelInputState {
    /// Returns whether a warp toggle was requested and clears the latch so the
    /// action fires only once.
    pub fn take_warp_toggle(&mut self) -> bool {
        std::mem::take(&mut self.warp_latched)
    }

    /// Records a warp toggle press.
    pub fn register_warp_toggle(&mut self) {
        self.warp_latched = true;
    }

    /// Returns whether an inverted-rule toggle was requested, clearing the latch.
    pub fn take_inverted_toggle(&mut self) -> bool {
        std::mem::take(&mut self.inverted_latched)
    }

    /// Records an inverted-rule toggle press.
    pub fn register_inverted_toggle(&mut self) {
        self.inverted_latched = true;
    }

    /// Returns whether a restart was requested, clearing the latch.
    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_latched)
    }

    /// Records a restart press.
    pub fn register_restart(&mut self) {
        self.restart_latched = true;
    }

    /// Registers every button pressed in `clicks`.
    pub fn register(&mut self, clicks: PanelClicks) {
        if clicks.warp {
            self.register_warp_toggle();
        }
        if clicks.inverted {
            self.register_inverted_toggle();
        }
        if clicks.restart {
            self.register_restart();
        }
    }

    /// Folds the latched presses into `input` and clears them.
    pub fn merge_into(&mut self, input: &mut FrameInput) {
        input.toggle_warp |= self.take_warp_toggle();
        input.toggle_inverted |= self.take_inverted_toggle();
        input.restart |= self.take_restart();
    }
}

/// Supplies per-frame input to the headless backend.
pub trait InputSource {
    /// Input observed at the start of `frame`.
    fn poll(&mut self, frame: u64, scene: &Scene) -> FrameInput;

    /// Control panel buttons clicked while `frame` was presented.
    ///
    /// Clicks take effect on the following frame.
    fn clicks(&mut self, _frame: u64, _scene: &Scene) -> PanelClicks {
        PanelClicks::default()
    }
}

impl<F> InputSource for F
where
    F: FnMut(u64, &Scene) -> FrameInput,
{
    fn poll(&mut self, frame: u64, scene: &Scene) -> FrameInput {
        self(frame, scene)
    }
}

/// Rendering backend that runs frames without a window.
#[derive(Debug)]
pub struct HeadlessBackend<S> {
    frames: u64,
    frame_dt: Duration,
    input: S,
}

impl<S> HeadlessBackend<S>
where
    S: InputSource,
{
    /// Creates a backend that presents `frames` frames, each advancing by `frame_dt`.
    #[must_use]
    pub fn new(frames: u64, frame_dt: Duration, input: S) -> Self {
        Self {
            frames,
            frame_dt,
            input,
        }
    }
}

#[derive(Debug, Default)]
struct FrameStats {
    simulated: Duration,
    frames: u32,
    update_accum: Duration,
}

impl FrameStats {
    /// Records a frame and returns the average update cost once a simulated
    /// second has elapsed.
    fn record_frame(&mut self, frame_dt: Duration, update: Duration) -> Option<(u32, Duration)> {
        self.simulated += frame_dt;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += update;

        if self.simulated < Duration::from_secs(1) {
            return None;
        }

        let frames = self.frames;
        let average = self.update_accum / frames.max(1);
        *self = Self::default();
        Some((frames, average))
    }
}

impl<S> RenderingBackend for HeadlessBackend<S>
where
    S: InputSource,
{
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            frames,
            frame_dt,
            mut input,
        } = self;
        ensure!(
            !frame_dt.is_zero(),
            "headless frame delta must be positive"
        );

        let Presentation {
            window_title,
            scene,
            ..
        } = presentation;
        info!("running `{window_title}` headless for up to {frames} frames of {frame_dt:?}");

        let mut scene = scene;
        let mut control_panel_input = ControlPanelInputState::default();
        let mut stats = FrameStats::default();

        for frame in 0..frames {
            let mut frame_input = input.poll(frame, &scene);
            control_panel_input.merge_into(&mut frame_input);

            let started = Instant::now();
            update_scene(frame_dt, frame_input, &mut scene);
            if let Some((per_second, average)) = stats.record_frame(frame_dt, started.elapsed()) {
                debug!("{per_second} frames per simulated second, avg update {average:?}");
            }

            if frame_input.quit {
                info!("input requested exit after frame {frame}");
                break;
            }

            control_panel_input.register(input.clicks(frame, &scene));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_report_once_per_simulated_second() {
        let mut stats = FrameStats::default();
        let dt = Duration::from_millis(250);
        assert!(stats.record_frame(dt, Duration::from_micros(10)).is_none());
        assert!(stats.record_frame(dt, Duration::from_micros(10)).is_none());
        assert!(stats.record_frame(dt, Duration::from_micros(10)).is_none());
        let report = stats.record_frame(dt, Duration::from_micros(10));
        assert_eq!(report, Some((4, Duration::from_micros(10))));
        assert!(stats.record_frame(dt, Duration::ZERO).is_none());
    }

    #[test]
    fn latches_merge_into_frame_input() {
        let mut state = ControlPanelInputState::default();
        state.register(PanelClicks {
            warp: true,
            inverted: false,
            restart: true,
        });

        let mut input = FrameInput::default();
        state.merge_into(&mut input);
        assert!(input.toggle_warp);
        assert!(!input.toggle_inverted);
        assert!(input.restart);

        let mut next = FrameInput::default();
        state.merge_into(&mut next);
        assert_eq!(next, FrameInput::default());
    }
}
