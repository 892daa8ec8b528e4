use clap::{Parser, ValueEnum};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::params::{
    ControlPanel, DEFAULT_CHANGE_THRESHOLD, DEFAULT_PERSISTENCE_FRAMES, DEFAULT_WORKING_WIDTH,
};
use crate::vision::ResampleFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Live webcam (needs the `camera` feature).
    Camera,
    /// Synthetic bouncing square.
    Pattern,
}

/// Live change-persistence view: moving things leave a fading red trail.
#[derive(Parser, Debug, Clone)]
#[command(name = "change-persistence", version)]
pub struct Config {
    /// Frame source.
    #[arg(long, value_enum, default_value_t = SourceKind::Camera)]
    pub source: SourceKind,

    /// Camera index to open first. Defaults to the second device when there is one,
    /// else the first.
    #[arg(long)]
    pub camera: Option<u32>,

    /// Print the available cameras and exit.
    #[arg(long, default_value_t = false)]
    pub list_cameras: bool,

    /// Requested capture width (the driver may choose another).
    #[arg(long, default_value_t = 640)]
    pub capture_width: u32,

    /// Requested capture height.
    #[arg(long, default_value_t = 480)]
    pub capture_height: u32,

    #[arg(long, default_value_t = 960)]
    pub window_width: usize,

    #[arg(long, default_value_t = 720)]
    pub window_height: usize,

    /// Ticks a change stays marked (1-60).
    #[arg(long, default_value_t = DEFAULT_PERSISTENCE_FRAMES)]
    pub persistence: u32,

    /// Working grid width in pixels (2-1280).
    #[arg(long, default_value_t = DEFAULT_WORKING_WIDTH)]
    pub resolution: u32,

    /// Summed RGB delta a pixel must exceed to count as changed.
    #[arg(long, default_value_t = DEFAULT_CHANGE_THRESHOLD)]
    pub threshold: u32,

    /// Frames kept in the history buffer.
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    pub history: usize,

    /// Upscaling filter for the window.
    #[arg(long, value_enum, default_value_t = ResampleFilter::Nearest)]
    pub filter: ResampleFilter,
}

/// Device to open given the `--camera` flag and how many devices the OS reports.
pub fn preferred_camera(requested: Option<u32>, available: usize) -> u32 {
    match requested {
        Some(index) => index,
        None if available >= 2 => 1,
        None => 0,
    }
}

impl Config {
    /// Initial controls; out-of-range values are clamped here.
    pub fn control_panel(&self) -> ControlPanel {
        ControlPanel::new(self.persistence, self.resolution, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParameterProvider, Parameters};

    #[test]
    fn defaults_match_the_original_screen() {
        let cfg = Config::try_parse_from(["change-persistence"]).unwrap();
        assert_eq!(cfg.source, SourceKind::Camera);
        assert_eq!(cfg.history, 60);
        assert_eq!(cfg.filter, ResampleFilter::Nearest);
        assert_eq!(cfg.camera, None);
        assert_eq!(cfg.control_panel().snapshot(), Parameters::default());
    }

    #[test]
    fn flags_are_parsed_and_clamped() {
        let cfg = Config::try_parse_from([
            "change-persistence",
            "--source",
            "pattern",
            "--persistence",
            "99",
            "--resolution",
            "1",
            "--threshold",
            "30",
            "--filter",
            "bilinear",
        ])
        .unwrap();
        assert_eq!(cfg.source, SourceKind::Pattern);
        assert_eq!(cfg.filter, ResampleFilter::Bilinear);
        let p = cfg.control_panel().snapshot();
        assert_eq!(p.persistence_frames, 60);
        assert_eq!(p.working_width, 2);
        assert_eq!(p.change_threshold, 30);
    }

    #[test]
    fn second_camera_is_preferred_when_present() {
        assert_eq!(preferred_camera(None, 0), 0);
        assert_eq!(preferred_camera(None, 1), 0);
        assert_eq!(preferred_camera(None, 2), 1);
        assert_eq!(preferred_camera(None, 5), 1);
        assert_eq!(preferred_camera(Some(0), 3), 0);
        assert_eq!(preferred_camera(Some(4), 1), 4);

        let cfg = Config::try_parse_from(["change-persistence", "--camera", "2"]).unwrap();
        assert_eq!(cfg.camera, Some(2));
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Config::try_parse_from(["change-persistence", "--source", "tape"]).is_err());
    }
}
