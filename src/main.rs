// What you SEE:
// • The camera image, pixelated down to the working resolution.
// • Anything that moves leaves a red trail that fades after N frames.
// • Up/Down: persistence. Left/Right: resolution (hold Shift for x10).
// • R resets the trail, N switches camera, H hides the readout. ESC quits.

use std::time::{Duration, Instant};

use change_persistence::config::{Config, SourceKind};
use change_persistence::draw::{
    Drawer, OverlayLayer, draw_text_5x7, draw_text_centered, hud_lines,
};
use change_persistence::gamma::GammaLut;
use change_persistence::pattern::PatternSource;
use change_persistence::types::FrameBuffer;
use change_persistence::vision::{composite_over, upscale_into};
use change_persistence::{CaptureSource, ChangeVisualizer, Error, Frame, ParameterProvider};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "camera")]
use change_persistence::camera::{self, CameraCapture};
#[cfg(feature = "camera")]
use change_persistence::config::preferred_camera;

enum Feed {
    #[cfg(feature = "camera")]
    Camera(CameraCapture),
    Pattern(PatternSource),
}

impl CaptureSource for Feed {
    fn try_frame(&mut self) -> Option<Frame> {
        match self {
            #[cfg(feature = "camera")]
            Feed::Camera(cam) => cam.try_frame(),
            Feed::Pattern(p) => p.try_frame(),
        }
    }
}

impl Feed {
    fn open(cfg: &Config) -> Result<Self, Error> {
        match cfg.source {
            #[cfg(feature = "camera")]
            SourceKind::Camera => {
                let available = match camera::list_cameras() {
                    Ok(list) => list.len(),
                    Err(e) => {
                        warn!("could not list cameras: {e}");
                        0
                    }
                };
                let index = preferred_camera(cfg.camera, available);
                info!(index, available, "opening camera");
                Ok(Feed::Camera(CameraCapture::new(index, cfg.capture_width, cfg.capture_height)?))
            }
            #[cfg(not(feature = "camera"))]
            SourceKind::Camera => {
                warn!("built without the `camera` feature, using the pattern source");
                Ok(Feed::Pattern(Self::pattern(cfg)))
            }
            SourceKind::Pattern => Ok(Feed::Pattern(Self::pattern(cfg))),
        }
    }

    fn pattern(cfg: &Config) -> PatternSource {
        PatternSource::new(cfg.capture_width, cfg.capture_height)
    }

    /// Cycle to the next camera. Returns true when the stream changed.
    fn next_camera(&mut self) -> bool {
        match self {
            #[cfg(feature = "camera")]
            Feed::Camera(cam) => {
                let count = camera::list_cameras().map(|c| c.len() as u32).unwrap_or(0);
                let next = if count > 0 { (cam.index() + 1) % count } else { cam.index() + 1 };
                if next == cam.index() {
                    return false;
                }
                match cam.switch_to(next) {
                    Ok(()) => {
                        info!(index = next, "switched camera");
                        true
                    }
                    Err(e) => {
                        warn!("camera switch failed: {e}");
                        false
                    }
                }
            }
            Feed::Pattern(_) => false,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn list_and_exit() -> Result<(), Error> {
    #[cfg(feature = "camera")]
    {
        for entry in camera::list_cameras()? {
            println!("{}: {} ({})", entry.index, entry.name, entry.description);
        }
    }
    #[cfg(not(feature = "camera"))]
    {
        println!("built without the `camera` feature; no cameras available");
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    init_logging();
    let cfg = Config::parse();
    if cfg.list_cameras {
        return list_and_exit();
    }

    /* --- Source + window setup --- */
    let mut feed = Feed::open(&cfg)?;
    let mut drawer = Drawer::new("Change Persistence", cfg.window_width, cfg.window_height)?;
    let mut screen = FrameBuffer::new(cfg.window_width, cfg.window_height);
    let mut overlay =
        OverlayLayer::new(cfg.window_width as u32, cfg.window_height as u32, cfg.filter);
    let lut = GammaLut::new();

    /* --- Controls + visualizer state --- */
    let mut panel = cfg.control_panel();
    let mut visualizer = ChangeVisualizer::new(cfg.history);
    let mut show_hud = true;
    info!(params = ?panel.snapshot(), "visualizer ready");

    /* --- FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Inputs. Slider moves land in the panel and are sampled at the next tick. */
        let controls = drawer.controls();
        if controls.persistence_step != 0 {
            panel.persistence.nudge(controls.persistence_step);
        }
        if controls.resolution_step != 0 {
            panel.resolution.nudge(controls.resolution_step);
        }
        if controls.toggle_hud {
            show_hud = !show_hud;
        }
        if controls.reset {
            visualizer.reset();
        }
        if controls.next_camera && feed.next_camera() {
            // A new stream has no comparable previous frame.
            visualizer.reset();
        }

        /* 2) Tick: capture, diff, and hand the delta buffer to the overlay layer. */
        overlay.clear();
        let params = panel.snapshot();
        let outcome = visualizer.on_tick_start(&params, &mut feed, &mut overlay)?;
        if outcome.reset() {
            debug!(working = ?visualizer.working_size(), "persistence reinitialised");
        }

        /* 3) Base image: the pixelated working frame, blown up to the window. */
        match visualizer.latest_frame() {
            Some(base) => upscale_into(base, &mut screen, cfg.filter),
            None => screen.clear(0),
        }

        /* 4) Red overlay on top. */
        if let Some(layer) = overlay.image() {
            composite_over(&mut screen, layer, &lut)?;
        }

        /* 5) Readout: only once the source has delivered something. */
        if show_hud && visualizer.latest_frame().is_some() {
            let [persistence_text, resolution_text] =
                hud_lines(params.persistence_frames, visualizer.working_size());
            let mid = screen.height as i32 / 2;
            draw_text_centered(&mut screen, mid - 20, &persistence_text, 0x00FF_FFFF, 3);
            draw_text_centered(&mut screen, mid + 20, &resolution_text, 0x00FF_FFFF, 3);
            draw_text_5x7(&mut screen, 8, 8, &hud_fps_text, 0x00FF_FFFF, 1);
        }

        drawer.present(&screen)?;

        /* 6) FPS, once per second */
        frames_this_second += 1;
        let elapsed = now.duration_since(last_fps_time);
        if elapsed >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / elapsed.as_secs_f32();
            debug!(fps, "frame rate");
            hud_fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    visualizer.dispose();
    info!("window closed");
    Ok(())
}
