// Opens a webcam and hands its frames to the visualizer as RGBA images.
// Visual expectation: each `try_frame()` is one fresh camera image; a hiccup
// just means the screen keeps its last picture for a tick.

use crate::error::{Error, Result};
use crate::types::Frame;
use crate::visualizer::CaptureSource;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat,
        RequestedFormatType, Resolution,
    },
};
use tracing::{info, warn};

/// One line per device the OS reports.
#[derive(Debug, Clone)]
pub struct CameraEntry {
    pub index: String,
    pub name: String,
    pub description: String,
}

/// Enumerate capture devices.
pub fn list_cameras() -> Result<Vec<CameraEntry>> {
    let infos = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| Error::camera_query(format!("Query devices: {e}")))?;
    Ok(infos
        .into_iter()
        .map(|info| CameraEntry {
            index: info.index().to_string(),
            name: info.human_name(),
            description: info.description().to_owned(),
        })
        .collect())
}

pub struct CameraCapture {
    cam: Camera,
    index: u32,
    requested: (u32, u32),
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution (the driver may pick another).
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self> {
        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(index), req)
            .map_err(|e| Error::camera_init(format!("Create camera {index}: {e}")))?;
        cam.open_stream()
            .map_err(|e| Error::camera_init(format!("Open stream on camera {index}: {e}")))?;

        let actual = cam.resolution();
        info!(
            index,
            width = actual.width(),
            height = actual.height(),
            "camera stream open"
        );

        Ok(Self {
            cam,
            index,
            requested: (width, height),
        })
    }

    /// Swap to another device. On failure the current stream keeps running.
    pub fn switch_to(&mut self, index: u32) -> Result<()> {
        let next = Self::new(index, self.requested.0, self.requested.1)?;
        // Dropping the old capture stops its stream.
        *self = next;
        Ok(())
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    fn grab(&mut self) -> Result<Frame> {
        // Blocks until the driver has a frame.
        let buffer = self
            .cam
            .frame()
            .map_err(|e| Error::invalid_frame(format!("Fetch frame: {e}")))?;
        let rgb = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::invalid_frame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb.dimensions();
        let mut rgba = Vec::with_capacity(w as usize * h as usize * 4);
        for px in rgb.as_raw().chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Frame::from_raw(w, h, rgba)
            .ok_or_else(|| Error::invalid_frame(format!("{w}x{h} buffer has the wrong length")))
    }
}

impl CaptureSource for CameraCapture {
    fn try_frame(&mut self) -> Option<Frame> {
        if !self.cam.is_stream_open() {
            return None;
        }
        match self.grab() {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(index = self.index, "camera not ready: {e}");
                None
            }
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if self.cam.is_stream_open() {
            if let Err(e) = self.cam.stop_stream() {
                warn!(index = self.index, "stopping stream failed: {e}");
            }
        }
    }
}
