// Every variant states *where* things went wrong.
// Not-ready capture is not an error: sources report it as `None`.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String),

    #[error("window update error: {0}")]
    WindowUpdate(String),

    #[error("camera init error: {0}")]
    CameraInit(String),

    #[error("camera query error: {0}")]
    CameraQuery(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl Error {
    pub fn window_init(msg: impl Into<String>) -> Self {
        Self::WindowInit(msg.into())
    }

    pub fn window_update(msg: impl Into<String>) -> Self {
        Self::WindowUpdate(msg.into())
    }

    pub fn camera_init(msg: impl Into<String>) -> Self {
        Self::CameraInit(msg.into())
    }

    pub fn camera_query(msg: impl Into<String>) -> Self {
        Self::CameraQuery(msg.into())
    }

    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame(msg.into())
    }
}
