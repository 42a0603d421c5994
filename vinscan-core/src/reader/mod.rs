//! Code readers: frame acquisition plus symbol decoding.
//!
//! A reader owns its device for its whole lifetime and releases it on drop.
//! Each call to [`CodeReader::next_frame`] yields the payloads decoded from
//! one frame, which may be none.

use async_trait::async_trait;
use vinscan_model::RawPayload;

use crate::error::DeviceError;

#[cfg(feature = "frames")]
pub mod frames;
pub mod line;

#[cfg(feature = "frames")]
pub use frames::FrameDirReader;
pub use line::LineReader;

#[async_trait]
pub trait CodeReader: Send {
    /// Acquire and decode the next frame.
    ///
    /// An empty vector means nothing was decoded this cycle. An error means
    /// the device is gone; the reader must be reacquired.
    async fn next_frame(&mut self) -> Result<Vec<RawPayload>, DeviceError>;

    /// Human readable name for logs.
    fn describe(&self) -> String;
}

#[async_trait]
impl<R: CodeReader + ?Sized> CodeReader for Box<R> {
    async fn next_frame(&mut self) -> Result<Vec<RawPayload>, DeviceError> {
        (**self).next_frame().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
