use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::debug;
use vinscan_model::RawPayload;

use super::CodeReader;
use crate::error::DeviceError;

/// Reader for handheld scanners that type each decoded symbol as one line
/// (keyboard-wedge or serial/CDC mode).
///
/// Every line is one frame holding exactly one payload; blank lines become
/// empty frames. End of input means the scanner was unplugged.
#[derive(Debug)]
pub struct LineReader<R> {
    input: R,
    name: String,
    buf: Vec<u8>,
}

impl LineReader<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

impl<R> LineReader<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(input: R, name: impl Into<String>) -> Self {
        Self {
            input,
            name: name.into(),
            buf: Vec::with_capacity(64),
        }
    }
}

#[async_trait]
impl<R> CodeReader for LineReader<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_frame(&mut self) -> Result<Vec<RawPayload>, DeviceError> {
        self.buf.clear();
        let read = self.input.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            return Err(DeviceError::Disconnected);
        }

        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }

        if self.buf.iter().all(u8::is_ascii_whitespace) {
            debug!(reader = %self.name, "blank line, no payload");
            return Ok(Vec::new());
        }

        Ok(vec![RawPayload::Bytes(self.buf.clone())])
    }

    fn describe(&self) -> String {
        format!("line reader ({})", self.name)
    }
}
