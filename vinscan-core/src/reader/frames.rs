use std::{
    collections::{HashMap, HashSet, VecDeque},
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use tracing::{debug, warn};
use vinscan_model::RawPayload;

use super::CodeReader;
use crate::error::DeviceError;

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Reads camera frames dropped into a directory, oldest name first.
///
/// Each image file is one frame. A file is only taken once its size has been
/// the same on two consecutive polls, so a frame the camera is still writing
/// is left alone. A frame that still fails to open gets one more chance on a
/// later poll before it is reported.
///
/// Frames are decoded off the async runtime and every QR symbol found becomes
/// a payload. Symbols that are located but fail error correction surface as
/// [`RawPayload::Undecodable`].
#[derive(Debug)]
pub struct FrameDirReader {
    dir: PathBuf,
    poll_interval: Duration,
    /// Frames already taken. Pruned to what is still on disk.
    seen: HashSet<PathBuf>,
    /// Size at the last listing of frames not yet taken.
    sizes: HashMap<PathBuf, u64>,
    /// Frames that failed to open once.
    retried: HashSet<PathBuf>,
    pending: VecDeque<PathBuf>,
}

impl FrameDirReader {
    /// Acquire the frame directory. Fails when it does not exist.
    pub fn open(
        dir: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Result<Self, DeviceError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DeviceError::Unavailable(dir));
        }
        Ok(Self {
            dir,
            poll_interval,
            seen: HashSet::new(),
            sizes: HashMap::new(),
            retried: HashSet::new(),
            pending: VecDeque::new(),
        })
    }

    async fn refill(&mut self) -> Result<(), DeviceError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(DeviceError::Unavailable(self.dir.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        let mut present = HashSet::new();
        let mut sizes = HashMap::new();
        let mut ready = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_frame(&path) {
                continue;
            }
            present.insert(path.clone());
            if self.seen.contains(&path) {
                continue;
            }

            let len = match entry.metadata().await {
                Ok(meta) => meta.len(),
                // Deleted between listing and stat.
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            if len > 0 && self.sizes.get(&path) == Some(&len) {
                ready.push(path);
            } else {
                sizes.insert(path, len);
            }
        }

        self.sizes = sizes;
        self.seen.retain(|path| present.contains(path));
        self.retried.retain(|path| present.contains(path));

        ready.sort();
        for path in ready {
            self.seen.insert(path.clone());
            self.pending.push_back(path);
        }
        Ok(())
    }
}

fn is_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            FRAME_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn decode_frame(path: &Path) -> Result<Vec<RawPayload>, image::ImageError> {
    let gray = image::open(path)?.to_luma8();

    let (width, height) = gray.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| gray.get_pixel(x as u32, y as u32)[0],
    );

    let payloads = prepared
        .detect_grids()
        .into_iter()
        .map(|grid| {
            let mut data = Vec::new();
            match grid.decode_to(&mut data) {
                Ok(_) => RawPayload::Bytes(data),
                Err(err) => RawPayload::Undecodable(err.to_string()),
            }
        })
        .collect();
    Ok(payloads)
}

#[async_trait]
impl CodeReader for FrameDirReader {
    async fn next_frame(&mut self) -> Result<Vec<RawPayload>, DeviceError> {
        if self.pending.is_empty() {
            self.refill().await?;
        }

        let Some(path) = self.pending.pop_front() else {
            tokio::time::sleep(self.poll_interval).await;
            return Ok(Vec::new());
        };

        debug!(frame = %path.display(), "decoding frame");
        let target = path.clone();
        let decoded = tokio::task::spawn_blocking(move || decode_frame(&target))
            .await
            .map_err(|err| DeviceError::Failed(format!("decoder task: {err}")))?;

        match decoded {
            Ok(payloads) => Ok(payloads),
            Err(err) if self.retried.insert(path.clone()) => {
                debug!(
                    frame = %path.display(),
                    error = %err,
                    "frame not readable yet, retrying later"
                );
                self.seen.remove(&path);
                Ok(Vec::new())
            }
            Err(err) => {
                warn!(frame = %path.display(), error = %err, "unreadable frame");
                Ok(vec![RawPayload::Undecodable(err.to_string())])
            }
        }
    }

    fn describe(&self) -> String {
        format!("frame directory {}", self.dir.display())
    }
}
