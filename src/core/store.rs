//! Frame persistence for color finds

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::{CameraFrame, ColorVerdict, FrameReason};

/// "Save this frame to this path"
pub trait FrameStore {
    fn save_frame(&mut self, frame: &CameraFrame, path: &Path) -> Result<(), FrameReason>;
}

/// Writes frames as binary PPM (P6) bitmaps
#[derive(Debug, Default)]
pub struct PpmFrameStore;

impl PpmFrameStore {
    pub fn new() -> Self {
        Self
    }

    /// Encode a frame as P6: header then RGB triples, row-major
    pub fn encode(frame: &CameraFrame) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", frame.width(), frame.height());
        let mut bytes = Vec::with_capacity(header.len() + frame.width() * frame.height() * 3);
        bytes.extend_from_slice(header.as_bytes());
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                bytes.extend_from_slice(&[frame.red(x, y), frame.green(x, y), frame.blue(x, y)]);
            }
        }
        bytes
    }
}

impl FrameStore for PpmFrameStore {
    fn save_frame(&mut self, frame: &CameraFrame, path: &Path) -> Result<(), FrameReason> {
        if frame.is_empty() {
            return Err(FrameReason::R503_FRAME_EMPTY);
        }
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|_| FrameReason::R502_FRAME_STORE_IO)?;
        }
        let mut file = std::fs::File::create(path).map_err(|_| FrameReason::R502_FRAME_STORE_IO)?;
        file.write_all(&Self::encode(frame))
            .map_err(|_| FrameReason::R502_FRAME_STORE_IO)?;
        Ok(())
    }
}

/// User home directory, or the working directory if HOME is unset
pub fn default_snapshot_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Fixed per-color file inside `dir`
pub fn frame_path(dir: &Path, color: ColorVerdict) -> Option<PathBuf> {
    color.filename().map(|name| dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rover_store_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_encode_header_and_pixels() {
        let frame = CameraFrame::solid(2, 1, [10, 20, 30]);
        let bytes = PpmFrameStore::encode(&frame);
        assert!(bytes.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(&bytes[bytes.len() - 6..], &[10, 20, 30, 10, 20, 30]);
    }

    #[test]
    fn test_save_creates_dir_and_overwrites() {
        let dir = temp_dir("overwrite");
        let path = frame_path(&dir, ColorVerdict::Red).unwrap();
        let mut store = PpmFrameStore::new();

        store.save_frame(&CameraFrame::solid(4, 4, [255, 0, 0]), &path).unwrap();
        store.save_frame(&CameraFrame::solid(2, 2, [200, 0, 0]), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n2 2\n255\n"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_frame_rejected() {
        let dir = temp_dir("empty");
        let result = PpmFrameStore::new().save_frame(&CameraFrame::solid(0, 3, [0, 0, 0]), &dir.join("x.ppm"));
        assert_eq!(result, Err(FrameReason::R503_FRAME_EMPTY));
    }

    #[test]
    fn test_frame_path_per_color() {
        let dir = Path::new("/tmp/rover");
        assert_eq!(frame_path(dir, ColorVerdict::Green), Some(dir.join("green_blob.ppm")));
        assert_eq!(frame_path(dir, ColorVerdict::None), None);
    }
}
