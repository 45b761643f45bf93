//! I/O helpers used by the demo binary.
//!
//! - `load_image_u8`: read a PNG/JPEG/etc. into an owned 8-bit buffer
//!   (grayscale stays single-channel, everything else becomes RGB).
//! - `save_image_buf`: write a filter result back to disk.
use super::view::{ImageBuf, ImageRef, SampleBuf};
use image::{DynamicImage, GrayImage, RgbImage};
use std::fs;
use std::path::Path;

/// Owned 8-bit interleaved buffer with a borrowed view conversion.
#[derive(Clone, Debug)]
pub struct OwnedImageU8 {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl OwnedImageU8 {
    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Interleaved channel count (1 or 3)
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Borrow as an [`ImageRef`] for filtering.
    pub fn as_view(&self) -> ImageRef<'_> {
        ImageRef::from_u8(self.width, self.height, self.channels, &self.data)
            .expect("owned buffer dimensions are consistent")
    }
}

/// Load an image from disk as 8-bit grayscale or RGB.
pub fn load_image_u8(path: &Path) -> Result<OwnedImageU8, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let (width, height, channels, data) = match img {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = (gray.width() as usize, gray.height() as usize);
            (w, h, 1, gray.into_raw())
        }
        other => {
            let rgb = other.into_rgb8();
            let (w, h) = (rgb.width() as usize, rgb.height() as usize);
            (w, h, 3, rgb.into_raw())
        }
    };
    Ok(OwnedImageU8 {
        width,
        height,
        channels,
        data,
    })
}

/// Save a filter result to disk. Only 8-bit single-channel and RGB buffers
/// are supported; anything else is reported back to the caller.
pub fn save_image_buf(buf: &ImageBuf, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let data = match &buf.samples {
        SampleBuf::U8(data) => data.clone(),
        _ => return Err(format!("Cannot save non-8-bit result to {}", path.display())),
    };
    match buf.channels {
        1 => GrayImage::from_raw(buf.w as u32, buf.h as u32, data)
            .ok_or_else(|| "Failed to create grayscale buffer".to_string())?
            .save(path)
            .map_err(|e| format!("Failed to save {}: {e}", path.display())),
        3 => RgbImage::from_raw(buf.w as u32, buf.h as u32, data)
            .ok_or_else(|| "Failed to create RGB buffer".to_string())?
            .save(path)
            .map_err(|e| format!("Failed to save {}: {e}", path.display())),
        n => Err(format!(
            "Cannot save {n}-channel result to {}",
            path.display()
        )),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
