//! Frame decoding for the demo feed.
//!
//! Images are decoded into `ImageBuf` frames keeping their native channel
//! count (grey stays 1 byte per pixel, RGB stays 3) so the presenter sees
//! the same variety of layouts a camera pipeline would hand it.

use fitblit::ImageBuf;
use image::DynamicImage;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// Decoder for still images used as feed frames.
pub struct Decoder {
    /// Supported extensions (lowercase, no dot)
    supported_extensions: Vec<&'static str>,
    /// Convert every frame to 8-bit grey
    force_grey: bool,
}

impl Decoder {
    pub fn new(force_grey: bool) -> Self {
        Self {
            supported_extensions: vec!["jpg", "jpeg", "png", "gif", "bmp", "webp"],
            force_grey,
        }
    }

    /// Check if a file is supported
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_extensions.iter().any(|&e| e == ext_lower)
            })
            .unwrap_or(false)
    }

    /// Get supported extensions
    pub fn extensions(&self) -> &[&'static str] {
        &self.supported_extensions
    }

    /// Decode a file into a frame
    pub fn decode(&self, path: &Path) -> Option<ImageBuf> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                warn!("cannot read {}: {err}", path.display());
                return None;
            }
        };

        let frame = if Self::is_jpeg(path) && !self.force_grey {
            Self::decode_jpeg(&data)
        } else {
            self.decode_generic(&data)
        };
        if frame.is_none() {
            warn!("cannot decode {}", path.display());
        }
        frame
    }

    /// Check if file is JPEG by extension
    fn is_jpeg(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let lower = e.to_lowercase();
                lower == "jpg" || lower == "jpeg"
            })
            .unwrap_or(false)
    }

    /// Decode JPEG using zune-jpeg (fast), falling back to the image crate
    fn decode_jpeg(data: &[u8]) -> Option<ImageBuf> {
        let mut decoder = zune_jpeg::JpegDecoder::new(data);
        if let Ok(pixels) = decoder.decode() {
            if let Some(info) = decoder.info() {
                let rows = info.height as usize;
                let cols = info.width as usize;
                if rows > 0 && cols > 0 && pixels.len() % (rows * cols) == 0 {
                    let channels = pixels.len() / (rows * cols);
                    if let Ok(frame) = ImageBuf::from_raw(pixels, rows, cols, channels) {
                        return Some(frame);
                    }
                }
            }
        }

        Decoder::new(false).decode_generic(data)
    }

    /// Decode using image crate (generic fallback)
    fn decode_generic(&self, data: &[u8]) -> Option<ImageBuf> {
        let img = image::load_from_memory(data).ok()?;
        Some(self.to_frame(img))
    }

    /// Pick the presentable layout closest to the decoded one
    fn to_frame(&self, img: DynamicImage) -> ImageBuf {
        let rows = img.height() as usize;
        let cols = img.width() as usize;
        let color = img.color();

        let (pixels, channels) = if self.force_grey || (!color.has_color() && !color.has_alpha()) {
            (img.into_luma8().into_raw(), 1)
        } else if color.has_alpha() {
            (img.into_rgba8().into_raw(), 4)
        } else {
            (img.into_rgb8().into_raw(), 3)
        };

        ImageBuf::from_raw(pixels, rows, cols, channels)
            .unwrap_or_else(|_| ImageBuf::new(rows, cols, channels))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Scan a directory for supported images
pub fn scan_directory(dir: &Path, decoder: &Decoder) -> Vec<PathBuf> {
    let mut images: Vec<_> = walkdir::WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| decoder.is_supported(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    images.sort();
    images
}
