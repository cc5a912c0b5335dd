//! Pixel buffers handed to the presenter.
//!
//! `ImageView` is a borrowed, possibly strided view over caller memory.
//! `ImageBuf` is the owned, always-continuous counterpart used for decoded
//! frames and for the presenter's scratch copy.

use thiserror::Error;

/// Errors raised when a view does not describe its backing memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
    #[error("row stride {stride} is shorter than a row ({row_bytes} bytes)")]
    StrideTooSmall { stride: usize, row_bytes: usize },
}

/// Borrowed view over row-major, top-down pixel rows.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    rows: usize,
    cols: usize,
    channels: usize,
    stride: usize,
}

impl<'a> ImageView<'a> {
    /// View over tightly packed rows
    pub fn new(data: &'a [u8], rows: usize, cols: usize, channels: usize) -> Result<Self, FrameError> {
        Self::with_stride(data, rows, cols, channels, cols * channels)
    }

    /// View whose rows start `stride` bytes apart (sub-regions, padded rows)
    pub fn with_stride(
        data: &'a [u8],
        rows: usize,
        cols: usize,
        channels: usize,
        stride: usize,
    ) -> Result<Self, FrameError> {
        let row_bytes = cols * channels;
        if stride < row_bytes {
            return Err(FrameError::StrideTooSmall { stride, row_bytes });
        }
        // The last row only needs its own pixels, not a full stride
        let needed = match rows {
            0 => 0,
            n => (n - 1) * stride + row_bytes,
        };
        if data.len() < needed {
            return Err(FrameError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            rows,
            cols,
            channels,
            stride,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Bytes per pixel
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw bytes backing the view, starting at the first pixel
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// No gaps between rows
    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.stride == self.cols * self.channels
    }

    /// Bits per pixel
    #[inline]
    pub fn bit_depth(&self) -> usize {
        8 * self.channels
    }

    /// Pixel bytes of row `y` (without any trailing stride gap)
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.cols * self.channels]
    }

    /// Sub-rectangle of this view sharing the same memory
    pub fn region(&self, x: usize, y: usize, cols: usize, rows: usize) -> Option<ImageView<'a>> {
        if x + cols > self.cols || y + rows > self.rows {
            return None;
        }
        let offset = y * self.stride + x * self.channels;
        ImageView::with_stride(self.data.get(offset..)?, rows, cols, self.channels, self.stride).ok()
    }
}

impl<'a> From<&'a image::GrayImage> for ImageView<'a> {
    fn from(img: &'a image::GrayImage) -> Self {
        Self::packed(img.as_raw(), img.height() as usize, img.width() as usize, 1)
    }
}

impl<'a> From<&'a image::RgbImage> for ImageView<'a> {
    fn from(img: &'a image::RgbImage) -> Self {
        Self::packed(img.as_raw(), img.height() as usize, img.width() as usize, 3)
    }
}

impl<'a> From<&'a image::RgbaImage> for ImageView<'a> {
    fn from(img: &'a image::RgbaImage) -> Self {
        Self::packed(img.as_raw(), img.height() as usize, img.width() as usize, 4)
    }
}

impl<'a> ImageView<'a> {
    // image buffers always hold exactly rows * cols * channels bytes
    fn packed(data: &'a [u8], rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            data,
            rows,
            cols,
            channels,
            stride: cols * channels,
        }
    }
}

/// Owned, continuous pixel buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBuf {
    data: Vec<u8>,
    rows: usize,
    cols: usize,
    channels: usize,
}

impl ImageBuf {
    /// Zero-filled buffer of the given shape
    pub fn new(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            data: vec![0u8; rows * cols * channels],
            rows,
            cols,
            channels,
        }
    }

    /// Wrap packed pixel rows
    pub fn from_raw(data: Vec<u8>, rows: usize, cols: usize, channels: usize) -> Result<Self, FrameError> {
        let needed = rows * cols * channels;
        if data.len() != needed {
            return Err(FrameError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            rows,
            cols,
            channels,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn has_shape(&self, rows: usize, cols: usize, channels: usize) -> bool {
        self.rows == rows && self.cols == cols && self.channels == channels
    }

    /// Reshape to `rows` x `cols` x `channels`.
    ///
    /// Returns false (and leaves the memory alone) when the shape already
    /// matches, which is the steady state for a video feed.
    pub fn ensure_shape(&mut self, rows: usize, cols: usize, channels: usize) -> bool {
        if self.has_shape(rows, cols, channels) {
            return false;
        }
        self.data.resize(rows * cols * channels, 0);
        self.rows = rows;
        self.cols = cols;
        self.channels = channels;
        true
    }

    /// Copy `src` into the left of this buffer and zero the `padding`
    /// columns on the right. Shape must already be `src.rows` x
    /// `src.cols + padding`.
    pub(crate) fn copy_padded(&mut self, src: &ImageView<'_>, padding: usize) {
        debug_assert!(self.has_shape(src.rows(), src.cols() + padding, src.channels()));

        let row_bytes = src.cols() * src.channels();
        let dst_stride = self.cols * self.channels;
        for (y, dst_row) in self.data.chunks_exact_mut(dst_stride).enumerate() {
            let (pixels, border) = dst_row.split_at_mut(row_bytes);
            pixels.copy_from_slice(src.row(y));
            border.fill(0);
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView::packed(&self.data, self.rows, self.cols, self.channels)
    }

    /// Memory size in bytes
    #[inline]
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }
}
