//! Raster primitives - the drawing services a presenter talks to.
//!
//! `RasterTarget` is the seam between the presenter and whatever owns the
//! pixels on screen. It offers exactly three operations:
//! - a direct block transfer (no resampling)
//! - a scaled transfer with a selectable filter
//! - a rectangle paint using the target's current drawing style
//!
//! `Canvas` implements all three in software over an RGBA8 framebuffer, so
//! any surface that can hand out `&mut [u8]` (a `pixels` frame, a plain
//! `Vec`) becomes a target with a few lines of glue.

use crate::format::{BitDepth, FormatHeader, PaletteEntry, PALETTE_LEN};
use crate::geometry::Rect;
use rayon::prelude::*;

/// Bytes per destination pixel (RGBA8)
const CANVAS_BPP: usize = 4;

/// Resampling filter for scaled transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StretchMode {
    /// Nearest sample, fast. Used when magnifying or at equal width.
    ColorOnColor,
    /// Area average over the covered source pixels. Used when minifying.
    Halftone,
}

impl StretchMode {
    /// Filter for drawing `src_width` source columns into `dest_width`
    pub fn for_widths(dest_width: i32, src_width: usize) -> Self {
        if (dest_width.max(0) as usize) < src_width {
            Self::Halftone
        } else {
            Self::ColorOnColor
        }
    }
}

/// Colors used by `fill_rect`: outline with the pen, fill with the brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawStyle {
    pub pen: [u8; 4],
    pub brush: [u8; 4],
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            pen: [0, 0, 0, 255],
            brush: [0, 0, 0, 255],
        }
    }
}

/// A drawable surface plus the raster services that paint on it.
///
/// Transfer calls return the number of source rows moved; 0 means the
/// call failed and nothing should be assumed about the surface.
pub trait RasterTarget {
    /// Client area in the target's own coordinates
    fn client_rect(&self) -> Rect;

    /// Copy `bits` (laid out per `header`) from source origin to `dst`
    /// without resampling.
    fn set_bits_to_device(&mut self, dst: Rect, header: &FormatHeader, bits: &[u8]) -> usize;

    /// Resample the `src` region of `bits` into `dst`.
    fn stretch_bits(
        &mut self,
        dst: Rect,
        src: Rect,
        header: &FormatHeader,
        bits: &[u8],
        mode: StretchMode,
    ) -> usize;

    /// Outline and fill `rect` with the target's current drawing style
    fn fill_rect(&mut self, rect: Rect);
}

impl<T: RasterTarget + ?Sized> RasterTarget for &mut T {
    fn client_rect(&self) -> Rect {
        (**self).client_rect()
    }

    fn set_bits_to_device(&mut self, dst: Rect, header: &FormatHeader, bits: &[u8]) -> usize {
        (**self).set_bits_to_device(dst, header, bits)
    }

    fn stretch_bits(
        &mut self,
        dst: Rect,
        src: Rect,
        header: &FormatHeader,
        bits: &[u8],
        mode: StretchMode,
    ) -> usize {
        (**self).stretch_bits(dst, src, header, bits, mode)
    }

    fn fill_rect(&mut self, rect: Rect) {
        (**self).fill_rect(rect)
    }
}

/// Read access to a device-layout source buffer.
struct SourceBits<'a> {
    bits: &'a [u8],
    stride: usize,
    bytes_per_pixel: usize,
    rows: usize,
    cols: usize,
    top_down: bool,
    palette: Option<&'a [PaletteEntry; PALETTE_LEN]>,
}

impl<'a> SourceBits<'a> {
    /// None if the header is unusable or `bits` is shorter than it claims
    fn new(header: &'a FormatHeader, bits: &'a [u8]) -> Option<Self> {
        let depth = header.depth()?;
        if header.cols() == 0 || header.rows() == 0 || bits.len() < header.image_size() {
            return None;
        }
        let palette = match depth {
            BitDepth::Grey8 => Some(header.palette()?),
            BitDepth::Rgb24 | BitDepth::Rgba32 => None,
        };
        Some(Self {
            bits,
            stride: header.stride(),
            bytes_per_pixel: depth.bytes_per_pixel(),
            rows: header.rows(),
            cols: header.cols(),
            top_down: header.is_top_down(),
            palette,
        })
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let row = if self.top_down { y } else { self.rows - 1 - y };
        let i = row * self.stride + x * self.bytes_per_pixel;
        match self.palette {
            Some(palette) => {
                let e = palette[self.bits[i] as usize];
                [e.red, e.green, e.blue]
            }
            None => [self.bits[i], self.bits[i + 1], self.bits[i + 2]],
        }
    }

    fn contains(&self, rect: &Rect) -> bool {
        !rect.is_empty() && Rect::from_size(self.cols as i32, self.rows as i32).contains(rect)
    }
}

/// Software rasterizer over a borrowed RGBA8 framebuffer.
pub struct Canvas<'a> {
    pixels: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    /// None if `pixels` can't hold `width` x `height` RGBA pixels
    pub fn new(pixels: &'a mut [u8], width: usize, height: usize) -> Option<Self> {
        if pixels.len() < width * height * CANVAS_BPP {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width as i32, self.height as i32)
    }

    #[inline]
    fn row_bytes(&self) -> usize {
        self.width * CANVAS_BPP
    }

    /// Direct transfer: source pixel (x, y) lands on (dst.x + x, dst.y + y).
    pub fn set_bits(&mut self, dst: Rect, header: &FormatHeader, bits: &[u8]) -> usize {
        let Some(src) = SourceBits::new(header, bits) else {
            return 0;
        };
        if dst.is_empty() {
            return 0;
        }

        // Extent is limited by the source as well as the destination
        let extent = Rect::new(
            dst.x,
            dst.y,
            dst.width.min(src.cols as i32),
            dst.height.min(src.rows as i32),
        );
        let lines = extent.height as usize;
        let Some(visible) = extent.intersect(&self.bounds()) else {
            return lines;
        };

        let stride = self.row_bytes();
        for y in visible.y..visible.bottom() {
            let sy = (y - dst.y) as usize;
            let row = &mut self.pixels[y as usize * stride..][..stride];
            for x in visible.x..visible.right() {
                let [r, g, b] = src.pixel((x - dst.x) as usize, sy);
                let i = x as usize * CANVAS_BPP;
                row[i..i + CANVAS_BPP].copy_from_slice(&[r, g, b, 255]);
            }
        }
        lines
    }

    /// Scaled transfer of `src_rect` into `dst`.
    pub fn stretch_bits(
        &mut self,
        dst: Rect,
        src_rect: Rect,
        header: &FormatHeader,
        bits: &[u8],
        mode: StretchMode,
    ) -> usize {
        let Some(src) = SourceBits::new(header, bits) else {
            return 0;
        };
        if dst.is_empty() || !src.contains(&src_rect) {
            return 0;
        }
        let lines = src_rect.height as usize;
        let Some(visible) = dst.intersect(&self.bounds()) else {
            return lines;
        };

        let sampler = Sampler::new(&src, src_rect, dst, mode);
        let row_bytes = self.row_bytes();
        let len = row_bytes * self.height;
        let x_range = visible.x..visible.right();

        self.pixels[..len]
            .par_chunks_mut(row_bytes)
            .enumerate()
            .skip(visible.y as usize)
            .take(visible.height as usize)
            .for_each(|(y, row)| {
                let dy = y as i32 - dst.y;
                for x in x_range.clone() {
                    let [r, g, b] = sampler.sample(x - dst.x, dy);
                    let i = x as usize * CANVAS_BPP;
                    row[i..i + CANVAS_BPP].copy_from_slice(&[r, g, b, 255]);
                }
            });

        lines
    }

    /// Outline `rect` with `style.pen` and fill the inside with `style.brush`.
    pub fn rectangle(&mut self, rect: Rect, style: &DrawStyle) {
        let Some(visible) = rect.intersect(&self.bounds()) else {
            return;
        };
        let stride = self.row_bytes();
        for y in visible.y..visible.bottom() {
            let row = &mut self.pixels[y as usize * stride..][..stride];
            let edge_row = y == rect.y || y == rect.bottom() - 1;
            for x in visible.x..visible.right() {
                let edge = edge_row || x == rect.x || x == rect.right() - 1;
                let color = if edge { style.pen } else { style.brush };
                let i = x as usize * CANVAS_BPP;
                row[i..i + CANVAS_BPP].copy_from_slice(&color);
            }
        }
    }
}

/// Maps destination pixels back onto the source region.
struct Sampler<'s, 'a> {
    src: &'s SourceBits<'a>,
    region: Rect,
    dst_w: u64,
    dst_h: u64,
    mode: StretchMode,
}

impl<'s, 'a> Sampler<'s, 'a> {
    fn new(src: &'s SourceBits<'a>, region: Rect, dst: Rect, mode: StretchMode) -> Self {
        Self {
            src,
            region,
            dst_w: dst.width as u64,
            dst_h: dst.height as u64,
            mode,
        }
    }

    /// Half-open span of source indices covered by destination index `d`
    #[inline]
    fn span(d: i32, dst_len: u64, src_len: i32) -> (usize, usize) {
        let d = d as u64;
        let src_len = src_len as u64;
        let start = d * src_len / dst_len;
        let end = ((d + 1) * src_len).div_ceil(dst_len).max(start + 1);
        (start as usize, end.min(src_len) as usize)
    }

    #[inline]
    fn sample(&self, dx: i32, dy: i32) -> [u8; 3] {
        let (x0, x1) = Self::span(dx, self.dst_w, self.region.width);
        let (y0, y1) = Self::span(dy, self.dst_h, self.region.height);
        let ox = self.region.x as usize;
        let oy = self.region.y as usize;

        match self.mode {
            StretchMode::ColorOnColor => self.src.pixel(ox + x0, oy + y0),
            StretchMode::Halftone => {
                let mut sum = [0u64; 3];
                for sy in y0..y1 {
                    for sx in x0..x1 {
                        let p = self.src.pixel(ox + sx, oy + sy);
                        sum[0] += p[0] as u64;
                        sum[1] += p[1] as u64;
                        sum[2] += p[2] as u64;
                    }
                }
                let n = ((x1 - x0) * (y1 - y0)) as u64;
                sum.map(|s| ((s + n / 2) / n) as u8)
            }
        }
    }
}

/// Headless target owning its framebuffer.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    style: DrawStyle,
}

impl MemorySurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_style(width, height, DrawStyle::default())
    }

    pub fn with_style(width: usize, height: usize, style: DrawStyle) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width * height * CANVAS_BPP],
            style,
        }
    }

    pub fn set_style(&mut self, style: DrawStyle) {
        self.style = style;
    }

    /// RGBA pixel at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * CANVAS_BPP;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn frame(&self) -> &[u8] {
        &self.pixels
    }

    fn canvas(&mut self) -> Canvas<'_> {
        Canvas {
            pixels: &mut self.pixels,
            width: self.width,
            height: self.height,
        }
    }
}

impl RasterTarget for MemorySurface {
    fn client_rect(&self) -> Rect {
        Rect::from_size(self.width as i32, self.height as i32)
    }

    fn set_bits_to_device(&mut self, dst: Rect, header: &FormatHeader, bits: &[u8]) -> usize {
        self.canvas().set_bits(dst, header, bits)
    }

    fn stretch_bits(
        &mut self,
        dst: Rect,
        src: Rect,
        header: &FormatHeader,
        bits: &[u8],
        mode: StretchMode,
    ) -> usize {
        self.canvas().stretch_bits(dst, src, header, bits, mode)
    }

    fn fill_rect(&mut self, rect: Rect) {
        let style = self.style;
        self.canvas().rectangle(rect, &style);
    }
}
