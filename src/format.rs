//! Pixel format headers passed to the raster primitives.
//!
//! A header tells a primitive how to read the working buffer: how wide and
//! tall it is, whether rows run top-down, how many bits a pixel takes and,
//! for 8-bit buffers, which color each index maps to.

use std::fmt;

/// Supported pixel layouts, keyed by bits per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    /// 1 byte per pixel, palette indexed
    Grey8,
    /// 3 bytes per pixel, R G B
    Rgb24,
    /// 4 bytes per pixel, R G B X
    Rgba32,
}

impl BitDepth {
    /// Map a bits-per-pixel value to a layout; anything but 8/24/32 is None
    pub const fn from_bits(bits: usize) -> Option<Self> {
        match bits {
            8 => Some(Self::Grey8),
            24 => Some(Self::Rgb24),
            32 => Some(Self::Rgba32),
            _ => None,
        }
    }

    pub const fn bits(self) -> u16 {
        match self {
            Self::Grey8 => 8,
            Self::Rgb24 => 24,
            Self::Rgba32 => 32,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        self.bits() as usize / 8
    }

    /// Filler columns needed so every row starts on a 4-byte boundary.
    ///
    /// 32-bit rows are always aligned since each pixel is already 4 bytes.
    pub const fn padding_columns(self, cols: usize) -> usize {
        match self {
            Self::Rgba32 => 0,
            _ => (4 - cols % 4) % 4,
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// One color table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub reserved: u8,
}

/// Number of entries in an 8-bit color table
pub const PALETTE_LEN: usize = 256;

/// Capability that differs between the two header variants.
#[derive(Clone, PartialEq, Eq)]
pub enum HeaderKind {
    /// 8-bit indexed with a color table
    Grey { palette: Box<[PaletteEntry; PALETTE_LEN]> },
    /// 24/32-bit direct color, no table
    Color,
}

impl fmt::Debug for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grey { .. } => f.write_str("Grey"),
            Self::Color => f.write_str("Color"),
        }
    }
}

/// Describes the layout of a buffer handed to a raster primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatHeader {
    /// Columns per row, padding included
    pub width: i32,
    /// Row count; negative means rows are stored top-down
    pub height: i32,
    /// Bits per pixel (0 until the first frame sets it on the color header)
    pub bit_count: u16,
    pub kind: HeaderKind,
}

impl FormatHeader {
    /// Direct-color header with no dimensions yet
    pub fn color() -> Self {
        Self {
            width: 0,
            height: 0,
            bit_count: 0,
            kind: HeaderKind::Color,
        }
    }

    /// 8-bit header with an identity grey color table
    pub fn grey() -> Self {
        let mut palette = Box::new([PaletteEntry::default(); PALETTE_LEN]);
        for (i, entry) in palette.iter_mut().enumerate() {
            let level = i as u8;
            *entry = PaletteEntry {
                red: level,
                green: level,
                blue: level,
                reserved: 0,
            };
        }
        Self {
            width: 0,
            height: 0,
            bit_count: 8,
            kind: HeaderKind::Grey { palette },
        }
    }

    /// Fresh header describing a `rows` x `cols` buffer
    pub fn for_shape(depth: BitDepth, rows: usize, cols: usize) -> Self {
        let mut header = match depth {
            BitDepth::Grey8 => Self::grey(),
            _ => Self::color(),
        };
        header.describe(depth, rows, cols);
        header
    }

    /// Update the per-frame fields in place
    pub fn describe(&mut self, depth: BitDepth, rows: usize, cols: usize) {
        self.height = -(rows as i32);
        self.width = cols as i32;
        self.bit_count = depth.bits();
    }

    #[inline]
    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.height.unsigned_abs() as usize
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.width.max(0) as usize
    }

    #[inline]
    pub fn depth(&self) -> Option<BitDepth> {
        BitDepth::from_bits(self.bit_count as usize)
    }

    /// Bytes between row starts, rounded up to a 4-byte boundary
    #[inline]
    pub fn stride(&self) -> usize {
        (self.cols() * self.bit_count as usize).div_ceil(32) * 4
    }

    /// Bytes a buffer must hold to satisfy this header
    #[inline]
    pub fn image_size(&self) -> usize {
        self.stride() * self.rows()
    }

    pub fn palette(&self) -> Option<&[PaletteEntry; PALETTE_LEN]> {
        match &self.kind {
            HeaderKind::Grey { palette } => Some(&**palette),
            HeaderKind::Color => None,
        }
    }
}

/// The two pre-built header variants a presenter keeps around.
#[derive(Debug, Clone)]
pub struct FormatHeaders {
    grey: FormatHeader,
    color: FormatHeader,
}

impl FormatHeaders {
    pub fn new() -> Self {
        Self {
            grey: FormatHeader::grey(),
            color: FormatHeader::color(),
        }
    }

    /// Pick the variant for `depth` and describe the working buffer on it
    pub fn prepare(&mut self, depth: BitDepth, rows: usize, cols: usize) -> &FormatHeader {
        let header = match depth {
            BitDepth::Grey8 => &mut self.grey,
            BitDepth::Rgb24 | BitDepth::Rgba32 => &mut self.color,
        };
        header.describe(depth, rows, cols);
        header
    }

    pub fn grey(&self) -> &FormatHeader {
        &self.grey
    }

    pub fn color(&self) -> &FormatHeader {
        &self.color
    }
}

impl Default for FormatHeaders {
    fn default() -> Self {
        Self::new()
    }
}
