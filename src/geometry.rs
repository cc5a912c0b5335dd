//! Surface geometry - rectangles, fit policy and the layout math.
//!
//! Everything here is pure: given the surface and the image shape, produce
//! the rectangle the image lands in. No drawing happens in this module.

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[inline]
    pub fn same_size(&self, width: i32, height: i32) -> bool {
        self.width == width && self.height == height
    }

    /// True if `other` lies entirely inside `self`
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Intersection with `other`, or None if they don't overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// How an image is laid out on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Preserve aspect ratio, fit the limiting axis and center the other
    #[default]
    Autofit,
    /// Ignore aspect ratio and fill the whole surface
    Stretch,
}

impl FitMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Autofit => Self::Stretch,
            Self::Stretch => Self::Autofit,
        }
    }
}

/// Geometry of a bound drawing surface, captured at bind time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDescriptor {
    pub rect: Rect,
    /// width / height
    pub ratio: f64,
}

impl SurfaceDescriptor {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ratio: rect.width as f64 / rect.height as f64,
        }
    }
}

/// Compute where an image of `cols` x `rows` lands on `surface`.
///
/// Autofit compares the surface ratio against the image ratio and fits the
/// limiting axis; the derived extent and the centering offset are floored,
/// so any rounding bias goes toward the surface origin.
pub fn fit_rect(surface: &SurfaceDescriptor, mode: FitMode, cols: usize, rows: usize) -> Rect {
    let area = surface.rect;
    match mode {
        FitMode::Stretch => area,
        FitMode::Autofit => {
            let image_ratio = cols as f64 / rows as f64;
            if surface.ratio > image_ratio {
                // fit height
                let width = (cols as f64 * area.height as f64 / rows as f64).floor() as i32;
                Rect {
                    x: area.x + ((area.width - width) as f64 / 2.0).floor() as i32,
                    y: area.y,
                    width,
                    height: area.height,
                }
            } else {
                // fit width
                let height = (rows as f64 * area.width as f64 / cols as f64).floor() as i32;
                Rect {
                    x: area.x,
                    y: area.y + ((area.height - height) as f64 / 2.0).floor() as i32,
                    width: area.width,
                    height,
                }
            }
        }
    }
}
