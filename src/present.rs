//! Frame presenter - puts pixel buffers on a raster target.
//!
//! The presenter is tuned for video: frames usually keep the same shape, so
//! everything that can be kept between calls is kept:
//! - the destination rectangle, to repaint the background only on layout change
//! - both format headers, so only width/height/depth are touched per frame
//! - a scratch buffer for frames that need padding or compaction
//!
//! Threading: a presenter is `Send` (when its target is) but not `Sync`.
//! Several threads may each own a presenter, as long as no two of them draw
//! to the same target at the same time. Callers serialize access per target.

use crate::format::{BitDepth, FormatHeader, FormatHeaders};
use crate::frame::{ImageBuf, ImageView};
use crate::geometry::{fit_rect, FitMode, Rect, SurfaceDescriptor};
use crate::raster::{RasterTarget, StretchMode};
use log::{debug, trace};
use std::cell::Cell;
use std::marker::PhantomData;
use thiserror::Error;

/// Why a bind or draw did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PresentError {
    #[error("no drawing target is bound")]
    Unbound,
    #[error("frame has no pixels")]
    EmptyFrame,
    #[error("unsupported bit depth {0} (expected 8, 24 or 32)")]
    UnsupportedDepth(usize),
    #[error("raster primitive transferred no lines")]
    PrimitiveFailed,
}

/// How a frame reached the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitPath {
    /// Same size as the surface, copied without resampling
    Direct,
    /// Resampled into the destination rectangle
    Stretched(StretchMode),
}

/// What a successful draw did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawReport {
    pub path: BlitPath,
    /// Rectangle painted on the surface
    pub dest: Rect,
    /// Background was repainted before the transfer
    pub cleared: bool,
    /// Frame went through the scratch buffer
    pub staged: bool,
    /// Lines reported by the raster primitive
    pub lines: usize,
}

/// Draws frames onto one bound target.
pub struct Presenter<T> {
    target: Option<T>,
    fit: FitMode,
    surface: Option<SurfaceDescriptor>,
    /// Last rectangle painted; None until the first draw after a bind
    dest: Option<Rect>,
    headers: FormatHeaders,
    scratch: ImageBuf,
    _not_sync: PhantomData<Cell<()>>,
}

impl<T: RasterTarget> Presenter<T> {
    /// Unbound presenter; bind a target with `set_target` before drawing
    pub fn new(fit: FitMode) -> Self {
        Self {
            target: None,
            fit,
            surface: None,
            dest: None,
            headers: FormatHeaders::new(),
            scratch: ImageBuf::default(),
            _not_sync: PhantomData,
        }
    }

    /// Presenter bound to `target`
    pub fn with_target(target: T, fit: FitMode) -> Self {
        let mut presenter = Self::new(fit);
        presenter.bind(target, fit);
        presenter
    }

    /// Bind `target` and set the fit mode.
    ///
    /// `None` fails and leaves the current binding as it was.
    pub fn set_target(&mut self, target: Option<T>, fit: FitMode) -> Result<(), PresentError> {
        let target = target.ok_or(PresentError::Unbound)?;
        self.bind(target, fit);
        Ok(())
    }

    /// Bind `target`, keeping the current fit mode
    pub fn rebind(&mut self, target: Option<T>) -> Result<(), PresentError> {
        self.set_target(target, self.fit)
    }

    /// Re-read the geometry of the bound target (after a resize)
    pub fn refresh(&mut self) -> Result<(), PresentError> {
        let target = self.target.take().ok_or(PresentError::Unbound)?;
        self.bind(target, self.fit);
        Ok(())
    }

    fn bind(&mut self, target: T, fit: FitMode) {
        let surface = SurfaceDescriptor::new(target.client_rect());
        debug!(
            "bound target {}x{} at ({}, {}), ratio {:.3}, {:?}",
            surface.rect.width, surface.rect.height, surface.rect.x, surface.rect.y, surface.ratio, fit
        );
        self.target = Some(target);
        self.fit = fit;
        self.surface = Some(surface);
        self.dest = None;
        self.headers = FormatHeaders::new();
    }

    /// Change the fit mode. Geometry is left alone.
    pub fn set_fit_mode(&mut self, fit: FitMode) {
        self.fit = fit;
    }

    pub fn fit_mode(&self) -> FitMode {
        self.fit
    }

    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn target_mut(&mut self) -> Option<&mut T> {
        self.target.as_mut()
    }

    pub fn surface(&self) -> Option<&SurfaceDescriptor> {
        self.surface.as_ref()
    }

    /// Rectangle painted by the last successful draw
    pub fn destination(&self) -> Option<Rect> {
        self.dest
    }

    /// Draw `frame` on the bound target.
    ///
    /// Nothing cached changes unless the draw succeeds.
    pub fn draw(&mut self, frame: &ImageView<'_>) -> Result<DrawReport, PresentError> {
        let (Some(target), Some(surface)) = (self.target.as_mut(), self.surface) else {
            return Err(PresentError::Unbound);
        };
        if frame.is_empty() {
            return Err(PresentError::EmptyFrame);
        }
        let bits = frame.bit_depth();
        let depth = BitDepth::from_bits(bits).ok_or(PresentError::UnsupportedDepth(bits))?;

        // Rows must be continuous and start on a 4-byte boundary
        let padding = depth.padding_columns(frame.cols());
        let staged = padding > 0 || !frame.is_continuous();
        let working = if staged {
            if self
                .scratch
                .ensure_shape(frame.rows(), frame.cols() + padding, frame.channels())
            {
                debug!(
                    "scratch reshaped to {}x{}x{}",
                    frame.rows(),
                    frame.cols() + padding,
                    frame.channels()
                );
            }
            self.scratch.copy_padded(frame, padding);
            self.scratch.view()
        } else {
            *frame
        };

        let header = self.headers.prepare(depth, working.rows(), working.cols());

        // Same size: plain block transfer. Padding columns, if any, end up
        // on screen here (at most 3 px).
        if surface
            .rect
            .same_size(working.cols() as i32, working.rows() as i32)
        {
            let lines = target.set_bits_to_device(surface.rect, header, working.data());
            if lines == 0 {
                return Err(PresentError::PrimitiveFailed);
            }
            self.dest = Some(surface.rect);
            trace!("direct blit {}x{} {}", working.cols(), working.rows(), depth);
            return Ok(DrawReport {
                path: BlitPath::Direct,
                dest: surface.rect,
                cleared: false,
                staged,
                lines,
            });
        }

        let dest = fit_rect(&surface, self.fit, frame.cols(), frame.rows());
        let cleared = needs_clear(self.dest, dest);
        if cleared {
            debug!("layout changed to {dest:?}, clearing background");
            target.fill_rect(surface.rect);
        }

        let mode = StretchMode::for_widths(dest.width, frame.cols());
        // Source rect excludes the padding columns
        let src = Rect::from_size(frame.cols() as i32, frame.rows() as i32);
        let lines = target.stretch_bits(dest, src, header, working.data(), mode);
        if lines == 0 {
            return Err(PresentError::PrimitiveFailed);
        }
        self.dest = Some(dest);
        trace!(
            "stretched {}x{} {} into {dest:?} with {mode:?}",
            frame.cols(),
            frame.rows(),
            depth
        );

        Ok(DrawReport {
            path: BlitPath::Stretched(mode),
            dest,
            cleared,
            staged,
            lines,
        })
    }
}

impl<T: RasterTarget> Default for Presenter<T> {
    fn default() -> Self {
        Self::new(FitMode::default())
    }
}

/// A repaint is due when a previous rectangle exists and differs.
#[inline]
pub fn needs_clear(previous: Option<Rect>, next: Rect) -> bool {
    previous.is_some_and(|prev| prev != next)
}

/// Draw `frame` stretched over the whole client area of `target`.
///
/// One-shot variant of `Presenter::draw`: nothing is cached, the header and
/// any padded copy are built per call, and the background is never cleared.
pub fn draw_stretched<T: RasterTarget + ?Sized>(
    target: &mut T,
    frame: &ImageView<'_>,
) -> Result<usize, PresentError> {
    if frame.is_empty() {
        return Err(PresentError::EmptyFrame);
    }
    let bits = frame.bit_depth();
    let depth = BitDepth::from_bits(bits).ok_or(PresentError::UnsupportedDepth(bits))?;

    let padding = depth.padding_columns(frame.cols());
    let padded;
    let working = if padding > 0 || !frame.is_continuous() {
        let mut buf = ImageBuf::new(frame.rows(), frame.cols() + padding, frame.channels());
        buf.copy_padded(frame, padding);
        padded = buf;
        padded.view()
    } else {
        *frame
    };

    let header = FormatHeader::for_shape(depth, working.rows(), working.cols());
    let area = target.client_rect();

    let lines = if area.same_size(working.cols() as i32, working.rows() as i32) {
        target.set_bits_to_device(area, &header, working.data())
    } else {
        let src = Rect::from_size(frame.cols() as i32, frame.rows() as i32);
        target.stretch_bits(area, src, &header, working.data(), StretchMode::ColorOnColor)
    };

    match lines {
        0 => Err(PresentError::PrimitiveFailed),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{DrawStyle, MemorySurface};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Direct {
            dst: Rect,
            width: i32,
            height: i32,
            bit_count: u16,
        },
        Stretch {
            dst: Rect,
            src: Rect,
            width: i32,
            mode: StretchMode,
        },
        Fill(Rect),
    }

    /// Records every primitive call instead of drawing
    struct Recorder {
        rect: Rect,
        calls: Vec<Call>,
        bits_ptrs: Vec<*const u8>,
        fail: bool,
    }

    impl Recorder {
        fn new(width: i32, height: i32) -> Self {
            Self {
                rect: Rect::from_size(width, height),
                calls: Vec::new(),
                bits_ptrs: Vec::new(),
                fail: false,
            }
        }

        fn fills(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Fill(_))).count()
        }

        fn last(&self) -> &Call {
            self.calls.last().unwrap()
        }
    }

    impl RasterTarget for Recorder {
        fn client_rect(&self) -> Rect {
            self.rect
        }

        fn set_bits_to_device(&mut self, dst: Rect, header: &FormatHeader, bits: &[u8]) -> usize {
            self.bits_ptrs.push(bits.as_ptr());
            self.calls.push(Call::Direct {
                dst,
                width: header.width,
                height: header.height,
                bit_count: header.bit_count,
            });
            if self.fail {
                0
            } else {
                header.rows()
            }
        }

        fn stretch_bits(
            &mut self,
            dst: Rect,
            src: Rect,
            header: &FormatHeader,
            bits: &[u8],
            mode: StretchMode,
        ) -> usize {
            self.bits_ptrs.push(bits.as_ptr());
            self.calls.push(Call::Stretch {
                dst,
                src,
                width: header.width,
                mode,
            });
            if self.fail {
                0
            } else {
                src.height as usize
            }
        }

        fn fill_rect(&mut self, rect: Rect) {
            self.calls.push(Call::Fill(rect));
        }
    }

    fn blank(rows: usize, cols: usize, channels: usize) -> Vec<u8> {
        vec![0u8; rows * cols * channels]
    }

    fn presenter(width: i32, height: i32, fit: FitMode) -> Presenter<Recorder> {
        Presenter::with_target(Recorder::new(width, height), fit)
    }

    fn recorder(p: &Presenter<Recorder>) -> &Recorder {
        p.target().unwrap()
    }

    #[test]
    fn test_aligned_frames_are_not_copied() {
        for (cols, channels) in [(640, 1), (640, 3), (640, 4), (641, 4), (3, 4)] {
            let data = blank(10, cols, channels);
            let frame = ImageView::new(&data, 10, cols, channels).unwrap();
            let mut p = presenter(800, 600, FitMode::Autofit);

            let report = p.draw(&frame).unwrap();

            assert!(!report.staged, "{cols}x{channels}");
            assert_eq!(recorder(&p).bits_ptrs[0], data.as_ptr());
        }
    }

    #[test]
    fn test_unaligned_frames_are_padded() {
        for (cols, channels) in [(641, 1), (642, 3), (643, 3)] {
            let data = blank(10, cols, channels);
            let frame = ImageView::new(&data, 10, cols, channels).unwrap();
            let mut p = presenter(800, 600, FitMode::Stretch);

            let report = p.draw(&frame).unwrap();

            assert!(report.staged);
            assert_ne!(recorder(&p).bits_ptrs[0], data.as_ptr());
            let padding = 4 - cols % 4;
            match recorder(&p).last() {
                Call::Stretch { width, src, .. } => {
                    assert_eq!(*width as usize, cols + padding);
                    // source rect never includes the padding
                    assert_eq!(*src, Rect::from_size(cols as i32, 10));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_continuous_frame_is_staged() {
        let data = blank(20, 20, 3);
        let full = ImageView::new(&data, 20, 20, 3).unwrap();
        let roi = full.region(4, 4, 8, 8).unwrap();
        let mut p = presenter(100, 100, FitMode::Autofit);

        let report = p.draw(&roi).unwrap();

        assert!(report.staged);
    }

    #[test]
    fn test_scratch_is_reused_between_frames() {
        let data = blank(30, 31, 3);
        let frame = ImageView::new(&data, 30, 31, 3).unwrap();
        let mut p = presenter(200, 100, FitMode::Autofit);

        p.draw(&frame).unwrap();
        p.draw(&frame).unwrap();

        let ptrs = &recorder(&p).bits_ptrs;
        assert_eq!(ptrs[0], ptrs[1]);
    }

    #[test]
    fn test_same_size_uses_direct_transfer() {
        let data = blank(600, 800, 3);
        let frame = ImageView::new(&data, 600, 800, 3).unwrap();
        let mut p = presenter(800, 600, FitMode::Autofit);

        let report = p.draw(&frame).unwrap();

        assert_eq!(report.path, BlitPath::Direct);
        assert_eq!(p.destination(), Some(Rect::from_size(800, 600)));
        assert_eq!(
            recorder(&p).calls,
            vec![Call::Direct {
                dst: Rect::from_size(800, 600),
                width: 800,
                height: -600,
                bit_count: 24,
            }]
        );
    }

    #[test]
    fn test_direct_transfer_includes_padding() {
        // 798 grey columns pad to 800 and match the surface exactly
        let data = blank(600, 798, 1);
        let frame = ImageView::new(&data, 600, 798, 1).unwrap();
        let mut p = presenter(800, 600, FitMode::Stretch);

        let report = p.draw(&frame).unwrap();

        assert_eq!(report.path, BlitPath::Direct);
        assert!(report.staged);
        assert!(matches!(recorder(&p).last(), Call::Direct { width: 800, bit_count: 8, .. }));
    }

    #[test]
    fn test_matching_ratio_fills_surface() {
        // 640x480 RGB on 800x600
        let data = blank(480, 640, 3);
        let frame = ImageView::new(&data, 480, 640, 3).unwrap();
        let mut p = presenter(800, 600, FitMode::Autofit);

        let report = p.draw(&frame).unwrap();

        assert_eq!(report.dest, Rect::new(0, 0, 800, 600));
        assert!(!report.cleared);
        assert_eq!(report.path, BlitPath::Stretched(StretchMode::ColorOnColor));
        assert_eq!(recorder(&p).fills(), 0);
    }

    #[test]
    fn test_grey_matching_ratio_fills_surface() {
        let data = blank(240, 320, 1);
        let frame = ImageView::new(&data, 240, 320, 1).unwrap();
        let mut p = presenter(800, 600, FitMode::Autofit);

        let report = p.draw(&frame).unwrap();

        assert_eq!(report.dest, Rect::new(0, 0, 800, 600));
        assert!(!report.cleared);
        assert!(!report.staged);
    }

    #[test]
    fn test_wide_surface_letterboxes() {
        // 640x480 RGBA on 800x400
        let data = blank(480, 640, 4);
        let frame = ImageView::new(&data, 480, 640, 4).unwrap();
        let mut p = presenter(800, 400, FitMode::Autofit);

        let report = p.draw(&frame).unwrap();

        assert_eq!(report.dest, Rect::new(133, 0, 533, 400));
        assert!(!report.cleared);
        assert_eq!(report.path, BlitPath::Stretched(StretchMode::Halftone));
        assert_eq!(recorder(&p).fills(), 0);
        assert_eq!(p.destination(), Some(Rect::new(133, 0, 533, 400)));
    }

    #[test]
    fn test_repeated_draws_do_not_clear() {
        let data = blank(480, 640, 4);
        let frame = ImageView::new(&data, 480, 640, 4).unwrap();
        let mut p = presenter(800, 400, FitMode::Autofit);

        for _ in 0..5 {
            assert!(!p.draw(&frame).unwrap().cleared);
        }
        assert_eq!(recorder(&p).fills(), 0);
    }

    #[test]
    fn test_layout_change_clears_surface() {
        let wide = blank(100, 400, 4);
        let tall = blank(400, 100, 4);
        let wide = ImageView::new(&wide, 100, 400, 4).unwrap();
        let tall = ImageView::new(&tall, 400, 100, 4).unwrap();
        let mut p = presenter(300, 300, FitMode::Autofit);

        assert!(!p.draw(&wide).unwrap().cleared);
        assert!(p.draw(&tall).unwrap().cleared);
        assert!(!p.draw(&tall).unwrap().cleared);

        let r = recorder(&p);
        assert_eq!(r.fills(), 1);
        assert_eq!(r.calls[1], Call::Fill(Rect::from_size(300, 300)));
    }

    #[test]
    fn test_fit_mode_change_clears_once() {
        let data = blank(100, 400, 4);
        let frame = ImageView::new(&data, 100, 400, 4).unwrap();
        let mut p = presenter(300, 300, FitMode::Autofit);

        p.draw(&frame).unwrap();
        p.set_fit_mode(FitMode::Stretch);
        let report = p.draw(&frame).unwrap();

        assert!(report.cleared);
        assert_eq!(report.dest, Rect::from_size(300, 300));
        assert!(!p.draw(&frame).unwrap().cleared);
    }

    #[test]
    fn test_stretch_always_fills_surface() {
        let mut p = presenter(320, 200, FitMode::Stretch);
        for (rows, cols) in [(10, 10), (480, 640), (7, 900)] {
            let data = blank(rows, cols, 4);
            let frame = ImageView::new(&data, rows, cols, 4).unwrap();
            assert_eq!(p.draw(&frame).unwrap().dest, Rect::from_size(320, 200));
        }
        assert_eq!(recorder(&p).fills(), 0);
    }

    #[test]
    fn test_filter_follows_scale_direction() {
        let mut p = presenter(800, 600, FitMode::Autofit);

        let big = blank(1200, 1600, 4);
        let big = ImageView::new(&big, 1200, 1600, 4).unwrap();
        assert_eq!(p.draw(&big).unwrap().path, BlitPath::Stretched(StretchMode::Halftone));

        let small = blank(120, 160, 4);
        let small = ImageView::new(&small, 120, 160, 4).unwrap();
        assert_eq!(
            p.draw(&small).unwrap().path,
            BlitPath::Stretched(StretchMode::ColorOnColor)
        );
    }

    #[test]
    fn test_draw_without_target_fails() {
        let mut p: Presenter<Recorder> = Presenter::new(FitMode::Autofit);
        let data = blank(4, 4, 1);
        let frame = ImageView::new(&data, 4, 4, 1).unwrap();

        assert_eq!(p.draw(&frame).unwrap_err(), PresentError::Unbound);
    }

    #[test]
    fn test_empty_frame_fails() {
        let mut p = presenter(10, 10, FitMode::Autofit);
        let frame = ImageView::new(&[], 0, 4, 3).unwrap();

        assert_eq!(p.draw(&frame).unwrap_err(), PresentError::EmptyFrame);
        assert!(recorder(&p).calls.is_empty());
    }

    #[test]
    fn test_unsupported_depth_fails() {
        let mut p = presenter(10, 10, FitMode::Autofit);
        let data = blank(4, 4, 2);
        let frame = ImageView::new(&data, 4, 4, 2).unwrap();

        assert_eq!(p.draw(&frame).unwrap_err(), PresentError::UnsupportedDepth(16));
        assert!(recorder(&p).calls.is_empty());
    }

    #[test]
    fn test_primitive_failure_keeps_cache() {
        let data = blank(480, 640, 4);
        let frame = ImageView::new(&data, 480, 640, 4).unwrap();
        let mut p = presenter(800, 400, FitMode::Autofit);
        p.draw(&frame).unwrap();
        let before = p.destination();

        p.target_mut().unwrap().fail = true;
        p.set_fit_mode(FitMode::Stretch);
        assert_eq!(p.draw(&frame).unwrap_err(), PresentError::PrimitiveFailed);
        assert_eq!(p.destination(), before);

        let same = blank(400, 800, 4);
        let same = ImageView::new(&same, 400, 800, 4).unwrap();
        assert_eq!(p.draw(&same).unwrap_err(), PresentError::PrimitiveFailed);
        assert_eq!(p.destination(), before);
    }

    #[test]
    fn test_null_bind_keeps_previous_target() {
        let mut p = presenter(640, 480, FitMode::Stretch);
        let surface = *p.surface().unwrap();

        assert_eq!(p.set_target(None, FitMode::Autofit), Err(PresentError::Unbound));
        assert_eq!(p.rebind(None), Err(PresentError::Unbound));

        assert!(p.is_bound());
        assert_eq!(p.fit_mode(), FitMode::Stretch);
        assert_eq!(p.surface(), Some(&surface));
    }

    #[test]
    fn test_null_bind_on_fresh_presenter() {
        let mut p: Presenter<Recorder> = Presenter::default();
        assert_eq!(p.set_target(None, FitMode::Stretch), Err(PresentError::Unbound));
        assert!(!p.is_bound());
        assert_eq!(p.fit_mode(), FitMode::Autofit);
    }

    #[test]
    fn test_rebind_resets_destination() {
        let data = blank(100, 400, 4);
        let frame = ImageView::new(&data, 100, 400, 4).unwrap();
        let mut p = presenter(300, 300, FitMode::Autofit);
        p.draw(&frame).unwrap();

        p.rebind(Some(Recorder::new(500, 200))).unwrap();
        assert_eq!(p.destination(), None);
        assert_eq!(p.fit_mode(), FitMode::Autofit);
        assert_eq!(p.surface().unwrap().ratio, 2.5);

        // first draw on the new target adopts without clearing
        assert!(!p.draw(&frame).unwrap().cleared);
    }

    #[test]
    fn test_refresh_picks_up_resize() {
        let data = blank(100, 100, 4);
        let frame = ImageView::new(&data, 100, 100, 4).unwrap();
        let mut p = presenter(300, 300, FitMode::Autofit);
        p.draw(&frame).unwrap();

        p.target_mut().unwrap().rect = Rect::from_size(600, 300);
        p.refresh().unwrap();

        assert_eq!(p.draw(&frame).unwrap().dest, Rect::new(150, 0, 300, 300));
    }

    #[test]
    fn test_needs_clear() {
        let a = Rect::from_size(10, 10);
        let b = Rect::new(1, 0, 9, 10);
        assert!(!needs_clear(None, a));
        assert!(!needs_clear(Some(a), a));
        assert!(needs_clear(Some(a), b));
    }

    #[test]
    fn test_pixels_land_centered() {
        // 2x1 grey on a 4x4 surface: fit width, 4x2 image centered vertically
        let style = DrawStyle {
            pen: [7, 7, 7, 255],
            brush: [7, 7, 7, 255],
        };
        let mut surface = MemorySurface::with_style(4, 4, style);
        let data = [10u8, 200];
        let frame = ImageView::new(&data, 1, 2, 1).unwrap();

        let mut p = Presenter::with_target(&mut surface, FitMode::Autofit);
        let report = p.draw(&frame).unwrap();
        assert_eq!(report.dest, Rect::new(0, 1, 4, 2));
        drop(p);

        assert_eq!(surface.pixel(0, 1), [10, 10, 10, 255]);
        assert_eq!(surface.pixel(3, 2), [200, 200, 200, 255]);
        // untouched outside the destination
        assert_eq!(surface.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_layout_change_paints_background() {
        let style = DrawStyle {
            pen: [9, 9, 9, 255],
            brush: [5, 5, 5, 255],
        };
        let mut surface = MemorySurface::with_style(8, 8, style);
        let wide = [255u8; 8 * 2 * 3];
        let wide = ImageView::new(&wide, 2, 8, 3).unwrap();
        let tall = [255u8; 2 * 8 * 4];
        let tall = ImageView::new(&tall, 8, 2, 4).unwrap();

        let mut p = Presenter::with_target(&mut surface, FitMode::Autofit);
        p.draw(&wide).unwrap();
        p.draw(&tall).unwrap();
        drop(p);

        // tall frame occupies columns 3..5, the old wide band is repainted
        assert_eq!(surface.pixel(3, 4), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(1, 4), [5, 5, 5, 255]);
        assert_eq!(surface.pixel(0, 0), [9, 9, 9, 255]);
    }

    #[test]
    fn test_draw_stretched_fills_client_area() {
        let mut target = Recorder::new(100, 50);
        let data = blank(10, 10, 3);
        let frame = ImageView::new(&data, 10, 10, 3).unwrap();

        assert_eq!(draw_stretched(&mut target, &frame), Ok(10));
        assert_eq!(
            target.calls,
            vec![Call::Stretch {
                dst: Rect::from_size(100, 50),
                src: Rect::from_size(10, 10),
                width: 12,
                mode: StretchMode::ColorOnColor,
            }]
        );
    }

    #[test]
    fn test_draw_stretched_same_size_is_direct() {
        let mut target = Recorder::new(8, 4);
        let data = blank(4, 8, 4);
        let frame = ImageView::new(&data, 4, 8, 4).unwrap();

        assert_eq!(draw_stretched(&mut target, &frame), Ok(4));
        assert!(matches!(target.last(), Call::Direct { bit_count: 32, .. }));
    }

    #[test]
    fn test_draw_stretched_errors() {
        let mut target = Recorder::new(8, 4);
        let data = blank(4, 4, 2);
        let frame = ImageView::new(&data, 4, 4, 2).unwrap();
        assert_eq!(
            draw_stretched(&mut target, &frame),
            Err(PresentError::UnsupportedDepth(16))
        );

        target.fail = true;
        let data = blank(4, 4, 1);
        let frame = ImageView::new(&data, 4, 4, 1).unwrap();
        assert_eq!(draw_stretched(&mut target, &frame), Err(PresentError::PrimitiveFailed));
    }

    #[test]
    fn test_large_frame_on_tiny_surface() {
        let side = 4200;
        let data = vec![255u8; side * side];
        let frame = ImageView::new(&data, side, side, 1).unwrap();
        let mut surface = MemorySurface::new(1, 1);

        let mut p = Presenter::with_target(&mut surface, FitMode::Autofit);
        let report = p.draw(&frame).unwrap();
        assert_eq!(report.path, BlitPath::Stretched(StretchMode::Halftone));
        drop(p);

        assert_eq!(surface.pixel(0, 0), [255, 255, 255, 255]);
    }
}
