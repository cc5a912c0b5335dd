//! Fitblit player - shows a directory of images as a live feed.
//!
//! Architecture overview:
//! - Background feed thread decodes frames into a bounded queue
//! - The window's `pixels` framebuffer is the raster target
//! - One presenter owns that target and draws each frame as it comes due

mod decode;
mod feed;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossbeam_channel::{Receiver, TryRecvError};
use decode::{scan_directory, Decoder};
use feed::{spawn_feed, Frame};
use fitblit::config::Config;
use fitblit::{Canvas, DrawStyle, FitMode, FormatHeader, Presenter, RasterTarget, Rect, StretchMode};
use log::{error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser, Debug)]
#[command(name = "fitblit")]
#[command(about = "Play a directory of images as a live feed", long_about = None)]
struct Args {
    #[arg(default_value = ".")]
    directory: PathBuf,
    /// Fill the window instead of preserving aspect ratio
    #[arg(long)]
    stretch: bool,
    /// Frames per second
    #[arg(long)]
    fps: Option<f64>,
    /// Play the directory once instead of looping
    #[arg(long)]
    once: bool,
    /// Decode every frame as 8-bit grey
    #[arg(long)]
    grey: bool,
}

/// Key actions for data-driven input handling
#[derive(Clone, Copy)]
enum KeyAction {
    ToggleFit,
    TogglePause,
    Quit,
}

/// Key binding table - maps physical keys to actions
const KEY_BINDINGS: &[(KeyCode, KeyAction)] = &[
    (KeyCode::KeyF, KeyAction::ToggleFit),
    (KeyCode::Space, KeyAction::TogglePause),
    (KeyCode::Escape, KeyAction::Quit),
    (KeyCode::KeyQ, KeyAction::Quit),
];

fn lookup_key_action(key: KeyCode) -> Option<KeyAction> {
    KEY_BINDINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, action)| *action)
}

/// The window framebuffer as a raster target.
struct WindowSurface {
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    style: DrawStyle,
}

impl WindowSurface {
    fn canvas(&mut self) -> Option<Canvas<'_>> {
        Canvas::new(self.pixels.frame_mut(), self.width as usize, self.height as usize)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.pixels
            .resize_surface(width, height)
            .context("resizing surface")?;
        self.pixels
            .resize_buffer(width, height)
            .context("resizing framebuffer")?;
        self.width = width;
        self.height = height;
        let area = self.client_rect();
        self.fill_rect(area);
        Ok(())
    }
}

impl RasterTarget for WindowSurface {
    fn client_rect(&self) -> Rect {
        Rect::from_size(self.width as i32, self.height as i32)
    }

    fn set_bits_to_device(&mut self, dst: Rect, header: &FormatHeader, bits: &[u8]) -> usize {
        self.canvas()
            .map_or(0, |mut canvas| canvas.set_bits(dst, header, bits))
    }

    fn stretch_bits(
        &mut self,
        dst: Rect,
        src: Rect,
        header: &FormatHeader,
        bits: &[u8],
        mode: StretchMode,
    ) -> usize {
        self.canvas()
            .map_or(0, |mut canvas| canvas.stretch_bits(dst, src, header, bits, mode))
    }

    fn fill_rect(&mut self, rect: Rect) {
        let style = self.style;
        if let Some(mut canvas) = self.canvas() {
            canvas.rectangle(rect, &style);
        }
    }
}

/// Playback position in the feed
struct Playback {
    paused: bool,
    next_frame_at: Instant,
    finished: bool,
}

/// Initialized window state - created once window is ready
struct WindowState {
    window: Arc<Window>,
    presenter: Presenter<WindowSurface>,
    current: Option<Frame>,
}

impl WindowState {
    fn create(event_loop: &ActiveEventLoop, config: &Config) -> Result<Self> {
        let window_attributes = Window::default_attributes()
            .with_title(format!("{} - waiting for frames", config.window.title))
            .with_inner_size(LogicalSize::new(
                config.window.default_width,
                config.window.default_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("creating window")?,
        );

        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(size.width, size.height, surface_texture)
            .context("creating pixel buffer")?;

        let mut surface = WindowSurface {
            pixels,
            width: size.width,
            height: size.height,
            style: config.present.style(),
        };
        let area = surface.client_rect();
        surface.fill_rect(area);

        Ok(Self {
            window,
            presenter: Presenter::with_target(surface, config.present.fit_mode),
            current: None,
        })
    }

    /// Draw the current frame (if any) and flip
    fn render(&mut self) {
        if let Some(frame) = &self.current {
            if let Err(err) = self.presenter.draw(&frame.image.view()) {
                warn!("frame {} not drawn: {err}", frame.index);
            }
        }
        if let Some(surface) = self.presenter.target_mut() {
            if let Err(err) = surface.pixels.render() {
                error!("present failed: {err}");
            }
        }
    }

    fn show(&mut self, frame: Frame, title: &str) {
        self.window.set_title(&format!(
            "{title} - [{}] {} ({}x{}, {}-bit)",
            frame.index + 1,
            frame.name,
            frame.image.cols(),
            frame.image.rows(),
            frame.image.channels() * 8
        ));
        self.current = Some(frame);
        self.window.request_redraw();
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        let Some(surface) = self.presenter.target_mut() else {
            return;
        };
        if let Err(err) = surface.resize(width, height) {
            error!("{err:#}");
            return;
        }
        if let Err(err) = self.presenter.refresh() {
            error!("rebinding after resize: {err}");
        }
        self.window.request_redraw();
    }

    fn toggle_fit(&mut self) {
        let fit = self.presenter.fit_mode().toggled();
        info!("fit mode: {fit:?}");
        self.presenter.set_fit_mode(fit);
        self.window.request_redraw();
    }
}

/// Application with two-phase initialization
struct App {
    config: Config,
    frames: Receiver<Frame>,
    playback: Playback,
    window_state: Option<WindowState>,
    startup_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config, frames: Receiver<Frame>) -> Self {
        Self {
            config,
            frames,
            playback: Playback {
                paused: false,
                next_frame_at: Instant::now(),
                finished: false,
            },
            window_state: None,
            startup_error: None,
        }
    }

    fn handle_key_action(&mut self, action: KeyAction, event_loop: &ActiveEventLoop) {
        match action {
            KeyAction::ToggleFit => {
                if let Some(ws) = self.window_state.as_mut() {
                    ws.toggle_fit();
                }
            }
            KeyAction::TogglePause => {
                self.playback.paused = !self.playback.paused;
                self.playback.next_frame_at = Instant::now();
            }
            KeyAction::Quit => event_loop.exit(),
        }
    }

    /// Pull the next frame if one is due
    fn advance(&mut self) {
        let Some(ws) = self.window_state.as_mut() else {
            return;
        };
        let now = Instant::now();
        if self.playback.paused || self.playback.finished || now < self.playback.next_frame_at {
            return;
        }

        match self.frames.try_recv() {
            Ok(frame) => {
                ws.show(frame, &self.config.window.title);
                self.playback.next_frame_at = now + self.config.feed.frame_interval;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                info!("feed ended");
                self.playback.finished = true;
            }
        }
    }

    fn control_flow(&self) -> ControlFlow {
        if self.playback.paused || self.playback.finished {
            ControlFlow::Wait
        } else {
            ControlFlow::WaitUntil(self.playback.next_frame_at.max(Instant::now()))
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window_state.is_some() {
            return;
        }

        match WindowState::create(event_loop, &self.config) {
            Ok(ws) => self.window_state = Some(ws),
            Err(err) => {
                self.startup_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = lookup_key_action(key) {
                        self.handle_key_action(action, event_loop);
                    }
                }
            }

            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                if let Some(ws) = self.window_state.as_mut() {
                    ws.handle_resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(ws) = self.window_state.as_mut() {
                    ws.render();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.advance();
        event_loop.set_control_flow(self.control_flow());
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let dir = args
        .directory
        .canonicalize()
        .with_context(|| format!("cannot access directory '{}'", args.directory.display()))?;
    if !dir.is_dir() {
        bail!("'{}' is not a directory", dir.display());
    }

    let mut config = Config::default();
    if args.stretch {
        config.present.fit_mode = FitMode::Stretch;
    }
    if let Some(fps) = args.fps {
        config.feed.set_fps(fps);
    }
    config.feed.loop_playback = !args.once;
    config.feed.force_grey = args.grey;

    let decoder = Arc::new(Decoder::new(config.feed.force_grey));
    let paths = scan_directory(&dir, &decoder);
    if paths.is_empty() {
        bail!(
            "no supported images found in '{}'\nSupported formats: {:?}",
            dir.display(),
            decoder.extensions()
        );
    }
    info!(
        "playing {} frames from {} at {:.1} fps",
        paths.len(),
        dir.display(),
        config.feed.fps()
    );

    let (frames, _feed_handle) = spawn_feed(paths, decoder, config.feed.clone());

    let event_loop = EventLoop::new().context("creating event loop")?;
    let mut app = App::new(config, frames);
    event_loop.run_app(&mut app).context("event loop error")?;

    match app.startup_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
