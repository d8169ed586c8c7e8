use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use anyhow::{Context, Result};
use lightsout_core::Snapshot;
use lightsout_render::LampRenderer;
use lightsout_sequencer::{
    command_for_key, command_for_tap, Command, Key, ReactOutcome, ReactionSequencer,
    TracingSurface,
};
use lightsout_timing::HighPrecisionClock;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::config::Settings;

const TITLE: &str = "Lights Out";

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    sequencer: ReactionSequencer<HighPrecisionClock, ThreadRng>,
    renderer: Option<LampRenderer>,
    settings: Settings,

    should_exit: bool,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self> {
        let mut sequencer = ReactionSequencer::new(
            settings.sequencer.clone(),
            HighPrecisionClock::new(),
            rand::rng(),
        )?;
        sequencer.attach(TracingSurface::new());

        Ok(Self {
            window: None,
            pixels: None,
            sequencer,
            renderer: None,
            settings,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "press SPACE to start, ENTER or click to react, ESC to exit"
        );

        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut window_attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(PhysicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ));

        if self.settings.fullscreen {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next())
                .context("no monitor available")?;
            window_attributes =
                window_attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        }

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale = window.scale_factor(),
            "window created"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.renderer = Some(LampRenderer::new(
            physical_size.width,
            physical_size.height,
        )?);

        // the title bar carries the prompt and result text
        let title_window = Arc::clone(&window);
        self.sequencer.attach(move |snapshot: &Snapshot| {
            title_window.set_title(&format!("{TITLE} - {}", snapshot.headline()));
        });

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let snapshot = self.sequencer.snapshot();
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let stats = renderer.render_frame(&snapshot, pixels.frame_mut())?;
        if stats.redrawn {
            trace!(
                clear_ms = stats.clear.as_secs_f64() * 1e3,
                lamps_ms = stats.lamps.as_secs_f64() * 1e3,
                copy_ms = stats.copy.as_secs_f64() * 1e3,
                total_ms = stats.total.as_secs_f64() * 1e3,
                "frame rendered"
            );
        }
        pixels.render()?;
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_command(&mut self, command: Command, event_loop: &ActiveEventLoop) {
        match command {
            Command::Start => self.sequencer.start(),
            Command::React => match self.sequencer.react() {
                ReactOutcome::Ignored => debug!("reaction outside a trial"),
                outcome => debug!(?outcome, "reaction handled"),
            },
            Command::Quit => {
                self.cleanup_and_exit(event_loop);
                return;
            }
        }
        self.request_redraw();
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let key = match key {
            PhysicalKey::Code(KeyCode::Enter | KeyCode::NumpadEnter) => Key::Enter,
            PhysicalKey::Code(KeyCode::Space) => Key::Space,
            PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
            _ => Key::Other,
        };
        if let Some(command) = command_for_key(key) {
            self.handle_command(command, event_loop);
        }
    }

    fn handle_tap(&mut self, event_loop: &ActiveEventLoop) {
        let command = command_for_tap(self.sequencer.phase());
        self.handle_command(command, event_loop);
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize renderer");
            }
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
        self.request_redraw();
    }

    fn save_results(&self) -> Result<()> {
        let session = self.sequencer.session();
        if session.is_empty() {
            return Ok(());
        }
        let path = &self.settings.results_path;
        let file = File::create(path)
            .with_context(|| format!("cannot create results file '{}'", path.display()))?;
        session
            .write_json(BufWriter::new(file))
            .with_context(|| format!("failed to write results to '{}'", path.display()))?;

        let summary = session.summary();
        info!(
            attempts = summary.attempts,
            completed = summary.completed,
            faults = summary.faults,
            best_ms = ?summary.best_ms,
            mean_ms = ?summary.mean_ms,
            path = %path.display(),
            "results saved"
        );
        Ok(())
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            return;
        }
        if let Err(e) = self.save_results() {
            error!(error = %e, "could not save results");
        }
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = %e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!(error = %e, "render failed");
                    self.cleanup_and_exit(event_loop);
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_tap(event_loop),
            WindowEvent::Touch(touch) if touch.phase == TouchPhase::Started => {
                self.handle_tap(event_loop)
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }

        if self.sequencer.poll() {
            self.request_redraw();
        }

        let wake_at = self
            .sequencer
            .next_deadline()
            .and_then(|deadline| self.sequencer.clock().instant_at(deadline));
        match wake_at {
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
