use std::any::Any;
use std::cell::RefCell;
use std::env;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{debug, info};
use pollster::block_on;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window};

use cube_room::{
    AppEvent, AppPhase, DemoState, Effect, FrameLoop, FrameStats, InputState, Renderer, Scene,
    SceneConfig, StaticViewport, ViewportProvider, WindowViewport,
};

const TITLE: &str = "cube-room";
/// Pixels-to-radians factor for orbit dragging.
const ORBIT_SENSITIVITY: f32 = 0.005;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let config = match &options.scene {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene file {path}"))?;
            SceneConfig::from_xml(&xml).with_context(|| format!("failed to parse {path}"))?
        }
        None => SceneConfig::default(),
    };
    let scene = Scene::new(config);
    println!("{}", scene.summary());

    if options.summary_only {
        return run_headless(scene, &options);
    }

    let fallback_scene = scene.clone();
    match run_interactive(scene, &options) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                run_headless(fallback_scene, &options)
            } else {
                Err(err)
            }
        }
    }
}

/// Prints the scene contents and, when asked, advances a bounded number of
/// frames deterministically.
fn run_headless(scene: Scene, options: &CliOptions) -> Result<()> {
    let viewport = StaticViewport::new(options.width, options.height);
    let (width, height) = viewport.viewport_size();
    let mut state = DemoState::new(scene, width, height, false);
    println!("Camera aspect {:.4}", state.camera.aspect());

    state.handle(AppEvent::StartPressed);
    let (mut frame_loop, _token) = FrameLoop::new();
    let advanced = frame_loop.run_bounded(&mut state, options.frames);
    println!("Advanced {advanced} frame(s)");
    println!(
        "Final cube rotation=({:.2}, {:.2})",
        state.scene.cube.rotation.x, state.scene.cube.rotation.y
    );
    Ok(())
}

fn run_interactive(scene: Scene, options: &CliOptions) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop: EventLoop<()> = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(format!("{TITLE} — click to start (Enter toggles fullscreen)"))
                    .with_inner_size(LogicalSize::new(
                        options.width as f64,
                        options.height as f64,
                    )),
            )
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window), &scene))?;
    let size = window.inner_size();
    let fullscreen_supported = window.current_monitor().is_some();
    if !fullscreen_supported {
        info!("no monitor reported; fullscreen toggle disabled");
    }
    let viewport = Arc::new(WindowViewport::new(size.width, size.height));
    let state = DemoState::new(scene, size.width, size.height, fullscreen_supported);

    let (frame_loop, loop_token) = FrameLoop::new();
    let mut app = App {
        renderer,
        state,
        frame_loop,
        loop_token,
        input: InputState::new(),
        stats: FrameStats::new(),
        viewport,
    };

    let failure: Rc<RefCell<Option<anyhow::Error>>> = Rc::new(RefCell::new(None));
    let failure_slot = Rc::clone(&failure);
    #[allow(deprecated)]
    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        if let Err(err) = app.process_event(&event, elwt) {
            *failure_slot.borrow_mut() = Some(err);
            elwt.exit();
        }
    })?;

    if let Some(err) = failure.borrow_mut().take() {
        return Err(err);
    }
    Ok(())
}

struct App {
    renderer: Renderer,
    state: DemoState,
    frame_loop: FrameLoop,
    loop_token: cube_room::LoopToken,
    input: InputState,
    stats: FrameStats,
    viewport: Arc<WindowViewport>,
}

impl App {
    fn process_event(&mut self, event: &Event<()>, elwt: &ActiveEventLoop) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        self.loop_token.cancel();
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.viewport.update(size.width, size.height);
                        debug!(
                            "viewport {}x{} (aspect {:.4})",
                            size.width,
                            size.height,
                            self.viewport.aspect()
                        );
                        let effects = self.state.handle(AppEvent::Resized {
                            width: size.width,
                            height: size.height,
                        });
                        self.apply_effects(effects);
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = self.renderer.window().inner_size();
                        self.viewport.update(size.width, size.height);
                        let effects = self.state.handle(AppEvent::Resized {
                            width: size.width,
                            height: size.height,
                        });
                        self.apply_effects(effects);
                    }
                    WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(event),
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button)
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let pos = Vec2::new(position.x as f32, position.y as f32);
                        if let Some(delta) = self.input.pointer_moved(pos) {
                            self.state.camera.orbit(delta * ORBIT_SENSITIVITY);
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 50.0,
                        };
                        self.state.camera.dolly(scroll);
                    }
                    WindowEvent::RedrawRequested => self.redraw()?,
                    _ => {}
                }
            }
            Event::AboutToWait => {
                // schedules the next frame, mirroring a self-resubmitting
                // animation callback
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let effects = self.frame_loop.tick(&mut self.state);
        self.apply_effects(effects);

        let result = match self.state.phase() {
            AppPhase::StartScreen => self.renderer.render_splash(),
            AppPhase::Running => {
                let view_proj = self.state.camera.view_proj();
                let position = self.state.camera.position();
                self.renderer
                    .update_globals(view_proj, position, &self.state.scene);
                self.renderer.render(&self.state.scene)
            }
        };

        if let Err(err) = result {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
                wgpu::SurfaceError::Other => {
                    info!("Surface reported an unknown error; retrying next frame");
                }
            }
        }

        if self.state.phase() == AppPhase::Running {
            if self.stats.frame_completed().is_some() {
                self.refresh_title();
            }
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, event: &KeyEvent) {
        let is_enter = matches!(
            event.physical_key,
            PhysicalKey::Code(KeyCode::Enter) | PhysicalKey::Code(KeyCode::NumpadEnter)
        );
        if !is_enter || event.repeat || event.state != ElementState::Pressed {
            return;
        }
        let effects = self.state.handle(AppEvent::FullscreenToggle);
        self.apply_effects(effects);
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if self.state.phase() == AppPhase::StartScreen {
                    let effects = self.state.handle(AppEvent::StartPressed);
                    self.apply_effects(effects);
                } else {
                    self.input.set_dragging(true);
                }
            }
            ElementState::Released => self.input.set_dragging(false),
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::HideStartScreen => {
                    info!("start screen dismissed; frame loop running");
                    self.refresh_title();
                }
                Effect::EnterFullscreen => {
                    self.renderer
                        .window()
                        .set_fullscreen(Some(Fullscreen::Borderless(None)));
                    self.refresh_title();
                }
                Effect::ExitFullscreen => {
                    // only ever leave fullscreen the window actually reports
                    if self.renderer.window().fullscreen().is_some() {
                        self.renderer.window().set_fullscreen(None);
                    }
                    self.refresh_title();
                }
                Effect::LockOrientation => {
                    debug!("orientation lock not available on this platform; ignored");
                }
                Effect::ResizeSurface { width, height } => {
                    self.renderer.resize(PhysicalSize::new(width, height));
                }
            }
        }
    }

    fn refresh_title(&self) {
        let title = match self.state.phase() {
            AppPhase::StartScreen => {
                format!("{TITLE} — click to start (Enter toggles fullscreen)")
            }
            AppPhase::Running => format!(
                "{TITLE} — {} — Enter: {}",
                self.stats.overlay(),
                self.state.fullscreen().label()
            ),
        };
        self.renderer.window().set_title(&title);
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct CliOptions {
    scene: Option<String>,
    summary_only: bool,
    frames: u64,
    width: u32,
    height: u32,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut options = Self {
            scene: None,
            summary_only: false,
            frames: 0,
            width: 1024,
            height: 768,
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--frames" => {
                    options.frames = parse_value(&mut args, "--frames")?;
                }
                "--width" => {
                    options.width = parse_value(&mut args, "--width")?;
                }
                "--height" => {
                    options.height = parse_value(&mut args, "--height")?;
                }
                "--help" | "-h" => {
                    return Err(anyhow!(
                        "Usage: cube-room [scene.xml] [--summary-only] [--frames N] [--width N] [--height N]"
                    ));
                }
                other if other.starts_with('-') => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --summary-only, --frames, --width or --height"
                    ));
                }
                path => {
                    if options.scene.is_some() {
                        return Err(anyhow!("only one scene file may be given"));
                    }
                    options.scene = Some(path.to_string());
                }
            }
        }
        if options.width == 0 || options.height == 0 {
            return Err(anyhow!("window dimensions must be positive"));
        }
        Ok(options)
    }
}

fn parse_value<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T>
where
    T::Err: fmt::Display,
{
    let value = args
        .next()
        .ok_or_else(|| anyhow!("{flag} expects a value"))?;
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid value for {flag}: {err}"))
}
