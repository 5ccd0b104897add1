use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::camera::OrbitCamera;
use crate::scene::Scene;

/// Whether the demo is still behind the start screen or animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    StartScreen,
    Running,
}

/// Two-state fullscreen machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenMode {
    Windowed,
    Fullscreen,
}

impl FullscreenMode {
    pub fn is_fullscreen(self) -> bool {
        self == Self::Fullscreen
    }

    /// Label shown on the toggle control.
    pub fn label(self) -> &'static str {
        match self {
            Self::Windowed => "Fullscreen",
            Self::Fullscreen => "Exit",
        }
    }
}

/// Events the runner feeds into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The start control was activated.
    StartPressed,
    /// Fullscreen toggle requested (button or Enter key).
    FullscreenToggle,
    /// The viewport changed dimensions.
    Resized { width: u32, height: u32 },
    /// One display-refresh frame elapsed.
    FrameTick,
}

/// Side effects the runner must apply against the window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    HideStartScreen,
    EnterFullscreen,
    /// Best-effort landscape lock; runners without the capability ignore it.
    LockOrientation,
    ExitFullscreen,
    ResizeSurface { width: u32, height: u32 },
}

/// The application context: every piece of mutable demo state in one place,
/// mutated only through [`DemoState::handle`] plus direct camera input.
///
/// Handlers are plain functions of (state, event) -> effects, so the whole
/// orchestration is testable without a window.
#[derive(Debug, Clone)]
pub struct DemoState {
    pub scene: Scene,
    pub camera: OrbitCamera,
    phase: AppPhase,
    fullscreen: FullscreenMode,
    fullscreen_supported: bool,
    frames: u64,
}

impl DemoState {
    pub fn new(scene: Scene, width: u32, height: u32, fullscreen_supported: bool) -> Self {
        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        let camera = OrbitCamera::new(scene.config.camera_distance, scene.config.fov, aspect);
        Self {
            scene,
            camera,
            phase: AppPhase::StartScreen,
            fullscreen: FullscreenMode::Windowed,
            fullscreen_supported,
            frames: 0,
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    pub fn fullscreen(&self) -> FullscreenMode {
        self.fullscreen
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::StartPressed => {
                if self.phase != AppPhase::StartScreen {
                    return Vec::new();
                }
                self.phase = AppPhase::Running;
                let mut effects = vec![Effect::HideStartScreen];
                if self.fullscreen_supported {
                    effects.extend(self.toggle_fullscreen());
                }
                effects
            }
            AppEvent::FullscreenToggle => self.toggle_fullscreen(),
            AppEvent::Resized { width, height } => {
                if width == 0 || height == 0 {
                    return Vec::new();
                }
                self.camera.set_aspect(width, height);
                vec![Effect::ResizeSurface { width, height }]
            }
            AppEvent::FrameTick => {
                if self.phase == AppPhase::Running {
                    self.scene.advance_frame();
                    self.frames += 1;
                }
                Vec::new()
            }
        }
    }

    /// Enter only when the capability exists; exit only from fullscreen.
    fn toggle_fullscreen(&mut self) -> Vec<Effect> {
        match self.fullscreen {
            FullscreenMode::Windowed if self.fullscreen_supported => {
                self.fullscreen = FullscreenMode::Fullscreen;
                vec![Effect::EnterFullscreen, Effect::LockOrientation]
            }
            FullscreenMode::Windowed => Vec::new(),
            FullscreenMode::Fullscreen => {
                self.fullscreen = FullscreenMode::Windowed;
                vec![Effect::ExitFullscreen]
            }
        }
    }
}

/// Cooperative cancellation handle for [`FrameLoop`].
#[derive(Debug, Clone, Default)]
pub struct LoopToken {
    cancelled: Arc<AtomicBool>,
}

impl LoopToken {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Explicit frame loop.
///
/// Interactive runners call [`FrameLoop::tick`] once per redraw; headless
/// runs and tests drive a bounded, deterministic number of iterations.
#[derive(Debug)]
pub struct FrameLoop {
    token: LoopToken,
}

impl FrameLoop {
    pub fn new() -> (Self, LoopToken) {
        let token = LoopToken::default();
        (
            Self {
                token: token.clone(),
            },
            token,
        )
    }

    pub fn tick(&mut self, state: &mut DemoState) -> Vec<Effect> {
        state.handle(AppEvent::FrameTick)
    }

    /// Runs up to `max_frames` ticks, stopping early if cancelled. Returns
    /// the number of frames actually advanced.
    pub fn run_bounded(&mut self, state: &mut DemoState, max_frames: u64) -> u64 {
        let mut advanced = 0;
        while advanced < max_frames && !self.token.is_cancelled() {
            self.tick(state);
            advanced += 1;
        }
        advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneConfig;
    use approx::assert_relative_eq;

    fn state(fullscreen_supported: bool) -> DemoState {
        DemoState::new(
            Scene::new(SceneConfig::default()),
            1024,
            768,
            fullscreen_supported,
        )
    }

    #[test]
    fn start_hides_screen_and_enters_fullscreen_when_supported() {
        let mut demo = state(true);
        let effects = demo.handle(AppEvent::StartPressed);
        assert_eq!(
            effects,
            vec![
                Effect::HideStartScreen,
                Effect::EnterFullscreen,
                Effect::LockOrientation
            ]
        );
        assert_eq!(demo.phase(), AppPhase::Running);
        assert!(demo.fullscreen().is_fullscreen());
        // a second press is a no-op
        assert!(demo.handle(AppEvent::StartPressed).is_empty());
    }

    #[test]
    fn start_without_capability_only_hides_the_screen() {
        let mut demo = state(false);
        let effects = demo.handle(AppEvent::StartPressed);
        assert_eq!(effects, vec![Effect::HideStartScreen]);
        assert_eq!(demo.fullscreen(), FullscreenMode::Windowed);
    }

    #[test]
    fn toggle_alternates_and_labels_follow() {
        let mut demo = state(true);
        assert_eq!(demo.fullscreen().label(), "Fullscreen");

        let enter = demo.handle(AppEvent::FullscreenToggle);
        assert!(enter.contains(&Effect::EnterFullscreen));
        assert_eq!(demo.fullscreen().label(), "Exit");

        let exit = demo.handle(AppEvent::FullscreenToggle);
        assert_eq!(exit, vec![Effect::ExitFullscreen]);
        assert_eq!(demo.fullscreen().label(), "Fullscreen");
    }

    #[test]
    fn exit_is_never_requested_while_windowed() {
        let mut demo = state(false);
        for _ in 0..5 {
            let effects = demo.handle(AppEvent::FullscreenToggle);
            assert!(!effects.contains(&Effect::ExitFullscreen));
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn frames_do_not_advance_before_start() {
        let mut demo = state(true);
        for _ in 0..10 {
            demo.handle(AppEvent::FrameTick);
        }
        assert_eq!(demo.frames(), 0);
        assert_eq!(demo.scene.cube.rotation.x, 0.0);
    }

    #[test]
    fn rotation_increases_without_bound() {
        let mut demo = state(false);
        demo.handle(AppEvent::StartPressed);
        let mut previous = 0.0;
        for _ in 0..1000 {
            demo.handle(AppEvent::FrameTick);
            assert!(demo.scene.cube.rotation.x > previous);
            previous = demo.scene.cube.rotation.x;
        }
        assert_relative_eq!(demo.scene.cube.rotation.x, 10.0, epsilon = 1e-2);
    }

    #[test]
    fn scene_counts_survive_event_storms() {
        let mut demo = state(true);
        demo.handle(AppEvent::StartPressed);
        for i in 0..50u32 {
            demo.handle(AppEvent::Resized {
                width: 100 + i,
                height: 100,
            });
            demo.handle(AppEvent::FullscreenToggle);
        }
        assert_eq!(demo.scene.grids.len(), 6);
        assert_eq!(demo.scene.lights.len(), 2);
    }

    #[test]
    fn end_to_end_scenario() {
        let mut demo = state(true);
        assert_eq!(demo.camera.aspect(), 1024.0 / 768.0);

        let effects = demo.handle(AppEvent::StartPressed);
        assert!(effects.contains(&Effect::HideStartScreen));

        for _ in 0..100 {
            demo.handle(AppEvent::FrameTick);
        }
        assert_relative_eq!(demo.scene.cube.rotation.x, 1.0, epsilon = 1e-4);

        let effects = demo.handle(AppEvent::Resized {
            width: 800,
            height: 600,
        });
        assert_eq!(
            effects,
            vec![Effect::ResizeSurface {
                width: 800,
                height: 600
            }]
        );
        assert_eq!(demo.camera.aspect(), 800.0 / 600.0);
        assert_relative_eq!(demo.scene.cube.rotation.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn zero_area_resize_is_dropped() {
        let mut demo = state(false);
        let before = demo.camera.aspect();
        assert!(demo.handle(AppEvent::Resized { width: 0, height: 600 }).is_empty());
        assert!(demo.handle(AppEvent::Resized { width: 800, height: 0 }).is_empty());
        assert_eq!(demo.camera.aspect(), before);
    }

    #[test]
    fn bounded_loop_is_deterministic_and_cancellable() {
        let mut demo = state(false);
        demo.handle(AppEvent::StartPressed);

        let (mut frame_loop, token) = FrameLoop::new();
        assert_eq!(frame_loop.run_bounded(&mut demo, 100), 100);
        assert_eq!(demo.frames(), 100);

        token.cancel();
        assert_eq!(frame_loop.run_bounded(&mut demo, 100), 0);
        assert_eq!(demo.frames(), 100);
    }
}
