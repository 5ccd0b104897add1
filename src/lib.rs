//! A small wgpu demo: a textured cube spinning inside a grid-walled room.
//!
//! The crate separates the pure orchestration (scene, camera, app state
//! machine, frame loop) from the platform glue so that every observable
//! behavior — resize handling, the fullscreen toggle, frame-by-frame
//! rotation — can be tested without a window or a GPU.

pub mod app;
pub mod camera;
pub mod geometry;
pub mod input;
pub mod render;
pub mod scene;
pub mod stats;
pub mod viewport;

pub use app::{AppEvent, AppPhase, DemoState, Effect, FrameLoop, FullscreenMode, LoopToken};
pub use camera::OrbitCamera;
pub use input::InputState;
pub use render::Renderer;
pub use scene::{Cube, GridPanel, Light, Scene, SceneConfig};
pub use stats::FrameStats;
pub use viewport::{StaticViewport, ViewportProvider, WindowViewport};
