use glam::Vec2;
use parking_lot::RwLock;

#[derive(Debug, Default, Clone, Copy)]
struct PointerState {
    position: Vec2,
    dragging: bool,
}

/// Pointer snapshot feeding the orbit camera.
///
/// Interior mutability keeps the handlers `&self`, matching how the event
/// loop shares it between window callbacks.
#[derive(Debug, Default)]
pub struct InputState {
    pointer: RwLock<PointerState>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dragging(&self, active: bool) {
        self.pointer.write().dragging = active;
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.read().dragging
    }

    /// Records a pointer move. While a drag is active, returns the delta
    /// since the previous position.
    pub fn pointer_moved(&self, position: Vec2) -> Option<Vec2> {
        let mut pointer = self.pointer.write();
        let delta = position - pointer.position;
        pointer.position = position;
        pointer.dragging.then_some(delta)
    }
}
