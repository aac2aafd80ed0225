//! Mouse input folded into one snapshot per frame.
//!
//! [`InputTracker`] is fed raw `winit` window events as they arrive and
//! hands the engine an [`InputSnapshot`] once per frame. Button edges are
//! consumed by the snapshot; held state and the cursor persist.

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

/// Press/release edges of one mouse button within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEdges {
    pub pressed: bool,
    pub released: bool,
    pub held: bool,
}

impl ButtonEdges {
    pub fn press() -> Self {
        Self {
            pressed: true,
            released: false,
            held: true,
        }
    }

    pub fn hold() -> Self {
        Self {
            pressed: false,
            released: false,
            held: true,
        }
    }

    pub fn release() -> Self {
        Self {
            pressed: false,
            released: true,
            held: false,
        }
    }

    fn apply(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed = true;
                self.held = true;
            }
            ElementState::Released => {
                self.released = true;
                self.held = false;
            }
        }
    }

    fn take(&mut self) -> ButtonEdges {
        let edges = *self;
        self.pressed = false;
        self.released = false;
        edges
    }
}

/// Everything the engine reads from the mouse for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Pixels from the top-left corner of the viewport
    pub cursor: (f32, f32),
    pub primary: ButtonEdges,
    pub secondary: ButtonEdges,
    /// Wheel lines this frame, positive away from the user
    pub scroll: f32,
}

impl InputSnapshot {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            cursor: (x, y),
            ..Default::default()
        }
    }

    pub fn with_primary(mut self, edges: ButtonEdges) -> Self {
        self.primary = edges;
        self
    }

    pub fn with_secondary(mut self, edges: ButtonEdges) -> Self {
        self.secondary = edges;
        self
    }

    pub fn with_scroll(mut self, scroll: f32) -> Self {
        self.scroll = scroll;
        self
    }
}

#[derive(Debug, Clone)]
pub struct InputTracker {
    cursor: (f32, f32),
    primary: ButtonEdges,
    secondary: ButtonEdges,
    scroll: f32,
    /// Pixels of trackpad scroll that count as one wheel line
    pub pixels_per_line: f32,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            cursor: (0.0, 0.0),
            primary: ButtonEdges::default(),
            secondary: ButtonEdges::default(),
            scroll: 0.0,
            pixels_per_line: 40.0,
        }
    }

    /// Folds a window event in. Returns whether the event was a mouse event.
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(*position);
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_mouse_input(*state, *button);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.on_mouse_wheel(delta);
                true
            }
            _ => false,
        }
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = (position.x as f32, position.y as f32);
    }

    pub fn on_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        match button {
            MouseButton::Left => self.primary.apply(state),
            MouseButton::Right => self.secondary.apply(state),
            _ => {}
        }
    }

    pub fn on_mouse_wheel(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, lines) => *lines,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / self.pixels_per_line,
        };
    }

    /// Input for this frame. Clears button edges and scroll.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let scroll = std::mem::take(&mut self.scroll);
        InputSnapshot {
            cursor: self.cursor,
            primary: self.primary.take(),
            secondary: self.secondary.take(),
            scroll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_consumed() {
        let mut tracker = InputTracker::new();
        tracker.on_cursor_moved(PhysicalPosition::new(100.0, 50.0));
        tracker.on_mouse_input(ElementState::Pressed, MouseButton::Left);

        let first = tracker.snapshot();
        assert_eq!(first.cursor, (100.0, 50.0));
        assert_eq!(first.primary, ButtonEdges::press());

        let second = tracker.snapshot();
        assert_eq!(second.primary, ButtonEdges::hold());
        assert_eq!(second.cursor, (100.0, 50.0));

        tracker.on_mouse_input(ElementState::Released, MouseButton::Left);
        assert_eq!(tracker.snapshot().primary, ButtonEdges::release());
    }

    #[test]
    fn test_click_within_one_frame_keeps_both_edges() {
        let mut tracker = InputTracker::new();
        tracker.on_mouse_input(ElementState::Pressed, MouseButton::Right);
        tracker.on_mouse_input(ElementState::Released, MouseButton::Right);
        let secondary = tracker.snapshot().secondary;
        assert!(secondary.pressed && secondary.released && !secondary.held);
        assert_eq!(tracker.snapshot().primary, ButtonEdges::default());
    }

    #[test]
    fn test_scroll_accumulates_in_lines() {
        let mut tracker = InputTracker::new();
        tracker.on_mouse_wheel(&MouseScrollDelta::LineDelta(0.0, 1.0));
        tracker.on_mouse_wheel(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -80.0)));
        assert_eq!(tracker.snapshot().scroll, -1.0);
        assert_eq!(tracker.snapshot().scroll, 0.0);
    }

    #[test]
    fn test_other_buttons_ignored() {
        let mut tracker = InputTracker::new();
        tracker.on_mouse_input(ElementState::Pressed, MouseButton::Middle);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.primary, ButtonEdges::default());
        assert_eq!(snapshot.secondary, ButtonEdges::default());
    }
}
