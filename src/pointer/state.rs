use cgmath::{One, Quaternion, Rotation, Vector3, Zero};

use crate::config::PointerPalette;

/// What the pointer is currently doing, as shown by its colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorState {
    #[default]
    Default,
    Hover,
    Dragging,
    Snapped,
}

/// Pose and interaction flags of the 3D pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub(crate) position: Vector3<f32>,
    pub(crate) orientation: Quaternion<f32>,
    pub(crate) depth: f32,
    pub(crate) is_dragging: bool,
    pub(crate) is_flipped: bool,
    pub(crate) is_snapped: bool,
    pub(crate) color_state: ColorState,
}

impl PointerState {
    pub fn new(depth: f32) -> Self {
        Self {
            position: Vector3::zero(),
            orientation: Quaternion::one(),
            depth,
            is_dragging: false,
            is_flipped: false,
            is_snapped: false,
            color_state: ColorState::Default,
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn orientation(&self) -> Quaternion<f32> {
        self.orientation
    }

    /// Screen depth the pointer sits at
    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    pub fn is_snapped(&self) -> bool {
        self.is_snapped
    }

    pub fn color_state(&self) -> ColorState {
        self.color_state
    }

    /// World-space up axis (local +Y).
    pub fn up(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(Vector3::unit_y())
    }

    /// World-space forward axis (local +Z).
    pub fn forward(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(Vector3::unit_z())
    }

    pub fn color(&self, palette: &PointerPalette) -> [f32; 4] {
        match self.color_state {
            ColorState::Default => palette.default,
            ColorState::Hover => palette.hover,
            ColorState::Dragging => palette.dragging,
            ColorState::Snapped => palette.snapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_follows_state() {
        let palette = PointerPalette::default();
        let mut state = PointerState::new(5.0);
        assert_eq!(state.color(&palette), [0.0, 0.0, 0.0, 0.3]);
        state.color_state = ColorState::Snapped;
        assert_eq!(state.color(&palette), palette.snapped);
    }

    #[test]
    fn test_identity_axes() {
        let state = PointerState::new(5.0);
        assert_eq!(state.up(), Vector3::unit_y());
        assert_eq!(state.forward(), Vector3::unit_z());
    }
}
