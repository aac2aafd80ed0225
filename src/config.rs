//! Engine tuning parameters
//!
//! Everything the frame loop needs to know that is not part of the scene
//! itself: snap radius, pointer resting depth, which optional behaviours
//! are switched on, and the pointer colours for each interaction state.

/// RGBA colours the pointer shows in each [`ColorState`](crate::pointer::ColorState)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPalette {
    pub default: [f32; 4],
    pub hover: [f32; 4],
    pub dragging: [f32; 4],
    pub snapped: [f32; 4],
}

impl Default for PointerPalette {
    fn default() -> Self {
        Self {
            default: [0.0, 0.0, 0.0, 0.3],
            hover: [0.89, 0.82, 0.02, 0.58],
            dragging: [0.88, 0.38, 0.0, 0.62],
            snapped: [0.93, 0.22, 0.0, 0.8],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Snap radius in screen pixels
    pub snap_distance: f32,
    /// Screen depth the pointer rests at when the ray hits nothing
    pub default_pointer_depth: f32,
    /// Generate a snap point at every mesh vertex while dragging
    pub vertex_snaps: bool,
    /// Keep raycasting while an object is being dragged
    pub ray_while_dragging: bool,
    /// Secondary release authors a snap point during a drag as well
    pub author_snaps_while_dragging: bool,
    /// Hide the object library once an object leaves it
    pub hide_library_on_drag: bool,
    /// Max distance between two snap points that still counts as connected
    pub coincidence_tolerance: f32,
    /// Upper bound on the connected set a single drag may carry
    pub max_connected_objects: usize,
    pub palette: PointerPalette,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_distance: 5.0,
            default_pointer_depth: 5.0,
            vertex_snaps: false,
            ray_while_dragging: true,
            author_snaps_while_dragging: false,
            hide_library_on_drag: true,
            coincidence_tolerance: 1e-4,
            max_connected_objects: 4096,
            palette: PointerPalette::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_snap_distance(mut self, pixels: f32) -> Self {
        self.snap_distance = pixels.max(0.0);
        self
    }

    pub fn with_default_pointer_depth(mut self, depth: f32) -> Self {
        self.default_pointer_depth = depth;
        self
    }

    pub fn with_vertex_snaps(mut self, enabled: bool) -> Self {
        self.vertex_snaps = enabled;
        self
    }

    pub fn with_ray_while_dragging(mut self, enabled: bool) -> Self {
        self.ray_while_dragging = enabled;
        self
    }

    pub fn with_author_snaps_while_dragging(mut self, enabled: bool) -> Self {
        self.author_snaps_while_dragging = enabled;
        self
    }

    pub fn with_hide_library_on_drag(mut self, enabled: bool) -> Self {
        self.hide_library_on_drag = enabled;
        self
    }

    pub fn with_coincidence_tolerance(mut self, tolerance: f32) -> Self {
        self.coincidence_tolerance = tolerance.abs();
        self
    }

    pub fn with_max_connected_objects(mut self, max: usize) -> Self {
        self.max_connected_objects = max.max(1);
        self
    }

    pub fn with_palette(mut self, palette: PointerPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Squared snap radius, compared against squared pixel distances
    pub fn snap_distance_squared(&self) -> f32 {
        self.snap_distance * self.snap_distance
    }
}
