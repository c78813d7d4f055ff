use egui::{Vec2, vec2};

#[derive(Clone)]
pub struct CanvasConfig {
    /// Circular hit radius around a terminal.
    pub terminal_radius: f32,
    /// Hover/select tolerance around a wire polyline.
    pub wire_hit_distance: f32,
    /// Hit radius of a segment midpoint drag handle.
    pub handle_radius: f32,
    /// Segments shorter than this never get a drag handle.
    pub min_drag_segment: f32,
    /// Grid the live wire cursor snaps to.
    pub grid_snap: f32,
    /// Minimum spacing between consecutive waypoints.
    pub min_waypoint_distance: f32,
    /// Corner radius used when rendering wire bends.
    pub turn_radius: f32,
    /// Per-frame easing factor for component movement.
    pub ease_factor: f32,
    /// Distance at which an eased position snaps to its target.
    pub ease_snap: f32,
    /// Circular body hit radius for LEDs.
    pub led_body_radius: f32,
    /// Battery body hit box half-extents; the box reaches further below
    /// center than above to cover the terminal posts.
    pub battery_body: Vec2,
    pub battery_body_below: f32,
    /// Half-extents of the resistor body hit box.
    pub resistor_body: Vec2,
    pub wire_thickness: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            terminal_radius: 15.0,
            wire_hit_distance: 10.0,
            handle_radius: 8.0,
            min_drag_segment: 30.0,
            grid_snap: 10.0,
            min_waypoint_distance: 10.0,
            turn_radius: 15.0,
            ease_factor: 0.2,
            ease_snap: 0.5,
            led_body_radius: 35.0,
            battery_body: vec2(35.0, 35.0),
            battery_body_below: 45.0,
            resistor_body: vec2(35.0, 20.0),
            wire_thickness: 5.0,
        }
    }
}
