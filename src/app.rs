use egui::{
    Align2, Color32, CornerRadius, CursorIcon, FontId, Key, Pos2, Rect, Shape, Stroke, StrokeKind,
    Vec2, pos2, vec2,
};

use crate::config::CanvasConfig;
use crate::db::{Circuit, ComponentId, ComponentKind, Terminal, WireId};
use crate::interaction::{Drag, Hover, Selected, WireDraw};
use crate::nets::NetMap;
use crate::power::PowerMap;
use crate::wire::{Axis, DEFAULT_WIRE_COLOR, Wire, orthogonal_point, rounded_path};

const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(0x12, 0x16, 0x21);
const GRID_DOT_COLOR: Color32 = Color32::from_gray(0x2e);
const GRID_SPACING: f32 = 30.0;
const SELECTION_COLOR: Color32 = Color32::from_rgb(0x4f, 0xa3, 0xff);
const GHOST_COLOR: Color32 = Color32::from_rgb(0x8a, 0x96, 0xa8);
const HANDLE_FILL: Color32 = Color32::from_gray(0xf0);
const HANDLE_STROKE: Color32 = Color32::from_gray(0x40);
const BATTERY_BODY_COLOR: Color32 = Color32::from_rgb(0x2b, 0x33, 0x42);
const RESISTOR_BODY_COLOR: Color32 = Color32::from_rgb(0xd2, 0xa9, 0x6a);
const RESISTOR_BAND_COLOR: Color32 = Color32::from_rgb(0x5a, 0x40, 0x1e);
const TEXT_COLOR: Color32 = Color32::from_gray(0xd8);
const TOOLTIP_BACKGROUND: Color32 = Color32::from_rgba_premultiplied(0x20, 0x26, 0x30, 0xe0);
const LED_BODY_RADIUS: f32 = 18.0;
const PULSE_SPEED: f32 = 4.0;

pub const LED_COLORS: [Color32; 5] = [
    Color32::from_rgb(0xff, 0x47, 0x57), // red
    Color32::from_rgb(0x2e, 0xd5, 0x73), // green
    Color32::from_rgb(0x3d, 0x9b, 0xff), // blue
    Color32::from_rgb(0xff, 0xd1, 0x3d), // yellow
    Color32::from_rgb(0xf2, 0xf2, 0xf2), // white
];

pub const WIRE_COLORS: [Color32; 5] = [
    Color32::from_rgb(0x2e, 0xd5, 0x73),
    Color32::from_rgb(0xff, 0x47, 0x57),
    Color32::from_rgb(0x3d, 0x9b, 0xff),
    Color32::from_rgb(0xff, 0xd1, 0x3d),
    Color32::from_rgb(0xc0, 0xc8, 0xd4),
];

const VOLTAGE_PRESETS: [f32; 3] = [1.5, 3.0, 9.0];

fn lighten(color: Color32, amount: u8) -> Color32 {
    Color32::from_rgb(
        color.r().saturating_add(amount),
        color.g().saturating_add(amount),
        color.b().saturating_add(amount),
    )
}

pub struct App {
    pub config: CanvasConfig,
    pub circuit: Circuit,
    pub nets: NetMap,
    pub power: PowerMap,
    /// Set by every structural mutation; the frame loop rebuilds nets and
    /// power before painting.
    pub nets_dirty: bool,
    pub needs_render: bool,
    pub hovered: Option<Hover>,
    pub selected: Option<Selected>,
    pub drag: Option<Drag>,
    pub wire_draw: WireDraw,
    /// Color applied to newly drawn wires.
    pub wire_color: Color32,
    /// Phase of the powered-LED glow animation.
    pub pulse: f32,
    pub viewport_offset: Vec2,
    pub show_debug: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            config: CanvasConfig::default(),
            circuit: Circuit::default(),
            nets: NetMap::default(),
            power: PowerMap::default(),
            nets_dirty: true,
            needs_render: true,
            hovered: None,
            selected: None,
            drag: None,
            wire_draw: WireDraw::Idle,
            wire_color: DEFAULT_WIRE_COLOR,
            pulse: 0.0,
            viewport_offset: Vec2::ZERO,
            show_debug: false,
        }
    }
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Mutation API. Everything here is UI-free so the editor can be driven
    // from tests.

    pub fn add_component(&mut self, kind: ComponentKind, pos: Pos2) -> ComponentId {
        let id = match kind {
            ComponentKind::Led => self.circuit.add_led(pos),
            ComponentKind::Battery => self.circuit.add_battery(pos),
            ComponentKind::Resistor => self.circuit.add_resistor(pos),
        };
        log::info!("added {:?}", self.circuit.label(id));
        self.selected = Some(Selected::Component(id));
        self.nets_dirty = true;
        self.needs_render = true;
        id
    }

    pub fn delete_selected(&mut self) {
        match self.selected.take() {
            Some(Selected::Component(id)) => {
                log::info!("deleting {:?}", self.circuit.label(id));
                self.circuit.remove_component(id);
            }
            Some(Selected::Wire(id)) => {
                log::info!("deleting wire");
                self.circuit.remove_wire(id);
            }
            None => return,
        }
        self.hovered = None;
        self.nets_dirty = true;
        self.needs_render = true;
    }

    pub fn clear_all(&mut self) {
        log::info!("clearing circuit");
        self.circuit.clear();
        self.selected = None;
        self.hovered = None;
        self.drag = None;
        self.wire_draw = WireDraw::Idle;
        self.nets_dirty = true;
        self.needs_render = true;
    }

    /// Directly wires two terminals with a default L route. No-op when
    /// either terminal is stale.
    pub fn connect_terminals(&mut self, a: Terminal, b: Terminal) -> Option<WireId> {
        let from = self.circuit.terminal_position(a)?;
        let to = self.circuit.terminal_position(b)?;
        let id = self
            .circuit
            .add_wire(Wire::between(a, b, from, to, self.wire_color));
        self.nets_dirty = true;
        self.needs_render = true;
        Some(id)
    }

    /// Recolors the selected LED or wire; with nothing selected, sets the
    /// color used for new wires.
    pub fn set_color(&mut self, color: Color32) {
        match self.selected {
            Some(Selected::Component(id)) => {
                if let Some(led) = self.circuit.get_led_mut(id) {
                    led.color = color;
                    self.needs_render = true;
                }
            }
            Some(Selected::Wire(id)) => {
                if let Some(wire) = self.circuit.wires.get_mut(id) {
                    wire.color = color;
                    self.needs_render = true;
                }
            }
            None => self.wire_color = color,
        }
    }

    /// Voltage is a label on the battery; it never affects power.
    pub fn set_battery_voltage(&mut self, volts: f32) {
        if let Some(Selected::Component(id)) = self.selected
            && let Some(battery) = self.circuit.get_battery_mut(id)
        {
            battery.voltage = volts;
            self.needs_render = true;
        }
    }

    pub fn begin_wire(&mut self, terminal: Terminal) {
        if self.wire_draw.is_drawing() {
            return;
        }
        let Some(pos) = self.circuit.terminal_position(terminal) else {
            return;
        };
        log::info!("wire draw started at {terminal:?}");
        self.wire_draw = WireDraw::Drawing {
            source: terminal,
            points: vec![pos],
            cursor: pos,
        };
        self.selected = None;
        self.needs_render = true;
    }

    /// Drops a bend toward `point`, grid-snapped and orthogonal to the last
    /// committed waypoint. Too-close clicks are ignored.
    pub fn extend_wire(&mut self, point: Pos2) {
        let snap = self.config.grid_snap;
        let min_dist = self.config.min_waypoint_distance;
        let WireDraw::Drawing { points, .. } = &mut self.wire_draw else {
            return;
        };
        let Some(&last) = points.last() else {
            return;
        };
        let snapped = pos2((point.x / snap).round() * snap, (point.y / snap).round() * snap);
        let corner = orthogonal_point(last, snapped);
        if (corner - last).length() > min_dist {
            points.push(corner);
            self.needs_render = true;
        }
    }

    /// Finishes the live wire at `target` and inserts it into the store.
    /// A stale target leaves the draw in progress.
    pub fn complete_wire(&mut self, target: Terminal) {
        if !self.wire_draw.is_drawing() {
            return;
        }
        let Some(to) = self.circuit.terminal_position(target) else {
            return;
        };
        let WireDraw::Drawing { source, mut points, .. } = std::mem::take(&mut self.wire_draw)
        else {
            return;
        };
        if let Some(&last) = points.last() {
            let corner = orthogonal_point(last, to);
            if corner != last && corner != to {
                points.push(corner);
            }
        }
        points.push(to);
        log::info!("wire completed: {source:?} -> {target:?}");
        self.circuit.add_wire(Wire {
            a: Some(source),
            b: Some(target),
            points,
            color: self.wire_color,
        });
        self.nets_dirty = true;
        self.needs_render = true;
    }

    pub fn cancel_wire(&mut self) {
        if self.wire_draw.is_drawing() {
            log::info!("wire draw cancelled");
            self.wire_draw = WireDraw::Idle;
            self.needs_render = true;
        }
    }

    /// Prepares a segment for dragging; returns the segment index to drag,
    /// adjusted for any bend materialization.
    pub fn begin_segment_drag(&mut self, wire: WireId, segment: usize) -> Option<usize> {
        let w = self.circuit.wires.get_mut(wire)?;
        if !w.segment_draggable(segment, &self.config) {
            return None;
        }
        let adjusted = w.materialize_bend(segment);
        self.needs_render = true;
        Some(adjusted)
    }

    pub fn drag_segment(&mut self, wire: WireId, segment: usize, delta: Vec2) {
        if let Some(w) = self.circuit.wires.get_mut(wire) {
            w.drag_segment(segment, delta);
            self.needs_render = true;
        }
    }

    /// Advances the glow phase while any LED is lit, wrapped so the phase
    /// never loses float precision over long sessions.
    fn advance_pulse(&mut self, dt: f32) {
        if self.power.any_powered() {
            self.pulse = (self.pulse + dt * PULSE_SPEED) % std::f32::consts::TAU;
        }
    }

    /// Rebuilds nets and power if a mutation dirtied them. Runs after all of
    /// a frame's input and before its paint, so a frame never draws stale
    /// power.
    pub fn refresh_topology(&mut self) {
        if self.nets_dirty {
            self.nets = NetMap::compute(&self.circuit);
            self.power = PowerMap::evaluate(&self.circuit, &self.nets);
            self.nets_dirty = false;
            self.needs_render = true;
        }
    }

    // ------------------------------------------------------------------
    // Frame handling.

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (delete, escape, enter) = ctx.input(|i| {
            (
                i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace),
                i.key_pressed(Key::Escape),
                i.key_pressed(Key::Enter),
            )
        });
        if delete {
            self.delete_selected();
        }
        if escape {
            self.handle_escape();
        }
        if enter {
            self.handle_enter();
        }
    }

    fn spawn_position(&self) -> Pos2 {
        let n = self.circuit.kinds.len() as f32;
        self.viewport_offset.to_pos2() + vec2(280.0 + (n % 5.0) * 50.0, 220.0 + (n % 3.0) * 60.0)
    }

    fn cursor_icon(&self) -> CursorIcon {
        if self.wire_draw.is_drawing() {
            return CursorIcon::Crosshair;
        }
        match (self.drag, self.hovered) {
            (Some(Drag::Component { .. }), _) => CursorIcon::Grabbing,
            (Some(Drag::Segment { wire, segment, .. }), _) => self.segment_cursor(wire, segment),
            (None, Some(Hover::Handle { wire, segment })) => self.segment_cursor(wire, segment),
            (None, Some(Hover::Terminal(_))) => CursorIcon::Crosshair,
            (None, Some(Hover::Component(_))) => CursorIcon::Grab,
            (None, Some(Hover::Wire(_))) => CursorIcon::PointingHand,
            (None, None) => CursorIcon::Default,
        }
    }

    fn segment_cursor(&self, wire: WireId, segment: usize) -> CursorIcon {
        match self.circuit.wires.get(wire) {
            Some(w) if segment + 1 < w.points.len() => match w.drag_axis(segment) {
                Axis::Y => CursorIcon::ResizeVertical,
                Axis::X => CursorIcon::ResizeHorizontal,
            },
            _ => CursorIcon::Default,
        }
    }

    // ------------------------------------------------------------------
    // Painting.

    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        // World -> screen is a pure translation.
        let origin = rect.min.to_vec2() - self.viewport_offset;

        let (primary_pressed, primary_released, secondary_pressed, pointer) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.secondary_pressed(),
                i.pointer.interact_pos(),
            )
        });

        if secondary_pressed && self.wire_draw.is_drawing() {
            self.cancel_wire();
        }
        if !self.wire_draw.is_drawing()
            && response.dragged_by(egui::PointerButton::Secondary)
        {
            self.viewport_offset -= response.drag_delta();
            self.needs_render = true;
        }

        if let Some(screen) = pointer.or_else(|| response.hover_pos()) {
            self.handle_pointer_move(screen - origin);
        }
        if primary_pressed {
            match pointer {
                Some(screen) if rect.contains(screen) => {
                    self.handle_pointer_down(screen - origin);
                }
                // A press outside the canvas discards a live wire.
                _ => self.cancel_wire(),
            }
        }
        if primary_released {
            self.handle_pointer_up();
        }
        // Keys and panel buttons ran earlier in the frame; together with the
        // pointer dispatch above, all of this frame's mutations are in. Settle
        // the topology before anything is painted.
        self.refresh_topology();
        ui.ctx().set_cursor_icon(self.cursor_icon());

        painter.rect_filled(rect, CornerRadius::ZERO, CANVAS_BACKGROUND);
        self.draw_grid(&painter, rect);
        for (id, wire) in &self.circuit.wires {
            self.draw_wire(&painter, origin, id, wire);
        }
        self.draw_handles(&painter, origin);
        self.draw_ghost_wire(&painter, origin);
        self.draw_components(&painter, origin);
        self.draw_hover_label(&painter, origin);
    }

    fn draw_grid(&self, painter: &egui::Painter, rect: Rect) {
        let first_x = (self.viewport_offset.x / GRID_SPACING).floor() * GRID_SPACING;
        let first_y = (self.viewport_offset.y / GRID_SPACING).floor() * GRID_SPACING;
        let cols = (rect.width() / GRID_SPACING) as i32 + 2;
        let rows = (rect.height() / GRID_SPACING) as i32 + 2;
        for row in 0..rows {
            for col in 0..cols {
                let world = pos2(
                    first_x + col as f32 * GRID_SPACING,
                    first_y + row as f32 * GRID_SPACING,
                );
                let screen = world + (rect.min.to_vec2() - self.viewport_offset);
                painter.circle_filled(screen, 1.5, GRID_DOT_COLOR);
            }
        }
    }

    fn draw_wire(&self, painter: &egui::Painter, origin: Vec2, id: WireId, wire: &Wire) {
        let path: Vec<Pos2> = rounded_path(&wire.points, self.config.turn_radius)
            .iter()
            .map(|p| *p + origin)
            .collect();
        if path.len() < 2 {
            return;
        }
        let is_selected = self.selected == Some(Selected::Wire(id));
        let is_hovered = matches!(
            self.hovered,
            Some(Hover::Wire(h) | Hover::Handle { wire: h, .. }) if h == id
        );
        if is_selected {
            painter.add(Shape::line(
                path.clone(),
                Stroke::new(
                    self.config.wire_thickness + 4.0,
                    SELECTION_COLOR.gamma_multiply(0.35),
                ),
            ));
        }
        let color = if is_hovered && !is_selected {
            lighten(wire.color, 40)
        } else {
            wire.color
        };
        painter.add(Shape::line(
            path,
            Stroke::new(self.config.wire_thickness, color),
        ));
    }

    /// Midpoint handles on the selected or hovered wire's draggable segments.
    fn draw_handles(&self, painter: &egui::Painter, origin: Vec2) {
        let shown = match (self.selected, self.hovered, self.drag) {
            (_, _, Some(Drag::Segment { wire, .. })) => Some(wire),
            (Some(Selected::Wire(id)), _, _) => Some(id),
            (_, Some(Hover::Wire(id) | Hover::Handle { wire: id, .. }), _) => Some(id),
            _ => None,
        };
        let Some(id) = shown else {
            return;
        };
        let Some(wire) = self.circuit.wires.get(id) else {
            return;
        };
        for segment in wire.draggable_segments(&self.config) {
            let Some(mid) = wire.segment_midpoint(segment) else {
                continue;
            };
            let active = self.hovered == Some(Hover::Handle { wire: id, segment });
            let radius = if active { 6.0 } else { 4.5 };
            painter.circle_filled(mid + origin, radius, HANDLE_FILL);
            painter.circle_stroke(mid + origin, radius, Stroke::new(1.5, HANDLE_STROKE));
        }
    }

    fn draw_ghost_wire(&self, painter: &egui::Painter, origin: Vec2) {
        let WireDraw::Drawing { points, cursor, .. } = &self.wire_draw else {
            return;
        };
        let mut path: Vec<Pos2> = points.iter().map(|p| *p + origin).collect();
        if let Some(&last) = points.last() {
            let corner = orthogonal_point(last, *cursor);
            if corner != last && corner != *cursor {
                path.push(corner + origin);
            }
            path.push(*cursor + origin);
        }
        if path.len() >= 2 {
            painter.extend(Shape::dashed_line(
                &path,
                Stroke::new(2.0, GHOST_COLOR),
                8.0,
                6.0,
            ));
        }
        for p in points {
            painter.circle_filled(*p + origin, 3.0, GHOST_COLOR);
        }
        painter.circle_stroke(*cursor + origin, 4.0, Stroke::new(1.5, GHOST_COLOR));
    }

    fn draw_components(&self, painter: &egui::Painter, origin: Vec2) {
        for (id, battery) in &self.circuit.batteries {
            self.draw_battery(painter, origin, id, battery.pos, battery.voltage);
        }
        for (id, resistor) in &self.circuit.resistors {
            self.draw_resistor(painter, origin, id, resistor.pos);
        }
        for (id, led) in &self.circuit.leds {
            self.draw_led(painter, origin, id, led.pos, led.color);
        }
    }

    fn draw_terminals(&self, painter: &egui::Painter, origin: Vec2, id: ComponentId) {
        for terminal in self.circuit.terminals_of(id) {
            let Some(world) = self.circuit.terminal_position(terminal) else {
                continue;
            };
            let screen = world + origin;
            let hovered = self.hovered == Some(Hover::Terminal(terminal))
                || self.wire_draw.is_drawing();
            let radius = if hovered { 6.0 } else { 4.0 };
            painter.circle_filled(screen, radius, Color32::from_gray(0x1a));
            let stroke_color = if hovered { SELECTION_COLOR } else { Color32::from_gray(0x7a) };
            painter.circle_stroke(screen, radius, Stroke::new(1.5, stroke_color));
            if hovered {
                painter.text(
                    screen + vec2(0.0, 14.0),
                    Align2::CENTER_CENTER,
                    terminal.pin.short_label(),
                    FontId::proportional(11.0),
                    TEXT_COLOR,
                );
            }
        }
    }

    fn draw_selection_ring(&self, painter: &egui::Painter, center: Pos2, half: Vec2) {
        painter.rect_stroke(
            Rect::from_center_size(center, half * 2.0),
            CornerRadius::same(8),
            Stroke::new(1.5, SELECTION_COLOR),
            StrokeKind::Outside,
        );
    }

    fn draw_led(
        &self,
        painter: &egui::Painter,
        origin: Vec2,
        id: ComponentId,
        pos: Pos2,
        color: Color32,
    ) {
        let center = pos + origin;
        let lit = self.power.is_powered(id);

        // Legs down to the terminals.
        for terminal in self.circuit.terminals_of(id) {
            if let Some(world) = self.circuit.terminal_position(terminal) {
                painter.line_segment(
                    [center + vec2(terminal.pin.offset().x * 0.6, LED_BODY_RADIUS * 0.7), world + origin],
                    Stroke::new(2.0, Color32::from_gray(0x8a)),
                );
            }
        }

        if lit {
            let glow = 0.5 + 0.5 * self.pulse.sin();
            for ring in 1..=3 {
                let alpha = (glow * 60.0 / ring as f32) as u8;
                painter.circle_filled(
                    center,
                    LED_BODY_RADIUS + ring as f32 * 7.0,
                    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha),
                );
            }
            painter.circle_filled(center, LED_BODY_RADIUS, color);
            painter.circle_filled(
                center + vec2(-5.0, -6.0),
                4.0,
                Color32::from_rgba_unmultiplied(0xff, 0xff, 0xff, 0xa0),
            );
        } else {
            painter.circle_filled(center, LED_BODY_RADIUS, color.gamma_multiply(0.35));
            painter.circle_stroke(center, LED_BODY_RADIUS, Stroke::new(1.5, color.gamma_multiply(0.7)));
        }

        if self.selected == Some(Selected::Component(id)) {
            let r = self.config.led_body_radius;
            self.draw_selection_ring(painter, center, vec2(r, r));
        }
        self.draw_terminals(painter, origin, id);
    }

    fn draw_battery(
        &self,
        painter: &egui::Painter,
        origin: Vec2,
        id: ComponentId,
        pos: Pos2,
        voltage: f32,
    ) {
        let center = pos + origin;
        let body = Rect::from_center_size(center + vec2(0.0, -4.0), vec2(64.0, 48.0));
        painter.rect_filled(body, CornerRadius::same(6), BATTERY_BODY_COLOR);
        painter.rect_stroke(
            body,
            CornerRadius::same(6),
            Stroke::new(1.5, Color32::from_gray(0x55)),
            StrokeKind::Inside,
        );
        painter.text(
            center + vec2(0.0, -4.0),
            Align2::CENTER_CENTER,
            format!("{voltage:.1}V"),
            FontId::proportional(13.0),
            TEXT_COLOR,
        );
        // Posts from the body down to the terminals.
        for terminal in self.circuit.terminals_of(id) {
            if let Some(world) = self.circuit.terminal_position(terminal) {
                painter.line_segment(
                    [center + vec2(terminal.pin.offset().x, 20.0), world + origin],
                    Stroke::new(3.0, Color32::from_gray(0x8a)),
                );
            }
        }
        painter.text(
            center + vec2(-22.0, -22.0),
            Align2::CENTER_CENTER,
            "+",
            FontId::proportional(14.0),
            Color32::from_rgb(0xff, 0x6b, 0x6b),
        );
        painter.text(
            center + vec2(22.0, -22.0),
            Align2::CENTER_CENTER,
            "-",
            FontId::proportional(14.0),
            Color32::from_rgb(0x6b, 0xa8, 0xff),
        );

        if self.selected == Some(Selected::Component(id)) {
            let half = vec2(
                self.config.battery_body.x,
                (self.config.battery_body.y + self.config.battery_body_below) * 0.5,
            );
            let offset = (self.config.battery_body_below - self.config.battery_body.y) * 0.5;
            self.draw_selection_ring(painter, center + vec2(0.0, offset), half);
        }
        self.draw_terminals(painter, origin, id);
    }

    fn draw_resistor(&self, painter: &egui::Painter, origin: Vec2, id: ComponentId, pos: Pos2) {
        let center = pos + origin;
        // Leads out to the terminals.
        for terminal in self.circuit.terminals_of(id) {
            if let Some(world) = self.circuit.terminal_position(terminal) {
                painter.line_segment(
                    [center + vec2(terminal.pin.offset().x * 0.55, 0.0), world + origin],
                    Stroke::new(2.0, Color32::from_gray(0x8a)),
                );
            }
        }
        let body = Rect::from_center_size(center, vec2(36.0, 16.0));
        painter.rect_filled(body, CornerRadius::same(4), RESISTOR_BODY_COLOR);
        for band in -1..=1 {
            let x = center.x + band as f32 * 9.0;
            painter.line_segment(
                [pos2(x, body.top() + 2.0), pos2(x, body.bottom() - 2.0)],
                Stroke::new(2.5, RESISTOR_BAND_COLOR),
            );
        }

        if self.selected == Some(Selected::Component(id)) {
            self.draw_selection_ring(painter, center, self.config.resistor_body);
        }
        self.draw_terminals(painter, origin, id);
    }

    fn draw_hover_label(&self, painter: &egui::Painter, origin: Vec2) {
        if self.drag.is_some() || self.wire_draw.is_drawing() {
            return;
        }
        let Some(Hover::Component(id)) = self.hovered else {
            return;
        };
        let (Some(label), Some(pos)) = (self.circuit.label(id), self.circuit.position(id)) else {
            return;
        };
        let galley = painter.layout_no_wrap(label.to_owned(), FontId::proportional(12.0), TEXT_COLOR);
        let size = galley.size();
        let anchor = pos + origin + vec2(-size.x * 0.5, -52.0 - size.y);
        painter.rect_filled(
            Rect::from_min_size(anchor - vec2(6.0, 4.0), size + vec2(12.0, 8.0)),
            CornerRadius::same(4),
            TOOLTIP_BACKGROUND,
        );
        painter.galley(anchor, galley, TEXT_COLOR);
    }

    // ------------------------------------------------------------------
    // Panels.

    fn draw_tool_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Components");
        ui.horizontal_wrapped(|ui| {
            if ui.button("Add LED").clicked() {
                self.add_component(ComponentKind::Led, self.spawn_position());
            }
            if ui.button("Add Battery").clicked() {
                self.add_component(ComponentKind::Battery, self.spawn_position());
            }
            if ui.button("Add Resistor").clicked() {
                self.add_component(ComponentKind::Resistor, self.spawn_position());
            }
        });
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.selected.is_some(), egui::Button::new("Delete"))
                .clicked()
            {
                self.delete_selected();
            }
            if ui.button("Clear All").clicked() {
                self.clear_all();
            }
        });

        ui.separator();
        self.draw_inspector(ui);

        ui.separator();
        ui.label(format!(
            "{} LEDs · {} batteries · {} resistors · {} wires",
            self.circuit.count_of(ComponentKind::Led),
            self.circuit.count_of(ComponentKind::Battery),
            self.circuit.count_of(ComponentKind::Resistor),
            self.circuit.wires.len(),
        ));
        ui.add_space(4.0);
        ui.weak("Click a terminal to start a wire, click another to finish.");
        ui.weak("Click empty canvas to bend. Esc or right-click cancels.");
        ui.weak("Drag a wire handle to reroute a segment.");

        ui.separator();
        ui.checkbox(&mut self.show_debug, "Debug log");
    }

    fn color_swatches(ui: &mut egui::Ui, colors: &[Color32]) -> Option<Color32> {
        let mut picked = None;
        ui.horizontal(|ui| {
            for &color in colors {
                let button = egui::Button::new("").fill(color).min_size(vec2(22.0, 22.0));
                if ui.add(button).clicked() {
                    picked = Some(color);
                }
            }
        });
        picked
    }

    fn draw_inspector(&mut self, ui: &mut egui::Ui) {
        match self.selected {
            Some(Selected::Component(id)) => match self.circuit.kind(id) {
                Some(ComponentKind::Led) => {
                    ui.label(self.circuit.label(id).unwrap_or_default().to_owned());
                    if let Some(color) = Self::color_swatches(ui, &LED_COLORS) {
                        self.set_color(color);
                    }
                }
                Some(ComponentKind::Battery) => {
                    ui.label(self.circuit.label(id).unwrap_or_default().to_owned());
                    ui.horizontal(|ui| {
                        for volts in VOLTAGE_PRESETS {
                            if ui.button(format!("{volts:.1} V")).clicked() {
                                self.set_battery_voltage(volts);
                            }
                        }
                    });
                }
                Some(ComponentKind::Resistor) => {
                    ui.label(self.circuit.label(id).unwrap_or_default().to_owned());
                }
                None => {}
            },
            Some(Selected::Wire(_)) => {
                ui.label("Wire");
                if let Some(color) = Self::color_swatches(ui, &WIRE_COLORS) {
                    self.set_color(color);
                }
            }
            None => {
                ui.label("Wire color");
                if let Some(color) = Self::color_swatches(ui, &WIRE_COLORS) {
                    self.set_color(color);
                }
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt).min(0.1);

        let moving = self.circuit.animate(&self.config);
        self.circuit.sync_wire_endpoints();
        self.advance_pulse(dt);

        self.handle_keys(ctx);

        egui::SidePanel::left("tools")
            .resizable(false)
            .default_width(230.0)
            .show(ctx, |ui| self.draw_tool_panel(ui));

        if self.show_debug {
            egui::Window::new("Debug Log")
                .default_size([520.0, 320.0])
                .show(ctx, |ui| {
                    egui_logger::logger_ui().show(ui);
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(CANVAS_BACKGROUND))
            .show(ctx, |ui| self.draw_canvas(ui));

        // Keep painting while something is in motion or glowing; otherwise
        // only when a mutation asked for one more frame.
        if moving || self.power.any_powered() || self.needs_render {
            self.needs_render = false;
            ctx.request_repaint();
        }
    }
}
