use egui::{Pos2, Vec2};

use crate::app::App;
use crate::config::CanvasConfig;
use crate::db::{Circuit, ComponentId, ComponentKind, Terminal, WireId};

/// What the pointer is currently over, in priority order: segment drag
/// handles beat terminals, terminals beat component bodies, bodies beat wire
/// runs. Empty canvas is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hover {
    Handle { wire: WireId, segment: usize },
    Terminal(Terminal),
    Component(ComponentId),
    Wire(WireId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selected {
    Component(ComponentId),
    Wire(WireId),
}

/// An in-flight pointer drag. Segment drags apply incremental deltas from the
/// last observed pointer position; component drags move the easing target.
#[derive(Debug, Clone, Copy)]
pub enum Drag {
    Component { id: ComponentId, grab_offset: Vec2 },
    Segment { wire: WireId, segment: usize, last: Pos2 },
}

/// Wire drawing is a two-state machine. While `Drawing`, `points` holds the
/// committed waypoints (starting at the source terminal) and `cursor` the
/// grid-snapped preview position.
#[derive(Debug, Clone, Default)]
pub enum WireDraw {
    #[default]
    Idle,
    Drawing {
        source: Terminal,
        points: Vec<Pos2>,
        cursor: Pos2,
    },
}

impl WireDraw {
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }
}

pub fn hit_terminal(circuit: &Circuit, cfg: &CanvasConfig, pos: Pos2) -> Option<Terminal> {
    circuit.all_terminals().find(|&t| {
        circuit
            .terminal_position(t)
            .is_some_and(|p| (p - pos).length() <= cfg.terminal_radius)
    })
}

pub fn hit_component_body(circuit: &Circuit, cfg: &CanvasConfig, pos: Pos2) -> Option<ComponentId> {
    for (id, kind) in &circuit.kinds {
        let Some(center) = circuit.position(id) else {
            continue;
        };
        let d = pos - center;
        let inside = match kind {
            ComponentKind::Led => d.length() <= cfg.led_body_radius,
            ComponentKind::Battery => {
                d.x.abs() <= cfg.battery_body.x
                    && d.y >= -cfg.battery_body.y
                    && d.y <= cfg.battery_body_below
            }
            ComponentKind::Resistor => {
                d.x.abs() <= cfg.resistor_body.x && d.y.abs() <= cfg.resistor_body.y
            }
        };
        if inside {
            return Some(id);
        }
    }
    None
}

/// Closest wire within hover tolerance.
pub fn hit_wire(circuit: &Circuit, cfg: &CanvasConfig, pos: Pos2) -> Option<WireId> {
    let mut best: Option<(WireId, f32)> = None;
    for (id, wire) in &circuit.wires {
        let dist = wire.distance_to(pos);
        if dist <= cfg.wire_hit_distance && best.is_none_or(|(_, d)| dist < d) {
            best = Some((id, dist));
        }
    }
    best.map(|(id, _)| id)
}

/// Midpoint handle of a draggable segment. The selected wire is probed first
/// so its handles win over overlapping geometry.
pub fn hit_handle(
    circuit: &Circuit,
    cfg: &CanvasConfig,
    pos: Pos2,
    preferred: Option<WireId>,
) -> Option<(WireId, usize)> {
    let probe = |id: WireId| {
        let wire = circuit.wires.get(id)?;
        wire.draggable_segments(cfg).into_iter().find(|&seg| {
            wire.segment_midpoint(seg)
                .is_some_and(|mid| (mid - pos).length() <= cfg.handle_radius)
        })
    };
    if let Some(id) = preferred
        && let Some(seg) = probe(id)
    {
        return Some((id, seg));
    }
    circuit
        .wires
        .keys()
        .filter(|&id| Some(id) != preferred)
        .find_map(|id| probe(id).map(|seg| (id, seg)))
}

pub fn hit_test(
    circuit: &Circuit,
    cfg: &CanvasConfig,
    pos: Pos2,
    preferred_wire: Option<WireId>,
) -> Option<Hover> {
    if let Some((wire, segment)) = hit_handle(circuit, cfg, pos, preferred_wire) {
        return Some(Hover::Handle { wire, segment });
    }
    if let Some(terminal) = hit_terminal(circuit, cfg, pos) {
        return Some(Hover::Terminal(terminal));
    }
    if let Some(id) = hit_component_body(circuit, cfg, pos) {
        return Some(Hover::Component(id));
    }
    hit_wire(circuit, cfg, pos).map(Hover::Wire)
}

impl App {
    fn selected_wire(&self) -> Option<WireId> {
        match self.selected {
            Some(Selected::Wire(id)) => Some(id),
            _ => None,
        }
    }

    pub fn handle_pointer_down(&mut self, pos: Pos2) {
        self.needs_render = true;

        // While drawing, every click either finishes at a terminal or drops
        // a bend; nothing else can be grabbed.
        if self.wire_draw.is_drawing() {
            if let Some(terminal) = hit_terminal(&self.circuit, &self.config, pos) {
                self.complete_wire(terminal);
            } else {
                self.extend_wire(pos);
            }
            return;
        }

        match hit_test(&self.circuit, &self.config, pos, self.selected_wire()) {
            Some(Hover::Handle { wire, segment }) => {
                if let Some(segment) = self.begin_segment_drag(wire, segment) {
                    self.selected = Some(Selected::Wire(wire));
                    self.drag = Some(Drag::Segment {
                        wire,
                        segment,
                        last: pos,
                    });
                }
            }
            Some(Hover::Terminal(terminal)) => {
                self.begin_wire(terminal);
            }
            Some(Hover::Component(id)) => {
                self.selected = Some(Selected::Component(id));
                if let Some(center) = self.circuit.position(id) {
                    self.drag = Some(Drag::Component {
                        id,
                        grab_offset: center - pos,
                    });
                }
            }
            Some(Hover::Wire(id)) => {
                self.selected = Some(Selected::Wire(id));
            }
            None => {
                self.selected = None;
            }
        }
    }

    pub fn handle_pointer_move(&mut self, pos: Pos2) {
        if self.wire_draw.is_drawing() {
            let snap = self.config.grid_snap;
            let snapped = egui::pos2(
                (pos.x / snap).round() * snap,
                (pos.y / snap).round() * snap,
            );
            if let WireDraw::Drawing { cursor, .. } = &mut self.wire_draw
                && *cursor != snapped
            {
                *cursor = snapped;
                self.needs_render = true;
            }
            return;
        }

        match self.drag {
            Some(Drag::Segment { wire, segment, last }) => {
                self.drag_segment(wire, segment, pos - last);
                if let Some(Drag::Segment { last, .. }) = &mut self.drag {
                    *last = pos;
                }
            }
            Some(Drag::Component { id, grab_offset }) => {
                self.circuit.set_target(id, pos + grab_offset);
                self.needs_render = true;
            }
            None => {
                let hover = hit_test(&self.circuit, &self.config, pos, self.selected_wire());
                if hover != self.hovered {
                    self.hovered = hover;
                    self.needs_render = true;
                }
            }
        }
    }

    pub fn handle_pointer_up(&mut self) {
        if self.drag.take().is_some() {
            self.needs_render = true;
        }
    }

    /// Escape cancels a live wire, otherwise clears the selection.
    pub fn handle_escape(&mut self) {
        if self.wire_draw.is_drawing() {
            self.cancel_wire();
        } else if self.selected.is_some() {
            self.selected = None;
            self.needs_render = true;
        }
    }

    /// Enter discards the live ghost wire.
    pub fn handle_enter(&mut self) {
        if self.wire_draw.is_drawing() {
            self.cancel_wire();
        }
    }
}
