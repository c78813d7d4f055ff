use egui::{Color32, Pos2, Vec2, vec2};
use slotmap::{SecondaryMap, SlotMap};

use crate::config::CanvasConfig;
use crate::wire::Wire;

slotmap::new_key_type! {
    pub struct ComponentId;
    pub struct WireId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Led,
    Battery,
    Resistor,
}

impl ComponentKind {
    pub fn pins(self) -> [Pin; 2] {
        match self {
            Self::Led => [Pin::Anode, Pin::Cathode],
            Self::Battery => [Pin::Positive, Pin::Negative],
            Self::Resistor => [Pin::P1, Pin::P2],
        }
    }
}

/// Terminal of a component. Pin names are unique across kinds, so the pin
/// alone determines its body offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pin {
    Anode,
    Cathode,
    Positive,
    Negative,
    P1,
    P2,
}

impl Pin {
    /// Offset of the terminal from the component center.
    pub fn offset(self) -> Vec2 {
        match self {
            Self::Anode => vec2(13.0, 31.0),
            Self::Cathode => vec2(-9.0, 31.0),
            Self::Positive => vec2(-30.0, 28.0),
            Self::Negative => vec2(30.0, 28.0),
            Self::P1 => vec2(-30.0, 0.0),
            Self::P2 => vec2(30.0, 0.0),
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Self::Anode => "+",
            Self::Cathode => "-",
            Self::Positive => "+",
            Self::Negative => "-",
            Self::P1 => "1",
            Self::P2 => "2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Terminal {
    pub comp: ComponentId,
    pub pin: Pin,
}

#[derive(Debug, Clone)]
pub struct Led {
    pub pos: Pos2,
    pub target: Pos2,
    pub color: Color32,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Battery {
    pub pos: Pos2,
    pub target: Pos2,
    pub voltage: f32,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Resistor {
    pub pos: Pos2,
    pub target: Pos2,
    pub label: String,
}

pub const DEFAULT_LED_COLOR: Color32 = Color32::from_rgb(0xff, 0x47, 0x57);
pub const DEFAULT_BATTERY_VOLTAGE: f32 = 9.0;

/// The circuit being edited. Component identity lives in `kinds`; per-kind
/// payloads hang off it in secondary maps keyed by the same id.
#[derive(Default)]
pub struct Circuit {
    pub kinds: SlotMap<ComponentId, ComponentKind>,
    pub leds: SecondaryMap<ComponentId, Led>,
    pub batteries: SecondaryMap<ComponentId, Battery>,
    pub resistors: SecondaryMap<ComponentId, Resistor>,
    pub wires: SlotMap<WireId, Wire>,
    led_seq: u32,
    battery_seq: u32,
    resistor_seq: u32,
}

impl Circuit {
    pub fn kind(&self, id: ComponentId) -> Option<ComponentKind> {
        self.kinds.get(id).copied()
    }

    pub fn add_led(&mut self, pos: Pos2) -> ComponentId {
        let id = self.kinds.insert(ComponentKind::Led);
        self.led_seq += 1;
        self.leds.insert(
            id,
            Led {
                pos,
                target: pos,
                color: DEFAULT_LED_COLOR,
                label: format!("LED {}", self.led_seq),
            },
        );
        id
    }

    pub fn add_battery(&mut self, pos: Pos2) -> ComponentId {
        let id = self.kinds.insert(ComponentKind::Battery);
        self.battery_seq += 1;
        self.batteries.insert(
            id,
            Battery {
                pos,
                target: pos,
                voltage: DEFAULT_BATTERY_VOLTAGE,
                label: format!("Battery {}", self.battery_seq),
            },
        );
        id
    }

    pub fn add_resistor(&mut self, pos: Pos2) -> ComponentId {
        let id = self.kinds.insert(ComponentKind::Resistor);
        self.resistor_seq += 1;
        self.resistors.insert(
            id,
            Resistor {
                pos,
                target: pos,
                label: format!("Resistor {}", self.resistor_seq),
            },
        );
        id
    }

    pub fn add_wire(&mut self, wire: Wire) -> WireId {
        self.wires.insert(wire)
    }

    /// Removes a component and every wire touching one of its terminals.
    pub fn remove_component(&mut self, id: ComponentId) {
        if self.kinds.remove(id).is_none() {
            return;
        }
        self.leds.remove(id);
        self.batteries.remove(id);
        self.resistors.remove(id);
        self.wires.retain(|_, wire| !wire.involves(id));
    }

    pub fn remove_wire(&mut self, id: WireId) {
        self.wires.remove(id);
    }

    pub fn clear(&mut self) {
        self.kinds.clear();
        self.leds.clear();
        self.batteries.clear();
        self.resistors.clear();
        self.wires.clear();
        self.led_seq = 0;
        self.battery_seq = 0;
        self.resistor_seq = 0;
    }

    pub fn get_led(&self, id: ComponentId) -> Option<&Led> {
        self.leds.get(id)
    }

    pub fn get_led_mut(&mut self, id: ComponentId) -> Option<&mut Led> {
        self.leds.get_mut(id)
    }

    pub fn get_battery(&self, id: ComponentId) -> Option<&Battery> {
        self.batteries.get(id)
    }

    pub fn get_battery_mut(&mut self, id: ComponentId) -> Option<&mut Battery> {
        self.batteries.get_mut(id)
    }

    pub fn get_resistor(&self, id: ComponentId) -> Option<&Resistor> {
        self.resistors.get(id)
    }

    pub fn position(&self, id: ComponentId) -> Option<Pos2> {
        match self.kind(id)? {
            ComponentKind::Led => self.leds.get(id).map(|c| c.pos),
            ComponentKind::Battery => self.batteries.get(id).map(|c| c.pos),
            ComponentKind::Resistor => self.resistors.get(id).map(|c| c.pos),
        }
    }

    /// Sets the drag target; `animate` eases the displayed position toward it.
    pub fn set_target(&mut self, id: ComponentId, target: Pos2) {
        match self.kind(id) {
            Some(ComponentKind::Led) => {
                if let Some(c) = self.leds.get_mut(id) {
                    c.target = target;
                }
            }
            Some(ComponentKind::Battery) => {
                if let Some(c) = self.batteries.get_mut(id) {
                    c.target = target;
                }
            }
            Some(ComponentKind::Resistor) => {
                if let Some(c) = self.resistors.get_mut(id) {
                    c.target = target;
                }
            }
            None => {}
        }
    }

    pub fn label(&self, id: ComponentId) -> Option<&str> {
        match self.kind(id)? {
            ComponentKind::Led => self.leds.get(id).map(|c| c.label.as_str()),
            ComponentKind::Battery => self.batteries.get(id).map(|c| c.label.as_str()),
            ComponentKind::Resistor => self.resistors.get(id).map(|c| c.label.as_str()),
        }
    }

    pub fn terminals_of(&self, id: ComponentId) -> impl Iterator<Item = Terminal> + '_ {
        self.kind(id)
            .into_iter()
            .flat_map(move |kind| kind.pins().into_iter().map(move |pin| Terminal { comp: id, pin }))
    }

    pub fn all_terminals(&self) -> impl Iterator<Item = Terminal> + '_ {
        self.kinds.iter().flat_map(|(id, kind)| {
            kind.pins().into_iter().map(move |pin| Terminal { comp: id, pin })
        })
    }

    pub fn terminal_position(&self, terminal: Terminal) -> Option<Pos2> {
        Some(self.position(terminal.comp)? + terminal.pin.offset())
    }

    /// One easing step toward each component's drag target. Returns whether
    /// anything is still in motion, so the frame loop knows to keep repainting.
    pub fn animate(&mut self, cfg: &CanvasConfig) -> bool {
        let mut moving = false;
        let ease = cfg.ease_factor;
        let snap = cfg.ease_snap;
        let step = |pos: &mut Pos2, target: Pos2, moving: &mut bool| {
            let d = target - *pos;
            if d.x.abs() > snap || d.y.abs() > snap {
                *pos += d * ease;
                *moving = true;
            } else if *pos != target {
                *pos = target;
            }
        };
        for led in self.leds.values_mut() {
            step(&mut led.pos, led.target, &mut moving);
        }
        for battery in self.batteries.values_mut() {
            step(&mut battery.pos, battery.target, &mut moving);
        }
        for resistor in self.resistors.values_mut() {
            step(&mut resistor.pos, resistor.target, &mut moving);
        }
        moving
    }

    /// Pins every wire's end waypoints to the live terminal positions.
    pub fn sync_wire_endpoints(&mut self) {
        let updates: Vec<(WireId, Option<Pos2>, Option<Pos2>)> = self
            .wires
            .iter()
            .map(|(id, wire)| {
                (
                    id,
                    wire.a.and_then(|t| self.terminal_position(t)),
                    wire.b.and_then(|t| self.terminal_position(t)),
                )
            })
            .collect();
        for (id, a, b) in updates {
            if let Some(wire) = self.wires.get_mut(id) {
                wire.sync_endpoints(a, b);
            }
        }
    }

    pub fn count_of(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Led => self.leds.len(),
            ComponentKind::Battery => self.batteries.len(),
            ComponentKind::Resistor => self.resistors.len(),
        }
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "circuit: {} components, {} wires",
            self.kinds.len(),
            self.wires.len()
        )?;
        for (id, kind) in &self.kinds {
            let label = self.label(id).unwrap_or("?");
            let pos = self.position(id).unwrap_or_default();
            writeln!(f, "  {kind:?} {label:?} at ({:.0}, {:.0})", pos.x, pos.y)?;
        }
        for wire in self.wires.values() {
            writeln!(
                f,
                "  wire {:?} -> {:?} ({} points)",
                wire.a,
                wire.b,
                wire.points.len()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::DEFAULT_WIRE_COLOR;
    use egui::pos2;

    fn wire_between(circuit: &Circuit, a: Terminal, b: Terminal) -> Wire {
        let from = circuit.terminal_position(a).unwrap();
        let to = circuit.terminal_position(b).unwrap();
        Wire::between(a, b, from, to, DEFAULT_WIRE_COLOR)
    }

    #[test]
    fn terminal_positions_follow_component() {
        let mut circuit = Circuit::default();
        let led = circuit.add_led(pos2(100.0, 100.0));
        let anode = Terminal {
            comp: led,
            pin: Pin::Anode,
        };
        assert_eq!(circuit.terminal_position(anode), Some(pos2(113.0, 131.0)));

        // Jump the position directly; terminals derive from `pos`.
        circuit.get_led_mut(led).unwrap().pos = pos2(0.0, 0.0);
        assert_eq!(circuit.terminal_position(anode), Some(pos2(13.0, 31.0)));
    }

    #[test]
    fn removing_a_component_cascades_to_wires() {
        let mut circuit = Circuit::default();
        let led = circuit.add_led(pos2(0.0, 0.0));
        let battery = circuit.add_battery(pos2(200.0, 0.0));
        let resistor = circuit.add_resistor(pos2(100.0, 200.0));

        let anode = Terminal { comp: led, pin: Pin::Anode };
        let cathode = Terminal { comp: led, pin: Pin::Cathode };
        let positive = Terminal { comp: battery, pin: Pin::Positive };
        let p1 = Terminal { comp: resistor, pin: Pin::P1 };

        let w1 = wire_between(&circuit, positive, anode);
        let w2 = wire_between(&circuit, cathode, p1);
        circuit.add_wire(w1);
        let survivor = circuit.add_wire(wire_between(&circuit, positive, p1));
        circuit.add_wire(w2);
        assert_eq!(circuit.wires.len(), 3);

        circuit.remove_component(led);
        assert!(circuit.kind(led).is_none());
        assert!(circuit.get_led(led).is_none());
        assert_eq!(circuit.wires.len(), 1);
        assert!(circuit.wires.contains_key(survivor));

        // Removing again is a no-op.
        circuit.remove_component(led);
        assert_eq!(circuit.wires.len(), 1);
    }

    #[test]
    fn stale_ids_resolve_to_none() {
        let mut circuit = Circuit::default();
        let led = circuit.add_led(pos2(0.0, 0.0));
        circuit.remove_component(led);
        assert_eq!(circuit.position(led), None);
        assert_eq!(
            circuit.terminal_position(Terminal { comp: led, pin: Pin::Anode }),
            None
        );
        // Mutations against stale ids do nothing rather than panic.
        circuit.set_target(led, pos2(50.0, 50.0));
    }

    #[test]
    fn animate_eases_then_snaps() {
        let mut circuit = Circuit::default();
        let cfg = CanvasConfig::default();
        let led = circuit.add_led(pos2(0.0, 0.0));
        circuit.set_target(led, pos2(100.0, 0.0));

        assert!(circuit.animate(&cfg));
        let after_one = circuit.get_led(led).unwrap().pos;
        assert!((after_one.x - 20.0).abs() < 1e-4);

        // Easing converges and eventually reports no motion.
        for _ in 0..200 {
            circuit.animate(&cfg);
        }
        assert!(!circuit.animate(&cfg));
        assert_eq!(circuit.get_led(led).unwrap().pos, pos2(100.0, 0.0));
    }

    #[test]
    fn sync_moves_wire_ends_with_terminals() {
        let mut circuit = Circuit::default();
        let led = circuit.add_led(pos2(0.0, 0.0));
        let battery = circuit.add_battery(pos2(300.0, 0.0));
        let anode = Terminal { comp: led, pin: Pin::Anode };
        let positive = Terminal { comp: battery, pin: Pin::Positive };
        let id = {
            let w = wire_between(&circuit, positive, anode);
            circuit.add_wire(w)
        };

        circuit.get_led_mut(led).unwrap().pos = pos2(0.0, 100.0);
        circuit.sync_wire_endpoints();
        let wire = &circuit.wires[id];
        assert_eq!(*wire.points.last().unwrap(), pos2(13.0, 131.0));
        assert_eq!(wire.points[0], pos2(270.0, 28.0));
    }

    #[test]
    fn labels_are_sequential_per_kind() {
        let mut circuit = Circuit::default();
        let a = circuit.add_led(pos2(0.0, 0.0));
        let b = circuit.add_led(pos2(50.0, 0.0));
        let bat = circuit.add_battery(pos2(100.0, 0.0));
        assert_eq!(circuit.label(a), Some("LED 1"));
        assert_eq!(circuit.label(b), Some("LED 2"));
        assert_eq!(circuit.label(bat), Some("Battery 1"));
    }
}
