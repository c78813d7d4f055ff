use std::collections::HashMap;

use crate::db::{Circuit, ComponentId, Pin, Terminal};
use crate::nets::NetMap;

/// Which LEDs are lit, derived from the current net partition. An LED is
/// powered when its anode and cathode sit on different nets, some battery
/// positive terminal shares the anode net, and some battery negative terminal
/// shares the cathode net. Voltage is cosmetic and never consulted.
#[derive(Debug, Default, Clone)]
pub struct PowerMap {
    powered: HashMap<ComponentId, bool>,
}

impl PowerMap {
    pub fn evaluate(circuit: &Circuit, nets: &NetMap) -> Self {
        let positive_nets: Vec<_> = circuit
            .batteries
            .keys()
            .filter_map(|id| nets.net_of(Terminal { comp: id, pin: Pin::Positive }))
            .collect();
        let negative_nets: Vec<_> = circuit
            .batteries
            .keys()
            .filter_map(|id| nets.net_of(Terminal { comp: id, pin: Pin::Negative }))
            .collect();

        let mut powered = HashMap::new();
        for id in circuit.leds.keys() {
            let anode = nets.net_of(Terminal { comp: id, pin: Pin::Anode });
            let cathode = nets.net_of(Terminal { comp: id, pin: Pin::Cathode });
            let lit = match (anode, cathode) {
                (Some(a), Some(c)) if a != c => {
                    positive_nets.contains(&a) && negative_nets.contains(&c)
                }
                _ => false,
            };
            if lit {
                log::debug!("led {id:?} powered");
            }
            powered.insert(id, lit);
        }
        Self { powered }
    }

    pub fn is_powered(&self, id: ComponentId) -> bool {
        self.powered.get(&id).copied().unwrap_or(false)
    }

    pub fn any_powered(&self) -> bool {
        self.powered.values().any(|&lit| lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{DEFAULT_WIRE_COLOR, Wire};
    use egui::pos2;

    fn connect(circuit: &mut Circuit, a: Terminal, b: Terminal) {
        let from = circuit.terminal_position(a).unwrap();
        let to = circuit.terminal_position(b).unwrap();
        circuit.add_wire(Wire::between(a, b, from, to, DEFAULT_WIRE_COLOR));
    }

    fn t(comp: ComponentId, pin: Pin) -> Terminal {
        Terminal { comp, pin }
    }

    fn evaluate(circuit: &Circuit) -> PowerMap {
        PowerMap::evaluate(circuit, &NetMap::compute(circuit))
    }

    #[test]
    fn correctly_wired_led_lights() {
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let led = circuit.add_led(pos2(200.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));
        connect(&mut circuit, t(led, Pin::Cathode), t(battery, Pin::Negative));
        let power = evaluate(&circuit);
        assert!(power.is_powered(led));
        assert!(power.any_powered());
    }

    #[test]
    fn reversed_polarity_stays_dark() {
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let led = circuit.add_led(pos2(200.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Cathode));
        connect(&mut circuit, t(led, Pin::Anode), t(battery, Pin::Negative));
        assert!(!evaluate(&circuit).is_powered(led));
    }

    #[test]
    fn half_connected_led_stays_dark() {
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let led = circuit.add_led(pos2(200.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));
        assert!(!evaluate(&circuit).is_powered(led));
    }

    #[test]
    fn two_leds_share_one_battery() {
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let led_a = circuit.add_led(pos2(200.0, -100.0));
        let led_b = circuit.add_led(pos2(200.0, 100.0));
        for led in [led_a, led_b] {
            connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));
            connect(&mut circuit, t(led, Pin::Cathode), t(battery, Pin::Negative));
        }
        let power = evaluate(&circuit);
        assert!(power.is_powered(led_a));
        assert!(power.is_powered(led_b));
    }

    #[test]
    fn cutting_one_wire_kills_the_circuit() {
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let led = circuit.add_led(pos2(200.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));
        let return_wire = {
            let a = t(led, Pin::Cathode);
            let b = t(battery, Pin::Negative);
            let from = circuit.terminal_position(a).unwrap();
            let to = circuit.terminal_position(b).unwrap();
            circuit.add_wire(Wire::between(a, b, from, to, DEFAULT_WIRE_COLOR))
        };
        assert!(evaluate(&circuit).is_powered(led));

        circuit.remove_wire(return_wire);
        assert!(!evaluate(&circuit).is_powered(led));
    }

    #[test]
    fn short_circuit_across_one_led_leg() {
        // Shorting anode to cathode merges the nets; the LED must go dark.
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let led = circuit.add_led(pos2(200.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));
        connect(&mut circuit, t(led, Pin::Cathode), t(battery, Pin::Negative));
        connect(&mut circuit, t(led, Pin::Anode), t(led, Pin::Cathode));
        assert!(!evaluate(&circuit).is_powered(led));
    }

    #[test]
    fn resistor_in_series_still_powers_the_led() {
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let resistor = circuit.add_resistor(pos2(150.0, 0.0));
        let led = circuit.add_led(pos2(300.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(resistor, Pin::P1));
        connect(&mut circuit, t(resistor, Pin::P2), t(led, Pin::Anode));
        connect(&mut circuit, t(led, Pin::Cathode), t(battery, Pin::Negative));
        assert!(evaluate(&circuit).is_powered(led));
    }

    #[test]
    fn voltage_never_affects_power() {
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let led = circuit.add_led(pos2(200.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));
        connect(&mut circuit, t(led, Pin::Cathode), t(battery, Pin::Negative));
        circuit.get_battery_mut(battery).unwrap().voltage = 1.5;
        assert!(evaluate(&circuit).is_powered(led));
    }
}
