use std::collections::HashMap;

use crate::db::{Circuit, ComponentKind, Pin, Terminal};

/// Identity of a connectivity net. Ids are only meaningful within the
/// `NetMap` that produced them; every rebuild starts numbering from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetId(u32);

/// Terminal-to-net assignment derived from the wire topology.
#[derive(Debug, Default, Clone)]
pub struct NetMap {
    assignments: HashMap<Terminal, NetId>,
    net_count: u32,
}

impl NetMap {
    /// Rebuilds the partition from scratch. Each complete wire is one
    /// undirected edge between its endpoint terminals; a resistor conducts,
    /// so its two pins contribute an implicit edge as well. Terminals
    /// touching nothing get singleton nets.
    pub fn compute(circuit: &Circuit) -> Self {
        let mut adjacency: HashMap<Terminal, Vec<Terminal>> = HashMap::new();
        let mut add_edge = |a: Terminal, b: Terminal| {
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        };

        for wire in circuit.wires.values() {
            if let (Some(a), Some(b)) = (wire.a, wire.b)
                && circuit.kind(a.comp).is_some()
                && circuit.kind(b.comp).is_some()
            {
                add_edge(a, b);
            }
        }
        for (id, kind) in &circuit.kinds {
            if *kind == ComponentKind::Resistor {
                add_edge(
                    Terminal { comp: id, pin: Pin::P1 },
                    Terminal { comp: id, pin: Pin::P2 },
                );
            }
        }

        let mut assignments: HashMap<Terminal, NetId> = HashMap::new();
        let mut net_count = 0u32;
        let mut stack: Vec<Terminal> = Vec::new();
        for root in circuit.all_terminals() {
            if assignments.contains_key(&root) {
                continue;
            }
            let net = NetId(net_count);
            net_count += 1;
            stack.push(root);
            while let Some(terminal) = stack.pop() {
                if assignments.insert(terminal, net).is_some() {
                    continue;
                }
                if let Some(neighbors) = adjacency.get(&terminal) {
                    for &next in neighbors {
                        if !assignments.contains_key(&next) {
                            stack.push(next);
                        }
                    }
                }
            }
        }

        log::debug!(
            "rebuilt nets: {} terminals across {net_count} nets",
            assignments.len()
        );
        Self {
            assignments,
            net_count,
        }
    }

    pub fn net_of(&self, terminal: Terminal) -> Option<NetId> {
        self.assignments.get(&terminal).copied()
    }

    pub fn same_net(&self, a: Terminal, b: Terminal) -> bool {
        match (self.net_of(a), self.net_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn net_count(&self) -> usize {
        self.net_count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ComponentId;
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

    #[test]
    fn isolated_terminals_get_singleton_nets() {
        let mut circuit = Circuit::default();
        circuit.add_led(pos2(0.0, 0.0));
        circuit.add_battery(pos2(200.0, 0.0));
        let nets = NetMap::compute(&circuit);
        assert_eq!(nets.net_count(), 4);
        let all: Vec<_> = circuit.all_terminals().collect();
        for (i, &a) in all.iter().enumerate() {
            for &b in &all[i + 1..] {
                assert!(!nets.same_net(a, b), "{a:?} and {b:?} should be isolated");
            }
        }
    }

    #[test]
    fn wires_merge_terminals_transitively() {
        let mut circuit = Circuit::default();
        let led_a = circuit.add_led(pos2(0.0, 0.0));
        let led_b = circuit.add_led(pos2(150.0, 0.0));
        let battery = circuit.add_battery(pos2(300.0, 0.0));

        connect(&mut circuit, t(battery, Pin::Positive), t(led_a, Pin::Anode));
        connect(&mut circuit, t(led_a, Pin::Anode), t(led_b, Pin::Anode));

        let nets = NetMap::compute(&circuit);
        assert!(nets.same_net(t(battery, Pin::Positive), t(led_b, Pin::Anode)));
        assert!(!nets.same_net(t(battery, Pin::Positive), t(battery, Pin::Negative)));
        // 6 terminals total, 3 merged into one net, 3 singletons.
        assert_eq!(nets.net_count(), 4);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut circuit = Circuit::default();
        let led = circuit.add_led(pos2(0.0, 0.0));
        let battery = circuit.add_battery(pos2(200.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));
        connect(&mut circuit, t(led, Pin::Cathode), t(battery, Pin::Negative));

        let first = NetMap::compute(&circuit);
        let second = NetMap::compute(&circuit);
        let all: Vec<_> = circuit.all_terminals().collect();
        for &a in &all {
            for &b in &all {
                assert_eq!(first.same_net(a, b), second.same_net(a, b));
            }
        }
    }

    #[test]
    fn duplicate_parallel_wires_are_harmless() {
        let mut circuit = Circuit::default();
        let led = circuit.add_led(pos2(0.0, 0.0));
        let battery = circuit.add_battery(pos2(200.0, 0.0));
        for _ in 0..3 {
            connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));
        }
        let nets = NetMap::compute(&circuit);
        assert!(nets.same_net(t(battery, Pin::Positive), t(led, Pin::Anode)));
        assert_eq!(nets.net_count(), 3);
    }

    #[test]
    fn self_loop_wire_changes_nothing() {
        let mut circuit = Circuit::default();
        let led = circuit.add_led(pos2(0.0, 0.0));
        let anode = t(led, Pin::Anode);
        connect(&mut circuit, anode, anode);
        let nets = NetMap::compute(&circuit);
        assert_eq!(nets.net_count(), 2);
        assert!(!nets.same_net(anode, t(led, Pin::Cathode)));
    }

    #[test]
    fn resistor_conducts_between_its_pins() {
        let mut circuit = Circuit::default();
        let battery = circuit.add_battery(pos2(0.0, 0.0));
        let resistor = circuit.add_resistor(pos2(150.0, 0.0));
        let led = circuit.add_led(pos2(300.0, 0.0));

        connect(&mut circuit, t(battery, Pin::Positive), t(resistor, Pin::P1));
        connect(&mut circuit, t(resistor, Pin::P2), t(led, Pin::Anode));

        let nets = NetMap::compute(&circuit);
        assert!(nets.same_net(t(battery, Pin::Positive), t(led, Pin::Anode)));
    }

    #[test]
    fn deleted_components_drop_out_of_the_partition() {
        let mut circuit = Circuit::default();
        let led = circuit.add_led(pos2(0.0, 0.0));
        let battery = circuit.add_battery(pos2(200.0, 0.0));
        connect(&mut circuit, t(battery, Pin::Positive), t(led, Pin::Anode));

        circuit.remove_component(led);
        let nets = NetMap::compute(&circuit);
        assert_eq!(nets.net_of(t(led, Pin::Anode)), None);
        assert_eq!(nets.net_count(), 2);
    }
}
