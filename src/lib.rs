//! Interactive circuit editor: place LEDs, batteries and resistors on a
//! canvas, wire their terminals with orthogonal wires, and watch LEDs light
//! up based on connectivity and polarity. Power is boolean topology, not an
//! electrical simulation.

pub mod app;
pub mod config;
pub mod db;
pub mod interaction;
pub mod nets;
pub mod power;
pub mod wire;

pub use app::App;
