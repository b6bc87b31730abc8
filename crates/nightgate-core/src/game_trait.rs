use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::snapshot::SnapshotError;

/// Core trait for a fixed-step simulation driven by an external scheduler.
///
/// The scheduler calls [`Simulation::update`] once per display tick, feeds
/// key events in between, and hands [`Simulation::state`] to the renderer
/// read-only after each update.
pub trait Simulation {
    /// Full snapshot consumed by the renderer.
    type State: Serialize + DeserializeOwned;
    /// Notable things that happened during one update.
    type Event: std::fmt::Debug;

    fn metadata(&self) -> SimMetadata;

    /// Ticks per second the simulation is tuned for.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// A key went down. Edge-triggered actions fire here, once per press.
    fn key_down(&mut self, key: &str);

    fn key_up(&mut self, key: &str);

    /// Advance exactly one frame.
    fn update(&mut self) -> Vec<Self::Event>;

    fn state(&self) -> &Self::State;

    fn serialize_state(&self) -> Result<Vec<u8>, SnapshotError>;

    /// Replace the current snapshot. Invalid snapshots leave state untouched.
    fn apply_state(&mut self, state: &[u8]) -> Result<(), SnapshotError>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Whether the run reached a terminal state (won or lost).
    fn is_finished(&self) -> bool;
}

/// Descriptive metadata for a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimMetadata {
    pub name: String,
    pub description: String,
    pub controls: String,
}

/// Generates the `Simulation` methods that only touch `state` and `paused`:
/// `state`, `serialize_state`, `pause`, `resume`, `is_paused`.
///
/// Requires the implementing struct to have `state: $StateType` and `paused: bool` fields.
#[macro_export]
macro_rules! simulation_boilerplate {
    (state_type: $StateType:ty) => {
        fn state(&self) -> &$StateType {
            &self.state
        }

        fn serialize_state(&self) -> Result<Vec<u8>, $crate::snapshot::SnapshotError> {
            $crate::snapshot::encode(&self.state)
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }
    };
}
