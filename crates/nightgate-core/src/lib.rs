pub mod game_trait;
pub mod geometry;
pub mod input;
pub mod snapshot;
pub mod time;

pub use game_trait::{SimMetadata, Simulation};
pub use geometry::{Rect, Vec2};
pub use input::InputMap;
pub use snapshot::SnapshotError;
pub use time::{Clock, ManualClock, Millis, SystemClock};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::Simulation;

    /// Run `n` updates, returning all accumulated events.
    pub fn run_ticks<S: Simulation>(sim: &mut S, n: usize) -> Vec<S::Event> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.update());
        }
        all_events
    }

    /// Encode the current snapshot, panicking with context on failure.
    pub fn snapshot_bytes<S: Simulation>(sim: &S) -> Vec<u8> {
        sim.serialize_state()
            .unwrap_or_else(|e| panic!("serialize_state must succeed: {e}"))
    }

    // ================================================================
    // Simulation Contract Tests
    // ================================================================
    // Every Simulation implementation must pass these. Game crates call
    // them from their own #[cfg(test)] modules with a freshly built game.

    /// A fresh simulation must produce a non-empty snapshot.
    pub fn contract_snapshot_not_empty<S: Simulation>(sim: &S) {
        assert!(
            !snapshot_bytes(sim).is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// update() on a running simulation must change the snapshot.
    pub fn contract_update_changes_state<S: Simulation>(sim: &mut S) {
        let before = snapshot_bytes(sim);
        sim.update();
        let after = snapshot_bytes(sim);
        assert_ne!(before, after, "update() must advance a running simulation");
    }

    /// serialize → apply → serialize must be stable.
    pub fn contract_state_roundtrip_preserves<S: Simulation>(sim: &mut S) {
        let state_a = snapshot_bytes(sim);
        sim.apply_state(&state_a)
            .unwrap_or_else(|e| panic!("apply_state must accept own snapshot: {e}"));
        let state_b = snapshot_bytes(sim);
        assert_eq!(
            state_a, state_b,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// pause() must freeze updates, resume() must unfreeze them.
    pub fn contract_pause_stops_updates<S: Simulation>(sim: &mut S) {
        sim.pause();
        assert!(sim.is_paused());
        let before = snapshot_bytes(sim);
        let events = sim.update();
        assert!(events.is_empty(), "Paused update must not emit events");
        let during_pause = snapshot_bytes(sim);
        assert_eq!(before, during_pause, "State must not change while paused");

        sim.resume();
        sim.update();
        let after_resume = snapshot_bytes(sim);
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// Once finished, further updates and key events are identity operations.
    pub fn contract_finished_is_identity<S: Simulation>(sim: &mut S, ticks: usize) {
        assert!(sim.is_finished(), "contract requires a finished simulation");
        let before = snapshot_bytes(sim);
        for key in ["a", "d", "s", "w", "space"] {
            sim.key_down(key);
        }
        let events = run_ticks(sim, ticks);
        for key in ["a", "d", "s", "w", "space"] {
            sim.key_up(key);
        }
        assert!(events.is_empty(), "Finished simulation must not emit events");
        assert_eq!(
            before,
            snapshot_bytes(sim),
            "Finished simulation must not change"
        );
    }

    /// Garbage bytes must be rejected without touching the current state.
    pub fn contract_apply_garbage_rejected<S: Simulation>(sim: &mut S) {
        let before = snapshot_bytes(sim);
        assert!(sim.apply_state(&[0xc1, 0x00, 0xff, 0x13]).is_err());
        assert!(sim.apply_state(&[]).is_err());
        assert_eq!(before, snapshot_bytes(sim));
    }
}
