//! Kani proof harnesses for the sync-point state machine.
//!
//! Run with `cargo kani -p fedtime-sync`.

#[cfg(kani)]
mod kani_proofs {
    use crate::domain::sync::SyncPntState;

    fn any_state() -> SyncPntState {
        let code: i32 = kani::any();
        kani::assume((0..=4).contains(&code));
        match SyncPntState::from_code(code) {
            Some(state) => state,
            None => unreachable!(),
        }
    }

    fn rank(state: SyncPntState) -> u8 {
        match state {
            SyncPntState::Error => 0,
            SyncPntState::Exists => 1,
            SyncPntState::Registered => 2,
            SyncPntState::Announced => 3,
            SyncPntState::Achieved => 4,
        }
    }

    /// Every non-error edge strictly increases progress.
    #[kani::proof]
    fn proof_edges_are_monotonic() {
        let from = any_state();
        let to = any_state();
        if from.can_transition_to(to) && to != SyncPntState::Error {
            kani::assert(rank(to) > rank(from), "progress never decreases");
        }
    }

    /// ACHIEVED is entered only from ANNOUNCED.
    #[kani::proof]
    fn proof_achieved_requires_announced() {
        let from = any_state();
        if from.can_transition_to(SyncPntState::Achieved) {
            kani::assert(from == SyncPntState::Announced, "no skip to ACHIEVED");
        }
    }

    /// Codes round-trip.
    #[kani::proof]
    fn proof_code_round_trip() {
        let state = any_state();
        kani::assert(SyncPntState::from_code(state.code()) == Some(state), "round trip");
    }
}
