//! Kani proof harnesses for logical time arithmetic.
//!
//! Run with `cargo kani -p fedtime-core`.

#[cfg(kani)]
mod kani_proofs {
    use crate::{BaseTime, Int64Interval, Int64Time};

    /// Adding then subtracting the same interval is the identity whenever
    /// the addition succeeds.
    #[kani::proof]
    fn proof_add_sub_inverse() {
        let t = Int64Time::from_base_time(kani::any());
        let dt = Int64Interval::from_base_time(kani::any());

        if let Ok(later) = t.checked_add(dt) {
            let back = later.checked_sub(dt);
            kani::assert(back == Ok(t), "(t + dt) - dt == t");
        }
    }

    /// Checked arithmetic fails exactly when i64 arithmetic would overflow.
    #[kani::proof]
    fn proof_no_silent_wrap() {
        let a: i64 = kani::any();
        let b: i64 = kani::any();
        let sum = Int64Time::from_base_time(a).checked_add(Int64Interval::from_base_time(b));
        kani::assert(sum.is_ok() == a.checked_add(b).is_some(), "overflow is reported");
    }

    /// The distance between two times added back to the earlier one yields
    /// the later one.
    #[kani::proof]
    fn proof_interval_since_consistent() {
        let a = Int64Time::from_base_time(kani::any());
        let b = Int64Time::from_base_time(kani::any());
        if let Ok(dt) = b.interval_since(a) {
            kani::assert(a.checked_add(dt) == Ok(b), "a + (b - a) == b");
        }
    }

    /// Tick round trip at second resolution is exact for 52-bit values.
    #[kani::proof]
    fn proof_seconds_round_trip() {
        let ticks: i64 = kani::any();
        kani::assume(ticks.unsigned_abs() < (1_u64 << 52));
        let base = BaseTime::Seconds;
        let seconds = base.to_seconds(ticks);
        kani::assert(base.to_ticks(seconds) == Ok(ticks), "round trip");
    }
}
