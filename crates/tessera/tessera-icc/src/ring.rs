//! Sequence arithmetic for the SPSC rings.
//!
//! A channel never stores wrapped indices. Its two counters are running
//! totals of records produced and consumed; the slot for a sequence number
//! is derived on demand, and fullness is the unsigned distance between the
//! counters. Because that distance is computed with wrapping subtraction it
//! stays correct when both counters wrap past `u64::MAX`.

/// Converts a sequence number to a slot index.
///
/// # Examples
///
/// With `capacity = 3`:
/// ```text
/// seq = 0 → 0
/// seq = 2 → 2
/// seq = 3 → 0  (wraps around)
/// seq = 7 → 1
/// ```
///
/// Slot indices only stay collision-free across a `u64` counter wrap when
/// `capacity` divides 2^64 (a power of two). At one record per nanosecond
/// a 64-bit counter takes centuries to wrap, so any capacity is accepted.
#[inline(always)]
pub fn seq_to_index(seq: u64, capacity: u32) -> usize {
    (seq % capacity as u64) as usize
}

/// Records published but not yet consumed.
#[inline(always)]
pub fn in_flight(produced: u64, consumed: u64) -> u64 {
    produced.wrapping_sub(consumed)
}

/// `true` when every slot holds an unread record.
#[inline(always)]
pub fn is_full(produced: u64, consumed: u64, capacity: u32) -> bool {
    in_flight(produced, consumed) >= capacity as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_wraps_by_capacity() {
        assert_eq!(seq_to_index(0, 4), 0);
        assert_eq!(seq_to_index(5, 4), 1);
        assert_eq!(seq_to_index(7, 3), 1);
        assert_eq!(seq_to_index(u64::MAX, 4), 3);
    }

    #[test]
    fn distance_survives_counter_wrap() {
        // produced has wrapped past u64::MAX, consumed has not yet
        let consumed = u64::MAX - 1;
        let produced = consumed.wrapping_add(3);
        assert_eq!(produced, 1);
        assert_eq!(in_flight(produced, consumed), 3);
        assert!(!is_full(produced, consumed, 4));
        assert!(is_full(produced, consumed, 3));
    }

    #[test]
    fn wrapped_sequences_map_to_consecutive_slots() {
        let start = u64::MAX - 1;
        let slots: Vec<usize> = (0..4)
            .map(|i| seq_to_index(start.wrapping_add(i), 4))
            .collect();
        assert_eq!(slots, vec![2, 3, 0, 1]);
    }

    #[test]
    fn empty_ring_is_not_full() {
        assert_eq!(in_flight(10, 10), 0);
        assert!(!is_full(10, 10, 1));
    }
}
