//! Lock-free handoff of drive coefficients from the control thread to the
//! audio thread.
//!
//! [`CoefficientExchange`] is a sequence-validated slot (a seqlock). The
//! twenty-five coefficient words live in atomics; a sequence counter is odd
//! while a writer is mid-update and advances by two per publication.
//!
//! - **Writers** serialize on a `Mutex` (control threads only), bump the
//!   sequence to odd, store the words, then release the next even value.
//! - **The reader** (audio thread) never locks or waits. It loads the
//!   sequence, copies the words, and re-checks the sequence. A torn or
//!   in-progress read is discarded and retried on the next block, which
//!   gives the "apply next block" behavior under contention.
//!
//! Last writer wins: a reader only ever sees the most recent complete set.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering, fence};

use ojd_core::BiquadCoefficients;
use parking_lot::Mutex;

use crate::coefficients::{DRIVE_BAND_COUNT, DriveCoefficients};

/// Words per coefficient set (`b0, b1, b2, a1, a2`).
const WORDS_PER_SET: usize = 5;

type Words = [[AtomicU32; WORDS_PER_SET]; DRIVE_BAND_COUNT];

/// Single-slot, lock-free coefficient mailbox.
#[derive(Debug)]
pub struct CoefficientExchange {
    /// Odd while a write is in progress. 0 means nothing published yet.
    sequence: AtomicU64,
    words: Words,
    writer: Mutex<()>,
}

impl CoefficientExchange {
    /// Empty exchange; [`read_if_newer`](Self::read_if_newer) returns `None`
    /// until the first publication.
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
            words: core::array::from_fn(|_| core::array::from_fn(|_| AtomicU32::new(0))),
            writer: Mutex::new(()),
        }
    }

    /// Publishes a new set and returns its sequence number.
    ///
    /// Control thread only. Concurrent writers queue on the internal mutex;
    /// the reader is never blocked.
    pub fn publish(&self, coeffs: &DriveCoefficients) -> u64 {
        let _guard = self.writer.lock();

        let start = self.sequence.load(Ordering::Relaxed);
        self.sequence.store(start + 1, Ordering::Relaxed);
        fence(Ordering::Release);

        for (slot, set) in self.words.iter().zip(coeffs.to_array()) {
            for (word, value) in slot.iter().zip(set_to_words(&set)) {
                word.store(value.to_bits(), Ordering::Relaxed);
            }
        }

        let published = start + 2;
        self.sequence.store(published, Ordering::Release);
        published
    }

    /// Returns the current set if one newer than `since` is fully published.
    ///
    /// Audio thread safe: no locks, no allocation, bounded work. Returns
    /// `None` when nothing new is available or when a writer is mid-update.
    pub fn read_if_newer(&self, since: u64) -> Option<(u64, DriveCoefficients)> {
        let before = self.sequence.load(Ordering::Acquire);
        if before & 1 == 1 || before == since || before == 0 {
            return None;
        }

        let mut sets = [BiquadCoefficients::IDENTITY; DRIVE_BAND_COUNT];
        for (set, slot) in sets.iter_mut().zip(&self.words) {
            let mut values = [0.0f32; WORDS_PER_SET];
            for (value, word) in values.iter_mut().zip(slot) {
                *value = f32::from_bits(word.load(Ordering::Relaxed));
            }
            *set = words_to_set(values);
        }

        fence(Ordering::Acquire);
        let after = self.sequence.load(Ordering::Relaxed);
        if before != after {
            return None;
        }

        Some((before, DriveCoefficients::from_array(sets)))
    }

    /// Sequence number of the last complete publication, 0 if none.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire) & !1
    }
}

impl Default for CoefficientExchange {
    fn default() -> Self {
        Self::new()
    }
}

fn set_to_words(set: &BiquadCoefficients) -> [f32; WORDS_PER_SET] {
    [set.b0, set.b1, set.b2, set.a1, set.a2]
}

fn words_to_set([b0, b1, b2, a1, a2]: [f32; WORDS_PER_SET]) -> BiquadCoefficients {
    BiquadCoefficients { b0, b1, b2, a1, a2 }
}
