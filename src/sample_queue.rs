//! Lock-free handoff of mono samples from the audio callback to the UI thread.
//!
//! The queue is a single-producer/single-consumer ring. The producer half
//! lives on the real-time thread and the consumer half on the thread that
//! owns the FFT engine. Neither side ever waits on the other: when the
//! consumer falls behind, new samples are dropped and counted.

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::utils::MIN_FFT_SIZE;

/// Creates a queue holding at least `capacity` samples.
///
/// The capacity is rounded up to a power of two (never below 16).
pub fn sample_queue(capacity: usize) -> (SampleProducer, SampleConsumer) {
    let capacity = capacity.max(MIN_FFT_SIZE).next_power_of_two();
    let (prod, cons) = HeapRb::<f32>::new(capacity).split();
    (
        SampleProducer { inner: prod, dropped: 0 },
        SampleConsumer { inner: cons },
    )
}

/// Write side of the sample queue. Owned by the audio thread.
pub struct SampleProducer {
    inner: HeapProd<f32>,
    dropped: u64,
}

impl SampleProducer {
    /// Pushes one sample. Returns false if the queue was full and the sample
    /// was dropped. Never blocks and never allocates.
    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        match self.inner.try_push(sample) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.wrapping_add(1);
                false
            }
        }
    }

    /// Mono-sums a block of planar channels and pushes one sample per frame.
    ///
    /// Channels of unequal length are truncated to the shortest one.
    /// Returns the number of samples accepted by the queue.
    pub fn push_block(&mut self, channels: &[&[f32]]) -> usize {
        if channels.is_empty() {
            return 0;
        }
        let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        let scale = 1.0 / channels.len() as f32;

        let mut accepted = 0;
        for s in 0..frames {
            let sum: f32 = channels.iter().map(|c| c[s]).sum();
            if self.push(sum * scale) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Samples dropped because the consumer lagged.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity().get()
    }

    /// Free slots as currently visible to the producer.
    pub fn vacant(&self) -> usize {
        self.inner.vacant_len()
    }
}

/// Read side of the sample queue. Owned by the UI / idle thread.
pub struct SampleConsumer {
    inner: HeapCons<f32>,
}

impl SampleConsumer {
    /// Pops every available sample in FIFO order, calling `visit` on each.
    /// Returns how many samples were drained.
    pub fn drain<F>(&mut self, mut visit: F) -> usize
    where
        F: FnMut(f32),
    {
        let mut count = 0;
        for sample in self.inner.pop_iter() {
            visit(sample);
            count += 1;
        }
        count
    }

    /// Samples ready to be drained.
    pub fn available(&self) -> usize {
        self.inner.occupied_len()
    }

    /// Discards everything currently queued. Returns the number discarded.
    pub fn clear(&mut self) -> usize {
        self.inner.clear()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity().get()
    }
}
