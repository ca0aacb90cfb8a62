//! Lock-free oscilloscope tap.
//!
//! The render path pushes each block into an SPSC ring buffer; a display
//! thread pulls the most recent window on its own schedule. Pushes never
//! block and never allocate; when the display falls behind, the oldest
//! samples are simply dropped (last-write-wins). Neither side takes a lock.

use rtrb::{Consumer, Producer, RingBuffer};

/// Create a connected writer/reader pair. `window` is the number of
/// samples the reader keeps for display.
pub fn scope(window: usize) -> (ScopeWriter, ScopeReader) {
    let window = window.max(1);
    // Headroom so a slow reader does not immediately starve the writer.
    let (tx, rx) = RingBuffer::new(window * 4);
    (
        ScopeWriter { tx },
        ScopeReader {
            rx,
            ring: vec![0.0; window],
            ordered: vec![0.0; window],
            pos: 0,
            filled: 0,
        },
    )
}

/// Render-path half. Owned by an engine, fed once per block.
pub struct ScopeWriter {
    tx: Producer<f32>,
}

impl ScopeWriter {
    /// Push a mono mixdown of a stereo block. Samples that do not fit are
    /// dropped.
    pub fn push_stereo(&mut self, left: &[f32], right: &[f32]) {
        for (l, r) in left.iter().zip(right.iter()) {
            let _ = self.tx.push(0.5 * (l + r));
        }
    }

    /// Push mono samples directly.
    pub fn push(&mut self, samples: &[f32]) {
        for &sample in samples {
            let _ = self.tx.push(sample);
        }
    }
}

/// Display-side half. Call `latest` to get the newest window of samples,
/// oldest first.
pub struct ScopeReader {
    rx: Consumer<f32>,
    ring: Vec<f32>,
    ordered: Vec<f32>,
    pos: usize,
    filled: usize,
}

impl ScopeReader {
    pub fn latest(&mut self) -> &[f32] {
        while let Ok(sample) = self.rx.pop() {
            self.ring[self.pos] = sample;
            self.pos = (self.pos + 1) % self.ring.len();
            self.filled = (self.filled + 1).min(self.ring.len());
        }

        self.ordered.clear();
        if self.filled == self.ring.len() {
            self.ordered.extend_from_slice(&self.ring[self.pos..]);
            self.ordered.extend_from_slice(&self.ring[..self.pos]);
        } else {
            self.ordered.extend_from_slice(&self.ring[..self.filled]);
        }
        &self.ordered
    }

    pub fn window(&self) -> usize {
        self.ring.len()
    }
}
