//! Full engine-block benchmarks.
//!
//! These model the actual per-callback cost: a whole polyphonic block
//! with every voice sounding, and a tape-loop block with the source
//! recording into the loop.

mod tape;
mod voices;

pub use tape::bench_tape_loop;
pub use voices::bench_poly_engine;
