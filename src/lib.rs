//! Click-and-drag planet sandbox.
//!
//! Pressing the pointer spawns a small planet that keeps growing while the
//! button is held; dragging sets the launch velocity (away from the pointer)
//! and releasing lets it go. Every tick each live planet is pulled by every
//! other one, and planets that touch merge into one.

use peak_alloc::PeakAlloc;

pub mod body;
pub mod config;
pub mod drawing;
pub mod interaction;
pub mod rendering;
pub mod universe;
pub mod vector;
pub mod world;

#[global_allocator]
static PEAK_ALLOC: PeakAlloc = PeakAlloc;

/// Highest heap use seen so far, in megabytes.
pub fn peak_memory_mb() -> f32 {
    PEAK_ALLOC.peak_usage_as_mb()
}
