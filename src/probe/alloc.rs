//! Heap accounting through a counting global allocator.
//!
//! The binary installs [`CountingAllocator`] with `#[global_allocator]`. Every
//! allocation and release adjusts a live byte counter, and the largest value the
//! counter has reached is kept as the heap high-water mark. When the allocator
//! is not installed both counters stay at zero.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);

/// Global allocator wrapping [`System`] with byte counters.
pub struct CountingAllocator;

#[inline]
fn record_grow(bytes: usize) {
    let live = LIVE_BYTES.fetch_add(bytes, Ordering::Relaxed) + bytes;
    PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
}

#[inline]
fn record_shrink(bytes: usize) {
    LIVE_BYTES.fetch_sub(bytes, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record_grow(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_grow(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        record_shrink(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        // On failure the original block is untouched
        if !new_ptr.is_null() {
            let old_size = layout.size();
            if new_size > old_size {
                record_grow(new_size - old_size);
            } else {
                record_shrink(old_size - new_size);
            }
        }
        new_ptr
    }
}

/// Snapshot of the allocator counters, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub live_bytes: u64,
    pub peak_bytes: u64,
}

impl HeapStats {
    pub fn current() -> Self {
        Self {
            live_bytes: LIVE_BYTES.load(Ordering::Relaxed) as u64,
            peak_bytes: PEAK_BYTES.load(Ordering::Relaxed) as u64,
        }
    }
}
