//! Global heap for the control plane
//!
//! This is the **ONLY** module in the board crate that touches `static mut`
//! memory. `node-core` keeps configuration documents, sample buffers and
//! encoded batches on the heap; everything else lives in statics or task
//! futures.
//!
//! # Memory Budget (STM32F405RG, 128 KB SRAM)
//!
//! ```text
//! Heap:                      64 KB
//! ├─ Sample buffer:          up to ~24 bytes per sample
//! ├─ Encoded batch:          up to the 8 KB packet limit
//! ├─ Config documents:       up to 4 KB each
//! └─ Outbound queue:         2 pending publishes
//! MQTT session buffers:      16 KB (network task future)
//! TCP socket buffers:         8 KB (network task future)
//! ```

// The heap region is handed to the allocator exactly once, so this module
// opts out of the crate-wide `deny(unsafe_code)`.
#![allow(unsafe_code)]
#![deny(warnings)]

use core::sync::atomic::{AtomicBool, Ordering};

use linked_list_allocator::LockedHeap;

const HEAP_BYTES: usize = 64 * 1024;

static mut HEAP: [u8; HEAP_BYTES] = [0; HEAP_BYTES];
static HEAP_INITIALISED: AtomicBool = AtomicBool::new(false);

#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Hand the reserved region to the allocator
///
/// Must run in `init`, before anything allocates. Later calls are no-ops.
pub fn init() {
    if HEAP_INITIALISED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        // SAFETY: HEAP is only ever referenced here, and the compare-exchange
        // above guarantees this block runs once.
        unsafe {
            let heap_ptr = core::ptr::addr_of_mut!(HEAP).cast::<u8>();
            ALLOCATOR.lock().init(heap_ptr, HEAP_BYTES);
        }
    }
}
