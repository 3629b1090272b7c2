//! Acquiring and releasing the `BLOCK_SIZE`-aligned OS memory that backs each [`Block`].
//!
//! The original reaches for `std::aligned_alloc`; blocks here are allocated and freed one at a
//! time (no reserved virtual-memory arena), so `std::alloc` with an aligned `Layout` is the
//! direct idiomatic counterpart and needs no platform-specific mmap/VirtualAlloc plumbing.

use crate::block::Block;
use crate::globals::BLOCK_SIZE;
use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};

#[inline]
fn block_layout() -> Layout {
    Layout::from_size_align(BLOCK_SIZE, BLOCK_SIZE).expect("invalid block layout")
}

/// Allocates and initializes a fresh block.
pub(crate) fn alloc_block() -> *mut Block {
    let layout = block_layout();
    let mem = unsafe { alloc(layout) };
    if mem.is_null() {
        handle_alloc_error(layout);
    }
    unsafe { Block::init(mem) }
}

/// Releases a block's underlying memory. The caller must have already removed `block` from
/// every GC-owned list.
pub(crate) fn free_block(block: *mut Block) {
    unsafe { dealloc(block as *mut u8, block_layout()) }
}
