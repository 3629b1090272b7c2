//! The large-object fallback path (`gclib`'s `big_objects` list, `LargeObjectSpace` in the
//! teacher crate). Each oversize object gets its own `malloc`'d region; the GC never moves or
//! subdivides it, it only tracks and eventually frees it.

use std::collections::HashSet;

pub(crate) struct LargeObjectSpace {
    allocations: Vec<*mut u8>,
}

impl LargeObjectSpace {
    pub(crate) fn new() -> Self {
        Self {
            allocations: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.allocations.len()
    }

    /// Allocates `bytes` of untracked memory and records it as live.
    pub(crate) fn alloc(&mut self, bytes: usize) -> *mut u8 {
        let ptr = unsafe { libc::malloc(bytes) } as *mut u8;
        if ptr.is_null() {
            panic!("out of memory: large object allocation of {bytes} bytes failed");
        }
        self.allocations.push(ptr);
        ptr
    }

    /// Frees every allocation not present in `alive`.
    pub(crate) fn sweep(&mut self, alive: &HashSet<*mut u8>) {
        self.allocations.retain(|ptr| {
            if alive.contains(ptr) {
                true
            } else {
                unsafe { libc::free(*ptr as *mut libc::c_void) };
                false
            }
        });
    }
}

impl Drop for LargeObjectSpace {
    fn drop(&mut self) {
        for ptr in self.allocations.drain(..) {
            unsafe { libc::free(ptr as *mut libc::c_void) };
        }
    }
}
