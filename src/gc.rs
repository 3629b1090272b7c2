//! The collector itself: `Gc<M>` ties together the block allocator, the large-object space, the
//! root registry and the collection cycle. Grounded on `gclib::gc` (the template class) and, for
//! the surrounding Rust shape, on the teacher crate's `Heap`/`GcBase` split.

use crate::block::Block;
use crate::block_allocator::{alloc_block, free_block};
use crate::globals::{GcConfig, BIG_OBJECT_THRESHOLD};
use crate::large_space::LargeObjectSpace;
use crate::object_model::ObjectModel;
use crate::roots::Root;
use crate::stats::GcStats;
use std::collections::HashSet;
use std::ptr::null_mut;

pub struct Gc<M: ObjectModel> {
    model: M,
    config: GcConfig,

    blocks: Vec<*mut Block>,
    big_objects: LargeObjectSpace,

    bump: *mut u8,
    bump_end: *mut u8,
    free_blocks_list: Vec<*mut Block>,

    roots: HashSet<*mut *mut u8>,

    object_count: u64,
    collect_counter: usize,

    stats: GcStats,
}

impl<M: ObjectModel> Gc<M> {
    pub fn new(model: M) -> Self {
        Self::with_config(model, GcConfig::default())
    }

    pub fn with_config(model: M, config: GcConfig) -> Self {
        let collect_counter = config.block_collect_factor;
        Self {
            model,
            config,
            blocks: Vec::new(),
            big_objects: LargeObjectSpace::new(),
            bump: null_mut(),
            bump_end: null_mut(),
            free_blocks_list: Vec::new(),
            roots: HashSet::new(),
            object_count: 0,
            collect_counter,
            stats: GcStats::default(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    // ---- allocation -----------------------------------------------------

    /// Allocates at least `bytes` bytes, aligned to `MAX_ALIGN`. May trigger a `collect()`.
    pub fn alloc(&mut self, bytes: usize) -> *mut u8 {
        self.collect_counter -= 1;
        if self.collect_counter == 0 {
            self.collect_counter = self.config.block_collect_factor * self.blocks.len().max(1);
            self.collect();
        }
        self.object_count += 1;

        let bytes = Block::align(bytes);
        if bytes > BIG_OBJECT_THRESHOLD {
            self.big_objects.alloc(bytes)
        } else {
            loop {
                if self.bump.is_null() {
                    self.add_block();
                    if let Some(ptr) = self.alloc_in_bump(bytes) {
                        return ptr;
                    }
                    continue;
                }
                if let Some(ptr) = self.alloc_in_bump(bytes) {
                    return ptr;
                }
                self.next_bump();
            }
        }
    }

    /// Allocates uninitialized storage for a `T`. The caller must write a value before the next
    /// safepoint (`alloc`/`collect`/a host-visible GC operation).
    pub fn alloc_typed<T>(&mut self) -> *mut T {
        self.alloc(std::mem::size_of::<T>()) as *mut T
    }

    /// Allocates a `T`, moves `value` into place, and returns a scoped root for it.
    pub fn root_new<T>(&mut self, value: T) -> Root<T, M> {
        let ptr = self.alloc_typed::<T>();
        unsafe {
            ptr.write(value);
            Root::new(ptr, self as *mut Self)
        }
    }

    fn alloc_in_bump(&mut self, bytes: usize) -> Option<*mut u8> {
        let space = self.bump_end as usize - self.bump as usize;
        if bytes < space {
            let out = self.bump;
            self.bump = unsafe { self.bump.add(bytes) };
            Some(out)
        } else if bytes == space {
            let out = self.bump;
            self.next_bump();
            Some(out)
        } else {
            None
        }
    }

    fn next_bump(&mut self) {
        match self.free_blocks_list.last() {
            None => {
                self.bump = null_mut();
                self.bump_end = null_mut();
            }
            Some(&block) => {
                let (begin, end) = unsafe { (*block).next_range() };
                self.bump = begin;
                self.bump_end = end;
                if unsafe { (*block).is_full() } {
                    self.free_blocks_list.pop();
                }
            }
        }
    }

    fn add_block(&mut self) {
        let block = alloc_block();
        self.blocks.push(block);
        let (begin, end) = unsafe { (*block).next_range() };
        self.bump = begin;
        self.bump_end = end;
    }

    // ---- roots ------------------------------------------------------------

    /// Registers `slot` as a GC root.
    ///
    /// # Safety
    /// `slot` must remain valid and readable for as long as it stays registered; the pointer
    /// stored there must be null or the start address of a live GC-managed object.
    pub unsafe fn add_root(&mut self, slot: *mut *mut u8) {
        self.roots.insert(slot);
    }

    /// Deregisters `slot`. A no-op if it was not registered.
    ///
    /// # Safety
    /// `slot` must be a value previously passed to [`Gc::add_root`] and not already removed.
    pub unsafe fn remove_root(&mut self, slot: *mut *mut u8) {
        self.roots.remove(&slot);
    }

    /// Moves a registration from `from` to `to`, as when a root handle relocates.
    ///
    /// # Safety
    /// Same requirements as [`Gc::add_root`]/[`Gc::remove_root`], applied to `to`/`from`
    /// respectively.
    pub unsafe fn move_root(&mut self, from: *mut *mut u8, to: *mut *mut u8) {
        self.remove_root(from);
        self.add_root(to);
    }

    pub(crate) fn roots(&self) -> impl Iterator<Item = *mut *mut u8> + '_ {
        self.roots.iter().copied()
    }

    // ---- collection ---------------------------------------------------------

    /// Runs a full clear -> mark -> sweep -> (optional compact) -> rearm cycle.
    pub fn collect(&mut self) {
        for &block in &self.blocks {
            unsafe { (*block).clear() };
        }

        let alive = self.mark();

        self.big_objects.sweep(&alive);

        let compaction = if self.blocks.len() > self.config.block_compact_ratio {
            self.compact(&alive)
        } else {
            None
        };

        self.free_blocks_list.clear();
        for &block in &self.blocks {
            unsafe {
                (*block).prepare();
                if !(*block).is_full() {
                    self.free_blocks_list.push(block);
                }
            }
        }

        self.bump = null_mut();
        self.bump_end = null_mut();
        self.next_bump();

        self.object_count = alive.len() as u64;
        self.stats.record_cycle(
            self.blocks.len(),
            self.big_objects.len(),
            alive.len(),
            compaction,
        );
    }

    pub(crate) fn free_source_block(&mut self, block: *mut Block) {
        free_block(block);
    }

    pub(crate) fn blocks(&self) -> &[*mut Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<*mut Block> {
        &mut self.blocks
    }

    pub(crate) fn model_ref(&self) -> &M {
        &self.model
    }

    pub(crate) fn compact_ratio(&self) -> usize {
        self.config.block_compact_ratio
    }

    // ---- statistics -----------------------------------------------------

    pub fn live_object_count(&self) -> u64 {
        self.object_count
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn big_object_count(&self) -> usize {
        self.big_objects.len()
    }

    pub fn stats(&self) -> GcStats {
        self.stats
    }
}

impl<M: ObjectModel> Drop for Gc<M> {
    fn drop(&mut self) {
        for &block in &self.blocks {
            free_block(block);
        }
    }
}
