//! Selective compacting relocation, grounded on `gclib::gc::collect`'s evacuation pass
//! (`blocks_by_holes`, `to_compact`, `compacted_obj_outside_refs`, `transfer_map`).
//!
//! Only the most fragmented blocks are evacuated, capped by `block_compact_ratio`. Every live
//! object in a chosen block is copied into a fresh destination range; references are rewritten
//! in two passes, since a relocated object's internal pointers may target another object that
//! has not been relocated yet at the time it is copied.

use crate::block::Block;
use crate::block_allocator::alloc_block;
use crate::gc::Gc;
use crate::object_model::{ObjectModel, PointerSlots};
use std::collections::{HashMap, HashSet};
use std::ptr::null_mut;

/// What a compaction pass did, surfaced through [`crate::stats::GcStats`].
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CompactionSummary {
    pub(crate) blocks_freed: usize,
    pub(crate) blocks_allocated: usize,
}

/// Bump-allocates evacuation destinations exclusively out of freshly allocated blocks — never
/// into a surviving block's leftover holes. Mirrors `Gc`'s own bump/add_block pair, but keeps its
/// cursor private to the compaction pass and its own list of newly allocated blocks, so it never
/// needs to borrow `Gc` itself while copying (the caller still needs immutable access to the
/// object model and the root set during that loop). Destination blocks' line bitmaps are left
/// exactly as `alloc_block` initialized them; they are fully re-marked the next time `mark` runs.
struct Evacuator {
    current: Option<*mut Block>,
    bump: *mut u8,
    bump_end: *mut u8,
    new_blocks: Vec<*mut Block>,
}

impl Evacuator {
    fn new() -> Self {
        Self {
            current: None,
            bump: null_mut(),
            bump_end: null_mut(),
            new_blocks: Vec::new(),
        }
    }

    fn alloc(&mut self, bytes: usize) -> *mut u8 {
        loop {
            if !self.bump.is_null() {
                let space = self.bump_end as usize - self.bump as usize;
                if bytes <= space {
                    let out = self.bump;
                    self.bump = unsafe { self.bump.add(bytes) };
                    return out;
                }
            }

            match self.current {
                Some(block) if !unsafe { (*block).is_full() } => {
                    let (begin, end) = unsafe { (*block).next_range() };
                    self.bump = begin;
                    self.bump_end = end;
                }
                _ => {
                    let fresh = alloc_block();
                    self.new_blocks.push(fresh);
                    self.current = Some(fresh);
                    let (begin, end) = unsafe { (*fresh).next_range() };
                    self.bump = begin;
                    self.bump_end = end;
                }
            }
        }
    }
}

impl<M: ObjectModel> Gc<M> {
    /// Evacuates the most fragmented blocks, if any are worth evacuating, and returns a summary
    /// of what moved. `alive` is the object set produced by [`Gc::mark`].
    pub(crate) fn compact(&mut self, alive: &HashSet<*mut u8>) -> Option<CompactionSummary> {
        let mut ranked: Vec<(*mut Block, usize)> = self
            .blocks()
            .iter()
            .map(|&b| (b, unsafe { (*b).count_holes() }))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let with_holes = ranked.iter().filter(|&&(_, holes)| holes > 1).count();
        if with_holes == 0 {
            return None;
        }
        let budget = self.blocks().len() / self.compact_ratio();
        let to_compact_count = budget.min(with_holes);
        if to_compact_count == 0 {
            return None;
        }

        let to_compact: Vec<*mut Block> = ranked[..to_compact_count].iter().map(|&(b, _)| b).collect();
        let to_compact_set: HashSet<*mut Block> = to_compact.iter().copied().collect();
        for (i, &block) in to_compact.iter().enumerate() {
            unsafe { (*block).flag = i };
        }

        // Large objects live outside the block allocator entirely; only block-resident objects
        // in a chosen block are ever evacuated.
        let is_moving = |obj: *mut u8| -> bool {
            let size = unsafe { self.model_ref().size_of(obj) };
            size <= crate::globals::BIG_OBJECT_THRESHOLD && to_compact_set.contains(&Block::of(obj))
        };

        let to_move: Vec<*mut u8> = alive.iter().copied().filter(|&obj| is_moving(obj)).collect();

        // Referrers outside the evacuated set: roots, plus pointer slots of objects that are
        // staying put (block-resident or not). Rewritten the moment their target is copied.
        let mut external_refs: HashMap<*mut u8, Vec<*mut *mut u8>> = HashMap::new();
        for slot in self.roots() {
            let target = unsafe { *slot };
            if !target.is_null() && is_moving(target) {
                external_refs.entry(target).or_default().push(slot);
            }
        }
        for &obj in alive {
            if is_moving(obj) {
                continue;
            }
            for slot in PointerSlots::new(self.model_ref(), obj) {
                let target = unsafe { *slot };
                if !target.is_null() && is_moving(target) {
                    external_refs.entry(target).or_default().push(slot);
                }
            }
        }

        let mut transfer: HashMap<*mut u8, *mut u8> = HashMap::new();
        let mut evac = Evacuator::new();
        for &obj in &to_move {
            let bytes = Block::align(unsafe { self.model_ref().size_of(obj) });
            let dest = evac.alloc(bytes);
            unsafe { std::ptr::copy_nonoverlapping(obj, dest, bytes) };

            if let Some(referrers) = external_refs.remove(&obj) {
                for slot in referrers {
                    unsafe { *slot = dest };
                }
            }
            transfer.insert(obj, dest);
        }

        for &new_obj in transfer.values() {
            for slot in PointerSlots::new(self.model_ref(), new_obj) {
                let target = unsafe { *slot };
                if let Some(&new_target) = transfer.get(&target) {
                    unsafe { *slot = new_target };
                }
            }
        }

        let blocks_allocated = evac.new_blocks.len();
        self.blocks_mut().extend(evac.new_blocks);

        let mut remove_at: Vec<usize> = to_compact
            .iter()
            .filter_map(|&b| self.blocks().iter().position(|&x| x == b))
            .collect();
        remove_at.sort_unstable_by(|a, b| b.cmp(a));
        let blocks_freed = remove_at.len();
        for idx in remove_at {
            let block = self.blocks_mut().remove(idx);
            self.free_source_block(block);
        }

        Some(CompactionSummary {
            blocks_freed,
            blocks_allocated,
        })
    }
}
