//! Mark phase: an iterative DFS from the root set over the host's object graph, grounded on
//! `gclib::gc::mark`. Line occupancy is rebuilt as a side effect of marking, since `collect()`
//! clears every block's bitmap before calling this.

use crate::block::Block;
use crate::gc::Gc;
use crate::object_model::{ObjectModel, PointerSlots};
use std::collections::HashSet;

impl<M: ObjectModel> Gc<M> {
    /// Walks every reachable object starting from the current root set, returning the set of
    /// live object addresses. Marks each live object's lines occupied on its owning block as it
    /// goes; large objects are left for the caller to reconcile against their own space.
    pub(crate) fn mark(&mut self) -> HashSet<*mut u8> {
        let mut alive: HashSet<*mut u8> = HashSet::new();
        let mut worklist: Vec<*mut u8> = Vec::new();

        for slot in self.roots() {
            let obj = unsafe { *slot };
            if !obj.is_null() {
                worklist.push(obj);
            }
        }

        while let Some(obj) = worklist.pop() {
            if !alive.insert(obj) {
                continue;
            }

            let bytes = unsafe { self.model_ref().size_of(obj) };
            if bytes <= crate::globals::BIG_OBJECT_THRESHOLD {
                let block = Block::of(obj);
                unsafe { (*block).add_object(obj, Block::align(bytes)) };
            }

            for slot in PointerSlots::new(self.model_ref(), obj) {
                let child = unsafe { *slot };
                if !child.is_null() && !alive.contains(&child) {
                    worklist.push(child);
                }
            }
        }

        alive
    }
}
