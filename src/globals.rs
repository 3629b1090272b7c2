//! Compile-time tuning constants and the runtime override layer on top of them.

use std::mem::align_of;

/// Size in bytes of a single line, the unit of occupancy tracking inside a block.
pub const LINE_SIZE: usize = 128;
/// Size in bytes of a block, the unit of OS allocation. Must be `LINE_SIZE * 64 * k`.
pub const BLOCK_SIZE: usize = 256 * LINE_SIZE;
/// Allocations larger than this bypass the block allocator and go to the large-object space.
pub const BIG_OBJECT_THRESHOLD: usize = BLOCK_SIZE / 4;

const _: () = assert!(BLOCK_SIZE % (LINE_SIZE * 64) == 0);
const _: () = assert!(BIG_OBJECT_THRESHOLD <= BLOCK_SIZE);

/// Number of lines in a block.
pub const LINES_PER_BLOCK: usize = BLOCK_SIZE / LINE_SIZE;
/// Number of 64-line groups per block; `free[LINE_GROUPS]` is the per-block bitmap.
pub const LINE_GROUPS: usize = LINES_PER_BLOCK / 64;

/// Default multiplier applied to the block count to derive the allocation counter that
/// triggers the next collection.
pub const DEFAULT_BLOCK_COLLECT_FACTOR: usize = 128;
/// Default block-count threshold above which `collect` considers compaction, and the
/// denominator used to cap how many blocks get evacuated in one cycle.
pub const DEFAULT_BLOCK_COMPACT_RATIO: usize = 20;

/// Every allocation is rounded up to this alignment, matching `max_align_t` in the original.
pub const MAX_ALIGN: usize = align_of::<u128>();

#[inline]
pub(crate) const fn round_up(bytes: usize, align: usize) -> usize {
    (bytes + align - 1) / align * align
}

/// Per-instance overrides of the compile-time constants above.
///
/// Unlike `line_size`/`block_size`/`big_object_threshold`, which determine block layout and
/// therefore cannot vary per instance, the collection cadence and compaction aggressiveness are
/// just tuning knobs, so a host can dial them in without recompiling.
#[derive(Debug, Clone, Copy)]
pub struct GcConfig {
    pub block_collect_factor: usize,
    pub block_compact_ratio: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            block_collect_factor: DEFAULT_BLOCK_COLLECT_FACTOR,
            block_compact_ratio: DEFAULT_BLOCK_COMPACT_RATIO,
        }
    }
}

impl GcConfig {
    /// Start from the defaults and override the collection-trigger factor.
    pub fn with_block_collect_factor(mut self, factor: usize) -> Self {
        self.block_collect_factor = factor;
        self
    }

    /// Start from the defaults and override the compaction ratio.
    pub fn with_block_compact_ratio(mut self, ratio: usize) -> Self {
        self.block_compact_ratio = ratio;
        self
    }
}
