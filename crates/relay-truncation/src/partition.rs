//! Block partitioning of prompt slots
//!
//! A partition is an ordered list of block sizes. Slots inside one block are
//! kept or discarded together.

/// Every slot is its own block.
pub fn trivial_partition(len: usize) -> Vec<usize> {
    vec![1; len]
}

/// A leading system slot on its own, then user/assistant pairs, then a lone
/// trailing slot when the turn count is odd.
pub fn turn_partition(has_system: bool, turns: usize) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(turns / 2 + 2);
    if has_system {
        sizes.push(1);
    }
    sizes.extend(std::iter::repeat(2).take(turns / 2));
    if turns % 2 == 1 {
        sizes.push(1);
    }
    sizes
}

/// Precomputed slot -> block lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIndex {
    blocks: Vec<Vec<usize>>,
    slot_to_block: Vec<usize>,
}

impl BlockIndex {
    pub fn new(partition: &[usize]) -> Self {
        let mut blocks = Vec::with_capacity(partition.len());
        let mut slot_to_block = Vec::with_capacity(partition.iter().sum());
        let mut start = 0;

        for &size in partition.iter().filter(|&&size| size > 0) {
            let block_id = blocks.len();
            blocks.push((start..start + size).collect());
            slot_to_block.extend(std::iter::repeat(block_id).take(size));
            start += size;
        }

        Self {
            blocks,
            slot_to_block,
        }
    }

    /// Number of slots covered by the partition
    pub fn len(&self) -> usize {
        self.slot_to_block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_to_block.is_empty()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// All slot indices sharing a block with `index`, in order.
    pub fn block_of(&self, index: usize) -> Option<&[usize]> {
        self.slot_to_block
            .get(index)
            .map(|&block_id| self.blocks[block_id].as_slice())
    }
}
