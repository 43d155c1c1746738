//! Variable numbering for SAT encodings
//!
//! A [`VariableCodec`] maps a tuple of bounded indices to a dense positive
//! integer using a row-major mixed radix (the last dimension varies fastest)
//! and back. A [`VariableSpace`] lays several codecs end to end so that one
//! formula can hold different kinds of variables (worker positions, box
//! positions, actions, ...) without gaps between the blocks.

use crate::error::{PuzzleError, PuzzleResult};

/// Mixed-radix bijection between index tuples and `1..=size`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableCodec {
    bounds: Vec<usize>,
    strides: Vec<usize>,
    size: usize,
}

impl VariableCodec {
    /// Create a codec for the given dimension sizes
    pub fn new(bounds: &[usize]) -> PuzzleResult<Self> {
        if bounds.is_empty() {
            return Err(PuzzleError::invalid("a variable codec needs at least one dimension"));
        }
        if let Some(pos) = bounds.iter().position(|&b| b == 0) {
            return Err(PuzzleError::invalid(format!("dimension {} has an empty domain", pos)));
        }

        let mut strides = vec![1usize; bounds.len()];
        let mut size = 1usize;
        for i in (0..bounds.len()).rev() {
            strides[i] = size;
            size = size
                .checked_mul(bounds[i])
                .filter(|&s| s <= i32::MAX as usize)
                .ok_or_else(|| PuzzleError::invalid(format!("variable space {:?} is too large", bounds)))?;
        }

        Ok(Self {
            bounds: bounds.to_vec(),
            strides,
            size,
        })
    }

    /// Encode an index tuple: `1 + Σ index_i * Π_{j>i} bound_j`
    pub fn encode(&self, indices: &[usize]) -> PuzzleResult<i32> {
        if indices.len() != self.bounds.len() {
            return Err(PuzzleError::internal(format!(
                "expected {} indices, got {}",
                self.bounds.len(),
                indices.len()
            )));
        }

        let mut id = 0usize;
        for ((&index, &bound), &stride) in indices.iter().zip(&self.bounds).zip(&self.strides) {
            if index >= bound {
                return Err(PuzzleError::OutOfRange {
                    value: index as i64,
                    limit: bound as i64,
                });
            }
            id += index * stride;
        }

        Ok(id as i32 + 1)
    }

    /// Inverse of [`encode`](Self::encode)
    pub fn decode(&self, id: i32) -> PuzzleResult<Vec<usize>> {
        if id < 1 || id as usize > self.size {
            return Err(PuzzleError::OutOfRange {
                value: id as i64,
                limit: self.size as i64,
            });
        }

        let mut rest = id as usize - 1;
        let mut indices = Vec::with_capacity(self.bounds.len());
        for &stride in &self.strides {
            indices.push(rest / stride);
            rest %= stride;
        }
        Ok(indices)
    }

    /// Number of distinct ids, `Π bounds`
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Handle to a block inside a [`VariableSpace`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

#[derive(Debug, Clone)]
struct VariableBlock {
    name: String,
    offset: usize,
    codec: VariableCodec,
}

/// Consecutive named codec blocks sharing one dense id range
#[derive(Debug, Clone, Default)]
pub struct VariableSpace {
    blocks: Vec<VariableBlock>,
}

impl VariableSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block; its ids start right after the previous block's last id
    pub fn add_block(&mut self, name: &str, bounds: &[usize]) -> PuzzleResult<BlockId> {
        if self.blocks.iter().any(|b| b.name == name) {
            return Err(PuzzleError::internal(format!("variable block '{}' declared twice", name)));
        }

        let codec = VariableCodec::new(bounds)?;
        let offset = self.variable_count();
        if offset + codec.size() > i32::MAX as usize {
            return Err(PuzzleError::invalid("variable space exceeds the literal range"));
        }

        self.blocks.push(VariableBlock {
            name: name.to_string(),
            offset,
            codec,
        });
        Ok(BlockId(self.blocks.len() - 1))
    }

    /// Variable id of `indices` inside `block`
    pub fn var(&self, block: BlockId, indices: &[usize]) -> PuzzleResult<i32> {
        let block = self.block(block)?;
        Ok(block.offset as i32 + block.codec.encode(indices)?)
    }

    /// Find the block owning `id` and decode the index tuple inside it
    pub fn decode(&self, id: i32) -> PuzzleResult<(BlockId, Vec<usize>)> {
        if id < 1 || id as usize > self.variable_count() {
            return Err(PuzzleError::OutOfRange {
                value: id as i64,
                limit: self.variable_count() as i64,
            });
        }

        let position = self
            .blocks
            .iter()
            .rposition(|b| b.offset < id as usize)
            .ok_or_else(|| PuzzleError::internal(format!("no block owns variable {}", id)))?;
        let block = &self.blocks[position];
        let indices = block.codec.decode(id - block.offset as i32)?;
        Ok((BlockId(position), indices))
    }

    /// Human-readable name such as `worker[3,5]`
    pub fn describe(&self, id: i32) -> PuzzleResult<String> {
        let (block, indices) = self.decode(id)?;
        let parts: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
        Ok(format!("{}[{}]", self.blocks[block.0].name, parts.join(",")))
    }

    /// Total number of variables across all blocks
    pub fn variable_count(&self) -> usize {
        self.blocks.iter().map(|b| b.codec.size()).sum()
    }

    fn block(&self, block: BlockId) -> PuzzleResult<&VariableBlock> {
        self.blocks
            .get(block.0)
            .ok_or_else(|| PuzzleError::internal(format!("unknown variable block {}", block.0)))
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        VariableStatistics {
            total_variables: self.variable_count(),
            blocks: self
                .blocks
                .iter()
                .map(|b| (b.name.clone(), b.codec.size()))
                .collect(),
        }
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub blocks: Vec<(String, usize)>,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        for (name, size) in &self.blocks {
            writeln!(f, "  {} variables: {}", name, size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::collections::HashSet;

    #[test]
    fn test_round_trip_all_tuples() {
        let codec = VariableCodec::new(&[3, 4, 5]).unwrap();
        assert_eq!(codec.size(), 60);

        for tuple in (0..3).cartesian_product(0..4).cartesian_product(0..5) {
            let ((a, b), c) = tuple;
            let id = codec.encode(&[a, b, c]).unwrap();
            assert_eq!(codec.decode(id).unwrap(), vec![a, b, c]);
        }

        for id in 1..=60 {
            let tuple = codec.decode(id).unwrap();
            assert_eq!(codec.encode(&tuple).unwrap(), id);
        }
    }

    #[test]
    fn test_no_collisions() {
        let codec = VariableCodec::new(&[4, 3, 2]).unwrap();
        let mut seen = HashSet::new();
        for a in 0..4 {
            for b in 0..3 {
                for c in 0..2 {
                    assert!(seen.insert(codec.encode(&[a, b, c]).unwrap()));
                }
            }
        }
        assert_eq!(seen.len(), 24);
        assert_eq!(*seen.iter().min().unwrap(), 1);
        assert_eq!(*seen.iter().max().unwrap(), 24);
    }

    #[test]
    fn test_last_dimension_varies_fastest() {
        let codec = VariableCodec::new(&[9, 9, 9]).unwrap();
        // (r-1)*81 + (c-1)*9 + v with 1-based r, c, v
        assert_eq!(codec.encode(&[0, 0, 0]).unwrap(), 1);
        assert_eq!(codec.encode(&[0, 0, 8]).unwrap(), 9);
        assert_eq!(codec.encode(&[0, 1, 0]).unwrap(), 10);
        assert_eq!(codec.encode(&[8, 8, 8]).unwrap(), 729);
        assert_eq!(codec.encode(&[4, 2, 6]).unwrap(), 4 * 81 + 2 * 9 + 7);
    }

    #[test]
    fn test_out_of_range() {
        let codec = VariableCodec::new(&[2, 2]).unwrap();
        assert!(matches!(codec.encode(&[2, 0]), Err(PuzzleError::OutOfRange { .. })));
        assert!(matches!(codec.decode(0), Err(PuzzleError::OutOfRange { .. })));
        assert!(matches!(codec.decode(5), Err(PuzzleError::OutOfRange { .. })));
        assert!(matches!(codec.decode(-3), Err(PuzzleError::OutOfRange { .. })));
        assert!(matches!(codec.encode(&[1]), Err(PuzzleError::EncodingInternal { .. })));
    }

    #[test]
    fn test_empty_domains_rejected() {
        assert!(VariableCodec::new(&[]).is_err());
        assert!(matches!(
            VariableCodec::new(&[3, 0]),
            Err(PuzzleError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_space_offsets_follow_block_order() {
        let (horizon, cells) = (15usize, 11usize);
        let mut space = VariableSpace::new();
        let worker = space.add_block("worker", &[horizon + 1, cells]).unwrap();
        let boxes = space.add_block("box", &[horizon + 1, cells]).unwrap();
        let action = space.add_block("action", &[horizon, 4]).unwrap();

        assert_eq!(space.variable_count(), 2 * 16 * 11 + 15 * 4);
        assert_eq!(space.var(worker, &[0, 6]).unwrap(), 7);
        assert_eq!(space.var(worker, &[3, 2]).unwrap(), (3 * 11 + 2 + 1) as i32);
        assert_eq!(space.var(boxes, &[0, 0]).unwrap(), (16 * 11 + 1) as i32);
        assert_eq!(space.var(action, &[2, 3]).unwrap(), (2 * 16 * 11 + 2 * 4 + 3 + 1) as i32);
    }

    #[test]
    fn test_space_decode_round_trip() {
        let mut space = VariableSpace::new();
        space.add_block("a", &[2, 3]).unwrap();
        space.add_block("b", &[4]).unwrap();
        space.add_block("c", &[1, 2]).unwrap();

        for id in 1..=space.variable_count() as i32 {
            let (block, indices) = space.decode(id).unwrap();
            assert_eq!(space.var(block, &indices).unwrap(), id);
        }
        assert_eq!(space.describe(7).unwrap(), "b[0]");
        assert_eq!(space.describe(12).unwrap(), "c[0,1]");
        assert!(space.decode(13).is_err());
    }

    #[test]
    fn test_duplicate_block_rejected() {
        let mut space = VariableSpace::new();
        space.add_block("cell", &[2]).unwrap();
        assert!(space.add_block("cell", &[3]).is_err());
    }

    #[test]
    fn test_statistics() {
        let mut space = VariableSpace::new();
        space.add_block("vertex_color", &[4, 3]).unwrap();

        let stats = space.statistics();
        assert_eq!(stats.total_variables, 12);
        assert_eq!(stats.blocks, vec![("vertex_color".to_string(), 12)]);
        assert!(stats.to_string().contains("vertex_color variables: 12"));
    }
}
