use crate::core::{FsError, Result, SECTOR_SIZE};

pub type Block = [u8; SECTOR_SIZE];

const EMPTY_BLOCK: Block = [0; SECTOR_SIZE];

/// Simulated block device: fixed-length blocks addressed by sector index.
///
/// Blocks are materialized lazily; writing past the current end grows the
/// store with empty blocks, up to `capacity` and never beyond.
#[derive(Debug, Clone)]
pub struct BlockStore {
    capacity: usize,
    blocks: Vec<Block>,
}

impl BlockStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            blocks: Vec::new(),
        }
    }

    /// Writes `chunk` at the start of `sector`; the rest of the block is zeroed.
    pub fn write(&mut self, sector: usize, chunk: &[u8]) -> Result<()> {
        self.check(sector)?;
        if chunk.len() > SECTOR_SIZE {
            return Err(FsError::ChunkTooLarge { len: chunk.len() });
        }
        if sector >= self.blocks.len() {
            self.blocks.resize(sector + 1, EMPTY_BLOCK);
        }
        let block = &mut self.blocks[sector];
        block[..chunk.len()].copy_from_slice(chunk);
        block[chunk.len()..].fill(0);
        Ok(())
    }

    /// Returns the block stored at `sector`. Never written blocks read as zeros.
    pub fn read(&self, sector: usize) -> Result<&Block> {
        self.check(sector)?;
        Ok(self.blocks.get(sector).unwrap_or(&EMPTY_BLOCK))
    }

    /// Number of blocks materialized so far.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn check(&self, sector: usize) -> Result<()> {
        if sector >= self.capacity {
            return Err(FsError::InvalidSector {
                sector,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
