//! Simulated disk: an allocation bitmap plus the block store it guards.

mod block_store;
mod sector_map;

pub use block_store::{Block, BlockStore};
pub use sector_map::SectorMap;

use crate::core::{FsError, Result, SECTOR_SIZE, utils};

/// Sector map and block store of one file system instance.
///
/// `Disk` knows nothing about files; callers hand it content and get back the
/// ordered list of sectors that now hold it.
#[derive(Debug, Clone)]
pub struct Disk {
    map: SectorMap,
    store: BlockStore,
}

impl Disk {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: SectorMap::new(capacity),
            store: BlockStore::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    pub fn used(&self) -> usize {
        self.map.used()
    }

    pub fn available(&self) -> usize {
        self.map.available()
    }

    pub fn is_allocated(&self, sector: usize) -> bool {
        self.map.is_allocated(sector)
    }

    pub fn allocated(&self) -> impl Iterator<Item = usize> + '_ {
        self.map.allocated()
    }

    /// Writes `content` into freshly allocated sectors, one per 64-byte chunk.
    /// Fails with `OutOfSpace` before allocating anything if it cannot fit.
    pub fn store(&mut self, content: &[u8]) -> Result<Vec<usize>> {
        if utils::sectors_for(content.len()) > self.available() {
            return Err(FsError::OutOfSpace);
        }
        let mut sectors = Vec::with_capacity(utils::sectors_for(content.len()));
        for chunk in content.chunks(SECTOR_SIZE) {
            let sector = self.map.allocate()?;
            self.store.write(sector, chunk)?;
            sectors.push(sector);
        }
        Ok(sectors)
    }

    /// Replaces the sectors in `old` with a fresh materialization of `content`.
    ///
    /// The space check counts `old` as reclaimable and happens before anything
    /// is freed: on `OutOfSpace` the old sectors stay allocated and intact.
    pub fn rewrite(&mut self, old: &[usize], content: &[u8]) -> Result<Vec<usize>> {
        if utils::sectors_for(content.len()) > self.available() + old.len() {
            return Err(FsError::OutOfSpace);
        }
        self.release(old)?;
        self.store(content)
    }

    pub fn release(&mut self, sectors: &[usize]) -> Result<()> {
        for &sector in sectors {
            self.map.check(sector)?;
        }
        for &sector in sectors {
            self.map.free(sector)?;
        }
        Ok(())
    }

    /// Reassembles `len` bytes from `sectors` in order.
    pub fn read(&self, sectors: &[usize], len: usize) -> Result<Vec<u8>> {
        let mut content = Vec::with_capacity(len);
        for &sector in sectors {
            let block = self.store.read(sector)?;
            let take = (len - content.len()).min(SECTOR_SIZE);
            content.extend_from_slice(&block[..take]);
        }
        Ok(content)
    }

    /// Marks every sector free. Block contents are left in place.
    pub fn reset(&mut self) {
        self.map.clear();
    }
}
