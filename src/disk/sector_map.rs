use crate::core::{FsError, Result};

/// Allocation bitmap of a fixed number of sectors.
///
/// Allocation is first fit: the lowest free index is always handed out, which
/// keeps the layout deterministic and lets defragmentation pack from zero.
#[derive(Debug, Clone)]
pub struct SectorMap {
    used: Vec<bool>,
}

impl SectorMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            used: vec![false; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.used.len()
    }

    /// Marks the lowest free sector as used and returns its index.
    pub fn allocate(&mut self) -> Result<usize> {
        let sector = self
            .used
            .iter()
            .position(|&used| !used)
            .ok_or(FsError::OutOfSpace)?;
        self.used[sector] = true;
        Ok(sector)
    }

    pub fn free(&mut self, sector: usize) -> Result<()> {
        self.check(sector)?;
        self.used[sector] = false;
        Ok(())
    }

    pub fn is_allocated(&self, sector: usize) -> bool {
        self.used.get(sector).copied().unwrap_or(false)
    }

    pub fn used(&self) -> usize {
        self.used.iter().filter(|&&used| used).count()
    }

    pub fn available(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Frees every sector at once.
    pub fn clear(&mut self) {
        self.used.fill(false);
    }

    /// Indices of all allocated sectors in ascending order.
    pub fn allocated(&self) -> impl Iterator<Item = usize> + '_ {
        self.used
            .iter()
            .enumerate()
            .filter_map(|(sector, &used)| used.then_some(sector))
    }

    pub(crate) fn check(&self, sector: usize) -> Result<()> {
        if sector >= self.capacity() {
            return Err(FsError::InvalidSector {
                sector,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_first_fit() -> Result<()> {
        let mut map = SectorMap::new(4);
        assert_eq!(map.allocate()?, 0);
        assert_eq!(map.allocate()?, 1);
        assert_eq!(map.allocate()?, 2);

        map.free(1)?;
        assert_eq!(map.allocate()?, 1);
        assert_eq!(map.allocate()?, 3);
        Ok(())
    }

    #[test]
    fn test_allocate_out_of_space() -> Result<()> {
        let mut map = SectorMap::new(2);
        map.allocate()?;
        map.allocate()?;
        assert_eq!(map.allocate(), Err(FsError::OutOfSpace));
        assert_eq!(map.used(), 2);
        assert_eq!(map.available(), 0);
        Ok(())
    }

    #[test]
    fn test_free_invalid_sector() {
        let mut map = SectorMap::new(3);
        let result = map.free(3);
        assert_eq!(
            result,
            Err(FsError::InvalidSector {
                sector: 3,
                capacity: 3
            })
        );
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("invalid sector number")
        );
    }

    #[test]
    fn test_clear_and_allocated() -> Result<()> {
        let mut map = SectorMap::new(5);
        for _ in 0..4 {
            map.allocate()?;
        }
        map.free(0)?;
        map.free(2)?;
        assert_eq!(map.allocated().collect::<Vec<_>>(), vec![1, 3]);
        assert!(map.is_allocated(1));
        assert!(!map.is_allocated(2));
        assert!(!map.is_allocated(99));

        map.clear();
        assert_eq!(map.used(), 0);
        assert_eq!(map.available(), 5);
        Ok(())
    }
}
