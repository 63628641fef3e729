//! Region (bump) allocator.
//!
//! A `Region` hands out raw storage by bumping an offset through a list of
//! chunks. Individual allocations are never freed; the whole region is
//! released when its owning arena is dropped. Allocation failure is fatal by
//! policy: a compiler has no recovery path for allocator exhaustion, so the
//! process aborts (Rust's default out-of-memory behavior) rather than
//! returning null.
//!
//! References into the region are `(chunk, offset)` handles instead of raw
//! pointers, which keeps the crate free of `unsafe`.

use lyra_common::limits::{REGION_CHUNK_SIZE, REGION_MAX_ALIGN};

/// A handle to storage allocated from a [`Region`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegionRef {
    chunk: u32,
    offset: u32,
    len: u32,
}

impl RegionRef {
    /// Length of the allocation in bytes.
    #[inline]
    pub fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// A bump allocator over fixed-size chunks.
pub struct Region {
    chunks: Vec<Vec<u8>>,
    /// Bump offset within the last chunk.
    cursor: usize,
    chunk_size: usize,
    /// Total bytes handed out, including side-table storage charged by the
    /// interning tables that share this region's lifetime.
    bytes_allocated: usize,
}

impl Region {
    pub fn new() -> Region {
        Region::with_chunk_size(REGION_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Region {
        assert!(chunk_size > 0, "region chunk size must be nonzero");
        Region {
            chunks: Vec::new(),
            cursor: 0,
            chunk_size,
            bytes_allocated: 0,
        }
    }

    /// Allocate `size` bytes with the given alignment.
    ///
    /// Never returns an invalid handle. A zero-size request is served as an
    /// empty slice at the current cursor. Alignment must be a power of two
    /// no larger than [`REGION_MAX_ALIGN`]; anything else is a programmer
    /// error and panics.
    pub fn allocate(&mut self, size: usize, align: usize) -> RegionRef {
        assert!(
            align.is_power_of_two() && align <= REGION_MAX_ALIGN,
            "invalid region alignment: {align}"
        );

        let aligned = align_up(self.cursor, align);
        let fits = self
            .chunks
            .last()
            .is_some_and(|chunk| aligned + size <= chunk.len());

        if !fits {
            // Oversized requests get a dedicated chunk.
            let chunk_len = self.chunk_size.max(size);
            self.chunks.push(vec![0u8; chunk_len]);
            self.cursor = 0;
        }

        let offset = align_up(self.cursor, align);
        self.cursor = offset + size;
        self.bytes_allocated += size;

        RegionRef {
            chunk: (self.chunks.len() - 1) as u32,
            offset: offset as u32,
            len: size as u32,
        }
    }

    /// Read access to an allocation.
    pub fn bytes(&self, r: RegionRef) -> &[u8] {
        let chunk = &self.chunks[r.chunk as usize];
        &chunk[r.offset as usize..(r.offset + r.len) as usize]
    }

    /// Write access to an allocation.
    pub fn bytes_mut(&mut self, r: RegionRef) -> &mut [u8] {
        let chunk = &mut self.chunks[r.chunk as usize];
        &mut chunk[r.offset as usize..(r.offset + r.len) as usize]
    }

    /// Account for node storage owned by side tables that share this
    /// region's lifetime (interned keys, payload lists).
    ///
    /// Keeps `bytes_allocated` an honest measure of what the arena holds
    /// even though the uniquing tables store their payloads in their own
    /// vectors.
    pub(crate) fn charge(&mut self, bytes: usize) {
        self.bytes_allocated += bytes;
    }

    /// Total bytes allocated from this region, for memory-usage reporting.
    #[inline]
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }
}

impl Default for Region {
    fn default() -> Region {
        Region::new()
    }
}

#[inline]
fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}

#[cfg(test)]
#[path = "tests/arena_tests.rs"]
mod tests;
