// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! DMA channel arena: one anonymous, page-locked mapping per channel
//! holding the sample array followed by the control-block program, built
//! directly against `libc::mmap`/`mlock`.

use std::ptr;

use rpio_core::constants::PAGE_SIZE;
use rpio_core::{Error, Result};

use crate::regs::dma::ControlBlock;

/// Page-locked virtual memory backing one channel's sample array and CB
/// program. `sample_ptr`/`cb_ptr` point into this mapping; the mapping is
/// released on `Drop`.
pub struct Arena {
    base: *mut u8,
    len: usize,
    num_samples: usize,
    num_cbs: usize,
}

unsafe impl Send for Arena {}

impl Arena {
    /// Allocates an arena sized for `num_samples` ticks (`2 * num_samples`
    /// control blocks).
    pub fn new(num_samples: usize) -> Result<Arena> {
        let num_cbs = num_samples * 2;
        let sample_bytes = num_samples * 4;
        let cb_bytes = num_cbs * std::mem::size_of::<ControlBlock>();
        let len = ((sample_bytes + cb_bytes + PAGE_SIZE - 1) / PAGE_SIZE) * PAGE_SIZE;

        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_LOCKED | libc::MAP_NORESERVE,
                -1,
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(Error::Allocation);
        }

        // Touch every page so the pagemap resolver sees them already
        // demand-paged in.
        let base = base as *mut u8;
        for page in 0..(len / PAGE_SIZE) {
            unsafe {
                ptr::write_volatile(base.add(page * PAGE_SIZE), 0);
            }
        }

        Ok(Arena {
            base,
            len,
            num_samples,
            num_cbs,
        })
    }

    pub fn virt_base(&self) -> usize {
        self.base as usize
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_cbs(&self) -> usize {
        self.num_cbs
    }

    pub fn sample_virt(&self, index: usize) -> usize {
        self.base as usize + index * 4
    }

    fn cb_region_offset(&self) -> usize {
        self.num_samples * 4
    }

    pub fn cb_virt(&self, index: usize) -> usize {
        self.base as usize + self.cb_region_offset() + index * std::mem::size_of::<ControlBlock>()
    }

    pub fn sample_mut(&self, index: usize) -> &mut u32 {
        debug_assert!(index < self.num_samples);
        unsafe { &mut *(self.sample_virt(index) as *mut u32) }
    }

    pub fn cb_mut(&self, index: usize) -> &mut ControlBlock {
        debug_assert!(index < self.num_cbs);
        unsafe { &mut *(self.cb_virt(index) as *mut ControlBlock) }
    }

    /// Every arena page, for the pagemap resolver to walk.
    pub fn pages(&self) -> impl Iterator<Item = usize> + '_ {
        let base = self.base as usize;
        let count = self.len / PAGE_SIZE;
        (0..count).map(move |i| base + i * PAGE_SIZE)
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        unsafe {
            libc::munlock(self.base as *mut libc::c_void, self.len);
            libc::munmap(self.base as *mut libc::c_void, self.len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_is_page_aligned() {
        let arena = Arena::new(2000).unwrap();
        assert_eq!(arena.virt_base() % PAGE_SIZE, 0);
    }

    #[test]
    fn arena_sizes_match_page_formula() {
        let num_samples = 2000;
        let arena = Arena::new(num_samples).unwrap();
        let num_cbs = num_samples * 2;
        let expected_bytes = num_cbs * 32 + num_samples * 4;
        let expected_pages = (expected_bytes + PAGE_SIZE - 1) / PAGE_SIZE;
        assert_eq!(arena.len(), expected_pages * PAGE_SIZE);
    }

    #[test]
    fn cb_region_starts_after_samples() {
        let arena = Arena::new(10).unwrap();
        assert_eq!(arena.cb_virt(0), arena.virt_base() + 40);
    }

    #[test]
    fn every_cb_stays_within_one_page() {
        let arena = Arena::new(2000).unwrap();
        for i in 0..arena.num_cbs() {
            let start = arena.cb_virt(i);
            let end = start + std::mem::size_of::<ControlBlock>() - 1;
            assert_eq!(start / PAGE_SIZE, end / PAGE_SIZE);
        }
    }
}
