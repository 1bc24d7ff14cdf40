// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Physical-page resolver: turns a virtual address inside the locked DMA
//! arena into the bus address the DMA engine needs to chase, by reading
//! `/proc/self/pagemap`.

use std::convert::TryInto;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use rpio_core::constants::{
    PAGEMAP_PFN_SHIFT, PAGEMAP_PRESENT_MASK, PAGEMAP_PRESENT_VALUE, PAGE_SHIFT, PAGE_SIZE,
    UNCACHED_ALIAS,
};
use rpio_core::{Error, Result};

/// One `/proc/self/pagemap` entry is 8 bytes, one per virtual page.
const PAGEMAP_ENTRY_BYTES: u64 = 8;

/// Resolves the bus address backing the page at `virt_addr`. `virt_addr`
/// must point into a page the caller has already locked with `mlock` --
/// an unlocked, swappable page can change physical frame out from under
/// the DMA engine.
///
/// The present-bit check uses the `0x1bf`/`0x10c` mask/value pair rather
/// than the kernel-documented `bit 63` present flag -- see DESIGN.md's
/// Open Questions entry.
pub fn resolve_bus_address(virt_addr: usize) -> Result<u32> {
    let page_index = virt_addr / PAGE_SIZE;
    let page_offset = (virt_addr % PAGE_SIZE) as u32;

    let mut pagemap = File::open("/proc/self/pagemap").map_err(Error::DeviceAccess)?;
    pagemap
        .seek(SeekFrom::Start(page_index as u64 * PAGEMAP_ENTRY_BYTES))
        .map_err(Error::DeviceAccess)?;
    let mut buf = [0u8; 8];
    pagemap.read_exact(&mut buf).map_err(Error::DeviceAccess)?;
    let entry = u64::from_le_bytes(buf);

    if (entry >> PAGEMAP_PFN_SHIFT) & PAGEMAP_PRESENT_MASK != PAGEMAP_PRESENT_VALUE {
        return Err(Error::PageNotPresent {
            page: page_index,
            entry,
        });
    }

    let pfn = entry & ((1u64 << PAGEMAP_PFN_SHIFT) - 1);
    let phys_page = pfn << PAGE_SHIFT;
    let phys_addr = phys_page | page_offset as u64;
    let bus_addr = (phys_addr | UNCACHED_ALIAS as u64)
        .try_into()
        .map_err(|_| Error::PageNotPresent {
            page: page_index,
            entry,
        })?;
    Ok(bus_addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_stack_page_resolves_to_some_bus_address() {
        let x = 0u8;
        let addr = &x as *const u8 as usize;
        match resolve_bus_address(addr) {
            Ok(bus) => assert!(bus & UNCACHED_ALIAS != 0),
            Err(Error::PageNotPresent { .. }) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
}
