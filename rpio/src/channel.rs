// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! A single DMA engine channel: owns one DMA register bank, one arena,
//! and the virt->bus page table resolved for that arena.

use rpio_core::{Pacer, Result};

use crate::dma::{arena::Arena, pagemap, program, program::PageTable, pulse};
use crate::regs::dma::DmaChannel;

pub struct Channel {
    index: u32,
    dma: DmaChannel,
    arena: Arena,
    pages: PageTable,
    subcycle_us: u32,
    tick_us: u32,
    gpio_setup: u64,
}

impl Channel {
    /// Allocates the arena, resolves its physical frames, builds the
    /// cyclic CB program, and starts the DMA channel.
    pub fn init(
        index: u32,
        dma_base_addr: usize,
        tick_us: u32,
        subcycle_us: u32,
        pacer: Pacer,
    ) -> Result<Channel> {
        let num_samples = (subcycle_us / tick_us) as usize;
        let arena = Arena::new(num_samples)?;
        let pages = PageTable::resolve(&arena)?;
        program::build(&arena, &pages, pacer);

        let dma = DmaChannel::new(dma_base_addr, index);
        program::start(&dma, &arena, &pages);

        Ok(Channel {
            index,
            dma,
            arena,
            pages,
            subcycle_us,
            tick_us,
            gpio_setup: 0,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn num_samples(&self) -> u32 {
        self.arena.num_samples() as u32
    }

    pub fn subcycle_us(&self) -> u32 {
        self.subcycle_us
    }

    pub fn is_gpio_claimed(&self, gpio: u32) -> bool {
        self.gpio_setup & (1 << gpio) != 0
    }

    pub fn claim_gpio(&mut self, gpio: u32) {
        self.gpio_setup |= 1 << gpio;
    }

    pub fn release_gpio(&mut self, gpio: u32) {
        self.gpio_setup &= !(1 << gpio);
    }

    pub fn add_pulse(&self, gpio: u32, start: u32, width: u32) -> Result<()> {
        pulse::add_pulse(&self.arena, &self.pages, gpio, start, width)
    }

    pub fn clear_all(&self) {
        pulse::clear_all(&self.arena, self.tick_us);
    }

    pub fn clear_gpio(&self, gpio: u32) {
        pulse::clear_gpio(&self.arena, gpio);
    }

    /// Drains outstanding DMA and resets the channel's CS register. Safe
    /// to call more than once.
    pub fn shutdown(&self) {
        self.clear_all();
        self.dma.reset();
    }

    pub fn print(&self) {
        for i in 0..self.arena.num_cbs() {
            let cb = self.arena.cb_mut(i);
            log::info!(
                "dma{} cb[{}] ti=0x{:08x} src=0x{:08x} dst=0x{:08x} len=0x{:x} next=0x{:08x}",
                self.index,
                i,
                cb.transfer_information,
                cb.source_address,
                cb.destination_address,
                cb.transfer_length,
                cb.next_control_block,
            );
        }
    }

    /// Re-resolves a single arena page's bus address -- used if a caller
    /// needs to re-verify mapping validity without tearing the channel
    /// down. Not on the hot path.
    pub fn verify_page(&self, virt: usize) -> Result<u32> {
        pagemap::resolve_bus_address(virt)
    }
}
