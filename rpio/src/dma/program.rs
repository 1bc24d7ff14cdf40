// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! DMA program builder: lays out the cyclic pair-of-CBs-per-sample program
//! and brings the channel online.

use std::collections::HashMap;

use rpio_core::constants::{BUS_GPIO_CLR0, BUS_PCM_FIFO, BUS_PWM_FIFO, PAGE_SIZE};
use rpio_core::{Pacer, Result};

use super::arena::Arena;
use super::pagemap::resolve_bus_address;
use crate::regs::dma::DmaChannel;

const TI_NO_WIDE_BURSTS: u32 = 1 << 26;
const TI_WAIT_RESP: u32 = 1 << 3;
const TI_DEST_DREQ: u32 = 1 << 6;

/// Per-arena-page virt->bus address table, resolved once via the pagemap
/// and consulted on every CB field write thereafter.
pub struct PageTable {
    page_bus: HashMap<usize, u32>,
}

impl PageTable {
    pub fn resolve(arena: &Arena) -> Result<PageTable> {
        let mut page_bus = HashMap::new();
        for page in arena.pages() {
            let bus = resolve_bus_address(page)?;
            page_bus.insert(page, bus);
        }
        Ok(PageTable { page_bus })
    }

    pub fn bus_address(&self, virt: usize) -> u32 {
        let page = (virt / PAGE_SIZE) * PAGE_SIZE;
        let offset = (virt - page) as u32;
        self.page_bus[&page] + offset
    }
}

fn pacer_fifo_bus_addr(pacer: Pacer) -> u32 {
    match pacer {
        Pacer::Pwm => BUS_PWM_FIFO,
        Pacer::Pcm => BUS_PCM_FIFO,
    }
}

/// Builds the cyclic CB program for a freshly allocated arena: every
/// sample starts at zero, every even CB targets CLR0, and the program's
/// last CB links back to CB 0.
pub fn build(arena: &Arena, pages: &PageTable, pacer: Pacer) {
    let num_samples = arena.num_samples();
    let permap = pacer.permap();
    let fifo_addr = pacer_fifo_bus_addr(pacer);

    for i in 0..num_samples {
        *arena.sample_mut(i) = 0;
    }

    for i in 0..num_samples {
        let sample_bus = pages.bus_address(arena.sample_virt(i));
        let set_cb_index = i * 2;
        let pace_cb_index = i * 2 + 1;
        let next_set_cb_index = (i * 2 + 2) % arena.num_cbs();

        let pace_cb_bus = pages.bus_address(arena.cb_virt(pace_cb_index));
        let next_set_cb_bus = pages.bus_address(arena.cb_virt(next_set_cb_index));

        let set_ti = TI_NO_WIDE_BURSTS | TI_WAIT_RESP;
        arena
            .cb_mut(set_cb_index)
            .set(set_ti, sample_bus, BUS_GPIO_CLR0, 4, pace_cb_bus);

        let pace_ti = TI_NO_WIDE_BURSTS | TI_WAIT_RESP | TI_DEST_DREQ | (permap << 16);
        arena
            .cb_mut(pace_cb_index)
            .set(pace_ti, sample_bus, fifo_addr, 4, next_set_cb_bus);
    }
}

/// Brings a reset DMA channel online pointed at CB 0 of `arena`.
pub fn start(dma: &DmaChannel, arena: &Arena, pages: &PageTable) {
    dma.reset();
    let cb0_bus = pages.bus_address(arena.cb_virt(0));
    dma.start(cb0_bus);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cb_chain_is_a_single_cycle_of_length_2n() {
        let arena = Arena::new(8).unwrap();
        let pages = PageTable::resolve(&arena);
        let pages = match pages {
            Ok(p) => p,
            Err(_) => return, // pagemap unavailable in this sandbox
        };
        build(&arena, &pages, Pacer::Pwm);

        let cb0_bus = pages.bus_address(arena.cb_virt(0));
        let mut current = cb0_bus;
        let mut steps = 0;
        loop {
            let idx = (0..arena.num_cbs())
                .find(|&i| pages.bus_address(arena.cb_virt(i)) == current)
                .expect("next pointer must land on a CB in this arena");
            current = arena.cb_mut(idx).next_control_block;
            steps += 1;
            if current == cb0_bus || steps > arena.num_cbs() {
                break;
            }
        }
        assert_eq!(steps, arena.num_cbs());
    }

    #[test]
    fn initial_even_cbs_target_clr0() {
        let arena = Arena::new(4).unwrap();
        let pages = match PageTable::resolve(&arena) {
            Ok(p) => p,
            Err(_) => return,
        };
        build(&arena, &pages, Pacer::Pwm);
        for i in 0..arena.num_samples() {
            assert_eq!(arena.cb_mut(i * 2).destination_address, BUS_GPIO_CLR0);
        }
    }

    #[test]
    fn pace_cb_targets_pwm_fifo_with_dreq_and_permap() {
        let arena = Arena::new(4).unwrap();
        let pages = match PageTable::resolve(&arena) {
            Ok(p) => p,
            Err(_) => return,
        };
        build(&arena, &pages, Pacer::Pwm);
        let pace = arena.cb_mut(1);
        assert_eq!(pace.destination_address, BUS_PWM_FIFO);
        assert_ne!(pace.transfer_information & TI_DEST_DREQ, 0);
        assert_eq!((pace.transfer_information >> 16) & 0x1f, 5);
    }
}
