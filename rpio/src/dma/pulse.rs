// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Pulse editor: hot-patches a live channel's sample array and CB
//! destinations to add or remove one GPIO's pulse window.

use std::thread;
use std::time::Duration;

use rpio_core::constants::BUS_GPIO_CLR0;
use rpio_core::{Error, Result};

use super::arena::Arena;
use super::program::PageTable;

/// Adds GPIO `gpio`'s pulse window `[start, start+width]` to a channel's
/// program. `start + width` must not exceed `num_samples - 1`.
pub fn add_pulse(arena: &Arena, pages: &PageTable, gpio: u32, start: u32, width: u32) -> Result<()> {
    let num_samples = arena.num_samples() as u32;
    if start as u64 + width as u64 > (num_samples - 1) as u64 {
        return Err(Error::Width {
            start,
            width,
            num_samples,
        });
    }
    let end = start + width;
    let bit = 1u32 << gpio;

    *arena.sample_mut(start as usize) |= bit;
    set_cb_destination(arena, pages, start, bus_addr_set0());

    for i in (start + 1)..end {
        *arena.sample_mut(i as usize) &= !bit;
    }

    *arena.sample_mut(end as usize) |= bit;

    Ok(())
}

fn bus_addr_set0() -> u32 {
    rpio_core::constants::BUS_GPIO_SET0
}

fn set_cb_destination(arena: &Arena, _pages: &PageTable, sample_index: u32, bus_addr: u32) {
    let cb_index = sample_index as usize * 2;
    arena.cb_mut(cb_index).destination_address = bus_addr;
}

/// Resets every CB destination in the channel to CLR0 and zeros the
/// sample array, after giving the DMA engine one subcycle to observe the
/// CB change.
pub fn clear_all(arena: &Arena, tick_us: u32) {
    for i in 0..arena.num_samples() {
        arena.cb_mut(i * 2).destination_address = BUS_GPIO_CLR0;
    }
    thread::sleep(Duration::from_micros(
        (tick_us as u64) * arena.num_samples() as u64,
    ));
    for i in 0..arena.num_samples() {
        *arena.sample_mut(i) = 0;
    }
}

/// Masks `gpio`'s bit out of every sample, leaving CB destinations
/// untouched since other GPIOs may still rely on them. The caller is
/// responsible for driving the line low afterward, since this function
/// only has access to the sample array, not the GPIO register block.
pub fn clear_gpio(arena: &Arena, gpio: u32) {
    let bit = 1u32 << gpio;
    for i in 0..arena.num_samples() {
        *arena.sample_mut(i) &= !bit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::program::{self, PageTable};
    use rpio_core::Pacer;

    fn setup_arena(num_samples: usize) -> Option<(Arena, PageTable)> {
        let arena = Arena::new(num_samples).unwrap();
        let pages = PageTable::resolve(&arena).ok()?;
        program::build(&arena, &pages, Pacer::Pwm);
        Some((arena, pages))
    }

    #[test]
    fn sample_bit_invariant_holds_after_add_pulse() {
        let Some((arena, pages)) = setup_arena(2000) else {
            return;
        };
        add_pulse(&arena, &pages, 17, 0, 100).unwrap();
        let bit = 1u32 << 17;
        assert_ne!(*arena.sample_mut(0) & bit, 0);
        assert_ne!(*arena.sample_mut(100) & bit, 0);
        for i in 1..100 {
            assert_eq!(*arena.sample_mut(i) & bit, 0);
        }
    }

    #[test]
    fn range_rejection_leaves_samples_untouched() {
        let Some((arena, pages)) = setup_arena(2000) else {
            return;
        };
        let before: Vec<u32> = (0..arena.num_samples()).map(|i| *arena.sample_mut(i)).collect();
        let result = add_pulse(&arena, &pages, 17, 1999, 2);
        assert!(matches!(result, Err(Error::Width { .. })));
        let after: Vec<u32> = (0..arena.num_samples()).map(|i| *arena.sample_mut(i)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn clear_gpio_for_channel_masks_bit_everywhere() {
        let Some((arena, pages)) = setup_arena(2000) else {
            return;
        };
        add_pulse(&arena, &pages, 17, 0, 100).unwrap();
        add_pulse(&arena, &pages, 17, 500, 50).unwrap();
        clear_gpio(&arena, 17);
        let bit = 1u32 << 17;
        for i in 0..arena.num_samples() {
            assert_eq!(*arena.sample_mut(i) & bit, 0);
        }
    }
}
