// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Peripheral mapper: maps BCM2708 register blocks out of `/dev/mem` into
//! the process address space.

use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;

use memmap2::{MmapMut, MmapOptions};
use rpio_core::constants::{
    CLK_LEN, CLK_OFFSET, DMA_CHANNEL_STRIDE, DMA_LEN, DMA_OFFSET, GPIO_LEN, GPIO_OFFSET, PCM_LEN,
    PCM_OFFSET, PERI_BASE, PWM_LEN, PWM_OFFSET,
};
use rpio_core::{Error, Result};

/// Maps a single BCM2708 register window. Each call opens its own
/// `/dev/mem` descriptor and closes it immediately after mapping -- the
/// mapping itself outlives the descriptor.
fn map(phys_addr: u64, len: usize) -> Result<MmapMut> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open("/dev/mem")
        .map_err(Error::DeviceAccess)?;
    unsafe {
        MmapOptions::new()
            .offset(phys_addr)
            .len(len)
            .map_mut(&file)
            .map_err(Error::Mmap)
    }
}

/// The peripheral blocks this crate needs, mapped once at `setup()` time.
pub struct Peripherals {
    pub gpio: MmapMut,
    pub pwm: MmapMut,
    pub pcm: MmapMut,
    pub clk: MmapMut,
}

impl Peripherals {
    pub fn map() -> Result<Peripherals> {
        let base = PERI_BASE as u64;
        let gpio = map(base + GPIO_OFFSET as u64, GPIO_LEN)?;
        let pwm = map(base + PWM_OFFSET as u64, PWM_LEN)?;
        let pcm = map(base + PCM_OFFSET as u64, PCM_LEN)?;
        let clk = map(base + CLK_OFFSET as u64, CLK_LEN)?;
        log::debug!("mapped GPIO/PWM/PCM/CLK peripherals at ARM base 0x{:08x}", base);
        Ok(Peripherals {
            gpio,
            pwm,
            pcm,
            clk,
        })
    }

    pub fn gpio_base(&self) -> usize {
        self.gpio.as_ptr() as usize
    }

    pub fn pwm_base(&self) -> usize {
        self.pwm.as_ptr() as usize
    }

    pub fn pcm_base(&self) -> usize {
        self.pcm.as_ptr() as usize
    }

    pub fn clk_base(&self) -> usize {
        self.clk.as_ptr() as usize
    }
}

/// Maps one DMA engine channel's register bank. Matches the original
/// source's "new mapping per channel, offset by 0x100 * channel index"
/// layout rather than one shared DMA block, since the kernel only exposes
/// `/dev/mem` a page at a time and channels are claimed independently.
pub fn map_dma_channel(channel: u32) -> Result<MmapMut> {
    let base = (PERI_BASE + DMA_OFFSET + channel as usize * DMA_CHANNEL_STRIDE) as u64;
    map(base, DMA_LEN)
}
