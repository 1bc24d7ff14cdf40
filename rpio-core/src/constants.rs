// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

// BCM2708 ARM Peripherals - peripheral base addresses (ARM physical view,
// as seen through /dev/mem).

/// Default ARM-view physical base for the peripheral block on BCM2708/BCM2835
/// boards (Pi 1, Pi 2, Zero). Newer SoCs relocate this; callers that need
/// that support can override it, but revisions 1 and 2 (this crate's scope)
/// always sit here.
pub const PERI_BASE: usize = 0x2000_0000;

pub const GPIO_OFFSET: usize = 0x0020_0000;
pub const GPIO_LEN: usize = 0x100;

pub const DMA_OFFSET: usize = 0x0000_7000;
pub const DMA_LEN: usize = 0x24;
pub const DMA_CHANNEL_STRIDE: usize = 0x100;
pub const DMA_CHANNEL_MAX: u32 = 14;

pub const PWM_OFFSET: usize = 0x0020_C000;
pub const PWM_LEN: usize = 0x28;

pub const PCM_OFFSET: usize = 0x0020_3000;
pub const PCM_LEN: usize = 0x24;

pub const CLK_OFFSET: usize = 0x0010_1000;
pub const CLK_LEN: usize = 0xA8;

pub const PAGE_SIZE: usize = 4096;
pub const PAGE_SHIFT: u32 = 12;

/// Bus-view (DMA-visible) physical addresses: the 0x7e-prefixed addresses
/// the DMA engine's interconnect uses, distinct from the ARM-view addresses
/// above that /dev/mem maps through.
pub const BUS_GPIO_SET0: u32 = 0x7e20_001c;
pub const BUS_GPIO_CLR0: u32 = 0x7e20_0028;
pub const BUS_PWM_FIFO: u32 = 0x7e20_c018;
pub const BUS_PCM_FIFO: u32 = 0x7e20_3004;

/// OR-ed onto a resolved physical frame address for uncached DMA access.
pub const UNCACHED_ALIAS: u32 = 0x4000_0000;

/// PLLD-derived clock source feeding both PWM's and PCM's dividers, and the
/// divisor that yields a 10 MHz base (500 MHz / 50).
pub const CLOCK_SOURCE_PLLD: u32 = 6;
pub const CLOCK_DIVISOR: u32 = 50;
pub const CLOCK_PASSWORD: u32 = 0x5a;

pub const DEFAULT_TICK_US: u32 = 10;
pub const DEFAULT_SUBCYCLE_US: u32 = 20_000;
pub const MIN_SUBCYCLE_US: u32 = 3_000;

/// Pagemap present-bit mask and value used to confirm a page is resident
/// before trusting its physical frame number. This diverges from the
/// kernel-documented bit-63 present flag; kept as-is pending verification
/// against the running kernel's actual pagemap encoding.
pub const PAGEMAP_PRESENT_MASK: u64 = 0x1bf;
pub const PAGEMAP_PRESENT_VALUE: u64 = 0x10c;
pub const PAGEMAP_PFN_SHIFT: u32 = 55;
