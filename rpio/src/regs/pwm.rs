// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! PWM pacer register block: the `Control`/`Status`/`DMAC` bitfields for
//! the peripheral's serializer, addressed through an `mmap`'d base.

use core::ops::Deref;
use register::{mmio::ReadWrite, register_bitfields};

register_bitfields! { u32,
    Control [
        PWEN1 OFFSET(0) NUMBITS(1) [],
        MODE1 OFFSET(1) NUMBITS(1) [],
        RPTL1 OFFSET(2) NUMBITS(1) [],
        SBIT1 OFFSET(3) NUMBITS(1) [],
        POLA1 OFFSET(4) NUMBITS(1) [],
        USEF1 OFFSET(5) NUMBITS(1) [],
        CLRF1 OFFSET(6) NUMBITS(1) [],
        MSEN1 OFFSET(7) NUMBITS(1) []
    ],
    Status [
        FULL1 OFFSET(0) NUMBITS(1) [],
        EMPT1 OFFSET(1) NUMBITS(1) [],
        WERR1 OFFSET(2) NUMBITS(1) [],
        BERR OFFSET(8) NUMBITS(1) []
    ],
    DMAC [
        DREQ OFFSET(0) NUMBITS(8) [],
        PANIC OFFSET(8) NUMBITS(8) [],
        ENAB OFFSET(31) NUMBITS(1) []
    ]
}

#[allow(non_snake_case)]
#[repr(C)]
pub struct RegisterBlock {
    pub CTL: ReadWrite<u32, Control::Register>,
    pub STA: ReadWrite<u32, Status::Register>,
    pub DMAC: ReadWrite<u32, DMAC::Register>,
    __reserved_0: u32,
    pub RNG1: ReadWrite<u32>,
    pub DAT1: ReadWrite<u32>,
    pub FIF1: ReadWrite<u32>,
}

pub struct Pwm {
    base_addr: usize,
}

impl Pwm {
    pub fn new(base_addr: usize) -> Self {
        Pwm { base_addr }
    }

    fn ptr(&self) -> *const RegisterBlock {
        self.base_addr as *const _
    }

    /// Enables channel 1 in PWM (serializer) mode, FIFO-fed, with a range
    /// chosen so one FIFO word takes `tick_us` at the 10 MHz base clock --
    /// `init_hardware()`'s `PWM_CONTROL` sequence in the original source.
    pub fn start(&self, range: u32) {
        self.RNG1.set(range);
        self.DMAC
            .write(DMAC::ENAB::SET + DMAC::PANIC.val(7) + DMAC::DREQ.val(7));
        self.CTL
            .write(Control::USEF1::SET + Control::PWEN1::SET + Control::CLRF1::SET);
    }

    pub fn stop(&self) {
        self.CTL.set(0);
        self.DMAC.set(0);
    }
}

impl Deref for Pwm {
    type Target = RegisterBlock;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.ptr() }
    }
}
