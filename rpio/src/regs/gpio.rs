// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! GPIO register block: function-select, set/clear, level, and pull
//! control, addressed through an `mmap`'d base.

use core::ops::Deref;
use register::{mmio::ReadWrite, register_bitfields};

#[allow(unused)]
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum Fsel {
    In = 0b000,
    Out = 0b001,
    Alt0 = 0b100,
    Alt1 = 0b101,
    Alt2 = 0b110,
    Alt3 = 0b111,
    Alt4 = 0b011,
    Alt5 = 0b010,
}

register_bitfields! {
    u32,
    GPPUD [
        PUD OFFSET(0) NUMBITS(2) [
            Off = 0b00,
            PullDown = 0b01,
            PullUp = 0b10
        ]
    ],
    GPSET0 [
        P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9,
        P10 10, P11 11, P12 12, P13 13, P14 14, P15 15, P16 16, P17 17,
        P18 18, P19 19, P20 20, P21 21, P22 22, P23 23, P24 24, P25 25,
        P26 26, P27 27, P28 28, P29 29, P30 30, P31 31
    ],
    GPSET1 [
        P32 0, P33 1, P34 2, P35 3, P36 4, P37 5, P38 6, P39 7, P40 8,
        P41 9, P42 10, P43 11, P44 12, P45 13, P46 14, P47 15, P48 16,
        P49 17, P50 18, P51 19, P52 20, P53 21
    ]
}

#[allow(non_snake_case)]
#[repr(C)]
pub struct RegisterBlock {
    pub GPFSEL: [ReadWrite<u32>; 6],
    __reserved_0: u32,
    pub GPSET0: ReadWrite<u32, GPSET0::Register>,
    pub GPSET1: ReadWrite<u32, GPSET1::Register>,
    __reserved_1: u32,
    pub GPCLR0: ReadWrite<u32, GPSET0::Register>,
    pub GPCLR1: ReadWrite<u32, GPSET1::Register>,
    __reserved_2: u32,
    pub GPLEV0: ReadWrite<u32, GPSET0::Register>,
    pub GPLEV1: ReadWrite<u32, GPSET1::Register>,
    __reserved_3: [u32; 17],
    pub GPPUD: ReadWrite<u32, GPPUD::Register>,
    pub GPPUDCLK0: ReadWrite<u32, GPSET0::Register>,
    pub GPPUDCLK1: ReadWrite<u32, GPSET1::Register>,
}

/// Handle onto the mapped GPIO register block. `base_addr` is the address
/// `mmap` returned for the GPIO window, not a compile-time constant.
pub struct Gpio {
    base_addr: usize,
}

impl Gpio {
    pub fn new(base_addr: usize) -> Self {
        Gpio { base_addr }
    }

    fn ptr(&self) -> *const RegisterBlock {
        self.base_addr as *const _
    }

    /// Reads the 3-bit function-select field for `gpio` (0-53).
    pub fn function(&self, gpio: u32) -> u32 {
        let reg = (gpio / 10) as usize;
        let shift = (gpio % 10) * 3;
        (self.GPFSEL[reg].get() >> shift) & 0b111
    }

    /// Sets the 3-bit function-select field for `gpio`, leaving its
    /// neighbors in the same 32-bit register untouched.
    pub fn set_function(&self, gpio: u32, fsel: Fsel) {
        let reg = (gpio / 10) as usize;
        let shift = (gpio % 10) * 3;
        let mask = 0b111u32 << shift;
        let value = self.GPFSEL[reg].get();
        self.GPFSEL[reg].set((value & !mask) | ((fsel as u32) << shift));
    }

    pub fn set_high(&self, gpio: u32) {
        if gpio < 32 {
            self.GPSET0.set(1 << gpio);
        } else {
            self.GPSET1.set(1 << (gpio - 32));
        }
    }

    pub fn set_low(&self, gpio: u32) {
        if gpio < 32 {
            self.GPCLR0.set(1 << gpio);
        } else {
            self.GPCLR1.set(1 << (gpio - 32));
        }
    }

    pub fn level(&self, gpio: u32) -> bool {
        if gpio < 32 {
            self.GPLEV0.get() & (1 << gpio) != 0
        } else {
            self.GPLEV1.get() & (1 << (gpio - 32)) != 0
        }
    }

    /// Runs the BCM2835 pull-up/down handshake: write the desired pull
    /// code to `GPPUD`, wait, strobe the clock for `gpio`, wait, then
    /// clear both. The two ~150-cycle waits mirror `c_gpio.c`'s
    /// `short_wait()`, which the silicon needs to latch the value.
    pub fn set_pull(&self, gpio: u32, pud: u32) {
        self.GPPUD.set(pud);
        short_wait();
        let clock_bit = 1u32 << (gpio % 32);
        if gpio < 32 {
            self.GPPUDCLK0.set(clock_bit);
        } else {
            self.GPPUDCLK1.set(clock_bit);
        }
        short_wait();
        self.GPPUD.set(0);
        if gpio < 32 {
            self.GPPUDCLK0.set(0);
        } else {
            self.GPPUDCLK1.set(0);
        }
    }
}

fn short_wait() {
    for _ in 0..150 {
        std::hint::spin_loop();
    }
}

impl Deref for Gpio {
    type Target = RegisterBlock;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.ptr() }
    }
}
