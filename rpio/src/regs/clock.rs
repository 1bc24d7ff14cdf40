// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! PLLD-derived clock generator for the PWM/PCM pacers, narrowed to the
//! two instances this crate needs.

use core::ops::Deref;
use register::{mmio::ReadWrite, register_bitfields};

use rpio_core::constants::CLOCK_PASSWORD;

#[allow(unused)]
#[derive(Copy, Clone)]
pub enum ClockInstance {
    Pcm = 19,
    Pwm = 20,
}

register_bitfields! {
    u32,
    Control [
        SRC OFFSET(0) NUMBITS(4) [],
        ENAB OFFSET(4) NUMBITS(1) [],
        KILL OFFSET(5) NUMBITS(1) [],
        BUSY OFFSET(7) NUMBITS(1) [],
        MASH OFFSET(9) NUMBITS(2) [],
        PASSWD OFFSET(24) NUMBITS(8) []
    ],
    Divisor [
        DIVF OFFSET(0) NUMBITS(12) [],
        DIVI OFFSET(12) NUMBITS(12) [],
        PASSWD OFFSET(24) NUMBITS(8) []
    ]
}

#[allow(non_snake_case)]
#[repr(C)]
pub struct RegisterBlock {
    pub CTL: ReadWrite<u32, Control::Register>,
    pub DIV: ReadWrite<u32, Divisor::Register>,
}

pub struct Clock {
    base_addr: usize,
}

impl Clock {
    pub fn new(base_addr: usize, instance: ClockInstance) -> Self {
        Clock {
            base_addr: base_addr + (instance as usize) * 0x8,
        }
    }

    fn ptr(&self) -> *const RegisterBlock {
        self.base_addr as *const _
    }

    /// Kills the clock generator first (if running), then sets divisor
    /// `div_i` against PLLD and re-enables it -- the handshake
    /// `init_hardware()` uses before touching `DIV` on a live clock.
    pub fn start(&self, source: u32, div_i: u32) {
        if self.CTL.is_set(Control::BUSY) {
            self.CTL
                .write(Control::PASSWD.val(CLOCK_PASSWORD) + Control::KILL::SET);
            while self.CTL.is_set(Control::BUSY) {
                std::hint::spin_loop();
            }
        }
        self.DIV.write(
            Divisor::DIVI.val(div_i) + Divisor::DIVF.val(0) + Divisor::PASSWD.val(CLOCK_PASSWORD),
        );
        self.CTL.write(
            Control::MASH.val(1)
                + Control::SRC.val(source)
                + Control::PASSWD.val(CLOCK_PASSWORD),
        );
        self.CTL.write(
            Control::ENAB::SET
                + Control::MASH.val(1)
                + Control::SRC.val(source)
                + Control::PASSWD.val(CLOCK_PASSWORD),
        );
    }

    pub fn stop(&self) {
        self.CTL
            .write(Control::PASSWD.val(CLOCK_PASSWORD) + Control::KILL::SET);
        while self.CTL.is_set(Control::BUSY) {
            std::hint::spin_loop();
        }
    }
}

impl Deref for Clock {
    type Target = RegisterBlock;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.ptr() }
    }
}
