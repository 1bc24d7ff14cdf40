// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! PWM/PCM pacer bring-up: produces one DREQ per tick off a 10 MHz base
//! derived from the 500 MHz PLLD.

use std::thread;
use std::time::Duration;

use rpio_core::constants::{CLOCK_DIVISOR, CLOCK_SOURCE_PLLD};
use rpio_core::Pacer;

use crate::regs::clock::{Clock, ClockInstance};
use crate::regs::pcm::Pcm;
use crate::regs::pwm::Pwm;

const SETTLE: Duration = Duration::from_micros(100);

/// Starts the selected pacer so it raises DREQ once every `tick_us`
/// microseconds. `clk_base`/`pwm_base`/`pcm_base` are the mmap'd bases
/// for the CLK/PWM/PCM peripheral windows.
pub fn start(pacer: Pacer, tick_us: u32, clk_base: usize, pwm_base: usize, pcm_base: usize) {
    match pacer {
        Pacer::Pwm => start_pwm(tick_us, clk_base, pwm_base),
        Pacer::Pcm => start_pcm(tick_us, clk_base, pcm_base),
    }
}

fn start_pwm(tick_us: u32, clk_base: usize, pwm_base: usize) {
    let pwm = Pwm::new(pwm_base);
    pwm.stop();
    thread::sleep(SETTLE);

    let clock = Clock::new(clk_base, ClockInstance::Pwm);
    clock.start(CLOCK_SOURCE_PLLD, CLOCK_DIVISOR);
    thread::sleep(SETTLE);

    pwm.start(tick_us * 10);
    thread::sleep(SETTLE);
}

fn start_pcm(tick_us: u32, clk_base: usize, pcm_base: usize) {
    let pcm = Pcm::new(pcm_base);
    pcm.stop();
    thread::sleep(SETTLE);

    let clock = Clock::new(clk_base, ClockInstance::Pcm);
    clock.start(CLOCK_SOURCE_PLLD, CLOCK_DIVISOR);
    thread::sleep(SETTLE);

    let frame_bits = tick_us * 10 - 1;
    pcm.start(frame_bits);
    thread::sleep(SETTLE);
}

pub fn stop(pacer: Pacer, pwm_base: usize, pcm_base: usize) {
    match pacer {
        Pacer::Pwm => Pwm::new(pwm_base).stop(),
        Pacer::Pcm => Pcm::new(pcm_base).stop(),
    }
}
