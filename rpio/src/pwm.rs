// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! PWM facet: the public channel-control operations layered over the
//! process-wide engine.

use log::LevelFilter;

use rpio_core::{Direction, Error, Pacer, Result};

use crate::engine::{self, state_ops, Config, ConfigBuilder};
use crate::regs::gpio::Fsel;

pub use crate::engine::ConfigBuilder as Builder;

/// One-shot process setup: maps peripherals, brings no pacer hardware up
/// yet (that happens lazily on the first `init_channel`), and installs the
/// signal trap. A second call fails `already-setup`.
pub fn setup(tick_us: u32, pacer: Pacer) -> Result<()> {
    let config = ConfigBuilder::new().tick_us(tick_us).pacer(pacer).build();
    engine::setup(config)
}

/// Setup with the full configuration surface, for callers that need
/// `soft_fatal`/`warnings`/`default_subcycle_us` control beyond the
/// two-argument `setup`.
pub fn setup_with_config(config: Config) -> Result<()> {
    engine::setup(config)
}

pub fn cleanup() -> Result<()> {
    engine::shutdown()
}

pub fn is_setup() -> bool {
    engine::is_setup()
}

/// Allocates and starts a channel's DMA program.
pub fn init_channel(channel: u32, subcycle_us: u32) -> Result<()> {
    engine::with_state(|state| state_ops::init_channel(state, channel, subcycle_us))
}

pub fn is_channel_initialized(channel: u32) -> Result<bool> {
    engine::with_state(|state| Ok(state_ops::is_channel_initialized(state, channel)))
}

/// Returns every CB destination in `channel` to CLR0 and zeros its sample
/// array.
pub fn clear_channel(channel: u32) -> Result<()> {
    engine::with_state(|state| {
        let ch = state_ops::channel(state, channel)?;
        ch.clear_all();
        Ok(())
    })
}

/// Masks `bcm`'s bit out of every sample in `channel` and drives it low,
/// leaving other GPIOs' CB destinations untouched.
pub fn clear_channel_gpio(channel: u32, bcm: u32) -> Result<()> {
    engine::with_state(|state| {
        if !state_ops::is_pwm_gpio_claimed(state, bcm) {
            return Err(Error::GpioNotSetup(bcm));
        }
        let ch = state_ops::channel_mut(state, channel)?;
        ch.clear_gpio(bcm);
        ch.release_gpio(bcm);
        state_ops::gpio(state).set_low(bcm);
        state_ops::release_pwm_gpio(state, bcm);
        Ok(())
    })
}

/// Adds `bcm`'s pulse window `[start, start+width]` to `channel`. Claims
/// the GPIO for the PWM engine on first use (drive low, set output
/// function, mark its `gpio_setup` bit).
pub fn add_channel_pulse(channel: u32, bcm: u32, start_tick: u32, width_ticks: u32) -> Result<()> {
    engine::with_state(|state| {
        if !state_ops::is_pwm_gpio_claimed(state, bcm) {
            state_ops::warn_if_foreign_function(state, bcm);
            let gpio = state_ops::gpio(state);
            gpio.set_low(bcm);
            gpio.set_function(bcm, Fsel::Out);
            state_ops::claim_pwm_gpio(state, bcm);
            state_ops::set_pin_mode(state, bcm, Some(Direction::Output));
        }
        let ch = state_ops::channel_mut(state, channel)?;
        ch.add_pulse(bcm, start_tick, width_ticks)?;
        ch.claim_gpio(bcm);
        Ok(())
    })
}

pub fn print_channel(channel: u32) -> Result<()> {
    engine::with_state(|state| {
        let ch = state_ops::channel(state, channel)?;
        ch.print();
        Ok(())
    })
}

pub fn set_loglevel(level: LevelFilter) {
    if let Some(logger) = crate::logger::installed() {
        logger.set_level(level);
    }
}

pub fn get_pulse_incr_us() -> Result<u32> {
    engine::with_state(|state| Ok(state_ops::config(state).tick_us))
}

pub fn get_channel_subcycle_time_us(channel: u32) -> Result<u32> {
    engine::with_state(|state| {
        let ch = state_ops::channel(state, channel)
            .map_err(|_| Error::Uninitialized(channel))?;
        Ok(ch.subcycle_us())
    })
}
