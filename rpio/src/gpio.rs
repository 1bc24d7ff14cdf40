// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! GPIO facet: direct pin control, implemented as thin views over the
//! process-wide engine.

use rpio_core::{Direction, Error, Level, Numbering, Pull, Result};

use crate::engine::{self, state_ops};
use crate::regs::gpio::Fsel;

/// Selects which numbering scheme subsequent calls translate channel
/// numbers through.
pub fn setmode(numbering: Numbering) -> Result<()> {
    engine::with_state(|state| {
        state_ops::setmode(state, numbering);
        Ok(())
    })
}

/// Claims `channel` for `direction`, applying `pull` and (for outputs) an
/// initial level, and records the pin-mode table entry.
pub fn setup(channel: u32, direction: Direction, pull: Pull, initial: Level) -> Result<()> {
    engine::with_state(|state| {
        let bcm = state_ops::translate(state, channel)?;
        state_ops::warn_if_foreign_function(state, bcm);
        let gpio = state_ops::gpio(state);
        gpio.set_pull(bcm, pull.bits());
        match direction {
            Direction::Output => {
                gpio.set_function(bcm, Fsel::Out);
                if initial.as_bool() {
                    gpio.set_high(bcm);
                } else {
                    gpio.set_low(bcm);
                }
            }
            Direction::Input => {
                gpio.set_function(bcm, Fsel::In);
            }
        }
        state_ops::set_pin_mode(state, bcm, Some(direction));
        Ok(())
    })
}

/// Drives `channel` (translated through the active numbering) to `level`.
/// Fails `direction` if the pin-mode table does not record this process
/// having configured it for output.
pub fn output(channel: u32, level: Level) -> Result<()> {
    engine::with_state(|state| {
        let bcm = state_ops::translate(state, channel)?;
        match state_ops::pin_mode(state, bcm) {
            Some(Direction::Output) => {}
            _ => {
                return Err(Error::Direction {
                    gpio: bcm,
                    expected: Direction::Output,
                })
            }
        }
        let gpio = state_ops::gpio(state);
        if level.as_bool() {
            gpio.set_high(bcm);
        } else {
            gpio.set_low(bcm);
        }
        Ok(())
    })
}

/// Reads `channel`'s level. Fails `direction` unless the pin-mode table
/// records this process having configured it (input or output).
pub fn input(channel: u32) -> Result<Level> {
    engine::with_state(|state| {
        let bcm = state_ops::translate(state, channel)?;
        match state_ops::pin_mode(state, bcm) {
            Some(_) => Ok(Level::from(state_ops::gpio(state).level(bcm))),
            None => Err(Error::Direction {
                gpio: bcm,
                expected: Direction::Input,
            }),
        }
    })
}

/// Bypasses the pin-mode-table check `output` performs, for callers that
/// need to drive a pin without having claimed it through `setup` first.
pub fn force_output(channel: u32, level: Level) -> Result<()> {
    engine::with_state(|state| {
        let bcm = state_ops::translate(state, channel)?;
        let gpio = state_ops::gpio(state);
        if level.as_bool() {
            gpio.set_high(bcm);
        } else {
            gpio.set_low(bcm);
        }
        Ok(())
    })
}

pub fn force_input(channel: u32) -> Result<Level> {
    engine::with_state(|state| {
        let bcm = state_ops::translate(state, channel)?;
        Ok(Level::from(state_ops::gpio(state).level(bcm)))
    })
}

/// Returns the raw 3-bit function-select field for `bcm`.
pub fn gpio_function(bcm: u32) -> Result<u32> {
    engine::with_state(|state| Ok(state_ops::gpio(state).function(bcm)))
}

pub fn set_pullupdn(channel: u32, pull: Pull) -> Result<()> {
    engine::with_state(|state| {
        let bcm = state_ops::translate(state, channel)?;
        state_ops::gpio(state).set_pull(bcm, pull.bits());
        Ok(())
    })
}

/// Restores every pin this process configured to input; also tears down
/// the PWM engine's DMA channels. Safe to call more than once.
pub fn cleanup() -> Result<()> {
    engine::shutdown()
}

pub fn setwarnings(enabled: bool) -> Result<()> {
    engine::with_state(|state| {
        state_ops::set_warnings(state, enabled);
        Ok(())
    })
}
