// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

/// A pin's direction, as this process has configured it (not necessarily
/// what the hardware currently reports -- another process may have changed
/// the function bits since).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Pull-up/pull-down resistor state, per BCM2835 datasheet GPPUD encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pull {
    Off,
    Down,
    Up,
}

impl Pull {
    pub fn bits(self) -> u32 {
        match self {
            Pull::Off => 0b00,
            Pull::Down => 0b01,
            Pull::Up => 0b10,
        }
    }
}

/// A digital logic level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn as_bool(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(v: bool) -> Self {
        if v {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Which pin-numbering scheme the GPIO facet is currently translating
/// through.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Numbering {
    Board,
    Bcm,
}

/// The DMA-request source used to pace the PWM engine's tick rate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pacer {
    Pwm,
    Pcm,
}

impl Pacer {
    /// DMA TI.PERMAP value for this pacer's DREQ line (BCM2708 peripherals
    /// table 4-1).
    pub fn permap(self) -> u32 {
        match self {
            Pacer::Pwm => 5,
            Pacer::Pcm => 2,
        }
    }
}
