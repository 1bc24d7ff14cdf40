// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::io;

/// The error taxonomy this crate surfaces to callers.
///
/// Every variant corresponds to a distinct failure condition named by the
/// component design; callers are expected to match on kind rather than
/// parse message text.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to open /dev/mem: {0}")]
    DeviceAccess(#[source] io::Error),

    #[error("failed to allocate channel arena")]
    Allocation,

    #[error("failed to mmap peripheral block: {0}")]
    Mmap(#[source] io::Error),

    #[error("pagemap entry for arena page {page} is not present (raw entry 0x{entry:016x})")]
    PageNotPresent { page: usize, entry: u64 },

    #[error("setup() was already called for this process")]
    AlreadySetup,

    #[error("setup() has not been called yet")]
    NotSetup,

    #[error("channel {0} is out of range (must be 0..=14)")]
    InvalidChannel(u32),

    #[error("channel {0} has not been initialized")]
    Uninitialized(u32),

    #[error("channel {0} is already initialized")]
    Reinit(u32),

    #[error("start {start} + width {width} exceeds channel capacity ({num_samples} samples)")]
    Width {
        start: u32,
        width: u32,
        num_samples: u32,
    },

    #[error("subcycle_us {0} is below the minimum of 3000us")]
    Subcycle(u32),

    #[error("gpio {0} was never claimed by the PWM engine on this channel")]
    GpioNotSetup(u32),

    #[error("pin numbering mode has not been selected; call setmode() first")]
    ModeNotSet,

    #[error("invalid {what}: {value}")]
    InvalidArg { what: &'static str, value: String },

    #[error("gpio {gpio} is not configured for {expected:?}")]
    Direction {
        gpio: u32,
        expected: crate::types::Direction,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
