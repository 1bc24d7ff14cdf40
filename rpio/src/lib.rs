// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! DMA-paced software PWM and direct GPIO control for BCM2708 Raspberry
//! Pi boards (revisions 1 and 2).
//!
//! Two facets sit on top of one process-wide engine (see [`engine`]): the
//! [`gpio`] module for direct pin control, and the [`pwm`] module for the
//! DMA-paced pulse generator. Both require [`pwm::setup`] to have run
//! first -- it maps the shared peripheral blocks and installs the signal
//! trap both facets rely on.

mod channel;
mod dma;
mod mmap;
mod pacer;
mod regs;
mod signal;

pub mod engine;
pub mod gpio;
pub mod logger;
pub mod pwm;

pub use rpio_core::{BoardRevision, Direction, Error, Level, Numbering, Pacer, Pull, Result};

pub use engine::{Config, ConfigBuilder};
