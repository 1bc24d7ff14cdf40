// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Shared data model for `rpio`: the BCM2708 register/address constants,
//! the board-revision pin tables, and the error taxonomy every facet
//! returns. Kept dependency-light (just `thiserror`) so it can be reused
//! by both the GPIO and PWM facets without pulling in `memmap2`/`log`.

pub mod board;
pub mod constants;
pub mod error;
pub mod types;

pub use board::BoardRevision;
pub use error::{Error, Result};
pub use types::{Direction, Level, Numbering, Pacer, Pull};
