// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! DMA-paced PWM engine: channel arenas, the cyclic control-block program
//! builder, and the pulse editor.

pub mod arena;
pub mod pagemap;
pub mod program;
pub mod pulse;

pub use arena::Arena;
pub use program::PageTable;
