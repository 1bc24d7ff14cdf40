// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! PCM pacer register block: `CS_A`/`MODE_A`/`TXC_A`/`DREQ_A` offsets and
//! bit positions, in the same `register_bitfields!` idiom as the other
//! register blocks. Unlike PWM, the BCM2835 PCM peripheral has no
//! separate DMA-enable register: DMA request generation is gated by bits
//! inside `CS_A` itself.

use core::ops::Deref;
use register::{mmio::ReadWrite, register_bitfields};

register_bitfields! { u32,
    CS_A [
        EN OFFSET(0) NUMBITS(1) [],
        RXON OFFSET(1) NUMBITS(1) [],
        TXON OFFSET(2) NUMBITS(1) [],
        TXCLR OFFSET(3) NUMBITS(1) [],
        RXCLR OFFSET(4) NUMBITS(1) [],
        DMAEN OFFSET(9) NUMBITS(1) []
    ],
    MODE_A [
        FLEN OFFSET(10) NUMBITS(10) [],
        FSLEN OFFSET(0) NUMBITS(10) []
    ],
    TXC_A [
        CH1WEX OFFSET(31) NUMBITS(1) [],
        CH1EN OFFSET(30) NUMBITS(1) [],
        CH1POS OFFSET(20) NUMBITS(10) [],
        CH1WID OFFSET(16) NUMBITS(4) []
    ],
    DREQ_A [
        TX OFFSET(24) NUMBITS(7) [],
        TX_PANIC OFFSET(8) NUMBITS(7) []
    ]
}

#[allow(non_snake_case)]
#[repr(C)]
pub struct RegisterBlock {
    pub CS_A: ReadWrite<u32, CS_A::Register>,
    pub FIFO_A: ReadWrite<u32>,
    pub MODE_A: ReadWrite<u32, MODE_A::Register>,
    pub RXC_A: ReadWrite<u32>,
    pub TXC_A: ReadWrite<u32, TXC_A::Register>,
    pub DREQ_A: ReadWrite<u32, DREQ_A::Register>,
    pub INTEN_A: ReadWrite<u32>,
    pub INT_STC_A: ReadWrite<u32>,
    pub GRAY: ReadWrite<u32>,
}

pub struct Pcm {
    base_addr: usize,
}

impl Pcm {
    pub fn new(base_addr: usize) -> Self {
        Pcm { base_addr }
    }

    fn ptr(&self) -> *const RegisterBlock {
        self.base_addr as *const _
    }

    /// Brings the PCM peripheral up as a fixed-rate DMA-fed pacer, in the
    /// exact order and with the exact bit positions of `init_hardware()`'s
    /// PCM branch: enable the block, configure a single 8-bit channel,
    /// program `MODE_A` from the tick rate, clear the FIFOs, set the DREQ
    /// thresholds, then enable DMA and Tx. `frame_bits` is
    /// `pulse_width_incr_us * 10 - 1`, the frame-length field derived from
    /// the tick rate.
    pub fn start(&self, frame_bits: u32) {
        self.CS_A.write(CS_A::EN::SET);
        self.TXC_A.write(
            TXC_A::CH1WEX::CLEAR + TXC_A::CH1EN::SET + TXC_A::CH1POS.val(0) + TXC_A::CH1WID.val(0),
        );
        self.MODE_A
            .write(MODE_A::FLEN.val(frame_bits) + MODE_A::FSLEN.val(1));
        self.CS_A
            .write(CS_A::EN::SET + CS_A::TXCLR::SET + CS_A::RXCLR::SET);
        self.DREQ_A
            .write(DREQ_A::TX.val(64) + DREQ_A::TX_PANIC.val(64));
        self.CS_A
            .write(CS_A::EN::SET + CS_A::TXCLR::SET + CS_A::RXCLR::SET + CS_A::DMAEN::SET);
        self.CS_A.write(
            CS_A::EN::SET
                + CS_A::TXCLR::SET
                + CS_A::RXCLR::SET
                + CS_A::DMAEN::SET
                + CS_A::TXON::SET,
        );
    }

    pub fn stop(&self) {
        self.CS_A.set(0);
    }
}

impl Deref for Pcm {
    type Target = RegisterBlock;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.ptr() }
    }
}
