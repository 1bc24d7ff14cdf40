// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! DMA channel register block and control-block layout: the `CS`/`TI`
//! bitfields and the 8-word `ControlBlock` a channel's cyclic program is
//! built from, with one register block opened per channel arena.

use core::ops::Deref;
use register::{mmio::ReadWrite, register_bitfields};

/// DREQ peripheral-mapping values for `TI::PERMAP`, straight out of the
/// BCM2708 DMA chapter. Only the two pacers this crate drives are named.
#[allow(unused)]
#[derive(Copy, Clone)]
pub enum DreqPeripheralMap {
    PcmTx = 2,
    Pwm = 5,
}

register_bitfields! { u32,
    CS [
        ACTIVE OFFSET(0) NUMBITS(1) [],
        END OFFSET(1) NUMBITS(1) [],
        INT OFFSET(2) NUMBITS(1) [],
        DREQ OFFSET(3) NUMBITS(1) [],
        PAUSED OFFSET(4) NUMBITS(1) [],
        ERROR OFFSET(8) NUMBITS(1) [],
        PRIORITY OFFSET(16) NUMBITS(4) [],
        PANIC_PRIORITY OFFSET(20) NUMBITS(4) [],
        WAIT_FOR_OUTSTANDING_WRITES OFFSET(28) NUMBITS(1) [],
        DISDEBUG OFFSET(29) NUMBITS(1) [],
        ABORT OFFSET(30) NUMBITS(1) [],
        RESET OFFSET(31) NUMBITS(1) []
    ],
    TI [
        INTEN OFFSET(0) NUMBITS(1) [],
        TDMODE OFFSET(1) NUMBITS(1) [],
        WAIT_RESP OFFSET(3) NUMBITS(1) [],
        DEST_INC OFFSET(4) NUMBITS(1) [],
        DEST_WIDTH OFFSET(5) NUMBITS(1) [],
        DEST_DREQ OFFSET(6) NUMBITS(1) [],
        DEST_IGNORE OFFSET(7) NUMBITS(1) [],
        SRC_INC OFFSET(8) NUMBITS(1) [],
        SRC_WIDTH OFFSET(9) NUMBITS(1) [],
        SRC_DREQ OFFSET(10) NUMBITS(1) [],
        SRC_IGNORE OFFSET(11) NUMBITS(1) [],
        BURST_LENGTH OFFSET(12) NUMBITS(4) [],
        PERMAP OFFSET(16) NUMBITS(5) [],
        WAITS OFFSET(21) NUMBITS(5) [],
        NO_WIDE_BURSTS OFFSET(26) NUMBITS(1) []
    ]
}

/// One DMA control block, 32 bytes, 32-byte aligned. This is the unit the
/// channel arena packs two of per sample tick: one that writes the sample
/// word to `GPSET0`/`GPCLR0`, one that writes a dummy word to the pacer's
/// FIFO gated on `DREQ`.
#[repr(C, align(32))]
#[derive(Default, Copy, Clone)]
pub struct ControlBlock {
    pub transfer_information: u32,
    pub source_address: u32,
    pub destination_address: u32,
    pub transfer_length: u32,
    pub stride: u32,
    pub next_control_block: u32,
    pub reserved: [u32; 2],
}

impl ControlBlock {
    pub fn set(&mut self, ti: u32, src: u32, dst: u32, len: u32, next: u32) {
        self.transfer_information = ti;
        self.source_address = src;
        self.destination_address = dst;
        self.transfer_length = len;
        self.stride = 0;
        self.next_control_block = next;
        self.reserved = [0, 0];
    }
}

#[allow(non_snake_case)]
#[repr(C)]
pub struct RegisterBlock {
    pub CS: ReadWrite<u32, CS::Register>,
    pub CONBLK_AD: ReadWrite<u32>,
    pub TI: ReadWrite<u32, TI::Register>,
    pub SOURCE_AD: ReadWrite<u32>,
    pub DEST_AD: ReadWrite<u32>,
    pub TXFR_LEN: ReadWrite<u32>,
    pub STRIDE: ReadWrite<u32>,
    pub NEXTCONBK: ReadWrite<u32>,
    pub DEBUG: ReadWrite<u32>,
}

/// A mapped DMA channel's register window.
pub struct DmaChannel {
    base_addr: usize,
    channel: u32,
}

impl DmaChannel {
    pub fn new(base_addr: usize, channel: u32) -> Self {
        DmaChannel { base_addr, channel }
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    fn ptr(&self) -> *const RegisterBlock {
        self.base_addr as *const _
    }

    /// Resets the channel, clears its sticky `INT`/`END` flags, and clears
    /// its debug error latches: `CS = RESET`, wait for the bit to clear,
    /// `CS = INT | END`, then `DEBUG = 7`
    /// (READ_ERROR | FIFO_ERROR | READ_LAST_NOT_SET_ERROR, all write-1-to-clear).
    pub fn reset(&self) {
        self.CS.write(CS::RESET::SET);
        while self.CS.is_set(CS::RESET) {
            std::hint::spin_loop();
        }
        self.CS.write(CS::INT::SET + CS::END::SET);
        self.DEBUG.set(7);
    }

    /// Points `CONBLK_AD` at the first control block (a bus address) and
    /// starts the channel with mid priority and wait-for-outstanding-writes
    /// set: `CS = 0x10880001`.
    pub fn start(&self, first_cb_bus_addr: u32) {
        self.CONBLK_AD.set(first_cb_bus_addr);
        self.CS.write(
            CS::WAIT_FOR_OUTSTANDING_WRITES::SET
                + CS::PANIC_PRIORITY.val(8)
                + CS::PRIORITY.val(8)
                + CS::ACTIVE::SET,
        );
    }

    pub fn stop(&self) {
        self.CS.write(CS::ACTIVE::CLEAR);
        self.CONBLK_AD.set(0);
    }

    pub fn is_active(&self) -> bool {
        self.CS.is_set(CS::ACTIVE)
    }
}

impl Deref for DmaChannel {
    type Target = RegisterBlock;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.ptr() }
    }
}
