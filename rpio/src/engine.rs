// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Lifecycle and process-wide state: a singleton behind `OnceLock`+`Mutex`
//! holding the pin-mode table, per-channel arenas, and the engine's
//! configuration, reachable from both the public facets and the signal
//! handler.

use std::fs;
use std::sync::{Mutex, OnceLock};

use rpio_core::constants::{
    DEFAULT_SUBCYCLE_US, DEFAULT_TICK_US, DMA_CHANNEL_MAX, MIN_SUBCYCLE_US,
};
use rpio_core::{BoardRevision, Direction, Error, Numbering, Pacer, Result};

use crate::channel::Channel;
use crate::mmap::Peripherals;
use crate::regs::gpio::Gpio;
use crate::{pacer, signal};

const GPIO_COUNT: usize = 54;
/// Number of DMA channel slots (indices `0..=DMA_CHANNEL_MAX`).
const DMA_CHANNEL_COUNT: usize = DMA_CHANNEL_MAX as usize + 1;

/// Options recognized at `setup()` time.
#[derive(Debug, Clone)]
pub struct Config {
    pub pacer: Pacer,
    pub tick_us: u32,
    pub default_subcycle_us: u32,
    pub soft_fatal: bool,
    pub warnings: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            pacer: Pacer::Pwm,
            tick_us: DEFAULT_TICK_US,
            default_subcycle_us: DEFAULT_SUBCYCLE_US,
            soft_fatal: false,
            warnings: true,
        }
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> ConfigBuilder {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    pub fn pacer(mut self, pacer: Pacer) -> Self {
        self.config.pacer = pacer;
        self
    }

    pub fn tick_us(mut self, tick_us: u32) -> Self {
        self.config.tick_us = tick_us;
        self
    }

    pub fn default_subcycle_us(mut self, us: u32) -> Self {
        self.config.default_subcycle_us = us;
        self
    }

    pub fn soft_fatal(mut self, on: bool) -> Self {
        self.config.soft_fatal = on;
        self
    }

    pub fn warnings(mut self, on: bool) -> Self {
        self.config.warnings = on;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        ConfigBuilder::new()
    }
}

struct EngineState {
    peripherals: Peripherals,
    gpio: Gpio,
    config: Config,
    numbering: Option<Numbering>,
    board: Option<BoardRevision>,
    pin_modes: [Option<Direction>; GPIO_COUNT],
    warned_pins: [bool; GPIO_COUNT],
    pwm_gpio_setup: u64,
    channels: Vec<Option<Channel>>,
    pacer_started: bool,
    error_message: Option<String>,
}

impl EngineState {
    fn build(config: Config) -> Result<EngineState> {
        let peripherals = Peripherals::map()?;
        let gpio = Gpio::new(peripherals.gpio_base());
        Ok(EngineState {
            peripherals,
            gpio,
            config,
            numbering: None,
            board: None,
            pin_modes: [None; GPIO_COUNT],
            warned_pins: [false; GPIO_COUNT],
            pwm_gpio_setup: 0,
            channels: (0..DMA_CHANNEL_COUNT).map(|_| None).collect(),
            pacer_started: false,
            error_message: None,
        })
    }

    fn board(&mut self) -> Result<BoardRevision> {
        if let Some(board) = self.board {
            return Ok(board);
        }
        let cpuinfo = fs::read_to_string("/proc/cpuinfo").map_err(Error::DeviceAccess)?;
        let board = BoardRevision::detect(&cpuinfo)?;
        self.board = Some(board);
        Ok(board)
    }

    fn translate(&mut self, channel: u32) -> Result<u32> {
        match self.numbering {
            None => Err(Error::ModeNotSet),
            Some(Numbering::Bcm) => {
                if channel >= GPIO_COUNT as u32 {
                    Err(Error::InvalidArg {
                        what: "bcm line",
                        value: channel.to_string(),
                    })
                } else {
                    Ok(channel)
                }
            }
            Some(Numbering::Board) => {
                let board = self.board()?;
                board.board_to_bcm(channel)
            }
        }
    }

    fn fatal(&mut self, message: String) {
        if self.config.soft_fatal {
            self.error_message = Some(message);
        } else {
            eprintln!("rpio: fatal: {}", message);
            self.shutdown_locked();
            std::process::exit(1);
        }
    }

    fn shutdown_locked(&mut self) {
        for slot in self.channels.iter() {
            if let Some(channel) = slot {
                channel.shutdown();
            }
        }
        if self.pacer_started {
            pacer::stop(
                self.config.pacer,
                self.peripherals.pwm_base(),
                self.peripherals.pcm_base(),
            );
            self.pacer_started = false;
        }
        for (gpio, mode) in self.pin_modes.iter_mut().enumerate() {
            if mode.is_some() {
                self.gpio.set_function(gpio as u32, crate::regs::gpio::Fsel::In);
                *mode = None;
            }
        }
        self.pwm_gpio_setup = 0;
    }
}

static ENGINE: OnceLock<Mutex<Option<EngineState>>> = OnceLock::new();

fn engine_mutex() -> &'static Mutex<Option<EngineState>> {
    ENGINE.get_or_init(|| Mutex::new(None))
}

/// One-shot process setup: maps peripherals, installs the signal trap, and
/// latches the engine in place. A second call fails `already-setup`.
pub fn setup(config: Config) -> Result<()> {
    let mut guard = engine_mutex().lock().unwrap();
    if guard.is_some() {
        return Err(Error::AlreadySetup);
    }
    let state = EngineState::build(config)?;
    *guard = Some(state);
    drop(guard);
    signal::install()?;
    Ok(())
}

pub fn is_setup() -> bool {
    engine_mutex().lock().unwrap().is_some()
}

/// Drains outstanding DMA, resets every initialized channel, and restores
/// every pin this process touched to input. Idempotent.
pub fn shutdown() -> Result<()> {
    let mut guard = engine_mutex().lock().unwrap();
    if let Some(state) = guard.as_mut() {
        state.shutdown_locked();
    }
    Ok(())
}

/// Invoked from the signal handler. Uses `try_lock` so a signal delivered
/// while the engine mutex is already held (e.g. mid-`add_pulse`) does not
/// deadlock the process on its way out -- it simply skips teardown and
/// relies on the exit itself to release hardware on next boot.
pub(crate) fn emergency_shutdown() {
    if let Ok(mut guard) = engine_mutex().try_lock() {
        if let Some(state) = guard.as_mut() {
            state.shutdown_locked();
        }
    }
}

pub(crate) fn with_state<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&mut EngineState) -> Result<R>,
{
    let mut guard = engine_mutex().lock().unwrap();
    match guard.as_mut() {
        Some(state) => f(state),
        None => Err(Error::NotSetup),
    }
}

pub(crate) mod state_ops {
    use super::*;

    pub fn setmode(state: &mut EngineState, numbering: Numbering) {
        state.numbering = Some(numbering);
    }

    pub fn translate(state: &mut EngineState, channel: u32) -> Result<u32> {
        state.translate(channel)
    }

    pub fn pin_mode(state: &EngineState, bcm: u32) -> Option<Direction> {
        state.pin_modes[bcm as usize]
    }

    pub fn set_pin_mode(state: &mut EngineState, bcm: u32, direction: Option<Direction>) {
        state.pin_modes[bcm as usize] = direction;
    }

    pub fn gpio(state: &EngineState) -> &Gpio {
        &state.gpio
    }

    pub fn warn_if_foreign_function(state: &mut EngineState, bcm: u32) {
        if !state.config.warnings {
            return;
        }
        let fsel = state.gpio.function(bcm);
        let expected_unset = fsel == crate::regs::gpio::Fsel::In as u32;
        if !expected_unset && !state.warned_pins[bcm as usize] {
            log::warn!(
                "gpio {} is already in function {} -- another process may own it",
                bcm,
                fsel
            );
            state.warned_pins[bcm as usize] = true;
        }
    }

    pub fn config(state: &EngineState) -> &Config {
        &state.config
    }

    pub fn set_warnings(state: &mut EngineState, enabled: bool) {
        state.config.warnings = enabled;
    }

    pub fn channel(state: &EngineState, index: u32) -> Result<&Channel> {
        state
            .channels
            .get(index as usize)
            .ok_or(Error::InvalidChannel(index))?
            .as_ref()
            .ok_or(Error::Uninitialized(index))
    }

    pub fn channel_mut(state: &mut EngineState, index: u32) -> Result<&mut Channel> {
        state
            .channels
            .get_mut(index as usize)
            .ok_or(Error::InvalidChannel(index))?
            .as_mut()
            .ok_or(Error::Uninitialized(index))
    }

    pub fn is_channel_initialized(state: &EngineState, index: u32) -> bool {
        index < DMA_CHANNEL_COUNT as u32 && state.channels[index as usize].is_some()
    }

    pub fn init_channel(state: &mut EngineState, index: u32, subcycle_us: u32) -> Result<()> {
        if index > DMA_CHANNEL_MAX {
            return Err(Error::InvalidChannel(index));
        }
        if subcycle_us < MIN_SUBCYCLE_US {
            return Err(Error::Subcycle(subcycle_us));
        }
        if state.channels[index as usize].is_some() {
            return Err(Error::Reinit(index));
        }
        // Each DMA channel gets its own register mapping, independent of
        // the shared peripheral block. The mapping is leaked into the
        // channel's lifetime rather than stored separately; it is only
        // ever reclaimed by the OS at process exit, since a channel is
        // never dropped before then.
        let dma_mapping = crate::mmap::map_dma_channel(index)?;
        let dma_base_addr = dma_mapping.as_ptr() as usize;
        std::mem::forget(dma_mapping);
        let channel = Channel::init(
            index,
            dma_base_addr,
            state.config.tick_us,
            subcycle_us,
            state.config.pacer,
        )?;
        if !state.pacer_started {
            pacer::start(
                state.config.pacer,
                state.config.tick_us,
                state.peripherals.clk_base(),
                state.peripherals.pwm_base(),
                state.peripherals.pcm_base(),
            );
            state.pacer_started = true;
        }
        state.channels[index as usize] = Some(channel);
        Ok(())
    }

    pub fn claim_pwm_gpio(state: &mut EngineState, bcm: u32) {
        state.pwm_gpio_setup |= 1 << bcm;
    }

    pub fn is_pwm_gpio_claimed(state: &EngineState, bcm: u32) -> bool {
        state.pwm_gpio_setup & (1 << bcm) != 0
    }

    pub fn release_pwm_gpio(state: &mut EngineState, bcm: u32) {
        state.pwm_gpio_setup &= !(1 << bcm);
    }

    pub fn last_error(state: &EngineState) -> Option<String> {
        state.error_message.clone()
    }

    pub fn fatal(state: &mut EngineState, message: String) {
        state.fatal(message);
    }
}
