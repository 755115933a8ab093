//! Scripted hardware and component fakes for unit tests
//!
//! A [`Bench`] owns the shared state behind a [`MockGpio`] / [`MockTimer`]
//! pair: one operation log (so ordering across both capabilities can be
//! asserted), a script of echo levels, a script of clock values and a list of
//! injected failures.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use crate::driver::Driver;
use crate::hal::{DriveStrength, GpioHal, PinConfig, PinMode, TimerHal};
use crate::processor::Processor;
use crate::types::{Reading, UsConfig};

pub const TRIG_PIN: u8 = 4;
pub const ECHO_PIN: u8 = 5;

/// Clock advance per unscripted `now_us` call
const DEFAULT_CLOCK_STEP_US: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Every observable capability call except clock reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Reset(u8),
    Configure(u8, PinConfig),
    SetLevel(u8, bool),
    GetLevel(u8),
    SetDirection(u8, PinMode),
    SetDrive(u8, DriveStrength),
    DelayUs(u32),
    DelayMs(u32),
}

#[derive(Default)]
struct BenchState {
    ops: Vec<Op>,
    echo: VecDeque<bool>,
    idle_echo: bool,
    clock: VecDeque<u64>,
    last_now: u64,
    clock_step: u64,
    failures: Vec<(Op, usize)>,
}

impl BenchState {
    /// Log `op` and report whether it was scripted to fail
    fn record(&mut self, op: Op) -> Result<(), MockError> {
        let seen = self.ops.iter().filter(|logged| **logged == op).count();
        self.ops.push(op);
        if self.failures.contains(&(op, seen)) {
            Err(MockError)
        } else {
            Ok(())
        }
    }
}

#[derive(Clone)]
pub struct Bench {
    state: Rc<RefCell<BenchState>>,
}

impl Bench {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BenchState {
                clock_step: DEFAULT_CLOCK_STEP_US,
                ..Default::default()
            })),
        }
    }

    pub fn gpio(&self) -> MockGpio {
        MockGpio {
            state: Rc::clone(&self.state),
        }
    }

    pub fn timer(&self) -> MockTimer {
        MockTimer {
            state: Rc::clone(&self.state),
        }
    }

    /// Levels returned by successive echo reads
    pub fn script_echo(&self, levels: &[bool]) {
        self.state.borrow_mut().echo.extend(levels.iter().copied());
    }

    /// Level returned once the echo script runs dry
    pub fn set_idle_echo(&self, level: bool) {
        self.state.borrow_mut().idle_echo = level;
    }

    /// Values returned by successive `now_us` calls
    pub fn script_clock(&self, times: &[u64]) {
        self.state.borrow_mut().clock.extend(times.iter().copied());
    }

    /// Make the `nth` (0-based) occurrence of `op` fail
    pub fn fail(&self, op: Op, nth: usize) {
        self.state.borrow_mut().failures.push((op, nth));
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.borrow().ops.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.state.borrow().ops.iter().filter(|logged| **logged == op).count()
    }

    /// Script one clean echo pulse of `duration_us`, starting after one low read
    pub fn script_pulse(&self, duration_us: u64) {
        let base = self.state.borrow().clock.back().copied().unwrap_or(0);
        let echo_start = base + 100;
        let echo_end = echo_start + duration_us;
        // stuck check, rising edge, one read while high, falling edge
        self.script_echo(&[false, true, true, false]);
        self.script_clock(&[
            base,
            base + 10,
            echo_start,
            echo_start + duration_us / 2,
            echo_end,
            echo_end,
        ]);
    }
}

pub struct MockGpio {
    state: Rc<RefCell<BenchState>>,
}

impl GpioHal for MockGpio {
    type Pin = u8;
    type Error = MockError;

    fn reset_pin(&mut self, pin: u8) -> Result<(), MockError> {
        self.state.borrow_mut().record(Op::Reset(pin))
    }

    fn configure(&mut self, pin: u8, config: PinConfig) -> Result<(), MockError> {
        self.state.borrow_mut().record(Op::Configure(pin, config))
    }

    fn set_level(&mut self, pin: u8, level: bool) -> Result<(), MockError> {
        self.state.borrow_mut().record(Op::SetLevel(pin, level))
    }

    fn get_level(&mut self, pin: u8) -> Result<bool, MockError> {
        let mut state = self.state.borrow_mut();
        state.record(Op::GetLevel(pin))?;
        let idle = state.idle_echo;
        Ok(state.echo.pop_front().unwrap_or(idle))
    }

    fn set_direction(&mut self, pin: u8, mode: PinMode) -> Result<(), MockError> {
        self.state.borrow_mut().record(Op::SetDirection(pin, mode))
    }

    fn set_drive_capability(&mut self, pin: u8, strength: DriveStrength) -> Result<(), MockError> {
        self.state.borrow_mut().record(Op::SetDrive(pin, strength))
    }
}

pub struct MockTimer {
    state: Rc<RefCell<BenchState>>,
}

impl TimerHal for MockTimer {
    type Error = MockError;

    fn now_us(&mut self) -> u64 {
        let mut state = self.state.borrow_mut();
        let now = match state.clock.pop_front() {
            Some(scripted) => scripted,
            None => state.last_now + state.clock_step,
        };
        state.last_now = now;
        now
    }

    fn delay_us(&mut self, us: u32) -> Result<(), MockError> {
        self.state.borrow_mut().record(Op::DelayUs(us))
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), MockError> {
        self.state.borrow_mut().record(Op::DelayMs(ms))
    }
}

/// Driver that replays a fixed list of readings
pub struct ScriptedDriver {
    readings: VecDeque<Reading>,
    fallback: Reading,
    pub pings: usize,
    pub warmups: Vec<u16>,
    pub deinits: usize,
    pub last_config: Option<UsConfig>,
    pub init_result: Result<(), MockError>,
    pub deinit_result: Result<(), MockError>,
}

impl ScriptedDriver {
    /// Replays `readings`, then repeats `fallback` forever
    pub fn new(readings: &[Reading], fallback: Reading) -> Self {
        Self {
            readings: readings.iter().copied().collect(),
            fallback,
            pings: 0,
            warmups: Vec::new(),
            deinits: 0,
            last_config: None,
            init_result: Ok(()),
            deinit_result: Ok(()),
        }
    }

    pub fn repeating(reading: Reading) -> Self {
        Self::new(&[], reading)
    }
}

impl Driver for ScriptedDriver {
    type Error = MockError;

    fn init(&mut self, warmup_time_ms: u16) -> Result<(), MockError> {
        self.warmups.push(warmup_time_ms);
        self.init_result
    }

    fn deinit(&mut self) -> Result<(), MockError> {
        self.deinits += 1;
        self.deinit_result
    }

    fn ping_once(&mut self, cfg: UsConfig) -> Reading {
        self.pings += 1;
        self.last_config = Some(cfg);
        self.readings.pop_front().unwrap_or(self.fallback)
    }
}

/// Processor that records its input and answers with a fixed reading
pub struct CountingProcessor {
    reply: Reading,
    pub calls: Cell<usize>,
    pub last_total: Cell<u8>,
    pub last_batch: RefCell<Vec<Reading>>,
}

impl CountingProcessor {
    pub fn new(reply: Reading) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
            last_total: Cell::new(0),
            last_batch: RefCell::new(Vec::new()),
        }
    }
}

impl Processor for CountingProcessor {
    fn process(&self, pings: &[Reading], total_pings: u8, _cfg: UsConfig) -> Reading {
        self.calls.set(self.calls.get() + 1);
        self.last_total.set(total_pings);
        *self.last_batch.borrow_mut() = pings.to_vec();
        self.reply
    }
}
