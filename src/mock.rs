//! Test doubles for the register transport and the tick source.

use std::{collections::VecDeque, vec::Vec};

use crate::{i2c::RegisterAccess, wait::Tick};

/// One register transaction as seen by [`MockBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read(u8),
    Write(u8, u8),
}

/// Error returned by an injected fault, tagged with the transaction index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError(pub usize);

/// A flat register file that echoes writes back on later reads.
///
/// Reads of a register with scripted values pop those first. A fault can be
/// injected at one transaction index; that transaction is still logged.
pub struct MockBus {
    regs: [u8; 256],
    scripted: [VecDeque<u8>; 256],
    log: Vec<Op>,
    fail_at: Option<usize>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            regs: [0; 256],
            scripted: core::array::from_fn(|_| VecDeque::new()),
            log: Vec::new(),
            fail_at: None,
        }
    }

    /// Preload the register file.
    pub fn set(&mut self, reg: u8, value: u8) {
        self.regs[usize::from(reg)] = value;
    }

    /// Queue values returned by successive reads of `reg`.
    pub fn script(&mut self, reg: u8, values: &[u8]) {
        self.scripted[usize::from(reg)].extend(values);
    }

    pub fn fail_at(&mut self, index: usize) {
        self.fail_at = Some(index);
    }

    pub fn injected_error(&self) -> MockError {
        MockError(self.fail_at.unwrap_or(usize::MAX))
    }

    pub fn log(&self) -> &[Op] {
        &self.log
    }

    pub fn writes_to(&self, reg: u8) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|op| match *op {
                Op::Write(r, v) if r == reg => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn touched(&self, reg: u8) -> bool {
        self.log.iter().any(|op| match *op {
            Op::Read(r) | Op::Write(r, _) => r == reg,
        })
    }

    fn record(&mut self, op: Op) -> Result<(), MockError> {
        let index = self.log.len();
        self.log.push(op);
        match self.fail_at {
            Some(at) if at == index => Err(MockError(index)),
            _ => Ok(()),
        }
    }
}

impl RegisterAccess for MockBus {
    type Error = MockError;

    fn read_register(&mut self, reg: u8) -> Result<u8, MockError> {
        self.record(Op::Read(reg))?;
        let reg = usize::from(reg);
        Ok(self.scripted[reg].pop_front().unwrap_or(self.regs[reg]))
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), MockError> {
        self.record(Op::Write(reg, value))?;
        self.regs[usize::from(reg)] = value;
        Ok(())
    }
}

/// Advances by a fixed step every time it is read.
pub struct StepTick {
    now: u32,
    step: u32,
}

impl StepTick {
    pub fn new(step: u32) -> Self {
        Self::starting_at(0, step)
    }

    pub fn starting_at(now: u32, step: u32) -> Self {
        Self { now, step }
    }
}

impl Tick for StepTick {
    fn ticks(&mut self) -> u32 {
        let now = self.now;
        self.now = self.now.wrapping_add(self.step);
        now
    }
}
