pub mod decode;
pub mod exec;
pub mod trap;

use crate::bus::{Bus, LedSink, StderrLeds};
use crate::config::{EmuConfig, InvalidPolicy};
use trap::{CpuStepResult, HaltReason, Trap, WithPc};

#[derive(Default, Debug, Clone)]
pub struct Cpu {
    pub regs: [u32; 32],
    pub pc: u32,
}

impl Cpu {
    pub fn reg(&self, idx: u8) -> u32 {
        self.regs[idx as usize]
    }

    pub fn set_reg(&mut self, idx: u8, val: u32) {
        if idx != 0 {
            self.regs[idx as usize] = val;
        } // x0 hardwired
    }
}

/// The whole emulator state for one run: registers, RAM and peripherals.
pub struct Machine<L = StderrLeds> {
    pub cpu: Cpu,
    pub bus: Bus<L>,
    /// Retired instructions, skipped ones included.
    pub executed: u64,
    /// Stop after N instructions (0 = run forever)
    pub max_insns: u64,
    pub on_invalid: InvalidPolicy,
    pub trace: bool,
}

impl<L: LedSink> Machine<L> {
    pub fn new(cfg: &EmuConfig, leds: L) -> Self {
        Self {
            cpu: Cpu::default(),
            bus: Bus::new(cfg, leds),
            executed: 0,
            max_insns: cfg.max_insns,
            on_invalid: cfg.on_invalid,
            trace: cfg.trace,
        }
    }

    /// Fetches, decodes and executes one instruction. On `Err` the machine is
    /// left exactly as it was before the call.
    pub fn step(&mut self) -> Result<(), CpuStepResult> {
        if self.max_insns != 0 && self.executed >= self.max_insns {
            return Err(CpuStepResult::Halt(HaltReason::InstructionLimit {
                executed: self.executed,
            }));
        }

        let pc = self.cpu.pc;

        // Fetch
        let inst = self
            .bus
            .fetch(pc)
            .map_err(|err| Trap::Fetch { pc, err })?;

        // Decode
        let decoded = decode::decode(inst).with_pc(pc)?;

        if self.trace {
            crate::debug::trace(&self.cpu, inst, self.executed);
        }

        // Execute
        exec::execute(&mut self.cpu, &mut self.bus, decoded)?;
        self.executed += 1;
        Ok(())
    }

    /// Steps past the current instruction without executing it.
    pub fn skip(&mut self) {
        self.cpu.pc = self.cpu.pc.wrapping_add(4);
        self.executed += 1;
    }

    /// Steps until something stops the run. Illegal instructions are skipped
    /// instead when the policy says so; every other outcome is returned.
    pub fn run(&mut self) -> CpuStepResult {
        loop {
            match self.step() {
                Ok(()) => {}
                Err(CpuStepResult::Trapped(trap @ Trap::IllegalInstruction { .. }))
                    if self.on_invalid == InvalidPolicy::Skip =>
                {
                    tracing::warn!("{trap}, skipping");
                    self.skip();
                }
                Err(e) => return e,
            }
        }
    }
}
