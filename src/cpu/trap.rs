use crate::cpu::decode::DecodeError;
use crate::mem::MemError;
use thiserror::Error;

/// Faults raised while executing a single instruction. None of them is
/// recoverable from inside the core; the driver decides what happens next.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    #[error("illegal instruction at pc=0x{pc:08x} inst=0x{inst:08x}")]
    IllegalInstruction { pc: u32, inst: u32 },

    #[error("instruction fetch fault at pc=0x{pc:08x}: {err}")]
    Fetch { pc: u32, err: MemError },

    #[error("memory error at pc=0x{pc:08x}: {err}")]
    Mem { pc: u32, err: MemError },
}

impl Trap {
    /// Returns the PC where the trap occurred
    pub fn pc(&self) -> u32 {
        match self {
            Trap::IllegalInstruction { pc, .. } => *pc,
            Trap::Fetch { pc, .. } => *pc,
            Trap::Mem { pc, .. } => *pc,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    #[error("instruction limit reached after {executed} instructions")]
    InstructionLimit { executed: u64 },
}

/// Everything that stops `Machine::step` from retiring an instruction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuStepResult {
    #[error("{0}")]
    Halt(HaltReason),

    #[error("{0}")]
    Trapped(#[from] Trap),
}

/// Trait for adding PC context to errors that can become Traps
pub trait WithPc<T> {
    fn with_pc(self, pc: u32) -> Result<T, Trap>;
}

impl<T> WithPc<T> for Result<T, MemError> {
    fn with_pc(self, pc: u32) -> Result<T, Trap> {
        self.map_err(|err| Trap::Mem { pc, err })
    }
}

impl<T> WithPc<T> for Result<T, DecodeError> {
    fn with_pc(self, pc: u32) -> Result<T, Trap> {
        self.map_err(|err| match err {
            DecodeError::Invalid { inst } => Trap::IllegalInstruction { pc, inst },
        })
    }
}
