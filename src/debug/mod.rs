use crate::cpu::Cpu;

/// Emits the pre-execution state of one step at `trace` level.
pub fn trace(cpu: &Cpu, inst: u32, step: u64) {
    if !tracing::enabled!(tracing::Level::TRACE) {
        return;
    }
    let regs = cpu
        .regs
        .iter()
        .enumerate()
        .map(|(i, r)| format!("x{i}:{r:x}"))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::trace!(
        "[{:08}] pc=0x{:08x} inst=0x{:08x} {}",
        step,
        cpu.pc,
        inst,
        regs
    );
}
