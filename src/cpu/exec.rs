use super::Cpu;
use super::decode::Instr;
use super::trap::{Trap, WithPc};
use crate::bus::{Bus, LedSink, Width};

/// Applies one decoded instruction to the register file and bus, leaving the
/// next pc in `cpu.pc`. On error nothing has been committed.
pub fn execute<L: LedSink>(cpu: &mut Cpu, bus: &mut Bus<L>, instr: Instr) -> Result<(), Trap> {
    let pc = cpu.pc;
    let next = pc.wrapping_add(4);

    let branch = |taken: bool, off: i32| -> u32 {
        if taken {
            pc.wrapping_add_signed(off)
        } else {
            next
        }
    };

    match instr {
        // upper immediates
        Instr::Lui { rd, imm } => {
            cpu.set_reg(rd, imm);
            cpu.pc = next;
        }
        Instr::Auipc { rd, imm } => {
            cpu.set_reg(rd, pc.wrapping_add(imm));
            cpu.pc = next;
        }

        // jumps
        Instr::Jal { rd, off } => {
            cpu.set_reg(rd, next);
            cpu.pc = pc.wrapping_add_signed(off);
        }
        Instr::Jalr { rd, rs1, off } => {
            // read rs1 before the link write, rd may equal rs1
            let target = cpu.reg(rs1).wrapping_add_signed(off) & !1;
            cpu.set_reg(rd, next);
            cpu.pc = target;
        }

        // branches
        Instr::Beq { rs1, rs2, off } => {
            cpu.pc = branch(cpu.reg(rs1) == cpu.reg(rs2), off);
        }
        Instr::Bne { rs1, rs2, off } => {
            cpu.pc = branch(cpu.reg(rs1) != cpu.reg(rs2), off);
        }
        Instr::Blt { rs1, rs2, off } => {
            cpu.pc = branch((cpu.reg(rs1) as i32) < (cpu.reg(rs2) as i32), off);
        }
        Instr::Bge { rs1, rs2, off } => {
            cpu.pc = branch((cpu.reg(rs1) as i32) >= (cpu.reg(rs2) as i32), off);
        }
        Instr::Bltu { rs1, rs2, off } => {
            cpu.pc = branch(cpu.reg(rs1) < cpu.reg(rs2), off);
        }
        Instr::Bgeu { rs1, rs2, off } => {
            cpu.pc = branch(cpu.reg(rs1) >= cpu.reg(rs2), off);
        }

        // loads
        Instr::LB { rd, rs1, off } => {
            let addr = cpu.reg(rs1).wrapping_add_signed(off);
            let byte = bus.load(addr, Width::Byte).with_pc(pc)?;
            cpu.set_reg(rd, byte as u8 as i8 as i32 as u32);
            cpu.pc = next;
        }
        Instr::LBU { rd, rs1, off } => {
            let addr = cpu.reg(rs1).wrapping_add_signed(off);
            let byte = bus.load(addr, Width::Byte).with_pc(pc)?;
            cpu.set_reg(rd, byte);
            cpu.pc = next;
        }
        Instr::LH { rd, rs1, off } => {
            let addr = cpu.reg(rs1).wrapping_add_signed(off);
            let half = bus.load(addr, Width::Half).with_pc(pc)?;
            cpu.set_reg(rd, half as u16 as i16 as i32 as u32);
            cpu.pc = next;
        }
        Instr::LHU { rd, rs1, off } => {
            let addr = cpu.reg(rs1).wrapping_add_signed(off);
            let half = bus.load(addr, Width::Half).with_pc(pc)?;
            cpu.set_reg(rd, half);
            cpu.pc = next;
        }
        Instr::LW { rd, rs1, off } => {
            let addr = cpu.reg(rs1).wrapping_add_signed(off);
            let word = bus.load(addr, Width::Word).with_pc(pc)?;
            cpu.set_reg(rd, word);
            cpu.pc = next;
        }

        // stores
        Instr::SB { rs1, rs2, off } => {
            let addr = cpu.reg(rs1).wrapping_add_signed(off);
            bus.store(addr, Width::Byte, cpu.reg(rs2)).with_pc(pc)?;
            cpu.pc = next;
        }
        Instr::SH { rs1, rs2, off } => {
            let addr = cpu.reg(rs1).wrapping_add_signed(off);
            bus.store(addr, Width::Half, cpu.reg(rs2)).with_pc(pc)?;
            cpu.pc = next;
        }
        Instr::SW { rs1, rs2, off } => {
            let addr = cpu.reg(rs1).wrapping_add_signed(off);
            bus.store(addr, Width::Word, cpu.reg(rs2)).with_pc(pc)?;
            cpu.pc = next;
        }

        // register-immediate
        Instr::Addi { rd, rs1, imm } => {
            cpu.set_reg(rd, cpu.reg(rs1).wrapping_add_signed(imm));
            cpu.pc = next;
        }
        Instr::Slti { rd, rs1, imm } => {
            cpu.set_reg(rd, ((cpu.reg(rs1) as i32) < imm) as u32);
            cpu.pc = next;
        }
        Instr::Sltiu { rd, rs1, imm } => {
            // the immediate is sign-extended first, then compared unsigned
            cpu.set_reg(rd, (cpu.reg(rs1) < imm as u32) as u32);
            cpu.pc = next;
        }
        Instr::Xori { rd, rs1, imm } => {
            cpu.set_reg(rd, cpu.reg(rs1) ^ imm as u32);
            cpu.pc = next;
        }
        Instr::Ori { rd, rs1, imm } => {
            cpu.set_reg(rd, cpu.reg(rs1) | imm as u32);
            cpu.pc = next;
        }
        Instr::Andi { rd, rs1, imm } => {
            cpu.set_reg(rd, cpu.reg(rs1) & imm as u32);
            cpu.pc = next;
        }
        Instr::Slli { rd, rs1, shamt } => {
            cpu.set_reg(rd, cpu.reg(rs1).wrapping_shl((shamt & 0x1f) as u32));
            cpu.pc = next;
        }
        Instr::Srli { rd, rs1, shamt } => {
            cpu.set_reg(rd, cpu.reg(rs1).wrapping_shr((shamt & 0x1f) as u32));
            cpu.pc = next;
        }
        Instr::Srai { rd, rs1, shamt } => {
            cpu.set_reg(
                rd,
                (cpu.reg(rs1) as i32).wrapping_shr((shamt & 0x1f) as u32) as u32,
            );
            cpu.pc = next;
        }

        // register-register
        Instr::Add { rd, rs1, rs2 } => {
            cpu.set_reg(rd, cpu.reg(rs1).wrapping_add(cpu.reg(rs2)));
            cpu.pc = next;
        }
        Instr::Sub { rd, rs1, rs2 } => {
            cpu.set_reg(rd, cpu.reg(rs1).wrapping_sub(cpu.reg(rs2)));
            cpu.pc = next;
        }
        Instr::Sll { rd, rs1, rs2 } => {
            cpu.set_reg(rd, cpu.reg(rs1).wrapping_shl(cpu.reg(rs2) & 0x1f));
            cpu.pc = next;
        }
        Instr::Slt { rd, rs1, rs2 } => {
            cpu.set_reg(rd, ((cpu.reg(rs1) as i32) < (cpu.reg(rs2) as i32)) as u32);
            cpu.pc = next;
        }
        Instr::Sltu { rd, rs1, rs2 } => {
            cpu.set_reg(rd, (cpu.reg(rs1) < cpu.reg(rs2)) as u32);
            cpu.pc = next;
        }
        Instr::Xor { rd, rs1, rs2 } => {
            cpu.set_reg(rd, cpu.reg(rs1) ^ cpu.reg(rs2));
            cpu.pc = next;
        }
        Instr::Srl { rd, rs1, rs2 } => {
            cpu.set_reg(rd, cpu.reg(rs1).wrapping_shr(cpu.reg(rs2) & 0x1f));
            cpu.pc = next;
        }
        Instr::Sra { rd, rs1, rs2 } => {
            cpu.set_reg(rd, (cpu.reg(rs1) as i32).wrapping_shr(cpu.reg(rs2) & 0x1f) as u32);
            cpu.pc = next;
        }
        Instr::Or { rd, rs1, rs2 } => {
            cpu.set_reg(rd, cpu.reg(rs1) | cpu.reg(rs2));
            cpu.pc = next;
        }
        Instr::And { rd, rs1, rs2 } => {
            cpu.set_reg(rd, cpu.reg(rs1) & cpu.reg(rs2));
            cpu.pc = next;
        }
    }

    Ok(())
}
