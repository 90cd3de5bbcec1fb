//! Tiny RV32I assembler used to build test programs.
#![allow(dead_code)]

use rv32i_emu::config::EmuConfig;
use rv32i_emu::cpu::Machine;
use rv32i_emu::image::load_image_bytes;

pub const OP: u32 = 0b0110011;
pub const OP_IMM: u32 = 0b0010011;
pub const LOAD: u32 = 0b0000011;
pub const STORE: u32 = 0b0100011;
pub const BRANCH: u32 = 0b1100011;
pub const JAL: u32 = 0b1101111;
pub const JALR: u32 = 0b1100111;
pub const LUI: u32 = 0b0110111;
pub const AUIPC: u32 = 0b0010111;

pub fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32) -> u32 {
    (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | OP
}

pub fn i_type(imm: i32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    (((imm as u32) & 0xfff) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

pub fn s_type(imm: i32, rs2: u32, rs1: u32, funct3: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 5) & 0x7f) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | ((imm & 0x1f) << 7)
        | STORE
}

pub fn b_type(imm: i32, rs2: u32, rs1: u32, funct3: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 12) & 1) << 31)
        | (((imm >> 5) & 0x3f) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | (((imm >> 1) & 0xf) << 8)
        | (((imm >> 11) & 1) << 7)
        | BRANCH
}

pub fn j_type(imm: i32, rd: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 20) & 1) << 31)
        | (((imm >> 1) & 0x3ff) << 21)
        | (((imm >> 11) & 1) << 20)
        | (((imm >> 12) & 0xff) << 12)
        | (rd << 7)
        | JAL
}

pub fn u_type(imm20: u32, rd: u32, opcode: u32) -> u32 {
    ((imm20 & 0xfffff) << 12) | (rd << 7) | opcode
}

pub fn shift_imm(funct7: u32, shamt: u32, rs1: u32, funct3: u32, rd: u32) -> u32 {
    (funct7 << 25) | ((shamt & 0x1f) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | OP_IMM
}

pub fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(imm, rs1, 0b000, rd, OP_IMM)
}

pub fn lui(rd: u32, imm20: u32) -> u32 {
    u_type(imm20, rd, LUI)
}

pub fn sw(rs2: u32, rs1: u32, imm: i32) -> u32 {
    s_type(imm, rs2, rs1, 0b010)
}

pub fn lw(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(imm, rs1, 0b010, rd, LOAD)
}

pub fn jal(rd: u32, imm: i32) -> u32 {
    j_type(imm, rd)
}

/// Loads `x{rd}` with an arbitrary 32-bit constant (lui + addi).
pub fn li(rd: u32, value: u32) -> [u32; 2] {
    let lo = ((value & 0xfff) as i32) << 20 >> 20;
    let hi = value.wrapping_sub(lo as u32) >> 12;
    [lui(rd, hi), addi(rd, rd, lo)]
}

pub fn to_bytes(program: &[u32]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// A machine with `program` loaded at 0 that records LED writes.
pub fn machine_with_config(cfg: &EmuConfig, program: &[u32]) -> Machine<Vec<u32>> {
    let mut machine = Machine::new(cfg, Vec::new());
    load_image_bytes(&to_bytes(program), &mut machine.bus.ram);
    machine
}

pub fn machine(program: &[u32]) -> Machine<Vec<u32>> {
    machine_with_config(&EmuConfig::default(), program)
}

/// Executes exactly `program.len()` instructions, panicking on any fault.
pub fn run_all(program: &[u32]) -> Machine<Vec<u32>> {
    let mut m = machine(program);
    for _ in 0..program.len() {
        m.step().expect("step failed");
    }
    m
}
