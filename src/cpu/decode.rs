use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Invalid { inst: u32 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Invalid { inst } => write!(f, "invalid instruction: 0x{:08x}", inst),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Every field of an instruction word, extracted without looking at the
/// opcode. Immediates other than `imm_u` are sign-extended from bit 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub opcode: u8,
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub funct3: u8,
    pub funct7: u8,
    pub imm_u: u32,
    pub imm_j: i32,
    pub imm_i: i32,
    pub imm_s: i32,
    pub imm_b: i32,
}

fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

impl Fields {
    pub fn new(inst: u32) -> Self {
        let imm_i = sign_extend(inst >> 20, 12);
        let imm_s = {
            let imm4_0 = (inst >> 7) & 0x1f;
            let imm11_5 = (inst >> 25) & 0x7f;
            sign_extend((imm11_5 << 5) | imm4_0, 12)
        };
        let imm_b = {
            let imm11 = (inst >> 7) & 0x1;
            let imm4_1 = (inst >> 8) & 0xf;
            let imm10_5 = (inst >> 25) & 0x3f;
            let imm12 = (inst >> 31) & 0x1;
            sign_extend(
                (imm12 << 12) | (imm11 << 11) | (imm10_5 << 5) | (imm4_1 << 1),
                13,
            )
        };
        let imm_j = {
            let imm19_12 = (inst >> 12) & 0xff;
            let imm11 = (inst >> 20) & 0x1;
            let imm10_1 = (inst >> 21) & 0x3ff;
            let imm20 = (inst >> 31) & 0x1;
            sign_extend(
                (imm20 << 20) | (imm19_12 << 12) | (imm11 << 11) | (imm10_1 << 1),
                21,
            )
        };

        Self {
            opcode: (inst & 0x7f) as u8,
            rd: ((inst >> 7) & 0x1f) as u8,
            rs1: ((inst >> 15) & 0x1f) as u8,
            rs2: ((inst >> 20) & 0x1f) as u8,
            funct3: ((inst >> 12) & 0x7) as u8,
            funct7: ((inst >> 25) & 0x7f) as u8,
            imm_u: inst & 0xffff_f000,
            imm_j,
            imm_i,
            imm_s,
            imm_b,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instr {
    // R-type (0b0110011)
    Add { rd: u8, rs1: u8, rs2: u8 },
    Sub { rd: u8, rs1: u8, rs2: u8 },
    Xor { rd: u8, rs1: u8, rs2: u8 },
    Or { rd: u8, rs1: u8, rs2: u8 },
    And { rd: u8, rs1: u8, rs2: u8 },
    Sll { rd: u8, rs1: u8, rs2: u8 },
    Srl { rd: u8, rs1: u8, rs2: u8 },
    Sra { rd: u8, rs1: u8, rs2: u8 },
    Slt { rd: u8, rs1: u8, rs2: u8 },
    Sltu { rd: u8, rs1: u8, rs2: u8 },
    // I-type arithmetic (0b0010011)
    Addi { rd: u8, rs1: u8, imm: i32 },
    Xori { rd: u8, rs1: u8, imm: i32 },
    Ori { rd: u8, rs1: u8, imm: i32 },
    Andi { rd: u8, rs1: u8, imm: i32 },
    Slli { rd: u8, rs1: u8, shamt: u8 },
    Srli { rd: u8, rs1: u8, shamt: u8 },
    Srai { rd: u8, rs1: u8, shamt: u8 },
    Slti { rd: u8, rs1: u8, imm: i32 },
    Sltiu { rd: u8, rs1: u8, imm: i32 },
    // I-type load (0b0000011)
    LB { rd: u8, rs1: u8, off: i32 },
    LBU { rd: u8, rs1: u8, off: i32 },
    LH { rd: u8, rs1: u8, off: i32 },
    LHU { rd: u8, rs1: u8, off: i32 },
    LW { rd: u8, rs1: u8, off: i32 },
    // S-type (0b0100011)
    SB { rs1: u8, rs2: u8, off: i32 },
    SH { rs1: u8, rs2: u8, off: i32 },
    SW { rs1: u8, rs2: u8, off: i32 },
    // B-type (0b1100011)
    Beq { rs1: u8, rs2: u8, off: i32 },
    Bne { rs1: u8, rs2: u8, off: i32 },
    Blt { rs1: u8, rs2: u8, off: i32 },
    Bge { rs1: u8, rs2: u8, off: i32 },
    Bltu { rs1: u8, rs2: u8, off: i32 },
    Bgeu { rs1: u8, rs2: u8, off: i32 },
    // J-type (0b1101111)
    Jal { rd: u8, off: i32 },
    // I-type jump (0b1100111)
    Jalr { rd: u8, rs1: u8, off: i32 },
    // U-type
    Lui { rd: u8, imm: u32 },   // 0b0110111
    Auipc { rd: u8, imm: u32 }, // 0b0010111
}

pub fn decode(inst: u32) -> Result<Instr, DecodeError> {
    let Fields {
        opcode,
        rd,
        rs1,
        rs2,
        funct3,
        funct7,
        imm_u,
        imm_j,
        imm_i,
        imm_s,
        imm_b,
    } = Fields::new(inst);
    let invalid = Err(DecodeError::Invalid { inst });

    match opcode {
        // r type
        0b0110011 => match (funct3, funct7) {
            (0x0, 0x00) => Ok(Instr::Add { rd, rs1, rs2 }),
            (0x0, 0x20) => Ok(Instr::Sub { rd, rs1, rs2 }),
            (0x4, 0x00) => Ok(Instr::Xor { rd, rs1, rs2 }),
            (0x6, 0x00) => Ok(Instr::Or { rd, rs1, rs2 }),
            (0x7, 0x00) => Ok(Instr::And { rd, rs1, rs2 }),
            (0x1, 0x00) => Ok(Instr::Sll { rd, rs1, rs2 }),
            (0x5, 0x00) => Ok(Instr::Srl { rd, rs1, rs2 }),
            (0x5, 0x20) => Ok(Instr::Sra { rd, rs1, rs2 }),
            (0x2, 0x00) => Ok(Instr::Slt { rd, rs1, rs2 }),
            (0x3, 0x00) => Ok(Instr::Sltu { rd, rs1, rs2 }),
            _ => invalid,
        },
        // i type
        0b0010011 => {
            // shift amount lives in the rs2 slot
            let shamt = rs2;
            match (funct3, funct7) {
                (0x0, _) => Ok(Instr::Addi { rd, rs1, imm: imm_i }),
                (0x4, _) => Ok(Instr::Xori { rd, rs1, imm: imm_i }),
                (0x6, _) => Ok(Instr::Ori { rd, rs1, imm: imm_i }),
                (0x7, _) => Ok(Instr::Andi { rd, rs1, imm: imm_i }),
                (0x2, _) => Ok(Instr::Slti { rd, rs1, imm: imm_i }),
                (0x3, _) => Ok(Instr::Sltiu { rd, rs1, imm: imm_i }),
                (0x1, 0x00) => Ok(Instr::Slli { rd, rs1, shamt }),
                (0x5, 0x00) => Ok(Instr::Srli { rd, rs1, shamt }),
                (0x5, 0x20) => Ok(Instr::Srai { rd, rs1, shamt }),
                _ => invalid,
            }
        }
        0b0000011 => match funct3 {
            0x0 => Ok(Instr::LB { rd, rs1, off: imm_i }),
            0x4 => Ok(Instr::LBU { rd, rs1, off: imm_i }),
            0x1 => Ok(Instr::LH { rd, rs1, off: imm_i }),
            0x5 => Ok(Instr::LHU { rd, rs1, off: imm_i }),
            0x2 => Ok(Instr::LW { rd, rs1, off: imm_i }),
            _ => invalid,
        },
        // s type
        0b0100011 => match funct3 {
            0x0 => Ok(Instr::SB { rs1, rs2, off: imm_s }),
            0x1 => Ok(Instr::SH { rs1, rs2, off: imm_s }),
            0x2 => Ok(Instr::SW { rs1, rs2, off: imm_s }),
            _ => invalid,
        },
        // b type
        0b1100011 => match funct3 {
            0x0 => Ok(Instr::Beq { rs1, rs2, off: imm_b }),
            0x1 => Ok(Instr::Bne { rs1, rs2, off: imm_b }),
            0x4 => Ok(Instr::Blt { rs1, rs2, off: imm_b }),
            0x5 => Ok(Instr::Bge { rs1, rs2, off: imm_b }),
            0x6 => Ok(Instr::Bltu { rs1, rs2, off: imm_b }),
            0x7 => Ok(Instr::Bgeu { rs1, rs2, off: imm_b }),
            _ => invalid,
        },
        // u type
        0b0110111 => Ok(Instr::Lui { rd, imm: imm_u }),
        0b0010111 => Ok(Instr::Auipc { rd, imm: imm_u }),
        // j type
        0b1101111 => Ok(Instr::Jal { rd, off: imm_j }),
        // i type jalr
        0b1100111 => match funct3 {
            0x0 => Ok(Instr::Jalr { rd, rs1, off: imm_i }),
            _ => invalid,
        },
        _ => invalid,
    }
}
