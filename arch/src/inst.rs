use crate::{flag::Flag, reg::Reg};

use color_print::cformat;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Memory address: `sf +4`, `sf - 2`, `[r1]`, `[name]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Addr {
    Frame(i16),
    Reg(Reg),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Reg(Reg),
    Imm(u16),
    Label(String),
    Mem(Addr),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inst {
    PUSH(Reg),
    POP(Reg),
    MOV(Operand, Operand),
    ADD(Reg, Operand),
    SUB(Reg, Operand),
    MUL(Reg, Reg),
    DIV(Reg, Reg),
    CMP(Reg, Reg),
    FLG(Reg, Flag),
    CALL(Reg),
    JMP(String),
    JNZ(Reg, String),
    RET(),
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Addr::Frame(offset) if *offset < 0 => write!(f, "{} - {}", Reg::SF, offset.unsigned_abs()),
            Addr::Frame(offset) => write!(f, "{} +{}", Reg::SF, offset),
            Addr::Reg(reg) => write!(f, "[{}]", reg),
            Addr::Label(name) => write!(f, "[{}]", name),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::Imm(val) => write!(f, "{}", val),
            Operand::Label(name) => write!(f, "{}", name),
            Operand::Mem(addr) => write!(f, "{}", addr),
        }
    }
}

impl From<Reg> for Operand {
    fn from(reg: Reg) -> Self {
        Operand::Reg(reg)
    }
}

impl From<Addr> for Operand {
    fn from(addr: Addr) -> Self {
        Operand::Mem(addr)
    }
}

impl Inst {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Inst::PUSH(_) => "push",
            Inst::POP(_) => "pop",
            Inst::MOV(_, _) => "mov",
            Inst::ADD(_, _) => "add",
            Inst::SUB(_, _) => "sub",
            Inst::MUL(_, _) => "mul",
            Inst::DIV(_, _) => "div",
            Inst::CMP(_, _) => "cmp",
            Inst::FLG(_, _) => "flg",
            Inst::CALL(_) => "call",
            Inst::JMP(_) => "jmp",
            Inst::JNZ(_, _) => "jnz",
            Inst::RET() => "ret",
        }
    }

    pub fn operands(&self) -> Vec<String> {
        match self {
            Inst::PUSH(rs) | Inst::POP(rs) | Inst::CALL(rs) => vec![rs.to_string()],
            Inst::MOV(dst, src) => vec![dst.to_string(), src.to_string()],
            Inst::ADD(rd, src) | Inst::SUB(rd, src) => vec![rd.to_string(), src.to_string()],
            Inst::MUL(rd, rs) | Inst::DIV(rd, rs) | Inst::CMP(rd, rs) => {
                vec![rd.to_string(), rs.to_string()]
            }
            Inst::FLG(rd, flag) => vec![rd.to_string(), flag.to_string()],
            Inst::JMP(label) => vec![label.clone()],
            Inst::JNZ(rs, label) => vec![rs.to_string(), label.clone()],
            Inst::RET() => vec![],
        }
    }

    pub fn cformat(&self) -> String {
        cformat!(
            "<r>{:<5}</><b>{}</>",
            self.mnemonic(),
            self.operands().iter().join(", ")
        )
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands = self.operands();
        if operands.is_empty() {
            write!(f, "{}", self.mnemonic())
        } else {
            write!(f, "{} {}", self.mnemonic(), operands.iter().join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_inst {
        ($($name:ident: $inst:expr => $text:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!($inst.to_string(), $text);
                }
            )*
        }
    }

    test_inst! {
        test_push: Inst::PUSH(Reg::SF) => "push sf",
        test_pop: Inst::POP(Reg::R3) => "pop r3",
        test_mov_reg: Inst::MOV(Reg::SF.into(), Reg::SP.into()) => "mov sf, sp",
        test_mov_imm: Inst::MOV(Reg::R0.into(), Operand::Imm(5)) => "mov r0, 5",
        test_mov_label: Inst::MOV(Reg::R0.into(), Operand::Label("main".into())) => "mov r0, main",
        test_load_param: Inst::MOV(Reg::R0.into(), Addr::Frame(4).into()) => "mov r0, sf +4",
        test_store_local: Inst::MOV(Addr::Frame(-2).into(), Reg::R1.into()) => "mov sf - 2, r1",
        test_store_far_local: Inst::MOV(Addr::Frame(i16::MIN).into(), Reg::R1.into()) => "mov sf - 32768, r1",
        test_load_ptr: Inst::MOV(Reg::R2.into(), Addr::Reg(Reg::R1).into()) => "mov r2, [r1]",
        test_store_static: Inst::MOV(Addr::Label("x".into()).into(), Reg::R0.into()) => "mov [x], r0",
        test_add: Inst::ADD(Reg::R0, Reg::R1.into()) => "add r0, r1",
        test_add_imm: Inst::ADD(Reg::SP, Operand::Imm(4)) => "add sp, 4",
        test_sub: Inst::SUB(Reg::SP, Operand::Imm(2)) => "sub sp, 2",
        test_mul: Inst::MUL(Reg::R0, Reg::R1) => "mul r0, r1",
        test_div: Inst::DIV(Reg::R0, Reg::R1) => "div r0, r1",
        test_cmp: Inst::CMP(Reg::R0, Reg::R1) => "cmp r0, r1",
        test_flg: Inst::FLG(Reg::R0, Flag::LessEq) => "flg r0, FLAGS_LESSEQ",
        test_call: Inst::CALL(Reg::R4) => "call r4",
        test_jmp: Inst::JMP("L1".into()) => "jmp L1",
        test_jnz: Inst::JNZ(Reg::R0, "L0".into()) => "jnz r0, L0",
        test_ret: Inst::RET() => "ret",
    }
}
