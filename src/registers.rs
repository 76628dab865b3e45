//! AArch64 general-purpose register naming, and the small lookup tables
//! (shift types, extend types) shared by several of the print-type
//! formatters.
//!
//! Register 31 has no fixed name: depending on the instruction field it
//! appears in, it names either the stack pointer or the zero register.
//! Callers pass that distinction in explicitly (the `sp` parameter) rather
//! than this module guessing it from context.

const W_REG: [&str; 31] = [
    "w0", "w1", "w2", "w3", "w4", "w5", "w6", "w7", "w8", "w9", "w10", "w11", "w12", "w13", "w14",
    "w15", "w16", "w17", "w18", "w19", "w20", "w21", "w22", "w23", "w24", "w25", "w26", "w27",
    "w28", "w29", "w30",
];

/// Note index 30 is "lr", not "x30": AArch64 disassembly conventionally
/// names the link register by its role rather than its number.
const X_REG: [&str; 31] = [
    "x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8", "x9", "x10", "x11", "x12", "x13", "x14",
    "x15", "x16", "x17", "x18", "x19", "x20", "x21", "x22", "x23", "x24", "x25", "x26", "x27",
    "x28", "x29", "lr",
];

const SHIFT_NAMES: [&str; 4] = ["lsl", "lsr", "asr", "ror"];

const EXTEND_NAMES: [&str; 8] = [
    "uxtb", "uxth", "uxtw", "uxtx", "sxtb", "sxth", "sxtw", "sxtx",
];

/// Returns the 32-bit register name for `num` (0..=30), or `"wsp"`/`"wzr"`
/// for 31 depending on `sp`.
pub fn w_reg(num: u32, sp: bool) -> &'static str {
    if num == 31 {
        if sp {
            "wsp"
        } else {
            "wzr"
        }
    } else {
        W_REG[num as usize]
    }
}

/// Returns the 64-bit register name for `num` (0..=30), or `"sp"`/`"xzr"`
/// for 31 depending on `sp`.
pub fn x_reg(num: u32, sp: bool) -> &'static str {
    if num == 31 {
        if sp {
            "sp"
        } else {
            "xzr"
        }
    } else {
        X_REG[num as usize]
    }
}

/// Returns the register name for `num`, choosing the 32- or 64-bit view
/// according to `is64`.
pub fn reg(is64: bool, num: u32, sp: bool) -> &'static str {
    if is64 {
        x_reg(num, sp)
    } else {
        w_reg(num, sp)
    }
}

/// Returns the mnemonic name of one of the four shift types (`00`=lsl,
/// `01`=lsr, `10`=asr, `11`=ror).
pub fn shift_name(shift: u32) -> &'static str {
    SHIFT_NAMES[(shift & 3) as usize]
}

/// Returns the mnemonic name of one of the eight extend types used by
/// extended-register arithmetic.
pub fn extend_name(option: u32) -> &'static str {
    EXTEND_NAMES[(option & 7) as usize]
}

/// TYPE_04 (extended-register arithmetic) prints Rm using the register
/// width implied by the extend option, except `uxtx`/`sxtx` which imply a
/// 64-bit Rm regardless of the instruction's own SF bit.
pub fn extended_operand_is64(option: u32) -> bool {
    matches!(option & 7, 0b011 | 0b111)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn x_reg_names_link_register_not_x30() {
        assert_eq!(x_reg(30, false), "lr");
        assert_eq!(x_reg(30, true), "lr");
    }

    #[test]
    fn register_31_depends_on_sp_flag() {
        assert_eq!(x_reg(31, true), "sp");
        assert_eq!(x_reg(31, false), "xzr");
        assert_eq!(w_reg(31, true), "wsp");
        assert_eq!(w_reg(31, false), "wzr");
    }

    #[test]
    fn random_register_numbers_below_31_are_stable_across_sp_flag() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let num = rng.random_range(0..31u32);
            assert_eq!(w_reg(num, true), w_reg(num, false));
            assert_eq!(x_reg(num, true), x_reg(num, false));
        }
    }

    #[test]
    fn shift_and_extend_tables_cover_all_encodings() {
        for i in 0..4 {
            assert!(!shift_name(i).is_empty());
        }
        for i in 0..8 {
            assert!(!extend_name(i).is_empty());
        }
    }

    #[test]
    fn extended_operand_width_matches_uxtx_sxtx_only() {
        assert!(extended_operand_is64(0b011));
        assert!(extended_operand_is64(0b111));
        assert!(!extended_operand_is64(0b010));
        assert!(!extended_operand_is64(0b000));
    }
}
