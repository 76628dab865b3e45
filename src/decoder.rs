//! Disassembly entry point: host callback interface, the instruction
//! lookup + global-option decoding shared by every print-type, and the
//! five print-type formatters themselves.
//!
//! Grounded on the reference implementation's `disasm()`: same table scan,
//! same option-application order, same five `TYPE_0x` formatting blocks.
//! Unlike the reference, which always prints *something* (falling back to
//! a raw `"undefined"` line), undefined paths are threaded through as an
//! internal error and only converted to that text at the very end, in the
//! style of the teacher's `unpredictable()`/`undefined()` control-flow
//! helpers in its instruction decoders.

use crate::bitmask::{decode_bitmask, move_wide_preferred};
use crate::grammar::{token_value, token_value_signed};
use crate::registers::{extend_name, extended_operand_is64, reg, shift_name, w_reg, x_reg};
use crate::table::{table, Entry, OptionFlags, PrintType};

/// Abstracts the debugger/runtime that owns memory and the output stream.
pub trait Host {
    /// Reads the 32-bit instruction word at `addr`.
    fn read_word(&mut self, addr: u64) -> u32;
    /// Emits one fully-formatted disassembly line (no trailing newline).
    fn print(&mut self, text: &str);
}

/// Marks an encoding this crate cannot disassemble: either no table entry
/// matched, or a matched entry's operand fields encode a reserved or
/// unpredictable combination. Never escapes this module as a public
/// `Result` — [`disasm`] always succeeds and always advances `loc`.
struct Undefined;

/// Disassembles the instruction word at `loc`, printing exactly one line
/// through `host` and returning the address of the next instruction.
///
/// `altfmt` is accepted for interface compatibility with the reference
/// disassembler's alternate-format switch; this crate has only one output
/// format, so it has no effect.
pub fn disasm(host: &mut dyn Host, loc: u64, altfmt: bool) -> u64 {
    let _ = altfmt;
    let insn = host.read_word(loc);
    let line = match format_instruction(insn, loc) {
        Ok(text) => text,
        Err(Undefined) => format!("undefined\t{:08x}", insn),
    };
    host.print(&line);
    loc + 4
}

fn find_entry(insn: u32) -> Option<&'static Entry> {
    table()
        .iter()
        .find(|e| e.mask != 0 && (insn & e.mask) == e.pattern)
}

/// Operand-independent decisions every print-type shares, folded once per
/// matched entry: register width, sign-extension, the immediate value
/// (already sign-extended and scaled), and which register fields name the
/// stack pointer rather than the zero register.
struct GlobalOptions {
    sf: bool,
    sign_ext: bool,
    imm: i64,
    rd_sp: bool,
    rt_sp: bool,
    rn_sp: bool,
    rm_sp: bool,
    has_shift_ror: bool,
}

fn apply_global_options(entry: &Entry, insn: u32) -> GlobalOptions {
    let mut sf = !entry.flags.contains(OptionFlags::SF32);
    if let Some(v) = token_value(insn, &entry.tokens, "SF") {
        sf = v != 0;
    }
    if entry.flags.contains(OptionFlags::SF_INV) {
        sf = !sf;
    }

    let mut sign_ext = false;
    if let Some(v) = token_value(insn, &entry.tokens, "SIGN") {
        sign_ext = v == 0;
    }
    if entry.flags.contains(OptionFlags::SIGN_EXT) {
        sign_ext = true;
    }

    let mut imm: i64 = if sign_ext {
        token_value_signed(insn, &entry.tokens, "IMM").unwrap_or(0) as i64
    } else {
        token_value(insn, &entry.tokens, "IMM").unwrap_or(0) as i64
    };
    if entry.flags.contains(OptionFlags::MULT_4) {
        imm <<= 2;
    }
    if entry.flags.contains(OptionFlags::MULT_16) {
        imm <<= 4;
    }

    GlobalOptions {
        sf,
        sign_ext,
        imm,
        rd_sp: entry.flags.contains(OptionFlags::RD_SP),
        rt_sp: entry.flags.contains(OptionFlags::RT_SP),
        rn_sp: entry.flags.contains(OptionFlags::RN_SP),
        rm_sp: entry.flags.contains(OptionFlags::RM_SP),
        has_shift_ror: entry.flags.contains(OptionFlags::SHIFT_ROR),
    }
}

fn format_instruction(insn: u32, loc: u64) -> Result<String, Undefined> {
    let entry = find_entry(insn).ok_or(Undefined)?;
    let opts = apply_global_options(entry, insn);
    match entry.print_type {
        PrintType::Type01 => format_type01(entry, insn, &opts),
        PrintType::Type02 => format_type02(entry, insn, &opts),
        PrintType::Type03 => format_type03(entry, insn, loc, &opts),
        PrintType::Type04 => format_type04(entry, insn, &opts),
        PrintType::Type05 => format_type05(entry, insn, &opts),
    }
}

/// Shifted-register arithmetic and immediate-with-optional-lsl#12.
fn format_type01(entry: &Entry, insn: u32, opts: &GlobalOptions) -> Result<String, Undefined> {
    let rd = token_value(insn, &entry.tokens, "RD");
    let rn = token_value(insn, &entry.tokens, "RN");
    let rm = token_value(insn, &entry.tokens, "RM");
    let shift = token_value(insn, &entry.tokens, "SHIFT").unwrap_or(0);
    if shift == 3 && !opts.has_shift_ror {
        return Err(Undefined);
    }

    let mut out = format!("{}\t", entry.name);
    match (rd, rn) {
        (Some(rd), Some(rn)) => {
            out.push_str(&format!(
                "{}, {}",
                reg(opts.sf, rd, opts.rd_sp),
                reg(opts.sf, rn, opts.rn_sp)
            ));
        }
        (Some(rd), None) => out.push_str(reg(opts.sf, rd, opts.rd_sp)),
        (None, rn) => out.push_str(reg(opts.sf, rn.unwrap_or(0), opts.rn_sp)),
    }

    if let Some(rm) = rm {
        out.push_str(&format!(", {}", reg(opts.sf, rm, opts.rm_sp)));
        if opts.imm != 0 {
            out.push_str(&format!(", {} #{}", shift_name(shift), opts.imm));
        }
    } else {
        if opts.imm != 0 || shift != 0 {
            out.push_str(&format!(", #0x{:x}", opts.imm));
        }
        if shift != 0 {
            out.push_str(" lsl #12");
        }
    }
    Ok(out)
}

/// Loads and stores: register-offset immediate (post/pre-index),
/// unsigned-offset immediate, and register-offset (extended) forms.
fn format_type02(entry: &Entry, insn: u32, opts: &GlobalOptions) -> Result<String, Undefined> {
    let rt = token_value(insn, &entry.tokens, "RT").ok_or(Undefined)?;
    let rn = token_value(insn, &entry.tokens, "RN").ok_or(Undefined)?;
    let mut option = token_value(insn, &entry.tokens, "OPTION").unwrap_or(0);
    let scale = token_value(insn, &entry.tokens, "SCALE");
    let rm = token_value(insn, &entry.tokens, "RM");

    let mut out = format!("{}\t{}, ", entry.name, reg(opts.sf, rt, opts.rt_sp));

    match rm {
        None => {
            let mut imm = opts.imm;
            if !opts.sign_ext {
                let size = (insn >> 30) & 3;
                imm <<= size;
                option = 0;
            }
            let (pre, inside) = match option {
                0 => (false, true),
                1 => (false, false),
                _ => (true, true),
            };
            if inside {
                out.push_str(&format!("[{}", x_reg(rn, true)));
                if imm != 0 {
                    out.push_str(&format!(", #{}", imm));
                }
                out.push(']');
            } else {
                out.push_str(&format!("[{}]", x_reg(rn, true)));
                if imm != 0 {
                    out.push_str(&format!(", #{}", imm));
                }
            }
            if pre {
                out.push('!');
            }
        }
        Some(rm) => {
            out.push_str(&format!(
                "[{}, {}",
                x_reg(rn, true),
                reg(extended_operand_is64(option), rm, opts.rm_sp)
            ));
            let scale = scale.unwrap_or(0);
            let amount = if scale == 0 { 0 } else { (insn >> 30) & 3 };
            match option {
                0x2 => out.push_str(&format!(", uxtw #{}", amount)),
                0x3 => {
                    if scale != 0 {
                        out.push_str(&format!(", lsl #{}", amount));
                    }
                }
                0x6 => out.push_str(&format!(", sxtw #{}", amount)),
                0x7 => out.push_str(&format!(", sxtx #{}", amount)),
                _ => out.push_str(", rsv"),
            }
            out.push(']');
        }
    }
    Ok(out)
}

/// PC-relative literal loads and wide-immediate moves.
fn format_type03(
    entry: &Entry,
    insn: u32,
    loc: u64,
    opts: &GlobalOptions,
) -> Result<String, Undefined> {
    let rt = token_value(insn, &entry.tokens, "RT").ok_or(Undefined)?;
    let mut out = format!("{}\t{}, ", entry.name, reg(opts.sf, rt, opts.rt_sp));
    if entry.flags.contains(OptionFlags::LITERAL) {
        let target = (loc as i64).wrapping_add(opts.imm);
        out.push_str(&format!("0x{:x}", target));
    } else {
        out.push_str(&format!("#{}", opts.imm));
    }
    Ok(out)
}

/// Extended-register arithmetic.
fn format_type04(entry: &Entry, insn: u32, opts: &GlobalOptions) -> Result<String, Undefined> {
    let rd = token_value(insn, &entry.tokens, "RD");
    let rn = token_value(insn, &entry.tokens, "RN").unwrap_or(0);
    let rm = token_value(insn, &entry.tokens, "RM").unwrap_or(0);
    let option = token_value(insn, &entry.tokens, "OPTION").unwrap_or(0);

    let is_sp = rd.unwrap_or(0) == 31 || rn == 31;
    let lsl_uxtw = !opts.sf && option == 2;
    let lsl_uxtx = opts.sf && option == 3;
    let lsl_preferred = is_sp && (lsl_uxtw || lsl_uxtx);
    let extend = if lsl_preferred && opts.imm == 0 {
        None
    } else if lsl_preferred {
        Some("lsl")
    } else {
        Some(extend_name(option))
    };

    let mut out = format!("{}\t", entry.name);
    if let Some(rd) = rd {
        out.push_str(&format!("{}, ", reg(opts.sf, rd, opts.rd_sp)));
    }
    out.push_str(&format!("{}, ", reg(opts.sf, rn, true)));
    if opts.sf && extended_operand_is64(option) {
        out.push_str(x_reg(rm, false));
    } else {
        out.push_str(w_reg(rm, false));
    }
    if let Some(ext) = extend {
        out.push_str(&format!(", {} #{}", ext, opts.imm));
    }
    Ok(out)
}

/// Logical (bitmask) immediate forms, with the `ORR`-to-`MOV` alias
/// preference.
fn format_type05(entry: &Entry, insn: u32, opts: &GlobalOptions) -> Result<String, Undefined> {
    let rd = token_value(insn, &entry.tokens, "RD");
    let rn = token_value(insn, &entry.tokens, "RN").unwrap_or(0);
    let n = token_value(insn, &entry.tokens, "N").unwrap_or(0);
    let immr = token_value(insn, &entry.tokens, "IMMR").unwrap_or(0);
    let imms = token_value(insn, &entry.tokens, "IMMS").unwrap_or(0);

    if !opts.sf && n != 0 {
        return Err(Undefined);
    }
    let wmask = decode_bitmask(opts.sf, n, imms, immr, true).map_err(|_| Undefined)?;

    let mov_preferred =
        entry.name == "orr" && rn == 31 && !move_wide_preferred(opts.sf, n, imms, immr);

    let mut out = format!("{}\t", if mov_preferred { "mov" } else { entry.name });
    if let Some(rd) = rd {
        out.push_str(&format!("{}, ", reg(opts.sf, rd, opts.rd_sp)));
    }
    if !mov_preferred {
        out.push_str(&format!("{}, ", reg(opts.sf, rn, false)));
    }
    out.push_str(&format!("#0x{:x}", wmask));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    struct RecordingHost<'a> {
        words: &'a [(u64, u32)],
        printed: Vec<String>,
    }

    impl<'a> Host for RecordingHost<'a> {
        fn read_word(&mut self, addr: u64) -> u32 {
            self.words
                .iter()
                .find(|(a, _)| *a == addr)
                .map(|(_, w)| *w)
                .unwrap_or(0)
        }
        fn print(&mut self, text: &str) {
            self.printed.push(text.to_owned());
        }
    }

    #[test]
    fn advances_location_by_four() {
        let words = [(0u64, 0x0b020020u32)];
        let mut host = RecordingHost { words: &words, printed: Vec::new() };
        let next = disasm(&mut host, 0, false);
        assert_eq!(next, 4);
        assert_eq!(host.printed[0], "add\tw0, w1, w2");
    }

    #[test]
    fn unmatched_encoding_prints_undefined() {
        let words = [(0u64, 0xffff_ffffu32)];
        let mut host = RecordingHost { words: &words, printed: Vec::new() };
        disasm(&mut host, 0, false);
        assert_eq!(host.printed[0], "undefined\tffffffff");
    }

    #[test]
    fn golden_disassembly() {
        let file = File::open("src/test_disasm.txt").unwrap();
        let reader = BufReader::new(file);
        for line in reader.lines().map(|l| l.unwrap()) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(3, ' ');
            let loc = u64::from_str_radix(parts.next().unwrap(), 16).unwrap();
            let bytes = hex::decode(parts.next().unwrap()).unwrap();
            let insn = u32::from_le_bytes(bytes.try_into().unwrap());
            let expected = parts.next().unwrap();

            let words = [(loc, insn)];
            let mut host = RecordingHost { words: &words, printed: Vec::new() };
            disasm(&mut host, loc, false);
            assert_eq!(host.printed[0], expected, "mismatch for insn {:08x}", insn);
        }
    }
}
