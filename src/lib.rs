//! A table-driven AArch64 (ARMv8-A) instruction disassembler. The caller
//! supplies a [`decoder::Host`] that can read instruction words and
//! receive formatted output; [`decoder::disasm`] decodes one instruction
//! at a time.
//!
//! The instruction table itself is declarative data (see [`table`]),
//! compiled once into match masks and operand tokens by [`grammar`] and
//! consulted by [`decoder`] on every call.

pub mod bitmask;
pub mod decoder;
pub mod grammar;
pub mod helpers;
pub mod registers;
pub mod table;

pub use decoder::{disasm, Host};
pub use table::compile_instruction_table;
