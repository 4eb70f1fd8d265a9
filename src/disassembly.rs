use iced_x86::{Decoder, DecoderOptions, Formatter, IntelFormatter};

use crate::source::{Disassembler, Instruction};

/// x86 decoder producing Intel syntax, 64-bit mode unless told otherwise.
#[derive(Debug, Clone, Copy)]
pub struct X86Disassembler {
    bitness: u32,
}

impl Default for X86Disassembler {
    fn default() -> Self {
        X86Disassembler { bitness: 64 }
    }
}

impl X86Disassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode in 32-bit mode.
    pub fn x86_32() -> Self {
        X86Disassembler { bitness: 32 }
    }
}

impl Disassembler for X86Disassembler {
    fn decode(&self, bytes: &[u8], offset: u64) -> Option<Instruction> {
        if bytes.is_empty() {
            return None;
        }
        let mut decoder = Decoder::with_ip(self.bitness, bytes, offset, DecoderOptions::NONE);
        let instruction = decoder.decode();
        // truncated or undefined opcodes
        if instruction.is_invalid() {
            return None;
        }
        let mut formatter = IntelFormatter::new();
        let mut text = String::new();
        formatter.format(&instruction, &mut text);
        Some(Instruction {
            text,
            len: instruction.len(),
        })
    }
}
