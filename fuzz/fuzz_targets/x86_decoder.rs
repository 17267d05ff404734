#![no_main]

use libfuzzer_sys::fuzz_target;
use xdec_core::{Bitness, Code};
use xdec_disasm::{Decoder, MAX_INSTRUCTION_LENGTH};

fuzz_target!(|data: &[u8]| {
    // First byte picks the mode, the rest is code
    let Some((&mode, code)) = data.split_first() else {
        return;
    };
    let bitness = match mode % 3 {
        0 => Bitness::Bits16,
        1 => Bitness::Bits32,
        _ => Bitness::Bits64,
    };

    let mut decoder = Decoder::new(bitness, code, 0x1000);
    let mut count = 0;
    while decoder.can_decode() && count < 100 {
        let start = decoder.position();
        let instr = decoder.decode();
        assert!(instr.len() <= MAX_INSTRUCTION_LENGTH);
        assert!(start + instr.len() <= code.len());
        assert_eq!(decoder.position(), start + instr.len());
        if instr.code() != Code::INVALID {
            // The same bytes alone decode to the same instruction
            let bytes = &code[start..start + instr.len()];
            let again = Decoder::new(bitness, bytes, instr.ip()).decode();
            assert_eq!(again, instr);
        }
        if instr.is_empty() {
            break;
        }
        count += 1;
    }
});
