#![no_main]

use cannabus::ranges;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, bool)| {
    let (text, hex) = data;
    let base = if hex { 16 } else { 0 };
    let (set, _) = ranges::parse_with_diagnostics(text, base);
    // formatted notation must read back to the same set
    assert_eq!(ranges::parse(&ranges::format(&set), 10), set);
    assert_eq!(ranges::parse(&ranges::format_hex(&set), 16), set);
});
