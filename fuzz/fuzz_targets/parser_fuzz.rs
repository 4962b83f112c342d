//! Parser fuzz target: feed arbitrary text to the tokenizer, the parser, and conversion.
//! None of them may panic; they return tokens, markers, or an error.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let tokens = codemark::tokenize(s);
    assert!(tokens.last().is_some_and(|t| t.is_terminal()));
    if let Ok(markers) = codemark::parse(s) {
        let manager = codemark::ConversionManager::new(std::sync::Arc::new(codemark::Registry::new()));
        for m in &markers {
            let _ = manager.convert_to(m, &codemark::TypeId::Any);
            let _ = manager.convert_to(m, &codemark::TypeId::sequence_of(codemark::TypeId::I8));
            let _ = manager.convert_to(m, &codemark::TypeId::U64);
            let _ = manager.convert_to(m, &codemark::TypeId::Rune);
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
