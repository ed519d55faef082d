#![no_main]
use libfuzzer_sys::fuzz_target;
use matcalc_engine::{evaluate, Context};

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are not. Lossy conversion keeps almost-text inputs useful.
    let source = String::from_utf8_lossy(data);
    let mut context = Context::new();
    let _ = evaluate(&source, &mut context);
});
