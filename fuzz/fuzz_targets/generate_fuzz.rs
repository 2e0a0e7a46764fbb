//! Generator fuzz target: feed arbitrary bytes as a protocol document.
//! Loading and generation must not panic; malformed entries are reported as failures.
//! Build with: cargo fuzz run generate_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(protocol) = protodef_ts::Protocol::from_json_str(s) {
        if let Ok(doc) = protodef_ts::generate(&protocol, protodef_ts::CompileOptions::default()) {
            let _ = doc.render();
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run generate_fuzz");
}
