#![no_main]

use libfuzzer_sys::fuzz_target;
use refile_core::{compile_table, parse_table};

fuzz_target!(|data: &[u8]| {
    if let Ok(rows) = parse_table(data, b',') {
        let _ = compile_table(&rows);
    }
});
