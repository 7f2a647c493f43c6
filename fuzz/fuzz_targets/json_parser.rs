#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = arbor::from_json(data) {
        let _ = arbor::from_json(tree.to_json().as_bytes());
        let _ = tree.to_xml();
    }
});
