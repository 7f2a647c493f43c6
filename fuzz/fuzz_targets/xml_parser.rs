#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = arbor::from_xml(data) {
        let _ = arbor::from_xml(doc.to_xml().as_bytes());
        let _ = doc.to_json();
    }
});
