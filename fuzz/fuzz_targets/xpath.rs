#![no_main]
use libfuzzer_sys::fuzz_target;

const DOCUMENT: &[u8] = br#"{"a":{"b":[{"c":1,"d":"x"},{"c":2}],"e":{"b":{"c":3}}}}"#;

fuzz_target!(|data: &[u8]| {
    let (Ok(expression), Ok(root)) = (std::str::from_utf8(data), arbor::Object::from_json(DOCUMENT))
    else {
        return;
    };
    let _ = root.filter_xpath(expression);
});
