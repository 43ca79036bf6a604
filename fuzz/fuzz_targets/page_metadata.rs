#![no_main]

use agent_seo_core::discover::extract_page_metadata;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    let metadata = extract_page_metadata(source);
    assert!(source.contains(&metadata.title));
    assert!(source.contains(&metadata.description));
});
