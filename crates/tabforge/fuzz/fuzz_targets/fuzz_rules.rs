//! Fuzz target for the rule document loader.
//!
//! Arbitrary YAML/JSON must produce a rule set or a located error, never a
//! panic, and any rule set that loads must apply cleanly or fail with an
//! error on a small fixed dataset.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabforge::{Column, Dataset, RuleFormat, RuleSet, TransformEngine};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for format in [RuleFormat::Json, RuleFormat::Yaml] {
        if let Ok(rules) = RuleSet::parse(text, format) {
            let Ok(dataset) = Dataset::new(vec![
                Column::new("Has Chip", ["YES", "NO", "NA"]),
                Column::new("Card Number", ["4344676511950444", "434467", ""]),
                Column::new("Acct Open Date", ["2024-02-20", "03/01/2023", "never"]),
            ]) else {
                return;
            };
            let _ = TransformEngine::new().apply(&dataset, &rules);
        }
    }
});
