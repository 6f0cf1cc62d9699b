//! Fuzz target for the data parser.
//!
//! The CSV/TSV parser must never panic on malformed input, whatever
//! delimiter it detects.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabforge::{ColumnRules, DataType, DateReference, Operation, Parser, RuleSet, TransformEngine};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Push whatever parses through date casting and date-diff as well.
    if let Ok(dataset) = Parser::new().parse_str(text) {
        let rules = dataset
            .column_names()
            .into_iter()
            .fold(RuleSet::new(), |rules, name| {
                rules.with_column(
                    name,
                    ColumnRules::new([
                        Operation::Cast(DataType::Date),
                        Operation::DateDiff(DateReference::Today),
                    ]),
                )
            });
        let _ = TransformEngine::new().apply(&dataset, &rules);
    }
});
