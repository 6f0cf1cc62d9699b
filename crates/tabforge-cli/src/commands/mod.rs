//! CLI command implementations.

pub mod apply;
pub mod check;
pub mod diff;
pub mod sql;

use chrono::NaiveDate;
use tabforge::{EngineConfig, LengthPolicy, Tabforge, TabforgeConfig};

/// Build a pipeline from the shared command flags.
pub(crate) fn pipeline(today: Option<NaiveDate>, reject_length: bool) -> Tabforge {
    let engine = EngineConfig {
        reference_date: today,
        length_policy: if reject_length {
            LengthPolicy::Reject
        } else {
            LengthPolicy::Filter
        },
        ..Default::default()
    };

    Tabforge::with_config(TabforgeConfig {
        engine,
        ..Default::default()
    })
}
