// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn default_concurrency_is_four() {
    assert_eq!(RuntimeConfig::default().default_concurrency, 4);
}

#[test]
fn missing_optional_fields_fall_back_to_defaults() {
    let toml = r#"
        state_store_location = "/var/lib/cronplus/state.db"
        dead_letter_location = "/var/lib/cronplus/dlq.db"
    "#;
    let runtime: RuntimeConfig = toml::from_str(toml).expect("parse");
    assert_eq!(runtime.default_concurrency, 4);
    assert_eq!(runtime.cancellation_grace_milliseconds, 5_000);
}
