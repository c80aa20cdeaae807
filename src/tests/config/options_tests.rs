//! Tests for ImemOptions and the option declarations.

use crate::config::{ImemOptions, OPTIONS, OptionKind, find_option};
use crate::error::ImemError;

#[test]
fn defaults_match_declarations() {
    let opts = ImemOptions::default();
    assert!(opts.truncate);
    assert_eq!(opts.blocksize, i32::MAX as u32);

    let truncate = find_option("truncate").expect("truncate declared");
    assert_eq!(truncate.kind, OptionKind::Bool);
    assert_eq!(truncate.default, 1);

    let blocksize = find_option("blocksize").expect("blocksize declared");
    assert_eq!(blocksize.kind, OptionKind::Int);
    assert_eq!(blocksize.default, i64::from(i32::MAX));
    assert_eq!((blocksize.min, blocksize.max), (1, i64::from(i32::MAX)));

    assert_eq!(OPTIONS.len(), 2);
}

#[test]
fn set_accepts_boolean_spellings() {
    let mut opts = ImemOptions::default();
    for (text, expected) in [("0", false), ("true", true), ("off", false), ("YES", true)] {
        opts.set("truncate", text).expect("valid bool");
        assert_eq!(opts.truncate, expected, "value {text}");
    }
}

#[test]
fn set_rejects_out_of_range_and_unknown() {
    let mut opts = ImemOptions::default();

    match opts.set("blocksize", "0") {
        Err(ImemError::InvalidOption { name, reason }) => {
            assert_eq!(name, "blocksize");
            assert!(reason.contains("out of range"), "reason: {reason}");
        }
        other => panic!("expected InvalidOption, got: {other:?}"),
    }
    assert!(opts.set("blocksize", "2147483648").is_err());
    assert!(opts.set("blocksize", "abc").is_err());
    assert!(opts.set("truncate", "2").is_err());
    assert!(opts.set("follow", "1").is_err());

    // Failed assignments leave the options untouched.
    assert_eq!(opts, ImemOptions::default());
}

#[test]
fn builder_and_field_never_yield_a_zero_transfer_cap() {
    let opts = ImemOptions::default().with_blocksize(0);
    assert_eq!(opts.blocksize, 1);
    assert_eq!(opts.max_transfer(), 1);

    let huge = ImemOptions::default().with_blocksize(u32::MAX);
    assert_eq!(huge.blocksize, i32::MAX as u32);

    let mut raw = ImemOptions::default();
    raw.blocksize = 0;
    assert_eq!(raw.max_transfer(), 1);
    raw.blocksize = u32::MAX;
    assert_eq!(raw.max_transfer(), i32::MAX as usize);
}

#[test]
fn from_query_applies_in_order() {
    let opts = ImemOptions::from_query("blocksize=512&truncate=0&blocksize=1024").expect("query");
    assert_eq!(opts.blocksize, 1024);
    assert!(!opts.truncate);

    let bare = ImemOptions::from_query("truncate&").expect("bare flag");
    assert!(bare.truncate);
}

#[test]
fn from_pairs_builds_on_defaults() {
    let opts = ImemOptions::from_pairs([("blocksize", "64")]).expect("pairs");
    assert_eq!(opts, ImemOptions::default().with_blocksize(64));
}

#[test]
fn deserializes_with_defaults_and_validation() {
    let opts: ImemOptions = serde_json::from_str(r#"{"blocksize": 4096}"#).expect("json");
    assert_eq!(opts.blocksize, 4096);
    assert!(opts.truncate);

    let opts: ImemOptions = serde_yaml::from_str("truncate: false\n").expect("yaml");
    assert!(!opts.truncate);
    assert_eq!(opts.blocksize, i32::MAX as u32);

    assert!(serde_json::from_str::<ImemOptions>(r#"{"blocksize": 0}"#).is_err());
    assert!(serde_json::from_str::<ImemOptions>(r#"{"bogus": 1}"#).is_err());
}

#[cfg(feature = "json")]
#[test]
fn from_json_str_maps_errors_to_invalid_option() {
    let opts = ImemOptions::from_json_str(r#"{"truncate": false}"#).expect("json");
    assert!(!opts.truncate);

    assert!(matches!(
        ImemOptions::from_json_str("{not json"),
        Err(ImemError::InvalidOption { .. })
    ));
}

#[cfg(feature = "yaml")]
#[test]
fn from_yaml_str_loads_options() {
    let opts = ImemOptions::from_yaml_str("blocksize: 16\ntruncate: true\n").expect("yaml");
    assert_eq!(opts.max_transfer(), 16);
}
