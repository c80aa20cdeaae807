use crate::cli::OptionArgs;
use sarge::ArgumentType;

#[test]
fn option_args_split_on_commas() {
    let parsed = <OptionArgs as ArgumentType>::from_value(Some("blocksize=4, truncate=0,,"))
        .expect("some")
        .expect("ok");
    assert_eq!(
        parsed.as_slice(),
        &[
            ("blocksize".to_string(), "4".to_string()),
            ("truncate".to_string(), "0".to_string()),
        ]
    );
}

#[test]
fn option_args_without_value_is_empty() {
    let parsed = <OptionArgs as ArgumentType>::from_value(None)
        .expect("some")
        .expect("ok");
    assert!(parsed.is_empty());
}
