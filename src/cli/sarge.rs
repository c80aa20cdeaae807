use std::convert::Infallible;

use sarge::ArgumentType;

use crate::cli::{OptionArgs, parse_assignment};

impl ArgumentType for OptionArgs {
    type Error = Infallible;

    const REPEATABLE: bool = true;

    fn from_value(val: Option<&str>) -> sarge::ArgResult<Self> {
        let assignments = match val {
            None => Vec::new(),
            Some(v) => v.split(',').filter_map(parse_assignment).collect(),
        };

        Some(Ok(OptionArgs(assignments)))
    }

    fn default_value() -> Option<Self> {
        Some(OptionArgs::default())
    }
}
