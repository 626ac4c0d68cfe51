//! Command implementations

pub mod build_args;
pub mod generate;
pub mod locate;
pub mod schemes;
pub mod test_target;
