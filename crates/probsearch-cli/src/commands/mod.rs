//! Command implementations.

pub mod estimate;
pub mod profile;
pub mod replay;
pub mod search;

pub use self::estimate::execute_estimate;
pub use self::profile::execute_profile;
pub use self::replay::execute_replay;
pub use self::search::execute_search;
