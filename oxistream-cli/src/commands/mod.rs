//! Command implementations for OxiStream CLI.

pub mod copy;
pub mod dump;
pub mod info;
pub mod pack;

pub use copy::cmd_copy;
pub use dump::cmd_dump;
pub use info::cmd_info;
pub use pack::cmd_pack;
