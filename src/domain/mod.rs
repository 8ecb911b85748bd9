pub mod profile;
pub mod types;

pub use profile::*;
pub use types::*;
