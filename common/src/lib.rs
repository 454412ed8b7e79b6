#[cfg(feature = "answers")]
pub mod answers;
#[cfg(feature = "config")]
pub mod config;
#[cfg(feature = "logging")]
pub mod logging;
pub mod naming;
pub mod utils;
