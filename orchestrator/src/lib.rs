pub mod args;
pub mod decode;
pub mod logging;
