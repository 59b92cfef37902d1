pub mod config;
pub mod constants;
pub mod geo;
pub mod projection;
pub mod time_range;

#[cfg(feature = "tokio-runtime")]
pub mod builder;
#[cfg(feature = "tokio-runtime")]
pub mod map;
