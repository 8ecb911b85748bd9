pub mod api;
pub mod config;
pub mod domain;
pub mod likeday;
pub mod notify;
pub mod pipeline;
pub mod source;
pub mod telemetry;
