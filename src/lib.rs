pub mod beacon_chain;
pub mod commands;
pub mod env;
pub mod json_codecs;
pub mod log;
