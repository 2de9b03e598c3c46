pub mod commands;
pub mod environment;
pub mod error;
pub mod runtime;
