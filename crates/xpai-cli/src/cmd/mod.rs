pub mod analyze;
pub mod ask;
pub mod config;
pub mod examples;
pub mod generate;
pub mod interactive;
pub mod mcp;
pub mod suggest;
