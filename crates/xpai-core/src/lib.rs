pub mod analysis;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod kube_source;
pub mod manifest;
pub mod path;
pub mod resource;
pub mod router;
pub mod sample;
pub mod suggest;
pub mod types;

pub use error::{Result, XpaiError};
