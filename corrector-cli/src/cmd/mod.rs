pub mod config;
pub mod execute;
pub mod transform;
pub mod validate;
