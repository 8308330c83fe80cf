pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod shader;
pub mod state;
pub mod transform;
pub mod vertex;
