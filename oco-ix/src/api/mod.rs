//! HTTP API handlers for oco-ix

pub mod buildinfo;
pub mod error;
pub mod health;
pub mod spans;
pub mod wav;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use health::health_routes;
pub use spans::{get_spans, put_spans};
pub use wav::get_wav_resource;
