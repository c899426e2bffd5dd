mod error;
mod handlers;
mod router;
mod types;

pub use error::ApiError;
pub use router::{configure, run_server};
pub use types::AppState;
