pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_app;
pub use state::AppState;
