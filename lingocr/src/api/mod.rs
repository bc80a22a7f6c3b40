mod extractors;
pub mod handlers;
pub mod openapi;
mod routes;
mod source;
mod state;

pub use extractors::AppQuery;
pub use routes::create_router;
pub use source::ImageSource;
pub use state::AppState;
