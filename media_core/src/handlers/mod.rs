pub mod diagnostics;
pub mod health;
pub mod media;
pub mod routes;

pub use routes::create_routes;
