pub mod middleware;
pub mod pages;
pub mod routes;

pub use routes::build_router;
