pub mod controller;
pub mod interface;
pub mod routes;
pub mod schema;

pub use routes::catalog_routes;
