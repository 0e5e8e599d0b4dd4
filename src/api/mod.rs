pub mod error;
pub mod frontend;
pub mod handlers;
pub mod routes;
pub mod state;
