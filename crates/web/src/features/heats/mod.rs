pub mod handlers;
pub mod routes;
mod services;
