pub mod auth;
pub mod controller;
pub mod error;
pub mod grams;
pub mod middleware;
pub mod routes;
pub mod store;
pub mod validation;
