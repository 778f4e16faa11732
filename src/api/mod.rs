// API routes and handlers

pub mod health;
pub mod response;
pub mod routes;
pub mod users;
