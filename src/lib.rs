//! Backend de certificación DPC
//!
//! Registro de empresas, revisión por administradores, anclaje de
//! certificados en el ledger y CRUD por tenant.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
