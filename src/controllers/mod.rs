//! Controladores: reglas de negocio por recurso.
//! Reciben el `AuthContext` del llamante de forma explícita.

pub mod admin_controller;
pub mod auth_controller;
pub mod company_controller;
pub mod dpc_controller;
pub mod product_controller;
pub mod user_controller;

pub use admin_controller::AdminController;
pub use auth_controller::AuthController;
pub use company_controller::CompanyController;
pub use dpc_controller::DpcController;
pub use product_controller::ProductController;
pub use user_controller::UserController;
