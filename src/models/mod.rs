//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL de `migrations/`.

pub mod address;
pub mod auth;
pub mod company;
pub mod document;
pub mod dpc;
pub mod product;
pub mod status;
pub mod user;

pub use address::{AddressType, CompanyAddress};
pub use auth::{AuthContext, TenantScope};
pub use company::{Company, CompanyPatch, TaxInfo};
pub use document::{Document, DocumentInfo};
pub use dpc::{CertificationDetails, CertificationRecord, Dpc};
pub use product::{DetailsMap, Product, ProductPatch};
pub use status::{ReviewDecision, ReviewStatus};
pub use user::{PersonalInfo, User, UserPatch, UserRole};
