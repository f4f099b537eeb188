//! Services module
//!
//! Servicios con estado propio: firma de tokens y anclaje en el ledger.

pub mod jwt_service;
pub mod ledger_service;

pub use jwt_service::JwtService;
pub use ledger_service::{HttpLedgerGateway, LedgerError, LedgerGateway, LedgerService, LocalLedger};
