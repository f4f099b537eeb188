pub mod admin_dto;
pub mod auth_dto;
pub mod company_dto;
pub mod dpc_dto;
pub mod product_dto;
pub mod user_dto;
