//! Common types used across the application.

pub mod currency;
pub mod pagination;

pub use currency::validate_currency_code;
pub use pagination::{PageMeta, PageRequest, PageResponse};
