pub mod accounts;
pub mod bridge;
