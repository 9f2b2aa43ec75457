pub mod flexible;
pub mod jwt;
