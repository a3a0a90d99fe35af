pub mod dorks;
pub mod hunt;
