pub mod address;
pub mod subnet;
