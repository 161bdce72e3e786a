pub mod identifier_validator;

pub use identifier_validator::*;
