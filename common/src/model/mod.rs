pub mod family;
pub mod field;
