pub mod entities;
pub mod json_store;
