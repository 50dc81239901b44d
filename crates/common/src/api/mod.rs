pub mod backend;
pub mod tools;
