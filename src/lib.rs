pub mod error;
pub mod parse;
pub mod registry;
pub mod types;
pub mod value;
pub mod wrap;
