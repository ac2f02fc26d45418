pub mod import;
pub mod search;
