pub mod connector;
pub mod parser;
