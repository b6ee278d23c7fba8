pub mod file;
pub mod parse;
pub mod stdin;
