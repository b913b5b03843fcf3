//! Lexer module for doc-comment annotations

pub mod scanner;
pub mod token;

pub use scanner::*;
pub use token::*;
