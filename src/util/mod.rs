
/// Generic functionality for reading gene lists and writing JSON results
pub mod file_io;
/// Lexical gene-token grammar: identifier classification and integer extraction
pub mod identifiers;
