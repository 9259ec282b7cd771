//! A MiniC compiler implemented in Rust.
//!
//! MiniC is a small C subset: one `int` function per compile unit, local
//! `int` declarations, integer literals, assignment and `return`. The
//! pipeline is lexer → recursive-descent parser → AST → IR lowering →
//! ARM32 code generation with a greedy register allocator.

/// Contains the AST node model and dumper.
pub mod ast;
/// Contains ARM32 code generation and register allocation.
pub mod codegen;
/// Contains the diagnostic engine.
pub mod diagnostic;
/// Contains the compiler driver.
pub mod driver;
/// Contains the error types for the application.
pub mod error;
/// Contains the IR value model and AST lowering.
pub mod ir;
/// Contains the lexical scanner.
pub mod lexer;
/// Contains the recursive-descent parser.
pub mod parser;
