//! Compilation pipeline orchestration.
//!
//! The driver owns the diagnostic engine for one compilation and runs
//! lexing, parsing, lowering and code generation in order, stopping at
//! the first failing phase.

use crate::codegen::CodeGen;
use crate::diagnostic::DiagnosticEngine;
use crate::error::Error;
use crate::ir::lower::lower;
use crate::lexer::Lexer;
use crate::parser::Parser;
use log::debug;
use std::path::Path;

/// What the driver should produce besides the assembly.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub dump_ast: bool,
    pub dump_ir: bool,
}

/// Products of a successful compilation.
#[derive(Debug, Default)]
pub struct CompileOutput {
    pub asm: String,
    pub ast_dump: Option<String>,
    pub ir_dump: Option<String>,
}

/// Drives one compilation. Create a fresh driver per input; diagnostics
/// never leak between runs.
pub struct CompilerDriver {
    options: CompileOptions,
    diagnostics: DiagnosticEngine,
}

impl CompilerDriver {
    pub fn new(options: CompileOptions) -> Self {
        CompilerDriver {
            options,
            diagnostics: DiagnosticEngine::new(),
        }
    }

    /// Compile a source file from disk.
    pub fn compile_file(&mut self, path: &Path) -> Result<CompileOutput, Error> {
        let source = std::fs::read_to_string(path)?;
        self.compile_source(&source)
    }

    /// Compile source text to ARM32 assembly.
    pub fn compile_source(&mut self, source: &str) -> Result<CompileOutput, Error> {
        let tokens = Lexer::new(source).tokenize(&mut self.diagnostics);
        debug!("lexed {} token(s)", tokens.len());

        let ast = Parser::new(&tokens, &mut self.diagnostics).parse();
        // Lexical errors fail the run even when the token stream happened
        // to parse.
        let ast = match ast {
            Some(ast) if !self.diagnostics.has_errors() => ast,
            _ => return Err(Error::Parse(self.diagnostics.error_count())),
        };
        debug!("parsed compile unit");

        let module = lower(&ast)?;
        let ir_dump = self.options.dump_ir.then(|| module.to_string());
        let ast_dump = self.options.dump_ast.then(|| ast.dump());

        let asm = CodeGen::new().emit_module(module);
        Ok(CompileOutput {
            asm,
            ast_dump,
            ir_dump,
        })
    }

    /// Diagnostics collected so far, for rendering after a failure.
    pub fn diagnostics(&self) -> &DiagnosticEngine {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_valid_source() {
        let mut driver = CompilerDriver::new(CompileOptions::default());
        let output = driver.compile_source("int main(){return 1;}").unwrap();
        assert!(output.asm.contains("main:"));
        assert!(output.ast_dump.is_none());
        assert!(!driver.diagnostics().has_errors());
    }

    #[test]
    fn dumps_are_opt_in() {
        let mut driver = CompilerDriver::new(CompileOptions {
            dump_ast: true,
            dump_ir: true,
        });
        let output = driver.compile_source("int main(){return 2;}").unwrap();
        assert!(output.ast_dump.unwrap().starts_with("CompileUnit"));
        assert!(output.ir_dump.unwrap().contains("ret v0"));
    }

    #[test]
    fn parse_failure_reports_diagnostics() {
        let mut driver = CompilerDriver::new(CompileOptions::default());
        let err = driver.compile_source("int main(){return 1}").unwrap_err();
        assert!(matches!(err, Error::Parse(n) if n >= 1));
        assert!(driver.diagnostics().has_errors());
    }

    #[test]
    fn lexical_errors_fail_the_run() {
        let mut driver = CompilerDriver::new(CompileOptions::default());
        let err = driver.compile_source("int main(){return 1;} $").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn lowering_failure_propagates() {
        let mut driver = CompilerDriver::new(CompileOptions::default());
        let err = driver.compile_source("int main(){4 = 5;}").unwrap_err();
        assert!(matches!(err, Error::Lower(_)));
    }
}
