//! Lowers a parsed AST into IR functions.
//!
//! The parser only hands over error-free trees, so the shapes matched here
//! are the only ones that can occur. Declarations become stack locals;
//! literal expressions become `LoadImm` results; `return` consumes its
//! expression value.

use crate::ast::{Node, NodeKind, TypeSpec};
use crate::ir::{Inst, IntegerType, IrFunction, IrModule, Local};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LowerError {
    /// The grammar only produces literals on the left of `=`, and a
    /// literal is not a storage location.
    #[error("left operand of assignment is not assignable")]
    NotAssignable,
}

/// Lower a compile unit rooted at `ast`.
pub fn lower(ast: &Node) -> Result<IrModule, LowerError> {
    let mut module = IrModule::default();
    match ast.kind {
        NodeKind::CompileUnit => {
            for child in &ast.children {
                module.functions.push(lower_function(child)?);
            }
        }
        _ => unreachable!("lowering expects a compile-unit root"),
    }
    Ok(module)
}

fn lower_function(node: &Node) -> Result<IrFunction, LowerError> {
    let NodeKind::FuncDef { name, return_type } = node.kind else {
        unreachable!("compile-unit children are function definitions");
    };
    let mut func = IrFunction::new(name, lower_type(return_type));

    for block in &node.children {
        lower_block(block, &mut func)?;
    }
    debug!(
        "lowered {}: {} values, {} locals",
        func.name,
        func.values.len(),
        func.locals.len()
    );
    Ok(func)
}

fn lower_block(block: &Node, func: &mut IrFunction) -> Result<(), LowerError> {
    debug_assert_eq!(block.kind, NodeKind::Block);
    for stmt in &block.children {
        lower_statement(stmt, func)?;
    }
    Ok(())
}

fn lower_statement(stmt: &Node, func: &mut IrFunction) -> Result<(), LowerError> {
    match stmt.kind {
        NodeKind::VarDeclStmt { ty } => {
            for decl in &stmt.children {
                let NodeKind::DeclVar { name } = decl.kind else {
                    unreachable!("declaration children are declared variables");
                };
                func.locals.push(Local {
                    name,
                    ty: lower_type(ty),
                });
            }
            Ok(())
        }
        NodeKind::Return => {
            let src = match stmt.children.first() {
                Some(expr) => Some(lower_expr(expr, func)?),
                None => None,
            };
            func.insts.push(Inst::Ret { src });
            Ok(())
        }
        NodeKind::Assign => Err(LowerError::NotAssignable),
        // A bare expression statement: materialize the value, nothing
        // consumes it.
        NodeKind::IntLiteral(_) => {
            lower_expr(stmt, func)?;
            Ok(())
        }
        _ => unreachable!("blocks only contain statements"),
    }
}

fn lower_expr(expr: &Node, func: &mut IrFunction) -> Result<crate::ir::ValueId, LowerError> {
    match expr.kind {
        NodeKind::IntLiteral(imm) => {
            let dst = func.values.new_value(IntegerType::I32);
            func.insts.push(Inst::LoadImm { dst, imm });
            Ok(dst)
        }
        _ => unreachable!("expressions are integer literals"),
    }
}

fn lower_type(ty: TypeSpec) -> IntegerType {
    match ty {
        TypeSpec::Int => IntegerType::I32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticEngine;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn lower_source(input: &str) -> Result<IrModule, LowerError> {
        let mut diag = DiagnosticEngine::new();
        let tokens = Lexer::new(input).tokenize(&mut diag);
        let ast = Parser::new(&tokens, &mut diag).parse().expect("valid program");
        lower(&ast)
    }

    #[test]
    fn lowers_return_to_load_and_ret() {
        let module = lower_source("int main(){return 1;}").unwrap();
        assert_eq!(module.functions.len(), 1);
        let func = &module.functions[0];
        assert_eq!(func.name.as_str(), "main");
        assert_eq!(func.insts.len(), 2);
        assert!(matches!(func.insts[0], Inst::LoadImm { imm: 1, .. }));
        assert!(matches!(func.insts[1], Inst::Ret { src: Some(_) }));
    }

    #[test]
    fn lowers_declarations_to_locals() {
        let module = lower_source("int main(){int a, b, c; return 0;}").unwrap();
        let func = &module.functions[0];
        let names: Vec<&str> = func.locals.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(func.locals.iter().all(|l| l.ty == IntegerType::I32));
    }

    #[test]
    fn rejects_assignment_to_literal() {
        let err = lower_source("int main(){4 = 5;}").unwrap_err();
        assert_eq!(err, LowerError::NotAssignable);
    }

    #[test]
    fn bare_literals_each_get_a_value() {
        let module = lower_source("int main(){1;2;3;}").unwrap();
        let func = &module.functions[0];
        assert_eq!(func.values.len(), 3);
        assert_eq!(
            func.insts
                .iter()
                .filter(|inst| matches!(inst, Inst::LoadImm { .. }))
                .count(),
            3
        );
    }
}
