//! IR value model for MiniC.
//!
//! Lowering turns the AST into a flat instruction list per function. Every
//! instruction result is a [`Value`] held in a per-function [`ValueTable`];
//! the code generator assigns registers to values as it walks the
//! instructions in order.

use crate::ast::NameId;
use crate::codegen::arm32::Reg;
use std::fmt;

pub mod lower;

/// An integer type, identified by bit width. MiniC only uses `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerType {
    bit_width: u32,
}

impl IntegerType {
    pub const I32: IntegerType = IntegerType { bit_width: 32 };

    pub fn bit_width(self) -> u32 {
        self.bit_width
    }

    pub fn size_in_bytes(self) -> u32 {
        (self.bit_width + 7) / 8
    }
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.bit_width)
    }
}

/// Identity of a value within one function's [`ValueTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A value the backend must keep live in a register or memory. Starts
/// without a register; only the register allocator assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    ty: IntegerType,
    reg: Option<Reg>,
}

impl Value {
    pub fn ty(&self) -> IntegerType {
        self.ty
    }

    /// The register currently holding this value, if any.
    pub fn reg(&self) -> Option<Reg> {
        self.reg
    }

    pub(crate) fn set_reg(&mut self, reg: Option<Reg>) {
        self.reg = reg;
    }
}

/// Per-function arena of values, indexed by [`ValueId`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValueTable {
    values: Vec<Value>,
}

impl ValueTable {
    pub fn new() -> Self {
        ValueTable { values: Vec::new() }
    }

    pub fn new_value(&mut self, ty: IntegerType) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(Value { ty, reg: None });
        id
    }

    pub fn get(&self, id: ValueId) -> &Value {
        &self.values[id.0 as usize]
    }

    pub(crate) fn get_mut(&mut self, id: ValueId) -> &mut Value {
        &mut self.values[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One lowered instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    /// Materialize an integer constant into `dst`.
    LoadImm { dst: ValueId, imm: i32 },
    /// Return from the function with `src` as the result.
    Ret { src: Option<ValueId> },
}

/// A named local variable occupying a stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Local {
    pub name: NameId,
    pub ty: IntegerType,
}

/// One lowered function: its values, locals and instruction list.
#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub name: NameId,
    pub return_type: IntegerType,
    pub values: ValueTable,
    pub locals: Vec<Local>,
    pub insts: Vec<Inst>,
}

impl IrFunction {
    pub fn new(name: NameId, return_type: IntegerType) -> Self {
        IrFunction {
            name,
            return_type,
            values: ValueTable::new(),
            locals: Vec::new(),
            insts: Vec::new(),
        }
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fn {} {}:", self.return_type, self.name)?;
        for local in &self.locals {
            writeln!(f, "  local {}: {}", local.name, local.ty)?;
        }
        for inst in &self.insts {
            match inst {
                Inst::LoadImm { dst, imm } => writeln!(f, "  {} = load_imm {}", dst, imm)?,
                Inst::Ret { src: Some(src) } => writeln!(f, "  ret {}", src)?,
                Inst::Ret { src: None } => writeln!(f, "  ret")?,
            }
        }
        Ok(())
    }
}

/// A lowered compile unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrModule {
    pub functions: Vec<IrFunction>,
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for func in &self.functions {
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}
