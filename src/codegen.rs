//! ARM32 code generation.
//!
//! Walks the lowered IR of each function in instruction order, asking the
//! register allocator for a register per value and emitting a spill store
//! whenever the allocator evicts something. The function frame holds the
//! declared locals first, then one slot per spilled value.

pub mod arm32;
pub mod regalloc;

use self::arm32::{Reg, RETURN_REG};
use self::regalloc::RegisterAllocator;
use crate::ir::{Inst, IrFunction, IrModule, ValueId};
use hashbrown::HashMap;
use log::debug;

/// Offsets below the frame pointer, handed out front to back.
struct FrameLayout {
    next_offset: u32,
}

impl FrameLayout {
    fn new() -> Self {
        FrameLayout { next_offset: 0 }
    }

    /// Reserve a slot and return its offset below fp.
    fn push_slot(&mut self, bytes: u32) -> u32 {
        self.next_offset += bytes;
        self.next_offset
    }

    /// Total frame size, 8-byte aligned per AAPCS.
    fn frame_size(&self) -> u32 {
        (self.next_offset + 7) & !7
    }
}

/// Emits ARM32 assembly text for a lowered module.
#[derive(Default)]
pub struct CodeGen {
    out: String,
}

impl CodeGen {
    pub fn new() -> Self {
        CodeGen::default()
    }

    pub fn emit_module(mut self, mut module: IrModule) -> String {
        self.out.push_str("\t.text\n");
        for func in &mut module.functions {
            self.emit_function(func);
        }
        self.out
    }

    fn emit_function(&mut self, func: &mut IrFunction) {
        let name = func.name;
        let values = &mut func.values;
        let mut ra = RegisterAllocator::new();
        let mut frame = FrameLayout::new();
        let mut spill_slots: HashMap<ValueId, u32> = HashMap::new();

        let local_offsets: Vec<(crate::ast::NameId, u32)> = func
            .locals
            .iter()
            .map(|local| (local.name, frame.push_slot(local.ty.size_in_bytes())))
            .collect();

        // The body is buffered because the prologue needs the final frame
        // size and callee-saved set, which the walk determines.
        let mut body = String::new();
        for inst in &func.insts {
            match *inst {
                Inst::LoadImm { dst, imm } => {
                    let alloc = ra.allocate(values, dst, None);
                    if let Some(victim) = alloc.evicted {
                        let offset = *spill_slots
                            .entry(victim)
                            .or_insert_with(|| frame.push_slot(4));
                        body.push_str(&format!(
                            "\tstr {}, [fp, #-{}]\t@ spill {}\n",
                            alloc.reg, offset, victim
                        ));
                    }
                    body.push_str(&load_imm_text(alloc.reg, imm));
                }
                Inst::Ret { src } => {
                    if let Some(src) = src {
                        match values.get(src).reg() {
                            Some(reg) if reg == RETURN_REG => {}
                            Some(reg) => {
                                // Any tracked holder of r0 belongs to a bare
                                // expression statement; nothing reads it later.
                                let pin = ra.force_reserve(values, RETURN_REG);
                                body.push_str(&format!("\tmov {}, {}\n", RETURN_REG, reg));
                                ra.release(pin);
                            }
                            None => {
                                // The value was evicted earlier; reload it
                                // straight into the return register.
                                let alloc = ra.allocate(values, src, Some(RETURN_REG));
                                if let Some(victim) = alloc.evicted {
                                    let offset = *spill_slots
                                        .entry(victim)
                                        .or_insert_with(|| frame.push_slot(4));
                                    body.push_str(&format!(
                                        "\tstr {}, [fp, #-{}]\t@ spill {}\n",
                                        alloc.reg, offset, victim
                                    ));
                                }
                                let offset = match spill_slots.get(&src) {
                                    Some(&offset) => offset,
                                    None => panic!("{} used before it was materialized", src),
                                };
                                body.push_str(&format!(
                                    "\tldr {}, [fp, #-{}]\t@ reload {}\n",
                                    RETURN_REG, offset, src
                                ));
                            }
                        }
                        ra.free_value(values, src);
                    }
                    body.push_str(&format!("\tb .L{}_exit\n", name));
                }
            }
        }

        let frame_size = frame.frame_size();
        debug!(
            "{}: frame {} bytes, {} spill(s)",
            name,
            frame_size,
            ra.spilled().len()
        );

        let mut saved: Vec<&str> = Reg::all()
            .filter(|reg| reg.is_callee_saved() && ra.ever_used(*reg))
            .map(Reg::name)
            .collect();
        let mut push_list = saved.clone();
        push_list.extend(["fp", "lr"]);
        saved.extend(["fp", "pc"]);

        self.out.push_str(&format!("\t.global {}\n{}:\n", name, name));
        self.out
            .push_str(&format!("\tpush {{{}}}\n", push_list.join(", ")));
        self.out.push_str("\tmov fp, sp\n");
        if frame_size > 0 {
            self.out.push_str(&format!("\tsub sp, sp, #{}\n", frame_size));
        }
        for (local, offset) in &local_offsets {
            self.out
                .push_str(&format!("\t@ local {} at [fp, #-{}]\n", local, offset));
        }
        self.out.push_str(&body);
        self.out.push_str(&format!(".L{}_exit:\n", name));
        self.out.push_str("\tmov sp, fp\n");
        self.out.push_str(&format!("\tpop {{{}}}\n", saved.join(", ")));
    }
}

/// `mov` handles immediates an ARM data-processing instruction can encode
/// directly; anything wider goes through the `ldr =` pseudo-instruction.
fn load_imm_text(reg: Reg, imm: i32) -> String {
    if (0..=255).contains(&imm) {
        format!("\tmov {}, #{}\n", reg, imm)
    } else {
        format!("\tldr {}, ={}\n", reg, imm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NameId;
    use crate::diagnostic::DiagnosticEngine;
    use crate::ir::lower::lower;
    use crate::ir::IntegerType;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn compile(input: &str) -> String {
        let mut diag = DiagnosticEngine::new();
        let tokens = Lexer::new(input).tokenize(&mut diag);
        let ast = Parser::new(&tokens, &mut diag).parse().expect("valid program");
        let module = lower(&ast).expect("lowerable program");
        CodeGen::new().emit_module(module)
    }

    #[test]
    fn emits_minimal_function() {
        let asm = compile("int main(){return 1;}");
        assert_eq!(
            asm,
            "\t.text\n\
             \t.global main\n\
             main:\n\
             \tpush {fp, lr}\n\
             \tmov fp, sp\n\
             \tmov r0, #1\n\
             \tb .Lmain_exit\n\
             .Lmain_exit:\n\
             \tmov sp, fp\n\
             \tpop {fp, pc}\n"
        );
    }

    #[test]
    fn locals_reserve_frame_slots() {
        let asm = compile("int main(){int a, b; return 3;}");
        assert!(asm.contains("\tsub sp, sp, #8\n"));
        assert!(asm.contains("@ local a at [fp, #-4]"));
        assert!(asm.contains("@ local b at [fp, #-8]"));
    }

    #[test]
    fn wide_immediates_use_ldr() {
        let asm = compile("int main(){return 300;}");
        assert!(asm.contains("\tldr r0, =300\n"));
    }

    #[test]
    fn exhausting_the_pool_emits_spill_stores() {
        let asm = compile("int main(){1;2;3;4;5;6;7;8;9;return 0;}");
        // The ninth literal displaces the first, the return value the second.
        assert!(asm.contains("\tstr r0, [fp, #-4]\t@ spill v0\n"));
        assert!(asm.contains("\tstr r1, [fp, #-8]\t@ spill v1\n"));
        assert!(asm.contains("\tmov r0, r1\n"));
        assert!(asm.contains("\tsub sp, sp, #8\n"));
        // r4..r7 were live at some point, so they are saved.
        assert!(asm.contains("\tpush {r4, r5, r6, r7, fp, lr}\n"));
        assert!(asm.contains("\tpop {r4, r5, r6, r7, fp, pc}\n"));
    }

    #[test]
    fn evicted_return_value_is_reloaded() {
        let mut func = crate::ir::IrFunction::new(NameId::new("f"), IntegerType::I32);
        let first = func.values.new_value(IntegerType::I32);
        func.insts.push(Inst::LoadImm { dst: first, imm: 1 });
        for imm in 2..=9 {
            let dst = func.values.new_value(IntegerType::I32);
            func.insts.push(Inst::LoadImm { dst, imm });
        }
        func.insts.push(Inst::Ret { src: Some(first) });

        let module = crate::ir::IrModule {
            functions: vec![func],
        };
        let asm = CodeGen::new().emit_module(module);
        // `first` is spilled when the pool overflows, then reloaded into
        // r0 after its newer holder is itself spilled.
        assert!(asm.contains("\tstr r0, [fp, #-4]\t@ spill v0\n"));
        assert!(asm.contains("\tstr r0, [fp, #-8]\t@ spill v8\n"));
        assert!(asm.contains("\tldr r0, [fp, #-4]\t@ reload v0\n"));
    }

    #[test]
    fn return_without_value_still_exits() {
        let mut func = crate::ir::IrFunction::new(NameId::new("f"), IntegerType::I32);
        func.insts.push(Inst::Ret { src: None });
        let module = crate::ir::IrModule {
            functions: vec![func],
        };
        let asm = CodeGen::new().emit_module(module);
        assert!(asm.contains("\tb .Lf_exit\n"));
        assert!(asm.contains(".Lf_exit:\n"));
    }
}
