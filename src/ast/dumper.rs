//! Renders an AST as indented text, one node per line.

use crate::ast::{Node, NodeKind};
use std::fmt::Write;

/// Render `node` and its subtree. Two spaces of indent per level, no
/// trailing newline.
pub fn dump(node: &Node) -> String {
    let mut out = String::new();
    dump_node(node, 0, &mut out);
    out.truncate(out.trim_end().len());
    out
}

fn dump_node(node: &Node, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match &node.kind {
        NodeKind::CompileUnit => out.push_str("CompileUnit"),
        NodeKind::FuncDef { name, return_type } => {
            let _ = write!(out, "FuncDef {} {}", return_type, name);
        }
        NodeKind::Block => out.push_str("Block"),
        NodeKind::VarDeclStmt { ty } => {
            let _ = write!(out, "VarDeclStmt {}", ty);
        }
        NodeKind::DeclVar { name } => {
            let _ = write!(out, "DeclVar {}", name);
        }
        NodeKind::Assign => out.push_str("Assign"),
        NodeKind::Return => out.push_str("Return"),
        NodeKind::IntLiteral(value) => {
            let _ = write!(out, "IntLiteral {}", value);
        }
    }
    out.push('\n');
    for child in &node.children {
        dump_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NameId, TypeSpec};
    use thin_vec::thin_vec;

    #[test]
    fn dumps_nested_tree() {
        let tree = Node::with_children(
            NodeKind::CompileUnit,
            thin_vec![Node::with_children(
                NodeKind::FuncDef {
                    name: NameId::new("main"),
                    return_type: TypeSpec::Int,
                },
                thin_vec![Node::with_children(
                    NodeKind::Block,
                    thin_vec![Node::with_children(
                        NodeKind::Return,
                        thin_vec![Node::new(NodeKind::IntLiteral(1))],
                    )],
                )],
            )],
        );
        insta::assert_snapshot!(tree.dump(), @r"
        CompileUnit
          FuncDef int main
            Block
              Return
                IntLiteral 1
        ");
    }
}
