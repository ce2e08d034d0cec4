//! Tree rendering for parsed programs.
//!
//! The formatter produces deterministic box-drawing output to assist with
//! debugging and snapshot-style regression tests:
//!
//! ```text
//! Program
//! ├── Module: demo
//! └── Statements:
//!     └── Entry:
//!         ├── Name: main
//! ```

use std::fmt::{self, Write};

use super::nodes::{
    BlockStmt, EntryStmt, Expr, LambdaExpr, Parameter, Program, Stmt, SyntaxType,
};
use super::TokenKind;

/// Format a program into a human-readable tree.
pub fn format_program(program: &Program) -> String {
    render(&program_node(program))
}

/// Format a single expression, used by tests and debugging helpers.
pub fn format_expr(expr: &Expr) -> String {
    render(&expr_node(expr))
}

fn render(root: &TreeNode) -> String {
    let mut buffer = String::new();
    write_tree(&mut buffer, root).expect("string writer");
    buffer
}

#[derive(Debug)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

fn write_tree(out: &mut String, root: &TreeNode) -> fmt::Result {
    writeln!(out, "{}", root.label)?;
    write_children(out, &root.children, "")
}

fn write_children(out: &mut String, children: &[TreeNode], prefix: &str) -> fmt::Result {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let (connector, extension) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        writeln!(out, "{prefix}{connector}{}", child.label)?;
        write_children(out, &child.children, &format!("{prefix}{extension}"))?;
    }
    Ok(())
}

fn program_node(program: &Program) -> TreeNode {
    TreeNode::branch(
        "Program",
        vec![
            TreeNode::leaf(format!("Module: {}", program.module)),
            TreeNode::branch(
                "Statements:",
                program.statements.iter().map(stmt_node).collect(),
            ),
        ],
    )
}

fn stmt_node(stmt: &Stmt) -> TreeNode {
    match stmt {
        Stmt::Import(import) => TreeNode::leaf(format!("Import {import}")),
        Stmt::AggregateImport(import) => TreeNode::leaf(format!("Import {import}")),
        Stmt::Entry(entry) => entry_node(entry),
        Stmt::Block(block) => block_node(block),
        Stmt::Return(ret) => match &ret.value {
            Some(value) => TreeNode::branch("Return:", vec![expr_node(value)]),
            None => TreeNode::leaf("Return"),
        },
        Stmt::Expression(expr) => expr_node(expr),
    }
}

fn entry_node(entry: &EntryStmt) -> TreeNode {
    let mut children = vec![TreeNode::leaf(format!("Name: {}", entry.name.text()))];

    if !entry.modifiers.is_empty() {
        let modifiers: Vec<&str> = entry.modifiers.iter().map(|m| m.text()).collect();
        children.push(TreeNode::leaf(format!("Modifiers: {}", modifiers.join(" "))));
    }

    children.push(return_type_node(entry.return_type.as_ref()));
    children.push(TreeNode::branch(
        "Parameters:",
        entry.parameters.iter().map(parameter_node).collect(),
    ));

    if !entry.effects.is_empty() {
        children.push(TreeNode::branch(
            "Effects:",
            entry
                .effects
                .iter()
                .map(|effect| TreeNode::leaf(effect.text()))
                .collect(),
        ));
    }

    children.push(TreeNode::branch("Body:", vec![block_node(&entry.body)]));
    TreeNode::branch("Entry:", children)
}

fn return_type_node(ty: Option<&SyntaxType>) -> TreeNode {
    match ty {
        Some(ty) => TreeNode::leaf(format!("Return Type: {ty}")),
        None => TreeNode::leaf("Return Type: Void"),
    }
}

fn block_node(block: &BlockStmt) -> TreeNode {
    if block.statements.is_empty() {
        return TreeNode::leaf("Block (empty)");
    }
    TreeNode::branch("Block:", block.statements.iter().map(stmt_node).collect())
}

fn parameter_node(parameter: &Parameter) -> TreeNode {
    let modifiers: String = parameter
        .modifiers()
        .iter()
        .map(|modifier| format!("{} ", modifier.text()))
        .collect();

    match parameter {
        Parameter::SelfParam(_) => TreeNode::leaf(format!("Parameter: {modifiers}self")),
        Parameter::Variable(param) => {
            let variadic = if param.variadic { "..." } else { "" };
            let label = format!(
                "Parameter: {modifiers}{}: {}{variadic}",
                param.name.text(),
                param.ty
            );
            match &param.default {
                Some(default) => TreeNode::branch(
                    label,
                    vec![TreeNode::branch("Default:", vec![expr_node(default)])],
                ),
                None => TreeNode::leaf(label),
            }
        }
    }
}

fn lambda_node(lambda: &LambdaExpr) -> TreeNode {
    TreeNode::branch(
        "Lambda:",
        vec![
            return_type_node(lambda.return_type.as_ref()),
            TreeNode::branch(
                "Parameters:",
                lambda.parameters.iter().map(parameter_node).collect(),
            ),
            TreeNode::branch("Body:", vec![block_node(&lambda.body)]),
        ],
    )
}

fn expr_node(expr: &Expr) -> TreeNode {
    match expr {
        Expr::Lambda(lambda) => lambda_node(lambda),
        Expr::Assignment {
            target, op, value, ..
        } => TreeNode::branch(
            format!("Assignment: {op}"),
            vec![expr_node(target), expr_node(value)],
        ),
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
            ..
        } => TreeNode::branch(
            "Conditional:",
            vec![
                expr_node(condition),
                expr_node(then_branch),
                expr_node(else_branch),
            ],
        ),
        Expr::Binary {
            op, left, right, ..
        } => TreeNode::branch(
            format!("Binary: {op}"),
            vec![expr_node(left), expr_node(right)],
        ),
        Expr::Unary { op, operand, .. } => {
            let position = if op.is_prefix() { "prefix" } else { "postfix" };
            TreeNode::branch(
                format!("Unary ({position}): {op}"),
                vec![expr_node(operand)],
            )
        }
        Expr::Cast { op, value, ty, .. } => {
            TreeNode::branch(format!("Cast: {op} {ty}"), vec![expr_node(value)])
        }
        Expr::Access {
            object,
            member,
            null_check,
            ..
        } => {
            let dot = if *null_check { "?." } else { "." };
            TreeNode::branch(
                format!("Access: {dot}{}", member.text()),
                vec![expr_node(object)],
            )
        }
        Expr::Index {
            object,
            arguments,
            null_check,
            ..
        } => {
            let label = if *null_check {
                "Index (null-checked):"
            } else {
                "Index:"
            };
            let mut children = vec![expr_node(object)];
            children.extend(arguments.iter().map(expr_node));
            TreeNode::branch(label, children)
        }
        Expr::Call {
            callee, arguments, ..
        } => TreeNode::branch(
            "Call:",
            vec![
                expr_node(callee),
                TreeNode::branch("Arguments:", arguments.iter().map(expr_node).collect()),
            ],
        ),
        Expr::Token(token) => match token.kind {
            TokenKind::Identifier | TokenKind::KwSelf => {
                TreeNode::leaf(format!("Identifier: {}", token.text()))
            }
            _ => match &token.value {
                Some(value) => TreeNode::leaf(format!("Literal: {value}")),
                None => TreeNode::leaf(format!("Token: {}", token.text())),
            },
        },
        Expr::Type(ty) => TreeNode::leaf(format!("Type: {ty}")),
        Expr::InterpolatedString { parts, .. } => {
            TreeNode::branch("Interpolated String:", parts.iter().map(expr_node).collect())
        }
        Expr::Tuple { elements, .. } if elements.is_empty() => TreeNode::leaf("Tuple (empty)"),
        Expr::Tuple { elements, .. } => {
            TreeNode::branch("Tuple:", elements.iter().map(expr_node).collect())
        }
        Expr::List { ty, elements, .. } => {
            let label = match ty {
                Some(ty) => format!("List: {ty}"),
                None => "List:".to_string(),
            };
            TreeNode::branch(label, elements.iter().map(expr_node).collect())
        }
        Expr::Map { ty, entries, .. } => {
            let label = match ty {
                Some(ty) => format!("Map: {ty}"),
                None => "Map:".to_string(),
            };
            let entries = entries
                .iter()
                .map(|(key, value)| {
                    TreeNode::branch("Entry:", vec![expr_node(key), expr_node(value)])
                })
                .collect();
            TreeNode::branch(label, entries)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::parser::parse;
    use crate::text::SourceBuffer;

    fn printed(src: &str) -> String {
        let output = parse(Arc::new(SourceBuffer::raw(src)));
        let program = output.accepted().expect("program should parse cleanly");
        format_program(program)
    }

    #[test]
    fn prints_entry_tree() {
        let text = printed("mod demo.app\nuse std.io.*\nmain : entry(x: i32) : i32 {\n  ret x + 1\n}\n");

        let expected = "\
Program
├── Module: demo.app
└── Statements:
    ├── Import std.io::*
    └── Entry:
        ├── Name: main
        ├── Return Type: i32
        ├── Parameters:
        │   └── Parameter: x: i32
        └── Body:
            └── Block:
                └── Return:
                    └── Binary: +
                        ├── Identifier: x
                        └── Literal: 1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn prints_empty_blocks_and_void() {
        let text = printed("mod m\nrun : pub entry() {}");

        assert!(text.contains("Return Type: Void"));
        assert!(text.contains("Modifiers: pub"));
        assert!(text.contains("Block (empty)"));
    }
}
