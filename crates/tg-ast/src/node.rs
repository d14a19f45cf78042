//! `AstNode` implementation: a flat tree, one child per statement, mirroring
//! the teacher's `BaseAdapter::parse_php_style` shape (§4.3).

use tg_core::AstNode;

use crate::statements::{build_statements, Statement};

pub struct LineNode {
    tag: &'static str,
    line: Option<usize>,
    text: Option<String>,
    children: Vec<LineNode>,
}

impl LineNode {
    fn leaf(statement: &Statement) -> Self {
        Self {
            tag: statement.kind.tag(),
            line: Some(statement.line),
            text: Some(statement.text.clone()),
            children: Vec::new(),
        }
    }

    pub fn program(source: &str) -> Self {
        let children = build_statements(source).iter().map(LineNode::leaf).collect();
        Self { tag: "program", line: None, text: None, children }
    }
}

impl AstNode for LineNode {
    fn node_type(&self) -> &str {
        self.tag
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&dyn AstNode> {
        self.children.get(index).map(|n| n as &dyn AstNode)
    }

    fn line(&self) -> Option<usize> {
        self.line
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}
