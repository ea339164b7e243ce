//! Programmatic AST construction.
//!
//! This plays the role of "the parser's output" for tests and the demo CLI: it builds `Ast`
//! arenas directly from Rust calls instead of tokenizing and parsing mini-C source text, which
//! stays an external collaborator outside this crate's scope (see the crate root docs).

use crate::{Ast, Literal, Nature, Node, NodeId, Type};

impl Ast {
    fn leaf(&mut self, nature: Nature, lineno: u32, literal: Literal) -> NodeId {
        let mut node = Node::new(nature, lineno, Vec::new());
        node.literal = literal;
        self.push(node)
    }

    pub fn ident(&mut self, name: &str, lineno: u32) -> NodeId {
        self.leaf(Nature::Ident, lineno, Literal::Ident(name.to_owned()))
    }

    pub fn intval(&mut self, value: i64, lineno: u32) -> NodeId {
        self.leaf(Nature::IntVal, lineno, Literal::Int(value))
    }

    pub fn boolval(&mut self, value: bool, lineno: u32) -> NodeId {
        self.leaf(Nature::BoolVal, lineno, Literal::Int(value as i64))
    }

    pub fn stringval(&mut self, value: &str, lineno: u32) -> NodeId {
        self.leaf(Nature::StringVal, lineno, Literal::Str(value.to_owned()))
    }

    /// A type token, as would appear as the first operand of a `Decls` node or as a function's
    /// declared return type. Its `ty` annotation is populated immediately: unlike an expression's
    /// type, a type token's type is a literal of the surface grammar, not something pass 1 infers.
    pub fn type_token(&mut self, ty: Type, lineno: u32) -> NodeId {
        let mut node = Node::new(Nature::TypeToken, lineno, Vec::new());
        node.ty = Some(ty);
        self.push(node)
    }

    /// Generic two-way sequencing node; `left` and `right` must be walked in that order.
    pub fn list(&mut self, left: NodeId, right: NodeId, lineno: u32) -> NodeId {
        self.push(Node::new(Nature::List, lineno, vec![Some(left), Some(right)]))
    }

    /// Folds `items` into a left-leaning chain of [`list`](Ast::list) nodes preserving left-to-right
    /// order, or returns `None` for an empty slice.
    pub fn list_chain(&mut self, items: &[NodeId], lineno: u32) -> Option<NodeId> {
        let mut iter = items.iter();
        let mut acc = *iter.next()?;
        for &item in iter {
            acc = self.list(acc, item, lineno);
        }
        Some(acc)
    }

    /// A single declarator, e.g. `a` or `a = 1`. `init` is `None` for a bare declaration.
    pub fn decl(&mut self, ident: NodeId, init: Option<NodeId>, lineno: u32) -> NodeId {
        self.push(Node::new(Nature::Decl, lineno, vec![Some(ident), init]))
    }

    /// One or more declarations sharing a type token, e.g. `int a, b = 2;`.
    pub fn decls(&mut self, type_token: NodeId, decl_or_list: NodeId, lineno: u32) -> NodeId {
        self.push(Node::new(
            Nature::Decls,
            lineno,
            vec![Some(type_token), Some(decl_or_list)],
        ))
    }

    pub fn block(&mut self, decls: Option<NodeId>, instrs: Option<NodeId>, lineno: u32) -> NodeId {
        self.push(Node::new(Nature::Block, lineno, vec![decls, instrs]))
    }

    pub fn if_then(&mut self, cond: NodeId, then: NodeId, lineno: u32) -> NodeId {
        self.push(Node::new(Nature::If, lineno, vec![Some(cond), Some(then), None]))
    }

    pub fn if_then_else(&mut self, cond: NodeId, then: NodeId, else_: NodeId, lineno: u32) -> NodeId {
        self.push(Node::new(
            Nature::If,
            lineno,
            vec![Some(cond), Some(then), Some(else_)],
        ))
    }

    pub fn while_loop(&mut self, cond: NodeId, body: NodeId, lineno: u32) -> NodeId {
        self.push(Node::new(Nature::While, lineno, vec![Some(cond), Some(body)]))
    }

    pub fn for_loop(
        &mut self,
        init: Option<NodeId>,
        cond: Option<NodeId>,
        step: Option<NodeId>,
        body: NodeId,
        lineno: u32,
    ) -> NodeId {
        self.push(Node::new(
            Nature::For,
            lineno,
            vec![init, cond, step, Some(body)],
        ))
    }

    pub fn do_while(&mut self, body: NodeId, cond: NodeId, lineno: u32) -> NodeId {
        self.push(Node::new(Nature::DoWhile, lineno, vec![Some(body), Some(cond)]))
    }

    /// `print(arg, arg, ...)`. Panics if `args` is empty: a print statement needs at least one
    /// argument in the surface grammar.
    pub fn print(&mut self, args: &[NodeId], lineno: u32) -> NodeId {
        let list = self
            .list_chain(args, lineno)
            .expect("print requires at least one argument");
        self.push(Node::new(Nature::Print, lineno, vec![Some(list)]))
    }

    pub fn binop(&mut self, nature: Nature, left: NodeId, right: NodeId, lineno: u32) -> NodeId {
        self.push(Node::new(nature, lineno, vec![Some(left), Some(right)]))
    }

    pub fn unop(&mut self, nature: Nature, operand: NodeId, lineno: u32) -> NodeId {
        self.push(Node::new(nature, lineno, vec![Some(operand)]))
    }

    pub fn affect(&mut self, lhs_ident: NodeId, rhs: NodeId, lineno: u32) -> NodeId {
        self.binop(Nature::Affect, lhs_ident, rhs, lineno)
    }

    /// The `void main() { ... }` declaration. `name` is validated by pass 1, not here: a builder
    /// misnaming it should still surface as rule `1.4`, the same as a hand-written parser would.
    pub fn main_function(&mut self, name: &str, block: NodeId, lineno: u32) -> NodeId {
        let ty = self.type_token(Type::Void, lineno);
        let ident = self.ident(name, lineno);
        self.push(Node::new(
            Nature::List,
            lineno,
            vec![Some(ty), Some(ident), Some(block)],
        ))
    }

    /// The whole-program root: `globals` (a possibly-empty chain of `Decls`) and `main_function`.
    pub fn program(&mut self, globals: Option<NodeId>, main_function: NodeId) -> NodeId {
        self.push(Node::new(Nature::List, 0, vec![globals, Some(main_function)]))
    }
}
