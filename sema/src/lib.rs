//! Pass 1 of the mini-C compiler: semantic analysis.
//!
//! Walks an [`Ast`] built by an external parser (or, in this crate's tests and demo CLI, by
//! [`minicc_ast::build`]), resolves every declaration into a lexically-scoped
//! [`SymbolTable`], assigns storage offsets, checks the type rules in §4.E of the
//! specification, and annotates every node in place. [`minicc_codegen`](../minicc_codegen/index.html)
//! consumes the result without re-checking any of it.

mod error;
mod rules;
mod symtab;

pub use error::{Result, SemaError};
pub use symtab::SymbolTable;

use minicc_ast::{Ast, Nature, NodeId, Type};

/// Runs pass 1 over `root`, mutating `ast` in place. `root` must have been built with
/// [`Ast::program`](minicc_ast::Ast::program): two operands, an optional chain of global
/// declarations and a `main` function.
pub fn analyse_passe_1(ast: &mut Ast, root: NodeId) -> Result<()> {
    Analyzer {
        ast,
        symtab: SymbolTable::new(),
    }
    .run(root)
}

struct Analyzer<'a> {
    ast: &'a mut Ast,
    symtab: SymbolTable,
}

impl<'a> Analyzer<'a> {
    fn run(&mut self, root: NodeId) -> Result<()> {
        let globals = self.ast.node(root).opr(0);
        let mainf = self
            .ast
            .node(root)
            .opr(1)
            .expect("program root must have a main function");

        self.symtab.push_global_context();
        if let Some(globals) = globals {
            self.decls_list(globals, true)?;
        }
        self.main_decl(mainf)?;

        // Recorded on the program root so the generator knows where the string pool's
        // data-segment region begins: right after the globals, which occupy
        // `get_global_offset()` contiguous bytes starting at offset 0.
        self.ast.node_mut(root).offset = Some(self.symtab.get_global_offset());

        self.symtab.pop_context();
        Ok(())
    }

    fn operands2(&self, id: NodeId) -> (NodeId, NodeId) {
        let node = self.ast.node(id);
        (node.opr(0).unwrap(), node.opr(1).unwrap())
    }

    fn main_decl(&mut self, func: NodeId) -> Result<()> {
        self.symtab.reset_env_current_offset();

        let (ty_id, name_id, block_id) = {
            let node = self.ast.node(func);
            (
                node.opr(0).expect("main declaration missing return type"),
                node.opr(1).expect("main declaration missing name"),
                node.opr(2).expect("main declaration missing body"),
            )
        };

        let name = self.ast.node(name_id).ident().to_owned();
        if name != "main" {
            return Err(SemaError::new(
                self.ast.node(name_id).lineno,
                rules::MAIN_MISNAMED_OR_NOT_VOID,
                format!("The main function must be named 'main', found '{}'", name),
            ));
        }

        if self.ast.node(ty_id).ty() != Type::Void {
            return Err(SemaError::new(
                self.ast.node(ty_id).lineno,
                rules::MAIN_MISNAMED_OR_NOT_VOID,
                "The main function must return 'void'",
            ));
        }

        self.block(block_id)?;

        let frame_size = self.symtab.get_env_current_offset();
        self.ast.node_mut(func).offset = Some(frame_size);
        log::debug!("main frame size: {} bytes", frame_size);
        Ok(())
    }

    fn block(&mut self, block_id: NodeId) -> Result<()> {
        self.symtab.push_context();

        let (decls, instrs) = {
            let node = self.ast.node(block_id);
            (node.opr(0), node.opr(1))
        };

        if let Some(decls) = decls {
            self.decls_list(decls, false)?;
        }
        if let Some(instrs) = instrs {
            self.instr_list(instrs)?;
        }

        self.symtab.pop_context();
        Ok(())
    }

    fn decls_list(&mut self, id: NodeId, is_global: bool) -> Result<()> {
        match self.ast.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.decls_list(left, is_global)?;
                self.decls_list(right, is_global)?;
            }
            Nature::Decls => {
                let (ty_id, decl_id) = self.operands2(id);
                let ty = self.ast.node(ty_id).ty();
                self.decl_list(decl_id, ty, is_global)?;
            }
            other => unreachable!("a declaration list cannot contain a {:?} node", other),
        }
        Ok(())
    }

    fn decl_list(&mut self, id: NodeId, ty: Type, is_global: bool) -> Result<()> {
        match self.ast.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.decl_list(left, ty, is_global)?;
                self.decl_list(right, ty, is_global)?;
            }
            Nature::Decl => self.single_decl(id, ty, is_global)?,
            other => unreachable!("a declarator list cannot contain a {:?} node", other),
        }
        Ok(())
    }

    fn single_decl(&mut self, id: NodeId, ty: Type, is_global: bool) -> Result<()> {
        let (ident_id, init_id, lineno) = {
            let node = self.ast.node(id);
            (node.opr(0).expect("Decl missing its identifier"), node.opr(1), node.lineno)
        };
        let name = self.ast.node(ident_id).ident().to_owned();

        // Mirrors the reference implementation: the name is registered unconditionally before
        // either error check runs, so a void-typed duplicate reports as void (rule 1.8), not as
        // a duplicate (rule 1.11).
        let add_result = self.symtab.env_add_element(&name, ident_id);

        if ty == Type::Void {
            return Err(SemaError::new(
                lineno,
                rules::VOID_VARIABLE,
                format!("Variable '{}' cannot be of type void", name),
            ));
        }

        let offset = add_result.map_err(|_| {
            SemaError::new(
                lineno,
                rules::DUPLICATE_DECLARATION,
                format!("Variable '{}' already declared", name),
            )
        })?;

        if let Some(init_id) = init_id {
            if is_global {
                self.check_global_initializer(init_id, ty, &name)?;
            } else {
                let init_ty = self.expr(init_id)?;
                if init_ty != ty {
                    return Err(SemaError::new(
                        self.ast.node(init_id).lineno,
                        rules::BAD_LOCAL_INITIALIZER,
                        format!("Type mismatch in initialization of variable '{}'", name),
                    ));
                }
            }
        }

        let ident_node = self.ast.node_mut(ident_id);
        ident_node.ty = Some(ty);
        ident_node.global_decl = is_global;
        ident_node.offset = Some(offset);
        Ok(())
    }

    fn check_global_initializer(&mut self, init_id: NodeId, ty: Type, name: &str) -> Result<()> {
        let (nature, lineno) = {
            let node = self.ast.node(init_id);
            (node.nature, node.lineno)
        };

        let init_ty = match nature {
            Nature::IntVal => Type::Int,
            Nature::BoolVal => Type::Bool,
            _ => {
                return Err(SemaError::new(
                    lineno,
                    rules::BAD_GLOBAL_INITIALIZER,
                    format!(
                        "Expressions are not allowed in initialization of global variable '{}'",
                        name
                    ),
                ));
            }
        };
        self.ast.node_mut(init_id).ty = Some(init_ty);

        if init_ty != ty {
            return Err(SemaError::new(
                lineno,
                rules::BAD_GLOBAL_INITIALIZER,
                format!("Type mismatch in initialization of variable '{}'", name),
            ));
        }
        Ok(())
    }

    fn instr_list(&mut self, id: NodeId) -> Result<()> {
        match self.ast.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.instr_list(left)?;
                self.instr_list(right)?;
            }
            _ => self.instr(id)?,
        }
        Ok(())
    }

    fn instr(&mut self, id: NodeId) -> Result<()> {
        let (nature, lineno) = {
            let node = self.ast.node(id);
            (node.nature, node.lineno)
        };

        match nature {
            Nature::If => {
                let (cond, then, else_) = {
                    let node = self.ast.node(id);
                    (
                        node.opr(0).expect("If missing condition"),
                        node.opr(1).expect("If missing then-branch"),
                        node.opr(2),
                    )
                };
                self.require_condition(cond, rules::NON_BOOLEAN_IF_CONDITION, "if")?;
                self.instr(then)?;
                if let Some(else_) = else_ {
                    self.instr(else_)?;
                }
            }
            Nature::While => {
                let (cond, body) = self.operands2(id);
                self.require_condition(cond, rules::NON_BOOLEAN_WHILE_CONDITION, "while")?;
                self.instr(body)?;
            }
            Nature::For => {
                let (init, cond, step, body) = {
                    let node = self.ast.node(id);
                    (node.opr(0), node.opr(1), node.opr(2), node.opr(3).expect("For missing body"))
                };
                if let Some(init) = init {
                    self.expr(init)?;
                }
                if let Some(cond) = cond {
                    self.require_condition(cond, rules::NON_BOOLEAN_FOR_CONDITION, "for")?;
                }
                self.instr(body)?;
                if let Some(step) = step {
                    self.expr(step)?;
                }
            }
            Nature::DoWhile => {
                let (body, cond) = self.operands2(id);
                self.instr(body)?;
                self.require_condition(cond, rules::NON_BOOLEAN_DOWHILE_CONDITION, "do-while")?;
            }
            Nature::Block => self.block(id)?,
            Nature::Print => self.print_args(id)?,
            _ => {
                // A bare expression statement, e.g. `i = i + 1;`.
                self.expr(id)?;
            }
        }

        let _ = lineno;
        Ok(())
    }

    fn require_condition(&mut self, cond: NodeId, rule: &'static str, construct: &str) -> Result<()> {
        let cond_ty = self.expr(cond)?;
        if cond_ty != Type::Bool {
            return Err(SemaError::new(
                self.ast.node(cond).lineno,
                rule,
                format!("The condition of a '{}' must be of type bool", construct),
            ));
        }
        Ok(())
    }

    fn print_args(&mut self, id: NodeId) -> Result<()> {
        let args = self
            .ast
            .node(id)
            .opr(0)
            .expect("print requires at least one argument");
        self.print_arg_list(args)
    }

    fn print_arg_list(&mut self, id: NodeId) -> Result<()> {
        match self.ast.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.print_arg_list(left)?;
                self.print_arg_item(right)?;
            }
            _ => self.print_arg_item(id)?,
        }
        Ok(())
    }

    /// Every print argument is walked as a full expression, not just identifiers: this extends
    /// the reference implementation (see the resolved open question in `DESIGN.md`), matching
    /// what the generator actually evaluates for arbitrary expression arguments.
    fn print_arg_item(&mut self, id: NodeId) -> Result<()> {
        if self.ast.node(id).nature == Nature::StringVal {
            return Ok(());
        }
        self.expr(id)?;
        Ok(())
    }

    fn expr(&mut self, id: NodeId) -> Result<Type> {
        let (nature, lineno) = {
            let node = self.ast.node(id);
            (node.nature, node.lineno)
        };

        let ty = match nature {
            Nature::IntVal => Type::Int,
            Nature::BoolVal => Type::Bool,

            Nature::Ident => {
                let name = self.ast.node(id).ident().to_owned();
                let decl_id = self.symtab.get_decl_node(&name).ok_or_else(|| {
                    SemaError::new(
                        lineno,
                        rules::UNDECLARED_IDENTIFIER,
                        format!("Use of undeclared identifier '{}'", name),
                    )
                })?;
                let decl_ty = self.ast.node(decl_id).ty();
                self.ast.node_mut(id).decl_node = Some(decl_id);
                decl_ty
            }

            Nature::Affect => {
                let (lhs, rhs) = self.operands2(id);
                if self.ast.node(lhs).nature != Nature::Ident {
                    return Err(SemaError::new(
                        lineno,
                        rules::INVALID_ASSIGNMENT,
                        "The left-hand side of an assignment must be an identifier",
                    ));
                }
                let lhs_ty = self.expr(lhs)?;
                let rhs_ty = self.expr(rhs)?;
                if lhs_ty != rhs_ty {
                    return Err(SemaError::new(
                        lineno,
                        rules::INVALID_ASSIGNMENT,
                        format!("Cannot assign a value of type {} to a variable of type {}", rhs_ty, lhs_ty),
                    ));
                }
                lhs_ty
            }

            Nature::Plus
            | Nature::Minus
            | Nature::Mul
            | Nature::Div
            | Nature::Mod
            | Nature::BAnd
            | Nature::BOr
            | Nature::BXor
            | Nature::Sll
            | Nature::Sra
            | Nature::Srl => self.check_int_binary(id, lineno)?,

            Nature::Lt | Nature::Gt | Nature::Le | Nature::Ge => {
                let (left, right) = self.operands2(id);
                let (lt, rt) = (self.expr(left)?, self.expr(right)?);
                if lt != Type::Int || rt != Type::Int {
                    return Err(self.binary_mismatch(lineno, lt, rt));
                }
                Type::Bool
            }

            Nature::Eq | Nature::Ne => {
                let (left, right) = self.operands2(id);
                let (lt, rt) = (self.expr(left)?, self.expr(right)?);
                if lt != rt {
                    return Err(self.binary_mismatch(lineno, lt, rt));
                }
                Type::Bool
            }

            Nature::And | Nature::Or => {
                let (left, right) = self.operands2(id);
                let (lt, rt) = (self.expr(left)?, self.expr(right)?);
                if lt != Type::Bool || rt != Type::Bool {
                    return Err(self.binary_mismatch(lineno, lt, rt));
                }
                Type::Bool
            }

            Nature::UMinus | Nature::BNot => {
                let operand = self.ast.node(id).opr(0).unwrap();
                let ot = self.expr(operand)?;
                if ot != Type::Int {
                    return Err(SemaError::new(
                        lineno,
                        rules::UNARY_TYPE_MISMATCH,
                        format!("Operator expects an int operand, found {}", ot),
                    ));
                }
                Type::Int
            }

            Nature::Not => {
                let operand = self.ast.node(id).opr(0).unwrap();
                let ot = self.expr(operand)?;
                if ot != Type::Bool {
                    return Err(SemaError::new(
                        lineno,
                        rules::UNARY_TYPE_MISMATCH,
                        format!("Operator '!' expects a bool operand, found {}", ot),
                    ));
                }
                Type::Bool
            }

            other => unreachable!("{:?} cannot appear in expression position", other),
        };

        self.ast.node_mut(id).ty = Some(ty);
        Ok(ty)
    }

    fn check_int_binary(&mut self, id: NodeId, lineno: u32) -> Result<Type> {
        let (left, right) = self.operands2(id);
        let (lt, rt) = (self.expr(left)?, self.expr(right)?);
        if lt != Type::Int || rt != Type::Int {
            return Err(self.binary_mismatch(lineno, lt, rt));
        }
        Ok(Type::Int)
    }

    fn binary_mismatch(&self, lineno: u32, lt: Type, rt: Type) -> SemaError {
        SemaError::new(
            lineno,
            rules::BINARY_TYPE_MISMATCH,
            format!("Operator is not defined for operand types {} and {}", lt, rt),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use minicc_ast::Ast;

    /// `int g = 7; void main(){ int a = g * 3 + 1; print("a=", a); }`
    #[test]
    fn globals_and_arithmetic_type_check() {
        let mut ast = Ast::new();

        let int_ty = ast.type_token(Type::Int, 1);
        let g_ident = ast.ident("g", 1);
        let seven = ast.intval(7, 1);
        let g_decl = ast.decl(g_ident, Some(seven), 1);
        let globals = ast.decls(int_ty, g_decl, 1);

        let int_ty2 = ast.type_token(Type::Int, 1);
        let a_ident = ast.ident("a", 1);
        let g_use = ast.ident("g", 1);
        let three = ast.intval(3, 1);
        let mul = ast.binop(Nature::Mul, g_use, three, 1);
        let one = ast.intval(1, 1);
        let plus = ast.binop(Nature::Plus, mul, one, 1);
        let a_decl = ast.decl(a_ident, Some(plus), 1);
        let a_decls = ast.decls(int_ty2, a_decl, 1);

        let label = ast.stringval("a=", 1);
        let a_use = ast.ident("a", 1);
        let print = ast.print(&[label, a_use], 1);

        let instrs = print;
        let block = ast.block(Some(a_decls), Some(instrs), 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(Some(globals), main);

        analyse_passe_1(&mut ast, root).unwrap();

        assert_eq!(ast.node(g_ident).ty, Some(Type::Int));
        assert_eq!(ast.node(g_ident).offset, Some(0));
        assert_eq!(ast.node(a_ident).offset, Some(0));
        assert_eq!(ast.node(mul).ty, Some(Type::Int));
        assert_eq!(ast.node(g_use).decl_node, Some(g_ident));
    }

    /// `void main(){ x = 1; }` — undeclared identifier.
    #[test]
    fn undeclared_identifier_is_rejected() {
        let mut ast = Ast::new();
        let x = ast.ident("x", 1);
        let one = ast.intval(1, 1);
        let affect = ast.affect(x, one, 1);
        let block = ast.block(None, Some(affect), 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(None, main);

        let err = analyse_passe_1(&mut ast, root).unwrap_err();
        assert_eq!(err.rule, "1.61");
        assert_eq!(err.line, 1);
    }

    /// `int g = 1 + 1; void main(){}` — non-literal global initializer.
    #[test]
    fn non_literal_global_initializer_is_rejected() {
        let mut ast = Ast::new();
        let ty = ast.type_token(Type::Int, 1);
        let g = ast.ident("g", 1);
        let one_a = ast.intval(1, 1);
        let one_b = ast.intval(1, 1);
        let sum = ast.binop(Nature::Plus, one_a, one_b, 1);
        let decl = ast.decl(g, Some(sum), 1);
        let globals = ast.decls(ty, decl, 1);

        let block = ast.block(None, None, 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(Some(globals), main);

        let err = analyse_passe_1(&mut ast, root).unwrap_err();
        assert_eq!(err.rule, "1.12");
    }

    /// `void main(){ int a; if (a) {} }` — non-boolean condition.
    #[test]
    fn non_boolean_if_condition_is_rejected() {
        let mut ast = Ast::new();
        let ty = ast.type_token(Type::Int, 1);
        let a_ident = ast.ident("a", 1);
        let decl = ast.decl(a_ident, None, 1);
        let decls = ast.decls(ty, decl, 1);

        let a_use = ast.ident("a", 2);
        let then_block = ast.block(None, None, 2);
        let if_stmt = ast.if_then(a_use, then_block, 2);

        let block = ast.block(Some(decls), Some(if_stmt), 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(None, main);

        let err = analyse_passe_1(&mut ast, root).unwrap_err();
        assert_eq!(err.rule, "1.18");
    }

    /// A local declared `void` fails with rule 1.8, even before redeclaration is considered.
    #[test]
    fn void_local_variable_is_rejected() {
        let mut ast = Ast::new();
        let ty = ast.type_token(Type::Void, 1);
        let ident = ast.ident("v", 1);
        let decl = ast.decl(ident, None, 1);
        let decls = ast.decls(ty, decl, 1);
        let block = ast.block(Some(decls), None, 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(None, main);

        let err = analyse_passe_1(&mut ast, root).unwrap_err();
        assert_eq!(err.rule, "1.8");
    }

    #[test]
    fn main_must_be_named_main() {
        let mut ast = Ast::new();
        let block = ast.block(None, None, 1);
        let main = ast.main_function("start", block, 1);
        let root = ast.program(None, main);

        let err = analyse_passe_1(&mut ast, root).unwrap_err();
        assert_eq!(err.rule, "1.4");
    }

    /// `void main(){ int i=0; int s=0; while(i<10){ s=s+i; i=i+1; } print("s=", s); }`
    #[test]
    fn while_loop_condition_and_body_type_check() {
        let mut ast = Ast::new();

        let int_ty1 = ast.type_token(Type::Int, 1);
        let i_ident = ast.ident("i", 1);
        let zero = ast.intval(0, 1);
        let i_decl = ast.decl(i_ident, Some(zero), 1);
        let int_ty2 = ast.type_token(Type::Int, 1);
        let s_ident = ast.ident("s", 1);
        let zero2 = ast.intval(0, 1);
        let s_decl = ast.decl(s_ident, Some(zero2), 1);

        let decls1 = ast.decls(int_ty1, i_decl, 1);
        let decls2 = ast.decls(int_ty2, s_decl, 1);
        let decls = ast.list(decls1, decls2, 1);

        let i_use1 = ast.ident("i", 2);
        let ten = ast.intval(10, 2);
        let cond = ast.binop(Nature::Lt, i_use1, ten, 2);

        let s_lhs = ast.ident("s", 2);
        let s_rhs = ast.ident("s", 2);
        let i_rhs = ast.ident("i", 2);
        let sum = ast.binop(Nature::Plus, s_rhs, i_rhs, 2);
        let assign_s = ast.affect(s_lhs, sum, 2);

        let i_lhs = ast.ident("i", 2);
        let i_rhs2 = ast.ident("i", 2);
        let one = ast.intval(1, 2);
        let inc = ast.binop(Nature::Plus, i_rhs2, one, 2);
        let assign_i = ast.affect(i_lhs, inc, 2);

        let body_instrs = ast.list(assign_s, assign_i, 2);
        let body = ast.block(None, Some(body_instrs), 2);
        let while_stmt = ast.while_loop(cond, body, 2);

        let label = ast.stringval("s=", 3);
        let s_print = ast.ident("s", 3);
        let print = ast.print(&[label, s_print], 3);

        let instrs = ast.list(while_stmt, print, 1);
        let block = ast.block(Some(decls), Some(instrs), 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(None, main);

        analyse_passe_1(&mut ast, root).unwrap();
        assert_eq!(ast.node(cond).ty, Some(Type::Bool));
        assert_eq!(ast.node(main).offset, Some(8));
    }
}
