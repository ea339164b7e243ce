//! Bundled mini-C programs, built directly through `minicc_ast::build` rather than parsed from
//! source text (there is no front end in this crate — see the crate root docs). Stands in for
//! "pick a source file" in a driver that had a real parser to call.

use minicc_ast::{Ast, Nature, NodeId, Type};

/// Returns the program names this CLI can run, in the order `--list` should print them.
pub fn names() -> &'static [&'static str] {
    &["globals", "bitwise", "control-flow"]
}

/// Builds the demo program `name` and returns its AST and program-root node id.
pub fn build(name: &str) -> Option<(Ast, NodeId)> {
    match name {
        "globals" => Some(globals_and_arithmetic()),
        "bitwise" => Some(bitwise()),
        "control-flow" => Some(control_flow()),
        _ => None,
    }
}

/// `int g = 7; void main(){ int a = g * 3 + 1; print("a=", a); }`
fn globals_and_arithmetic() -> (Ast, NodeId) {
    let mut ast = Ast::new();

    let int_ty = ast.type_token(Type::Int, 1);
    let g_ident = ast.ident("g", 1);
    let seven = ast.intval(7, 1);
    let g_decl = ast.decl(g_ident, Some(seven), 1);
    let globals = ast.decls(int_ty, g_decl, 1);

    let int_ty2 = ast.type_token(Type::Int, 2);
    let a_ident = ast.ident("a", 2);
    let g_use = ast.ident("g", 2);
    let three = ast.intval(3, 2);
    let mul = ast.binop(Nature::Mul, g_use, three, 2);
    let one = ast.intval(1, 2);
    let plus = ast.binop(Nature::Plus, mul, one, 2);
    let a_decl = ast.decl(a_ident, Some(plus), 2);
    let a_decls = ast.decls(int_ty2, a_decl, 2);

    let label = ast.stringval("a=", 3);
    let a_use = ast.ident("a", 3);
    let print = ast.print(&[label, a_use], 3);

    let block = ast.block(Some(a_decls), Some(print), 1);
    let main = ast.main_function("main", block, 1);
    let root = ast.program(Some(globals), main);
    (ast, root)
}

/// `int a=12; int b=10; void main(){ print(" band: ", a&b); print(" bor: ", a|b);
/// print(" bxor: ", a^b); print(" bnot: ", ~a); print(" sll: ", a<<2); print(" sra: ", a>>1); }`
fn bitwise() -> (Ast, NodeId) {
    let mut ast = Ast::new();

    let ty_a = ast.type_token(Type::Int, 1);
    let a_ident = ast.ident("a", 1);
    let twelve = ast.intval(12, 1);
    let a_decl = ast.decl(a_ident, Some(twelve), 1);
    let decls_a = ast.decls(ty_a, a_decl, 1);

    let ty_b = ast.type_token(Type::Int, 2);
    let b_ident = ast.ident("b", 2);
    let ten = ast.intval(10, 2);
    let b_decl = ast.decl(b_ident, Some(ten), 2);
    let decls_b = ast.decls(ty_b, b_decl, 2);

    let decls = ast.list(decls_a, decls_b, 1);

    let mut prints = Vec::new();
    {
        let label = ast.stringval(" band: ", 3);
        let a1 = ast.ident("a", 3);
        let b1 = ast.ident("b", 3);
        let band = ast.binop(Nature::BAnd, a1, b1, 3);
        prints.push(ast.print(&[label, band], 3));
    }
    {
        let label = ast.stringval(" bor: ", 4);
        let a1 = ast.ident("a", 4);
        let b1 = ast.ident("b", 4);
        let bor = ast.binop(Nature::BOr, a1, b1, 4);
        prints.push(ast.print(&[label, bor], 4));
    }
    {
        let label = ast.stringval(" bxor: ", 5);
        let a1 = ast.ident("a", 5);
        let b1 = ast.ident("b", 5);
        let bxor = ast.binop(Nature::BXor, a1, b1, 5);
        prints.push(ast.print(&[label, bxor], 5));
    }
    {
        let label = ast.stringval(" bnot: ", 6);
        let a1 = ast.ident("a", 6);
        let bnot = ast.unop(Nature::BNot, a1, 6);
        prints.push(ast.print(&[label, bnot], 6));
    }
    {
        let label = ast.stringval(" sll: ", 7);
        let a1 = ast.ident("a", 7);
        let two = ast.intval(2, 7);
        let sll = ast.binop(Nature::Sll, a1, two, 7);
        prints.push(ast.print(&[label, sll], 7));
    }
    {
        let label = ast.stringval(" sra: ", 8);
        let a1 = ast.ident("a", 8);
        let one = ast.intval(1, 8);
        let sra = ast.binop(Nature::Sra, a1, one, 8);
        prints.push(ast.print(&[label, sra], 8));
    }

    let instrs = ast
        .list_chain(&prints, 3)
        .expect("at least one print statement");
    let block = ast.block(Some(decls), Some(instrs), 1);
    let main = ast.main_function("main", block, 1);
    let root = ast.program(None, main);
    (ast, root)
}

/// `void main(){ int i=0; int s=0; while(i<10){ s=s+i; i=i+1; } print("s=", s); }`
fn control_flow() -> (Ast, NodeId) {
    let mut ast = Ast::new();

    let ty1 = ast.type_token(Type::Int, 1);
    let i_ident = ast.ident("i", 1);
    let zero = ast.intval(0, 1);
    let i_decl = ast.decl(i_ident, Some(zero), 1);
    let ty2 = ast.type_token(Type::Int, 1);
    let s_ident = ast.ident("s", 1);
    let zero2 = ast.intval(0, 1);
    let s_decl = ast.decl(s_ident, Some(zero2), 1);
    let decls1 = ast.decls(ty1, i_decl, 1);
    let decls2 = ast.decls(ty2, s_decl, 1);
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
    (ast, root)
}
