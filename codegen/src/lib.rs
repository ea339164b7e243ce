//! Pass 2 of the mini-C compiler: code generation.
//!
//! Walks an [`Ast`](minicc_ast::Ast) already annotated by `minicc_sema::analyse_passe_1`,
//! emitting a MIPS32 textual assembly program for the MARS/SPIM simulator: a deterministic
//! register allocator with stack spill, a lazily-populated string pool for `print` literals,
//! unique control-flow labels, and the standard `main` prologue/epilogue.
//!
//! This pass re-checks nothing pass 1 already established; see that crate's docs for the
//! invariants it relies on.

pub mod config;
pub mod emitter;
pub mod labels;
mod gen;
pub mod reg;
pub mod regalloc;
pub mod strings;

pub use config::CodegenConfig;
pub use emitter::{Emitter, TextEmitter};
pub use gen::gen_code_passe_2;
pub use labels::LabelAllocator;
pub use reg::Reg;
pub use regalloc::RegisterAllocator;
pub use strings::StringPool;

#[cfg(test)]
mod test {
    use super::*;
    use minicc_ast::{Ast, Nature, Type};
    use minicc_sema::analyse_passe_1;

    /// `int g = 7; void main(){ int a = g * 3 + 1; print("a=", a); }`
    #[test]
    fn globals_and_arithmetic() {
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

        let block = ast.block(Some(a_decls), Some(print), 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(Some(globals), main);

        analyse_passe_1(&mut ast, root).unwrap();
        let asm = gen_code_passe_2(&ast, root, CodegenConfig::default());

        assert!(asm.contains("g: .word 7"));
        assert!(asm.contains(".asciiz \"a=\""));
        assert!(asm.contains("main:"));
        assert!(asm.contains("syscall"));
    }

    /// `int a=12; int b=10; print(~a, a<<2, a>>1);` — bitwise operators.
    #[test]
    fn bitwise_operators_lower_to_the_expected_mips_sequences() {
        let mut ast = Ast::new();

        let ty_a = ast.type_token(Type::Int, 1);
        let a_ident = ast.ident("a", 1);
        let twelve = ast.intval(12, 1);
        let a_decl = ast.decl(a_ident, Some(twelve), 1);
        let decls_a = ast.decls(ty_a, a_decl, 1);

        let a_use1 = ast.ident("a", 2);
        let bnot = ast.unop(Nature::BNot, a_use1, 2);
        let a_use2 = ast.ident("a", 2);
        let two = ast.intval(2, 2);
        let sll = ast.binop(Nature::Sll, a_use2, two, 2);
        let a_use3 = ast.ident("a", 2);
        let one = ast.intval(1, 2);
        let sra = ast.binop(Nature::Sra, a_use3, one, 2);
        let print = ast.print(&[bnot, sll, sra], 2);

        let block = ast.block(Some(decls_a), Some(print), 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(None, main);

        analyse_passe_1(&mut ast, root).unwrap();
        let asm = gen_code_passe_2(&ast, root, CodegenConfig::default());

        assert!(asm.contains("nor"));
        assert!(asm.contains("sllv"));
        assert!(asm.contains("srav"));
    }

    /// `void main(){ int i=0; int s=0; while(i<10){ s=s+i; i=i+1; } print("s=", s); }`
    #[test]
    fn while_loop_emits_one_guarded_body() {
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

        analyse_passe_1(&mut ast, root).unwrap();
        let asm = gen_code_passe_2(&ast, root, CodegenConfig::default());

        assert_eq!(asm.matches("L0:").count(), 1);
        assert_eq!(asm.matches("L1:").count(), 1);
        assert_eq!(asm.matches("beq").count(), 1, "the loop condition must be tested exactly once per iteration, not unrolled");
    }

    /// An empty `for(;;){}` generates only the unconditional back-edge, no condition branch.
    #[test]
    fn empty_for_loop_has_no_condition_branch() {
        let mut ast = Ast::new();
        let body = ast.block(None, None, 1);
        let for_stmt = ast.for_loop(None, None, None, body, 1);
        let block = ast.block(None, Some(for_stmt), 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(None, main);

        analyse_passe_1(&mut ast, root).unwrap();
        let asm = gen_code_passe_2(&ast, root, CodegenConfig::default());

        assert!(!asm.contains("beq"));
        assert!(asm.contains("\tj L"));
    }

    /// Eight distinct variables summed in a right-leaning tree, with a register window of 4,
    /// must spill: holding a register down the right spine exceeds the Strahler number the
    /// window supports without spilling (a left-leaning chain never would — each left
    /// sub-chain collapses back to one live register before the next leaf is evaluated).
    #[test]
    fn deep_expression_spills_through_the_stack() {
        let mut ast = Ast::new();
        let mut decls: Option<minicc_ast::NodeId> = None;
        let mut idents = Vec::new();
        for i in 0..8 {
            let ty = ast.type_token(Type::Int, 1);
            let name = format!("v{}", i);
            let ident = ast.ident(&name, 1);
            let value = ast.intval(i, 1);
            let decl = ast.decl(ident, Some(value), 1);
            let decl_list = ast.decls(ty, decl, 1);
            decls = Some(match decls {
                Some(prev) => ast.list(prev, decl_list, 1),
                None => decl_list,
            });
            idents.push(format!("v{}", i));
        }

        let mut sum = ast.ident(&idents[7], 2);
        for name in idents[..7].iter().rev() {
            let use_ = ast.ident(name, 2);
            sum = ast.binop(Nature::Plus, use_, sum, 2);
        }
        let total_ident = ast.ident("total", 1);
        let ty = ast.type_token(Type::Int, 1);
        let total_decl = ast.decl(total_ident, None, 1);
        let total_decls = ast.decls(ty, total_decl, 1);
        decls = Some(ast.list(decls.unwrap(), total_decls, 1));

        let total_lhs = ast.ident("total", 2);
        let assign = ast.affect(total_lhs, sum, 2);

        let block = ast.block(decls, Some(assign), 1);
        let main = ast.main_function("main", block, 1);
        let root = ast.program(None, main);

        analyse_passe_1(&mut ast, root).unwrap();
        let config = CodegenConfig::new(4, CodegenConfig::DEFAULT_DATA_SEGMENT_BASE);
        let asm = gen_code_passe_2(&ast, root, config);

        assert!(asm.contains("$v1"), "a spilled operand must be restored through the dedicated restore register");
    }

    #[test]
    fn boundary_integer_literals_compile() {
        for value in [0xFFFFi64, 0x10000i64, 0x7FFFFFFFi64] {
            let mut ast = Ast::new();
            let v = ast.intval(value, 1);
            let label = ast.stringval("x", 1);
            let print = ast.print(&[label, v], 1);
            let block = ast.block(None, Some(print), 1);
            let main = ast.main_function("main", block, 1);
            let root = ast.program(None, main);

            analyse_passe_1(&mut ast, root).unwrap();
            let asm = gen_code_passe_2(&ast, root, CodegenConfig::default());
            assert!(asm.contains("syscall"));
        }
    }
}
