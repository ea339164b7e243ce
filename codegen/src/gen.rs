use std::collections::HashMap;

use minicc_ast::{Ast, Nature, NodeId};

use crate::config::CodegenConfig;
use crate::emitter::{Emitter, TextEmitter};
use crate::labels::LabelAllocator;
use crate::reg::Reg;
use crate::regalloc::RegisterAllocator;
use crate::strings::StringPool;

/// Runs pass 2 over an already-annotated `ast`, returning the assembled MIPS32 program text.
///
/// `root` must be the same node passed to `minicc_sema::analyse_passe_1`, and that call must
/// have returned `Ok`: this pass re-checks nothing, and trusts every annotation pass 1 would
/// have populated.
pub fn gen_code_passe_2(ast: &Ast, root: NodeId, config: CodegenConfig) -> String {
    let mut gen = Generator::new(ast, root, config);
    gen.collect_strings(root);
    gen.emit_data_section(root);
    gen.emit_text_section(root);
    gen.emitter.finish()
}

struct Generator<'a> {
    ast: &'a Ast,
    config: CodegenConfig,
    emitter: TextEmitter,
    regs: RegisterAllocator,
    labels: LabelAllocator,
    strings: StringPool,
    /// Pass 2 reads the AST by shared reference (see the resource-ownership note in
    /// `DESIGN.md`): rather than writing a `STRINGVAL` node's pool offset back onto the node as
    /// the reference implementation does, this side table records the same mapping.
    string_offsets: HashMap<NodeId, u32>,
}

impl<'a> Generator<'a> {
    fn new(ast: &'a Ast, root: NodeId, config: CodegenConfig) -> Generator<'a> {
        let globals_size = ast.node(root).offset.unwrap_or(0);
        Generator {
            ast,
            config,
            emitter: TextEmitter::new(),
            regs: RegisterAllocator::new(config.max_registers),
            labels: LabelAllocator::new(),
            strings: StringPool::new(globals_size as u32),
            string_offsets: HashMap::new(),
        }
    }

    fn node(&self, id: NodeId) -> &minicc_ast::Node {
        self.ast.node(id)
    }

    fn operands2(&self, id: NodeId) -> (NodeId, NodeId) {
        let node = self.node(id);
        (node.opr(0).unwrap(), node.opr(1).unwrap())
    }

    // ---- String collection (§4.F step 1) ----

    fn collect_strings(&mut self, id: NodeId) {
        if self.node(id).nature == Nature::StringVal {
            let offset = self.strings.add_string(self.node(id).str_value());
            self.string_offsets.insert(id, offset);
            return;
        }
        let children: Vec<NodeId> = self.node(id).operands.iter().filter_map(|o| *o).collect();
        for child in children {
            self.collect_strings(child);
        }
    }

    // ---- Data section (§4.F step 3) ----

    fn emit_data_section(&mut self, root: NodeId) {
        self.emitter.directive_data();

        if let Some(globals) = self.node(root).opr(0) {
            let mut decls = Vec::new();
            self.collect_global_decls(globals, &mut decls);
            for (name, value) in decls {
                self.emitter.word(&name, value);
            }
        }

        let strings: Vec<(u32, String)> = self
            .strings
            .iter()
            .map(|(offset, s)| (offset, s.to_owned()))
            .collect();
        for (i, (_, s)) in strings.iter().enumerate() {
            self.emitter.asciiz(&format!("str{}", i), s);
        }
    }

    fn collect_global_decls(&self, id: NodeId, out: &mut Vec<(String, i64)>) {
        match self.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.collect_global_decls(left, out);
                self.collect_global_decls(right, out);
            }
            Nature::Decls => {
                let decl_id = self.node(id).opr(1).unwrap();
                self.collect_global_decl_list(decl_id, out);
            }
            other => unreachable!("a declaration list cannot contain a {:?} node", other),
        }
    }

    fn collect_global_decl_list(&self, id: NodeId, out: &mut Vec<(String, i64)>) {
        match self.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.collect_global_decl_list(left, out);
                self.collect_global_decl_list(right, out);
            }
            Nature::Decl => {
                let ident_id = self.node(id).opr(0).unwrap();
                let init_id = self.node(id).opr(1);
                let name = self.node(ident_id).ident().to_owned();
                let value = init_id.map_or(0, |init_id| self.node(init_id).int_value());
                out.push((name, value));
            }
            other => unreachable!("a declarator list cannot contain a {:?} node", other),
        }
    }

    // ---- Text section (§4.F step 4) ----

    fn emit_text_section(&mut self, root: NodeId) {
        let mainf = self
            .node(root)
            .opr(1)
            .expect("program root must have a main function");
        let block_id = self
            .node(mainf)
            .opr(2)
            .expect("main declaration missing body");
        let frame_size_for_locals = self
            .node(mainf)
            .offset
            .expect("pass 1 must record main's local frame size");

        self.emitter.directive_text();
        self.emitter.label("main");
        let handle = self.emitter.stack_alloc_placeholder();

        self.regs.set_temporary_start_offset(frame_size_for_locals);
        self.gen_block(block_id);

        let final_size = frame_size_for_locals.max(self.regs.get_temporary_max_offset());
        self.emitter.patch_stack_alloc(handle, final_size);
        self.emitter.stack_dealloc(final_size);
        self.emitter.ori(Reg::V0, Reg::Zero, 10);
        self.emitter.syscall();
    }

    fn gen_block(&mut self, id: NodeId) {
        let (decls, instrs) = {
            let node = self.node(id);
            (node.opr(0), node.opr(1))
        };
        if let Some(decls) = decls {
            self.gen_local_decls(decls);
        }
        if let Some(instrs) = instrs {
            self.gen_instr_list(instrs);
        }
    }

    fn gen_local_decls(&mut self, id: NodeId) {
        match self.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.gen_local_decls(left);
                self.gen_local_decls(right);
            }
            Nature::Decls => {
                let decl_id = self.node(id).opr(1).unwrap();
                self.gen_local_decl_list(decl_id);
            }
            other => unreachable!("a declaration list cannot contain a {:?} node", other),
        }
    }

    fn gen_local_decl_list(&mut self, id: NodeId) {
        match self.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.gen_local_decl_list(left);
                self.gen_local_decl_list(right);
            }
            Nature::Decl => self.gen_single_local_decl(id),
            other => unreachable!("a declarator list cannot contain a {:?} node", other),
        }
    }

    /// §4.F.4: an uninitialized local reserves its slot in the prologue but generates no code.
    fn gen_single_local_decl(&mut self, id: NodeId) {
        let ident_id = self.node(id).opr(0).unwrap();
        let init_id = self.node(id).opr(1);
        if let Some(init_id) = init_id {
            let reg = self.gen_expr(init_id);
            let offset = self.node(ident_id).offset.unwrap();
            self.emitter.sw(reg, offset, Reg::Sp);
            self.regs.release_reg();
        }
    }

    fn gen_instr_list(&mut self, id: NodeId) {
        match self.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.gen_instr_list(left);
                self.gen_instr_list(right);
            }
            _ => self.gen_instr(id),
        }
    }

    // ---- Statement codegen (§4.F.2) ----

    fn gen_instr(&mut self, id: NodeId) {
        let base_depth = self.regs.depth();

        match self.node(id).nature {
            Nature::If => self.gen_if(id),
            Nature::While => self.gen_while(id),
            Nature::For => self.gen_for(id),
            Nature::DoWhile => self.gen_do_while(id),
            Nature::Block => self.gen_block(id),
            Nature::Print => self.gen_print(id),
            _ => {
                // A bare expression statement, e.g. `i = i + 1;`: the result is discarded.
                self.gen_expr(id);
                self.regs.release_reg();
            }
        }

        debug_assert_eq!(
            self.regs.depth(),
            base_depth,
            "statement generation must leave the allocator at its base depth"
        );
    }

    fn gen_if(&mut self, id: NodeId) {
        let node = self.node(id);
        let cond = node.opr(0).unwrap();
        let then = node.opr(1).unwrap();
        let else_ = node.opr(2);

        let reg = self.gen_expr(cond);
        let else_label = self.labels.new_label();
        self.emitter.beq(reg, Reg::Zero, &else_label);
        self.regs.release_reg();

        self.gen_instr(then);

        match else_ {
            Some(else_) => {
                let end_label = self.labels.new_label();
                self.emitter.j(&end_label);
                self.emitter.label(&else_label);
                self.gen_instr(else_);
                self.emitter.label(&end_label);
            }
            None => self.emitter.label(&else_label),
        }
    }

    fn gen_while(&mut self, id: NodeId) {
        let (cond, body) = self.operands2(id);
        let start_label = self.labels.new_label();
        let end_label = self.labels.new_label();

        self.emitter.label(&start_label);
        let reg = self.gen_expr(cond);
        self.emitter.beq(reg, Reg::Zero, &end_label);
        self.regs.release_reg();

        self.gen_instr(body);
        self.emitter.j(&start_label);
        self.emitter.label(&end_label);
    }

    fn gen_for(&mut self, id: NodeId) {
        let node = self.node(id);
        let init = node.opr(0);
        let cond = node.opr(1);
        let step = node.opr(2);
        let body = node.opr(3).expect("For missing body");

        if let Some(init) = init {
            self.gen_expr(init);
            self.regs.release_reg();
        }

        let start_label = self.labels.new_label();
        let end_label = self.labels.new_label();
        self.emitter.label(&start_label);

        if let Some(cond) = cond {
            let reg = self.gen_expr(cond);
            self.emitter.beq(reg, Reg::Zero, &end_label);
            self.regs.release_reg();
        }

        self.gen_instr(body);

        if let Some(step) = step {
            self.gen_expr(step);
            self.regs.release_reg();
        }

        self.emitter.j(&start_label);
        self.emitter.label(&end_label);
    }

    fn gen_do_while(&mut self, id: NodeId) {
        let (body, cond) = self.operands2(id);
        let start_label = self.labels.new_label();

        self.emitter.label(&start_label);
        self.gen_instr(body);
        let reg = self.gen_expr(cond);
        self.emitter.bne(reg, Reg::Zero, &start_label);
        self.regs.release_reg();
    }

    // ---- Print codegen (§4.F.3) ----

    fn gen_print(&mut self, id: NodeId) {
        let args = self
            .node(id)
            .opr(0)
            .expect("print requires at least one argument");
        self.gen_print_arg_list(args);
    }

    fn gen_print_arg_list(&mut self, id: NodeId) {
        match self.node(id).nature {
            Nature::List => {
                let (left, right) = self.operands2(id);
                self.gen_print_arg_list(left);
                self.gen_print_arg(right);
            }
            _ => self.gen_print_arg(id),
        }
    }

    fn gen_print_arg(&mut self, id: NodeId) {
        if self.node(id).nature == Nature::StringVal {
            let offset = *self
                .string_offsets
                .get(&id)
                .expect("every STRINGVAL must have been registered by collect_strings");
            self.emitter.lui(Reg::A0, self.config.data_segment_base_hi16());
            self.emitter.ori(Reg::A0, Reg::A0, offset);
            self.emitter.ori(Reg::V0, Reg::Zero, 4);
            self.emitter.syscall();
            return;
        }

        let reg = self.gen_expr(id);
        self.emitter.addu(Reg::A0, reg, Reg::Zero);
        self.emitter.ori(Reg::V0, Reg::Zero, 1);
        self.emitter.syscall();
        self.regs.release_reg();
    }

    // ---- Expression codegen (§4.F.1) ----

    /// Generates code for `id` and returns the register holding its value. Leaves the allocator
    /// exactly one register deeper than on entry: callers release it once they're done, except
    /// when they're themselves returning it up the tree (e.g. an assignment's value).
    fn gen_expr(&mut self, id: NodeId) -> Reg {
        match self.node(id).nature {
            Nature::IntVal | Nature::BoolVal => {
                let value = self.node(id).int_value();
                let reg = self.regs.allocate_reg();
                self.load_immediate(reg, value);
                reg
            }

            Nature::Ident => {
                let decl_id = self.node(id).decl_node.expect("pass 1 must resolve every IDENT use");
                let offset = self.node(decl_id).offset.unwrap();
                let global = self.node(decl_id).global_decl;
                let reg = self.regs.allocate_reg();
                if global {
                    self.emitter.lui(reg, self.config.data_segment_base_hi16());
                    self.emitter.lw(reg, offset, reg);
                } else {
                    self.emitter.lw(reg, offset, Reg::Sp);
                }
                reg
            }

            Nature::Affect => self.gen_affect(id),

            Nature::UMinus | Nature::BNot | Nature::Not => self.gen_unary(id),

            _ => self.gen_binary(id),
        }
    }

    fn load_immediate(&mut self, reg: Reg, value: i64) {
        if (0..=0xFFFF).contains(&value) {
            self.emitter.ori(reg, Reg::Zero, value as u32);
        } else {
            let bits = value as u32;
            self.emitter.lui(reg, bits >> 16);
            self.emitter.ori(reg, reg, bits & 0xFFFF);
        }
    }

    fn gen_affect(&mut self, id: NodeId) -> Reg {
        let (lhs, rhs) = self.operands2(id);
        let reg = self.gen_expr(rhs);

        let decl_id = self.node(lhs).decl_node.expect("pass 1 must resolve the assignment target");
        let offset = self.node(decl_id).offset.unwrap();
        let global = self.node(decl_id).global_decl;

        if global {
            let base = self.regs.allocate_reg();
            self.emitter.lui(base, self.config.data_segment_base_hi16());
            self.emitter.sw(reg, offset, base);
            self.regs.release_reg();
        } else {
            self.emitter.sw(reg, offset, Reg::Sp);
        }
        reg
    }

    fn gen_unary(&mut self, id: NodeId) -> Reg {
        let nature = self.node(id).nature;
        let operand = self.node(id).opr(0).unwrap();
        let reg = self.gen_expr(operand);
        match nature {
            Nature::Not => self.emitter.xori(reg, reg, 1),
            Nature::UMinus => self.emitter.subu(reg, Reg::Zero, reg),
            Nature::BNot => self.emitter.nor(reg, Reg::Zero, reg),
            other => unreachable!("{:?} is not a unary operator", other),
        }
        reg
    }

    /// Implements the allocator's spill protocol (§4.D): the left operand is evaluated first; if
    /// the register window is then exhausted, the left value is spilled to the stack before the
    /// right operand is evaluated into the register the spill just freed.
    fn gen_binary(&mut self, id: NodeId) -> Reg {
        let nature = self.node(id).nature;
        let (left, right) = self.operands2(id);

        let reg_left = self.gen_expr(left);

        if !self.regs.reg_available() {
            let slot = self.regs.push_temporary();
            self.emitter.sw(reg_left, slot, Reg::Sp);
            self.regs.release_reg();

            let reg_right = self.gen_expr(right);
            let restore = self.regs.get_restore_reg();
            self.emitter.lw(restore, slot, Reg::Sp);
            self.regs.pop_temporary();

            self.emit_binary_op(nature, reg_right, restore, reg_right);
            reg_right
        } else {
            let reg_right = self.gen_expr(right);
            self.emit_binary_op(nature, reg_left, reg_left, reg_right);
            self.regs.release_reg();
            reg_left
        }
    }

    fn emit_binary_op(&mut self, nature: Nature, dest: Reg, left: Reg, right: Reg) {
        match nature {
            Nature::Plus => self.emitter.addu(dest, left, right),
            Nature::Minus => self.emitter.subu(dest, left, right),
            Nature::Mul => {
                self.emitter.mult(left, right);
                self.emitter.mflo(dest);
            }
            Nature::Div => {
                self.emitter.div(left, right);
                self.emitter.teq(right, Reg::Zero);
                self.emitter.mflo(dest);
            }
            Nature::Mod => {
                self.emitter.div(left, right);
                self.emitter.teq(right, Reg::Zero);
                self.emitter.mfhi(dest);
            }
            Nature::Lt => self.emitter.slt(dest, left, right),
            Nature::Gt => self.emitter.slt(dest, right, left),
            Nature::Le => {
                self.emitter.slt(dest, right, left);
                self.emitter.xori(dest, dest, 1);
            }
            Nature::Ge => {
                self.emitter.slt(dest, left, right);
                self.emitter.xori(dest, dest, 1);
            }
            Nature::Eq => {
                self.emitter.xor(dest, left, right);
                self.emitter.sltiu(dest, dest, 1);
            }
            Nature::Ne => {
                self.emitter.xor(dest, left, right);
                self.emitter.sltu(dest, Reg::Zero, dest);
            }
            Nature::And | Nature::BAnd => self.emitter.and(dest, left, right),
            Nature::Or | Nature::BOr => self.emitter.or(dest, left, right),
            Nature::BXor => self.emitter.xor(dest, left, right),
            Nature::Sll => self.emitter.sllv(dest, left, right),
            Nature::Sra => self.emitter.srav(dest, left, right),
            Nature::Srl => self.emitter.srlv(dest, left, right),
            other => unreachable!("{:?} is not a binary operator", other),
        }
    }
}

