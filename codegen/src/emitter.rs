//! The instruction emitter: the one concrete, textual implementation of the sink pass 2 writes
//! MIPS32 instructions and directives to.
//!
//! Mirrors the reference compiler's `create_*_inst` family — one method per instruction or
//! directive — but as a trait, so the generator in [`crate::gen`] never formats a line of
//! assembly itself; it only calls these methods in the order the component design prescribes.

use crate::reg::Reg;

/// Opaque handle to a not-yet-sized stack-allocation instruction, returned by
/// [`Emitter::stack_alloc_placeholder`] and later resolved by [`Emitter::patch_stack_alloc`] once
/// the final frame size is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackAllocHandle(usize);

/// One call per MIPS32 instruction or assembler directive used by this compiler.
pub trait Emitter {
    fn directive_data(&mut self);
    fn directive_text(&mut self);
    fn label(&mut self, name: &str);

    fn word(&mut self, name: &str, value: i64);
    fn asciiz(&mut self, name: &str, value: &str);

    // R-type
    fn addu(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn subu(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn and(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn or(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn xor(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn nor(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn slt(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn sltu(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn sllv(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn srav(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn srlv(&mut self, rd: Reg, rs: Reg, rt: Reg);
    fn mult(&mut self, rs: Reg, rt: Reg);
    fn div(&mut self, rs: Reg, rt: Reg);
    fn mflo(&mut self, rd: Reg);
    fn mfhi(&mut self, rd: Reg);
    fn teq(&mut self, rs: Reg, rt: Reg);

    // I-type
    fn ori(&mut self, rd: Reg, rs: Reg, imm: u32);
    fn xori(&mut self, rd: Reg, rs: Reg, imm: u32);
    fn sltiu(&mut self, rd: Reg, rs: Reg, imm: u32);
    fn lui(&mut self, rd: Reg, imm: u32);
    fn lw(&mut self, rd: Reg, offset: i32, base: Reg);
    fn sw(&mut self, rd: Reg, offset: i32, base: Reg);
    fn beq(&mut self, rs: Reg, rt: Reg, label: &str);
    fn bne(&mut self, rs: Reg, rt: Reg, label: &str);

    // J-type
    fn j(&mut self, label: &str);

    fn syscall(&mut self);

    /// Emits a placeholder stack-allocation instruction (`subu $sp, $sp, 0`) and returns a
    /// handle to it, to be resolved once the final frame size is known.
    fn stack_alloc_placeholder(&mut self) -> StackAllocHandle;
    /// Rewrites the placeholder at `handle` with the final frame size.
    fn patch_stack_alloc(&mut self, handle: StackAllocHandle, size: i32);
    fn stack_dealloc(&mut self, size: i32);
}

/// Renders MARS/SPIM-compatible textual MIPS32 assembly, one line per call.
#[derive(Debug, Default)]
pub struct TextEmitter {
    lines: Vec<String>,
}

impl TextEmitter {
    pub fn new() -> TextEmitter {
        TextEmitter { lines: Vec::new() }
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    fn push_r(&mut self, op: &str, rd: Reg, rs: Reg, rt: Reg) {
        self.push(format!("\t{} {}, {}, {}", op, rd, rs, rt));
    }

    fn push_ri(&mut self, op: &str, rd: Reg, rs: Reg, imm: u32) {
        self.push(format!("\t{} {}, {}, {}", op, rd, rs, imm));
    }

    /// Consumes the emitter and returns the assembled program text.
    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

impl Emitter for TextEmitter {
    fn directive_data(&mut self) {
        self.push(".data".to_owned());
    }

    fn directive_text(&mut self) {
        self.push(".text".to_owned());
    }

    fn label(&mut self, name: &str) {
        self.push(format!("{}:", name));
    }

    fn word(&mut self, name: &str, value: i64) {
        self.push(format!("{}: .word {}", name, value));
    }

    fn asciiz(&mut self, name: &str, value: &str) {
        self.push(format!("{}: .asciiz \"{}\"", name, value));
    }

    fn addu(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("addu", rd, rs, rt);
    }

    fn subu(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("subu", rd, rs, rt);
    }

    fn and(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("and", rd, rs, rt);
    }

    fn or(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("or", rd, rs, rt);
    }

    fn xor(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("xor", rd, rs, rt);
    }

    fn nor(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("nor", rd, rs, rt);
    }

    fn slt(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("slt", rd, rs, rt);
    }

    fn sltu(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("sltu", rd, rs, rt);
    }

    fn sllv(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("sllv", rd, rs, rt);
    }

    fn srav(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("srav", rd, rs, rt);
    }

    fn srlv(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.push_r("srlv", rd, rs, rt);
    }

    fn mult(&mut self, rs: Reg, rt: Reg) {
        self.push(format!("\tmult {}, {}", rs, rt));
    }

    fn div(&mut self, rs: Reg, rt: Reg) {
        self.push(format!("\tdiv {}, {}", rs, rt));
    }

    fn mflo(&mut self, rd: Reg) {
        self.push(format!("\tmflo {}", rd));
    }

    fn mfhi(&mut self, rd: Reg) {
        self.push(format!("\tmfhi {}", rd));
    }

    fn teq(&mut self, rs: Reg, rt: Reg) {
        self.push(format!("\tteq {}, {}", rs, rt));
    }

    fn ori(&mut self, rd: Reg, rs: Reg, imm: u32) {
        self.push_ri("ori", rd, rs, imm);
    }

    fn xori(&mut self, rd: Reg, rs: Reg, imm: u32) {
        self.push_ri("xori", rd, rs, imm);
    }

    fn sltiu(&mut self, rd: Reg, rs: Reg, imm: u32) {
        self.push_ri("sltiu", rd, rs, imm);
    }

    fn lui(&mut self, rd: Reg, imm: u32) {
        self.push(format!("\tlui {}, {}", rd, imm));
    }

    fn lw(&mut self, rd: Reg, offset: i32, base: Reg) {
        self.push(format!("\tlw {}, {}({})", rd, offset, base));
    }

    fn sw(&mut self, rd: Reg, offset: i32, base: Reg) {
        self.push(format!("\tsw {}, {}({})", rd, offset, base));
    }

    fn beq(&mut self, rs: Reg, rt: Reg, label: &str) {
        self.push(format!("\tbeq {}, {}, {}", rs, rt, label));
    }

    fn bne(&mut self, rs: Reg, rt: Reg, label: &str) {
        self.push(format!("\tbne {}, {}, {}", rs, rt, label));
    }

    fn j(&mut self, label: &str) {
        self.push(format!("\tj {}", label));
    }

    fn syscall(&mut self) {
        self.push("\tsyscall".to_owned());
    }

    fn stack_alloc_placeholder(&mut self) -> StackAllocHandle {
        let handle = StackAllocHandle(self.lines.len());
        self.push_r("subu", Reg::Sp, Reg::Sp, Reg::Zero);
        handle
    }

    fn patch_stack_alloc(&mut self, handle: StackAllocHandle, size: i32) {
        self.lines[handle.0] = format!("\tsubu {}, {}, {}", Reg::Sp, Reg::Sp, size);
    }

    fn stack_dealloc(&mut self, size: i32) {
        self.push(format!("\taddu {}, {}, {}", Reg::Sp, Reg::Sp, size));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stack_alloc_placeholder_is_patched_in_place() {
        let mut emitter = TextEmitter::new();
        emitter.directive_text();
        let handle = emitter.stack_alloc_placeholder();
        emitter.syscall();
        emitter.patch_stack_alloc(handle, 24);

        let text = emitter.finish();
        assert!(text.contains("subu $sp, $sp, 24"));
        assert!(!text.contains("subu $sp, $sp, 0"));
    }

    #[test]
    fn word_directive_uses_the_variable_name_as_its_label() {
        let mut emitter = TextEmitter::new();
        emitter.directive_data();
        emitter.word("g", 7);
        assert_eq!(emitter.finish(), ".data\ng: .word 7\n");
    }
}
