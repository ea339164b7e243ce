use crate::reg::Reg;

/// A deterministic, tree-walk register allocator with stack spill.
///
/// `allocate_reg`/`release_reg` behave as a LIFO counter over a window of `max_registers`
/// temporaries (`$t0`..`$t{max_registers - 1}`): allocation is a pure counter advance, so the
/// "current" register is always `$t{count - 1}`. When the window is exhausted, the generator
/// spills the oldest live value to a dedicated region of the stack frame via
/// [`RegisterAllocator::push_temporary`]/[`RegisterAllocator::pop_temporary`] — see the spill
/// protocol in `minicc-codegen`'s crate docs.
#[derive(Debug)]
pub struct RegisterAllocator {
    max_registers: u8,
    count: u8,
    temporary_offset: i32,
    temporary_max_offset: i32,
}

impl RegisterAllocator {
    pub fn new(max_registers: u8) -> RegisterAllocator {
        assert!(max_registers > 0, "a register window of size 0 cannot evaluate any expression");
        RegisterAllocator {
            max_registers,
            count: 0,
            temporary_offset: 0,
            temporary_max_offset: 0,
        }
    }

    /// Fixes the frame offset at which the spill region begins: the size of the local variable
    /// block, so spill slots are allocated right after it.
    pub fn set_temporary_start_offset(&mut self, offset: i32) {
        self.temporary_offset = offset;
        self.temporary_max_offset = offset;
    }

    pub fn reg_available(&self) -> bool {
        self.count < self.max_registers
    }

    /// Advances the counter and returns the newly allocated register.
    pub fn allocate_reg(&mut self) -> Reg {
        debug_assert!(self.reg_available(), "register window exhausted without a spill");
        self.count += 1;
        self.get_current_reg()
    }

    pub fn release_reg(&mut self) {
        debug_assert!(self.count > 0, "release_reg called with no register allocated");
        self.count -= 1;
    }

    /// The most recently allocated register. Panics if none is allocated.
    pub fn get_current_reg(&self) -> Reg {
        debug_assert!(self.count > 0, "get_current_reg called with no register allocated");
        Reg::T(self.count - 1)
    }

    /// The register a spilled value is restored into. Never drawn from the allocator's own
    /// window, so it never collides with a register the counter considers live.
    pub fn get_restore_reg(&self) -> Reg {
        Reg::V1
    }

    /// Reserves the next spill slot and returns its frame offset. Updates the high-water mark.
    pub fn push_temporary(&mut self) -> i32 {
        let offset = self.temporary_offset;
        self.temporary_offset += 4;
        if self.temporary_offset > self.temporary_max_offset {
            self.temporary_max_offset = self.temporary_offset;
        }
        log::trace!("spilling to temporary slot at offset {}", offset);
        offset
    }

    /// Releases the most recently reserved spill slot (LIFO, matching `push_temporary`).
    pub fn pop_temporary(&mut self) {
        self.temporary_offset -= 4;
    }

    /// The deepest spill nesting observed so far, used to size the frame's spill region.
    pub fn get_temporary_max_offset(&self) -> i32 {
        self.temporary_max_offset
    }

    /// Allocator depth, for the "register balance" invariant: callers can snapshot this before a
    /// statement and assert it matches after generating it.
    pub fn depth(&self) -> u8 {
        self.count
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn allocation_is_lifo_over_a_t_register_window() {
        let mut regs = RegisterAllocator::new(2);
        assert!(regs.reg_available());
        let a = regs.allocate_reg();
        assert_eq!(a, Reg::T(0));
        let b = regs.allocate_reg();
        assert_eq!(b, Reg::T(1));
        assert!(!regs.reg_available());

        regs.release_reg();
        assert!(regs.reg_available());
        assert_eq!(regs.get_current_reg(), Reg::T(0));
    }

    #[test]
    fn spill_slots_track_a_high_water_mark() {
        let mut regs = RegisterAllocator::new(1);
        regs.set_temporary_start_offset(8);
        assert_eq!(regs.push_temporary(), 8);
        assert_eq!(regs.push_temporary(), 12);
        assert_eq!(regs.get_temporary_max_offset(), 16);

        regs.pop_temporary();
        assert_eq!(regs.push_temporary(), 12);
        assert_eq!(regs.get_temporary_max_offset(), 16, "high-water mark never decreases");
    }

    #[test]
    fn depth_returns_to_base_after_balanced_allocate_release() {
        let mut regs = RegisterAllocator::new(4);
        let base = regs.depth();
        regs.allocate_reg();
        regs.allocate_reg();
        regs.release_reg();
        regs.release_reg();
        assert_eq!(regs.depth(), base);
    }
}
