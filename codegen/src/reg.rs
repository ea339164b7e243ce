use std::fmt;

/// A MIPS32 register, restricted to the handful of roles this generator ever names.
///
/// `T(n)` is a member of the allocator's temporary window; the rest are fixed ABI registers
/// the emitter and the print/assignment sequences reach for directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    /// Hardwired zero, `$zero`.
    Zero,
    /// Stack/frame pointer, `$sp`.
    Sp,
    /// MARS syscall selector, `$v0`.
    V0,
    /// Dedicated restore register for the allocator's spill protocol, `$v1`. Never handed out by
    /// [`crate::regalloc::RegisterAllocator`]; it exists solely to receive a spilled value back
    /// off the stack for the duration of one operation.
    V1,
    /// MARS syscall argument, `$a0`.
    A0,
    /// A temporary register in the allocator's window, `$t{n}`.
    T(u8),
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::Zero => write!(f, "$zero"),
            Reg::Sp => write!(f, "$sp"),
            Reg::V0 => write!(f, "$v0"),
            Reg::V1 => write!(f, "$v1"),
            Reg::A0 => write!(f, "$a0"),
            Reg::T(n) => write!(f, "$t{}", n),
        }
    }
}
