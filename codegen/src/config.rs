/// Tunable parameters for pass 2, standing in for the original's compile-time `#define`s.
///
/// Constructed once per compilation and threaded through the generator; nothing in this crate
/// reads a hardcoded register count or data-segment base directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodegenConfig {
    /// Size of the `$t`-register window the allocator draws from before it spills to the stack.
    pub max_registers: u8,
    /// Base address of the MARS/SPIM data segment (`lui`'d into a register before any global
    /// load/store). Defaults to the conventional `0x10010000`.
    pub data_segment_base: u32,
}

impl CodegenConfig {
    /// `max_registers` MIPS convention reserves eight `$t` registers (`$t0`..`$t7`) for
    /// expression evaluation; `data_segment_base` is MARS/SPIM's default `.data` origin.
    pub const DEFAULT_MAX_REGISTERS: u8 = 8;
    pub const DEFAULT_DATA_SEGMENT_BASE: u32 = 0x1001_0000;

    pub fn new(max_registers: u8, data_segment_base: u32) -> CodegenConfig {
        CodegenConfig {
            max_registers,
            data_segment_base,
        }
    }

    /// The upper 16 bits of the data-segment base, as loaded by `lui` before any global access.
    pub fn data_segment_base_hi16(&self) -> u32 {
        self.data_segment_base >> 16
    }
}

impl Default for CodegenConfig {
    fn default() -> CodegenConfig {
        CodegenConfig::new(
            CodegenConfig::DEFAULT_MAX_REGISTERS,
            CodegenConfig::DEFAULT_DATA_SEGMENT_BASE,
        )
    }
}
