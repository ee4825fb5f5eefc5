use core::ops::Range;

pub struct Constant;

impl Constant {
    pub const MAX_PROCESSORS: usize = 64;
    /// cpu ids fit in 12 bits, however many cpus are online
    pub const CPU_ID_LIMIT: usize = 1 << 12;

    /// Addresses a user pointer may legally point into.
    #[cfg(not(feature = "sim"))]
    pub const USER_ADDR_SPACE: Range<usize> = 0..0x0000_8000_0000_0000;

    /// the simulated "user" is the host process itself
    #[cfg(feature = "sim")]
    pub const USER_ADDR_SPACE: Range<usize> = 0..usize::MAX;
}
