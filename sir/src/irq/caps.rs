//! Which named counters the running kernel can actually provide.

use super::IrqClass;

bitflags! {
    /// One bit per [`IrqClass`], at the class index.
    pub struct CounterCaps: u32 {
        const NMI = 1 << 0;
        const LOC = 1 << 1;
        const SPU = 1 << 2;
        const PMI = 1 << 3;
        const IWI = 1 << 4;
        const RTR = 1 << 5;
        const PLT = 1 << 6;
        const RES = 1 << 7;
        const CAL = 1 << 8;
        const TLB = 1 << 9;
        const TRM = 1 << 10;
        const THR = 1 << 11;
        const DFR = 1 << 12;
        const MCE = 1 << 13;
        const MCP = 1 << 14;
        const HYP = 1 << 15;
        const PIN = 1 << 16;
        const NPI = 1 << 17;
        const PIW = 1 << 18;

        /// Counters every SMP x86_64 kernel with a local apic keeps.
        const APIC_BASE = Self::NMI.bits | Self::LOC.bits | Self::SPU.bits
            | Self::PMI.bits | Self::IWI.bits | Self::RES.bits
            | Self::CAL.bits | Self::TLB.bits;
    }
}

impl CounterCaps {
    pub const fn of(class: IrqClass) -> Self {
        Self::from_bits_truncate(1 << class.index())
    }

    pub const fn supports(&self, class: IrqClass) -> bool {
        self.contains(Self::of(class))
    }
}
