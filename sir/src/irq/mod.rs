//! Interrupt categories and the per-cpu counters behind them

use strum::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

pub mod caps;
pub mod stat;

pub use caps::CounterCaps;
pub use stat::{IrqStatTable, KernelStat, IRQ_STAT};

/// Arch interrupt classes with an individually exported counter, in the
/// order they appear in a detailed report.
///
/// The serialized names are the row tags of `/proc/interrupts` on x86.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, FromRepr, IntoStaticStr)]
#[repr(usize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum IrqClass {
    Nmi,
    Loc,
    Spu,
    Pmi,
    Iwi,
    Rtr,
    Plt,
    Res,
    Cal,
    Tlb,
    Trm,
    Thr,
    Dfr,
    Mce,
    Mcp,
    Hyp,
    Pin,
    Npi,
    Piw,
}

pub const NR_IRQ_CLASSES: usize = IrqClass::COUNT;

impl IrqClass {
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row tag, e.g. `NMI`.
    pub fn tag(self) -> &'static str {
        self.into()
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Nmi => "Non-maskable interrupts",
            Self::Loc => "Local timer interrupts",
            Self::Spu => "Spurious interrupts",
            Self::Pmi => "Performance monitoring interrupts",
            Self::Iwi => "IRQ work interrupts",
            Self::Rtr => "APIC ICR read retries",
            Self::Plt => "Platform interrupts",
            Self::Res => "Rescheduling interrupts",
            Self::Cal => "Function call interrupts",
            Self::Tlb => "TLB shootdowns",
            Self::Trm => "Thermal event interrupts",
            Self::Thr => "Threshold APIC interrupts",
            Self::Dfr => "Deferred Error APIC interrupts",
            Self::Mce => "Machine check exceptions",
            Self::Mcp => "Machine check polls",
            Self::Hyp => "Hypervisor callback interrupts",
            Self::Pin => "Posted-interrupt notification event",
            Self::Npi => "Nested posted-interrupt event",
            Self::Piw => "Posted-interrupt wakeup event",
        }
    }
}

/// Softirq vectors, numbered as the kernel numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, FromRepr, IntoStaticStr)]
#[repr(usize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SoftirqKind {
    Hi,
    Timer,
    NetTx,
    NetRx,
    Block,
    IrqPoll,
    Tasklet,
    Sched,
    Hrtimer,
    Rcu,
}

pub const NR_SOFTIRQS: usize = SoftirqKind::COUNT;
