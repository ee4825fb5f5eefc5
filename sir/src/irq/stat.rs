//! Per-cpu interrupt statistics as the kernel keeps them.
//!
//! [`KernelStat`] is the stable, exported side of the kernel's counters:
//! the generic per-cpu irq sum, the named arch classes and the softirq
//! vectors. [`IrqStatTable`] is the in-kernel implementation the trap path
//! feeds; the global [`IRQ_STAT`] is the one a running kernel uses.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use hal::constant::Constant;
use lazy_static::lazy_static;
use strum::IntoEnumIterator;

use super::{CounterCaps, IrqClass, SoftirqKind, NR_IRQ_CLASSES, NR_SOFTIRQS};

/// Read side of the kernel's per-cpu interrupt counters.
///
/// Reads are plain loads: callers wanting several counters to agree with
/// each other must mask interrupts around the reads themselves. Every read
/// is `None` for a cpu the kernel keeps no counters for.
pub trait KernelStat: Send + Sync {
    /// Generic (not arch specific) interrupts taken by `cpu`.
    fn irqs_sum(&self, cpu: usize) -> Option<u64>;
    /// Value of one named arch counter of `cpu`.
    fn class_count(&self, cpu: usize, class: IrqClass) -> Option<u64>;
    /// Softirqs of one vector raised on `cpu`.
    fn softirq_count(&self, cpu: usize, kind: SoftirqKind) -> Option<u64>;
    /// Named counters this kernel maintains. Asked once at startup.
    fn supported(&self) -> CounterCaps;
}

struct PerCpuIrqStat {
    irqs: AtomicU64,
    classes: [AtomicU64; NR_IRQ_CLASSES],
    softirqs: [AtomicU64; NR_SOFTIRQS],
    /// arch interrupts without an exported counter of their own
    unexported: AtomicU64,
}

impl PerCpuIrqStat {
    fn new() -> Self {
        Self {
            irqs: AtomicU64::new(0),
            classes: core::array::from_fn(|_| AtomicU64::new(0)),
            softirqs: core::array::from_fn(|_| AtomicU64::new(0)),
            unexported: AtomicU64::new(0),
        }
    }
}

/// Counter table with one row per cpu.
///
/// Recording is lock free. Counters only ever grow. Events on a cpu
/// outside the table are dropped.
pub struct IrqStatTable {
    cpus: Vec<PerCpuIrqStat>,
    caps: CounterCaps,
}

lazy_static! {
    /// the kernel's counters, fed from the trap path
    pub static ref IRQ_STAT: IrqStatTable =
        IrqStatTable::new(Constant::MAX_PROCESSORS, CounterCaps::APIC_BASE);
}

impl IrqStatTable {
    pub fn new(nr_cpus: usize, caps: CounterCaps) -> Self {
        Self {
            cpus: (0..nr_cpus).map(|_| PerCpuIrqStat::new()).collect(),
            caps,
        }
    }

    pub fn nr_cpus(&self) -> usize {
        self.cpus.len()
    }

    fn cpu(&self, cpu: usize) -> Option<&PerCpuIrqStat> {
        self.cpus.get(cpu)
    }

    /// A device interrupt was handled on `cpu`.
    pub fn record_irq(&self, cpu: usize) {
        if let Some(stat) = self.cpu(cpu) {
            stat.irqs.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// An arch interrupt of `class` was handled on `cpu`.
    pub fn record_class(&self, cpu: usize, class: IrqClass) {
        if let Some(stat) = self.cpu(cpu) {
            stat.classes[class.index()].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// An arch interrupt without a named counter was handled on `cpu`.
    pub fn record_unexported(&self, cpu: usize) {
        if let Some(stat) = self.cpu(cpu) {
            stat.unexported.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_softirq(&self, cpu: usize, kind: SoftirqKind) {
        if let Some(stat) = self.cpu(cpu) {
            stat.softirqs[kind as usize].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Every arch interrupt of `cpu`, named or not.
    ///
    /// This is the sum `arch_irq_stat_cpu` computes in the kernel.
    pub fn arch_sum(&self, cpu: usize) -> Option<u64> {
        let stat = self.cpu(cpu)?;
        let named: u64 = IrqClass::iter()
            .map(|class| stat.classes[class.index()].load(Ordering::Relaxed))
            .sum();
        Some(named + stat.unexported.load(Ordering::Relaxed))
    }
}

impl KernelStat for IrqStatTable {
    fn irqs_sum(&self, cpu: usize) -> Option<u64> {
        Some(self.cpu(cpu)?.irqs.load(Ordering::Relaxed))
    }

    fn class_count(&self, cpu: usize, class: IrqClass) -> Option<u64> {
        Some(self.cpu(cpu)?.classes[class.index()].load(Ordering::Relaxed))
    }

    fn softirq_count(&self, cpu: usize, kind: SoftirqKind) -> Option<u64> {
        Some(self.cpu(cpu)?.softirqs[kind as usize].load(Ordering::Relaxed))
    }

    fn supported(&self) -> CounterCaps {
        self.caps
    }
}

/// Trap path hook: count a device interrupt on the current cpu.
pub fn record_irq() {
    use hal::instruction::{Instruction, InstructionHal};
    IRQ_STAT.record_irq(Instruction::cpu_id());
}
