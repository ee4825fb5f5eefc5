//! Scoped cpu-level exclusion: pinning and atomic regions.

use hal::instruction::{Instruction, InstructionHal};
use hal::util::{irq_guard::IrqGuard, preempt_guard::PreemptGuard};

/// Holds the current context on its cpu, with preemption off, while alive.
///
/// Anything that must only run "on cpu N" takes a `&CpuPin` to prove it.
pub struct CpuPin {
    cpu: usize,
    _guard: PreemptGuard,
}

impl CpuPin {
    /// Pin to whatever cpu we are running on.
    pub fn new() -> Self {
        let guard = PreemptGuard::new();
        Self {
            cpu: Instruction::cpu_id(),
            _guard: guard,
        }
    }

    pub fn cpu(&self) -> usize {
        self.cpu
    }

    /// Mask interrupt delivery on the pinned cpu until the region drops.
    pub fn atomic_region(&self) -> AtomicRegion<'_> {
        AtomicRegion {
            _pin: self,
            _guard: IrqGuard::new(),
        }
    }
}

/// Window with interrupt delivery masked on the pinned cpu.
///
/// Reads made inside it cannot be split by an interrupt handler. Keep it
/// short and never block inside it.
pub struct AtomicRegion<'a> {
    _pin: &'a CpuPin,
    _guard: IrqGuard,
}
