//! Point-in-time interrupt snapshots of the current cpu.

use alloc::sync::Arc;

use strum::IntoEnumIterator;

use crate::{
    error::SysError,
    irq::{CounterCaps, IrqClass, KernelStat, SoftirqKind},
    provider::PlatformCounterProvider,
    report::DetailedReport,
    sync::CpuPin,
};

/// A value captured on `cpu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub cpu: usize,
    pub value: T,
}

/// Reads the counters of whichever cpu the caller runs on.
///
/// Built once at startup around the resolved provider; the set of named
/// counters the kernel supports is settled at that point too.
pub struct SnapshotCollector {
    provider: Arc<dyn PlatformCounterProvider>,
    stat: Arc<dyn KernelStat>,
    caps: CounterCaps,
}

impl SnapshotCollector {
    pub fn new(provider: Arc<dyn PlatformCounterProvider>, stat: Arc<dyn KernelStat>) -> Self {
        let caps = stat.supported();
        log::info!("[sir] named counters: {:?}", caps);
        Self {
            provider,
            stat,
            caps,
        }
    }

    pub fn caps(&self) -> CounterCaps {
        self.caps
    }

    /// Total interrupts of the current cpu: generic plus arch.
    ///
    /// Fails with `ENODEV` on a cpu the kernel keeps no counters for.
    pub fn capture_simple(&self) -> Result<Snapshot<u64>, SysError> {
        let pin = CpuPin::new();
        let cpu = pin.cpu();
        let generic = self.stat.irqs_sum(cpu).ok_or_else(|| untracked(cpu))?;
        let value = generic + self.provider.aggregate(&pin);
        drop(pin);
        log::trace!("[sir] cpu {} interrupts {}", cpu, value);
        Ok(Snapshot { cpu, value })
    }

    /// Every counter of the current cpu, broken down by class.
    ///
    /// Fails with `ENODEV` on a cpu the kernel keeps no counters for, and
    /// with `EUCLEAN` if the named counters add up to more than the arch
    /// total.
    pub fn capture_detailed(&self) -> Result<Snapshot<DetailedReport>, SysError> {
        let pin = CpuPin::new();
        let cpu = pin.cpu();
        let mut report = DetailedReport::default();
        {
            let _region = pin.atomic_region();
            report.irq_std = self.stat.irqs_sum(cpu).ok_or_else(|| untracked(cpu))?;
            for class in IrqClass::iter() {
                if self.caps.supports(class) {
                    *report.class_mut(class) =
                        self.stat.class_count(cpu, class).ok_or_else(|| untracked(cpu))?;
                }
            }
        }
        // read after the named counters, so it can only have grown past them
        report.arch_irq_stat_sum = self.provider.aggregate(&pin);
        report.softirq_sum = SoftirqKind::iter()
            .map(|kind| self.stat.softirq_count(cpu, kind))
            .sum::<Option<u64>>()
            .ok_or_else(|| untracked(cpu))?;
        drop(pin);

        if report.unaccounted().is_none() {
            log::warn!(
                "[sir] cpu {}: named counters {} exceed arch total {}",
                cpu,
                report.named_sum(),
                report.arch_irq_stat_sum
            );
            return Err(SysError::EUCLEAN);
        }
        Ok(Snapshot { cpu, value: report })
    }
}

fn untracked(cpu: usize) -> SysError {
    log::warn!("[sir] no interrupt counters for cpu {}", cpu);
    SysError::ENODEV
}
