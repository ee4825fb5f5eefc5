use alloc::sync::Arc;

use super::PlatformCounterProvider;
use crate::{irq::IrqStatTable, sync::CpuPin};

/// Aggregate computed from the in-crate counter table.
///
/// It counts every arch class, supported or not, plus the interrupts that
/// have no named counter, just like the kernel primitive does. Values are
/// fully determined by what was recorded in the table.
pub struct SimProvider {
    stat: Arc<IrqStatTable>,
}

impl SimProvider {
    pub fn new(stat: Arc<IrqStatTable>) -> Self {
        Self { stat }
    }
}

impl PlatformCounterProvider for SimProvider {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn aggregate(&self, pin: &CpuPin) -> u64 {
        // callers reject cpus outside the table before asking
        self.stat.arch_sum(pin.cpu()).unwrap_or_default()
    }
}
