//! Driver init and exit.

use alloc::sync::Arc;

use crate::{
    collector::SnapshotCollector,
    config::{SirConfig, DEVICE_COUNT, DEVICE_NAME},
    error::InitError,
    fs::{CharDevRegistry, DevNum, SirCharDev, SirDevice},
    irq::KernelStat,
    provider::{self, ProviderBacking},
};

/// A running driver instance. Dropping it without [`SirModule::exit`] leaves
/// the device registered.
pub struct SirModule {
    registry: Arc<dyn CharDevRegistry>,
    base: DevNum,
    device: Arc<SirDevice>,
}

impl SirModule {
    /// Bring the driver up: resolve the aggregate counter, then publish
    /// `/dev/sir0`. On error every step already taken is undone.
    ///
    /// `stat` is the kernel's counter interface; `backing` feeds whichever
    /// provider `config` selects.
    pub fn init(
        config: SirConfig,
        stat: Arc<dyn KernelStat>,
        backing: ProviderBacking<'_>,
        registry: Arc<dyn CharDevRegistry>,
    ) -> Result<Self, InitError> {
        let provider = provider::resolve(config.provider, &backing).map_err(|err| {
            log::warn!("[sir] {}", err);
            err
        })?;
        let collector = Arc::new(SnapshotCollector::new(provider, stat));

        let base = registry
            .alloc_region(DEVICE_NAME, DEVICE_COUNT)
            .map_err(|err| {
                log::warn!("[sir] unable to get major number: {}", err);
                InitError::Device(err)
            })?;
        let device = SirDevice::new(collector, config.max_sessions);
        if let Err(err) = registry.add(base, Arc::new(SirCharDev(device.clone()))) {
            log::warn!("[sir] unable to add char device: {}", err);
            registry.unregister_region(base, DEVICE_COUNT);
            return Err(err.into());
        }
        log::info!("[sir] Registered {}{} as {}", DEVICE_NAME, base.minor, base);
        log::info!("[sir] Startup Complete");
        Ok(Self {
            registry,
            base,
            device,
        })
    }

    pub fn devnum(&self) -> DevNum {
        self.base
    }

    pub fn device(&self) -> &Arc<SirDevice> {
        &self.device
    }

    /// Unpublish the device. Handles still open keep working until closed.
    pub fn exit(self) {
        self.registry.del(self.base);
        self.registry.unregister_region(self.base, DEVICE_COUNT);
        log::info!("[sir] Shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ProviderKind,
        error::SysError,
        fs::{CharDev, DevTable, File},
        irq::{CounterCaps, IrqStatTable},
    };
    use core::sync::atomic::{AtomicUsize, Ordering};

    fn sim_config() -> SirConfig {
        SirConfig {
            provider: ProviderKind::Sim,
            ..Default::default()
        }
    }

    fn stat() -> Arc<IrqStatTable> {
        Arc::new(IrqStatTable::new(1, CounterCaps::APIC_BASE))
    }

    fn sim_init(registry: Arc<dyn CharDevRegistry>) -> Result<SirModule, InitError> {
        let stat = stat();
        SirModule::init(sim_config(), stat.clone(), ProviderBacking::table(stat), registry)
    }

    /// Table whose `add` always fails, counting region traffic.
    #[derive(Default)]
    struct RefusingTable {
        allocated: AtomicUsize,
        released: AtomicUsize,
    }

    impl CharDevRegistry for RefusingTable {
        fn alloc_region(&self, _name: &str, _count: usize) -> Result<DevNum, SysError> {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            Ok(DevNum::new(240, 0))
        }

        fn unregister_region(&self, _base: DevNum, _count: usize) {
            self.released.fetch_add(1, Ordering::Relaxed);
        }

        fn add(&self, _base: DevNum, _dev: Arc<dyn CharDev>) -> Result<(), SysError> {
            Err(SysError::EBUSY)
        }

        fn del(&self, _base: DevNum) {}
    }

    #[test]
    fn init_publishes_and_exit_removes() {
        let table = Arc::new(DevTable::new());
        let module = sim_init(table.clone()).unwrap();
        assert_eq!(module.devnum(), DevNum::new(254, 0));
        let file = table.open_path("/dev/sir0").unwrap();
        assert!(file.readable());
        assert_eq!(module.device().sessions(), 1);

        module.exit();
        assert!(table.open_path("/dev/sir0").is_err());
        assert!(table.nodes().is_empty());
        // handles opened before exit still read
        hal::sim::set_cpu(0);
        assert_eq!(file.read(&mut [0u8; 8]), Ok(8));
    }

    #[test]
    fn failed_registration_gives_the_region_back() {
        let table = Arc::new(RefusingTable::default());
        let err = sim_init(table.clone()).err();
        assert_eq!(err, Some(InitError::Device(SysError::EBUSY)));
        assert_eq!(table.allocated.load(Ordering::Relaxed), 1);
        assert_eq!(table.released.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn failed_resolution_registers_nothing() {
        let table = Arc::new(RefusingTable::default());
        let config = SirConfig {
            provider: ProviderKind::Kallsyms,
            ..Default::default()
        };
        let stat = stat();
        assert!(SirModule::init(config, stat.clone(), ProviderBacking::table(stat), table.clone()).is_err());
        assert_eq!(table.allocated.load(Ordering::Relaxed), 0);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn foreign_counters_with_symbol_provider() {
        use crate::provider::StaticSymbolTable;

        /// Counters of a kernel that is not built on [`IrqStatTable`].
        struct FixedStat;

        impl KernelStat for FixedStat {
            fn irqs_sum(&self, cpu: usize) -> Option<u64> {
                (cpu == 0).then_some(5)
            }

            fn class_count(&self, cpu: usize, _class: crate::irq::IrqClass) -> Option<u64> {
                (cpu == 0).then_some(0)
            }

            fn softirq_count(&self, cpu: usize, _kind: crate::irq::SoftirqKind) -> Option<u64> {
                (cpu == 0).then_some(0)
            }

            fn supported(&self) -> CounterCaps {
                CounterCaps::empty()
            }
        }

        unsafe extern "C" fn arch_irq_stat_cpu(_cpu: u32) -> u64 {
            10
        }

        let symbols = StaticSymbolTable::with_arch_irq_stat(arch_irq_stat_cpu);
        let table = Arc::new(DevTable::new());
        let config = SirConfig {
            provider: ProviderKind::Kallsyms,
            ..Default::default()
        };
        let module = SirModule::init(
            config,
            Arc::new(FixedStat),
            ProviderBacking::symbols(&symbols),
            table.clone(),
        )
        .unwrap();
        hal::sim::set_cpu(0);
        let file = table.open_path("/dev/sir0").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf), Ok(8));
        assert_eq!(u64::from_ne_bytes(buf), 15);
        module.exit();
    }
}
