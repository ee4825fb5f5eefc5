//! `arch_irq_stat_cpu` bound by symbol lookup.
//!
//! The function is not exported to modules, so its address is looked up at
//! startup and called through a pointer. The prototype below is not checked
//! by any compiler: it must match the running kernel's
//! `u64 arch_irq_stat_cpu(unsigned int cpu)`.

use alloc::{collections::BTreeMap, string::String};

use super::PlatformCounterProvider;
use crate::{config::ARCH_IRQ_STAT_SYMBOL, error::InitError, sync::CpuPin};

/// Prototype of the kernel's `arch_irq_stat_cpu`.
pub type ArchIrqStatFn = unsafe extern "C" fn(cpu: u32) -> u64;

const HOST_ARCH: &str = if cfg!(target_arch = "x86_64") {
    "x86_64"
} else if cfg!(target_arch = "aarch64") {
    "aarch64"
} else if cfg!(target_arch = "riscv64") {
    "riscv64"
} else if cfg!(target_arch = "loongarch64") {
    "loongarch64"
} else {
    "unknown"
};

/// Kernel symbol lookup, `kallsyms_lookup_name` style.
pub trait SymbolResolver: Send + Sync {
    /// Address of `name`, or `None` when the kernel has no such symbol.
    fn lookup_name(&self, name: &str) -> Option<usize>;
}

/// Resolver over a fixed name to address map.
///
/// For kernels that link the counter function into the image directly.
#[derive(Default)]
pub struct StaticSymbolTable {
    symbols: BTreeMap<String, usize>,
}

impl StaticSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, addr: usize) {
        self.symbols.insert(String::from(name), addr);
    }

    /// Table holding only the arch counter function.
    pub fn with_arch_irq_stat(func: ArchIrqStatFn) -> Self {
        let mut table = Self::new();
        table.insert(ARCH_IRQ_STAT_SYMBOL, func as usize);
        table
    }
}

impl SymbolResolver for StaticSymbolTable {
    fn lookup_name(&self, name: &str) -> Option<usize> {
        self.symbols.get(name).copied()
    }
}

/// Provider calling the kernel's own aggregate counter.
pub struct SymbolProvider {
    func: ArchIrqStatFn,
}

impl SymbolProvider {
    /// Find `arch_irq_stat_cpu` through `resolver`.
    ///
    /// Only x86_64 kernels have the function; anywhere else this fails
    /// before looking anything up.
    pub fn resolve(resolver: Option<&dyn SymbolResolver>) -> Result<Self, InitError> {
        if !cfg!(target_arch = "x86_64") {
            log::warn!("[sir] no arch interrupt counter on {}", HOST_ARCH);
            return Err(InitError::UnsupportedArch(HOST_ARCH));
        }
        let resolver = resolver.ok_or(InitError::NoResolver)?;
        let addr = {
            // the lookup must not be preempted or migrate midway
            let _pin = CpuPin::new();
            resolver.lookup_name(ARCH_IRQ_STAT_SYMBOL)
        };
        match addr {
            Some(addr) if addr != 0 => {
                log::debug!("[sir] {} at {:#x}", ARCH_IRQ_STAT_SYMBOL, addr);
                // SAFETY: the address names `arch_irq_stat_cpu`, whose
                // prototype is `ArchIrqStatFn`.
                let func = unsafe { core::mem::transmute::<usize, ArchIrqStatFn>(addr) };
                Ok(Self { func })
            }
            _ => {
                log::warn!("[sir] unable to find {}", ARCH_IRQ_STAT_SYMBOL);
                Err(InitError::SymbolNotFound(ARCH_IRQ_STAT_SYMBOL))
            }
        }
    }
}

impl PlatformCounterProvider for SymbolProvider {
    fn name(&self) -> &'static str {
        ARCH_IRQ_STAT_SYMBOL
    }

    fn aggregate(&self, pin: &CpuPin) -> u64 {
        unsafe { (self.func)(pin.cpu() as u32) }
    }
}
