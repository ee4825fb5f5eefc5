//! The arch aggregate counter.
//!
//! The kernel's stable counter interface stops short of the arch specific
//! total (`arch_irq_stat_cpu`), yet without it the count misses the local
//! timer, IPIs and friends. A provider hands out that total for the cpu the
//! caller is pinned to. It is picked and resolved once at startup and is
//! read only afterwards.

use alloc::sync::Arc;

use crate::{config::ProviderKind, error::InitError, irq::IrqStatTable, sync::CpuPin};

pub mod sim;
pub mod symbol;

pub use sim::SimProvider;
pub use symbol::{StaticSymbolTable, SymbolProvider, SymbolResolver};

/// Source of the per-cpu arch interrupt total.
pub trait PlatformCounterProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// Arch interrupts taken so far by the cpu `pin` holds us on.
    fn aggregate(&self, pin: &CpuPin) -> u64;
}

/// What a provider is built from. Each kind only looks at its own half.
#[derive(Default, Clone)]
pub struct ProviderBacking<'a> {
    /// counter table behind [`SimProvider`]
    pub table: Option<Arc<IrqStatTable>>,
    /// symbol lookup behind [`SymbolProvider`]
    pub resolver: Option<&'a dyn SymbolResolver>,
}

impl<'a> ProviderBacking<'a> {
    pub fn table(table: Arc<IrqStatTable>) -> Self {
        Self {
            table: Some(table),
            resolver: None,
        }
    }

    pub fn symbols(resolver: &'a dyn SymbolResolver) -> Self {
        Self {
            table: None,
            resolver: Some(resolver),
        }
    }
}

/// Build the provider selected by `kind`.
pub fn resolve(
    kind: ProviderKind,
    backing: &ProviderBacking<'_>,
) -> Result<Arc<dyn PlatformCounterProvider>, InitError> {
    let provider: Arc<dyn PlatformCounterProvider> = match kind {
        ProviderKind::Kallsyms => Arc::new(SymbolProvider::resolve(backing.resolver)?),
        ProviderKind::Sim => {
            let table = backing.table.clone().ok_or(InitError::NoCounterTable)?;
            Arc::new(SimProvider::new(table))
        }
    };
    log::info!("[sir] aggregate counter provider: {}", provider.name());
    Ok(provider)
}
