//! Constants and startup configuration of the driver

use core::str::FromStr;

use strum::{EnumString, IntoStaticStr};

/// name the device region is registered under
pub const DEVICE_NAME: &str = "sir";
/// one minor: a single device serves every cpu
pub const DEVICE_COUNT: usize = 1;
/// magic byte of the control operation codes
pub const SIR_IOCTL_MAGIC: u8 = 0xA5;
/// open handles allowed at once before `open` reports ENOMEM
pub const MAX_SESSIONS: usize = 1024;
/// symbol of the arch aggregate counter primitive
pub const ARCH_IRQ_STAT_SYMBOL: &str = "arch_irq_stat_cpu";

/// Where the arch aggregate counter comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    /// the kernel's own `arch_irq_stat_cpu`, found by symbol lookup
    Kallsyms,
    /// synthetic values derived from the in-crate counter table
    Sim,
}

impl ProviderKind {
    /// Kind picked at build time with `SIR_PROVIDER=kallsyms|sim`.
    pub fn from_env() -> Self {
        match option_env!("SIR_PROVIDER").map(ProviderKind::from_str) {
            Some(Ok(kind)) => kind,
            Some(Err(_)) => {
                log::warn!("[sir] unknown SIR_PROVIDER, falling back to the default");
                Self::build_default()
            }
            None => Self::build_default(),
        }
    }

    #[cfg(feature = "sim")]
    const fn build_default() -> Self {
        Self::Sim
    }

    #[cfg(not(feature = "sim"))]
    const fn build_default() -> Self {
        Self::Kallsyms
    }
}

/// Startup configuration handed to [`crate::module::SirModule::init`].
#[derive(Debug, Clone)]
pub struct SirConfig {
    pub provider: ProviderKind,
    pub max_sessions: usize,
}

impl Default for SirConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::from_env(),
            max_sessions: MAX_SESSIONS,
        }
    }
}
