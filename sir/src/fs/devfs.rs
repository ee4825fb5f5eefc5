//! char device registration
//!
//! Device numbers are handed out from the top of the dynamic major range
//! down, the way `alloc_chrdev_region` does. Each registered region may get
//! one char device, which `/dev/<name><minor>` then opens.

use alloc::{collections::BTreeMap, format, string::String, sync::Arc};
use core::fmt;

use crate::{
    error::SysError,
    fs::File,
    sync::mutex::SpinNoIrqLock,
};

/// highest major handed out dynamically
const DYNAMIC_MAJOR_MAX: u32 = 254;
/// lowest major handed out dynamically
const DYNAMIC_MAJOR_MIN: u32 = 234;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DevNum {
    pub major: u32,
    pub minor: u32,
}

impl DevNum {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// A char device: makes one file object per open.
pub trait CharDev: Send + Sync {
    fn open(&self) -> Result<Arc<dyn File>, SysError>;
}

/// Where drivers get device numbers and publish their char devices.
pub trait CharDevRegistry: Send + Sync {
    /// Reserve `count` minors under a fresh major, named `name`.
    fn alloc_region(&self, name: &str, count: usize) -> Result<DevNum, SysError>;
    /// Give back a region obtained from [`Self::alloc_region`].
    fn unregister_region(&self, base: DevNum, count: usize);
    /// Make `dev` reachable at `base`.
    fn add(&self, base: DevNum, dev: Arc<dyn CharDev>) -> Result<(), SysError>;
    /// Remove the char device at `base`; open files stay valid.
    fn del(&self, base: DevNum);
}

struct Region {
    name: String,
    count: usize,
    dev: Option<Arc<dyn CharDev>>,
}

/// In-kernel [`CharDevRegistry`], keyed by major.
pub struct DevTable {
    regions: SpinNoIrqLock<BTreeMap<u32, Region>>,
}

impl DevTable {
    pub fn new() -> Self {
        Self {
            regions: SpinNoIrqLock::new(BTreeMap::new()),
        }
    }

    /// Open a device node by path, `/dev/sir0` style.
    pub fn open_path(&self, path: &str) -> Result<Arc<dyn File>, SysError> {
        let node = path.strip_prefix("/dev/").ok_or(SysError::ENODEV)?;
        let dev = {
            let regions = self.regions.lock();
            regions
                .values()
                .filter_map(|region| {
                    let minor = node.strip_prefix(region.name.as_str())?.parse::<usize>().ok()?;
                    (minor < region.count).then_some(region.dev.clone()).flatten()
                })
                .next()
                .ok_or(SysError::ENODEV)?
        };
        dev.open()
    }

    /// Node names of every published device.
    pub fn nodes(&self) -> alloc::vec::Vec<String> {
        let regions = self.regions.lock();
        regions
            .values()
            .filter(|region| region.dev.is_some())
            .flat_map(|region| (0..region.count).map(move |minor| format!("/dev/{}{}", region.name, minor)))
            .collect()
    }
}

impl Default for DevTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDevRegistry for DevTable {
    fn alloc_region(&self, name: &str, count: usize) -> Result<DevNum, SysError> {
        if count == 0 {
            return Err(SysError::EINVAL);
        }
        let mut regions = self.regions.lock();
        let major = (DYNAMIC_MAJOR_MIN..=DYNAMIC_MAJOR_MAX)
            .rev()
            .find(|major| !regions.contains_key(major))
            .ok_or(SysError::EBUSY)?;
        regions.insert(
            major,
            Region {
                name: String::from(name),
                count,
                dev: None,
            },
        );
        log::debug!("[DevTable] region {} for {} x{}", major, name, count);
        Ok(DevNum::new(major, 0))
    }

    fn unregister_region(&self, base: DevNum, count: usize) {
        let mut regions = self.regions.lock();
        match regions.get(&base.major) {
            Some(region) if region.count == count => {
                regions.remove(&base.major);
                log::debug!("[DevTable] region {} released", base.major);
            }
            _ => log::warn!("[DevTable] no region {} x{} to release", base, count),
        }
    }

    fn add(&self, base: DevNum, dev: Arc<dyn CharDev>) -> Result<(), SysError> {
        let mut regions = self.regions.lock();
        let region = regions.get_mut(&base.major).ok_or(SysError::ENODEV)?;
        if region.dev.is_some() {
            return Err(SysError::EBUSY);
        }
        region.dev = Some(dev);
        Ok(())
    }

    fn del(&self, base: DevNum) {
        if let Some(region) = self.regions.lock().get_mut(&base.major) {
            region.dev = None;
        }
    }
}
