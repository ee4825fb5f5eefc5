//! Error codes returned to callers of the device and of module init.

use core::fmt;

use strum::{FromRepr, IntoStaticStr};

/// Linux errno values used by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, IntoStaticStr)]
#[repr(isize)]
#[allow(clippy::upper_case_acronyms)]
pub enum SysError {
    /// Cannot allocate memory
    ENOMEM = 12,
    /// Bad address
    EFAULT = 14,
    /// Device or resource busy
    EBUSY = 16,
    /// No such device
    ENODEV = 19,
    /// Invalid argument
    EINVAL = 22,
    /// Inappropriate ioctl for device
    ENOTTY = 25,
    /// Structure needs cleaning: internal state found corrupted
    EUCLEAN = 117,
}

/// Result of an operation whose success value travels in the status channel.
pub type SysResult = Result<isize, SysError>;

impl SysError {
    /// The negative value handed back through a syscall return register.
    pub const fn code(self) -> isize {
        -(self as isize)
    }

    pub fn from_code(code: isize) -> Option<Self> {
        Self::from_repr(code.checked_neg()?)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ENOMEM => "Cannot allocate memory",
            Self::EFAULT => "Bad address",
            Self::EBUSY => "Device or resource busy",
            Self::ENODEV => "No such device",
            Self::EINVAL => "Invalid argument",
            Self::ENOTTY => "Inappropriate ioctl for device",
            Self::EUCLEAN => "Structure needs cleaning",
        }
    }
}

impl fmt::Display for SysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{} ({})", name, self.as_str())
    }
}

/// Why the driver failed to come up. No device exists after any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// The aggregate counter primitive is not available on this arch.
    UnsupportedArch(&'static str),
    /// The symbol lookup ran but found nothing.
    SymbolNotFound(&'static str),
    /// The provider kind needs a symbol resolver and none was supplied.
    NoResolver,
    /// The simulated provider needs a counter table and none was supplied.
    NoCounterTable,
    /// Device number allocation or char device registration failed.
    Device(SysError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedArch(arch) => write!(f, "unsupported architecture {}", arch),
            Self::SymbolNotFound(name) => write!(f, "unable to find {}", name),
            Self::NoResolver => write!(f, "no symbol resolver supplied"),
            Self::NoCounterTable => write!(f, "no counter table supplied"),
            Self::Device(err) => write!(f, "device registration failed: {}", err),
        }
    }
}

impl From<SysError> for InitError {
    fn from(err: SysError) -> Self {
        Self::Device(err)
    }
}
