//! Device files: the file object, the char device table and `/dev/sir0`.

pub mod devfs;
pub mod file;
pub mod sir;

pub use devfs::{CharDev, CharDevRegistry, DevNum, DevTable};
pub use file::{File, FileInner, SeekFrom};
pub use sir::{SirCharDev, SirDevice, SirFile, SirIoctlCmd};
