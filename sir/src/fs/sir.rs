//! the interrupt reporter device, `/dev/sir0`
//!
//! Reads stream the current cpu's interrupt total eight bytes at a time (see
//! [`crate::session`]); the two control operations return a fresh total or
//! the detailed report in one go.

use alloc::sync::Arc;
use core::{
    mem::size_of,
    sync::atomic::{AtomicUsize, Ordering},
};

use strum::FromRepr;

use crate::{
    collector::SnapshotCollector,
    config::SIR_IOCTL_MAGIC,
    error::{SysError, SysResult},
    fs::{CharDev, File, FileInner, SeekFrom},
    mm::UserBuf,
    report::REPORT_SIZE,
    session::{Session, WIDTH},
    sync::mutex::SpinNoPreemptLock,
    with_methods,
};

const IOC_NRBITS: usize = 8;
const IOC_TYPEBITS: usize = 8;
const IOC_SIZEBITS: usize = 14;
const IOC_NRSHIFT: usize = 0;
const IOC_TYPESHIFT: usize = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: usize = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: usize = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_READ: usize = 2;

/// `_IOR(magic, nr, size)` from <asm-generic/ioctl.h>
pub const fn ior(magic: u8, nr: u8, size: usize) -> usize {
    (IOC_READ << IOC_DIRSHIFT)
        | (size << IOC_SIZESHIFT)
        | ((magic as usize) << IOC_TYPESHIFT)
        | ((nr as usize) << IOC_NRSHIFT)
}

/// Control operations of the device.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum SirIoctlCmd {
    /// Fresh interrupt total of the current cpu, as a `u64`.
    Get = ior(SIR_IOCTL_MAGIC, 0, size_of::<u64>()),
    /// Fresh [`crate::report::DetailedReport`] of the current cpu.
    GetDetailed = ior(SIR_IOCTL_MAGIC, 1, REPORT_SIZE),
}

/// The registered char device. Every open gets its own [`SirFile`].
pub struct SirDevice {
    collector: Arc<SnapshotCollector>,
    sessions: AtomicUsize,
    max_sessions: usize,
}

impl SirDevice {
    pub fn new(collector: Arc<SnapshotCollector>, max_sessions: usize) -> Arc<Self> {
        Arc::new(Self {
            collector,
            sessions: AtomicUsize::new(0),
            max_sessions,
        })
    }

    /// Handles currently open.
    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::Relaxed)
    }

    pub fn open_file(self: &Arc<Self>) -> Result<Arc<SirFile>, SysError> {
        let max = self.max_sessions;
        self.sessions
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |n| (n < max).then_some(n + 1))
            .map_err(|_| {
                log::warn!("[SirDevice::open] no room for another session ({} open)", max);
                SysError::ENOMEM
            })?;
        log::trace!("[SirDevice::open] session opened");
        Ok(Arc::new(SirFile {
            inner: FileInner::new(),
            session: SpinNoPreemptLock::new(Session::new()),
            device: self.clone(),
        }))
    }
}

/// [`SirDevice`] as the char device table sees it.
pub struct SirCharDev(pub Arc<SirDevice>);

impl CharDev for SirCharDev {
    fn open(&self) -> Result<Arc<dyn File>, SysError> {
        let file: Arc<dyn File> = self.0.open_file()?;
        Ok(file)
    }
}

/// One open handle of `/dev/sir0`.
pub struct SirFile {
    inner: FileInner,
    session: SpinNoPreemptLock<Session>,
    device: Arc<SirDevice>,
}

impl SirFile {
    with_methods!(session: Session);

    fn collector(&self) -> &SnapshotCollector {
        &self.device.collector
    }

    /// Control queries drop any partial read, but only once they succeed.
    /// A failed query leaves the stream as it was.
    fn get_simple(&self, arg: &mut dyn UserBuf) -> SysResult {
        if arg.capacity() < WIDTH || !arg.is_aligned(size_of::<u64>()) {
            return Err(SysError::EFAULT);
        }
        self.with_mut_session(|session| {
            let snap = self.collector().capture_simple()?;
            log::debug!("[SirFile::ioctl] cpu {} total {}", snap.cpu, snap.value);
            arg.copy_out(&snap.value.to_ne_bytes())?;
            session.reset();
            Ok(0)
        })
    }

    fn get_detailed(&self, arg: &mut dyn UserBuf) -> SysResult {
        if arg.capacity() < REPORT_SIZE || !arg.is_aligned(size_of::<u64>()) {
            return Err(SysError::EFAULT);
        }
        self.with_mut_session(|session| {
            let snap = self.collector().capture_detailed()?;
            log::debug!(
                "[SirFile::ioctl] cpu {} detailed, unaccounted {:?}",
                snap.cpu,
                snap.value.unaccounted()
            );
            arg.copy_out(snap.value.as_bytes())?;
            session.reset();
            Ok(0)
        })
    }
}

impl File for SirFile {
    fn file_inner(&self) -> &FileInner {
        &self.inner
    }

    fn readable(&self) -> bool {
        true
    }

    fn writable(&self) -> bool {
        false
    }

    fn read(&self, buf: &mut dyn UserBuf) -> Result<usize, SysError> {
        let count = self.with_mut_session(|session| session.read(self.collector(), buf))?;
        self.set_pos(self.pos() + count);
        Ok(count)
    }

    fn ioctl(&self, cmd: usize, arg: &mut dyn UserBuf) -> SysResult {
        let Some(cmd) = SirIoctlCmd::from_repr(cmd) else {
            log::debug!("[SirFile::ioctl] cmd {:#x} not supported", cmd);
            return Err(SysError::ENOTTY);
        };
        log::trace!("[SirFile::ioctl] cmd {:?}", cmd);
        match cmd {
            SirIoctlCmd::Get => self.get_simple(arg),
            SirIoctlCmd::GetDetailed => self.get_detailed(arg),
        }
    }

    /// Reads are not positional: report where we are and stay there.
    fn seek(&self, _offset: SeekFrom) -> Result<usize, SysError> {
        Ok(self.pos())
    }
}

impl Drop for SirFile {
    fn drop(&mut self) {
        self.device.sessions.fetch_sub(1, Ordering::AcqRel);
        log::trace!("[SirFile::drop] session closed");
    }
}
