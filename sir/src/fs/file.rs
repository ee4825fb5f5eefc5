//! open file object

use core::sync::atomic::{AtomicUsize, Ordering};

use downcast_rs::{impl_downcast, DowncastSync};

use crate::{
    error::{SysError, SysResult},
    mm::UserBuf,
};

/// basic File object
pub struct FileInner {
    /// the current pos
    pub offset: AtomicUsize,
}

impl FileInner {
    pub const fn new() -> Self {
        Self {
            offset: AtomicUsize::new(0),
        }
    }
}

impl Default for FileInner {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SeekFrom {
    /// set the offset to given index
    Start(u64),
    /// set the offset using current file size
    End(i64),
    /// set the offset using current pos
    Current(i64),
}

/// File trait
pub trait File: Send + Sync + DowncastSync {
    /// get basic File object
    fn file_inner(&self) -> &FileInner;
    /// If readable
    fn readable(&self) -> bool;
    /// If writable
    fn writable(&self) -> bool;
    /// Read file, will adjust file offset
    fn read(&self, buf: &mut dyn UserBuf) -> Result<usize, SysError>;
    /// Write file, will adjust file offset
    fn write(&self, _buf: &[u8]) -> Result<usize, SysError> {
        Err(SysError::EINVAL)
    }
    /// call by ioctl syscall
    fn ioctl(&self, _cmd: usize, _arg: &mut dyn UserBuf) -> SysResult {
        Err(SysError::ENOTTY)
    }
    /// get file current offset
    fn pos(&self) -> usize {
        self.file_inner().offset.load(Ordering::Relaxed)
    }
    /// set file current offset
    fn set_pos(&self, pos: usize) {
        self.file_inner().offset.store(pos, Ordering::Relaxed);
    }
    /// move the file position index (see lseek)
    fn seek(&self, offset: SeekFrom) -> Result<usize, SysError> {
        let pos = self.pos();
        let pos = match offset {
            SeekFrom::Start(off) => off as usize,
            SeekFrom::Current(off) if off < 0 => pos
                .checked_sub(off.unsigned_abs() as usize)
                .ok_or(SysError::EINVAL)?,
            SeekFrom::Current(off) => pos + off as usize,
            // no size to seek from
            SeekFrom::End(_) => return Err(SysError::EINVAL),
        };
        self.set_pos(pos);
        Ok(pos)
    }
}

impl_downcast!(sync File);
