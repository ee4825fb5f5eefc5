//! Destinations in the caller's address space.
//!
//! Results leave the driver only through [`UserBuf::copy_out`], which may
//! fail. Callers must therefore copy first and commit their own state after.

use hal::constant::Constant;

use crate::error::SysError;

/// A caller supplied output location.
pub trait UserBuf {
    /// Bytes the caller is willing to receive.
    fn capacity(&self) -> usize;
    /// Copy `src` to the start of the buffer. Nothing is written on error.
    fn copy_out(&mut self, src: &[u8]) -> Result<(), SysError>;
    /// Whether the start of the buffer is `align` aligned.
    fn is_aligned(&self, align: usize) -> bool;
}

fn copy_to_slice(dst: &mut [u8], src: &[u8]) -> Result<(), SysError> {
    dst.get_mut(..src.len())
        .ok_or(SysError::EFAULT)?
        .copy_from_slice(src);
    Ok(())
}

/// Kernel memory standing in for a user buffer, for in-kernel readers.
pub struct KernelBuf<'a>(pub &'a mut [u8]);

impl UserBuf for KernelBuf<'_> {
    fn capacity(&self) -> usize {
        self.0.len()
    }

    fn copy_out(&mut self, src: &[u8]) -> Result<(), SysError> {
        copy_to_slice(self.0, src)
    }

    fn is_aligned(&self, align: usize) -> bool {
        (self.0.as_ptr() as usize) % align == 0
    }
}

impl<const N: usize> UserBuf for [u8; N] {
    fn capacity(&self) -> usize {
        N
    }

    fn copy_out(&mut self, src: &[u8]) -> Result<(), SysError> {
        copy_to_slice(self, src)
    }

    fn is_aligned(&self, align: usize) -> bool {
        (self.as_ptr() as usize) % align == 0
    }
}

/// Raw `(address, length)` pair received from a syscall.
#[derive(Debug, Clone, Copy)]
pub struct UserPtr {
    addr: usize,
    len: usize,
}

impl UserPtr {
    /// # Safety
    ///
    /// If the range lies inside the user address space, it must be mapped
    /// and writable for as long as the `UserPtr` is used.
    pub unsafe fn new(addr: usize, len: usize) -> Self {
        Self { addr, len }
    }

    pub fn addr(&self) -> usize {
        self.addr
    }

    fn check_range(&self, len: usize) -> Result<(), SysError> {
        let end = self.addr.checked_add(len).ok_or(SysError::EFAULT)?;
        let space = Constant::USER_ADDR_SPACE;
        if self.addr == 0 || self.addr < space.start || end > space.end {
            return Err(SysError::EFAULT);
        }
        Ok(())
    }
}

impl UserBuf for UserPtr {
    fn capacity(&self) -> usize {
        self.len
    }

    fn copy_out(&mut self, src: &[u8]) -> Result<(), SysError> {
        if src.len() > self.len {
            return Err(SysError::EFAULT);
        }
        self.check_range(src.len())?;
        // SAFETY: range checked above, mapping guaranteed by `new`'s caller
        unsafe {
            core::ptr::copy_nonoverlapping(src.as_ptr(), self.addr as *mut u8, src.len());
        }
        Ok(())
    }

    fn is_aligned(&self, align: usize) -> bool {
        self.addr % align == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_rejects_oversized_copy_without_writing() {
        let mut buf = [0xffu8; 3];
        assert_eq!(buf.copy_out(&[1, 2, 3, 4]), Err(SysError::EFAULT));
        assert_eq!(buf, [0xff; 3]);
        buf.copy_out(&[1, 2]).unwrap();
        assert_eq!(buf, [1, 2, 0xff]);

        let mut backing = [0u8; 4];
        let mut slice = KernelBuf(&mut backing[1..]);
        assert_eq!(slice.capacity(), 3);
        slice.copy_out(&[9]).unwrap();
        assert_eq!(backing, [0, 9, 0, 0]);
    }

    #[test]
    fn user_ptr_writes_and_rejects_null() {
        let mut word = 0u64;
        let mut ptr = unsafe { UserPtr::new(&mut word as *mut u64 as usize, 8) };
        assert!(ptr.is_aligned(8));
        ptr.copy_out(&7u64.to_ne_bytes()).unwrap();
        assert_eq!(word, 7);

        let mut null = unsafe { UserPtr::new(0, 8) };
        assert_eq!(null.copy_out(&[0; 8]), Err(SysError::EFAULT));
    }
}
