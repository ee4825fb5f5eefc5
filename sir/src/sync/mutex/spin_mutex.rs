use core::{
    cell::UnsafeCell,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicUsize, Ordering},
};

use hal::instruction::{Instruction, InstructionHal};

use super::MutexSupport;

const UNLOCKED: usize = usize::MAX;

/// A spin-lock based mutex.
pub struct MutexGuard<'a, T: ?Sized, S: MutexSupport> {
    mutex: &'a SpinMutex<T, S>,
    support_guard: S::GuardData,
    // the guard must be released by the context that took it
    _not_send: PhantomData<*const ()>,
}

/// `SpinMutex` can include different `MutexSupport` type
pub struct SpinMutex<T: ?Sized, S: MutexSupport> {
    owner: AtomicUsize,
    _marker: PhantomData<S>,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send, S: MutexSupport> Sync for SpinMutex<T, S> {}
unsafe impl<T: ?Sized + Send, S: MutexSupport> Send for SpinMutex<T, S> {}

impl<T, S: MutexSupport> SpinMutex<T, S> {
    /// Construct a SpinMutex
    pub const fn new(user_data: T) -> Self {
        SpinMutex {
            owner: AtomicUsize::new(UNLOCKED),
            _marker: PhantomData,
            data: UnsafeCell::new(user_data),
        }
    }

    #[inline(always)]
    /// get the inner data
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized, S: MutexSupport> SpinMutex<T, S> {
    /// Wait until the lock looks unlocked before retrying
    #[inline(always)]
    fn wait_unlock(&self) {
        let mut try_count = 0usize;
        while self.owner.load(Ordering::Acquire) != UNLOCKED {
            core::hint::spin_loop();
            try_count += 1;
            if try_count == 0x1000000 {
                log::warn!(
                    "Mutex: context {:#x} still waiting after {:#x} spins, {:#x} is holding lock",
                    Instruction::get_tp(),
                    try_count,
                    self.owner.load(Ordering::Relaxed),
                );
                try_count = 0;
            }
        }
    }

    /// Acquire the lock, spinning until it is free.
    #[inline(always)]
    pub fn lock(&self) -> MutexGuard<T, S> {
        let support_guard = S::before_lock();
        let new_owner = Instruction::get_tp();
        loop {
            let old_owner = self.owner.load(Ordering::Acquire);
            if old_owner == new_owner {
                panic!("[dead lock] context {:#x} is trying to get the lock, which is already hold by itself", new_owner);
            }
            self.wait_unlock();
            if self
                .owner
                .compare_exchange(UNLOCKED, new_owner, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return MutexGuard {
                    mutex: self,
                    support_guard,
                    _not_send: PhantomData,
                };
            }
        }
    }

    /// Whether some context holds the lock right now.
    pub fn is_locked(&self) -> bool {
        self.owner.load(Ordering::Relaxed) != UNLOCKED
    }
}

impl<'a, T: ?Sized, S: MutexSupport> Deref for MutexGuard<'a, T, S> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        unsafe { &*self.mutex.data.get() }
    }
}

impl<'a, T: ?Sized, S: MutexSupport> DerefMut for MutexGuard<'a, T, S> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<'a, T: ?Sized, S: MutexSupport> Drop for MutexGuard<'a, T, S> {
    /// The dropping of the MutexGuard will release the lock it was created
    /// from.
    #[inline(always)]
    fn drop(&mut self) {
        self.mutex.owner.store(UNLOCKED, Ordering::Release);
        S::after_unlock(&mut self.support_guard);
    }
}
