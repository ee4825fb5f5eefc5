use hal::util::{irq_guard::IrqGuard, preempt_guard::PreemptGuard};

use self::spin_mutex::SpinMutex;
/// spin_mutex
pub mod spin_mutex;

/// SpinLock
pub type SpinLock<T> = SpinMutex<T, Spin>;
/// SpinNoPreemptLock(Holder stays on its cpu until unlock)
pub type SpinNoPreemptLock<T> = SpinMutex<T, SpinNoPreempt>;
/// SpinNoIrqLock(Cannot be interrupted)
pub type SpinNoIrqLock<T> = SpinMutex<T, SpinNoIrq>;

/// Low-level support for mutex(spinlock, sleeplock, etc)
pub trait MutexSupport {
    /// Guard data
    type GuardData;
    /// Called before lock() & try_lock()
    fn before_lock() -> Self::GuardData;
    /// Called when MutexGuard dropping
    fn after_unlock(_: &mut Self::GuardData);
}

/// Spin MutexSupport
pub struct Spin;

impl MutexSupport for Spin {
    type GuardData = ();
    #[inline(always)]
    fn before_lock() -> Self::GuardData {}
    #[inline(always)]
    fn after_unlock(_: &mut Self::GuardData) {}
}

/// SpinNoIrq MutexSupport
pub struct SpinNoIrq;

impl MutexSupport for SpinNoIrq {
    type GuardData = IrqGuard;
    #[inline(always)]
    fn before_lock() -> Self::GuardData {
        IrqGuard::new()
    }
    #[inline(always)]
    fn after_unlock(_: &mut Self::GuardData) {}
}

/// SpinNoPreempt MutexSupport
///
/// The owner tag is only unique per cpu on kernel builds, so a holder must
/// not be switched out while it holds the lock.
pub struct SpinNoPreempt;

impl MutexSupport for SpinNoPreempt {
    type GuardData = PreemptGuard;
    #[inline(always)]
    fn before_lock() -> Self::GuardData {
        PreemptGuard::new()
    }
    #[inline(always)]
    fn after_unlock(_: &mut Self::GuardData) {}
}
