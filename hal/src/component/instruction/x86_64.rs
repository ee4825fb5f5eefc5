use core::sync::atomic::{AtomicUsize, Ordering};

use ::x86_64::instructions::interrupts;
use ::x86_64::registers::model_specific::GsBase;

use super::{Instruction, InstructionHal};
use crate::constant::Constant;

const PREEMPT_ZERO: AtomicUsize = AtomicUsize::new(0);
/// indexed by every id `cpu_id` can produce
static PREEMPT_COUNT: [AtomicUsize; Constant::CPU_ID_LIMIT] =
    [PREEMPT_ZERO; Constant::CPU_ID_LIMIT];

impl InstructionHal for Instruction {
    unsafe fn enable_interrupt() {
        interrupts::enable();
    }

    unsafe fn disable_interrupt() {
        interrupts::disable();
    }

    unsafe fn is_interrupt_enabled() -> bool {
        interrupts::are_enabled()
    }

    fn preempt_disable() {
        // cpu id and increment must refer to the same cpu
        interrupts::without_interrupts(|| {
            PREEMPT_COUNT[Self::cpu_id()].fetch_add(1, Ordering::Relaxed);
        });
    }

    fn preempt_enable() {
        interrupts::without_interrupts(|| {
            let prev = PREEMPT_COUNT[Self::cpu_id()].fetch_sub(1, Ordering::Relaxed);
            assert!(prev > 0, "preempt count underflow on cpu {}", Self::cpu_id());
        });
    }

    fn preempt_count() -> usize {
        interrupts::without_interrupts(|| PREEMPT_COUNT[Self::cpu_id()].load(Ordering::Relaxed))
    }

    #[inline(always)]
    fn cpu_id() -> usize {
        // the kernel programs IA32_TSC_AUX with (node << 12) | cpu
        let mut aux = 0u32;
        unsafe {
            core::arch::x86_64::__rdtscp(&mut aux);
        }
        aux as usize & (Constant::CPU_ID_LIMIT - 1)
    }

    #[inline(always)]
    fn get_tp() -> usize {
        GsBase::read().as_u64() as usize
    }
}
