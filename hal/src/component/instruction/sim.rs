//! Simulated cpu for host builds.
//!
//! Every host thread is one execution context sitting on a simulated cpu
//! (cpu 0 unless moved with [`set_cpu`]). Interrupt masking and preemption
//! are tracked per thread, and interrupts raised with [`raise_irq`] while
//! masked are held back until the context unmasks them, the way a real
//! local apic would keep them pending.

use std::boxed::Box;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::{Instruction, InstructionHal};
use crate::constant::Constant;

static NEXT_CONTEXT: AtomicUsize = AtomicUsize::new(1);

struct SimCpu {
    cpu: Cell<usize>,
    irq_enabled: Cell<bool>,
    preempt: Cell<usize>,
    context: usize,
    pending: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

std::thread_local! {
    static CPU: SimCpu = SimCpu {
        cpu: Cell::new(0),
        irq_enabled: Cell::new(true),
        preempt: Cell::new(0),
        context: NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed),
        pending: RefCell::new(VecDeque::new()),
    };
}

impl InstructionHal for Instruction {
    unsafe fn enable_interrupt() {
        CPU.with(|c| c.irq_enabled.set(true));
        run_pending();
    }

    unsafe fn disable_interrupt() {
        CPU.with(|c| c.irq_enabled.set(false));
    }

    unsafe fn is_interrupt_enabled() -> bool {
        CPU.with(|c| c.irq_enabled.get())
    }

    fn preempt_disable() {
        CPU.with(|c| c.preempt.set(c.preempt.get() + 1));
    }

    fn preempt_enable() {
        CPU.with(|c| {
            let count = c.preempt.get();
            assert!(count > 0, "preempt count underflow on cpu {}", c.cpu.get());
            c.preempt.set(count - 1);
        });
    }

    fn preempt_count() -> usize {
        CPU.with(|c| c.preempt.get())
    }

    fn cpu_id() -> usize {
        CPU.with(|c| c.cpu.get())
    }

    fn get_tp() -> usize {
        CPU.with(|c| c.context)
    }
}

fn run_pending() {
    loop {
        let next = CPU.with(|c| {
            if !c.irq_enabled.get() {
                return None;
            }
            c.pending.borrow_mut().pop_front()
        });
        match next {
            Some(handler) => handler(),
            None => break,
        }
    }
}

/// Migrate the calling thread to simulated `cpu`.
///
/// Panics if the thread has preemption disabled: a pinned context must
/// never change cpu.
pub fn set_cpu(cpu: usize) {
    assert!(cpu < Constant::MAX_PROCESSORS, "cpu {} out of range", cpu);
    CPU.with(|c| {
        assert_eq!(c.preempt.get(), 0, "migrating a pinned context");
        c.cpu.set(cpu);
    });
}

/// Raise an interrupt on the calling thread's cpu.
///
/// `handler` runs immediately when interrupts are enabled, otherwise it is
/// queued until they are enabled again.
pub fn raise_irq<F: FnOnce() + 'static>(handler: F) {
    if CPU.with(|c| c.irq_enabled.get()) {
        handler();
    } else {
        CPU.with(|c| c.pending.borrow_mut().push_back(Box::new(handler)));
    }
}

/// Number of interrupts held back on the calling thread.
pub fn pending_irqs() -> usize {
    CPU.with(|c| c.pending.borrow().len())
}
