use core::marker::PhantomData;

use crate::instruction::{Instruction, InstructionHal};

/// Keeps the current context on its cpu: no preemption, no migration.
pub struct PreemptGuard {
    _not_send: PhantomData<*const ()>,
}

impl PreemptGuard {
    pub fn new() -> Self {
        Instruction::preempt_disable();
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for PreemptGuard {
    fn drop(&mut self) {
        Instruction::preempt_enable();
    }
}
