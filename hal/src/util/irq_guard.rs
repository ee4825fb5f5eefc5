use core::marker::PhantomData;

use crate::instruction::{Instruction, InstructionHal};

/// Keeps interrupt delivery off on this cpu while alive.
///
/// Restores the previous state on drop, so guards nest.
pub struct IrqGuard {
    was_enabled: bool,
    _not_send: PhantomData<*const ()>,
}

impl IrqGuard {
    /// Construct an IrqGuard
    pub fn new() -> Self {
        let was_enabled = unsafe {
            let enabled = Instruction::is_interrupt_enabled();
            Instruction::disable_interrupt();
            enabled
        };
        Self {
            was_enabled,
            _not_send: PhantomData,
        }
    }
}

impl Drop for IrqGuard {
    fn drop(&mut self) {
        if self.was_enabled {
            unsafe {
                Instruction::enable_interrupt();
            }
        }
    }
}
