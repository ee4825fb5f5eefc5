pub trait InstructionHal {
    unsafe fn enable_interrupt();
    unsafe fn disable_interrupt();
    unsafe fn is_interrupt_enabled() -> bool;
    /// Forbid preemption and migration of the current context until the
    /// matching `preempt_enable`. Calls nest.
    fn preempt_disable();
    fn preempt_enable();
    fn preempt_count() -> usize;
    /// id of the cpu executing the caller
    fn cpu_id() -> usize;
    /// tag of the current execution context, used as lock owner
    fn get_tp() -> usize;
}

pub struct Instruction;

#[cfg(feature = "sim")]
pub mod sim;

#[cfg(all(not(feature = "sim"), target_arch = "x86_64"))]
mod x86_64;
