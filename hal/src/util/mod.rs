pub mod irq_guard;
pub mod preempt_guard;
