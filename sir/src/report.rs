//! The detailed per-cpu interrupt report.
//!
//! Layout is part of the device ABI: every field is a native-endian `u64`,
//! in declaration order, with the named classes in [`IrqClass`] order. Do not
//! reorder.

use core::{fmt, mem::size_of};

use strum::IntoEnumIterator;

use crate::irq::{IrqClass, NR_IRQ_CLASSES};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct DetailedReport {
    /// generic interrupts, not arch specific
    pub irq_std: u64,
    /// named arch counters, indexed by [`IrqClass`]; 0 when unsupported
    pub named: [u64; NR_IRQ_CLASSES],
    /// the arch total, named counters included
    pub arch_irq_stat_sum: u64,
    /// softirqs of every vector
    pub softirq_sum: u64,
}

pub const REPORT_SIZE: usize = size_of::<DetailedReport>();

const _: () = assert!(REPORT_SIZE == (NR_IRQ_CLASSES + 3) * size_of::<u64>());

impl DetailedReport {
    pub fn class(&self, class: IrqClass) -> u64 {
        self.named[class.index()]
    }

    pub fn class_mut(&mut self, class: IrqClass) -> &mut u64 {
        &mut self.named[class.index()]
    }

    pub fn named_sum(&self) -> u64 {
        self.named.iter().sum()
    }

    /// Arch interrupts counted in the total but by no named counter.
    ///
    /// `None` means the named counters add up to more than the total, which
    /// no consistent snapshot can produce.
    pub fn unaccounted(&self) -> Option<u64> {
        self.arch_irq_stat_sum.checked_sub(self.named_sum())
    }

    /// Everything this cpu took: generic, arch and softirq.
    pub fn total(&self) -> u64 {
        self.irq_std + self.arch_irq_stat_sum + self.softirq_sum
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: repr(C), only u64 fields, so no padding and every byte
        // is initialized.
        unsafe { core::slice::from_raw_parts(self as *const Self as *const u8, REPORT_SIZE) }
    }
}

impl fmt::Display for DetailedReport {
    /// `/proc/interrupts` style rows, one per counter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>4}: {:>12}  {}", "STD", self.irq_std, "Generic interrupts")?;
        for class in IrqClass::iter() {
            writeln!(f, "{:>4}: {:>12}  {}", class.tag(), self.class(class), class.description())?;
        }
        writeln!(f, "{:>4}: {:>12}  {}", "ARCH", self.arch_irq_stat_sum, "Arch interrupts total")?;
        writeln!(f, "{:>4}: {:>12}  {}", "SOFT", self.softirq_sum, "Softirqs")?;
        match self.unaccounted() {
            Some(rest) => write!(f, "{:>4}: {:>12}  {}", "UNAC", rest, "Unaccounted interrupts"),
            None => write!(f, "{:>4}: {:>12}  {}", "UNAC", "-", "named counters exceed arch total"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn sample() -> DetailedReport {
        let mut report = DetailedReport {
            irq_std: 40,
            arch_irq_stat_sum: 30,
            softirq_sum: 7,
            ..Default::default()
        };
        *report.class_mut(IrqClass::Loc) = 20;
        *report.class_mut(IrqClass::Res) = 6;
        report
    }

    #[test]
    fn layout_is_flat_u64s() {
        assert_eq!(REPORT_SIZE, 176);
        let report = sample();
        let bytes = report.as_bytes();
        let word = |i: usize| u64::from_ne_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
        assert_eq!(word(0), 40);
        assert_eq!(word(1 + IrqClass::Loc.index()), 20);
        assert_eq!(word(1 + IrqClass::Res.index()), 6);
        assert_eq!(word(20), 30);
        assert_eq!(word(21), 7);
    }

    #[test]
    fn unaccounted_is_the_gap_to_the_total() {
        let report = sample();
        assert_eq!(report.named_sum(), 26);
        assert_eq!(report.unaccounted(), Some(4));
        assert_eq!(report.total(), 77);
    }

    #[test]
    fn negative_gap_is_not_clamped() {
        let mut report = sample();
        report.arch_irq_stat_sum = 10;
        assert_eq!(report.unaccounted(), None);
        assert!(report.to_string().contains("exceed"));
    }

    #[test]
    fn display_lists_every_class() {
        let text = sample().to_string();
        for class in IrqClass::iter() {
            assert!(text.contains(class.description()));
        }
        assert!(text.contains("Unaccounted interrupts"));
    }
}
