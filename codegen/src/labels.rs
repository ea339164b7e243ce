/// Hands out unique control-flow labels, `L0`, `L1`, ... in allocation order.
///
/// A plain counter rather than a process-wide singleton: each [`crate::gen::Generator`] owns
/// one, so compiling two programs in the same process never collides label numbering.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next: u32,
}

impl LabelAllocator {
    pub fn new() -> LabelAllocator {
        LabelAllocator::default()
    }

    pub fn new_label(&mut self) -> String {
        let label = format!("L{}", self.next);
        self.next += 1;
        label
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn labels_are_unique_and_in_order() {
        let mut labels = LabelAllocator::new();
        assert_eq!(labels.new_label(), "L0");
        assert_eq!(labels.new_label(), "L1");
        assert_eq!(labels.new_label(), "L2");
    }
}
