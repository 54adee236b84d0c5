/// Draining single-pass reader over the values remaining for one key in one
/// shard. Each value is delivered at most once.
///
/// Values come out newest-first (LIFO): a mapper that emits `v1, v2, v3`
/// sequentially is read back as `v3, v2, v1`. Exhaustion is durable — once
/// `next` returns `None` it returns `None` forever.
pub struct ValueIter {
    values: Vec<String>,
}

impl ValueIter {
    pub(crate) fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Removes and returns the most recently emitted remaining value.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.values.pop()
    }

    pub fn is_exhausted(&self) -> bool {
        self.values.is_empty()
    }
}

impl Iterator for ValueIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.values.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_newest_first() {
        let mut iter = ValueIter::new(vec!["v1".into(), "v2".into(), "v3".into()]);
        assert_eq!(iter.next().as_deref(), Some("v3"));
        assert_eq!(iter.next().as_deref(), Some("v2"));
        assert_eq!(iter.next().as_deref(), Some("v1"));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn exhaustion_is_durable() {
        let mut iter = ValueIter::new(vec!["only".into()]);
        assert!(iter.next().is_some());
        for _ in 0..5 {
            assert_eq!(iter.next(), None);
        }
        assert!(iter.is_exhausted());
    }

    #[test]
    fn works_as_a_plain_iterator() {
        let iter = ValueIter::new(vec!["a".into(), "b".into()]);
        let collected: Vec<String> = iter.collect();
        assert_eq!(collected, vec!["b", "a"]);
    }
}
