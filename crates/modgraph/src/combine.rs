use indexmap::IndexMap;
use std::hash::Hash;

pub trait Combine {
    /// Combine two configuration layers, preferring the values in `self`.
    ///
    /// Scalars set in `self` replace those in `other`. Tables are merged key by key with
    /// entries from `self` winning.
    #[must_use]
    fn combine(self, other: Self) -> Self;
}

impl<T> Combine for Option<T> {
    fn combine(self, other: Self) -> Self {
        self.or(other)
    }
}

impl<K, V> Combine for IndexMap<K, V>
where
    K: Eq + Hash,
{
    fn combine(self, other: Self) -> Self {
        let mut merged = other;
        merged.extend(self);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_prefers_self() {
        assert_eq!(Some(1).combine(Some(2)), Some(1));
        assert_eq!(None.combine(Some(2)), Some(2));
        assert_eq!(None::<i32>.combine(None), None);
    }

    #[test]
    fn test_tables_merge_with_self_winning() {
        let high: IndexMap<&str, &str> = [("PIL", "pillow-simd")].into_iter().collect();
        let low: IndexMap<&str, &str> = [("PIL", "Pillow"), ("yaml", "PyYAML")].into_iter().collect();
        let merged = high.combine(low);
        assert_eq!(merged.get("PIL"), Some(&"pillow-simd"));
        assert_eq!(merged.get("yaml"), Some(&"PyYAML"));
    }
}
