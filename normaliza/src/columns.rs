//! Column-subset values, the atomic unit of determinant/dependent comparison.
use std::collections::BTreeSet;
use std::fmt::Display;

/// An unordered, deduplicated set of column names.
///
/// Two subsets are equal iff their name sets are equal. The backing store is
/// ordered so that iteration, [`Display`] and [`Ord`] are deterministic,
/// which keeps dependency enumeration and tree construction reproducible.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSet(BTreeSet<Box<str>>);

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A subset holding a single column name
    pub fn single<S: Into<Box<str>>>(name: S) -> Self {
        let mut names = BTreeSet::new();
        names.insert(name.into());
        Self(names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert<S: Into<Box<str>>>(&mut self, name: S) -> bool {
        self.0.insert(name.into())
    }

    pub fn is_subset(&self, other: &ColumnSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_superset(&self, other: &ColumnSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_ref())
    }

    /// Add every name in `other` to this subset
    pub fn merge(&mut self, other: &ColumnSet) {
        for name in other.iter() {
            self.0.insert(name.into());
        }
    }
}

impl Display for ColumnSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, name) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{name}")?;
        }
        write!(f, ")")
    }
}

impl<S: Into<Box<str>>> FromIterator<S> for ColumnSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(|s| s.into()).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_equality_ignores_order() {
        let a: ColumnSet = ["zip", "city"].into_iter().collect();
        let b: ColumnSet = ["city", "zip"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "(city,zip)");
    }

    #[test]
    fn test_subset() {
        let a: ColumnSet = ["zip"].into_iter().collect();
        let b: ColumnSet = ["city", "zip"].into_iter().collect();
        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(b.is_superset(&a));
    }
}
