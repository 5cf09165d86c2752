use serde::Serialize;

/// A value read back across a selection.
///
/// `Unset` means no selected cell has a value, `Uniform` that every cell
/// agrees, `Mixed` lists the distinct values seen (with `None` standing for
/// cells that have no value) in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum Readback<T> {
    Unset,
    Uniform(T),
    Mixed(Vec<Option<T>>),
}

impl<T> Default for Readback<T> {
    fn default() -> Self {
        Readback::Unset
    }
}

impl<T: Clone + PartialEq> Readback<T> {
    /// Fold per-cell values into a readback.
    pub fn collect<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let mut distinct: Vec<Option<T>> = Vec::new();
        for value in values {
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        match distinct.len() {
            0 => Readback::Unset,
            1 => match distinct.pop().flatten() {
                Some(value) => Readback::Uniform(value),
                None => Readback::Unset,
            },
            _ => Readback::Mixed(distinct),
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Readback::Mixed(_))
    }

    pub fn uniform(&self) -> Option<&T> {
        match self {
            Readback::Uniform(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> Readback<U> {
        match self {
            Readback::Unset => Readback::Unset,
            Readback::Uniform(value) => Readback::Uniform(f(value)),
            Readback::Mixed(values) => {
                Readback::Mixed(values.iter().map(|v| v.as_ref().map(&f)).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_values_is_unset() {
        assert_eq!(Readback::<u8>::collect(Vec::new()), Readback::Unset);
        assert_eq!(Readback::<u8>::collect(vec![None, None]), Readback::Unset);
    }

    #[test]
    fn test_agreeing_values_are_uniform() {
        assert_eq!(Readback::collect(vec![Some(1), Some(1)]), Readback::Uniform(1));
    }

    #[test]
    fn test_disagreement_is_mixed_not_first_value() {
        let rb = Readback::collect(vec![Some("a"), None, Some("b"), Some("a")]);
        assert_eq!(rb, Readback::Mixed(vec![Some("a"), None, Some("b")]));
        assert!(rb.is_mixed());
        assert_eq!(rb.uniform(), None);
    }

    #[test]
    fn test_serializes_tagged() {
        let json = serde_json::to_value(Readback::Uniform("left")).unwrap();
        assert_eq!(json, serde_json::json!({"state": "uniform", "value": "left"}));
        let json = serde_json::to_value(Readback::<u8>::Unset).unwrap();
        assert_eq!(json, serde_json::json!({"state": "unset"}));
    }
}
