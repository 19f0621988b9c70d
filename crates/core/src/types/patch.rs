//! Tri-state field updates.

/// How a single field should change in a partial update.
///
/// GraphQL distinguishes a key that was omitted from a key explicitly set to
/// `null`; this type keeps that distinction all the way down to the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldPatch<T> {
    /// Key not present in the payload: leave the field untouched.
    #[default]
    Absent,
    /// Key explicitly set to `null`: unset the field.
    Null,
    /// Key set to a value: overwrite the field.
    Value(T),
}

impl<T> FieldPatch<T> {
    /// Returns `true` if the key was omitted.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Apply the patch to an optional field.
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Null => *field = None,
            Self::Value(value) => *field = Some(value),
        }
    }

    /// Map the contained value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldPatch<U> {
        match self {
            Self::Absent => FieldPatch::Absent,
            Self::Null => FieldPatch::Null,
            Self::Value(value) => FieldPatch::Value(f(value)),
        }
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    /// `None` means "not provided", matching how optional arguments that
    /// cannot be nulled are modelled.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_leaves_field() {
        let mut field = Some("keep");
        FieldPatch::Absent.apply_to(&mut field);
        assert_eq!(field, Some("keep"));
    }

    #[test]
    fn test_null_unsets_field() {
        let mut field = Some("gone");
        FieldPatch::Null.apply_to(&mut field);
        assert_eq!(field, None);
    }

    #[test]
    fn test_value_overwrites_field() {
        let mut field = None;
        FieldPatch::Value("new").apply_to(&mut field);
        assert_eq!(field, Some("new"));
    }

    #[test]
    fn test_empty_string_is_a_value() {
        let mut field = Some(String::from("Jhon"));
        FieldPatch::Value(String::new()).apply_to(&mut field);
        assert_eq!(field.as_deref(), Some(""));
    }

    #[test]
    fn test_from_option() {
        assert!(FieldPatch::<i32>::from(None).is_absent());
        assert_eq!(FieldPatch::from(Some(3)), FieldPatch::Value(3));
    }
}
