use super::ScalarType;
use crate::{schema::domain::PluralNature, source::TypeSource};
use indexmap::IndexMap;

/// Per-attribute record of type information. Fields are filled
/// incrementally and only if currently `None` — first writer wins, so
/// explicit mapping information always takes precedence over inference and
/// repeated invocation is order-independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDescriptor {
    /// Explicit type name from the mapping.
    pub explicit_type_name: Option<String>,

    pub type_params: IndexMap<String, String>,

    /// Declared class of the attribute.
    pub class_name: Option<String>,

    /// The resolved runtime type, once computed.
    pub resolved: Option<ResolvedType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Scalar(ScalarType),
    Collection {
        nature: PluralNature,
        /// A custom named collection type, when one was declared.
        custom_type: Option<String>,
    },
}

/// The single merge operation behind the "first writer wins" rule:
/// `merge(existing, incoming) = existing ?? incoming`.
pub fn fill<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if slot.is_none() {
        *slot = incoming;
    }
}

impl TypeDescriptor {
    /// Copies explicit type-source hints onto this descriptor, without
    /// overwriting anything already present. Parameters merge key-wise, an
    /// existing key keeping its value.
    pub fn apply_hints(&mut self, source: &TypeSource) {
        fill(&mut self.explicit_type_name, source.name.clone());
        for (key, value) in &source.params {
            if !self.type_params.contains_key(key) {
                self.type_params.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn resolved_scalar(&self) -> Option<ScalarType> {
        match self.resolved {
            Some(ResolvedType::Scalar(scalar)) => Some(scalar),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_first_writer_wins() {
        let mut slot = None;
        fill(&mut slot, Some(1));
        fill(&mut slot, Some(2));
        assert_eq!(slot, Some(1));

        let mut slot: Option<i32> = Some(3);
        fill(&mut slot, None);
        assert_eq!(slot, Some(3));
    }

    #[test]
    fn hints_do_not_overwrite() {
        let mut descriptor = TypeDescriptor {
            explicit_type_name: Some("long".into()),
            ..TypeDescriptor::default()
        };

        let mut source = TypeSource::default();
        source.name = Some("string".into());
        descriptor.apply_hints(&source);

        assert_eq!(descriptor.explicit_type_name.as_deref(), Some("long"));
    }
}
