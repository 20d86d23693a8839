//! Code for handling IDs
use indexmap::IndexMap;

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone,
            std::hash::Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            serde::Deserialize,
            Debug,
            serde::Serialize,
        )]
        /// An ID type (e.g. `BusID`, `LineID`, etc.)
        pub struct $name(pub std::sync::Arc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::sync::Arc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::sync::Arc::from(s))
            }
        }

        impl $name {
            /// Create a new ID from a string slice
            pub fn new(id: &str) -> Self {
                $name(std::sync::Arc::from(id))
            }
        }
    };
}
pub(crate) use define_id_type;

/// Build a lookup from ID to position for a sequence of IDs.
///
/// Entities are addressed by position everywhere in the formulation; this map resolves names used
/// as cross-references in the input document.
pub fn index_by_id<'a, ID, I>(ids: I) -> IndexMap<ID, usize>
where
    ID: Clone + Eq + std::hash::Hash + 'a,
    I: IntoIterator<Item = &'a ID>,
{
    ids.into_iter()
        .enumerate()
        .map(|(idx, id)| (id.clone(), idx))
        .collect()
}
