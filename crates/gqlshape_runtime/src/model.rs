//! Contracts implemented by generated selection models.
//!
//! A generated model is an immutable record with a static descriptor
//! table. It decodes through [`ResponseFieldMapper`], encodes through
//! [`ResponseFieldMarshaller`], and is copy-edited through its builder
//! ([`ResponseModel`] / [`ModelBuilder`]).

use crate::reader::ResponseReader;
use crate::writer::ResponseWriter;
use gqlshape_core::ResponseResult;
use once_cell::sync::OnceCell;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Wire value of the enum sentinel.
pub const UNKNOWN_ENUM_VALUE: &str = "$UNKNOWN";

/// The decode half of a model.
pub trait ResponseFieldMapper: Sized {
    fn map<R: ResponseReader>(reader: &mut R) -> ResponseResult<Self>;
}

/// The decode half of a `Fragments` record, which also needs the runtime
/// typename of the object being read.
pub trait FragmentResponseFieldMapper: Sized {
    fn map<R: ResponseReader>(reader: &mut R, conditional_type: &str) -> ResponseResult<Self>;
}

/// The encode half of a model.
pub trait ResponseFieldMarshaller {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()>;
}

/// A selection that only applies to some runtime types: a named fragment or
/// an inline fragment.
pub trait ConditionalSelection: ResponseFieldMapper + ResponseFieldMarshaller {
    /// Concrete typenames the selection applies to.
    const POSSIBLE_TYPES: &'static [&'static str];

    fn applies_to(typename: &str) -> bool {
        Self::POSSIBLE_TYPES.contains(&typename)
    }
}

/// A named fragment.
pub trait GraphQLFragment: ConditionalSelection {
    const FRAGMENT_NAME: &'static str;
    /// Source text of the definition, as it appears in query documents.
    const FRAGMENT_DEFINITION: &'static str;
}

/// A generated enum: a closed set of values plus an unknown sentinel.
pub trait GraphQLEnum: Sized {
    /// The wire value.
    fn raw_value(&self) -> &str;

    /// Looks up a wire value. Unknown values map to the sentinel.
    fn safe_value_of(raw: &str) -> Self;
}

/// A model that can be rebuilt through a builder.
pub trait ResponseModel: Sized {
    type Builder: ModelBuilder<Model = Self>;

    /// A builder with every slot unset.
    fn builder() -> Self::Builder {
        Self::Builder::default()
    }

    /// A builder initialized with this model's values.
    fn to_builder(&self) -> Self::Builder;
}

/// Scratch record used to construct or copy-edit a model.
pub trait ModelBuilder: Default {
    type Model;

    /// Validates non-null discipline and returns a fresh model.
    fn build(self) -> ResponseResult<Self::Model>;
}

/// Runs a scoped mutator against a nested model.
///
/// The nested builder starts from `current` when present, otherwise empty.
/// `mutator` runs exactly once and hands the builder back by value, so it
/// cannot outlive the call.
pub fn mutate<M, F>(current: Option<&M>, mutator: F) -> ResponseResult<M>
where
    M: ResponseModel,
    F: FnOnce(M::Builder) -> M::Builder,
{
    let builder = current.map_or_else(M::builder, M::to_builder);
    mutator(builder).build()
}

/// Lazily memoized hash and display text of an immutable model.
///
/// Racing first computations are benign: both compute the same value and
/// only one is published. Memo state never takes part in equality.
#[derive(Default)]
pub struct Memoized {
    hash: OnceCell<u64>,
    display: OnceCell<String>,
}

impl Memoized {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized hash, computing it on first use.
    pub fn hash_with(&self, compute: impl FnOnce() -> u64) -> u64 {
        *self.hash.get_or_init(compute)
    }

    /// Returns the memoized display text, computing it on first use.
    pub fn display_with(&self, compute: impl FnOnce() -> String) -> &str {
        self.display.get_or_init(compute)
    }
}

// A copy is a new instance; it memoizes on its own.
impl Clone for Memoized {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for Memoized {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Memoized {}

impl Hash for Memoized {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl fmt::Debug for Memoized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Memoized")
    }
}

/// Deterministic hash used for model memoization.
pub fn fx_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_memoized_computes_once() {
        let memo = Memoized::new();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            42
        };

        assert_eq!(memo.hash_with(compute), 42);
        assert_eq!(memo.hash_with(|| 7), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.display_with(|| "Hero".to_string()), "Hero");
        assert_eq!(memo.display_with(String::new), "Hero");
    }

    #[test]
    fn test_memoized_is_invisible_to_equality() {
        let a = Memoized::new();
        a.hash_with(|| 1);
        let b = Memoized::new();
        assert_eq!(a, b);
        assert_eq!(fx_hash(&("a", 1)), fx_hash(&("a", 1)));
    }

    #[test]
    fn test_memoized_is_shared_across_threads() {
        let memo = std::sync::Arc::new(Memoized::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let memo = std::sync::Arc::clone(&memo);
                std::thread::spawn(move || memo.hash_with(|| fx_hash("R2-D2")))
            })
            .collect();
        let hashes: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    }
}
