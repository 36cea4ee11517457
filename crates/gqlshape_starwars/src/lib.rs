//! Response models for operations against the Star Wars sample schema.
//!
//! Each operation module holds what the generator emits for one
//! operation: its definition text, query document and operation id, the
//! `TestQuery` operation type and the `Data` model tree with builders.
//! Named fragments live in [`fragment`] and are shared across operations.
//!
//! # Example
//!
//! ```
//! use gqlshape_runtime::{parse_response, Operation};
//! use gqlshape_starwars::{scalar_adapters, simple_hero};
//!
//! let query = simple_hero::TestQuery::new();
//! let body = br#"{"data":{"hero":{"__typename":"Droid","name":"R2-D2"}}}"#;
//! let response = parse_response(&query, body, &scalar_adapters()).unwrap();
//! let data = response.data.unwrap();
//! assert_eq!(data.hero().map(|hero| hero.name()), Some("R2-D2"));
//! ```

pub mod fragment;
pub mod fragment_with_inline_fragment;
pub mod hero_name;
pub mod simple_hero;
pub mod types;

pub use types::{custom_type, scalar_adapters, Episode};
