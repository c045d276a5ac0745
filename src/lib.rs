//! # sfdd-rs: Set-Family Decision Diagrams in Rust
//!
//! **`sfdd-rs`** is a library for representing and manipulating **families of
//! finite sets** over an ordered key domain as shared, canonical DAGs, and for
//! transforming them with a composable **homomorphism algebra**.
//!
//! ## What is an SFDD?
//!
//! A set-family decision diagram encodes a set of sets. Each internal node
//! `⟨key, take, skip⟩` splits the family into the member sets that contain
//! `key` (the `take` branch, stored without `key`) and those that do not (the
//! `skip` branch). The terminal `⊥` denotes the empty family `{}` and `⊤`
//! denotes `{∅}`, the family containing only the empty set.
//!
//! ## Key Features
//!
//! - **Factory-Centric**: All nodes are minted by a [`SfddFactory`], which
//!   hash-conses them through a weak unique table. Structural equality *is*
//!   pointer equality.
//! - **Set-Theoretic Kernel**: `union`, `intersection`, `symmetric_difference`
//!   and `subtracting`, each memoized by operand identity.
//! - **Homomorphism Algebra**: `Insert`, `Remove`, `Filter`, `Dive` and
//!   `Inductive` transformers, composed with `Union`, `Intersection`,
//!   `Composition` and `FixedPoint`, uniqued and memoized per instance.
//! - **Optimizer**: a rewrite pass over homomorphism trees that introduces
//!   `Dive` prefixes and reorders insert/remove runs by descent depth.
//!
//! ## Quick Start
//!
//! ```rust
//! use sfdd_rs::{HomFactory, SfddFactory};
//!
//! let factory = SfddFactory::<u32>::new();
//!
//! // The family {{1,2}, {1}}.
//! let family = factory.make([vec![1, 2], vec![1]]);
//! assert_eq!(family.count(), 2);
//! assert!(family.contains(&[1, 2]));
//! assert!(!family.contains(&[2]));
//!
//! // Transform it: ensure every member set contains 4.
//! let homs = HomFactory::new(&factory);
//! let insert = homs.insert([4]);
//! let extended = insert.apply(&family);
//! assert_eq!(extended, factory.make([vec![1, 2, 4], vec![1, 4]]));
//! ```
//!
//! ## Core Components
//!
//! - **[`factory`]**: The [`SfddFactory`] and the recursive set-algebra kernel.
//! - **[`node`]**: The [`Sfdd`] handle type with identity equality.
//! - **[`hom`]**: The homomorphism algebra and its factory.
//! - **[`optimize`]**: The homomorphism rewrite pass.
//! - **[`table`]**: The weak hash-consing unique table underpinning both
//!   factories.
//! - **[`dot`]**: Graphviz visualization.
//!
//! [`SfddFactory`]: crate::factory::SfddFactory
//! [`Sfdd`]: crate::node::Sfdd

pub mod cache;
pub mod debug;
pub mod dot;
pub mod factory;
pub mod hom;
pub mod iter;
pub mod node;
pub mod optimize;
pub mod table;
pub mod utils;

pub use crate::factory::SfddFactory;
pub use crate::hom::{Hom, HomFactory};
pub use crate::node::Sfdd;
