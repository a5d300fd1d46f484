//! Tree construction from the token stream.

/// Stack-of-open-elements tree builder.
pub mod tree_builder;

pub use tree_builder::TreeBuilder;
