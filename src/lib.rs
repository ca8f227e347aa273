pub mod component;
pub mod context;
pub mod error;
pub mod geometry;
pub mod math;
pub mod part;
pub mod persistence;
pub mod property;
pub mod structure;

pub use component::{ComponentId, ComponentRegistry, ParentComponent};
pub use context::FeaContext;
pub use error::{FeaError, Result};
pub use structure::Structure;
