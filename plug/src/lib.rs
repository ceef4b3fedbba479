//! # Fibre Plug
//!
//! A thread-safe runtime registry that binds abstract contracts (trait object
//! types) to concrete implementations, and resolves them on demand through
//! pluggable construction strategies.
//!
//! ## Core Concepts
//!
//! - **Contract**: a trait object type such as `dyn Animal`, marked with [`Contract`].
//! - **Component**: a concrete type that declares its constructor and the
//!   contracts it satisfies. Its [`TypeDescriptor`] is derived once and cached.
//! - **Factory**: decides when an instance is (re)built. [`Transient`] builds on
//!   every resolution, [`Singleton`] builds once. With the `mock` feature,
//!   `MockFactory` lets tests substitute implementations.
//! - **Container**: the concurrent registry. One binding per contract; duplicate,
//!   missing and mismatched bindings are reported as typed [`Error`]s.
//! - **Disposal**: instances whose type implements [`Dispose`] (and is described
//!   as disposable) are disposed exactly once when their binding is released.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_plug::{args, Component, Container, Contract, DescriptorBuilder, Singleton};
//! use std::sync::Arc;
//!
//! trait Animal: Send + Sync {
//!   fn speak(&self) -> String;
//! }
//! impl Contract for dyn Animal {}
//!
//! struct Dog {
//!   name: String,
//! }
//!
//! impl Animal for Dog {
//!   fn speak(&self) -> String {
//!     format!("{} says woof", self.name)
//!   }
//! }
//!
//! impl Component for Dog {
//!   type Params = (String,);
//!
//!   fn construct((name,): (String,)) -> Self {
//!     Dog { name }
//!   }
//!
//!   fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
//!     descriptor.implements::<dyn Animal>(|dog| dog)
//!   }
//! }
//!
//! let container = Container::new();
//! container.register::<dyn Animal, Dog>(Singleton).unwrap();
//!
//! let first = container.resolve_with::<dyn Animal>(&args!["Rex".to_string()]).unwrap();
//! let second = container.resolve::<dyn Animal>().unwrap();
//!
//! assert_eq!(first.speak(), "Rex says woof");
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

mod activator;
mod config;
mod container;
mod core;
mod descriptor;
mod error;
mod factory;
mod global;
mod instance;
mod macros;
#[cfg(feature = "mock")]
mod mock;
mod registration;

pub use activator::{Activator, Argument, Params};
pub use config::{ContainerBuilder, ContainerConfig};
pub use container::Container;
pub use descriptor::{Component, Contract, DescriptorBuilder, Dispose, TypeDescriptor, TypeKind};
pub use error::{ConstructionError, Error, Result};
pub use factory::{Factory, ResolutionTarget, Singleton, Transient};
pub use global::global;
pub use instance::Instance;
#[cfg(feature = "mock")]
pub use mock::MockFactory;
pub use registration::Registration;
