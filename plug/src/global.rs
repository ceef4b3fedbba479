//! The global container instance and access functions.

use crate::container::Container;
use once_cell::sync::Lazy;

// Created on first access in a thread-safe manner.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::default);

/// Provides a reference to the process-wide container.
///
/// # Examples
///
/// ```
/// use fibre_plug::{global, Component, Contract, DescriptorBuilder, Singleton};
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// impl Contract for dyn Greeter {}
///
/// struct English;
/// impl Greeter for English { fn greet(&self) -> String { "Hello!".into() } }
/// impl Component for English {
///   type Params = ();
///   fn construct(_: ()) -> Self { English }
///   fn describe(d: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> { d.implements::<dyn Greeter>(|it| it) }
/// }
///
/// global().register::<dyn Greeter, English>(Singleton).unwrap();
/// assert_eq!(global().resolve::<dyn Greeter>().unwrap().greet(), "Hello!");
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
