//! A singleton factory whose implementations can be swapped out by tests.

use crate::activator::Argument;
use crate::descriptor::{Contract, TypeDescriptor};
use crate::error::Result;
use crate::factory::{Factory, ResolutionTarget};
use crate::instance::Instance;
use crate::registration::validate;

use std::any::TypeId;

use dashmap::DashMap;
use tracing::debug;

/// Behaves like [`Singleton`](crate::Singleton), except that an override table
/// (contract -> substitute implementation) is consulted before constructing.
///
/// Share it through an `Arc` to keep adding overrides after registering:
///
/// ```
/// use fibre_plug::{Component, Container, Contract, DescriptorBuilder, MockFactory, TypeDescriptor};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync { fn now(&self) -> u64; }
/// impl Contract for dyn Clock {}
///
/// struct SystemClock;
/// impl Clock for SystemClock { fn now(&self) -> u64 { 1_700_000_000 } }
/// impl Component for SystemClock {
///   type Params = ();
///   fn construct(_: ()) -> Self { SystemClock }
///   fn describe(d: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> { d.implements::<dyn Clock>(|it| it) }
/// }
///
/// struct FrozenClock;
/// impl Clock for FrozenClock { fn now(&self) -> u64 { 0 } }
/// impl Component for FrozenClock {
///   type Params = ();
///   fn construct(_: ()) -> Self { FrozenClock }
///   fn describe(d: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> { d.implements::<dyn Clock>(|it| it) }
/// }
///
/// let mocks = Arc::new(MockFactory::new());
/// let container = Container::new();
/// container.register::<dyn Clock, SystemClock>(Arc::clone(&mocks)).unwrap();
///
/// mocks.mock::<dyn Clock>(TypeDescriptor::of::<FrozenClock>()).unwrap();
/// assert_eq!(container.resolve::<dyn Clock>().unwrap().now(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockFactory {
  overrides: DashMap<TypeId, TypeDescriptor>,
}

impl MockFactory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Substitutes `substitute` for whatever is registered against `C`.
  ///
  /// Returns the override it replaced, if any.
  pub fn mock<C: Contract + ?Sized>(&self, substitute: TypeDescriptor) -> Result<Option<TypeDescriptor>> {
    self.mock_type(&TypeDescriptor::contract::<C>(), substitute)
  }

  pub fn mock_type(
    &self,
    contract: &TypeDescriptor,
    substitute: TypeDescriptor,
  ) -> Result<Option<TypeDescriptor>> {
    validate(contract, &substitute)?;
    debug!(contract = contract.name(), substitute = substitute.name(), "mock installed");
    Ok(self.overrides.insert(contract.id(), substitute))
  }

  pub fn unmock<C: Contract + ?Sized>(&self) -> Option<TypeDescriptor> {
    self.overrides.remove(&TypeId::of::<C>()).map(|(_, substitute)| substitute)
  }

  pub fn clear(&self) {
    self.overrides.clear();
  }

  pub fn is_mocked<C: Contract + ?Sized>(&self) -> bool {
    self.overrides.contains_key(&TypeId::of::<C>())
  }
}

impl Factory for MockFactory {
  fn resolve(&self, target: &mut ResolutionTarget<'_>, args: &[Argument]) -> Result<()> {
    // The override table is read once per resolution.
    let substitute = self
      .overrides
      .get(&target.contract().id())
      .map(|substitute| substitute.value().clone());
    let effective = substitute
      .clone()
      .unwrap_or_else(|| target.implementation().clone());

    // The held instance is kept only while it still matches the active override.
    let current = target.instance().map(Instance::concrete_type_id);
    if current != Some(effective.id()) {
      let instance = effective.activate(args)?;
      if let Some(replaced) = target.set(instance) {
        replaced.dispose();
      }
    }

    if let Some(substitute) = substitute {
      target.substitute(substitute);
    }
    Ok(())
  }

  fn name(&self) -> &'static str {
    "mock"
  }
}
