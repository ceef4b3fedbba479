//! The binding record linking a contract, its implementation and a factory.

use crate::activator::Argument;
use crate::core::ResolutionGuard;
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::{Error, Result};
use crate::factory::{Factory, ResolutionTarget, Singleton};
use crate::instance::Instance;

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

#[derive(Default)]
struct State {
  instance: Option<Instance>,
  last_resolved: Option<DateTime<Utc>>,
}

/// One bound contract.
///
/// The contract, implementation and factory are fixed at creation. The held
/// instance and the last resolution time sit behind a per-registration lock,
/// so resolutions of unrelated registrations never contend with each other.
pub struct Registration {
  contract: TypeDescriptor,
  implementation: TypeDescriptor,
  factory: Box<dyn Factory>,
  state: Mutex<State>,
}

impl Registration {
  /// Creates a registration after checking that `contract` is a contract,
  /// `implementation` is concrete, and the latter satisfies the former.
  pub fn new(
    contract: TypeDescriptor,
    implementation: TypeDescriptor,
    factory: impl Factory,
  ) -> Result<Self> {
    validate(&contract, &implementation)?;
    Ok(Self {
      contract,
      implementation,
      factory: Box::new(factory),
      state: Mutex::new(State::default()),
    })
  }

  /// Creates a singleton registration that already holds `instance`.
  pub(crate) fn with_instance(contract: TypeDescriptor, instance: Instance) -> Result<Self> {
    let registration = Self::new(contract, instance.origin().clone(), Singleton)?;
    registration.state.lock().instance = Some(instance);
    Ok(registration)
  }

  pub fn contract(&self) -> &TypeDescriptor {
    &self.contract
  }

  pub fn implementation(&self) -> &TypeDescriptor {
    &self.implementation
  }

  pub fn factory_name(&self) -> &'static str {
    self.factory.name()
  }

  /// The currently held instance, without resolving.
  pub fn instance(&self) -> Option<Instance> {
    self.state.lock().instance.clone()
  }

  pub fn is_resolved(&self) -> bool {
    self.state.lock().instance.is_some()
  }

  /// UTC time of the most recent resolution.
  pub fn last_resolved(&self) -> Option<DateTime<Utc>> {
    self.state.lock().last_resolved
  }

  /// Resolves through the factory and validates the result.
  ///
  /// The resolution time is recorded whenever the factory succeeds, even if it
  /// kept an existing instance. If the factory leaves an instance of the wrong
  /// type, the instance held before the call is put back.
  pub fn resolve(&self, args: &[Argument]) -> Result<Instance> {
    let _guard = ResolutionGuard::enter(self as *const Self as usize, self.contract.name())?;
    let mut state = self.state.lock();
    let State {
      instance,
      last_resolved,
    } = &mut *state;
    let previous = instance.clone();

    let mut target = ResolutionTarget::new(&self.contract, &self.implementation, instance);
    if let Err(err) = self.factory.resolve(&mut target, args) {
      warn!(contract = self.contract.name(), factory = self.factory.name(), error = %err, "resolution failed");
      return Err(err);
    }
    let expected = target.expected();

    let now = Utc::now();
    *last_resolved = Some(last_resolved.map_or(now, |last| last.max(now)));

    if let Some(resolved) = instance.as_ref() {
      if resolved.concrete_type_id() == expected.id() {
        trace!(contract = self.contract.name(), implementation = expected.name(), "resolved");
        return Ok(resolved.clone());
      }
    }

    let err = Error::InvalidInstance {
      contract: self.contract.name(),
      expected: expected.name(),
      found: instance.as_ref().map(Instance::type_name),
    };
    warn!(contract = self.contract.name(), error = %err, "factory produced an invalid instance");

    if let Some(rejected) = std::mem::replace(instance, previous) {
      let restored = instance.as_ref().is_some_and(|held| held.ptr_eq(&rejected));
      if !restored {
        self.dispose(Some(rejected));
      }
    }
    Err(err)
  }

  /// Drops the held instance, disposing it if its type is disposable.
  ///
  /// Idempotent: the instance is taken out first, so disposal runs at most
  /// once per instance. The registration is unresolved afterwards.
  pub fn release(&self) {
    let instance = self.state.lock().instance.take();
    self.dispose(instance);
  }

  fn dispose(&self, instance: Option<Instance>) {
    if let Some(instance) = instance {
      debug!(
        contract = self.contract.name(),
        implementation = instance.type_name(),
        disposable = instance.origin().is_disposable(),
        "releasing instance"
      );
      instance.dispose();
    }
  }
}

pub(crate) fn validate(contract: &TypeDescriptor, implementation: &TypeDescriptor) -> Result<()> {
  if !contract.is_contract() {
    return Err(Error::InvalidType {
      type_name: contract.name(),
      expected: TypeKind::Contract,
    });
  }
  if !implementation.is_concrete() {
    return Err(Error::InvalidType {
      type_name: implementation.name(),
      expected: TypeKind::Concrete,
    });
  }
  if !implementation.is_assignable_to(contract) {
    return Err(Error::NotAssignableFrom {
      contract: contract.name(),
      implementation: implementation.name(),
    });
  }
  Ok(())
}

impl Drop for Registration {
  fn drop(&mut self) {
    let instance = self.state.get_mut().instance.take();
    self.dispose(instance);
  }
}

impl fmt::Debug for Registration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.lock();
    f.debug_struct("Registration")
      .field("contract", &self.contract.name())
      .field("implementation", &self.implementation.name())
      .field("factory", &self.factory.name())
      .field("instance", &state.instance)
      .field("last_resolved", &state.last_resolved)
      .finish()
  }
}
