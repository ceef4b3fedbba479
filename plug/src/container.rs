//! The main `Container` struct and its associated methods.

use crate::activator::Argument;
use crate::config::{ContainerBuilder, ContainerConfig};
use crate::descriptor::{Component, Contract, TypeDescriptor};
use crate::error::{Error, Result};
use crate::factory::Factory;
use crate::instance::Instance;
use crate::registration::Registration;

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

/// The registry of contract bindings.
///
/// This struct holds at most one [`Registration`] per contract type. It is
/// thread-safe: registering, removing and resolving can happen concurrently
/// from any number of threads without outside locking.
pub struct Container {
  registrations: DashMap<TypeId, Arc<Registration>>,
}

impl Container {
  /// Creates a new, empty `Container` with the default configuration.
  pub fn new() -> Self {
    Self::with_config(&ContainerConfig::default())
  }

  pub fn with_config(config: &ContainerConfig) -> Self {
    Self {
      registrations: DashMap::with_capacity_and_shard_amount(
        config.initial_capacity,
        config.effective_shard_amount(),
      ),
    }
  }

  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::default()
  }

  // --- PRIVATE HELPERS ---

  fn insert(&self, registration: Registration) -> Result<()> {
    let contract = registration.contract().name();
    let implementation = registration.implementation().name();
    let factory = registration.factory_name();

    // A rejected registration is dropped only after the shard lock is released.
    let rejected = match self.registrations.entry(registration.contract().id()) {
      Entry::Occupied(_) => Some(registration),
      Entry::Vacant(vacant) => {
        vacant.insert(Arc::new(registration));
        None
      }
    };

    if let Some(rejected) = rejected {
      drop(rejected);
      warn!(contract, implementation, "duplicate registration rejected");
      return Err(Error::DuplicateRegistration { contract });
    }

    debug!(contract, implementation, factory, "registered");
    Ok(())
  }

  fn lookup(&self, contract: TypeId, name: &'static str) -> Result<Arc<Registration>> {
    // The shard guard is released before resolving so constructors may use the container.
    self
      .registrations
      .get(&contract)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or(Error::NotRegistered { contract: name })
  }

  fn detach(&self, contract: TypeId) -> Option<Arc<Registration>> {
    let (_, registration) = self.registrations.remove(&contract)?;
    registration.release();
    debug!(contract = registration.contract().name(), "removed");
    Some(registration)
  }

  // --- PUBLIC API ---

  // --- Registration ---

  /// Binds `implementation` to `contract`, resolved through `factory`.
  ///
  /// Fails with [`Error::InvalidType`] or [`Error::NotAssignableFrom`] if the
  /// descriptors do not fit together, and with [`Error::DuplicateRegistration`]
  /// if `contract` is already bound. Nothing is changed on failure.
  pub fn register_type(
    &self,
    contract: TypeDescriptor,
    implementation: TypeDescriptor,
    factory: impl Factory,
  ) -> Result<()> {
    let registration = Registration::new(contract, implementation, factory).map_err(|err| {
      warn!(error = %err, "registration rejected");
      err
    })?;
    self.insert(registration)
  }

  pub fn register<C, I>(&self, factory: impl Factory) -> Result<()>
  where
    C: Contract + ?Sized,
    I: Component,
  {
    self.register_type(TypeDescriptor::contract::<C>(), TypeDescriptor::of::<I>(), factory)
  }

  /// Binds an already built value to `contract`. It behaves like a resolved singleton.
  ///
  /// The container takes ownership of `value`: if the binding is rejected the
  /// value is released like any other held instance.
  pub fn register_instance_type<T: Any + Send + Sync>(
    &self,
    contract: TypeDescriptor,
    implementation: TypeDescriptor,
    value: T,
  ) -> Result<()> {
    let instance = implementation
      .wrap(Arc::new(value))
      .ok_or(Error::InvalidInstance {
        contract: contract.name(),
        expected: implementation.name(),
        found: Some(type_name::<T>()),
      })?;
    self.insert(Registration::with_instance(contract, instance)?)
  }

  pub fn register_instance<C, I>(&self, value: I) -> Result<()>
  where
    C: Contract + ?Sized,
    I: Component,
  {
    self.register_instance_type(TypeDescriptor::contract::<C>(), TypeDescriptor::of::<I>(), value)
  }

  // --- Removal ---

  /// Detaches the binding for `contract`, releasing its instance.
  ///
  /// Returns `None` if nothing was bound.
  pub fn remove_type(&self, contract: &TypeDescriptor) -> Option<Arc<Registration>> {
    self.detach(contract.id())
  }

  pub fn remove<C: Contract + ?Sized>(&self) -> Option<Arc<Registration>> {
    self.detach(TypeId::of::<C>())
  }

  /// Detaches and releases every binding. Returns how many were removed.
  ///
  /// All registrations are detached before any is released; if a disposal
  /// panics, the rest are still released as they are dropped.
  pub fn teardown(&self) -> usize {
    let contracts: Vec<TypeId> = self.registrations.iter().map(|entry| *entry.key()).collect();
    let detached: Vec<Arc<Registration>> = contracts
      .into_iter()
      .filter_map(|contract| self.registrations.remove(&contract))
      .map(|(_, registration)| registration)
      .collect();

    for registration in &detached {
      registration.release();
    }
    debug!(count = detached.len(), "container torn down");
    detached.len()
  }

  // --- Resolution ---

  /// Resolves the instance bound to `contract`.
  pub fn resolve_type(&self, contract: &TypeDescriptor) -> Result<Instance> {
    self.resolve_type_with(contract, &[])
  }

  /// Resolves the instance bound to `contract`, passing `args` to the factory.
  pub fn resolve_type_with(&self, contract: &TypeDescriptor, args: &[Argument]) -> Result<Instance> {
    self.lookup(contract.id(), contract.name())?.resolve(args)
  }

  /// Resolves contract `C` as a shared trait object.
  pub fn resolve<C: Contract + ?Sized>(&self) -> Result<Arc<C>> {
    self.resolve_with::<C>(&[])
  }

  pub fn resolve_with<C: Contract + ?Sized>(&self, args: &[Argument]) -> Result<Arc<C>> {
    let instance = self.lookup(TypeId::of::<C>(), type_name::<C>())?.resolve(args)?;
    instance.cast::<C>().ok_or(Error::ContractCast {
      contract: type_name::<C>(),
      implementation: instance.type_name(),
    })
  }

  // --- Inspection ---

  pub fn registration<C: Contract + ?Sized>(&self) -> Option<Arc<Registration>> {
    self.lookup(TypeId::of::<C>(), type_name::<C>()).ok()
  }

  pub fn contains<C: Contract + ?Sized>(&self) -> bool {
    self.registrations.contains_key(&TypeId::of::<C>())
  }

  pub fn contains_type(&self, contract: &TypeDescriptor) -> bool {
    self.registrations.contains_key(&contract.id())
  }

  pub fn len(&self) -> usize {
    self.registrations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.registrations.is_empty()
  }
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for Container {
  fn drop(&mut self) {
    self.teardown();
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let contracts: Vec<&'static str> = self
      .registrations
      .iter()
      .map(|entry| entry.value().contract().name())
      .collect();
    f.debug_struct("Container")
      .field("contracts", &contracts)
      .finish()
  }
}
