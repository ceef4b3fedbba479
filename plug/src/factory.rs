//! Construction strategies deciding how and when a registration's instance is built.

use crate::activator::Argument;
use crate::descriptor::TypeDescriptor;
use crate::error::Result;
use crate::instance::Instance;

use std::sync::Arc;

/// The view of a registration handed to a [`Factory`] during resolution.
///
/// The contract and implementation are read-only. A factory can change the
/// held instance, and declare that it built a substitute type in place of the
/// implementation.
pub struct ResolutionTarget<'a> {
  contract: &'a TypeDescriptor,
  implementation: &'a TypeDescriptor,
  instance: &'a mut Option<Instance>,
  substitute: Option<TypeDescriptor>,
}

impl<'a> ResolutionTarget<'a> {
  pub(crate) fn new(
    contract: &'a TypeDescriptor,
    implementation: &'a TypeDescriptor,
    instance: &'a mut Option<Instance>,
  ) -> Self {
    Self {
      contract,
      implementation,
      instance,
      substitute: None,
    }
  }

  pub fn contract(&self) -> &'a TypeDescriptor {
    self.contract
  }

  pub fn implementation(&self) -> &'a TypeDescriptor {
    self.implementation
  }

  pub fn instance(&self) -> Option<&Instance> {
    self.instance.as_ref()
  }

  pub fn is_empty(&self) -> bool {
    self.instance.is_none()
  }

  /// Stores `instance`, returning the one it replaced.
  pub fn set(&mut self, instance: Instance) -> Option<Instance> {
    self.instance.replace(instance)
  }

  /// Declares that the held instance is a `substitute` rather than the
  /// registered implementation. The resolved instance is validated against it.
  pub fn substitute(&mut self, substitute: TypeDescriptor) {
    self.substitute = Some(substitute);
  }

  /// The type the held instance must have once the factory returns.
  pub(crate) fn expected(&self) -> TypeDescriptor {
    self
      .substitute
      .clone()
      .unwrap_or_else(|| self.implementation.clone())
  }
}

/// A pluggable policy for populating a registration's instance.
///
/// A factory is called with the registration's lock held, so it never races
/// with another resolution of the same registration.
pub trait Factory: Send + Sync + 'static {
  /// Populates (or keeps) `target`'s instance. On error the instance must be
  /// left as it was.
  fn resolve(&self, target: &mut ResolutionTarget<'_>, args: &[Argument]) -> Result<()>;

  /// A short name used in logs.
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }
}

macro_rules! impl_factory_for_pointer {
  ($($pointer:ident),*) => {$(
    impl<F: Factory + ?Sized> Factory for $pointer<F> {
      fn resolve(&self, target: &mut ResolutionTarget<'_>, args: &[Argument]) -> Result<()> {
        (**self).resolve(target, args)
      }

      fn name(&self) -> &'static str {
        (**self).name()
      }
    }
  )*};
}

// Shared factories let a caller keep a handle to a factory after registering it.
impl_factory_for_pointer!(Arc, Box);

/// Builds a brand-new instance on every resolution.
#[derive(Debug, Default, Clone, Copy)]
pub struct Transient;

impl Factory for Transient {
  fn resolve(&self, target: &mut ResolutionTarget<'_>, args: &[Argument]) -> Result<()> {
    let instance = target.implementation().activate(args)?;
    target.set(instance);
    Ok(())
  }

  fn name(&self) -> &'static str {
    "transient"
  }
}

/// Builds the instance on first resolution and keeps it.
///
/// Arguments passed once the instance exists are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct Singleton;

impl Factory for Singleton {
  fn resolve(&self, target: &mut ResolutionTarget<'_>, args: &[Argument]) -> Result<()> {
    if target.is_empty() {
      let instance = target.implementation().activate(args)?;
      target.set(instance);
    }
    Ok(())
  }

  fn name(&self) -> &'static str {
    "singleton"
  }
}
