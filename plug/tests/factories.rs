//! Tests for user-supplied `Factory` implementations and how a registration
//! validates what they produce.

use fibre_plug::{
  Argument, Component, Container, Contract, DescriptorBuilder, Dispose, Error, Factory,
  ResolutionTarget, Result, Singleton, Transient, TypeDescriptor,
};
use pretty_assertions::assert_eq;
use std::any::type_name;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Fixtures ---

trait Animal: Send + Sync {
  fn sound(&self) -> &'static str;
}
impl Contract for dyn Animal {}

struct Dog;
impl Animal for Dog {
  fn sound(&self) -> &'static str {
    "woof"
  }
}
impl Component for Dog {
  type Params = ();
  fn construct(_: ()) -> Self {
    Dog
  }
  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor.implements::<dyn Animal>(|dog| dog)
  }
}

struct Wolf;
impl Animal for Wolf {
  fn sound(&self) -> &'static str {
    "howl"
  }
}
impl Component for Wolf {
  type Params = ();
  fn construct(_: ()) -> Self {
    Wolf
  }
  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor.implements::<dyn Animal>(|wolf| wolf)
  }
}

// Never populates the instance.
struct Forgetful;
impl Factory for Forgetful {
  fn resolve(&self, _target: &mut ResolutionTarget<'_>, _args: &[Argument]) -> Result<()> {
    Ok(())
  }
}

// Builds a wolf no matter what was registered.
struct Impostor;
impl Factory for Impostor {
  fn resolve(&self, target: &mut ResolutionTarget<'_>, args: &[Argument]) -> Result<()> {
    let wolf = TypeDescriptor::of::<Wolf>().activate(args)?;
    target.set(wolf);
    Ok(())
  }
}

// Counts how often it is asked to resolve, then defers to `Singleton`.
#[derive(Default)]
struct Counting {
  calls: AtomicUsize,
}
impl Factory for Counting {
  fn resolve(&self, target: &mut ResolutionTarget<'_>, args: &[Argument]) -> Result<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Singleton.resolve(target, args)
  }

  fn name(&self) -> &'static str {
    "counting"
  }
}

// A disposable value that satisfies no contract.
static DECOYS_DISPOSED: AtomicUsize = AtomicUsize::new(0);

struct Decoy;
impl Dispose for Decoy {
  fn dispose(&self) {
    DECOYS_DISPOSED.fetch_add(1, Ordering::SeqCst);
  }
}
impl Component for Decoy {
  type Params = ();
  fn construct(_: ()) -> Self {
    Decoy
  }
  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor.disposable()
  }
}

// Behaves like `Singleton` until switched, then overwrites the slot with a decoy.
#[derive(Default)]
struct Turncoat {
  switched: AtomicBool,
}
impl Factory for Turncoat {
  fn resolve(&self, target: &mut ResolutionTarget<'_>, args: &[Argument]) -> Result<()> {
    if self.switched.load(Ordering::SeqCst) {
      target.set(TypeDescriptor::of::<Decoy>().activate(args)?);
      Ok(())
    } else {
      Singleton.resolve(target, args)
    }
  }
}

// --- Tests ---

#[test]
fn test_factory_leaving_the_instance_empty_is_rejected() {
  let container = Container::new();
  container.register::<dyn Animal, Dog>(Forgetful).unwrap();

  let err = container.resolve::<dyn Animal>().err().unwrap();

  assert_eq!(
    err,
    Error::InvalidInstance {
      contract: type_name::<dyn Animal>(),
      expected: type_name::<Dog>(),
      found: None,
    }
  );
}

#[test]
fn test_factory_producing_the_wrong_type_is_rejected() {
  let container = Container::new();
  container.register::<dyn Animal, Dog>(Impostor).unwrap();

  let err = container.resolve::<dyn Animal>().err().unwrap();

  assert_eq!(
    err,
    Error::InvalidInstance {
      contract: type_name::<dyn Animal>(),
      expected: type_name::<Dog>(),
      found: Some(type_name::<Wolf>()),
    }
  );
}

#[test]
fn test_shared_factory_stays_observable_after_registration() {
  let factory = Arc::new(Counting::default());
  let container = Container::new();
  container
    .register::<dyn Animal, Dog>(Arc::clone(&factory))
    .unwrap();

  let r1 = container.resolve::<dyn Animal>().unwrap();
  let r2 = container.resolve::<dyn Animal>().unwrap();

  assert!(Arc::ptr_eq(&r1, &r2));
  assert_eq!(factory.calls.load(Ordering::SeqCst), 2);
  assert_eq!(
    container.registration::<dyn Animal>().unwrap().factory_name(),
    "counting"
  );
}

#[test]
fn test_factory_can_be_chosen_at_runtime() {
  for (shared, name) in [(true, "singleton"), (false, "transient")] {
    let factory: Box<dyn Factory> = if shared {
      Box::new(Singleton)
    } else {
      Box::new(Transient)
    };

    let container = Container::new();
    container.register::<dyn Animal, Wolf>(factory).unwrap();

    let r1 = container.resolve::<dyn Animal>().unwrap();
    let r2 = container.resolve::<dyn Animal>().unwrap();

    assert_eq!(r1.sound(), "howl");
    assert_eq!(Arc::ptr_eq(&r1, &r2), shared);
    assert_eq!(
      container.registration::<dyn Animal>().unwrap().factory_name(),
      name
    );
  }
}

#[test]
fn test_failed_validation_still_leaves_the_binding_usable() {
  // The impostor's wolf is rejected every time, and never kept.
  let container = Container::new();
  container.register::<dyn Animal, Dog>(Impostor).unwrap();
  assert!(container.resolve::<dyn Animal>().is_err());

  let registration = container.registration::<dyn Animal>().unwrap();
  assert_eq!(registration.implementation().name(), type_name::<Dog>());
  assert!(registration.last_resolved().is_some());
  assert!(!registration.is_resolved());
  assert!(registration.instance().is_none());

  // Replacing the binding fixes it.
  container.remove::<dyn Animal>();
  container.register::<dyn Animal, Dog>(Singleton).unwrap();
  assert_eq!(container.resolve::<dyn Animal>().unwrap().sound(), "woof");
}

#[test]
fn test_rejected_instance_is_disposed_and_the_previous_one_restored() {
  // Arrange
  let factory = Arc::new(Turncoat::default());
  let container = Container::new();
  container
    .register::<dyn Animal, Dog>(Arc::clone(&factory))
    .unwrap();
  let dog = container.resolve::<dyn Animal>().unwrap();
  let registration = container.registration::<dyn Animal>().unwrap();
  let before = registration.instance().unwrap();

  // Act
  factory.switched.store(true, Ordering::SeqCst);
  let err = container.resolve::<dyn Animal>().err().unwrap();

  // Assert
  assert_eq!(
    err,
    Error::InvalidInstance {
      contract: type_name::<dyn Animal>(),
      expected: type_name::<Dog>(),
      found: Some(type_name::<Decoy>()),
    }
  );
  assert!(registration.instance().unwrap().ptr_eq(&before));
  assert_eq!(DECOYS_DISPOSED.load(Ordering::SeqCst), 1);

  // The restored dog is served again once the factory behaves.
  factory.switched.store(false, Ordering::SeqCst);
  let again = container.resolve::<dyn Animal>().unwrap();
  assert!(Arc::ptr_eq(&dog, &again));
}
