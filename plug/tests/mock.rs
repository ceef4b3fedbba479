use fibre_plug::{
  Component, Container, Contract, DescriptorBuilder, Dispose, Error, MockFactory, TypeDescriptor,
};
use pretty_assertions::assert_eq;
use std::any::type_name;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

// --- Test Fixtures ---

trait Mailer: Send + Sync {
  fn send(&self, to: &str) -> String;
}
impl Contract for dyn Mailer {}

struct SmtpMailer;
impl Mailer for SmtpMailer {
  fn send(&self, to: &str) -> String {
    format!("smtp -> {}", to)
  }
}
impl Component for SmtpMailer {
  type Params = ();
  fn construct(_: ()) -> Self {
    SmtpMailer
  }
  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor.implements::<dyn Mailer>(|mailer| mailer)
  }
}

// The test double records how often it was disposed.
struct FakeMailer {
  disposed: Arc<AtomicUsize>,
}
impl Mailer for FakeMailer {
  fn send(&self, to: &str) -> String {
    format!("fake -> {}", to)
  }
}
impl Dispose for FakeMailer {
  fn dispose(&self) {
    self.disposed.fetch_add(1, Ordering::SeqCst);
  }
}
impl Component for FakeMailer {
  type Params = (Arc<AtomicUsize>,);
  fn construct((disposed,): (Arc<AtomicUsize>,)) -> Self {
    FakeMailer { disposed }
  }
  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor.implements::<dyn Mailer>(|mailer| mailer).disposable()
  }
}

// Not a mailer at all.
struct Printer;
impl Component for Printer {
  type Params = ();
  fn construct(_: ()) -> Self {
    Printer
  }
}

fn setup() -> (Container, Arc<MockFactory>) {
  let mocks = Arc::new(MockFactory::new());
  let container = Container::new();
  container
    .register::<dyn Mailer, SmtpMailer>(Arc::clone(&mocks))
    .unwrap();
  (container, mocks)
}

// --- Tests ---

#[test]
fn test_without_override_behaves_like_singleton() {
  let (container, mocks) = setup();

  let r1 = container.resolve::<dyn Mailer>().unwrap();
  let r2 = container.resolve::<dyn Mailer>().unwrap();

  assert!(!mocks.is_mocked::<dyn Mailer>());
  assert_eq!(r1.send("ops"), "smtp -> ops");
  assert!(Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_override_substitutes_the_implementation() {
  let (container, mocks) = setup();
  let disposed = Arc::new(AtomicUsize::new(0));

  mocks
    .mock::<dyn Mailer>(TypeDescriptor::of::<FakeMailer>())
    .unwrap();

  let r1 = container
    .resolve_with::<dyn Mailer>(&fibre_plug::args![Arc::clone(&disposed)])
    .unwrap();
  let r2 = container.resolve::<dyn Mailer>().unwrap();

  assert_eq!(r1.send("ops"), "fake -> ops");
  assert!(Arc::ptr_eq(&r1, &r2));
  assert_eq!(
    container
      .registration::<dyn Mailer>()
      .unwrap()
      .implementation()
      .name(),
    type_name::<SmtpMailer>()
  );
}

#[test]
fn test_override_applies_to_an_already_resolved_registration() {
  let (container, mocks) = setup();
  let disposed = Arc::new(AtomicUsize::new(0));
  let real = container.resolve::<dyn Mailer>().unwrap();

  mocks
    .mock::<dyn Mailer>(TypeDescriptor::of::<FakeMailer>())
    .unwrap();
  let fake = container
    .resolve_with::<dyn Mailer>(&fibre_plug::args![Arc::clone(&disposed)])
    .unwrap();
  assert!(!Arc::ptr_eq(&real, &fake));
  assert_eq!(fake.send("ops"), "fake -> ops");

  // Dropping the override swaps the real implementation back in and
  // disposes the double it replaced.
  assert!(mocks.unmock::<dyn Mailer>().is_some());
  let restored = container.resolve::<dyn Mailer>().unwrap();
  assert_eq!(restored.send("ops"), "smtp -> ops");
  assert_eq!(disposed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_override_must_satisfy_the_contract() {
  let mocks = MockFactory::new();

  let err = mocks
    .mock::<dyn Mailer>(TypeDescriptor::of::<Printer>())
    .unwrap_err();

  assert_eq!(
    err,
    Error::NotAssignableFrom {
      contract: type_name::<dyn Mailer>(),
      implementation: type_name::<Printer>(),
    }
  );
  assert!(!mocks.is_mocked::<dyn Mailer>());
}

#[test]
fn test_removing_a_mocked_registration_disposes_the_double() {
  let (container, mocks) = setup();
  let disposed = Arc::new(AtomicUsize::new(0));
  mocks
    .mock::<dyn Mailer>(TypeDescriptor::of::<FakeMailer>())
    .unwrap();
  container
    .resolve_with::<dyn Mailer>(&fibre_plug::args![Arc::clone(&disposed)])
    .unwrap();

  container.remove::<dyn Mailer>();
  mocks.clear();

  assert_eq!(disposed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_toggling_overrides_never_fails_a_concurrent_resolution() {
  // Swapping the override while other threads resolve must only change which
  // implementation they get, never make a resolution fail.
  let (container, mocks) = setup();
  let disposed = Arc::new(AtomicUsize::new(0));
  let args = fibre_plug::args![Arc::clone(&disposed)];
  let fake = TypeDescriptor::of::<FakeMailer>();

  let failures: usize = thread::scope(|s| {
    let resolvers: Vec<_> = (0..3)
      .map(|_| {
        s.spawn(|| {
          (0..2_000)
            .filter(|_| container.resolve_with::<dyn Mailer>(&args).is_err())
            .count()
        })
      })
      .collect();

    s.spawn(|| {
      for _ in 0..2_000 {
        mocks.mock::<dyn Mailer>(fake.clone()).unwrap();
        mocks.unmock::<dyn Mailer>();
      }
    });

    resolvers.into_iter().map(|h| h.join().unwrap()).sum()
  });

  assert_eq!(failures, 0);
  assert!(container.resolve::<dyn Mailer>().is_ok());
}
