use fibre_plug::{args, global, Component, Contract, DescriptorBuilder, Singleton, Transient};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// A service that gets a unique ID upon creation.
trait Tracker: Send + Sync {
  fn id(&self) -> usize;
}
impl Contract for dyn Tracker {}

trait Scratch: Send + Sync {
  fn id(&self) -> usize;
}
impl Contract for dyn Scratch {}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct RequestTracker {
  id: usize,
  label: String,
}

impl Tracker for RequestTracker {
  fn id(&self) -> usize {
    self.id
  }
}

impl Scratch for RequestTracker {
  fn id(&self) -> usize {
    self.id
  }
}

impl Component for RequestTracker {
  type Params = (String,);

  fn construct((label,): (String,)) -> Self {
    let id = ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    println!("Creating RequestTracker #{} ({})...", id, label);
    RequestTracker { id, label }
  }

  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor
      .implements::<dyn Tracker>(|tracker| tracker)
      .implements::<dyn Scratch>(|tracker| tracker)
  }
}

fn main() {
  // --- Registration ---
  // The same implementation, bound to two contracts with different strategies.
  global().register::<dyn Tracker, RequestTracker>(Singleton).unwrap();
  global().register::<dyn Scratch, RequestTracker>(Transient).unwrap();

  println!("--- Resolving Singletons ---");
  let s1 = global().resolve_with::<dyn Tracker>(&args!["shared".to_string()]).unwrap();
  // Arguments are ignored once the singleton exists.
  let s2 = global().resolve_with::<dyn Tracker>(&args!["ignored".to_string()]).unwrap();
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id(), s2.id());
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("\n--- Resolving Transients ---");
  let t1 = global().resolve_with::<dyn Scratch>(&args!["first".to_string()]).unwrap();
  let t2 = global().resolve_with::<dyn Scratch>(&args!["second".to_string()]).unwrap();
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id(), t2.id());
  assert_ne!(t1.id(), t2.id(), "Transient instances should be different");

  let registration = global().registration::<dyn Tracker>().unwrap();
  println!(
    "\n{} last resolved at {:?}",
    registration.contract().name(),
    registration.last_resolved()
  );
  if let Some(instance) = registration.instance() {
    if let Some(tracker) = instance.downcast::<RequestTracker>() {
      println!("Held singleton is labelled '{}'.", tracker.label);
    }
  }
}
