// plug/tests/macros.rs

//! Tests for the `resolve!` and `args!` macros, against both the global
//! container and local `Container` instances.

use fibre_plug::{
  args, global, resolve, Component, Container, Contract, DescriptorBuilder, Singleton, Transient,
};
use serial_test::serial;
use std::sync::Arc;

// --- Test Fixtures ---

trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}
impl Contract for dyn Greeter {}

trait Missing: Send + Sync {}
impl Contract for dyn Missing {}

struct NamedGreeter {
  name: String,
}

impl Greeter for NamedGreeter {
  fn greet(&self) -> String {
    format!("Hello, {}!", self.name)
  }
}

impl Component for NamedGreeter {
  type Params = (String,);

  fn construct((name,): (String,)) -> Self {
    NamedGreeter { name }
  }

  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor.implements::<dyn Greeter>(|greeter| greeter)
  }
}

// --- args! ---

#[test]
fn test_args_macro_preserves_order_and_types() {
  let empty = args![];
  assert!(empty.is_empty());

  let args = args!["a".to_string(), 2_u8, 3.5_f64,];
  assert_eq!(args.len(), 3);
  assert!(args[0].is::<String>());
  assert_eq!(args[1].downcast_ref::<u8>(), Some(&2));
  assert_eq!(args[2].type_name(), "f64");
}

// --- Local container ---

#[test]
fn test_resolve_from_local_container() {
  let container = Container::new();
  container.register::<dyn Greeter, NamedGreeter>(Transient).unwrap();

  let greeter = resolve!(in container => dyn Greeter; "Ada".to_string());
  assert_eq!(greeter.greet(), "Hello, Ada!");
}

#[test]
#[should_panic(expected = "Failed to resolve required contract")]
fn test_resolve_panics_on_missing_contract_in_local_container() {
  let container = Container::new();
  resolve!(in container => dyn Missing);
}

// --- Global container ---

#[test]
#[serial]
fn test_resolve_from_global_container() {
  global().register::<dyn Greeter, NamedGreeter>(Singleton).unwrap();

  let first = resolve!(dyn Greeter; "Grace".to_string());
  let second = resolve!(dyn Greeter);

  assert_eq!(first.greet(), "Hello, Grace!");
  assert!(Arc::ptr_eq(&first, &second));

  global().remove::<dyn Greeter>();
}

#[test]
#[serial]
#[should_panic(expected = "Failed to resolve required contract")]
fn test_resolve_panics_on_missing_contract_in_global_container() {
  resolve!(dyn Missing);
}

#[test]
#[serial]
fn test_global_teardown_clears_every_binding() {
  global().register::<dyn Greeter, NamedGreeter>(Transient).unwrap();
  assert!(global().contains::<dyn Greeter>());

  assert!(global().teardown() >= 1);

  assert!(global().is_empty());
  assert!(global().resolve::<dyn Greeter>().is_err());
}
