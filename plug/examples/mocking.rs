use fibre_plug::{Component, Container, Contract, DescriptorBuilder, MockFactory, TypeDescriptor};
use std::sync::Arc;

trait PaymentGateway: Send + Sync {
  fn charge(&self, cents: u64) -> String;
}
impl Contract for dyn PaymentGateway {}

struct Stripe;
impl PaymentGateway for Stripe {
  fn charge(&self, cents: u64) -> String {
    format!("charged {} cents through the live gateway", cents)
  }
}
impl Component for Stripe {
  type Params = ();
  fn construct(_: ()) -> Self {
    Stripe
  }
  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor.implements::<dyn PaymentGateway>(|gateway| gateway)
  }
}

struct Sandbox;
impl PaymentGateway for Sandbox {
  fn charge(&self, cents: u64) -> String {
    format!("pretended to charge {} cents", cents)
  }
}
impl Component for Sandbox {
  type Params = ();
  fn construct(_: ()) -> Self {
    Sandbox
  }
  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor.implements::<dyn PaymentGateway>(|gateway| gateway)
  }
}

fn main() {
  // Keep a handle to the factory so overrides can be added later.
  let mocks = Arc::new(MockFactory::new());
  let container = Container::new();
  container
    .register::<dyn PaymentGateway, Stripe>(Arc::clone(&mocks))
    .unwrap();

  // In a test, swap the gateway without touching the registration.
  mocks
    .mock::<dyn PaymentGateway>(TypeDescriptor::of::<Sandbox>())
    .unwrap();

  let gateway = container.resolve::<dyn PaymentGateway>().unwrap();
  println!("{}", gateway.charge(1_999));
}
