use fibre_plug::{resolve, Component, Container, Contract, DescriptorBuilder, Dispose, Singleton};

// 1. Define the abstraction (the trait) and mark it as a contract.
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}
impl Contract for dyn Logger {}

// 2. Define a concrete implementation that needs cleanup.
struct ConsoleLogger {
  prefix: String,
}

impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[{}]: {}", self.prefix, message);
  }
}

impl Dispose for ConsoleLogger {
  fn dispose(&self) {
    println!("[{}]: flushed and closed.", self.prefix);
  }
}

// 3. Describe how to build it and which contracts it satisfies.
impl Component for ConsoleLogger {
  type Params = (String,);

  fn construct((prefix,): (String,)) -> Self {
    ConsoleLogger { prefix }
  }

  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor
      .implements::<dyn Logger>(|logger| logger)
      .disposable()
  }
}

fn main() {
  let container = Container::new();

  // --- Registration ---
  // The container stores the ConsoleLogger but serves it as `dyn Logger`.
  container.register::<dyn Logger, ConsoleLogger>(Singleton).unwrap();

  // --- Resolution and Usage ---
  let logger = resolve!(in container => dyn Logger; "CONSOLE LOG".to_string());
  logger.log("Starting report generation.");
  logger.log("Finished report generation.");

  // --- Release ---
  // Removing the binding disposes the held instance exactly once.
  container.remove::<dyn Logger>();
}
