//! Public macros for ergonomic resolution.

/// Builds a `Vec<Argument>` from a list of values.
///
/// ```
/// use fibre_plug::args;
///
/// let args = args![String::from("rex"), 3_u8];
/// assert_eq!(args.len(), 2);
/// assert!(args[1].is::<u8>());
/// ```
#[macro_export]
macro_rules! args {
  () => {
    ::std::vec::Vec::<$crate::Argument>::new()
  };
  ($($arg:expr),+ $(,)?) => {
    ::std::vec![$($crate::Argument::new($arg)),+]
  };
}

/// Resolves a contract, panicking if it cannot be resolved.
///
/// Without a container the global one is used. Constructor arguments follow
/// a `;`.
///
/// # Panics
///
/// Panics with the underlying [`Error`](crate::Error) if resolution fails.
/// For a non-panicking version, call [`Container::resolve`](crate::Container::resolve).
///
/// # Examples
///
/// ```
/// use fibre_plug::{global, resolve, Component, Container, Contract, DescriptorBuilder, Transient};
///
/// trait Counter: Send + Sync { fn start(&self) -> u32; }
/// impl Contract for dyn Counter {}
///
/// struct StartingAt(u32);
/// impl Counter for StartingAt { fn start(&self) -> u32 { self.0 } }
/// impl Component for StartingAt {
///   type Params = (u32,);
///   fn construct((start,): (u32,)) -> Self { StartingAt(start) }
///   fn describe(d: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> { d.implements::<dyn Counter>(|it| it) }
/// }
///
/// let container = Container::new();
/// container.register::<dyn Counter, StartingAt>(Transient).unwrap();
/// assert_eq!(resolve!(in container => dyn Counter; 7_u32).start(), 7);
///
/// global().register::<dyn Counter, StartingAt>(Transient).unwrap();
/// assert_eq!(resolve!(dyn Counter; 9_u32).start(), 9);
/// ```
#[macro_export]
macro_rules! resolve {
  // resolve!(in container => dyn Contract)
  (in $container:expr => $contract:ty) => {
    $container
      .resolve::<$contract>()
      .unwrap_or_else(|err| panic!("Failed to resolve required contract: {}", err))
  };

  // resolve!(in container => dyn Contract; arg, ...)
  (in $container:expr => $contract:ty; $($arg:expr),+ $(,)?) => {
    $container
      .resolve_with::<$contract>(&$crate::args![$($arg),+])
      .unwrap_or_else(|err| panic!("Failed to resolve required contract: {}", err))
  };

  // resolve!(dyn Contract)
  ($contract:ty) => {
    $crate::resolve!(in $crate::global() => $contract)
  };

  // resolve!(dyn Contract; arg, ...)
  ($contract:ty; $($arg:expr),+ $(,)?) => {
    $crate::resolve!(in $crate::global() => $contract; $($arg),+)
  };
}
