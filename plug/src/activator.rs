//! Positional construction of implementation types from type-erased arguments.
//!
//! An [`Activator`] is derived once per implementation type. It captures the
//! constructor together with its parameter metadata (arity and parameter type
//! names), so that every later construction only has to downcast the supplied
//! [`Argument`]s and call through.

use crate::error::ConstructionError;

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// A single type-erased constructor argument.
///
/// The argument remembers the name of the type it was created from so that
/// a mismatch against a constructor parameter can be reported precisely.
#[derive(Clone)]
pub struct Argument {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Argument {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self {
      value: Arc::new(value),
      type_name: type_name::<T>(),
    }
  }

  /// The name of the type this argument holds.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn is<T: Any>(&self) -> bool {
    self.value.is::<T>()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.value.downcast_ref::<T>()
  }
}

impl fmt::Debug for Argument {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Argument({})", self.type_name)
  }
}

/// The parameter list of a constructor.
///
/// Implemented for tuples of up to eight elements. Each element is taken from
/// the argument slice at its position and cloned out of the argument.
pub trait Params: Sized + 'static {
  /// Number of positional parameters.
  const ARITY: usize;

  /// Declared parameter type names, in positional order.
  fn type_names() -> Vec<&'static str>;

  /// Pulls every parameter out of `args`, failing on the first missing or
  /// mistyped position. Extra trailing arguments are ignored.
  fn extract(args: &[Argument]) -> Result<Self, ConstructionError>;
}

fn take<P: Any + Clone>(args: &[Argument], position: usize) -> Result<P, ConstructionError> {
  let expected = type_name::<P>();
  let argument = args
    .get(position)
    .ok_or(ConstructionError::MissingArgument { position, expected })?;

  argument
    .downcast_ref::<P>()
    .cloned()
    .ok_or(ConstructionError::ArgumentType {
      position,
      expected,
      found: argument.type_name(),
    })
}

macro_rules! impl_params {
  ($arity:expr; $($param:ident => $position:tt),*) => {
    impl<$($param: Any + Clone + Send + Sync),*> Params for ($($param,)*) {
      const ARITY: usize = $arity;

      fn type_names() -> Vec<&'static str> {
        vec![$(type_name::<$param>()),*]
      }

      #[allow(unused_variables)]
      fn extract(args: &[Argument]) -> Result<Self, ConstructionError> {
        Ok(($(take::<$param>(args, $position)?,)*))
      }
    }
  };
}

impl_params!(0;);
impl_params!(1; A => 0);
impl_params!(2; A => 0, B => 1);
impl_params!(3; A => 0, B => 1, C => 2);
impl_params!(4; A => 0, B => 1, C => 2, D => 3);
impl_params!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_params!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_params!(7; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_params!(8; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);

type ConstructFn =
  dyn Fn(&[Argument]) -> Result<Arc<dyn Any + Send + Sync>, ConstructionError> + Send + Sync;

/// A reusable construction function for one implementation type.
#[derive(Clone)]
pub struct Activator {
  construct: Arc<ConstructFn>,
  parameters: Arc<[&'static str]>,
  produces: &'static str,
}

impl Activator {
  /// Derives an activator from a constructor taking a parameter tuple.
  pub fn new<T, P>(constructor: impl Fn(P) -> T + Send + Sync + 'static) -> Self
  where
    T: Any + Send + Sync,
    P: Params,
  {
    Self {
      construct: Arc::new(move |args: &[Argument]| {
        let params = P::extract(args)?;
        Ok(Arc::new(constructor(params)) as Arc<dyn Any + Send + Sync>)
      }),
      parameters: P::type_names().into(),
      produces: type_name::<T>(),
    }
  }

  pub fn arity(&self) -> usize {
    self.parameters.len()
  }

  /// Declared parameter type names, in positional order.
  pub fn parameters(&self) -> &[&'static str] {
    &self.parameters
  }

  /// Builds a new value from `args`.
  ///
  /// The returned `Arc` holds the concrete implementation type.
  pub fn invoke(&self, args: &[Argument]) -> Result<Arc<dyn Any + Send + Sync>, ConstructionError> {
    (self.construct)(args)
  }
}

impl fmt::Debug for Activator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Activator")
      .field("produces", &self.produces)
      .field("parameters", &self.parameters)
      .finish()
  }
}
