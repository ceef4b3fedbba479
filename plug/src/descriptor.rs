//! Runtime type descriptors for contracts and their implementations.

use crate::activator::{Activator, Argument, Params};
use crate::error::{ConstructionError, Error, Result};
use crate::instance::Instance;

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

// Descriptors derived through `TypeDescriptor::of`, one per implementation type.
static DESCRIPTORS: Lazy<DashMap<TypeId, TypeDescriptor>> = Lazy::new(DashMap::new);

/// Marks a trait object type as something that can be registered as a contract.
///
/// Only trait object types (`dyn Trait`) are contracts. Implementing this for
/// a sized type compiles, but such a type is rejected with
/// [`Error::InvalidType`] when used as the contract of a registration.
///
/// ```
/// use fibre_plug::Contract;
///
/// trait Animal: Send + Sync {
///   fn speak(&self) -> String;
/// }
///
/// impl Contract for dyn Animal {}
/// ```
pub trait Contract: Send + Sync + 'static {}

/// An explicit cleanup capability.
///
/// When a registration is released (removed, torn down or dropped) and its
/// held instance's type was described as [`disposable`](DescriptorBuilder::disposable),
/// `dispose` is invoked exactly once.
///
/// Implementing this trait alone does nothing: the type's descriptor must opt
/// in through [`DescriptorBuilder::disposable`], usually from
/// [`Component::describe`]. Without it the instance is simply dropped.
///
/// ```
/// use fibre_plug::{Component, DescriptorBuilder, Dispose, TypeDescriptor};
///
/// struct Socket;
/// impl Dispose for Socket {
///   fn dispose(&self) {}
/// }
/// impl Component for Socket {
///   type Params = ();
///   fn construct(_: ()) -> Self { Socket }
///   fn describe(d: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> { d.disposable() }
/// }
///
/// assert!(TypeDescriptor::of::<Socket>().is_disposable());
/// ```
pub trait Dispose {
  fn dispose(&self);
}

/// A concrete type that knows how to describe and construct itself.
///
/// The descriptor derived from this impl is built once per type and cached
/// for the life of the process.
pub trait Component: Any + Send + Sync + Sized {
  /// Positional constructor parameters.
  type Params: Params;

  fn construct(params: Self::Params) -> Self;

  /// Declares the contracts this type satisfies and its optional capabilities.
  ///
  /// The default declares nothing: the type satisfies no contract and is not
  /// disposed on release, even if it implements [`Dispose`]. Call
  /// [`DescriptorBuilder::implements`] for each contract and
  /// [`DescriptorBuilder::disposable`] to opt into disposal.
  fn describe(descriptor: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
    descriptor
  }
}

/// Whether a descriptor stands for an abstract contract or a concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
  Contract,
  Concrete,
}

impl fmt::Display for TypeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TypeKind::Contract => write!(f, "contract"),
      TypeKind::Concrete => write!(f, "concrete"),
    }
  }
}

type Upcast =
  Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;
type Disposer = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;

struct DescriptorInner {
  id: TypeId,
  name: &'static str,
  kind: TypeKind,
  activator: Option<Activator>,
  contracts: HashMap<TypeId, Upcast>,
  disposer: Option<Disposer>,
}

/// The runtime descriptor of a contract or an implementation type.
///
/// Cloning is cheap. Two descriptors are equal when they describe the same type.
#[derive(Clone)]
pub struct TypeDescriptor {
  inner: Arc<DescriptorInner>,
}

impl TypeDescriptor {
  /// Describes a contract (trait object) type.
  ///
  /// A sized type marked as [`Contract`] is still described as concrete, so
  /// registering against it fails validation.
  pub fn contract<C: Contract + ?Sized>() -> Self {
    // Only unsized types are addressed through fat pointers.
    let kind = if size_of::<*const C>() == size_of::<*const ()>() {
      TypeKind::Concrete
    } else {
      TypeKind::Contract
    };

    Self {
      inner: Arc::new(DescriptorInner {
        id: TypeId::of::<C>(),
        name: type_name::<C>(),
        kind,
        activator: None,
        contracts: HashMap::new(),
        disposer: None,
      }),
    }
  }

  /// Returns the cached descriptor of a [`Component`], deriving it on first use.
  pub fn of<T: Component>() -> Self {
    let id = TypeId::of::<T>();
    if let Some(descriptor) = DESCRIPTORS.get(&id) {
      return descriptor.value().clone();
    }

    // Built outside the map so `describe` may itself look up other components.
    let built = T::describe(DescriptorBuilder::new().constructor(T::construct)).build();
    DESCRIPTORS.entry(id).or_insert(built).value().clone()
  }

  /// Starts a descriptor for a concrete type assembled by hand.
  pub fn builder<T: Any + Send + Sync>() -> DescriptorBuilder<T> {
    DescriptorBuilder::new()
  }

  pub fn id(&self) -> TypeId {
    self.inner.id
  }

  pub fn name(&self) -> &'static str {
    self.inner.name
  }

  pub fn kind(&self) -> TypeKind {
    self.inner.kind
  }

  pub fn is_contract(&self) -> bool {
    self.inner.kind == TypeKind::Contract
  }

  pub fn is_concrete(&self) -> bool {
    self.inner.kind == TypeKind::Concrete
  }

  pub fn activator(&self) -> Option<&Activator> {
    self.inner.activator.as_ref()
  }

  pub fn is_disposable(&self) -> bool {
    self.inner.disposer.is_some()
  }

  /// True when instances of this type can be served as `contract`.
  pub fn is_assignable_to(&self, contract: &TypeDescriptor) -> bool {
    self.inner.contracts.contains_key(&contract.id())
  }

  /// Constructs a new instance of this type from positional arguments.
  pub fn activate(&self, args: &[Argument]) -> Result<Instance> {
    let activator = self
      .inner
      .activator
      .as_ref()
      .ok_or(ConstructionError::NoConstructor)
      .map_err(|source| self.construction_failure(source))?;

    let value = activator
      .invoke(args)
      .map_err(|source| self.construction_failure(source))?;

    tracing::debug!(implementation = self.name(), args = args.len(), "constructed instance");
    Ok(Instance::new(value, self.clone()))
  }

  /// Wraps an already built value as an instance of this type, or `None` if
  /// the value is of a different type.
  pub(crate) fn wrap(&self, value: Arc<dyn Any + Send + Sync>) -> Option<Instance> {
    ((*value).type_id() == self.id()).then(|| Instance::new(value, self.clone()))
  }

  pub(crate) fn upcast(
    &self,
    contract: TypeId,
    value: Arc<dyn Any + Send + Sync>,
  ) -> Option<Box<dyn Any + Send + Sync>> {
    let upcast = self.inner.contracts.get(&contract)?;
    upcast(value)
  }

  pub(crate) fn dispose(&self, value: &(dyn Any + Send + Sync)) {
    if let Some(disposer) = &self.inner.disposer {
      disposer(value);
    }
  }

  fn construction_failure(&self, source: ConstructionError) -> Error {
    Error::ConstructionFailure {
      implementation: self.name(),
      source,
    }
  }
}

impl PartialEq for TypeDescriptor {
  fn eq(&self, other: &Self) -> bool {
    self.inner.id == other.inner.id
  }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.inner.id.hash(state);
  }
}

impl fmt::Debug for TypeDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypeDescriptor")
      .field("name", &self.inner.name)
      .field("kind", &self.inner.kind)
      .field("constructible", &self.inner.activator.is_some())
      .field("contracts", &self.inner.contracts.len())
      .field("disposable", &self.inner.disposer.is_some())
      .finish()
  }
}

/// Assembles the descriptor of a concrete type `T`.
pub struct DescriptorBuilder<T> {
  activator: Option<Activator>,
  contracts: HashMap<TypeId, Upcast>,
  disposer: Option<Disposer>,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> DescriptorBuilder<T> {
  pub fn new() -> Self {
    Self {
      activator: None,
      contracts: HashMap::new(),
      disposer: None,
      _marker: PhantomData,
    }
  }

  /// Sets the constructor. A type without one can be registered but never activated.
  pub fn constructor<P: Params>(mut self, constructor: impl Fn(P) -> T + Send + Sync + 'static) -> Self {
    self.activator = Some(Activator::new(constructor));
    self
  }

  /// Declares that `T` satisfies contract `C`, with the conversion that views
  /// a `T` as a `C`. Usually the identity closure `|it| it`.
  pub fn implements<C: Contract + ?Sized>(
    mut self,
    cast: impl Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
  ) -> Self {
    let upcast: Upcast = Arc::new(move |value: Arc<dyn Any + Send + Sync>| {
      let concrete = value.downcast::<T>().ok()?;
      Some(Box::new(cast(concrete)) as Box<dyn Any + Send + Sync>)
    });
    self.contracts.insert(TypeId::of::<C>(), upcast);
    self
  }

  pub fn build(self) -> TypeDescriptor {
    TypeDescriptor {
      inner: Arc::new(DescriptorInner {
        id: TypeId::of::<T>(),
        name: type_name::<T>(),
        kind: TypeKind::Concrete,
        activator: self.activator,
        contracts: self.contracts,
        disposer: self.disposer,
      }),
    }
  }
}

impl<T: Any + Send + Sync + Dispose> DescriptorBuilder<T> {
  /// Registers [`Dispose::dispose`] as the cleanup hook for instances of `T`.
  pub fn disposable(mut self) -> Self {
    self.disposer = Some(Arc::new(|value: &(dyn Any + Send + Sync)| {
      if let Some(concrete) = value.downcast_ref::<T>() {
        concrete.dispose();
      }
    }));
    self
  }
}

impl<T: Any + Send + Sync> Default for DescriptorBuilder<T> {
  fn default() -> Self {
    Self::new()
  }
}
