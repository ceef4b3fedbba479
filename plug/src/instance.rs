use crate::descriptor::{Contract, TypeDescriptor};

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A constructed value, tagged with the descriptor of the type that built it.
///
/// Instances are shared: cloning one clones the inner `Arc`, never the value.
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  origin: TypeDescriptor,
}

impl Instance {
  pub(crate) fn new(value: Arc<dyn Any + Send + Sync>, origin: TypeDescriptor) -> Self {
    Self { value, origin }
  }

  /// The `TypeId` of the held value's concrete type.
  pub fn concrete_type_id(&self) -> TypeId {
    (*self.value).type_id()
  }

  pub fn type_name(&self) -> &'static str {
    self.origin.name()
  }

  /// The descriptor this instance was built from.
  pub fn origin(&self) -> &TypeDescriptor {
    &self.origin
  }

  pub fn is<T: Any>(&self) -> bool {
    self.value.is::<T>()
  }

  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.value).downcast::<T>().ok()
  }

  /// Views the instance as contract `C`, if its type declared that contract.
  pub fn cast<C: Contract + ?Sized>(&self) -> Option<Arc<C>> {
    self
      .origin
      .upcast(TypeId::of::<C>(), Arc::clone(&self.value))?
      .downcast::<Arc<C>>()
      .ok()
      .map(|boxed| *boxed)
  }

  /// True when both handles point at the same value.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
  }

  pub(crate) fn dispose(&self) {
    self.origin.dispose(&*self.value);
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({} @ {:p})", self.origin.name(), Arc::as_ptr(&self.value))
  }
}
