//! Sizing of a container's registry.

use crate::container::Container;

/// Tuning knobs for a [`Container`]'s internal map.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContainerConfig {
  /// Number of lock shards. Rounded up to a power of two, at least 2.
  pub shard_amount: usize,
  /// Registrations to reserve room for up front.
  pub initial_capacity: usize,
}

impl ContainerConfig {
  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::default()
  }

  /// The shard amount actually used by the map.
  pub(crate) fn effective_shard_amount(&self) -> usize {
    normalize_shards(self.shard_amount)
  }
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      // Twice the processor count, like a typical concurrency level.
      shard_amount: normalize_shards(num_cpus::get() * 2),
      initial_capacity: 0,
    }
  }
}

fn normalize_shards(shards: usize) -> usize {
  shards.max(2).next_power_of_two()
}

/// A builder for [`Container`] instances.
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
  config: ContainerConfig,
}

impl ContainerBuilder {
  /// Sets the number of concurrent shards to use.
  pub fn shards(mut self, shards: usize) -> Self {
    self.config.shard_amount = normalize_shards(shards);
    self
  }

  /// Sets how many registrations to reserve room for.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.config.initial_capacity = capacity;
    self
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.config
  }

  pub fn build(self) -> Container {
    Container::with_config(&self.config)
  }
}

impl From<ContainerConfig> for ContainerBuilder {
  fn from(config: ContainerConfig) -> Self {
    Self { config }
  }
}
