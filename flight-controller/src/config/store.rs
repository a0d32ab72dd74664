use std::sync::{Arc, Mutex, PoisonError, RwLock};

use once_cell::sync::Lazy;

use super::ControlConfig;
use crate::util::error::ConfigError;

pub static CONTROL_CONFIG: Lazy<ConfigStore> = Lazy::new(ConfigStore::default);

/// One published configuration. Never mutated after publication.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    pub generation: u32,
    pub config: ControlConfig,
}

/// Copy-on-write holder for the active configuration.
///
/// Writers build a complete new [`ControlConfig`] and swap the pointer;
/// the control tick clones the `Arc` once at the start of the tick and
/// works on that for the whole tick, so it never observes half of an
/// update. `current` is only ever locked for a pointer clone or swap.
/// Writers queue on `writer` while they build and validate.
pub struct ConfigStore {
    current: RwLock<Arc<ConfigSnapshot>>,
    writer: Mutex<()>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        ConfigStore {
            current: RwLock::new(Arc::new(ConfigSnapshot {
                generation: 0,
                config: ControlConfig::default(),
            })),
            writer: Mutex::new(()),
        }
    }
}

impl ConfigStore {
    pub fn new(config: ControlConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ConfigStore {
            current: RwLock::new(Arc::new(ConfigSnapshot {
                generation: 0,
                config,
            })),
            writer: Mutex::new(()),
        })
    }

    /// Current snapshot, cheap enough to call every tick.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        // The lock only guards a pointer swap, a poisoned guard still holds
        // a complete snapshot.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validates and publishes `config`, returning its generation.
    pub fn publish(&self, config: ControlConfig) -> Result<u32, ConfigError> {
        self.update(|next| *next = config)
    }

    /// Applies `change` to a copy of the current configuration and
    /// publishes the copy if it still validates.
    pub fn update(&self, change: impl FnOnce(&mut ControlConfig)) -> Result<u32, ConfigError> {
        let published = {
            let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

            let current = self.snapshot();
            let mut next = current.config.clone();
            change(&mut next);
            next.validate().map(|()| {
                let generation = current.generation.wrapping_add(1);
                self.swap(Arc::new(ConfigSnapshot {
                    generation,
                    config: next,
                }));
                generation
            })
        };

        match &published {
            Ok(generation) => log::info!("Published configuration generation {}", generation),
            Err(error) => log::warn!("Rejected configuration update: {}", error),
        }
        published
    }

    fn swap(&self, snapshot: Arc<ConfigSnapshot>) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}
