//! Renderers keyed by bus unit.
//!
//! The registry owns every bus the application renders on and guarantees
//! one renderer, and therefore at most one driver installation, per
//! [`BusId`].

use heapless::Vec;
use platform::{BusId, I2sBus};

use crate::config::RendererConfig;
use crate::error::RegistryError;
use crate::renderer::Renderer;

/// Fixed-capacity table of renderers, at most one per bus.
pub struct RendererRegistry<B: I2sBus, const N: usize> {
    renderers: Vec<Renderer<B>, N>,
}

impl<B: I2sBus, const N: usize> RendererRegistry<B, N> {
    /// Empty registry.
    pub const fn new() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// Take ownership of `bus`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::BusAlreadyAttached`] if a bus with the same id is
    /// attached, [`RegistryError::RegistryFull`] if all `N` slots are used.
    pub fn attach(&mut self, bus: B) -> Result<(), RegistryError<B::Error>> {
        if self.position(bus.id()).is_some() {
            return Err(RegistryError::BusAlreadyAttached);
        }
        self.renderers
            .push(Renderer::new(bus))
            .map_err(|_| RegistryError::RegistryFull)
    }

    /// Renderer for `id`.
    pub fn get(&self, id: BusId) -> Option<&Renderer<B>> {
        self.renderers.iter().find(|r| r.bus().id() == id)
    }

    /// Mutable renderer for `id`.
    pub fn get_mut(&mut self, id: BusId) -> Option<&mut Renderer<B>> {
        self.renderers.iter_mut().find(|r| r.bus().id() == id)
    }

    /// Configure the renderer on `config.bus`, replacing any active session there.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownBus`] or the renderer's error.
    pub async fn configure(&mut self, config: RendererConfig) -> Result<(), RegistryError<B::Error>> {
        let renderer = self.get_mut(config.bus).ok_or(RegistryError::UnknownBus)?;
        renderer.configure(config).await?;
        Ok(())
    }

    /// Destroy the session on `id`. The bus stays attached.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownBus`] or the renderer's error.
    pub async fn destroy(&mut self, id: BusId) -> Result<(), RegistryError<B::Error>> {
        let renderer = self.get_mut(id).ok_or(RegistryError::UnknownBus)?;
        renderer.destroy().await?;
        Ok(())
    }

    /// Destroy the session on `id` and hand its bus back.
    ///
    /// The bus is removed even if tearing down the driver failed; the error
    /// is logged.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownBus`].
    pub async fn detach(&mut self, id: BusId) -> Result<B, RegistryError<B::Error>> {
        let index = self.position(id).ok_or(RegistryError::UnknownBus)?;
        if let Some(renderer) = self.renderers.get_mut(index) {
            if let Err(err) = renderer.destroy().await {
                warn!("detach I2S{}: teardown failed: {}", id.index(), err.name());
            }
        }
        Ok(self.renderers.swap_remove(index).into_bus())
    }

    /// Attached bus ids, in attach order until the first detach.
    pub fn ids(&self) -> impl Iterator<Item = BusId> + '_ {
        self.renderers.iter().map(|r| r.bus().id())
    }

    /// Number of attached buses.
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// No buses attached.
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    fn position(&self, id: BusId) -> Option<usize> {
        self.renderers.iter().position(|r| r.bus().id() == id)
    }
}

impl<B: I2sBus, const N: usize> Default for RendererRegistry<B, N> {
    fn default() -> Self {
        Self::new()
    }
}
