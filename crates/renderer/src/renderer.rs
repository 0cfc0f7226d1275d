//! Renderer configuration and lifecycle.
//!
//! `Renderer` owns one bus unit and at most one active configuration for it.
//! There is no global instance: callers hold the renderer (directly, through
//! [`crate::RendererRegistry`], or behind [`crate::SharedRenderer`]) and pass
//! it to every operation.
//!
//! # State machine
//!
//! ```text
//! Unconfigured ──configure──> Stopped ──start──> Running
//!      ^                       ^   │               │
//!      │                       │   └──configure────┤ (re-install)
//!      │                       └──────stop─────────┘
//!      └──────────────destroy (from any configured state)
//! ```
//!
//! Every operation except `configure` and `destroy` returns
//! [`RendererError::NotConfigured`] while unconfigured.

use platform::audio_config::{driver_config, CODEC_CLOCK_OUTPUT, DISCRETE_PINS};
use platform::{ClockPlan, DacChannels, I2sBus};

use crate::config::RendererConfig;
use crate::error::RendererError;
use crate::underrun::UnderflowMonitor;

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RendererState {
    /// No driver installed by this renderer.
    Unconfigured,
    /// Driver installed and clocks programmed; bus idle.
    Stopped,
    /// Bus clocking.
    Running,
}

/// Audio renderer bound to one serial audio bus.
pub struct Renderer<B: I2sBus> {
    pub(crate) bus: B,
    pub(crate) config: Option<RendererConfig>,
    pub(crate) running: bool,
    pub(crate) underflow: UnderflowMonitor,
}

impl<B: I2sBus> Renderer<B> {
    /// Wrap a bus. Nothing is installed until [`configure`](Self::configure).
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            config: None,
            running: false,
            underflow: UnderflowMonitor::new(),
        }
    }

    /// Install and program the bus for `config`, leaving it stopped.
    ///
    /// Any previous session on this bus ends first: the driver is uninstalled
    /// before the new one is installed, so a bus never carries two installs.
    ///
    /// Steps:
    /// 1. uninstall (no-op when nothing is installed)
    /// 2. derive role flags from the mode
    /// 3. install with the fixed DMA policy
    /// 4. program the clock
    /// 5. discrete modes: route pins and the codec master clock
    /// 6. built-in modes: enable the on-chip DAC and/or ADC
    /// 7. zero the DMA ring and stop the bus
    ///
    /// # Errors
    ///
    /// - [`RendererError::BusMismatch`] if `config.bus` is not this renderer's bus.
    /// - Validation errors from [`RendererConfig::validate`].
    /// - [`RendererError::Bus`] if any driver call fails. The renderer is then
    ///   unconfigured and the driver has been uninstalled (best effort).
    pub async fn configure(&mut self, config: RendererConfig) -> Result<(), RendererError<B::Error>> {
        if config.bus != self.bus.id() {
            return Err(RendererError::BusMismatch);
        }
        config.validate::<B::Error>()?;

        info!(
            "configure {} on I2S{}: {} Hz, {} bit, {} ch",
            config.mode.name(),
            config.bus.index(),
            config.sample_rate.get(),
            config.bit_depth.bits(),
            config.channel_count
        );

        self.config = None;
        self.running = false;
        self.bus.uninstall().await.map_err(RendererError::Bus)?;

        if let Err(err) = self.install(&config).await {
            error!("install on I2S{} failed: {}", config.bus.index(), err.name());
            if self.bus.uninstall().await.is_err() {
                warn!("install rollback on I2S{}: uninstall failed", config.bus.index());
            }
            return Err(err);
        }

        self.config = Some(config);
        self.underflow.reset();
        Ok(())
    }

    async fn install(&mut self, config: &RendererConfig) -> Result<(), RendererError<B::Error>> {
        let mode = config.mode;
        let driver = driver_config(
            mode.mode_flags(),
            config.sample_rate,
            config.bit_depth,
            config.use_high_precision_clock,
        );
        self.bus.install(driver).await.map_err(RendererError::Bus)?;

        let plan = ClockPlan::new(
            config.sample_rate,
            config.bit_depth,
            config.channel_count,
            config.use_high_precision_clock,
        );
        match plan.pll_divider() {
            Some(divider) => debug!(
                "bclk {} Hz, mclk {} Hz from PLL_D2 / {}",
                plan.bclk_hz,
                plan.mclk_hz,
                divider
            ),
            None => debug!("bclk {} Hz, mclk {} Hz from APLL", plan.bclk_hz, plan.mclk_hz),
        }
        self.bus
            .set_clock(config.sample_rate, config.bit_depth, config.channel_count)
            .await
            .map_err(RendererError::Bus)?;

        if mode.uses_discrete_pins() {
            self.bus.set_pins(DISCRETE_PINS).await.map_err(RendererError::Bus)?;
            self.bus
                .route_clock_output(CODEC_CLOCK_OUTPUT)
                .await
                .map_err(RendererError::Bus)?;
        }
        if mode.is_built_in_dac() {
            self.bus
                .set_dac_mode(DacChannels::Both)
                .await
                .map_err(RendererError::Bus)?;
        }
        if mode.is_built_in_adc() {
            self.bus
                .set_adc_mode(config.adc_unit, config.adc_channel)
                .await
                .map_err(RendererError::Bus)?;
        }

        self.bus.zero_dma_buffer().await.map_err(RendererError::Bus)?;
        self.bus.stop().await.map_err(RendererError::Bus)
    }

    /// Start clocking and clear whatever the DMA ring held.
    ///
    /// # Errors
    ///
    /// [`RendererError::NotConfigured`] or a bus error.
    pub async fn start(&mut self) -> Result<(), RendererError<B::Error>> {
        self.require_config()?;
        self.bus.start().await.map_err(RendererError::Bus)?;
        // Ring may still hold the tail of the previous stream.
        self.bus.zero_dma_buffer().await.map_err(RendererError::Bus)?;
        while self.bus.poll_event().is_some() {}
        self.underflow.reset();
        self.running = true;
        Ok(())
    }

    /// Stop clocking. The driver stays installed; safe to repeat.
    ///
    /// # Errors
    ///
    /// [`RendererError::NotConfigured`] or a bus error.
    pub async fn stop(&mut self) -> Result<(), RendererError<B::Error>> {
        self.require_config()?;
        self.bus.stop().await.map_err(RendererError::Bus)?;
        self.running = false;
        Ok(())
    }

    /// Stop, uninstall and forget the configuration. No-op when unconfigured.
    ///
    /// The renderer ends unconfigured even if a driver call fails; the first
    /// failure is returned.
    ///
    /// # Errors
    ///
    /// A bus error from `stop` or `uninstall`.
    pub async fn destroy(&mut self) -> Result<(), RendererError<B::Error>> {
        let Some(config) = self.config.take() else {
            return Ok(());
        };
        info!("destroy renderer on I2S{}", config.bus.index());
        self.running = false;
        let stopped = self.bus.stop().await;
        let uninstalled = self.bus.uninstall().await;
        stopped.and(uninstalled).map_err(RendererError::Bus)
    }

    /// Ungate the ADC.
    ///
    /// # Errors
    ///
    /// [`RendererError::NotConfigured`], [`RendererError::AdcUnavailable`] when
    /// the mode has no receive path, or a bus error.
    pub async fn enable_adc(&mut self) -> Result<(), RendererError<B::Error>> {
        self.require_adc()?;
        self.bus.adc_enable().await.map_err(RendererError::Bus)
    }

    /// Gate the ADC.
    ///
    /// # Errors
    ///
    /// As [`enable_adc`](Self::enable_adc).
    pub async fn disable_adc(&mut self) -> Result<(), RendererError<B::Error>> {
        self.require_adc()?;
        self.bus.adc_disable().await.map_err(RendererError::Bus)
    }

    /// Fill the DMA ring with silence without touching playback state.
    ///
    /// # Errors
    ///
    /// [`RendererError::NotConfigured`] or a bus error.
    pub async fn zero_dma_buffer(&mut self) -> Result<(), RendererError<B::Error>> {
        self.require_config()?;
        self.bus.zero_dma_buffer().await.map_err(RendererError::Bus)
    }

    /// Active configuration, if any.
    pub fn current_config(&self) -> Option<&RendererConfig> {
        self.config.as_ref()
    }

    /// Lifecycle state.
    pub fn state(&self) -> RendererState {
        match (self.config.is_some(), self.running) {
            (false, _) => RendererState::Unconfigured,
            (true, false) => RendererState::Stopped,
            (true, true) => RendererState::Running,
        }
    }

    /// Borrow the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back. Call [`destroy`](Self::destroy) first to release the driver.
    pub fn into_bus(self) -> B {
        self.bus
    }

    pub(crate) fn require_config(&self) -> Result<RendererConfig, RendererError<B::Error>> {
        self.config.ok_or(RendererError::NotConfigured)
    }

    fn require_adc(&self) -> Result<RendererConfig, RendererError<B::Error>> {
        let config = self.require_config()?;
        if config.mode.has_adc() {
            Ok(config)
        } else {
            Err(RendererError::AdcUnavailable)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::RendererMode;
    use platform::{BusCall, BusId, MockBusError, MockI2sBus};

    fn renderer() -> Renderer<MockI2sBus> {
        Renderer::new(MockI2sBus::new(BusId::I2s0))
    }

    #[tokio::test]
    async fn test_new_renderer_is_unconfigured() {
        let mut r = renderer();
        assert_eq!(r.state(), RendererState::Unconfigured);
        assert!(r.current_config().is_none());
        assert_eq!(r.start().await, Err(RendererError::NotConfigured));
        assert_eq!(r.stop().await, Err(RendererError::NotConfigured));
        assert_eq!(r.zero_dma_buffer().await, Err(RendererError::NotConfigured));
        assert_eq!(r.enable_adc().await, Err(RendererError::NotConfigured));
    }

    #[tokio::test]
    async fn test_configure_leaves_bus_installed_and_stopped() {
        let mut r = renderer();
        r.configure(RendererConfig::default()).await.unwrap();
        assert_eq!(r.state(), RendererState::Stopped);
        assert!(r.bus().is_installed());
        assert!(!r.bus().is_running());
        assert_eq!(r.bus().calls().last(), Some(&BusCall::Stop));
    }

    #[tokio::test]
    async fn test_configure_rejects_other_bus() {
        let mut r = renderer();
        let cfg = RendererConfig::new(RendererMode::Dac, BusId::I2s1);
        assert_eq!(r.configure(cfg).await, Err(RendererError::BusMismatch));
        assert!(r.bus().calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_stop_cycle() {
        let mut r = renderer();
        r.configure(RendererConfig::default()).await.unwrap();
        r.start().await.unwrap();
        assert_eq!(r.state(), RendererState::Running);
        assert!(r.bus().is_running());
        r.stop().await.unwrap();
        r.stop().await.unwrap();
        assert_eq!(r.state(), RendererState::Stopped);
    }

    #[tokio::test]
    async fn test_start_zeroes_after_starting() {
        let mut r = renderer();
        r.configure(RendererConfig::default()).await.unwrap();
        r.bus_mut().clear_calls();
        r.start().await.unwrap();
        assert_eq!(r.bus().calls(), &[BusCall::Start, BusCall::ZeroDmaBuffer]);
    }

    #[tokio::test]
    async fn test_failed_install_leaves_unconfigured() {
        let mut r = renderer();
        r.bus_mut().fail_next_install();
        let err = r.configure(RendererConfig::default()).await.unwrap_err();
        assert_eq!(err, RendererError::Bus(MockBusError::InstallFailed));
        assert_eq!(r.state(), RendererState::Unconfigured);
        assert!(!r.bus().is_installed());
    }

    #[tokio::test]
    async fn test_failed_rollback_keeps_install_error() {
        let mut r = renderer();
        r.bus_mut().fail_next_install();
        r.bus_mut().fail_uninstall_after(1);
        let err = r.configure(RendererConfig::default()).await.unwrap_err();
        assert_eq!(err, RendererError::Bus(MockBusError::InstallFailed));
        assert_eq!(r.state(), RendererState::Unconfigured);
        assert_eq!(r.bus().count(|c| *c == BusCall::Uninstall), 2);

        r.configure(RendererConfig::default()).await.unwrap();
        assert_eq!(r.state(), RendererState::Stopped);
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let mut r = renderer();
        r.destroy().await.unwrap();
        r.configure(RendererConfig::default()).await.unwrap();
        r.start().await.unwrap();
        r.destroy().await.unwrap();
        assert_eq!(r.state(), RendererState::Unconfigured);
        assert!(!r.bus().is_installed());
        r.destroy().await.unwrap();
        assert_eq!(r.start().await, Err(RendererError::NotConfigured));
    }

    #[tokio::test]
    async fn test_adc_gating_requires_adc_mode() {
        let mut r = renderer();
        r.configure(RendererConfig::default()).await.unwrap();
        assert_eq!(r.enable_adc().await, Err(RendererError::AdcUnavailable));

        let cfg = RendererConfig::new(RendererMode::AdcBuiltIn, BusId::I2s0);
        r.configure(cfg).await.unwrap();
        r.enable_adc().await.unwrap();
        assert!(r.bus().is_adc_enabled());
        r.disable_adc().await.unwrap();
        assert!(!r.bus().is_adc_enabled());
    }

    #[tokio::test]
    async fn test_invalid_channel_count_rejected_before_bus_calls() {
        let mut r = renderer();
        let cfg = RendererConfig::default().with_channel_count(3);
        assert_eq!(
            r.configure(cfg).await,
            Err(RendererError::UnsupportedChannelCount(3))
        );
        assert!(r.bus().calls().is_empty());
    }
}
