//! Lifecycle integration tests: configure sequences per mode, start/stop,
//! destroy and re-configure, all against the recording mock bus.
// Integration test file: unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

use platform::audio_config::{CODEC_CLOCK_OUTPUT, DISCRETE_PINS, DMA_BUF_COUNT, DMA_BUF_LEN};
use platform::{
    AdcChannel, AdcUnit, BitDepth, BusCall, BusId, DacChannels, MockI2sBus, ModeFlags,
    SampleRateHz,
};
use renderer::{Renderer, RendererConfig, RendererError, RendererMode, RendererState};

fn renderer(id: BusId) -> Renderer<MockI2sBus> {
    Renderer::new(MockI2sBus::new(id))
}

/// Asserts no `Install` is ever issued while a driver is installed.
fn assert_single_install(calls: &[BusCall]) {
    let mut installed = false;
    for call in calls {
        match call {
            BusCall::Install(_) => {
                assert!(!installed, "second install without uninstall: {calls:?}");
                installed = true;
            }
            BusCall::Uninstall => installed = false,
            _ => {}
        }
    }
}

// ── Configure sequence ───────────────────────────────────────────────────────

#[tokio::test]
async fn discrete_dac_configure_sequence() {
    let mut r = renderer(BusId::I2s0);
    let rate = SampleRateHz::new(48_000).unwrap();
    let cfg = RendererConfig::new(RendererMode::Dac, BusId::I2s0)
        .with_sample_rate(rate)
        .with_bit_depth(BitDepth::Bits32);
    r.configure(cfg).await.unwrap();

    let calls = r.bus().calls();
    let BusCall::Install(driver) = calls[1] else {
        panic!("expected install after uninstall, got {calls:?}");
    };
    assert_eq!(calls[0], BusCall::Uninstall);
    assert_eq!(driver.mode, ModeFlags::MASTER | ModeFlags::TX);
    assert_eq!(driver.dma_buf_count, DMA_BUF_COUNT);
    assert_eq!(driver.dma_buf_len, DMA_BUF_LEN);
    assert_eq!(driver.bit_depth, BitDepth::Bits32);
    assert_eq!(
        &calls[2..],
        &[
            BusCall::SetClock {
                rate,
                bit_depth: BitDepth::Bits32,
                channels: 2
            },
            BusCall::SetPins(DISCRETE_PINS),
            BusCall::RouteClockOutput(CODEC_CLOCK_OUTPUT),
            BusCall::ZeroDmaBuffer,
            BusCall::Stop,
        ]
    );
}

#[tokio::test]
async fn built_in_dac_enables_both_channels_without_pins() {
    let mut r = renderer(BusId::I2s0);
    r.configure(RendererConfig::new(RendererMode::DacBuiltIn, BusId::I2s0))
        .await
        .unwrap();

    let bus = r.bus();
    assert_eq!(bus.count(|c| matches!(c, BusCall::SetPins(_))), 0);
    assert_eq!(bus.count(|c| matches!(c, BusCall::RouteClockOutput(_))), 0);
    assert_eq!(
        bus.count(|c| *c == BusCall::SetDacMode(DacChannels::Both)),
        1
    );
    assert_eq!(bus.count(|c| matches!(c, BusCall::SetAdcMode(..))), 0);
}

#[tokio::test]
async fn built_in_adc_routes_configured_channel() {
    let mut r = renderer(BusId::I2s0);
    let channel = AdcChannel::new(6).unwrap();
    let cfg = RendererConfig::new(RendererMode::AdcBuiltIn, BusId::I2s0)
        .with_adc(AdcUnit::Unit1, channel);
    r.configure(cfg).await.unwrap();

    let bus = r.bus();
    assert_eq!(
        bus.count(|c| *c == BusCall::SetAdcMode(AdcUnit::Unit1, channel)),
        1
    );
    assert_eq!(bus.count(|c| matches!(c, BusCall::SetDacMode(_))), 0);
    let BusCall::Install(driver) = bus.calls()[1] else {
        panic!("expected install");
    };
    assert!(driver.mode.contains(ModeFlags::RX | ModeFlags::ADC_BUILT_IN));
    assert!(!driver.mode.contains(ModeFlags::TX));
}

#[tokio::test]
async fn combined_built_in_mode_sets_dac_and_adc() {
    let mut r = renderer(BusId::I2s0);
    r.configure(RendererConfig::new(RendererMode::AdcDacBuiltIn, BusId::I2s0))
        .await
        .unwrap();
    let bus = r.bus();
    assert_eq!(bus.count(|c| matches!(c, BusCall::SetDacMode(_))), 1);
    assert_eq!(bus.count(|c| matches!(c, BusCall::SetAdcMode(..))), 1);
}

#[tokio::test]
async fn high_precision_clock_reaches_driver() {
    let mut r = renderer(BusId::I2s1);
    let cfg = RendererConfig::new(RendererMode::Dac, BusId::I2s1).with_high_precision_clock(true);
    r.configure(cfg).await.unwrap();
    let BusCall::Install(driver) = r.bus().calls()[1] else {
        panic!("expected install");
    };
    assert!(driver.use_apll);
}

// ── Configure → destroy → configure ──────────────────────────────────────────

#[tokio::test]
async fn configure_destroy_configure_leaves_one_install() {
    let mut r = renderer(BusId::I2s0);
    let cfg = RendererConfig::default();

    r.configure(cfg).await.unwrap();
    r.destroy().await.unwrap();
    r.configure(cfg).await.unwrap();

    assert_eq!(r.state(), RendererState::Stopped);
    assert!(r.bus().is_installed());
    assert_single_install(r.bus().calls());
}

#[tokio::test]
async fn reconfigure_while_running_reinstalls() {
    let mut r = renderer(BusId::I2s0);
    r.configure(RendererConfig::default()).await.unwrap();
    r.start().await.unwrap();

    let next = RendererConfig::default().with_sample_rate(SampleRateHz::new(22_050).unwrap());
    r.configure(next).await.unwrap();

    assert_eq!(r.state(), RendererState::Stopped);
    assert!(!r.bus().is_running());
    assert_eq!(r.current_config().unwrap().sample_rate.get(), 22_050);
    assert_single_install(r.bus().calls());
}

#[tokio::test]
async fn operations_after_destroy_report_not_configured() {
    let mut r = renderer(BusId::I2s0);
    r.configure(RendererConfig::default()).await.unwrap();
    r.destroy().await.unwrap();

    assert_eq!(r.start().await, Err(RendererError::NotConfigured));
    assert_eq!(r.stop().await, Err(RendererError::NotConfigured));
    assert_eq!(r.disable_adc().await, Err(RendererError::NotConfigured));
    assert_eq!(r.zero_dma_buffer().await, Err(RendererError::NotConfigured));
    let mut buf = [0u8; 4];
    assert_eq!(r.read_raw(&mut buf).await, Err(RendererError::NotConfigured));
    assert!(r.current_config().is_none());
}

#[tokio::test]
async fn destroy_stops_then_uninstalls() {
    let mut r = renderer(BusId::I2s0);
    r.configure(RendererConfig::default()).await.unwrap();
    r.start().await.unwrap();
    r.bus_mut().clear_calls();

    r.destroy().await.unwrap();
    assert_eq!(r.bus().calls(), &[BusCall::Stop, BusCall::Uninstall]);
    assert_eq!(r.state(), RendererState::Unconfigured);
}

#[tokio::test]
async fn zero_dma_buffer_keeps_playback_state() {
    let mut r = renderer(BusId::I2s0);
    r.configure(RendererConfig::default()).await.unwrap();
    r.start().await.unwrap();
    r.zero_dma_buffer().await.unwrap();
    assert_eq!(r.state(), RendererState::Running);
    assert!(r.bus().is_running());
}

#[tokio::test]
async fn into_bus_returns_the_mock() {
    let mut r = renderer(BusId::I2s1);
    r.configure(RendererConfig::new(RendererMode::Dac, BusId::I2s1))
        .await
        .unwrap();
    r.destroy().await.unwrap();
    let bus = r.into_bus();
    assert!(!bus.is_installed());
}
