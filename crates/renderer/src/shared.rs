//! Renderer behind an async mutex.
//!
//! One producer task renders while a control task starts, stops or
//! reconfigures. Every operation takes the lock, so a `configure` can never
//! interleave with an in-flight `render_samples`.
//!
//! ```rust,ignore
//! static RENDERER: SharedRenderer<CriticalSectionRawMutex, EspI2s> =
//!     shared(EspI2s::I2S0);
//!
//! // producer
//! RENDERER.lock().await.render_samples(&pcm, &format).await?;
//!
//! // control
//! RENDERER.lock().await.stop().await?;
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use platform::I2sBus;

use crate::renderer::Renderer;

/// Renderer guarded by an `embassy_sync` mutex.
pub type SharedRenderer<M, B> = Mutex<M, Renderer<B>>;

/// Wrap `bus` in a fresh, unconfigured shared renderer.
pub const fn shared<M: RawMutex, B: I2sBus>(bus: B) -> SharedRenderer<M, B> {
    Mutex::new(Renderer::new(bus))
}
