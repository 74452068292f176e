//! `safeview` - live safety overlays for analyzed surgical video
//!
//! # Features
//!
//! - **One-shot alerts**: every analysis event fires exactly once when
//!   playback reaches it, seeks included
//! - **Active overlay**: the event nearest the playhead (within a tolerance
//!   window) is drawn every tick, with deterministic tie-breaking
//! - **Analysis client**: multipart upload to the analysis service with a
//!   bounded timeout
//!
//! # Example
//!
//! ```rust,no_run
//! use safeview::{AnalysisClient, AnalysisRun, ClockEvent, PlaybackSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AnalysisClient::new("http://127.0.0.1:8000")?;
//!     let response = client.analyze_file("capture.mp4".as_ref()).await?;
//!
//!     let mut session = PlaybackSession::default();
//!     session.load_run(AnalysisRun::from_response(response));
//!
//!     if let Some(frame) = session.handle(ClockEvent::TimeUpdate(12.5)) {
//!         for alert in &frame.fired {
//!             println!("{alert}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod alert_log;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod overlay;
pub mod session;
pub mod sync;

pub use alert_log::{AlertEntry, AlertLog};
pub use client::AnalysisClient;
pub use clock::{ClockEvent, PlaybackClock, PlaybackState, ScriptedClock, Seek};
pub use config::Config;
pub use error::{Error, Result};
pub use event::{AnalysisResponse, AnalysisRun, Category, EventStore, Rect, RunSummary, TimedEvent};
pub use overlay::{Color, DrawCommand, OverlayRenderer, OverlayStyle, Surface};
pub use session::{Frame, PlaybackSession, Status};
pub use sync::{FiredState, Synchronizer, TickOutcome, DEFAULT_TOLERANCE};

/// Version of safeview
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
