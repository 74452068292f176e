//! Timestamped analysis events
//!
//! A [`TimedEvent`] is the parsed, immutable form of one entry of the
//! analysis service's `events` array. Parsing is lenient about optional
//! fields and strict about `time`: a record without a usable timestamp never
//! becomes an event.

pub mod store;
pub mod wire;

use std::fmt;

use self::wire::RawEvent;

pub use store::{AnalysisRun, EventStore};
pub use wire::{AnalysisResponse, RunSummary, VisibilityBreakdown};

/// Event category tag.
///
/// The set is open: unknown tags from the service are kept verbatim in
/// [`Category::Other`] and rendered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Generic alert (also used when a record carries no alert type)
    #[default]
    Alert,
    CriticalRegion,
    ToolProximity,
    HighToolSpeed,
    Other(String),
}

impl Category {
    /// Parse a service-provided tag. Matching is exact; anything else is kept.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "ALERT" => Self::Alert,
            "CRITICAL_REGION" => Self::CriticalRegion,
            "TOOL_PROXIMITY" => Self::ToolProximity,
            "HIGH_TOOL_SPEED" => Self::HighToolSpeed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Alert => "ALERT",
            Self::CriticalRegion => "CRITICAL_REGION",
            Self::ToolProximity => "TOOL_PROXIMITY",
            Self::HighToolSpeed => "HIGH_TOOL_SPEED",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned rectangle in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    /// Build from `[x1, y1, x2, y2]`, normalizing swapped corners.
    ///
    /// Returns `None` when any coordinate is not finite.
    pub fn from_corners(c: [f64; 4]) -> Option<Self> {
        if c.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self {
            x1: c[0].min(c[2]),
            y1: c[1].min(c[3]),
            x2: c[0].max(c[2]),
            y2: c[1].max(c[3]),
        })
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Intersect with a `width` x `height` surface anchored at the origin.
    ///
    /// Returns `None` if nothing of the rectangle remains on the surface.
    pub fn clamp_to(&self, width: f64, height: f64) -> Option<Self> {
        let clamped = Self {
            x1: self.x1.clamp(0.0, width),
            y1: self.y1.clamp(0.0, height),
            x2: self.x2.clamp(0.0, width),
            y2: self.y2.clamp(0.0, height),
        };
        (clamped.width() > 0.0 && clamped.height() > 0.0).then_some(clamped)
    }
}

/// Auxiliary per-event fields, passed through to the overlay untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    /// Visibility label (`GOOD`, `MODERATE`, `POOR`, ...)
    pub visibility: Option<String>,
    /// Visibility score, percent
    pub vis_score: Option<f64>,
    /// Why visibility was downgraded (smoke, blood, ...)
    pub vis_reason: Option<String>,
    pub risk_level: Option<String>,
    pub safety_flags: Vec<String>,
}

/// One analysis event. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    /// Seconds from the start of the video, finite and `>= 0`
    pub time: f64,
    pub category: Category,
    /// In `[0, 1]`; 0 when the service sent none
    pub confidence: f64,
    /// Primary overlay box (first detected tool)
    pub geometry: Option<Rect>,
    /// Secondary overlay box, drawn only when `geometry` is absent
    pub critical_region: Option<Rect>,
    pub annotations: Annotations,
}

impl TimedEvent {
    /// Create an event with only a timestamp and category.
    pub fn new(time: f64, category: Category) -> Self {
        Self {
            time,
            category,
            confidence: 0.0,
            geometry: None,
            critical_region: None,
            annotations: Annotations::default(),
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, rect: Rect) -> Self {
        self.geometry = Some(rect);
        self
    }

    #[must_use]
    pub fn with_critical_region(mut self, rect: Rect) -> Self {
        self.critical_region = Some(rect);
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Convert a wire record. `None` if `time` is missing, negative or not finite.
    pub fn from_raw(raw: RawEvent) -> Option<Self> {
        let time = raw.time.filter(|t| t.is_finite() && *t >= 0.0)?.abs();

        let first_alert = raw.alerts.unwrap_or_default().into_iter().next();
        let (category, confidence) = match first_alert {
            Some(alert) => (
                alert.kind.as_deref().map(Category::parse).unwrap_or_default(),
                alert.confidence.map_or(0.0, clamp_unit),
            ),
            None => (Category::default(), 0.0),
        };

        let geometry = raw
            .tools
            .unwrap_or_default()
            .into_iter()
            .find_map(|tool| tool.bbox.and_then(Rect::from_corners));

        Some(Self {
            time,
            category,
            confidence,
            geometry,
            critical_region: raw.crit_region.and_then(Rect::from_corners),
            annotations: Annotations {
                visibility: raw.visibility,
                vis_score: raw.vis_score.filter(|s| s.is_finite()),
                vis_reason: raw.vis_reason.filter(|r| !r.is_empty()),
                risk_level: raw.risk_level,
                safety_flags: raw.safety_flags.unwrap_or_default(),
            },
        })
    }

    /// Rectangle to draw: `geometry`, falling back to `critical_region`.
    pub fn overlay_rect(&self) -> Option<Rect> {
        self.geometry.or(self.critical_region)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
