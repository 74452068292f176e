//! Safety overlay rendering
//!
//! [`OverlayRenderer::render`] turns the active event (if any) into a list
//! of [`DrawCommand`]s for a frame-aligned surface. It keeps no state
//! between calls; the host replays the commands on its canvas every tick.
//!
//! Layout for an active event:
//!
//! - one stroked box from the event's tool box, or its critical region when
//!   no tool was detected;
//! - a vertical text stack: visibility, risk level, procedure label, then
//!   one line per safety flag.

pub mod style;

use std::fmt;

use crate::event::{Rect, TimedEvent};

pub use style::{Color, OverlayStyle, ParseColorError, Severity};

/// Pixel size of the drawing surface (matches the video frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// One drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear the whole surface
    Clear { width: u32, height: u32 },
    /// Stroke a rectangle outline
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
    /// Draw text with its baseline starting at (`x`, `y`)
    FillText {
        text: String,
        x: f64,
        y: f64,
        color: Color,
        font: String,
    },
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear { width, height } => write!(f, "clear {width}x{height}"),
            Self::StrokeRect {
                rect,
                color,
                line_width,
            } => write!(
                f,
                "rect ({:.0},{:.0})-({:.0},{:.0}) {color} w={line_width}",
                rect.x1, rect.y1, rect.x2, rect.y2
            ),
            Self::FillText {
                text,
                x,
                y,
                color,
                font,
            } => write!(f, "text ({x:.0},{y:.0}) {color} [{font}] {text:?}"),
        }
    }
}

/// Stateless overlay renderer.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Draw commands for one tick. Always starts with a full clear.
    pub fn render(&self, active: Option<&TimedEvent>, surface: Surface) -> Vec<DrawCommand> {
        let mut commands = vec![DrawCommand::Clear {
            width: surface.width,
            height: surface.height,
        }];

        let Some(event) = active else {
            return commands;
        };

        let on_surface = event
            .overlay_rect()
            .and_then(|r| r.clamp_to(f64::from(surface.width), f64::from(surface.height)));
        if let Some(rect) = on_surface {
            commands.push(DrawCommand::StrokeRect {
                rect,
                color: self.style.stroke_color,
                line_width: self.style.stroke_width,
            });
        }

        let font = self.style.font();
        let mut y = self.style.text_y;
        for (text, color) in self.text_lines(event) {
            commands.push(DrawCommand::FillText {
                text,
                x: self.style.text_x,
                y,
                color,
                font: font.clone(),
            });
            y += self.style.line_height;
        }

        commands
    }

    /// The text stack for an event, top to bottom, with colors.
    fn text_lines(&self, event: &TimedEvent) -> Vec<(String, Color)> {
        let notes = &event.annotations;
        let mut lines = Vec::with_capacity(3 + notes.safety_flags.len());

        let visibility = notes.visibility.as_deref().unwrap_or("N/A");
        let mut text = format!("Visibility: {visibility}");
        if let Some(reason) = &notes.vis_reason {
            text.push_str(&format!(" ({reason})"));
        }
        if let Some(score) = notes.vis_score {
            text.push_str(&format!(" | {score:.0}%"));
        }
        lines.push((text, self.style.color_for(visibility)));

        let risk = notes.risk_level.as_deref().unwrap_or("N/A");
        lines.push((format!("Risk: {risk}"), self.style.color_for(risk)));

        lines.push((self.style.procedure_label.clone(), self.style.neutral_color));

        for flag in &notes.safety_flags {
            lines.push((flag.clone(), self.style.color_for(flag)));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Annotations, Category};

    fn annotated() -> TimedEvent {
        TimedEvent::new(2.0, Category::ToolProximity)
            .with_geometry(Rect::from_corners([100.0, 50.0, 300.0, 250.0]).unwrap())
            .with_annotations(Annotations {
                visibility: Some("POOR".into()),
                vis_score: Some(38.4),
                vis_reason: Some("smoke".into()),
                risk_level: Some("HIGH".into()),
                safety_flags: vec!["TOOL COLLISION RISK".into(), "FAST TOOL MOVEMENT".into()],
            })
    }

    #[test]
    fn test_none_only_clears() {
        let renderer = OverlayRenderer::default();
        let commands = renderer.render(None, Surface::new(640, 360));
        assert_eq!(
            commands,
            vec![DrawCommand::Clear {
                width: 640,
                height: 360
            }]
        );
    }

    #[test]
    fn test_full_layout() {
        let renderer = OverlayRenderer::default();
        let commands = renderer.render(Some(&annotated()), Surface::new(1280, 720));

        assert_eq!(commands.len(), 1 + 1 + 3 + 2);
        assert!(matches!(commands[0], DrawCommand::Clear { .. }));
        match &commands[1] {
            DrawCommand::StrokeRect { rect, color, line_width } => {
                assert_eq!((rect.x1, rect.y2), (100.0, 250.0));
                assert_eq!(*color, Color::CYAN);
                assert_eq!(*line_width, 2.0);
            }
            other => panic!("expected rect, got {other:?}"),
        }

        let texts: Vec<(&str, f64, Color)> = commands[2..]
            .iter()
            .map(|c| match c {
                DrawCommand::FillText { text, y, color, .. } => (text.as_str(), *y, *color),
                other => panic!("expected text, got {other:?}"),
            })
            .collect();

        assert_eq!(texts[0], ("Visibility: POOR (smoke) | 38%", 40.0, Color::RED));
        assert_eq!(texts[1], ("Risk: HIGH", 80.0, Color::RED));
        assert_eq!(texts[2], ("Procedure: Laparoscopic Surgery", 120.0, Color::WHITE));
        assert_eq!(texts[3], ("TOOL COLLISION RISK", 160.0, Color::WHITE));
        assert_eq!(texts[4].1, 200.0);
    }

    #[test]
    fn test_critical_region_fallback() {
        let region = Rect::from_corners([10.0, 10.0, 60.0, 60.0]).unwrap();
        let event = TimedEvent::new(1.0, Category::CriticalRegion).with_critical_region(region);
        let commands = OverlayRenderer::default().render(Some(&event), Surface::default());
        assert!(matches!(
            commands[1],
            DrawCommand::StrokeRect { rect, .. } if rect == region
        ));
    }

    #[test]
    fn test_without_geometry_draws_text_only() {
        let event = TimedEvent::new(1.0, Category::Alert);
        let commands = OverlayRenderer::default().render(Some(&event), Surface::default());
        assert_eq!(commands.len(), 4);
        assert!(commands[1..]
            .iter()
            .all(|c| matches!(c, DrawCommand::FillText { .. })));
        assert!(matches!(
            &commands[1],
            DrawCommand::FillText { text, color, .. } if text == "Visibility: N/A" && *color == Color::WHITE
        ));
    }

    #[test]
    fn test_box_is_clamped_to_surface() {
        let event = TimedEvent::new(1.0, Category::Alert)
            .with_geometry(Rect::from_corners([600.0, 300.0, 900.0, 500.0]).unwrap());
        let commands = OverlayRenderer::default().render(Some(&event), Surface::new(640, 360));
        assert!(matches!(
            commands[1],
            DrawCommand::StrokeRect { rect, .. } if rect.x2 == 640.0 && rect.y2 == 360.0
        ));
    }

    #[test]
    fn test_display_format() {
        let text = DrawCommand::FillText {
            text: "Risk: LOW".into(),
            x: 30.0,
            y: 80.0,
            color: Color::GREEN,
            font: "24px Arial".into(),
        };
        assert_eq!(text.to_string(), "text (30,80) #22C55E [24px Arial] \"Risk: LOW\"");
        assert_eq!(
            DrawCommand::Clear { width: 2, height: 1 }.to_string(),
            "clear 2x1"
        );
    }
}
