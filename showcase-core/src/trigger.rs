/// Scroll trigger regions: offset parsing and scroll-to-progress mapping
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, map, opt, value, verify},
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MissingElementError, OffsetParseError};
use crate::page::Page;

/// A reference line, either on the trigger element or on the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    Percent(f32),
    Pixels(f32),
}

impl Edge {
    /// Distance of this edge from the top of a box of the given length
    pub fn offset_in(self, length: f32) -> f32 {
        match self {
            Edge::Top => 0.0,
            Edge::Center => length * 0.5,
            Edge::Bottom => length,
            Edge::Percent(p) => length * p / 100.0,
            Edge::Pixels(px) => px,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Top => write!(f, "top"),
            Edge::Center => write!(f, "center"),
            Edge::Bottom => write!(f, "bottom"),
            Edge::Percent(p) => write!(f, "{p}%"),
            Edge::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// "`<element edge> <viewport edge>`": the scroll position where the two lines meet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerOffset {
    pub element: Edge,
    pub viewport: Edge,
}

impl TriggerOffset {
    pub fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll position at which this offset is reached for an element box
    pub fn scroll_position(&self, top: f32, height: f32, viewport_height: f32) -> f32 {
        top + self.element.offset_in(height) - self.viewport.offset_in(viewport_height)
    }
}

/// nom's float also reads `nan` and `inf`; those would poison the region
fn finite(input: &str) -> IResult<&str, f32> {
    verify(float, |v: &f32| v.is_finite())(input)
}

fn parse_edge(input: &str) -> IResult<&str, Edge> {
    alt((
        value(Edge::Top, tag("top")),
        value(Edge::Center, tag("center")),
        value(Edge::Bottom, tag("bottom")),
        map(terminated(finite, tag("%")), Edge::Percent),
        map(terminated(finite, opt(tag("px"))), Edge::Pixels),
    ))(input)
}

fn parse_offset(input: &str) -> IResult<&str, TriggerOffset> {
    let (input, element) = preceded(multispace0, parse_edge)(input)?;
    let (input, viewport) = preceded(multispace1, parse_edge)(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, TriggerOffset::new(element, viewport)))
}

impl FromStr for TriggerOffset {
    type Err = OffsetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(parse_offset)(s)
            .map(|(_, offset)| offset)
            .map_err(|e| OffsetParseError {
                input: s.to_string(),
                reason: format!("{:?}", e),
            })
    }
}

impl TryFrom<String> for TriggerOffset {
    type Error = OffsetParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TriggerOffset> for String {
    fn from(offset: TriggerOffset) -> Self {
        offset.to_string()
    }
}

impl fmt::Display for TriggerOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// How animation progress follows scroll progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScrubRepr", into = "ScrubRepr")]
pub enum Scrub {
    /// Progress is the scroll progress, reversible 1:1
    Exact,
    /// Progress trails scroll progress by roughly this many seconds
    Smoothed(f32),
}

/// `true` or a lag in seconds, as written in config files
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum ScrubRepr {
    Flag(bool),
    Lag(f32),
}

impl TryFrom<ScrubRepr> for Scrub {
    type Error = String;

    fn try_from(repr: ScrubRepr) -> Result<Self, Self::Error> {
        match repr {
            ScrubRepr::Flag(true) => Ok(Scrub::Exact),
            ScrubRepr::Flag(false) => Err("scroll keyframes must scrub".to_string()),
            ScrubRepr::Lag(lag) if lag.is_finite() && lag > 0.0 => Ok(Scrub::Smoothed(lag)),
            ScrubRepr::Lag(lag) => Err(format!("scrub lag must be a positive number of seconds, got {lag}")),
        }
    }
}

impl From<Scrub> for ScrubRepr {
    fn from(scrub: Scrub) -> Self {
        match scrub {
            Scrub::Exact => ScrubRepr::Flag(true),
            Scrub::Smoothed(lag) => ScrubRepr::Lag(lag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollTriggerSpec {
    /// Selector of the element whose position drives the region
    pub trigger: String,
    pub start: TriggerOffset,
    pub end: TriggerOffset,
    pub scrub: Scrub,
}

impl ScrollTriggerSpec {
    /// Turn offsets into absolute scroll positions for the current layout
    pub fn resolve<P: Page + ?Sized>(&self, page: &P) -> Result<ResolvedTrigger, MissingElementError> {
        let rect = page
            .element_rect(&self.trigger)
            .ok_or_else(|| MissingElementError::new(&self.trigger))?;
        let viewport = page.viewport_height();
        Ok(ResolvedTrigger {
            start: self.start.scroll_position(rect.top, rect.height, viewport),
            end: self.end.scroll_position(rect.top, rect.height, viewport),
        })
    }
}

/// A trigger region in absolute scroll positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTrigger {
    pub start: f32,
    pub end: f32,
}

impl ResolvedTrigger {
    /// 0 at or before `start`, 1 at or after `end`, linear in between
    pub fn progress(&self, scroll_y: f32) -> f32 {
        let span = self.end - self.start;
        if span <= f32::EPSILON {
            return if scroll_y >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.start) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePage;

    #[test]
    fn test_parse_keyword_offsets() {
        let offset: TriggerOffset = "top bottom".parse().unwrap();
        assert_eq!(offset, TriggerOffset::new(Edge::Top, Edge::Bottom));
        let offset: TriggerOffset = "  center top ".parse().unwrap();
        assert_eq!(offset, TriggerOffset::new(Edge::Center, Edge::Top));
    }

    #[test]
    fn test_parse_numeric_offsets() {
        let offset: TriggerOffset = "top 80%".parse().unwrap();
        assert_eq!(offset, TriggerOffset::new(Edge::Top, Edge::Percent(80.0)));
        let offset: TriggerOffset = "bottom 25px".parse().unwrap();
        assert_eq!(offset, TriggerOffset::new(Edge::Bottom, Edge::Pixels(25.0)));
        let offset: TriggerOffset = "10 -5".parse().unwrap();
        assert_eq!(offset, TriggerOffset::new(Edge::Pixels(10.0), Edge::Pixels(-5.0)));
    }

    #[test]
    fn test_reject_garbage_offsets() {
        for bad in [
            "",
            "top",
            "middle bottom",
            "top bottom left",
            "top%",
            "nan top",
            "inf bottom",
            "top nan%",
            "center -infinity",
        ] {
            assert!(bad.parse::<TriggerOffset>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_offset_display_round_trips() {
        let offset: TriggerOffset = "top 80%".parse().unwrap();
        assert_eq!(offset.to_string(), "top 80%");
    }

    #[test]
    fn test_scrub_from_json() {
        let exact: Scrub = serde_json::from_str("true").unwrap();
        assert_eq!(exact, Scrub::Exact);
        let lag: Scrub = serde_json::from_str("1").unwrap();
        assert_eq!(lag, Scrub::Smoothed(1.0));
        assert!(serde_json::from_str::<Scrub>("false").is_err());
        assert!(serde_json::from_str::<Scrub>("0").is_err());
        assert!(serde_json::from_str::<Scrub>("-0.5").is_err());
    }

    #[test]
    fn test_resolve_against_layout() {
        let mut page = FakePage::new(800.0);
        page.add_element(".second", 1000.0, 900.0);
        let spec = ScrollTriggerSpec {
            trigger: ".second".to_string(),
            start: "top bottom".parse().unwrap(),
            end: "top top".parse().unwrap(),
            scrub: Scrub::Exact,
        };
        let resolved = spec.resolve(&page).unwrap();
        assert_eq!(resolved, ResolvedTrigger { start: 200.0, end: 1000.0 });
    }

    #[test]
    fn test_resolve_missing_element() {
        let page = FakePage::new(800.0);
        let spec = ScrollTriggerSpec {
            trigger: ".nowhere".to_string(),
            start: "top bottom".parse().unwrap(),
            end: "top top".parse().unwrap(),
            scrub: Scrub::Exact,
        };
        assert_eq!(spec.resolve(&page), Err(MissingElementError::new(".nowhere")));
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let region = ResolvedTrigger { start: 200.0, end: 1000.0 };
        assert_eq!(region.progress(200.0), 0.0);
        assert_eq!(region.progress(1000.0), 1.0);
        assert_eq!(region.progress(-50.0), 0.0);
        assert_eq!(region.progress(5000.0), 1.0);

        let mut last = 0.0;
        for y in (200..=1000).step_by(20) {
            let p = region.progress(y as f32);
            assert!(p >= last);
            last = p;
        }
        assert!((region.progress(600.0) - 0.5).abs() < 1e-6);
    }
}
