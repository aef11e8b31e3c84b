//! Recorded location traces, one sample per line:
//!
//! ```text
//! +LOC:<t_ms>,<lat>,<lng>,<floor>,<speed>,<accuracy>,<orientation>,<orientation_accuracy>
//! ```
//!
//! `nan` stands for an unknown latitude or longitude. Blank lines and lines
//! starting with `#` are ignored.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{space0, u64},
    combinator::{all_consuming, map, value},
    error::Error,
    number::complete::double,
    sequence::{preceded, terminated, tuple},
    Finish, IResult,
};

use std::{
    fmt::{self, Display},
    fs,
    path::Path,
    str::FromStr,
    time::{Duration, Instant},
};

use log::{debug, info};

use crate::error::GuideError;
use crate::location::{Location, LocationEvent, LocationHub};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceEvent {
    /// Milliseconds since the start of the recording.
    pub t_ms: u64,
    pub location: Location,
}

fn parse_coordinate(s: &str) -> IResult<&str, f64> {
    alt((value(f64::NAN, tag_no_case("nan")), double))(s)
}

fn parse_trace_event(s: &str) -> IResult<&str, TraceEvent> {
    map(
        tuple((
            preceded(tag("+LOC:"), u64),
            preceded(tag(","), parse_coordinate),
            preceded(tag(","), parse_coordinate),
            preceded(tag(","), double),
            preceded(tag(","), double),
            preceded(tag(","), double),
            preceded(tag(","), double),
            preceded(tag(","), double),
        )),
        |(t_ms, lat, lng, floor, speed, accuracy, orientation, orientation_accuracy)| TraceEvent {
            t_ms,
            location: Location {
                lat,
                lng,
                floor,
                speed,
                accuracy,
                orientation,
                orientation_accuracy,
            },
        },
    )(s)
}

impl FromStr for TraceEvent {
    type Err = Error<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match all_consuming(terminated(parse_trace_event, space0))(s.trim_start()).finish() {
            Ok((_remaining, event)) => Ok(event),
            Err(Error { input, code }) => Err(Error {
                input: input.to_string(),
                code,
            }),
        }
    }
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = &self.location;
        write!(
            f,
            "+LOC:{},{},{},{},{},{},{},{}",
            self.t_ms, l.lat, l.lng, l.floor, l.speed, l.accuracy, l.orientation, l.orientation_accuracy
        )
    }
}

impl TraceEvent {
    /// The sample as it would have been received, `base` being the moment
    /// the recording started.
    pub fn at(&self, base: Instant) -> LocationEvent {
        LocationEvent::new(self.location, base + Duration::from_millis(self.t_ms))
    }
}

/// Parses a whole trace. Line numbers in errors start at 1.
pub fn parse_trace(text: &str) -> Result<Vec<TraceEvent>, GuideError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            line.parse::<TraceEvent>().map_err(|e| GuideError::TraceError {
                line: i + 1,
                input: e.input,
            })
        })
        .collect()
}

pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, GuideError> {
    let events = parse_trace(&fs::read_to_string(path.as_ref())?)?;
    info!("{} samples read from {}", events.len(), path.as_ref().display());
    Ok(events)
}

pub fn write_trace(path: impl AsRef<Path>, events: &[TraceEvent]) -> Result<(), GuideError> {
    let text: String = events.iter().map(|e| format!("{e}\n")).collect();
    fs::write(path, text)?;
    Ok(())
}

/// Publishes `events` to `hub`. With a `speed` the recording's pacing is
/// reproduced, `2.0` playing it twice as fast; without one the events go
/// out back to back but still carry their recorded timestamps.
pub fn replay(events: &[TraceEvent], hub: &LocationHub, speed: Option<f64>) {
    let base = Instant::now();
    let mut last_ms = 0;
    for event in events {
        if let Some(speed) = speed.filter(|s| *s > 0.0) {
            let gap = event.t_ms.saturating_sub(last_ms) as f64 / 1000.0 / speed;
            spin_sleep::sleep(Duration::from_secs_f64(gap));
        }
        last_ms = event.t_ms;
        debug!("replaying {}", event.location);
        hub.publish(event.at(base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_1() {
        let s = "+LOC:1500,35.6192,139.7762,1.0,0.8,2.5,90.0,15.0";

        let (leftover, res) = parse_trace_event(s).unwrap();

        assert_eq!(leftover, "");
        assert_eq!(res.t_ms, 1500);
        assert_eq!(res.location.lat, 35.6192);
        assert_eq!(res.location.lng, 139.7762);
        assert_eq!(res.location.floor, 1.0);
        assert_eq!(res.location.speed, 0.8);
        assert_eq!(res.location.accuracy, 2.5);
        assert_eq!(res.location.orientation, 90.0);
        assert_eq!(res.location.orientation_accuracy, 15.0);
    }

    #[test]
    fn test_nan_coordinates() {
        let res: TraceEvent = "+LOC:0,NaN,nan,-1,0,0,0,0".parse().unwrap();
        assert!(!res.location.is_valid());
        assert_eq!(res.location.floor, -1.0);
        assert_eq!(res.location.human_floor(), -1);
    }

    #[test]
    fn test_trailing_garbage() {
        assert!("+LOC:0,1,2,3,4,5,6,7 extra".parse::<TraceEvent>().is_err());
        assert!("+LOC:0,1,2,3,4,5,6".parse::<TraceEvent>().is_err());
        assert!("+UUDF:0,1,2,3,4,5,6,7".parse::<TraceEvent>().is_err());
    }

    #[test]
    fn test_trace_skips_comments() {
        let text = "# recorded at the entrance\n\
                    +LOC:0,35.6189,139.7760,1,0,0,0,0\n\
                    \n\
                    +LOC:1000,35.6190,139.7761,1,0,0,0,0\n";
        let events = parse_trace(text).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].t_ms, 1000);
    }

    #[test]
    fn test_trace_error_has_line() {
        let text = "+LOC:0,35.6189,139.7760,1,0,0,0,0\n# ok\n+LOC:1000,35.6190\n";
        match parse_trace(text) {
            Err(GuideError::TraceError { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a trace error, got {other:?}"),
        }
    }

    #[test]
    fn test_file_and_replay() {
        let events = vec![
            TraceEvent {
                t_ms: 0,
                location: Location::at(35.6189, 139.776).on_floor(1.0),
            },
            TraceEvent {
                t_ms: 20,
                location: Location::at(35.619, 139.7761).on_floor(1.0),
            },
        ];
        let file = tempfile::NamedTempFile::new().unwrap();
        write_trace(file.path(), &events).unwrap();
        let read = read_trace(file.path()).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].location.lat, 35.619);

        let hub = LocationHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = hub.subscribe(move |e| sink.lock().unwrap().push(e.at));
        replay(&read, &hub, Some(10.0));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1] - seen[0], Duration::from_millis(20));
    }
}
