//! Differential-pair trace generation.
//!
//! Generates two meandered traces, one per net of a differential pair, on a
//! fixed signal layer. Both traces follow the same staircase pattern and sit
//! at `+/-(width + gap) / 2` about the pair centreline.
//!
//! # Meander Pattern
//!
//! Starting at `(0, offset)`, each repetition emits four points:
//!
//! ```text
//!        +--+
//!        |  |
//!  o-----+  +--  ...
//!    +h  +h +h -h
//!    x   y  x  y
//! ```
//!
//! so a trace with `n` repetitions has `4n + 1` points. A count below zero
//! behaves like zero.

mod meander;

pub use meander::{meander_points, DiffPair};

use crate::edb::{DesignDatabase, EdbResult, Point, Trace};

/// Signal layer the pair is routed on.
pub const SIGNAL_LAYER: &str = "L03_SIG1";

/// Net of the positive trace.
pub const POSITIVE_NET: &str = "diff_p";

/// Net of the negative trace.
pub const NEGATIVE_NET: &str = "diff_n";

/// Where the pair centreline starts.
pub const START: Point = Point::new(0.0, 0.0);

/// Default meander segment height in mm.
pub const DEFAULT_MEANDER_HEIGHT: f64 = 0.5;

/// Default number of meander repetitions.
pub const DEFAULT_MEANDER_COUNT: i64 = 1;

/// Geometry of the differential pair, all lengths in mm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceGeometry {
    /// Trace width.
    pub width: f64,
    /// Edge-to-edge gap between the two traces.
    pub gap: f64,
    /// Segment height of the meander inside each trace.
    pub intra_height: f64,
    /// Number of meander repetitions inside each trace.
    pub intra_count: i64,
    /// Clearance to surrounding ground. Accepted but not yet used.
    pub gap_to_ground: f64,
    /// Segment height of a meander between the traces. Accepted but not yet used.
    pub inter_height: f64,
    /// Repetitions of a meander between the traces. Accepted but not yet used.
    pub inter_count: i64,
}

impl TraceGeometry {
    /// Creates geometry with the given width and gap and default meanders.
    #[must_use]
    pub const fn new(width: f64, gap: f64) -> Self {
        Self {
            width,
            gap,
            intra_height: DEFAULT_MEANDER_HEIGHT,
            intra_count: DEFAULT_MEANDER_COUNT,
            gap_to_ground: 0.0,
            inter_height: DEFAULT_MEANDER_HEIGHT,
            inter_count: DEFAULT_MEANDER_COUNT,
        }
    }

    /// Distance from the pair centreline to each trace centreline.
    #[must_use]
    pub fn offset(&self) -> f64 {
        (self.width + self.gap) / 2.0
    }

    /// Names of options that are set away from their default but have no
    /// effect on the generated geometry.
    #[must_use]
    #[allow(clippy::float_cmp)] // Defaults are exact literals
    pub fn unused_options(&self) -> Vec<&'static str> {
        let mut unused = Vec::new();
        if self.gap_to_ground != 0.0 {
            unused.push("gap_to_ground");
        }
        if self.inter_height != DEFAULT_MEANDER_HEIGHT {
            unused.push("inter_height");
        }
        if self.inter_count != DEFAULT_MEANDER_COUNT {
            unused.push("inter_count");
        }
        unused
    }
}

/// Generates the pair and creates both traces in `db`.
///
/// The positive trace is created first, then the negative one.
///
/// # Errors
///
/// Returns the first error the database reports.
pub fn add_differential_pair(
    db: &mut dyn DesignDatabase,
    geometry: &TraceGeometry,
) -> EdbResult<DiffPair> {
    let unused = geometry.unused_options();
    if !unused.is_empty() {
        tracing::debug!(options = ?unused, "Ignoring options that do not affect the pair yet");
    }

    let pair = DiffPair::generate(geometry);

    for (net, points) in [(POSITIVE_NET, &pair.positive), (NEGATIVE_NET, &pair.negative)] {
        db.create_trace(Trace::new(points.clone(), SIGNAL_LAYER, geometry.width, net))?;
        tracing::info!(
            net,
            layer = SIGNAL_LAYER,
            points = points.len(),
            width = geometry.width,
            "Created trace"
        );
    }

    Ok(pair)
}
