//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `positions.csv`: one row per source per frame
//! - `params.csv`: one row per aperture or orientation change
//! - `groups.csv`: one row per membership change

use std::fs::File;
use std::path::Path;

use csv::Writer;
use sm_engine::{FrameOutput, GroupEvent, OutputTransport, ParamUpdate, TransportStats};
use tracing::debug;

use crate::{OutputError, OutputResult};

/// Writes every frame to CSV files for offline inspection.
///
/// `OutputTransport` methods have no return value, so write errors are
/// counted as failures and the first one is kept for
/// [`take_error`][Self::take_error].
pub struct CsvTransport {
    positions:  Writer<File>,
    params:     Writer<File>,
    groups:     Writer<File>,
    /// Frame the next group event belongs to.
    next_frame: u64,
    stats:      TransportStats,
    last_error: Option<OutputError>,
    finished:   bool,
}

impl CsvTransport {
    /// Open (or create) the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut positions = Writer::from_path(dir.join("positions.csv"))?;
        positions.write_record(["frame", "time", "source", "x", "y", "z"])?;

        let mut params = Writer::from_path(dir.join("params.csv"))?;
        params.write_record(["frame", "source", "aperture", "yaw", "pitch", "roll"])?;

        let mut groups = Writer::from_path(dir.join("groups.csv"))?;
        groups.write_record(["frame", "group", "source", "action"])?;

        Ok(Self {
            positions,
            params,
            groups,
            next_frame: 1,
            stats:      TransportStats::default(),
            last_error: None,
            finished:   false,
        })
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush all three files.  Idempotent.
    pub fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.positions.flush()?;
        self.params.flush()?;
        self.groups.flush()?;
        Ok(())
    }

    fn record(&mut self, result: csv::Result<()>) {
        match result {
            Ok(()) => self.stats.sent += 1,
            Err(e) => {
                self.stats.failed += 1;
                debug!(error = %e, "CSV row dropped");
                // Keep only the first error.
                if self.last_error.is_none() {
                    self.last_error = Some(e.into());
                }
            }
        }
    }
}

impl OutputTransport for CsvTransport {
    fn send_frame(&mut self, frame: &FrameOutput<'_>) {
        let f = frame.frame.0.to_string();
        let t = frame.time.to_string();
        for (id, p) in frame.positions {
            let row = [
                f.clone(),
                t.clone(),
                id.0.to_string(),
                p.x.to_string(),
                p.y.to_string(),
                p.z.to_string(),
            ];
            let r = self.positions.write_record(&row);
            self.record(r);
        }
        for update in frame.params {
            let row = match *update {
                ParamUpdate::Aperture { id, value } => {
                    [f.clone(), id.0.to_string(), value.to_string(), String::new(), String::new(), String::new()]
                }
                ParamUpdate::Orientation { id, value } => [
                    f.clone(),
                    id.0.to_string(),
                    String::new(),
                    value.yaw.to_string(),
                    value.pitch.to_string(),
                    value.roll.to_string(),
                ],
            };
            let r = self.params.write_record(&row);
            self.record(r);
        }
        self.next_frame = frame.frame.0 + 1;
    }

    fn send_group_event(&mut self, event: &GroupEvent) {
        let (group, id, action) = match event {
            GroupEvent::Added { group, id } => (group, id, "add"),
            GroupEvent::Removed { group, id } => (group, id, "remove"),
        };
        let row = [self.next_frame.to_string(), group.clone(), id.0.to_string(), action.to_owned()];
        let r = self.groups.write_record(&row);
        self.record(r);
    }

    fn stats(&self) -> TransportStats {
        self.stats
    }
}
