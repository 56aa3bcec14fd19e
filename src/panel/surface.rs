//! Render surfaces consuming rendered panels.

use std::io::Write;

use arrow::json::ArrayWriter;
use arrow::record_batch::RecordBatch;
use serde_json::{Map, Value as Json, json};

use crate::error::{Error, Result};
use crate::panel::RenderedPanel;

/// Where rendered panels end up
pub trait RenderSurface {
    /// Draw a panel's chart from its derived table
    fn draw(&mut self, panel: &RenderedPanel) -> Result<()>;

    /// Show that a panel could not be rendered
    fn draw_error(&mut self, panel_id: &str, error: &Error) -> Result<()>;
}

/// Writes one JSON object per panel, one per line
#[derive(Debug)]
pub struct JsonLinesSurface<W: Write> {
    out: W,
    include_rows: bool,
}

impl<W: Write> JsonLinesSurface<W> {
    /// A surface writing chart specs together with their rows
    pub const fn new(out: W) -> Self {
        Self {
            out,
            include_rows: true,
        }
    }

    /// Write chart specs only
    #[must_use]
    pub const fn without_rows(mut self) -> Self {
        self.include_rows = false;
        self
    }

    /// The underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &Json) -> Result<()> {
        serde_json::to_writer(&mut self.out, line)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> RenderSurface for JsonLinesSurface<W> {
    fn draw(&mut self, panel: &RenderedPanel) -> Result<()> {
        let mut line = Map::new();
        line.insert("panel".into(), Json::from(panel.panel_id.as_str()));
        line.insert("chart".into(), serde_json::to_value(&panel.spec)?);
        if self.include_rows {
            line.insert("rows".into(), rows_to_json(panel.table.batch())?);
        }
        self.write_line(&Json::Object(line))
    }

    fn draw_error(&mut self, panel_id: &str, error: &Error) -> Result<()> {
        self.write_line(&json!({
            "panel": panel_id,
            "error": error.to_string(),
        }))
    }
}

/// Rows of a batch as a JSON array of objects
pub fn rows_to_json(batch: &RecordBatch) -> Result<Json> {
    if batch.num_rows() == 0 {
        return Ok(Json::Array(Vec::new()));
    }
    let mut writer = ArrayWriter::new(Vec::new());
    writer.write(batch)?;
    writer.finish()?;
    Ok(serde_json::from_slice(&writer.into_inner())?)
}
