// Terminal renderers for the reef.
//
// Three `Renderer` implementations, selected with `--render`:
// - `AsciiRenderer`: a header line plus one character per cell. Occupants
//   use a species glyph (lowercase when infected); empty water is shaded by
//   the current illumination.
// - `JsonLinesRenderer`: one JSON object per published status, for piping
//   into other tools.
// - `SummaryRenderer`: a single line of counts every `every` steps.
//
// `Renderer::show_status` cannot fail, so each renderer keeps the first
// write error it hits and stops writing. `finish` flushes and hands that
// error back to `main`.

use reef_sim::render::{CellView, Renderer, StatusReport};
use reef_sim::types::{Location, Species};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// One glyph per species; infected individuals are drawn in lowercase.
pub fn glyph(cell: CellView) -> char {
    let c = match cell.species {
        Species::Shark => 'S',
        Species::Dolphin => 'D',
        Species::Turtle => 'T',
        Species::Crab => 'C',
        Species::SmallFish => 'F',
        Species::Seagrass => 'G',
        Species::Algae => 'A',
        Species::Corpse => 'X',
    };
    if cell.infected { c.to_ascii_lowercase() } else { c }
}

/// Character for empty water at a given brightness.
pub fn water(shade: u8) -> char {
    match shade {
        224..=255 => ' ',
        160..=223 => '.',
        96..=159 => ':',
        _ => '#',
    }
}

/// Records the first I/O error and skips writes after it.
struct Sink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> Sink<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn write_with(&mut self, f: impl FnOnce(&mut W) -> io::Result<()>) {
        if self.error.is_none() {
            if let Err(e) = f(&mut self.out) {
                self.error = Some(e);
            }
        }
    }

    fn finish(mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => self.out.flush(),
        }
    }
}

fn header(status: &StatusReport<'_>) -> String {
    format!(
        "Step: {}  {}  Temp: {:.1}  Population: {}",
        status.step,
        status.day_label(),
        status.temperature,
        status.stats.details()
    )
}

// ---------------------------------------------------------------------------
// ASCII
// ---------------------------------------------------------------------------

pub struct AsciiRenderer<W: Write> {
    sink: Sink<W>,
    every: u64,
}

impl<W: Write> AsciiRenderer<W> {
    /// Draw every `every`th step (and always step 0).
    pub fn new(out: W, every: u64) -> Self {
        Self {
            sink: Sink::new(out),
            every: every.max(1),
        }
    }

    pub fn finish(self) -> io::Result<()> {
        self.sink.finish()
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn show_status(&mut self, status: &StatusReport<'_>) {
        if status.step % self.every != 0 {
            return;
        }
        let empty = water(status.empty_shade());
        let mut frame = header(status);
        frame.push('\n');
        for row in 0..status.field.depth() as i32 {
            for col in 0..status.field.width() as i32 {
                let c = status
                    .field
                    .cell(Location::new(row, col))
                    .map_or(empty, glyph);
                frame.push(c);
            }
            frame.push('\n');
        }
        self.sink.write_with(|out| writeln!(out, "{frame}"));
    }
}

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StatusLine<'a> {
    step: u64,
    day: &'a str,
    illumination: f64,
    temperature: f64,
    counts: BTreeMap<&'static str, usize>,
}

pub struct JsonLinesRenderer<W: Write> {
    sink: Sink<W>,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            sink: Sink::new(out),
        }
    }

    pub fn finish(self) -> io::Result<()> {
        self.sink.finish()
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn show_status(&mut self, status: &StatusReport<'_>) {
        let line = StatusLine {
            step: status.step,
            day: status.day_label(),
            illumination: status.illumination,
            temperature: status.temperature,
            counts: status.stats.counts().map(|(sp, n)| (sp.name(), n)).collect(),
        };
        self.sink.write_with(|out| {
            serde_json::to_writer(&mut *out, &line)?;
            out.write_all(b"\n")
        });
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub struct SummaryRenderer<W: Write> {
    sink: Sink<W>,
    every: u64,
}

impl<W: Write> SummaryRenderer<W> {
    pub fn new(out: W, every: u64) -> Self {
        Self {
            sink: Sink::new(out),
            every: every.max(1),
        }
    }

    pub fn finish(self) -> io::Result<()> {
        self.sink.finish()
    }
}

impl<W: Write> Renderer for SummaryRenderer<W> {
    fn show_status(&mut self, status: &StatusReport<'_>) {
        if status.step % self.every == 0 {
            let line = header(status);
            self.sink.write_with(|out| writeln!(out, "{line}"));
        }
    }
}
