//! TerminalRenderer: flushes a canvas to a real terminal.
//!
//! The first frame (and any frame after a resize or [`TerminalRenderer::invalidate`])
//! is a full redraw; later frames only rewrite the runs of cells that changed.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::canvas::{Canvas, Rgb, Style};

pub struct TerminalRenderer {
    out: io::Stdout,
    previous: Option<Canvas>,
    scratch: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            previous: None,
            scratch: Vec::with_capacity(32 * 1024),
        }
    }

    /// Raw mode, alternate screen, hidden cursor.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.scratch.clear();
        self.scratch.queue(terminal::EnterAlternateScreen)?;
        self.scratch.queue(cursor::Hide)?;
        self.scratch.queue(terminal::DisableLineWrap)?;
        self.flush()
    }

    /// Undo [`TerminalRenderer::enter`].
    pub fn exit(&mut self) -> Result<()> {
        self.scratch.clear();
        self.scratch.queue(ResetColor)?;
        self.scratch.queue(SetAttribute(Attribute::Reset))?;
        self.scratch.queue(terminal::EnableLineWrap)?;
        self.scratch.queue(cursor::Show)?;
        self.scratch.queue(terminal::LeaveAlternateScreen)?;
        self.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next frame to be a full redraw (e.g. after a resize).
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Draw `canvas`, diffing against the last presented frame.
    pub fn present(&mut self, canvas: &Canvas) -> Result<()> {
        self.scratch.clear();
        let same_size = matches!(
            &self.previous,
            Some(prev) if prev.width() == canvas.width() && prev.height() == canvas.height()
        );
        match self.previous.as_mut() {
            Some(prev) if same_size => {
                encode_changes_into(prev, canvas, &mut self.scratch)?;
                prev.clone_from(canvas);
            }
            _ => {
                encode_frame_into(canvas, &mut self.scratch)?;
            }
        }
        if !same_size {
            self.previous = Some(canvas.clone());
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.out.write_all(&self.scratch)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Encode a full redraw of `canvas` into `out` without touching stdout.
pub fn encode_frame_into(canvas: &Canvas, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut pen = Pen::default();
    for y in 0..canvas.height() {
        out.queue(cursor::MoveTo(0, y))?;
        pen.write_run(canvas, 0, y, canvas.width(), out)?;
    }
    pen.finish(out)
}

/// Encode only the changed runs between `prev` and `next` into `out`.
pub fn encode_changes_into(prev: &Canvas, next: &Canvas, out: &mut Vec<u8>) -> Result<()> {
    let mut pen = Pen::default();
    for (x, y, len) in changed_runs(prev, next) {
        out.queue(cursor::MoveTo(x, y))?;
        pen.write_run(next, x, y, len, out)?;
    }
    pen.finish(out)
}

/// Tracks the style last sent so unchanged styles are not re-emitted.
#[derive(Default)]
struct Pen {
    current: Option<Style>,
}

impl Pen {
    fn write_run(&mut self, canvas: &Canvas, x: u16, y: u16, len: u16, out: &mut Vec<u8>) -> Result<()> {
        for cx in x..x.saturating_add(len) {
            let glyph = canvas.get(cx, y).unwrap_or_default();
            if self.current != Some(glyph.style) {
                queue_style(out, glyph.style)?;
                self.current = Some(glyph.style);
            }
            out.queue(Print(glyph.ch))?;
        }
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        out.queue(ResetColor)?;
        out.queue(SetAttribute(Attribute::Reset))?;
        self.current = None;
        Ok(())
    }
}

fn queue_style(out: &mut Vec<u8>, style: Style) -> Result<()> {
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(SetForegroundColor(to_color(style.fg)))?;
    out.queue(SetBackgroundColor(to_color(style.bg)))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    if style.underline {
        out.queue(SetAttribute(Attribute::Underlined))?;
    }
    Ok(())
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Maximal horizontal runs `(x, y, len)` where the two canvases differ.
/// Canvases of different size are treated as entirely changed.
fn changed_runs(prev: &Canvas, next: &Canvas) -> Vec<(u16, u16, u16)> {
    let (w, h) = (next.width(), next.height());
    if prev.width() != w || prev.height() != h {
        return (0..h).map(|y| (0, y, w)).collect();
    }

    let mut runs = Vec::new();
    for y in 0..h {
        let mut start: Option<u16> = None;
        for x in 0..w {
            let differs = prev.get(x, y) != next.get(x, y);
            match (differs, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((s, y, x - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, y, w - s));
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_runs_coalesce_neighbours() {
        let prev = Canvas::new(6, 2);
        let mut next = prev.clone();
        for x in 1..=3 {
            next.put(x, 0, 'X', Style::default());
        }
        next.put(5, 1, 'Y', Style::default());

        assert_eq!(changed_runs(&prev, &next), vec![(1, 0, 3), (5, 1, 1)]);
        assert!(changed_runs(&next, &next).is_empty());
    }

    #[test]
    fn test_resized_canvas_is_fully_dirty() {
        let prev = Canvas::new(3, 1);
        let next = Canvas::new(4, 2);
        assert_eq!(changed_runs(&prev, &next), vec![(0, 0, 4), (0, 1, 4)]);
    }

    #[test]
    fn test_encoders_emit_changed_glyphs_only() {
        let prev = Canvas::new(4, 1);
        let mut next = prev.clone();
        next.text(0, 0, "ab", Style::default().bold());

        let mut full = Vec::new();
        encode_frame_into(&next, &mut full).unwrap();
        let mut diff = Vec::new();
        encode_changes_into(&prev, &next, &mut diff).unwrap();

        let diff_text = String::from_utf8_lossy(&diff);
        assert!(diff_text.contains("ab"));
        assert!(diff.len() < full.len());

        let mut none = Vec::new();
        encode_changes_into(&next, &next, &mut none).unwrap();
        assert!(!String::from_utf8_lossy(&none).contains('a'));
    }
}
