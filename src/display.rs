use std::{
    fmt::Write as _,
    io::{
        self,
        Stdout,
        Write,
    },
};

use crate::{
    BYTES_PER_PIXEL,
    DisplayError,
};

/// Pixel representation a display wants to be handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout
{
    /// Packed R,G,B bytes, the container's own layout.
    Rgb24,
    /// One `0x00RRGGBB` word per pixel, as most framebuffer windows take.
    Xrgb32,
}

pub enum FramePixels<'a>
{
    Rgb24(&'a [u8]),
    Xrgb32(&'a [u32]),
}

impl FramePixels<'_>
{
    fn rgb_at(
        &self,
        index: usize,
    ) -> (u8, u8, u8)
    {
        match self
        {
            Self::Rgb24(data) =>
            {
                let begin = index * BYTES_PER_PIXEL;
                match data.get(begin..begin + BYTES_PER_PIXEL)
                {
                    Some(&[r, g, b]) => (r, g, b),
                    _ => (0, 0, 0),
                }
            },
            Self::Xrgb32(data) => data
                .get(index)
                .map(|&px| ((px >> 16) as u8, (px >> 8) as u8, px as u8))
                .unwrap_or((0, 0, 0)),
        }
    }
}

/// Something that can put frames on screen.
///
/// The presenter calls `open` once before the first frame and `close` once
/// when playback ends, whatever the reason.
pub trait FrameDisplay
{
    fn layout(&self) -> PixelLayout
    {
        PixelLayout::Rgb24
    }

    fn open(
        &mut self,
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError>;

    fn present(
        &mut self,
        pixels: FramePixels<'_>,
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError>;

    /// Polled once per presenter tick; `true` ends playback.
    fn quit_requested(&mut self) -> bool;

    fn close(&mut self);
}

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const CLEAR_SCREEN: &str = "\x1b[2J";
const CURSOR_HOME: &str = "\x1b[H";
const RESET_COLORS: &str = "\x1b[0m";
const UPPER_HALF_BLOCK: char = '\u{2580}';

/// Draws frames with 24-bit ANSI colors, two pixel rows per text row.
pub struct TerminalDisplay<W: Write = Stdout>
{
    out: W,
    is_open: bool,
    presented: u64,
    frame_limit: Option<u64>,
}

impl TerminalDisplay<Stdout>
{
    pub fn stdout() -> TerminalDisplay<Stdout>
    {
        TerminalDisplay::new(io::stdout())
    }
}

impl<W: Write> TerminalDisplay<W>
{
    pub fn new(out: W) -> TerminalDisplay<W>
    {
        TerminalDisplay {
            out,
            is_open: false,
            presented: 0,
            frame_limit: None,
        }
    }

    /// Requests a quit after `limit` frames have been drawn.
    pub fn with_frame_limit(
        mut self,
        limit: u64,
    ) -> TerminalDisplay<W>
    {
        self.frame_limit = Some(limit);
        self
    }

    pub fn into_inner(self) -> W
    {
        self.out
    }

    fn render(
        pixels: &FramePixels<'_>,
        width: usize,
        height: usize,
    ) -> String
    {
        // Each cell is roughly "\x1b[38;2;r;g;b;48;2;r;g;bm" plus the glyph
        let mut text = String::with_capacity(CURSOR_HOME.len() + width * height.div_ceil(2) * 40);
        text.push_str(CURSOR_HOME);
        for y in (0..height).step_by(2)
        {
            for x in 0..width
            {
                let (tr, tg, tb) = pixels.rgb_at(y * width + x);
                let (br, bg, bb) = if y + 1 < height
                {
                    pixels.rgb_at((y + 1) * width + x)
                }
                else
                {
                    (0, 0, 0)
                };
                let _ = write!(
                    text,
                    "\x1b[38;2;{};{};{};48;2;{};{};{}m{}",
                    tr, tg, tb, br, bg, bb, UPPER_HALF_BLOCK
                );
            }
            text.push_str(RESET_COLORS);
            text.push('\n');
        }
        text
    }
}

impl<W: Write> FrameDisplay for TerminalDisplay<W>
{
    fn open(
        &mut self,
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError>
    {
        log::debug!("Opening {}x{} terminal display", width, height);
        write!(self.out, "{}{}", HIDE_CURSOR, CLEAR_SCREEN).map_err(DisplayError::Write)?;
        self.out.flush().map_err(DisplayError::Write)?;
        self.is_open = true;
        Ok(())
    }

    fn present(
        &mut self,
        pixels: FramePixels<'_>,
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError>
    {
        if !self.is_open
        {
            return Err(DisplayError::Closed);
        }
        let text = Self::render(&pixels, width as usize, height as usize);
        self.out.write_all(text.as_bytes()).map_err(DisplayError::Write)?;
        self.out.flush().map_err(DisplayError::Write)?;
        self.presented += 1;
        Ok(())
    }

    fn quit_requested(&mut self) -> bool
    {
        self.frame_limit.is_some_and(|limit| self.presented >= limit)
    }

    fn close(&mut self)
    {
        if !self.is_open
        {
            return;
        }
        self.is_open = false;
        // Best effort: the terminal may already be gone
        let _ = write!(self.out, "{}{}", RESET_COLORS, SHOW_CURSOR);
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn draws_two_rows_per_line()
    {
        let mut display = TerminalDisplay::new(Vec::new());
        display.open(1, 3).unwrap();
        let pixels = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        display.present(FramePixels::Rgb24(&pixels), 1, 3).unwrap();
        display.close();

        let text = String::from_utf8(display.into_inner()).unwrap();
        assert!(text.starts_with("\x1b[?25l\x1b[2J\x1b[H"));
        assert!(text.contains("\x1b[38;2;1;2;3;48;2;4;5;6m\u{2580}\x1b[0m\n"));
        // odd last row pairs with black
        assert!(text.contains("\x1b[38;2;7;8;9;48;2;0;0;0m\u{2580}\x1b[0m\n"));
        assert!(text.ends_with("\x1b[0m\x1b[?25h"));
    }

    #[test]
    fn accepts_xrgb_words()
    {
        let mut display = TerminalDisplay::new(Vec::new());
        display.open(1, 1).unwrap();
        display.present(FramePixels::Xrgb32(&[0x00ff_8001]), 1, 1).unwrap();
        let text = String::from_utf8(display.into_inner()).unwrap();
        assert!(text.contains("38;2;255;128;1;48;2;0;0;0m"));
    }

    #[test]
    fn quits_after_frame_limit()
    {
        let mut display = TerminalDisplay::new(Vec::new()).with_frame_limit(2);
        display.open(1, 1).unwrap();
        assert!(!display.quit_requested());
        display.present(FramePixels::Rgb24(&[0, 0, 0]), 1, 1).unwrap();
        assert!(!display.quit_requested());
        display.present(FramePixels::Rgb24(&[0, 0, 0]), 1, 1).unwrap();
        assert!(display.quit_requested());
    }

    #[test]
    fn refuses_to_present_when_closed()
    {
        let mut display = TerminalDisplay::new(Vec::new());
        assert!(matches!(
            display.present(FramePixels::Rgb24(&[0, 0, 0]), 1, 1),
            Err(DisplayError::Closed)
        ));
    }
}
