//! Double-buffered display pipeline.
//!
//! The renderer draws into the active buffer while the sink presents
//! the other one; `flush` hands the active buffer to the sink and
//! swaps. A flush is acknowledged exactly once: `DisplaySink::flush`
//! returning *is* the acknowledgement, so a sink cannot forget it or
//! issue it twice.

/// Pixel format is ARGB8888.
pub type Pixel = u32;

/// Inclusive screen area from `(x1, y1)` to `(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Rect {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1) + 1
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1) + 1
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

/// Display geometry and draw-buffer sizing.
///
/// Each of the two draw buffers holds `width * buffer_lines` pixels, a
/// horizontal band of the screen rather than a full frame.
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub buffer_lines: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 384,
            height: 448,
            buffer_lines: 100,
        }
    }
}

impl DisplayConfig {
    /// Pixels per draw buffer.
    pub fn buffer_len(&self) -> usize {
        (self.width * self.buffer_lines) as usize
    }

    /// The band of the screen one buffer covers, starting at `y`.
    /// Degenerate geometry yields an empty-buffer band rather than
    /// underflowing.
    pub fn band(&self, y: u32) -> Rect {
        let y2 = y
            .saturating_add(self.buffer_lines)
            .min(self.height)
            .saturating_sub(1)
            .max(y);
        Rect::new(0, y, self.width.saturating_sub(1), y2)
    }
}

/// Receives finished buffer contents. Returning from `flush`
/// acknowledges the frame.
pub trait DisplaySink: Send {
    fn flush(&mut self, area: &Rect, pixels: &[Pixel]);
}

/// Double-buffered display driver for a fixed-resolution panel.
pub struct Display {
    config: DisplayConfig,
    buffers: [Vec<Pixel>; 2],
    active: usize,
    frames_presented: u64,
    uptime_ms: u64,
    since_refresh_ms: u32,
    refresh_period_ms: u32,
}

/// Default refresh cadence, milliseconds.
pub const DEFAULT_REFRESH_PERIOD_MS: u32 = 20;

impl Display {
    pub fn new(config: DisplayConfig) -> Self {
        let len = config.buffer_len();
        Self {
            config,
            buffers: [vec![0; len], vec![0; len]],
            active: 0,
            frames_presented: 0,
            uptime_ms: 0,
            since_refresh_ms: 0,
            refresh_period_ms: DEFAULT_REFRESH_PERIOD_MS,
        }
    }

    pub fn config(&self) -> DisplayConfig {
        self.config
    }

    /// Buffer the renderer should draw into.
    pub fn draw_buffer(&mut self) -> &mut [Pixel] {
        &mut self.buffers[self.active]
    }

    /// Fill the active buffer with one color.
    pub fn fill(&mut self, color: Pixel) {
        self.buffers[self.active].fill(color);
    }

    /// Present `area` from the active buffer and swap buffers. The
    /// sink receives exactly `area.pixel_count()` pixels (clamped to
    /// the buffer size).
    pub fn flush(&mut self, area: &Rect, sink: &mut dyn DisplaySink) {
        let n = area.pixel_count().min(self.buffers[self.active].len());
        sink.flush(area, &self.buffers[self.active][..n]);
        self.active ^= 1;
        self.frames_presented += 1;
    }

    /// Frames presented since construction; each one was acknowledged
    /// exactly once.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    pub fn set_refresh_period(&mut self, ms: u32) {
        self.refresh_period_ms = ms.max(1);
    }

    /// Advance the animation/timing clock. Returns true when a full
    /// refresh period has elapsed and the frame should be redrawn.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        self.uptime_ms += u64::from(elapsed_ms);
        self.since_refresh_ms += elapsed_ms;
        if self.since_refresh_ms >= self.refresh_period_ms {
            self.since_refresh_ms %= self.refresh_period_ms;
            true
        } else {
            false
        }
    }
}

/// Sink for testing - records every flush it acknowledges.
#[derive(Default)]
pub struct HeadlessSink {
    areas: Vec<Rect>,
    pixels_flushed: usize,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> usize {
        self.areas.len()
    }

    pub fn areas(&self) -> &[Rect] {
        &self.areas
    }

    pub fn pixels_flushed(&self) -> usize {
        self.pixels_flushed
    }
}

impl DisplaySink for HeadlessSink {
    fn flush(&mut self, area: &Rect, pixels: &[Pixel]) {
        self.areas.push(*area);
        self.pixels_flushed += pixels.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_geometry() {
        let r = Rect::new(0, 0, 383, 99);
        assert_eq!(r.width(), 384);
        assert_eq!(r.height(), 100);
        assert_eq!(r.pixel_count(), 38400);
    }

    #[test]
    fn test_band_clamps_to_height() {
        let config = DisplayConfig::default();
        assert_eq!(config.band(0), Rect::new(0, 0, 383, 99));
        // Last band is shorter than buffer_lines.
        assert_eq!(config.band(400), Rect::new(0, 400, 383, 447));
    }

    #[test]
    fn test_zero_geometry_does_not_panic() {
        let config = DisplayConfig {
            width: 0,
            height: 0,
            buffer_lines: 0,
        };
        let mut display = Display::new(config);
        let mut sink = HeadlessSink::new();
        let band = config.band(0);

        // The buffer is empty, so the sink sees zero pixels.
        display.flush(&band, &mut sink);
        assert_eq!(sink.frame_count(), 1);
        assert_eq!(sink.pixels_flushed(), 0);
    }

    #[test]
    fn test_flush_swaps_buffers_and_acks_once() {
        let mut display = Display::new(DisplayConfig::default());
        let mut sink = HeadlessSink::new();
        let band = display.config().band(0);

        display.fill(0xFF00_0000);
        display.flush(&band, &mut sink);
        assert_eq!(display.frames_presented(), 1);
        assert_eq!(sink.frame_count(), 1);
        assert_eq!(sink.pixels_flushed(), band.pixel_count());

        // After the swap the other buffer is active and still clear.
        assert!(display.draw_buffer().iter().all(|p| *p == 0));
    }

    #[test]
    fn test_tick_cadence() {
        let mut display = Display::new(DisplayConfig::default());
        assert!(!display.tick(10));
        assert!(display.tick(10)); // 20 ms elapsed
        assert!(!display.tick(19));
        assert!(display.tick(1));
        assert_eq!(display.uptime_ms(), 40);
    }

    #[test]
    fn test_tick_with_custom_period() {
        let mut display = Display::new(DisplayConfig::default());
        display.set_refresh_period(5);
        assert!(display.tick(12)); // overshoot carries the remainder
        assert!(!display.tick(2));
        assert!(display.tick(1));
    }
}
