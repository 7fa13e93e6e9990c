//! glint CLI - mount drives and run the render loop in a terminal.
//!
//! Usage:
//!   glint --root ./assets A:images/logo.bin
//!   glint --bundle theme.zip B:fonts/mono.bin
//!   glint --headless --frames 50
//!
//! Drive A is the local disk under --root; each --bundle ZIP is merged
//! onto drive B. The asset argument is drive-qualified ("A:path"); a
//! bare path defaults to drive A.

use std::io::{stdout, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    cursor, execute,
    terminal::{self, Clear, ClearType},
};

use glint_core::{
    load_bundle_from_path, BundleBackend, DisplayConfig, DisplaySink, HeadlessSink, LocalBackend,
    Pixel, Rect, Runtime, DEFAULT_REFRESH_PERIOD_MS,
};

/// Embedded graphics runtime demo
#[derive(Parser, Debug)]
#[command(name = "glint")]
#[command(about = "Render an asset through the drive-letter VFS")]
struct Args {
    /// Mount root for drive A (local disk)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Asset bundle ZIPs, merged onto drive B
    #[arg(long)]
    bundle: Vec<PathBuf>,

    /// Drive-qualified asset path, e.g. "A:images/logo.bin"
    asset: Option<String>,

    /// Frames to render before exiting
    #[arg(long, default_value_t = 100)]
    frames: u64,

    /// Panel width in pixels
    #[arg(long, default_value_t = 384, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Panel height in pixels
    #[arg(long, default_value_t = 448, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Lines per draw buffer
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    buffer_lines: u32,

    /// Run against the recording sink instead of the terminal
    #[arg(long)]
    headless: bool,
}

/// Split "A:images/logo.bin" into drive letter and relative path.
/// A bare path defaults to drive A.
fn split_asset(spec: &str) -> (char, &str) {
    let mut chars = spec.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => (letter, chars.as_str()),
        _ => ('A', spec),
    }
}

/// Renders the framebuffer as a grayscale character grid.
struct TerminalSink {
    cols: u32,
    rows: u32,
}

const SHADE_RAMP: &[u8] = b" .:-=+*#%@";

impl TerminalSink {
    fn new() -> Self {
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        Self {
            cols: u32::from(cols).clamp(20, 120),
            rows: u32::from(rows.saturating_sub(1)).clamp(10, 48),
        }
    }
}

impl DisplaySink for TerminalSink {
    fn flush(&mut self, area: &Rect, pixels: &[Pixel]) {
        let mut out = stdout();
        let _ = execute!(out, cursor::MoveTo(0, 0));

        let mut line = String::with_capacity(self.cols as usize + 1);
        for row in 0..self.rows {
            line.clear();
            for col in 0..self.cols {
                let x = col * area.width() / self.cols;
                let y = row * area.height() / self.rows;
                let idx = (y * area.width() + x) as usize;
                let px = pixels.get(idx).copied().unwrap_or(0);

                // Average the channels into a shade index.
                let lum = ((px >> 16 & 0xFF) + (px >> 8 & 0xFF) + (px & 0xFF)) / 3;
                let shade = (lum as usize * (SHADE_RAMP.len() - 1)) / 255;
                line.push(SHADE_RAMP[shade] as char);
            }
            line.push('\n');
            let _ = out.write_all(line.as_bytes());
        }
        let _ = out.flush();
    }
}

fn gray(lum: u8) -> Pixel {
    0xFF00_0000 | (u32::from(lum) << 16) | (u32::from(lum) << 8) | u32::from(lum)
}

/// Draw one frame into the active buffer: a moving vertical gradient,
/// with asset bytes tiled in as luminance when one was loaded.
fn draw_frame(rt: &mut Runtime, asset: Option<&[u8]>) {
    let config = rt.display.config();
    let phase = (rt.display.uptime_ms() / u64::from(DEFAULT_REFRESH_PERIOD_MS)) as u32;
    let width = config.width;
    let lines = config.buffer_lines;
    let buf = rt.display.draw_buffer();

    for y in 0..lines {
        let base = (((y + phase) % lines) * 255 / lines) as u8;
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let lum = match asset {
                Some(bytes) if !bytes.is_empty() => bytes[idx % bytes.len()] ^ base,
                _ => base,
            };
            buf[idx] = gray(lum);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = DisplayConfig {
        width: args.width,
        height: args.height,
        buffer_lines: args.buffer_lines.min(args.height),
    };
    let mut rt = Runtime::new(config);

    if let Some(root) = &args.root {
        rt.vfs.register('A', Box::new(LocalBackend::new(root)))?;
        eprintln!("Mounted A: -> {}", root.display());
    }

    if !args.bundle.is_empty() {
        let mut backend = BundleBackend::new();
        for path in &args.bundle {
            let bundle = load_bundle_from_path(path)?;
            eprintln!(
                "Loaded bundle: {} ({} files)",
                bundle.manifest.name,
                bundle.files.len()
            );
            backend.add_bundle(bundle);
        }
        rt.vfs.register('B', Box::new(backend))?;
    }

    let asset = match &args.asset {
        Some(spec) => {
            let (drive, path) = split_asset(spec);
            if !rt.vfs.is_ready(drive) {
                eprintln!("Drive {}: is not ready", drive);
                return Err(format!("drive {} not ready", drive).into());
            }
            match rt.load_asset(drive, path) {
                Some(data) => {
                    eprintln!("Loaded {}:{} ({} bytes)", drive, path, data.len());
                    Some(data)
                }
                None => {
                    eprintln!("Could not load {}:{}", drive, path);
                    return Err(format!("asset {} not found", spec).into());
                }
            }
        }
        None => None,
    };

    let band = config.band(0);
    let mut interval =
        tokio::time::interval(Duration::from_millis(u64::from(DEFAULT_REFRESH_PERIOD_MS)));

    if args.headless {
        let mut sink = HeadlessSink::new();
        while rt.display.frames_presented() < args.frames {
            interval.tick().await;
            if rt.step(DEFAULT_REFRESH_PERIOD_MS) {
                draw_frame(&mut rt, asset.as_deref());
                rt.display.flush(&band, &mut sink);
            }
        }
        eprintln!(
            "Presented {} frames ({} pixels flushed)",
            sink.frame_count(),
            sink.pixels_flushed()
        );
    } else {
        let mut sink = TerminalSink::new();
        let mut out = stdout();
        let cursor_hidden = execute!(out, cursor::Hide, Clear(ClearType::All)).is_ok();

        while rt.display.frames_presented() < args.frames {
            interval.tick().await;
            if rt.step(DEFAULT_REFRESH_PERIOD_MS) {
                draw_frame(&mut rt, asset.as_deref());
                rt.display.flush(&band, &mut sink);
            }
        }

        if cursor_hidden {
            let _ = execute!(out, cursor::Show);
        }
        println!();
    }

    rt.shutdown();
    Ok(())
}
