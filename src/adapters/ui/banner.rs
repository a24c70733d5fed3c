//! Neon ASCII banner with gradient (NEAR LNC).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

const BANNER_TEXT: &str = "NEAR LNC";

/// NEAR green (#00ec97).
const NEAR_GREEN: (u8, u8, u8) = (0x00, 0xec, 0x97);
/// Sky blue (#17d9d4).
const SKY_BLUE: (u8, u8, u8) = (0x17, 0xd9, 0xd4);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Render the banner text with the built-in figlet font. Falls back to plain text.
fn banner_art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(BANNER_TEXT).map(|figure| figure.to_string()))
        .unwrap_or_else(|| BANNER_TEXT.to_string())
}

/// Prints the welcome banner with a green-to-blue gradient, then the version line.
pub fn print_welcome() {
    let mut out = stdout();
    let art = banner_art();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(NEAR_GREEN, SKY_BLUE, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: SKY_BLUE.0,
        g: SKY_BLUE.1,
        b: SKY_BLUE.2,
    }));
    let _ = out.execute(Print(format!("v{} · Low/No code integrations for NEAR\r\n", version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
