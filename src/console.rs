//! Terminal formatting. Everything here returns strings; printing happens in
//! the binary.

use crate::config::GameMode;
use crate::model::{Bottle, PuzzleState, color_to_letters};

pub const FLUID_COLORS: [(u8, u8, u8); 32] = [
    (255, 0, 0),     //RED
    (0, 0, 255),     //BLUE
    (255, 255, 0),   //YELLOW
    (0, 128, 0),     //GREEN
    (160, 32, 240),  //PURPLE
    (255, 165, 0),   //ORANGE
    (0, 255, 255),   //CYAN
    (255, 0, 255),   //MAGENTA
    (0, 255, 0),     //LIME
    (255, 192, 203), //PINK
    (165, 42, 42),   //BROWN
    (0, 0, 128),     //NAVY
    (64, 224, 208),  //TURQUOISE
    (128, 128, 0),   //OLIVE
    (128, 0, 0),     //MAROON
    (0, 255, 255),   //AQUA
    (0, 128, 128),   //TEAL
    (255, 215, 0),   //GOLD
    (192, 192, 192), //SILVER
    (255, 127, 80),  //CORAL
    (238, 130, 238), //VIOLET
    (152, 255, 152), //MINT
    (245, 245, 220), //BEIGE
    (250, 128, 114), //SALMON
    (244, 164, 96),  //SANDYBROWN
    (75, 0, 130),    //INDIGO
    (220, 20, 60),   //CRIMSON
    (240, 230, 140), //KHAKI
    (221, 160, 221), //PLUM
    (210, 105, 30),  //CHOCOLATE
    (0, 100, 0),     //DARKGREEN
    (255, 140, 0),   //DARKORANGE
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Style {
    Success,
    Failure,
    Info,
    Warning,
    Debug,
}

impl Style {
    /// Fixed-width label shown in brackets.
    pub fn header(&self) -> &'static str {
        match self {
            Style::Success => "SUCCESS",
            Style::Failure => "FAILURE",
            Style::Info => "INFORMT",
            Style::Warning => "WARNING",
            Style::Debug => "_DEBUG_",
        }
    }

    fn ansi(&self) -> &'static str {
        match self {
            Style::Success => "\x1b[92m",
            Style::Failure => "\x1b[91m",
            Style::Info => "\x1b[96m",
            Style::Warning => "\x1b[93m",
            Style::Debug => "\x1b[95m",
        }
    }
}

/// `[HEADER] body`, with the header colored by `style` unless `plain`.
pub fn format_message(header: &str, body: &str, style: Style, plain: bool) -> String {
    if plain {
        format!("[{}] {}", header, body)
    } else {
        format!("{}{}[{}]{} {}", style.ansi(), BOLD, header, RESET, body)
    }
}

/// [`format_message`] with the style's own header.
pub fn format_status(style: Style, body: &str, plain: bool) -> String {
    format_message(style.header(), body, style, plain)
}

fn format_cell(label: &str, rgb: Option<(u8, u8, u8)>, plain: bool) -> String {
    match rgb {
        Some((r, g, b)) if !plain => {
            // dark text on light fills
            let fg = if (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000 > 140 {
                "30"
            } else {
                "97"
            };
            format!("\x1b[48;2;{};{};{}m\x1b[{}m{:^3}{}", r, g, b, fg, label, RESET)
        }
        _ => format!("[{:^3}]", label),
    }
}

fn format_bottle(bottle: &Bottle, mode: GameMode, plain: bool) -> String {
    let colors = bottle.get_colors();
    let mut cells = Vec::with_capacity(bottle.get_capacity());
    for (depth, &color) in colors.iter().enumerate() {
        let is_top = depth + 1 == colors.len();
        if mode == GameMode::Hidden && !is_top {
            cells.push(format_cell("?", None, plain));
        } else {
            let rgb = FLUID_COLORS[(color - 1) % FLUID_COLORS.len()];
            cells.push(format_cell(&color_to_letters(color), Some(rgb), plain));
        }
    }
    for _ in 0..bottle.get_empty_space() {
        cells.push(format_cell("", None, plain));
    }
    cells.concat()
}

/// One line per bottle, bottom cell on the left. In hidden mode only each
/// bottle's top cell is revealed.
pub fn format_state(state: &PuzzleState, mode: GameMode, plain: bool) -> String {
    state
        .get_bottles()
        .iter()
        .enumerate()
        .map(|(index, bottle)| format!("{:>3} {}", index, format_bottle(bottle, mode, plain)))
        .collect::<Vec<_>>()
        .join("\n")
}
