//! Command line surface.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use core_input::{Key, KeyInput, Modifiers};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nvgrid", version, about = "Neovim redraw grid tools")]
pub struct Args {
    /// Configuration file path (overrides discovery of `nvgrid.toml`).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply a recorded notification trace and print the final grid.
    Replay {
        trace: PathBuf,
        /// Print the grid with its colors.
        #[arg(long)]
        ansi: bool,
    },
    /// Print the key notation produced for one key press.
    Keys {
        /// A single character or a key name (`Tab`, `Esc`, `F5`, `Up`, `PageDown`, ...).
        key: String,
        /// Composed text, when it differs from the key itself.
        #[arg(long)]
        text: Option<String>,
        /// Comma separated: ctrl, shift, alt, meta, keypad.
        #[arg(long, default_value = "")]
        mods: String,
    },
}

pub fn parse_mods(raw: &str) -> Result<Modifiers> {
    let mut mods = Modifiers::empty();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        mods |= match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Modifiers::CONTROL,
            "shift" => Modifiers::SHIFT,
            "alt" | "option" => Modifiers::ALT,
            "meta" | "cmd" | "command" | "super" => Modifiers::META,
            "keypad" | "kp" => Modifiers::KEYPAD,
            other => bail!("unknown modifier `{other}`"),
        };
    }
    Ok(mods)
}

pub fn parse_key(raw: &str) -> Result<Key> {
    let mut chars = raw.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(match c {
            '\\' => Key::Backslash,
            ' ' => Key::Space,
            c => Key::Char(c),
        });
    }
    let key = match raw.to_ascii_lowercase().as_str() {
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "bs" | "backspace" => Key::Backspace,
        "del" | "delete" => Key::Delete,
        "ins" | "insert" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "cr" | "return" => Key::Return,
        "enter" => Key::Enter,
        "tab" => Key::Tab,
        "backtab" => Key::Backtab,
        "esc" | "escape" => Key::Escape,
        "space" => Key::Space,
        lower => match lower.strip_prefix('f').map(str::parse::<u8>) {
            Some(Ok(n)) if (1..=24).contains(&n) => Key::F(n),
            _ => bail!("unknown key `{raw}`"),
        },
    };
    Ok(key)
}

/// Build the key press; character keys default their text to the character.
pub fn key_input(key: &str, text: Option<&str>, mods: &str) -> Result<KeyInput> {
    let key = parse_key(key)?;
    let modifiers = parse_mods(mods)?;
    let text = match (text, key) {
        (Some(t), _) => t.to_string(),
        (None, Key::Char(c)) => c.to_string(),
        (None, Key::Backslash) => "\\".to_string(),
        (None, Key::Space) => " ".to_string(),
        (None, _) => String::new(),
    };
    Ok(KeyInput::new(text, key, modifiers))
}
