//! Platform modifier binding table.
//!
//! On macOS the editor's "control" is the native Meta (⌃) key and "command" is native Control
//! (⌘ as reported by the toolkit). Linux binds control to Control and command to Meta (super).
//! Windows has no command modifier at all.

use crate::Modifiers;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformId {
    Linux,
    MacOs,
    Windows,
}

impl PlatformId {
    /// Platform this binary was compiled for. Anything that is not macOS or Windows uses the
    /// Linux table.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            PlatformId::MacOs
        } else if cfg!(target_os = "windows") {
            PlatformId::Windows
        } else {
            PlatformId::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Linux => "linux",
            PlatformId::MacOs => "macos",
            PlatformId::Windows => "windows",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown platform `{0}` (expected auto, linux, macos or windows)")]
pub struct ParsePlatformError(pub String);

impl FromStr for PlatformId {
    type Err = ParsePlatformError;

    /// `auto` resolves to `PlatformId::current()`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(PlatformId::current()),
            "linux" => Ok(PlatformId::Linux),
            "macos" | "darwin" => Ok(PlatformId::MacOs),
            "windows" => Ok(PlatformId::Windows),
            other => Err(ParsePlatformError(other.to_string())),
        }
    }
}

/// Which native modifier bit plays which editor role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierBindings {
    pub control: Modifiers,
    /// Emits the `D-` prefix. Empty when the platform has none.
    pub command: Modifiers,
    pub shift: Modifiers,
    pub alt: Modifiers,
}

impl ModifierBindings {
    pub fn for_platform(platform: PlatformId) -> Self {
        match platform {
            PlatformId::MacOs => Self {
                control: Modifiers::META,
                command: Modifiers::CONTROL,
                shift: Modifiers::SHIFT,
                alt: Modifiers::ALT,
            },
            PlatformId::Linux => Self {
                control: Modifiers::CONTROL,
                command: Modifiers::META,
                shift: Modifiers::SHIFT,
                alt: Modifiers::ALT,
            },
            PlatformId::Windows => Self {
                control: Modifiers::CONTROL,
                command: Modifiers::empty(),
                shift: Modifiers::SHIFT,
                alt: Modifiers::ALT,
            },
        }
    }

    /// Editor prefix for `mods`, in fixed order: command, control, shift, alt.
    pub fn prefix(&self, mods: Modifiers) -> String {
        let mut prefix = String::new();
        if self.has(mods, self.command) {
            prefix.push_str("D-");
        }
        if self.has(mods, self.control) {
            prefix.push_str("C-");
        }
        if self.has(mods, self.shift) {
            prefix.push_str("S-");
        }
        if self.has(mods, self.alt) {
            prefix.push_str("A-");
        }
        prefix
    }

    pub fn is_control_or_command(&self, mods: Modifiers) -> bool {
        self.has(mods, self.control) || self.has(mods, self.command)
    }

    fn has(&self, mods: Modifiers, role: Modifiers) -> bool {
        !role.is_empty() && mods.intersects(role)
    }
}
