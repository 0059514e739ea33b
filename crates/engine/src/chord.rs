//! Chord normalization.
//!
//! A chord is the canonical string naming one key combination, for example
//! `Escape`, `Ctrl+k`, or `Ctrl+Alt+Shift+Delete`. Active modifiers are always
//! emitted in the order `Ctrl`, `Meta`, `Alt`, `Shift`, followed by the base
//! key, so the same physical combination normalizes to the same chord no
//! matter how the modifier flags were reported.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing chord text such as `"shift+ctrl+k"`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChordParseError {
    #[error("chord string is empty")]
    Empty,
    #[error("chord has no key, only modifiers")]
    MissingKey,
    #[error("chord names more than one key: '{first}' and '{second}'")]
    DuplicateKey { first: String, second: String },
}

/// Modifier flags of a key press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
        alt: false,
        shift: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.alt || self.shift
    }

    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Names of the active modifiers in canonical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.ctrl, "Ctrl"),
            (self.meta, "Meta"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
        ]
        .into_iter()
        .filter_map(|(active, name)| active.then_some(name))
    }

    /// Sets the flag matching a modifier token. Returns `false` when the token
    /// is not a modifier.
    fn apply_token(&mut self, token: &str) -> bool {
        match token.to_ascii_lowercase().as_str() {
            "ctrl" | "control" | "ctl" | "^" => self.ctrl = true,
            "meta" | "cmd" | "command" | "super" | "win" | "os" => self.meta = true,
            "alt" | "opt" | "option" => self.alt = true,
            "shift" | "shft" => self.shift = true,
            _ => return false,
        }
        true
    }
}

/// Canonical identifier of a key combination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chord(String);

impl Chord {
    /// Builds the canonical chord for a base key and modifier set.
    pub fn from_parts(modifiers: Modifiers, key: &str) -> Self {
        let key = canonicalize_key(key);
        let mut canonical = String::with_capacity(key.len() + 16);
        for name in modifiers.names() {
            canonical.push_str(name);
            canonical.push('+');
        }
        canonical.push_str(&key);
        Self(canonical)
    }

    /// A chord with no modifiers, e.g. `Chord::plain("Escape")`.
    pub fn plain(key: &str) -> Self {
        Self::from_parts(Modifiers::NONE, key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base key segment of the chord.
    pub fn key(&self) -> &str {
        if self.0.ends_with("++") || self.0 == "+" {
            return "+";
        }
        self.0.rsplit('+').next().unwrap_or(&self.0)
    }

    /// Modifier flags encoded in the chord.
    pub fn modifiers(&self) -> Modifiers {
        let key_len = self.key().len();
        let prefix = &self.0[..self.0.len() - key_len];
        let mut modifiers = Modifiers::NONE;
        for token in prefix.split('+').filter(|token| !token.is_empty()) {
            modifiers.apply_token(token);
        }
        modifiers
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Chord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Chord {
    type Err = ChordParseError;

    /// Parses loosely written chords (`"shift+ctrl+k"`, `"Cmd Esc"`) into
    /// canonical form. Modifier tokens may appear in any order.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChordParseError::Empty);
        }

        // A literal plus key: "+", "Ctrl++", "ctrl + +".
        let (body, plus_key) = match text.strip_suffix('+') {
            Some(rest) if rest.is_empty() || rest.trim_end().ends_with('+') => (rest.trim_end().trim_end_matches('+'), true),
            _ => (text, false),
        };

        let mut modifiers = Modifiers::NONE;
        let mut key: Option<&str> = plus_key.then_some("+");
        for token in body.split(|c: char| c == '+' || c.is_whitespace()).filter(|token| !token.is_empty()) {
            if modifiers.apply_token(token) {
                continue;
            }
            if let Some(first) = key {
                return Err(ChordParseError::DuplicateKey {
                    first: first.to_string(),
                    second: token.to_string(),
                });
            }
            key = Some(token);
        }

        let key = key.ok_or(ChordParseError::MissingKey)?;
        Ok(Self::from_parts(modifiers, key))
    }
}

impl Serialize for Chord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Chord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Canonical spelling of a base key name.
///
/// Single characters keep their case (`k` and `K` are different keys), a
/// literal space becomes `Space`, and common aliases of named keys collapse to
/// one spelling. Unknown names are title-cased.
pub fn canonicalize_key(key: &str) -> String {
    if key == " " {
        return "Space".to_string();
    }
    let trimmed = key.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (None, _) => return String::new(),
        (Some(single), None) => return single.to_string(),
        _ => {}
    }

    let lower = trimmed.to_ascii_lowercase();
    let named = match lower.as_str() {
        "esc" | "escape" => "Escape",
        "enter" | "return" | "cr" => "Enter",
        "tab" => "Tab",
        "backspace" | "bs" => "Backspace",
        "delete" | "del" => "Delete",
        "insert" | "ins" => "Insert",
        "space" | "spacebar" => "Space",
        "up" | "arrowup" => "ArrowUp",
        "down" | "arrowdown" => "ArrowDown",
        "left" | "arrowleft" => "ArrowLeft",
        "right" | "arrowright" => "ArrowRight",
        "home" => "Home",
        "end" => "End",
        "pageup" | "pgup" => "PageUp",
        "pagedown" | "pgdn" => "PageDown",
        "plus" => "+",
        _ => "",
    };
    if !named.is_empty() {
        return named.to_string();
    }

    if let Some(digits) = lower.strip_prefix('f')
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
    {
        return format!("F{digits}");
    }

    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
