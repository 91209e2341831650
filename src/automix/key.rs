//! Camelot wheel keys and harmonic compatibility.

use std::fmt;
use std::str::FromStr;

/// Camelot letter: `A` is the minor ring, `B` the major ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyMode {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CamelotKey {
    number: u8,
    mode: KeyMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyError(String);

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised key: {:?}", self.0)
    }
}

impl std::error::Error for ParseKeyError {}

pub const UNKNOWN_KEY_SCORE: f64 = 0.5;

impl CamelotKey {
    /// `number` must be within 1..=12.
    pub fn new(number: u8, mode: KeyMode) -> Option<Self> {
        (1..=12).contains(&number).then_some(Self { number, mode })
    }

    /// Wheel position `index % 12`, always valid.
    pub(crate) fn on_wheel(index: u32, mode: KeyMode) -> Self {
        Self {
            number: (index % 12) as u8 + 1,
            mode,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Steps around the wheel, ignoring the ring: `min(|a-b|, 12-|a-b|)`.
    pub fn distance(&self, other: &CamelotKey) -> u8 {
        let diff = self.number.abs_diff(other.number);
        diff.min(12 - diff)
    }

    pub fn compatibility(&self, other: &CamelotKey) -> f64 {
        let same_ring = self.mode == other.mode;
        match self.distance(other) {
            // Same key, or its relative major/minor.
            0 => 1.0,
            1 if same_ring => 0.9,
            1 => 0.7,
            2 if same_ring => 0.6,
            _ => 0.1,
        }
    }

    /// Key for a root pitch class (C = 0 .. B = 11) in major or minor.
    fn from_pitch_class(pc: u8, minor: bool) -> Self {
        // One step clockwise on the wheel is a fifth (7 semitones) up.
        let shift = if minor { 4 } else { 7 };
        Self {
            number: ((pc as u16 * 7 + shift) % 12) as u8 + 1,
            mode: if minor { KeyMode::A } else { KeyMode::B },
        }
    }

    fn parse_camelot(s: &str) -> Option<Self> {
        let letter = s.chars().last()?;
        let digits = &s[..s.len() - letter.len_utf8()];
        let mode = match letter {
            'A' | 'a' => KeyMode::A,
            'B' | 'b' => KeyMode::B,
            _ => return None,
        };
        CamelotKey::new(digits.parse().ok()?, mode)
    }

    /// Conventional notation: "Am", "C#", "Bb major", "F minor", "G♯m".
    fn parse_musical(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let mut pc: i8 = match chars.next()?.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let mut rest = chars.as_str();
        if let Some(r) = rest.strip_prefix(['#', '♯']) {
            pc += 1;
            rest = r;
        } else if let Some(r) = rest.strip_prefix(['b', '♭']) {
            pc -= 1;
            rest = r;
        }
        let minor = match rest.trim().to_ascii_lowercase().as_str() {
            "" | "maj" | "major" => false,
            "m" | "min" | "minor" => true,
            _ => return None,
        };
        Some(Self::from_pitch_class(pc.rem_euclid(12) as u8, minor))
    }
}

impl FromStr for CamelotKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let starts_with_digit = trimmed.starts_with(|c: char| c.is_ascii_digit());
        let parsed = if starts_with_digit {
            Self::parse_camelot(trimmed)
        } else {
            Self::parse_musical(trimmed)
        };
        parsed.ok_or_else(|| ParseKeyError(s.to_string()))
    }
}

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.mode {
            KeyMode::A => 'A',
            KeyMode::B => 'B',
        };
        write!(f, "{}{}", self.number, letter)
    }
}

/// Harmonic compatibility of two tagged keys. Missing or unparseable keys
/// score a neutral 0.5.
pub fn key_compatibility(a: Option<&str>, b: Option<&str>) -> f64 {
    let parse = |k: Option<&str>| k.and_then(|s| s.parse::<CamelotKey>().ok());
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.compatibility(&b),
        _ => UNKNOWN_KEY_SCORE,
    }
}
