//! Chord codec: host numeric chord -> registration string chord.
//!
//! The host stores a chord as `"<modifier-bitmask>,<keycode>"` (e.g. `"4,50"`)
//! but its registration API expects `"<modifier-letters>+<key>"` (e.g. `"A+2"`).
//!
//! Which bit of the 3-bit mask means which modifier is not settled by the host
//! documentation, so the mapping is a [`ModifierScheme`] rather than a constant:
//!
//! | preset                         | bit 0 | bit 1 | bit 2 | letter order |
//! |--------------------------------|-------|-------|-------|--------------|
//! | [`ModifierScheme::demo_script`] | Ctrl  | Shift | Alt   | `C S A`      |
//! | [`ModifierScheme::guide`]       | Shift | Ctrl  | Alt   | `S C A`      |
//!
//! `demo_script` is the default.
//!
//! Only decoding exists. There is no string -> numeric encoder here: the host
//! performs that conversion itself when a chord is registered, so the only
//! round trip this crate relies on is "persist what the host reports, decode
//! it on the next start".

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A chord modifier and its registration letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
}

impl Modifier {
    pub fn letter(self) -> char {
        match self {
            Modifier::Shift => 'S',
            Modifier::Ctrl => 'C',
            Modifier::Alt => 'A',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'S' => Some(Modifier::Shift),
            'C' => Some(Modifier::Ctrl),
            'A' => Some(Modifier::Alt),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modifier::Shift => "Shift",
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when building a custom modifier scheme.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemeError {
    #[error("bit index {0} is outside the 3-bit modifier mask")]
    BitOutOfRange(u8),
    #[error("bit {0} is assigned to more than one modifier")]
    DuplicateBit(u8),
    #[error("letter order must list Shift, Ctrl and Alt exactly once")]
    InvalidOrder,
}

/// Named scheme presets, selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeName {
    #[default]
    DemoScript,
    Guide,
}

impl SchemeName {
    pub fn scheme(self) -> ModifierScheme {
        match self {
            SchemeName::DemoScript => ModifierScheme::demo_script(),
            SchemeName::Guide => ModifierScheme::guide(),
        }
    }
}

/// Bit-to-modifier mapping plus the order letters are appended in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierScheme {
    shift_bit: u8,
    ctrl_bit: u8,
    alt_bit: u8,
    order: [Modifier; 3],
}

impl Default for ModifierScheme {
    fn default() -> Self {
        Self::demo_script()
    }
}

impl ModifierScheme {
    pub fn new(
        shift_bit: u8,
        ctrl_bit: u8,
        alt_bit: u8,
        order: [Modifier; 3],
    ) -> Result<Self, SchemeError> {
        for bit in [shift_bit, ctrl_bit, alt_bit] {
            if bit > 2 {
                return Err(SchemeError::BitOutOfRange(bit));
            }
        }
        if shift_bit == ctrl_bit || shift_bit == alt_bit {
            return Err(SchemeError::DuplicateBit(shift_bit));
        }
        if ctrl_bit == alt_bit {
            return Err(SchemeError::DuplicateBit(ctrl_bit));
        }
        let has = |m: Modifier| order.iter().filter(|o| **o == m).count() == 1;
        if !(has(Modifier::Shift) && has(Modifier::Ctrl) && has(Modifier::Alt)) {
            return Err(SchemeError::InvalidOrder);
        }
        Ok(Self {
            shift_bit,
            ctrl_bit,
            alt_bit,
            order,
        })
    }

    /// Ctrl = 1, Shift = 2, Alt = 4; letters appended C, S, A.
    pub const fn demo_script() -> Self {
        Self {
            shift_bit: 1,
            ctrl_bit: 0,
            alt_bit: 2,
            order: [Modifier::Ctrl, Modifier::Shift, Modifier::Alt],
        }
    }

    /// Shift = 1, Ctrl = 2, Alt = 4; letters appended S, C, A.
    pub const fn guide() -> Self {
        Self {
            shift_bit: 0,
            ctrl_bit: 1,
            alt_bit: 2,
            order: [Modifier::Shift, Modifier::Ctrl, Modifier::Alt],
        }
    }

    pub fn bit(&self, modifier: Modifier) -> u8 {
        match modifier {
            Modifier::Shift => self.shift_bit,
            Modifier::Ctrl => self.ctrl_bit,
            Modifier::Alt => self.alt_bit,
        }
    }

    /// Modifiers set in `mask`, in this scheme's append order.
    pub fn modifiers(&self, mask: i64) -> Vec<Modifier> {
        self.order
            .iter()
            .copied()
            .filter(|m| mask & (1i64 << self.bit(*m)) != 0)
            .collect()
    }

    /// Decode a numeric chord (`"mask,keycode"`) into registration form.
    ///
    /// Total: any malformed input yields `None`.
    pub fn decode(&self, numeric: Option<&str>) -> Option<String> {
        let (mask, key_code) = split_numeric(numeric?)?;

        let letters: String = self.modifiers(mask).into_iter().map(Modifier::letter).collect();
        let key = key_for_code(key_code);

        if letters.is_empty() {
            Some(key)
        } else {
            Some(format!("{}+{}", letters, key))
        }
    }
}

/// Decode with the default ([`ModifierScheme::demo_script`]) scheme.
pub fn decode(numeric: Option<&str>) -> Option<String> {
    ModifierScheme::default().decode(numeric)
}

/// Parse `"mask,keycode"` into its two integers.
pub(crate) fn split_numeric(numeric: &str) -> Option<(i64, i64)> {
    let mut tokens = numeric.split(',');
    let mask = tokens.next()?.trim().parse::<i64>().ok()?;
    let key_code = tokens.next()?.trim().parse::<i64>().ok()?;
    if tokens.next().is_some() || mask < 0 || key_code < 0 {
        return None;
    }
    Some((mask, key_code))
}

/// Digits and letters decode to their character, anything else stays numeric.
pub fn key_for_code(key_code: i64) -> String {
    match key_code {
        48..=57 | 65..=90 => char::from(key_code as u8).to_ascii_lowercase().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(decode(None), None);
        assert_eq!(decode(Some("")), None);
        assert_eq!(decode(Some("1,2,3")), None);
        assert_eq!(decode(Some("a,b")), None);
        assert_eq!(decode(Some("4")), None);
        assert_eq!(decode(Some("4,")), None);
        assert_eq!(decode(Some("-1,65")), None);
    }

    #[test]
    fn alt_digit() {
        assert_eq!(decode(Some("4,56")), Some("A+8".to_string()));
        assert_eq!(ModifierScheme::guide().decode(Some("4,56")), Some("A+8".to_string()));
    }

    #[test]
    fn bit_one_follows_scheme() {
        assert_eq!(decode(Some("2,81")), Some("S+q".to_string()));
        assert_eq!(ModifierScheme::guide().decode(Some("2,81")), Some("C+q".to_string()));
    }

    #[test]
    fn no_modifiers_is_bare_key() {
        assert_eq!(decode(Some("0,65")), Some("a".to_string()));
        assert_eq!(decode(Some("0,48")), Some("0".to_string()));
        assert_eq!(decode(Some("0,112")), Some("112".to_string()));
    }

    #[test]
    fn unmapped_codes_stay_decimal() {
        assert_eq!(decode(Some("1,186")), Some("C+186".to_string()));
        assert_eq!(decode(Some("0,47")), Some("47".to_string()));
        assert_eq!(decode(Some("0,91")), Some("91".to_string()));
    }

    #[test]
    fn letters_follow_fixed_order() {
        assert_eq!(decode(Some("7,75")), Some("CSA+k".to_string()));
        assert_eq!(ModifierScheme::guide().decode(Some("7,75")), Some("SCA+k".to_string()));
        assert_eq!(decode(Some("5,49")), Some("CA+1".to_string()));
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        assert_eq!(decode(Some(" 4 , 50 ")), Some("A+2".to_string()));
    }

    #[test]
    fn decode_is_deterministic_over_mask_domain() {
        for mask in 0..8 {
            for code in [48, 57, 65, 90, 13, 186] {
                let input = format!("{},{}", mask, code);
                let first = decode(Some(&input));
                assert!(first.is_some());
                assert_eq!(first, decode(Some(&input)));
            }
        }
    }

    #[test]
    fn custom_scheme_validation() {
        let order = [Modifier::Alt, Modifier::Ctrl, Modifier::Shift];
        assert!(ModifierScheme::new(2, 1, 0, order).is_ok());
        assert_eq!(
            ModifierScheme::new(3, 1, 0, order),
            Err(SchemeError::BitOutOfRange(3))
        );
        assert_eq!(
            ModifierScheme::new(1, 1, 0, order),
            Err(SchemeError::DuplicateBit(1))
        );
        assert_eq!(
            ModifierScheme::new(0, 1, 2, [Modifier::Alt, Modifier::Alt, Modifier::Shift]),
            Err(SchemeError::InvalidOrder)
        );
    }

    #[test]
    fn scheme_name_serde() {
        let name: SchemeName = serde_json::from_str("\"guide\"").unwrap();
        assert_eq!(name, SchemeName::Guide);
        assert_eq!(
            serde_json::to_string(&SchemeName::DemoScript).unwrap(),
            "\"demo-script\""
        );
        assert_eq!(SchemeName::Guide.scheme(), ModifierScheme::guide());
    }
}
