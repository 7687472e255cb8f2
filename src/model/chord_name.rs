use std::io::Write;

use crate::codec::packed_field::{flag_u16, flag_u8};
use crate::codec::{BitField, FileVersion, InputStream, Layout, OutputStream, Serializable};
use crate::{StreamError, ValidationError};

// Keys
pub const C: u8 = 0;
pub const C_SHARP: u8 = 1;
pub const D: u8 = 2;
pub const E_FLAT: u8 = 3;
pub const E: u8 = 4;
pub const F: u8 = 5;
pub const F_SHARP: u8 = 6;
pub const G: u8 = 7;
pub const A_FLAT: u8 = 8;
pub const A: u8 = 9;
pub const B_FLAT: u8 = 10;
pub const B: u8 = 11;

// Key variations
pub const VARIATION_DOWN: u8 = 0;
pub const VARIATION_DEFAULT: u8 = 1;
pub const VARIATION_UP: u8 = 2;

// Formulas
pub const MAJOR: u8 = 0;
pub const MINOR: u8 = 1;
pub const AUGMENTED: u8 = 2;
pub const DIMINISHED: u8 = 3;
pub const POWER_CHORD: u8 = 4;
pub const MAJOR_6TH: u8 = 5;
pub const MINOR_6TH: u8 = 6;
pub const DOMINANT_7TH: u8 = 7;
pub const MAJOR_7TH: u8 = 8;
pub const MINOR_7TH: u8 = 9;
pub const AUGMENTED_7TH: u8 = 10;
pub const DIMINISHED_7TH: u8 = 11;
pub const MINOR_MAJOR_7TH: u8 = 12;
pub const MINOR_7TH_FLATTED_5TH: u8 = 13;

// Formula modification flags
pub const EXTENDED_9TH: u16 = 0x0001;
pub const EXTENDED_11TH: u16 = 0x0002;
pub const EXTENDED_13TH: u16 = 0x0004;
pub const ADDED_2ND: u16 = 0x0008;
pub const ADDED_4TH: u16 = 0x0010;
pub const ADDED_6TH: u16 = 0x0020;
pub const ADDED_9TH: u16 = 0x0040;
pub const ADDED_11TH: u16 = 0x0080;
pub const FLATTED_5TH: u16 = 0x0100;
pub const RAISED_5TH: u16 = 0x0200;
pub const FLATTED_9TH: u16 = 0x0400;
pub const RAISED_9TH: u16 = 0x0800;
pub const RAISED_11TH: u16 = 0x1000;
pub const FLATTED_13TH: u16 = 0x2000;
pub const SUSPENDED_2ND: u16 = 0x4000;
pub const SUSPENDED_4TH: u16 = 0x8000;

/// Every modification flag, from extended 9th through suspended 4th
pub const FORMULA_MODIFICATIONS: [u16; 16] = [
    EXTENDED_9TH,
    EXTENDED_11TH,
    EXTENDED_13TH,
    ADDED_2ND,
    ADDED_4TH,
    ADDED_6TH,
    ADDED_9TH,
    ADDED_11TH,
    FLATTED_5TH,
    RAISED_5TH,
    FLATTED_9TH,
    RAISED_9TH,
    RAISED_11TH,
    FLATTED_13TH,
    SUSPENDED_2ND,
    SUSPENDED_4TH,
];

pub const MIN_FRET_POSITION: u8 = 0;
pub const MAX_FRET_POSITION: u8 = 24;
pub const FRET_POSITION_NOT_USED: u8 = 0xfe;

pub const MIN_TYPE: u8 = 2;
pub const MAX_TYPE: u8 = 8;
pub const TYPE_NOT_USED: u8 = 0xfe;

pub const DEFAULT_KEY: u16 = ((VARIATION_DEFAULT as u16) << 12)
    | ((C as u16) << 8)
    | ((VARIATION_DEFAULT as u16) << 4)
    | C as u16;
pub const DEFAULT_FORMULA: u8 = MAJOR;
pub const DEFAULT_FORMULA_MODIFICATIONS: u16 = 0;
pub const DEFAULT_EXTRA: u8 = 0;

// key word: tonic variation | tonic key | bass variation | bass key
const TONIC_VARIATION: BitField<u16> = BitField::new(0xf000, 12);
const TONIC_KEY: BitField<u16> = BitField::new(0x0f00, 8);
const BASS_VARIATION: BitField<u16> = BitField::new(0x00f0, 4);
const BASS_KEY: BitField<u16> = BitField::new(0x000f, 0);

// formula byte
const FORMULA: BitField<u8> = BitField::new(0x0f, 0);
const NO_CHORD: BitField<u8> = flag_u8(0x10);
const BRACKETS: BitField<u8> = flag_u8(0x20);
const BASS_NOTE_SHARPS: BitField<u8> = flag_u8(0x40);
const TONIC_SHARPS: BitField<u8> = flag_u8(0x80);

// extra byte: type (stored type - 1) | fret position (stored position + 1)
const TYPE: BitField<u8> = BitField::new(0xe0, 5);
const FRET_POSITION: BitField<u8> = BitField::new(0x1f, 0);

const KEY_TEXT_DEFAULT: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];
// spelled from the letter below
const KEY_TEXT_DOWN: [&str; 12] = [
    "B#", "Bx", "Cx", "D#", "Dx", "E#", "Ex", "Fx", "G#", "Gx", "A#", "Ax",
];
// spelled from the letter above
const KEY_TEXT_UP: [&str; 12] = [
    "Dbb", "Db", "Ebb", "Fbb", "Fb", "Gbb", "Gb", "Abb", "", "Bbb", "Cbb", "Cb",
];

const MAJOR_TEXT: &str = "maj";
const MINOR_TEXT: &str = "m";
const AUGMENTED_TEXT: &str = "+";
const DIMINISHED_TEXT: &str = "o";

/// Suffix of each formula when no extension is present
const FORMULA_SUFFIXES: [&str; 14] = [
    "", "m", "+", "o", "5", "6", "m6", "7", "maj7", "m7", "+7", "o7", "m/maj7", "m7b5",
];

const EXTENSIONS: [(u16, &str); 3] = [
    (EXTENDED_9TH, "9"),
    (EXTENDED_11TH, "11"),
    (EXTENDED_13TH, "13"),
];

/// Addition suffixes, appended in this order
const ADDITIONS: [(u16, &str); 13] = [
    (SUSPENDED_2ND, "sus2"),
    (SUSPENDED_4TH, "sus4"),
    (ADDED_2ND, "add2"),
    (ADDED_4TH, "add4"),
    (ADDED_6TH, "add6"),
    (ADDED_9TH, "add9"),
    (ADDED_11TH, "add11"),
    (FLATTED_13TH, "b13"),
    (RAISED_11TH, "#11"),
    (FLATTED_9TH, "b9"),
    (RAISED_9TH, "#9"),
    (FLATTED_5TH, "b5"),
    (RAISED_5TH, "#5"),
];

/// Chord name such as `Cm7/G` or `F#sus4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordName {
    key: u16,
    formula: u8,
    formula_modifications: u16,
    extra: u8,
}

impl Default for ChordName {
    fn default() -> Self {
        ChordName {
            key: DEFAULT_KEY,
            formula: DEFAULT_FORMULA,
            formula_modifications: DEFAULT_FORMULA_MODIFICATIONS,
            extra: DEFAULT_EXTRA,
        }
    }
}

impl ChordName {
    /// The bass note is set to the tonic.
    pub fn new(
        tonic_key: u8,
        tonic_variation: u8,
        formula: u8,
        formula_modifications: u16,
        fret_position: u8,
        chord_type: u8,
    ) -> Result<Self, ValidationError> {
        let mut chord = ChordName::default();
        chord.set_tonic(tonic_key, tonic_variation)?;
        chord.set_bass_note(tonic_key, tonic_variation)?;
        chord.set_formula(formula)?;
        chord.set_formula_modifications(formula_modifications);
        chord.set_fret_position(fret_position)?;
        chord.set_type(chord_type)?;
        Ok(chord)
    }

    pub const fn is_valid_key(key: u8) -> bool {
        key <= B
    }

    pub const fn is_valid_key_variation(variation: u8) -> bool {
        variation <= VARIATION_UP
    }

    /// Ab has no spelling from the letter above
    pub const fn is_valid_key_and_variation(key: u8, variation: u8) -> bool {
        Self::is_valid_key(key)
            && Self::is_valid_key_variation(variation)
            && !(key == A_FLAT && variation == VARIATION_UP)
    }

    pub fn set_tonic(&mut self, key: u8, variation: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_key_and_variation(key, variation) {
            return Err(ValidationError::KeyAndVariation { key, variation });
        }
        TONIC_KEY.set(&mut self.key, u16::from(key));
        TONIC_VARIATION.set(&mut self.key, u16::from(variation));
        Ok(())
    }

    /// (key, variation)
    pub fn tonic(&self) -> (u8, u8) {
        (
            TONIC_KEY.get(self.key) as u8,
            TONIC_VARIATION.get(self.key) as u8,
        )
    }

    pub fn is_same_tonic(&self, key: u8, variation: u8) -> bool {
        self.tonic() == (key, variation)
    }

    pub fn set_bass_note(&mut self, key: u8, variation: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_key_and_variation(key, variation) {
            return Err(ValidationError::KeyAndVariation { key, variation });
        }
        BASS_KEY.set(&mut self.key, u16::from(key));
        BASS_VARIATION.set(&mut self.key, u16::from(variation));
        Ok(())
    }

    /// (key, variation)
    pub fn bass_note(&self) -> (u8, u8) {
        (
            BASS_KEY.get(self.key) as u8,
            BASS_VARIATION.get(self.key) as u8,
        )
    }

    pub fn is_same_bass_note(&self, key: u8, variation: u8) -> bool {
        self.bass_note() == (key, variation)
    }

    pub const fn is_valid_formula(formula: u8) -> bool {
        formula <= MINOR_7TH_FLATTED_5TH
    }

    pub fn set_formula(&mut self, formula: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_formula(formula) {
            return Err(ValidationError::Formula(formula));
        }
        FORMULA.set(&mut self.formula, formula);
        Ok(())
    }

    pub fn formula(&self) -> u8 {
        FORMULA.get(self.formula)
    }

    pub fn set_no_chord(&mut self, set: bool) {
        NO_CHORD.set_flag(&mut self.formula, set);
    }

    pub fn is_no_chord(&self) -> bool {
        NO_CHORD.is_set(self.formula)
    }

    pub fn set_brackets(&mut self, set: bool) {
        BRACKETS.set_flag(&mut self.formula, set);
    }

    pub fn has_brackets(&self) -> bool {
        BRACKETS.is_set(self.formula)
    }

    pub fn set_tonic_sharps(&mut self, set: bool) {
        TONIC_SHARPS.set_flag(&mut self.formula, set);
    }

    pub fn uses_tonic_sharps(&self) -> bool {
        TONIC_SHARPS.is_set(self.formula)
    }

    pub fn set_bass_note_sharps(&mut self, set: bool) {
        BASS_NOTE_SHARPS.set_flag(&mut self.formula, set);
    }

    pub fn uses_bass_note_sharps(&self) -> bool {
        BASS_NOTE_SHARPS.is_set(self.formula)
    }

    /// Any combination of modification flags is valid
    pub fn set_formula_modifications(&mut self, formula_modifications: u16) {
        self.formula_modifications = formula_modifications;
    }

    pub const fn formula_modifications(&self) -> u16 {
        self.formula_modifications
    }

    pub const fn is_valid_formula_modification_flag(flag: u16) -> bool {
        flag.is_power_of_two()
    }

    pub fn set_formula_modification_flag(&mut self, flag: u16) -> Result<(), ValidationError> {
        if !Self::is_valid_formula_modification_flag(flag) {
            return Err(ValidationError::FormulaModificationFlag(flag));
        }
        flag_u16(flag).set_flag(&mut self.formula_modifications, true);
        Ok(())
    }

    pub fn clear_formula_modification_flag(&mut self, flag: u16) -> Result<(), ValidationError> {
        if !Self::is_valid_formula_modification_flag(flag) {
            return Err(ValidationError::FormulaModificationFlag(flag));
        }
        flag_u16(flag).set_flag(&mut self.formula_modifications, false);
        Ok(())
    }

    pub fn is_formula_modification_flag_set(&self, flag: u16) -> bool {
        Self::is_valid_formula_modification_flag(flag)
            && flag_u16(flag).is_set(self.formula_modifications)
    }

    /// Number of modification flags set, counted over `FORMULA_MODIFICATIONS`
    pub fn formula_modifications_count(&self) -> usize {
        FORMULA_MODIFICATIONS
            .iter()
            .filter(|&&flag| self.is_formula_modification_flag_set(flag))
            .count()
    }

    /// Suffix describing the formula and its modifications, e.g. "m7b5" or "9sus4"
    pub fn formula_text(&self) -> String {
        let formula = self.formula();
        let mut text = String::new();
        let mut has_extension = false;

        for (flag, extension) in EXTENSIONS {
            if self.formula_modifications & flag == 0 {
                continue;
            }
            has_extension = true;
            match formula {
                MAJOR_7TH..=MINOR_MAJOR_7TH => {
                    let prefix = match formula {
                        MAJOR_7TH => MAJOR_TEXT.to_string(),
                        MINOR_7TH => MINOR_TEXT.to_string(),
                        AUGMENTED_7TH => AUGMENTED_TEXT.to_string(),
                        DIMINISHED_7TH => DIMINISHED_TEXT.to_string(),
                        _ => format!("{MINOR_TEXT}/{MAJOR_TEXT}"),
                    };
                    text.push_str(&prefix);
                    text.push_str(extension);
                }
                MINOR_7TH_FLATTED_5TH.. => {
                    text.push_str(&format!("{MINOR_TEXT}{extension}b5"));
                }
                DOMINANT_7TH => text.push_str(extension),
                _ => {}
            }
        }

        if !has_extension {
            let suffix = FORMULA_SUFFIXES.get(usize::from(formula));
            text.push_str(suffix.copied().unwrap_or_default());
        }

        for (flag, addition) in ADDITIONS {
            if self.formula_modifications & flag != 0 {
                text.push_str(addition);
            }
        }
        text
    }

    pub const fn is_valid_fret_position(fret_position: u8) -> bool {
        fret_position <= MAX_FRET_POSITION || fret_position == FRET_POSITION_NOT_USED
    }

    pub fn set_fret_position(&mut self, fret_position: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_fret_position(fret_position) {
            return Err(ValidationError::FretPosition(fret_position));
        }
        let stored = if fret_position == FRET_POSITION_NOT_USED {
            0
        } else {
            fret_position + 1
        };
        FRET_POSITION.set(&mut self.extra, stored);
        Ok(())
    }

    pub fn fret_position(&self) -> u8 {
        match FRET_POSITION.get(self.extra) {
            0 => FRET_POSITION_NOT_USED,
            stored => stored - 1,
        }
    }

    pub const fn is_valid_type(chord_type: u8) -> bool {
        (chord_type >= MIN_TYPE && chord_type <= MAX_TYPE) || chord_type == TYPE_NOT_USED
    }

    /// Voicing type (Type 2 through Type 8)
    pub fn set_type(&mut self, chord_type: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_type(chord_type) {
            return Err(ValidationError::ChordType(chord_type));
        }
        let stored = if chord_type == TYPE_NOT_USED {
            0
        } else {
            chord_type - 1
        };
        TYPE.set(&mut self.extra, stored);
        Ok(())
    }

    pub fn chord_type(&self) -> u8 {
        match TYPE.get(self.extra) {
            0 => TYPE_NOT_USED,
            stored => stored + 1,
        }
    }

    /// Spelling of a key with the given variation, e.g. (E_FLAT, VARIATION_DOWN) is "D#"
    pub fn key_text(key: u8, variation: u8) -> Option<&'static str> {
        if !Self::is_valid_key_and_variation(key, variation) {
            return None;
        }
        let table = match variation {
            VARIATION_DOWN => &KEY_TEXT_DOWN,
            VARIATION_UP => &KEY_TEXT_UP,
            _ => &KEY_TEXT_DEFAULT,
        };
        Some(table[usize::from(key)])
    }

    /// Full chord name, e.g. "Cm7/G", "(A7)" or "N.C."
    pub fn text(&self) -> String {
        let (tonic_key, tonic_variation) = self.tonic();
        let (bass_key, bass_variation) = self.bass_note();
        let mut text = if self.is_no_chord() {
            "N.C.".to_string()
        } else {
            let mut text = Self::key_text(tonic_key, tonic_variation)
                .unwrap_or_default()
                .to_string();
            text.push_str(&self.formula_text());
            if (bass_key, bass_variation) != (tonic_key, tonic_variation) {
                text.push('/');
                text.push_str(Self::key_text(bass_key, bass_variation).unwrap_or_default());
            }
            text
        };
        if self.has_brackets() {
            text = format!("({text})");
        }
        text
    }

    /// Variation implied by a 1.0.x key and its "uses sharps" display flag
    fn infer_legacy_variation(key: u8, sharps: bool) -> u8 {
        match (sharps, key) {
            (true, E_FLAT | A_FLAT | B_FLAT) => VARIATION_DOWN,
            (false, C_SHARP | F_SHARP) => VARIATION_UP,
            _ => VARIATION_DEFAULT,
        }
    }
}

impl Serializable for ChordName {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError> {
        stream.write_u16(self.key);
        stream.write_u8(self.formula);
        stream.write_u16(self.formula_modifications);
        stream.write_u8(self.extra);
        stream.check_state()
    }

    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        version: FileVersion,
    ) -> Result<(), StreamError> {
        let chord = match version.layout() {
            // single key byte (tonic << 4 | bass), variations implied by the sharps flags
            Layout::Unpacked => {
                let key = stream.read_u8();
                let formula = stream.read_u8();
                let formula_modifications = stream.read_u16();
                let extra = stream.read_u8();
                stream.check_state()?;

                let mut chord = ChordName {
                    key: DEFAULT_KEY,
                    formula,
                    formula_modifications,
                    extra,
                };
                let tonic_key = (key >> 4) & 0x0f;
                let bass_key = key & 0x0f;
                let tonic_variation =
                    Self::infer_legacy_variation(tonic_key, chord.uses_tonic_sharps());
                let bass_variation =
                    Self::infer_legacy_variation(bass_key, chord.uses_bass_note_sharps());
                if let Err(err) = chord.set_tonic(tonic_key, tonic_variation) {
                    log::warn!("Ignoring legacy chord tonic: {err}");
                }
                if let Err(err) = chord.set_bass_note(bass_key, bass_variation) {
                    log::warn!("Ignoring legacy chord bass note: {err}");
                }
                chord
            }
            Layout::Packed => {
                let key = stream.read_u16();
                let formula = stream.read_u8();
                let formula_modifications = stream.read_u16();
                let extra = stream.read_u8();
                stream.check_state()?;
                ChordName {
                    key,
                    formula,
                    formula_modifications,
                    extra,
                }
            }
        };
        *self = chord;
        Ok(())
    }
}
