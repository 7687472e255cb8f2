//! Integration tests for ptbkit library usage.
//!
//! These tests verify that the library can be used as a dependency
//! from external projects.

use ptbkit::model::chord_name::{
    ADDED_6TH, A_FLAT, DOMINANT_7TH, EXTENDED_9TH, E_FLAT, FRET_POSITION_NOT_USED, MAJOR, MINOR,
    TYPE_NOT_USED, VARIATION_DEFAULT, VARIATION_DOWN, VARIATION_UP,
};
use ptbkit::model::tuning::NOT_USED;
use ptbkit::{
    from_bytes, to_bytes, Barline, ChordName, Dynamic, FileVersion, InputStream, Layout, Note,
    OutputStream, Position, PtbError, Serializable, Staff, StreamError, TempoMarker, Tuning,
    ValidationError, VolumeLevel,
};

fn chord(key: u8, variation: u8, formula: u8, modifications: u16) -> ChordName {
    ChordName::new(
        key,
        variation,
        formula,
        modifications,
        FRET_POSITION_NOT_USED,
        TYPE_NOT_USED,
    )
    .expect("valid chord")
}

/// Test that all major types are accessible from the library.
#[test]
fn test_types_accessible() {
    // If any re-export is missing, this test will fail to compile.
    fn _assert_types() {
        let _: fn(&Tuning) -> Result<Vec<u8>, StreamError> = to_bytes::<Tuning>;
        let _: fn(&[u8], FileVersion) -> Result<Staff, StreamError> = from_bytes::<Staff>;
        let _: Layout = FileVersion::CURRENT.layout();
        let _: Option<PtbError> = None;
        let _: Option<(Dynamic, VolumeLevel, Barline, TempoMarker, Position, Note)> = None;
    }
}

/// Six string tuning written and read back with the current version.
#[test]
fn test_tuning_scenario() {
    let tuning = Tuning::new("Standard", 0, false, &[64, 69, 74, 79, 83, 88]).unwrap();
    let bytes = to_bytes(&tuning).unwrap();
    let decoded: Tuning = from_bytes(&bytes, FileVersion::CURRENT).unwrap();

    assert_eq!(decoded, tuning);
    assert_eq!(decoded.string_count(), 6);
    assert!(decoded.is_same_tuning_notes(&[64, 69, 74, 79, 83, 88]));
    assert_eq!(decoded.spelling(), "E B G D A E");
    assert_eq!(decoded.name(), "Standard");
}

#[test]
fn test_unused_tuning_slot_is_kept() {
    let mut tuning = Tuning::new("Seven", 0, true, &[64, 59, 55, 50, 45, 40, 35]).unwrap();
    tuning.set_note(6, NOT_USED).unwrap();
    let decoded: Tuning = from_bytes(&to_bytes(&tuning).unwrap(), FileVersion::CURRENT).unwrap();
    assert_eq!(decoded.notes()[6], NOT_USED);
    assert_eq!(decoded.string_count(), 6);
}

#[test]
fn test_formula_text() {
    assert_eq!(chord(0, VARIATION_DEFAULT, DOMINANT_7TH, EXTENDED_9TH).formula_text(), "9");
    assert_eq!(chord(0, VARIATION_DEFAULT, MAJOR, ADDED_6TH).formula_text(), "add6");
    assert_eq!(chord(0, VARIATION_DEFAULT, MINOR, 0).formula_text(), "m");
}

#[test]
fn test_chord_setters_reject_without_mutation() {
    let mut chord = chord(E_FLAT, VARIATION_DOWN, MINOR, 0);
    let before = chord;
    assert!(matches!(
        chord.set_tonic(A_FLAT, VARIATION_UP),
        Err(ValidationError::KeyAndVariation { .. })
    ));
    assert!(chord.set_bass_note(12, VARIATION_DEFAULT).is_err());
    assert!(chord.set_formula(14).is_err());
    assert!(chord.set_fret_position(25).is_err());
    assert!(chord.set_type(9).is_err());
    assert_eq!(chord, before);
}

#[test]
fn test_chord_sentinels_round_trip() {
    let chord = chord(A_FLAT, VARIATION_DEFAULT, MAJOR, 0);
    assert_eq!(chord.fret_position(), FRET_POSITION_NOT_USED);
    assert_eq!(chord.chord_type(), TYPE_NOT_USED);
    let decoded: ChordName = from_bytes(&to_bytes(&chord).unwrap(), FileVersion::V1_5).unwrap();
    assert_eq!(decoded, chord);
}

/// Entities written one after another on a single stream.
#[test]
fn test_shared_stream() {
    let mut staff = Staff::default();
    let mut position = Position::new(0, 4).unwrap();
    position.add_note(Note::new(3, 5).unwrap());
    staff.push_high_melody_position(position);
    let dynamic = Dynamic::new(2, VolumeLevel::Pp);

    let mut output = OutputStream::new(Vec::new());
    staff.serialize(&mut output).unwrap();
    dynamic.serialize(&mut output).unwrap();
    let bytes = output.into_inner();

    let mut input = InputStream::new(&bytes);
    let mut decoded_staff = Staff::default();
    let mut decoded_dynamic = Dynamic::default();
    decoded_staff
        .deserialize(&mut input, FileVersion::CURRENT)
        .unwrap();
    decoded_dynamic
        .deserialize(&mut input, FileVersion::CURRENT)
        .unwrap();
    assert_eq!(decoded_staff, staff);
    assert_eq!(decoded_dynamic, dynamic);
    assert!(input.check_state().is_ok());
}

#[test]
fn test_truncated_input_reports_stream_error() {
    let bytes = to_bytes(&Tuning::standard_guitar()).unwrap();
    let result: Result<Tuning, StreamError> =
        from_bytes(&bytes[..bytes.len() - 1], FileVersion::CURRENT);
    let err = PtbError::from(result.unwrap_err());
    assert!(matches!(
        err,
        PtbError::StreamError(StreamError::UnexpectedEof { .. })
    ));
}

#[test]
fn test_file_version_parsing() {
    let version: FileVersion = "1.0.2".parse().unwrap();
    assert_eq!(version, FileVersion::V1_0_2);
    assert_eq!(version.layout(), Layout::Unpacked);
    assert_eq!(FileVersion::from_u16(4), Some(FileVersion::CURRENT));
    assert!("3.0".parse::<FileVersion>().is_err());
}
