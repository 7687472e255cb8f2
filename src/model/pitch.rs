pub const SHARP_NOTES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub const FLAT_NOTES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Highest valid MIDI note
pub const MAX_MIDI_NOTE: u8 = 127;

pub const fn is_valid_midi_note(note: u8) -> bool {
    note <= MAX_MIDI_NOTE
}

/// Pitch class name of a MIDI note, without octave
pub fn midi_note_text(note: u8, sharps: bool) -> &'static str {
    let pitch_class = usize::from(note % 12);
    if sharps {
        SHARP_NOTES[pitch_class]
    } else {
        FLAT_NOTES[pitch_class]
    }
}
