#[cfg(test)]
mod tests {
    use crate::codec::{FileVersion, InputStream, OutputStream, Serializable};
    use crate::model::barline::{Barline, REPEAT_END};
    use crate::model::chord_name::{
        ChordName, ADDED_9TH, DOMINANT_7TH, EXTENDED_9TH, FRET_POSITION_NOT_USED, G, MINOR,
        TYPE_NOT_USED, VARIATION_DEFAULT,
    };
    use crate::model::dynamic::{Dynamic, VolumeLevel};
    use crate::model::position::{Note, Position, LET_RING, TIED};
    use crate::model::staff::{Staff, BASS_CLEF};
    use crate::model::tempo_marker::{TempoMarker, QUARTER};
    use crate::model::tuning::Tuning;
    use crate::StreamError;

    fn init_logger() {
        env_logger::builder()
            .is_test(true)
            .try_init()
            .unwrap_or_default();
    }

    /// Document-like section holding one of each entity
    #[derive(Debug, Default, PartialEq)]
    struct Section {
        tuning: Tuning,
        chords: Vec<ChordName>,
        staves: Vec<Staff>,
        dynamics: Vec<Dynamic>,
        barlines: Vec<Barline>,
        tempo: TempoMarker,
    }

    impl Serializable for Section {
        fn serialize<W: std::io::Write>(
            &self,
            stream: &mut OutputStream<W>,
        ) -> Result<(), StreamError> {
            self.tuning.serialize(stream)?;
            stream.write_vector(&self.chords)?;
            stream.write_vector(&self.staves)?;
            stream.write_vector(&self.dynamics)?;
            stream.write_vector(&self.barlines)?;
            self.tempo.serialize(stream)
        }

        fn deserialize(
            &mut self,
            stream: &mut InputStream<'_>,
            version: FileVersion,
        ) -> Result<(), StreamError> {
            let mut tuning = Tuning::default();
            tuning.deserialize(stream, version)?;
            let chords = stream.read_vector(version)?;
            let staves = stream.read_vector(version)?;
            let dynamics = stream.read_vector(version)?;
            let barlines = stream.read_vector(version)?;
            let mut tempo = TempoMarker::default();
            tempo.deserialize(stream, version)?;
            *self = Section {
                tuning,
                chords,
                staves,
                dynamics,
                barlines,
                tempo,
            };
            Ok(())
        }
    }

    fn sample_section() -> Section {
        let mut chord = ChordName::new(
            G,
            VARIATION_DEFAULT,
            DOMINANT_7TH,
            EXTENDED_9TH,
            FRET_POSITION_NOT_USED,
            TYPE_NOT_USED,
        )
        .unwrap();
        chord.set_brackets(true);
        let minor = ChordName::new(G, VARIATION_DEFAULT, MINOR, ADDED_9TH, 3, 2).unwrap();

        let mut staff = Staff::new(7, BASS_CLEF).unwrap();
        let mut position = Position::new(1, 8).unwrap();
        position.set_flag(LET_RING, true).unwrap();
        let mut note = Note::new(6, 12).unwrap();
        note.set_flag(TIED, true).unwrap();
        position.add_note(note);
        position.add_note(Note::new(0, 0).unwrap());
        staff.push_high_melody_position(position);
        staff.push_low_melody_position(Position::new(2, 32).unwrap());

        Section {
            tuning: Tuning::new("Drop D", -2, true, &[64, 59, 55, 50, 45, 38]).unwrap(),
            chords: vec![chord, minor],
            staves: vec![staff, Staff::default()],
            dynamics: vec![Dynamic::new(0, VolumeLevel::Mp), Dynamic::new(9, VolumeLevel::Fff)],
            barlines: vec![Barline::new(4, REPEAT_END, 2).unwrap()],
            tempo: TempoMarker::new(0, QUARTER, 180, "Fast Rock").unwrap(),
        }
    }

    #[test]
    fn test_section_round_trip() {
        init_logger();
        let section = sample_section();
        let mut output = OutputStream::new(Vec::new());
        section.serialize(&mut output).unwrap();
        let bytes = output.into_inner();

        let mut input = InputStream::new(&bytes);
        let mut decoded = Section::default();
        decoded.deserialize(&mut input, FileVersion::CURRENT).unwrap();
        assert_eq!(decoded, section);
        assert!(input.remaining().is_empty());
        assert_eq!(decoded.chords[0].text(), "(G9)");
        assert_eq!(decoded.tuning.spelling(), "D A D G B E");
    }

    #[test]
    fn test_truncation_at_every_offset_fails_cleanly() {
        init_logger();
        let section = sample_section();
        let mut output = OutputStream::new(Vec::new());
        section.serialize(&mut output).unwrap();
        let bytes = output.into_inner();

        for len in 0..bytes.len() {
            let mut input = InputStream::new(&bytes[..len]);
            let mut decoded = Section::default();
            let result = decoded.deserialize(&mut input, FileVersion::CURRENT);
            assert!(result.is_err(), "truncated at {len} should fail");
            assert_eq!(decoded, Section::default());
            // poisoned streams stay poisoned and stop consuming
            let position = input.position();
            assert_eq!(input.read_u32(), 0);
            assert_eq!(input.position(), position);
            assert!(input.check_state().is_err());
        }
    }

    #[test]
    fn test_poisoned_stream_fails_following_entities() {
        init_logger();
        let bytes = [1, 2];
        let mut input = InputStream::new(&bytes);
        let mut dynamic = Dynamic::default();
        assert!(dynamic
            .deserialize(&mut input, FileVersion::CURRENT)
            .is_err());
        let mut barline = Barline::default();
        let err = barline
            .deserialize(&mut input, FileVersion::CURRENT)
            .unwrap_err();
        assert!(matches!(err, StreamError::UnexpectedEof { offset: 0, .. }));
        assert_eq!(barline, Barline::default());
    }

    #[test]
    fn test_failing_sink_stops_writing() {
        let section = sample_section();
        let mut output = OutputStream::new(std::io::sink());
        section.serialize(&mut output).unwrap();
        assert!(output.is_ok());

        let mut buffer = [0u8; 8];
        let mut output = OutputStream::new(&mut buffer[..]);
        assert!(section.serialize(&mut output).is_err());
        assert!(!output.is_ok());
        assert_eq!(output.position(), 8);
    }
}
