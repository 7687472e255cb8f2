pub mod barline;
pub mod chord_name;
pub mod dynamic;
pub mod pitch;
pub mod position;
mod round_trip_tests;
pub mod staff;
pub mod tempo_marker;
pub mod tuning;
