mod exercise;
mod logbook;
mod weight_unit;

pub use exercise::{
    EntryId, Exercise, ExerciseForm, NewExercise, ValidationError, DEFAULT_DAY, DEFAULT_WEEK,
};
pub use logbook::Logbook;
pub use weight_unit::WeightUnit;
