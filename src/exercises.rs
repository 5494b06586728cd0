use regex::Regex;
use std::sync::LazyLock;

use crate::api::types::Exercise;

static TQC_EXERCISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^TQC\+ (?P<kind>.+) 第.*$").expect("TQC exercise pattern is valid")
});

/// Exercises of one type, e.g. every `"TQC+ Python 第N類"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseType {
    pub name: String,
    pub exercises: Vec<Exercise>,
}

/// Groups TQC+ exercises by the type embedded in their name. Types keep the
/// order they first appear in; anything not named like a TQC+ exercise is
/// dropped.
pub fn group_by_type(exercises: Vec<Exercise>) -> Vec<ExerciseType> {
    let mut groups: Vec<ExerciseType> = Vec::new();

    for exercise in exercises {
        let Some(kind) = TQC_EXERCISE
            .captures(&exercise.name)
            .and_then(|caps| caps.name("kind"))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        match groups.iter_mut().find(|g| g.name == kind) {
            Some(group) => group.exercises.push(exercise),
            None => groups.push(ExerciseType {
                name: kind,
                exercises: vec![exercise],
            }),
        }
    }

    groups
}
