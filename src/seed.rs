use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use crate::journal::{
    AttendanceMap, Grade, GradeMap, Journal, NoteMap, Section, SectionId, Student, Teacher,
};

pub const SEED_FILE: &str = "seed.json";

fn attendance(pairs: &[(SectionId, &[(&str, bool)])]) -> AttendanceMap {
    pairs
        .iter()
        .map(|(section, dates)| {
            (
                *section,
                dates.iter().map(|(d, p)| (d.to_string(), *p)).collect(),
            )
        })
        .collect()
}

fn grades(pairs: &[(SectionId, &[(&str, Grade)])]) -> GradeMap {
    pairs
        .iter()
        .map(|(section, dates)| {
            (
                *section,
                dates.iter().map(|(d, g)| (d.to_string(), *g)).collect(),
            )
        })
        .collect()
}

fn notes(pairs: &[(SectionId, &str)]) -> NoteMap {
    pairs
        .iter()
        .map(|(section, note)| (*section, note.to_string()))
        .collect()
}

fn section(id: SectionId, name: &str, description: &str, schedule: &str, teacher: &str) -> Section {
    Section {
        id,
        name: name.to_string(),
        description: description.to_string(),
        schedule: schedule.to_string(),
        teacher: teacher.to_string(),
    }
}

fn teacher(id: &str, name: &str, email: &str, sections: Vec<SectionId>) -> Teacher {
    Teacher {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: "teacher123".to_string(),
        sections,
    }
}

/// The roster a fresh profile starts from. Schedule strings carry a literal
/// weekday name; the upcoming-class view keys off those tokens.
pub fn default_journal() -> Journal {
    use Grade::{Graded, Ungraded};
    use SectionId::{Acting, Dancing, Singing, Speech};

    let students = vec![
        Student {
            id: "1".to_string(),
            name: "Anna Ivanova".to_string(),
            email: Some("anna@example.com".to_string()),
            password: Some("student123".to_string()),
            sections: vec![Acting, Singing],
            attendance: attendance(&[
                (Acting, &[("2023-10-01", true), ("2023-10-08", false)]),
                (Singing, &[("2023-10-02", true), ("2023-10-09", true)]),
            ]),
            grades: grades(&[
                (Acting, &[("2023-10-01", Graded(4)), ("2023-10-08", Graded(5))]),
                (Singing, &[("2023-10-02", Graded(5)), ("2023-10-09", Graded(4))]),
            ]),
            notes: notes(&[
                (Acting, "Handles her etude work very well"),
                (Singing, "Good vocal range"),
            ]),
        },
        Student {
            id: "2".to_string(),
            name: "Ivan Petrov".to_string(),
            email: Some("ivan@example.com".to_string()),
            password: Some("student123".to_string()),
            sections: vec![Dancing, Speech],
            attendance: attendance(&[
                (Dancing, &[("2023-10-03", true), ("2023-10-10", true)]),
                (Speech, &[("2023-10-04", false), ("2023-10-11", true)]),
            ]),
            grades: grades(&[
                (Dancing, &[("2023-10-03", Graded(5)), ("2023-10-10", Graded(5))]),
                (Speech, &[("2023-10-04", Graded(3)), ("2023-10-11", Graded(4))]),
            ]),
            notes: notes(&[
                (Dancing, "Picks up new moves quickly"),
                (Speech, "Needs to work on diction"),
            ]),
        },
        Student {
            id: "3".to_string(),
            name: "Maria Sidorova".to_string(),
            email: Some("maria@example.com".to_string()),
            password: Some("student123".to_string()),
            sections: vec![Acting, Dancing, Speech],
            attendance: attendance(&[
                (Acting, &[("2023-10-01", true), ("2023-10-08", true)]),
                (Dancing, &[("2023-10-03", true), ("2023-10-10", false)]),
                (Speech, &[("2023-10-04", true), ("2023-10-11", true)]),
            ]),
            grades: grades(&[
                (Acting, &[("2023-10-01", Graded(5)), ("2023-10-08", Graded(5))]),
                (Dancing, &[("2023-10-03", Graded(4)), ("2023-10-10", Ungraded)]),
                (Speech, &[("2023-10-04", Graded(4)), ("2023-10-11", Graded(5))]),
            ]),
            notes: notes(&[
                (Acting, "Excellent feel for character"),
                (Dancing, "Moves gracefully"),
                (Speech, "Expressive delivery"),
            ]),
        },
    ];

    let teachers = vec![
        teacher(
            "teacher1",
            "Alexander Viktorovich",
            "alex@example.com",
            vec![Acting],
        ),
        teacher(
            "teacher2",
            "Elena Sergeevna",
            "elena@example.com",
            vec![Singing],
        ),
        teacher(
            "teacher3",
            "Natalia Andreevna",
            "natalia@example.com",
            vec![Speech],
        ),
        teacher(
            "teacher4",
            "Sergey Petrovich",
            "sergey@example.com",
            vec![Dancing],
        ),
    ];

    let sections: BTreeMap<SectionId, Section> = [
        section(
            Acting,
            "Acting",
            "Acting technique, etude work, stage movement",
            "Sunday, 10:00-12:00",
            "Alexander Viktorovich",
        ),
        section(
            Singing,
            "Singing",
            "Vocals, breath work, ear training",
            "Monday, 15:00-17:00",
            "Elena Sergeevna",
        ),
        section(
            Speech,
            "Stage Speech",
            "Diction, voice production, public speaking",
            "Wednesday, 16:00-18:00",
            "Natalia Andreevna",
        ),
        section(
            Dancing,
            "Dance",
            "Choreography, plasticity, rhythm work",
            "Tuesday, 18:00-20:00",
            "Sergey Petrovich",
        ),
    ]
    .into_iter()
    .map(|s| (s.id, s))
    .collect();

    Journal {
        students,
        sections,
        teachers,
    }
}

/// Loads `seed.json` from the profile directory when present, otherwise
/// the built-in roster.
pub fn load_or_default(profile_dir: &Path) -> anyhow::Result<Journal> {
    let seed_path = profile_dir.join(SEED_FILE);
    if !seed_path.exists() {
        return Ok(default_journal());
    }
    let raw = std::fs::read_to_string(&seed_path)
        .with_context(|| format!("read {}", seed_path.display()))?;
    let journal: Journal =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", seed_path.display()))?;
    log::info!("seeded journal from {}", seed_path.display());
    Ok(journal)
}
