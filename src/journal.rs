use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The studio's section offerings are a closed set; everything else in the
/// journal keys off these identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Acting,
    Singing,
    Speech,
    Dancing,
}

impl SectionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Acting => "acting",
            SectionId::Singing => "singing",
            SectionId::Speech => "speech",
            SectionId::Dancing => "dancing",
        }
    }
}

/// One class date's grade. The wire format is the integer 0..=5 where 0
/// means "no grade recorded", which is not the same thing as a low score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Grade {
    Ungraded,
    Graded(u8),
}

impl Grade {
    /// The recorded score, if one exists.
    pub fn value(self) -> Option<u8> {
        match self {
            Grade::Ungraded => None,
            Grade::Graded(v) => Some(v),
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Grade::Ungraded),
            1..=5 => Ok(Grade::Graded(raw)),
            _ => Err(format!("grade must be between 0 and 5, got {raw}")),
        }
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> u8 {
        grade.value().unwrap_or(0)
    }
}

pub type AttendanceMap = BTreeMap<SectionId, BTreeMap<String, bool>>;
pub type GradeMap = BTreeMap<SectionId, BTreeMap<String, Grade>>;
pub type NoteMap = BTreeMap<SectionId, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub teacher: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub sections: Vec<SectionId>,
}

/// Attendance, grades, and notes are keyed by the sections the student is
/// enrolled in. That is a convention of the callers, not a store invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionId>,
    #[serde(default)]
    pub attendance: AttendanceMap,
    #[serde(default)]
    pub grades: GradeMap,
    #[serde(default)]
    pub notes: NoteMap,
}

/// The aggregate the daemon keeps in memory: the mutable student roster and
/// section records, plus the seeded teacher roster used only for login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub students: Vec<Student>,
    pub sections: BTreeMap<SectionId, Section>,
    pub teachers: Vec<Teacher>,
}

/// Creation payload: everything but the name may be omitted and defaults to
/// empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionId>,
    #[serde(default)]
    pub attendance: AttendanceMap,
    #[serde(default)]
    pub grades: GradeMap,
    #[serde(default)]
    pub notes: NoteMap,
}

/// Shallow merge: a present field replaces the stored one wholesale, nested
/// maps included. Callers that want cell-level updates use the dedicated
/// attendance/grade/note operations instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub sections: Option<Vec<SectionId>>,
    pub attendance: Option<AttendanceMap>,
    pub grades: Option<GradeMap>,
    pub notes: Option<NoteMap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub schedule: Option<String>,
    pub teacher: Option<String>,
}

/// Sole owner of the mutable journal state. Every operation is a synchronous
/// whole-record transition; mutations naming an unknown id are silent no-ops.
#[derive(Debug)]
pub struct JournalStore {
    journal: Journal,
}

impl JournalStore {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }

    pub fn snapshot(&self) -> &Journal {
        &self.journal
    }

    /// Appends a student under a fresh id minted from the current time.
    pub fn add_student(&mut self, new: NewStudent) -> String {
        let id = Utc::now().timestamp_millis().to_string();
        self.journal.students.push(Student {
            id: id.clone(),
            name: new.name,
            email: new.email,
            password: new.password,
            sections: new.sections,
            attendance: new.attendance,
            grades: new.grades,
            notes: new.notes,
        });
        id
    }

    pub fn update_student(&mut self, id: &str, patch: StudentPatch) {
        let Some(student) = self.journal.students.iter_mut().find(|s| s.id == id) else {
            return;
        };
        if let Some(name) = patch.name {
            student.name = name;
        }
        if let Some(email) = patch.email {
            student.email = Some(email);
        }
        if let Some(password) = patch.password {
            student.password = Some(password);
        }
        if let Some(sections) = patch.sections {
            student.sections = sections;
        }
        if let Some(attendance) = patch.attendance {
            student.attendance = attendance;
        }
        if let Some(grades) = patch.grades {
            student.grades = grades;
        }
        if let Some(notes) = patch.notes {
            student.notes = notes;
        }
    }

    /// Hard delete; repeating it is a no-op.
    pub fn remove_student(&mut self, id: &str) {
        self.journal.students.retain(|s| s.id != id);
    }

    /// Sets one attendance cell, keeping every other recorded date for the
    /// section.
    pub fn update_attendance(
        &mut self,
        student_id: &str,
        section: SectionId,
        date: &str,
        present: bool,
    ) {
        if let Some(student) = self.student_mut(student_id) {
            student
                .attendance
                .entry(section)
                .or_default()
                .insert(date.to_string(), present);
        }
    }

    /// Sets one grade cell, keeping every other recorded date for the
    /// section.
    pub fn update_grade(&mut self, student_id: &str, section: SectionId, date: &str, grade: Grade) {
        if let Some(student) = self.student_mut(student_id) {
            student
                .grades
                .entry(section)
                .or_default()
                .insert(date.to_string(), grade);
        }
    }

    /// One note per section; a new note overwrites the previous one.
    pub fn update_note(&mut self, student_id: &str, section: SectionId, note: &str) {
        if let Some(student) = self.student_mut(student_id) {
            student.notes.insert(section, note.to_string());
        }
    }

    pub fn update_section(&mut self, id: SectionId, patch: SectionPatch) {
        let Some(section) = self.journal.sections.get_mut(&id) else {
            return;
        };
        if let Some(name) = patch.name {
            section.name = name;
        }
        if let Some(description) = patch.description {
            section.description = description;
        }
        if let Some(schedule) = patch.schedule {
            section.schedule = schedule;
        }
        if let Some(teacher) = patch.teacher {
            section.teacher = teacher;
        }
    }

    fn student_mut(&mut self, id: &str) -> Option<&mut Student> {
        self.journal.students.iter_mut().find(|s| s.id == id)
    }
}
