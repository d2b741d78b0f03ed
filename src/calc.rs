use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::journal::{Grade, Journal, SectionId, Student};
use crate::session::Identity;

/// Weekday tokens as they appear in schedule strings, Sunday-first so the
/// index doubles as the 0=Sunday..6=Saturday day number.
const WEEKDAY_TOKENS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Round-half-up to one decimal place.
pub fn round_to_tenth(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

fn round_percent(numer: usize, denom: usize) -> u32 {
    if denom == 0 {
        return 0;
    }
    ((100.0 * numer as f64 / denom as f64) + 0.5).floor() as u32
}

/// Mean of the graded cells for one of the student's sections, to one
/// decimal. `None` when nothing has been graded yet; ungraded cells never
/// drag the mean down.
pub fn average_grade(student: &Student, section: SectionId) -> Option<f64> {
    let cells = student.grades.get(&section)?;
    let graded: Vec<u8> = cells.values().filter_map(|g| g.value()).collect();
    if graded.is_empty() {
        return None;
    }
    let sum: u32 = graded.iter().map(|v| u32::from(*v)).sum();
    Some(round_to_tenth(f64::from(sum) / graded.len() as f64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRatio {
    pub present: usize,
    pub total: usize,
    pub percent: u32,
}

/// Present dates over recorded dates as a whole-number percentage; a
/// section with no records is 0%, not an error.
pub fn attendance_ratio(student: &Student, section: SectionId) -> AttendanceRatio {
    let (present, total) = match student.attendance.get(&section) {
        Some(cells) => (cells.values().filter(|p| **p).count(), cells.len()),
        None => (0, 0),
    };
    AttendanceRatio {
        present,
        total,
        percent: round_percent(present, total),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub section_id: SectionId,
    pub section_name: String,
    pub average_grade: Option<f64>,
    pub attendance: AttendanceRatio,
}

/// Average grade and attendance ratio for each section the student is
/// enrolled in, in enrollment order.
pub fn student_progress(journal: &Journal, student: &Student) -> Vec<SectionProgress> {
    student
        .sections
        .iter()
        .filter_map(|section_id| {
            let section = journal.sections.get(section_id)?;
            Some(SectionProgress {
                section_id: *section_id,
                section_name: section.name.clone(),
                average_grade: average_grade(student, *section_id),
                attendance: attendance_ratio(student, *section_id),
            })
        })
        .collect()
}

/// Sunday-first day number for the first weekday token found in a schedule
/// string, e.g. "Tuesday, 18:00-20:00" -> 2.
pub fn schedule_weekday(schedule: &str) -> Option<u32> {
    WEEKDAY_TOKENS
        .iter()
        .position(|token| schedule.contains(token))
        .map(|i| i as u32)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingClass {
    pub section_id: SectionId,
    pub name: String,
    pub schedule: String,
    pub teacher: String,
    pub next_date: String,
    pub days_until: i64,
}

/// Next occurrence of each enrolled section's scheduled weekday, soonest
/// first. A section that meets today rolls to next week (offset 7): a class
/// already held today is never surfaced as upcoming.
pub fn upcoming_classes(
    journal: &Journal,
    student: &Student,
    today: NaiveDate,
) -> Vec<UpcomingClass> {
    let today_day = i64::from(today.weekday().num_days_from_sunday());
    let mut upcoming: Vec<UpcomingClass> = student
        .sections
        .iter()
        .filter_map(|section_id| {
            let section = journal.sections.get(section_id)?;
            let class_day = i64::from(schedule_weekday(&section.schedule)?);
            let mut days_until = class_day - today_day;
            if days_until <= 0 {
                days_until += 7;
            }
            let next_date = today + Duration::days(days_until);
            Some(UpcomingClass {
                section_id: *section_id,
                name: section.name.clone(),
                schedule: section.schedule.clone(),
                teacher: section.teacher.clone(),
                next_date: next_date.format("%Y-%m-%d").to_string(),
                days_until,
            })
        })
        .collect();
    upcoming.sort_by_key(|c| c.days_until);
    upcoming
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentGrade {
    pub section_id: SectionId,
    pub section_name: String,
    pub date: String,
    pub grade: Grade,
}

/// Every (section, date, grade) cell across the student's sections, newest
/// date first, truncated to `limit`. Ungraded cells are part of the feed;
/// rendering them as N/A is the client's concern.
pub fn recent_grades(journal: &Journal, student: &Student, limit: usize) -> Vec<RecentGrade> {
    let mut feed: Vec<RecentGrade> = Vec::new();
    for section_id in &student.sections {
        let Some(section) = journal.sections.get(section_id) else {
            continue;
        };
        let Some(cells) = student.grades.get(section_id) else {
            continue;
        };
        for (date, grade) in cells {
            feed.push(RecentGrade {
                section_id: *section_id,
                section_name: section.name.clone(),
                date: date.clone(),
                grade: *grade,
            });
        }
    }
    feed.sort_by_key(|g| {
        std::cmp::Reverse(NaiveDate::parse_from_str(&g.date, "%Y-%m-%d").unwrap_or(NaiveDate::MIN))
    });
    feed.truncate(limit);
    feed
}

/// Students visible to a teacher: anyone enrolled in at least one of the
/// teacher's sections, optionally narrowed by a case-insensitive substring
/// match on the name.
pub fn visible_students<'a>(
    journal: &'a Journal,
    teacher_sections: &[SectionId],
    query: &str,
) -> Vec<&'a Student> {
    let needle = query.to_lowercase();
    journal
        .students
        .iter()
        .filter(|s| s.sections.iter().any(|sec| teacher_sections.contains(sec)))
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}

/// The one authorization rule for journal edits: only a teacher, and only
/// on a section they are assigned to.
pub fn can_edit(principal: Option<&Identity>, section: SectionId) -> bool {
    match principal {
        Some(Identity::Teacher { sections, .. }) => sections.contains(&section),
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRosterEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOnDate {
    pub section_id: SectionId,
    pub name: String,
    pub schedule: String,
    pub students: Vec<ClassRosterEntry>,
}

/// The teacher's sections that meet on `date`'s weekday, each with the
/// enrolled students from that teacher's roster.
pub fn classes_on_date(
    journal: &Journal,
    teacher_sections: &[SectionId],
    date: NaiveDate,
) -> Vec<ClassOnDate> {
    let token = WEEKDAY_TOKENS[date.weekday().num_days_from_sunday() as usize];
    let roster = visible_students(journal, teacher_sections, "");
    teacher_sections
        .iter()
        .filter_map(|section_id| {
            let section = journal.sections.get(section_id)?;
            if !section.schedule.contains(token) {
                return None;
            }
            let students = roster
                .iter()
                .filter(|s| s.sections.contains(section_id))
                .map(|s| ClassRosterEntry {
                    id: s.id.clone(),
                    name: s.name.clone(),
                })
                .collect();
            Some(ClassOnDate {
                section_id: *section_id,
                name: section.name.clone(),
                schedule: section.schedule.clone(),
                students,
            })
        })
        .collect()
}

pub fn section_student_count(journal: &Journal, section: SectionId) -> usize {
    journal
        .students
        .iter()
        .filter(|s| s.sections.contains(&section))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_journal;

    fn find<'a>(journal: &'a Journal, id: &str) -> &'a Student {
        journal
            .students
            .iter()
            .find(|s| s.id == id)
            .expect("seed student")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn round_to_tenth_is_half_up() {
        assert_eq!(round_to_tenth(0.0), 0.0);
        assert_eq!(round_to_tenth(3.54), 3.5);
        assert_eq!(round_to_tenth(3.55), 3.6);
        assert_eq!(round_to_tenth(4.45), 4.5);
        assert_eq!(round_to_tenth(4.666), 4.7);
    }

    #[test]
    fn average_excludes_ungraded_cells() {
        let journal = default_journal();
        // Anna: acting 4 and 5.
        assert_eq!(
            average_grade(find(&journal, "1"), SectionId::Acting),
            Some(4.5)
        );
        // Maria: dancing 4 plus an ungraded cell; the 0 must not count.
        assert_eq!(
            average_grade(find(&journal, "3"), SectionId::Dancing),
            Some(4.0)
        );
        assert_eq!(
            average_grade(find(&journal, "3"), SectionId::Acting),
            Some(5.0)
        );
    }

    #[test]
    fn average_is_none_when_nothing_graded() {
        let mut journal = default_journal();
        journal.students[0]
            .grades
            .get_mut(&SectionId::Acting)
            .expect("acting grades")
            .values_mut()
            .for_each(|g| *g = Grade::Ungraded);
        assert_eq!(average_grade(&journal.students[0], SectionId::Acting), None);
        // A section with no grade map at all is also None.
        assert_eq!(average_grade(&journal.students[0], SectionId::Speech), None);
    }

    #[test]
    fn attendance_ratio_handles_empty_sections() {
        let journal = default_journal();
        let anna = find(&journal, "1");
        assert_eq!(
            attendance_ratio(anna, SectionId::Acting),
            AttendanceRatio {
                present: 1,
                total: 2,
                percent: 50
            }
        );
        assert_eq!(
            attendance_ratio(anna, SectionId::Speech),
            AttendanceRatio {
                present: 0,
                total: 0,
                percent: 0
            }
        );
    }

    #[test]
    fn schedule_weekday_finds_the_token() {
        assert_eq!(schedule_weekday("Sunday, 10:00-12:00"), Some(0));
        assert_eq!(schedule_weekday("Tuesday, 18:00-20:00"), Some(2));
        assert_eq!(schedule_weekday("twice a month"), None);
    }

    #[test]
    fn upcoming_rolls_today_to_next_week() {
        let journal = default_journal();
        // 2024-01-07 is a Sunday; Anna has acting on Sunday, singing on Monday.
        let upcoming = upcoming_classes(&journal, find(&journal, "1"), date(2024, 1, 7));
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].section_id, SectionId::Singing);
        assert_eq!(upcoming[0].days_until, 1);
        assert_eq!(upcoming[0].next_date, "2024-01-08");
        assert_eq!(upcoming[1].section_id, SectionId::Acting);
        assert_eq!(upcoming[1].days_until, 7);
        assert_eq!(upcoming[1].next_date, "2024-01-14");
    }

    #[test]
    fn upcoming_sorts_ascending_by_offset() {
        let journal = default_journal();
        // Maria: acting (Sunday), dancing (Tuesday), speech (Wednesday).
        let upcoming = upcoming_classes(&journal, find(&journal, "3"), date(2024, 1, 7));
        let order: Vec<SectionId> = upcoming.iter().map(|c| c.section_id).collect();
        assert_eq!(
            order,
            vec![SectionId::Dancing, SectionId::Speech, SectionId::Acting]
        );
        assert_eq!(
            upcoming.iter().map(|c| c.days_until).collect::<Vec<_>>(),
            vec![2, 3, 7]
        );
    }

    #[test]
    fn recent_grades_newest_first_with_ungraded_in_feed() {
        let journal = default_journal();
        let maria = find(&journal, "3");
        let feed = recent_grades(&journal, maria, 3);
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].date, "2023-10-11");
        assert_eq!(feed[0].grade, Grade::Graded(5));
        assert_eq!(feed[1].date, "2023-10-10");
        assert_eq!(feed[1].grade, Grade::Ungraded);
        assert_eq!(feed[2].date, "2023-10-08");

        let full = recent_grades(&journal, maria, 10);
        assert_eq!(full.len(), 6);
        assert_eq!(full.last().expect("oldest").date, "2023-10-01");
    }

    #[test]
    fn visible_students_scopes_by_section_and_query() {
        let journal = default_journal();
        let acting_only = [SectionId::Acting];
        let ids: Vec<&str> = visible_students(&journal, &acting_only, "")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);

        let singing_only = [SectionId::Singing];
        let ids: Vec<&str> = visible_students(&journal, &singing_only, "")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);

        assert_eq!(visible_students(&journal, &acting_only, "MARIA").len(), 1);
        assert_eq!(visible_students(&journal, &acting_only, "mar").len(), 1);
        assert!(visible_students(&journal, &acting_only, "zz").is_empty());
    }

    #[test]
    fn can_edit_requires_an_assigned_teacher() {
        let teacher = Identity::Teacher {
            id: "teacher2".to_string(),
            name: "Elena Sergeevna".to_string(),
            email: "elena@example.com".to_string(),
            sections: vec![SectionId::Singing],
        };
        let student = Identity::Student {
            id: "1".to_string(),
            name: "Anna Ivanova".to_string(),
            email: "anna@example.com".to_string(),
        };
        assert!(can_edit(Some(&teacher), SectionId::Singing));
        assert!(!can_edit(Some(&teacher), SectionId::Acting));
        assert!(!can_edit(Some(&student), SectionId::Acting));
        assert!(!can_edit(None, SectionId::Acting));
    }

    #[test]
    fn classes_on_date_matches_the_weekday() {
        let journal = default_journal();
        let acting_only = [SectionId::Acting];
        // Sunday: acting meets, with both enrolled students.
        let classes = classes_on_date(&journal, &acting_only, date(2024, 1, 7));
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].section_id, SectionId::Acting);
        let names: Vec<&str> = classes[0]
            .students
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Anna Ivanova", "Maria Sidorova"]);
        // Monday: nothing for an acting-only teacher.
        assert!(classes_on_date(&journal, &acting_only, date(2024, 1, 8)).is_empty());
    }

    #[test]
    fn section_student_counts_from_seed() {
        let journal = default_journal();
        assert_eq!(section_student_count(&journal, SectionId::Acting), 2);
        assert_eq!(section_student_count(&journal, SectionId::Singing), 1);
        assert_eq!(section_student_count(&journal, SectionId::Speech), 2);
        assert_eq!(section_student_count(&journal, SectionId::Dancing), 2);
    }
}
