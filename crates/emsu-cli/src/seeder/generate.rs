//! Fake record generation.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use emsu_models::{AttendanceStatus, FeeStatus, round2};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;

use super::models::{
    AttendanceSeed, ClassSeed, FeeSeed, GradeSeed, SEED_EMAIL_DOMAIN, SEED_SUBJECT_PREFIX,
    StudentSeed, SubjectSeed, TeacherSeed,
};

const GRADE_LEVELS: &[&str] = &[
    "Grade 7", "Grade 8", "Grade 9", "Grade 10", "Grade 11", "Grade 12",
];
const SECTIONS: &[&str] = &["A", "B", "C", "D"];
const DEPARTMENTS: &[(&str, &str)] = &[
    ("Mathematics", "Science"),
    ("Physics", "Science"),
    ("Chemistry", "Science"),
    ("Biology", "Science"),
    ("English", "Languages"),
    ("French", "Languages"),
    ("History", "Humanities"),
    ("Geography", "Humanities"),
];
const SUBJECT_CODES: &[&str] = &[
    "MTH101", "PHY101", "CHM101", "BIO101", "ENG101", "FRE101", "HIS101", "GEO101",
];
const EXAM_TYPES: &[&str] = &["quiz", "midterm", "final", "assignment", "project"];
const FEE_TYPES: &[(&str, f64)] = &[
    ("tuition", 1500.0),
    ("library", 50.0),
    ("lab", 120.0),
    ("transport", 300.0),
    ("exam", 80.0),
];

fn pick<T: Copy>(items: &[T]) -> T {
    items[(0..items.len()).fake::<usize>()]
}

fn pick_id(ids: &[i64]) -> Option<i64> {
    if ids.is_empty() {
        None
    } else {
        Some(pick(ids))
    }
}

fn seed_email(first_name: &str, last_name: &str, tag: &str) -> String {
    let local: String = format!("{first_name}.{last_name}")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect::<String>()
        .to_lowercase();
    format!("{local}+{tag}@{SEED_EMAIL_DOMAIN}")
}

/// Letter grade for a percentage.
pub fn letter_for(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A"
    } else if percentage >= 80.0 {
        "B"
    } else if percentage >= 70.0 {
        "C"
    } else if percentage >= 60.0 {
        "D"
    } else {
        "F"
    }
}

/// Status a fee ends up in after `paid_amount` of `amount` has been paid by
/// `today`.
pub fn fee_status(
    amount: f64,
    paid_amount: f64,
    due_date: NaiveDate,
    today: NaiveDate,
) -> FeeStatus {
    if paid_amount >= amount {
        FeeStatus::Paid
    } else if paid_amount > 0.0 {
        FeeStatus::Partial
    } else if due_date < today {
        FeeStatus::Overdue
    } else {
        FeeStatus::Pending
    }
}

pub fn teachers(count: usize, run: &str) -> Vec<TeacherSeed> {
    (0..count)
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let (subject, department) = pick(DEPARTMENTS);
            TeacherSeed {
                teacher_id: format!("TCH-{run}-{idx:04}"),
                email: seed_email(&first_name, &last_name, &format!("t{run}{idx}")),
                first_name,
                last_name,
                phone: PhoneNumber().fake(),
                subject: subject.to_string(),
                department: department.to_string(),
                experience_years: (1..30).fake::<i64>(),
                salary: round2((30_000.0..90_000.0).fake::<f64>()),
            }
        })
        .collect()
}

pub fn students(count: usize, run: &str) -> Vec<StudentSeed> {
    let today = Utc::now().date_naive();
    (0..count)
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let guardian_first: String = FirstName().fake();
            let age_days = (12 * 365..18 * 365).fake::<i64>();
            StudentSeed {
                student_id: format!("STU-{run}-{idx:04}"),
                email: seed_email(&first_name, &last_name, &format!("s{run}{idx}")),
                guardian_name: format!("{guardian_first} {last_name}"),
                first_name,
                last_name,
                phone: PhoneNumber().fake(),
                grade: pick(GRADE_LEVELS).to_string(),
                date_of_birth: today - Duration::days(age_days),
                guardian_phone: PhoneNumber().fake(),
            }
        })
        .collect()
}

pub fn classes(count: usize, teacher_ids: &[i64]) -> Vec<ClassSeed> {
    let year = Utc::now().year();
    (0..count)
        .map(|idx| {
            let grade = GRADE_LEVELS[idx % GRADE_LEVELS.len()];
            let section = SECTIONS[(idx / GRADE_LEVELS.len()) % SECTIONS.len()];
            ClassSeed {
                name: format!("{grade}{section}"),
                grade: grade.to_string(),
                section: section.to_string(),
                teacher_id: pick_id(teacher_ids),
                room_number: format!("R{}", 100 + idx),
                academic_year: format!("{year}-{}", year + 1),
            }
        })
        .collect()
}

pub fn subjects() -> Vec<SubjectSeed> {
    DEPARTMENTS
        .iter()
        .zip(SUBJECT_CODES)
        .map(|(&(name, department), code)| SubjectSeed {
            name,
            code: format!("{SEED_SUBJECT_PREFIX}{code}"),
            department,
            credits: (1..5).fake::<i64>(),
        })
        .collect()
}

pub fn grades(student_ids: &[i64], teacher_ids: &[i64], per_student: usize) -> Vec<GradeSeed> {
    let today = Utc::now().date_naive();
    student_ids
        .iter()
        .flat_map(|&student_id| {
            (0..per_student).map(move |_| {
                let total_marks = 100.0;
                let marks_obtained = round2((35.0..100.0).fake::<f64>());
                GradeSeed {
                    student_id,
                    teacher_id: pick_id(teacher_ids),
                    subject: pick(DEPARTMENTS).0,
                    exam_type: pick(EXAM_TYPES),
                    marks_obtained,
                    total_marks,
                    grade_letter: letter_for(marks_obtained / total_marks * 100.0),
                    exam_date: today - Duration::days((1..180).fake::<i64>()),
                }
            })
        })
        .collect()
}

pub fn fees(student_ids: &[i64], per_student: usize) -> Vec<FeeSeed> {
    let now = Utc::now();
    let today = now.date_naive();
    student_ids
        .iter()
        .flat_map(|&student_id| {
            (0..per_student).map(move |_| {
                let (fee_type, amount) = pick(FEE_TYPES);
                let due_date = today + Duration::days((-60..60).fake::<i64>());
                let paid_amount = match (0..3).fake::<u8>() {
                    0 => 0.0,
                    1 => round2(amount / 2.0),
                    _ => amount,
                };
                FeeSeed {
                    student_id,
                    fee_type,
                    amount,
                    paid_amount,
                    status: fee_status(amount, paid_amount, due_date, today),
                    due_date,
                    payment_date: (paid_amount > 0.0).then_some(now),
                }
            })
        })
        .collect()
}

/// One record per student per day for the last `days` days, each student
/// assigned round-robin to a class.
pub fn attendance(student_ids: &[i64], class_ids: &[i64], days: usize) -> Vec<AttendanceSeed> {
    if class_ids.is_empty() {
        return Vec::new();
    }
    let today = Utc::now().date_naive();
    let mut records = Vec::with_capacity(student_ids.len() * days);
    for day in 0..days {
        let date = today - Duration::days(day as i64);
        for (idx, &student_id) in student_ids.iter().enumerate() {
            let status = match (0..20).fake::<u8>() {
                0 => AttendanceStatus::Absent,
                1 => AttendanceStatus::Late,
                2 => AttendanceStatus::Excused,
                _ => AttendanceStatus::Present,
            };
            records.push(AttendanceSeed {
                student_id,
                class_id: class_ids[idx % class_ids.len()],
                date,
                status,
            });
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_boundaries() {
        assert_eq!(letter_for(90.0), "A");
        assert_eq!(letter_for(89.99), "B");
        assert_eq!(letter_for(70.0), "C");
        assert_eq!(letter_for(59.9), "F");
    }

    #[test]
    fn fee_status_follows_payment_and_due_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let future = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        assert_eq!(fee_status(100.0, 100.0, past, today), FeeStatus::Paid);
        assert_eq!(fee_status(100.0, 40.0, past, today), FeeStatus::Partial);
        assert_eq!(fee_status(100.0, 0.0, past, today), FeeStatus::Overdue);
        assert_eq!(fee_status(100.0, 0.0, future, today), FeeStatus::Pending);
    }

    #[test]
    fn seeded_identities_are_unique_and_marked() {
        let students = students(50, "run1");
        let mut ids: Vec<_> = students.iter().map(|s| s.student_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert!(
            students
                .iter()
                .all(|s| s.email.ends_with(&format!("@{SEED_EMAIL_DOMAIN}")))
        );
    }

    #[test]
    fn attendance_needs_a_class() {
        assert!(attendance(&[1, 2], &[], 3).is_empty());
        assert_eq!(attendance(&[1, 2], &[10], 3).len(), 6);
    }
}
