//! Seeding configuration and the rows generated before insertion.

use chrono::{DateTime, NaiveDate, Utc};
use emsu_models::{AttendanceStatus, FeeStatus};

/// Seeded records carry this email domain or subject code prefix so
/// `clear-seed` can find them again.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";
pub const SEED_SUBJECT_PREFIX: &str = "SEED-";

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub teachers: usize,
    pub students: usize,
    pub classes: usize,
    pub grades_per_student: usize,
    pub fees_per_student: usize,
    pub attendance_days: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            teachers: 10,
            students: 100,
            classes: 6,
            grades_per_student: 4,
            fees_per_student: 2,
            attendance_days: 5,
        }
    }
}

impl SeedConfig {
    pub fn with_teachers(mut self, teachers: usize) -> Self {
        self.teachers = teachers;
        self
    }

    pub fn with_students(mut self, students: usize) -> Self {
        self.students = students;
        self
    }

    pub fn with_classes(mut self, classes: usize) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_grades_per_student(mut self, grades: usize) -> Self {
        self.grades_per_student = grades;
        self
    }

    pub fn with_fees_per_student(mut self, fees: usize) -> Self {
        self.fees_per_student = fees;
        self
    }

    pub fn with_attendance_days(mut self, days: usize) -> Self {
        self.attendance_days = days;
        self
    }
}

pub struct TeacherSeed {
    pub teacher_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub department: String,
    pub experience_years: i64,
    pub salary: f64,
}

pub struct StudentSeed {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub grade: String,
    pub date_of_birth: NaiveDate,
    pub guardian_name: String,
    pub guardian_phone: String,
}

pub struct ClassSeed {
    pub name: String,
    pub grade: String,
    pub section: String,
    pub teacher_id: Option<i64>,
    pub room_number: String,
    pub academic_year: String,
}

pub struct SubjectSeed {
    pub name: &'static str,
    pub code: String,
    pub department: &'static str,
    pub credits: i64,
}

pub struct GradeSeed {
    pub student_id: i64,
    pub teacher_id: Option<i64>,
    pub subject: &'static str,
    pub exam_type: &'static str,
    pub marks_obtained: f64,
    pub total_marks: f64,
    pub grade_letter: &'static str,
    pub exam_date: NaiveDate,
}

pub struct FeeSeed {
    pub student_id: i64,
    pub fee_type: &'static str,
    pub amount: f64,
    pub paid_amount: f64,
    pub status: FeeStatus,
    pub due_date: NaiveDate,
    pub payment_date: Option<DateTime<Utc>>,
}

pub struct AttendanceSeed {
    pub student_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Summary printed after a seed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub teachers: usize,
    pub students: usize,
    pub classes: usize,
    pub subjects: usize,
    pub grades: usize,
    pub fees: usize,
    pub attendance: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClearReport {
    pub attendance: u64,
    pub grades: u64,
    pub fees: u64,
    pub classes: u64,
    pub students: u64,
    pub teachers: u64,
    pub subjects: u64,
}
