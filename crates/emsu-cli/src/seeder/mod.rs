//! Development data seeding.
//!
//! Everything is inserted inside one transaction. Seeded people use
//! `@example.com` addresses and seeded subjects a `SEED-` code prefix, which
//! is how [`clear_all`] tells them apart from real records.

pub mod generate;
pub mod models;

use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use fake::Fake;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};

pub use models::{ClearReport, SEED_EMAIL_DOMAIN, SEED_SUBJECT_PREFIX, SeedConfig, SeedReport};

use models::{
    AttendanceSeed, ClassSeed, FeeSeed, GradeSeed, StudentSeed, SubjectSeed, TeacherSeed,
};

const BATCH_SIZE: usize = 500;

pub async fn seed_all(db: &SqlitePool, config: &SeedConfig) -> anyhow::Result<SeedReport> {
    let start_time = Instant::now();
    let run = format!(
        "{}{}",
        Utc::now().format("%y%m%d%H%M%S"),
        (1000..10000).fake::<u32>()
    );
    let mut tx = db.begin().await?;

    println!("👩‍🏫 Seeding {} teachers...", config.teachers);
    let teacher_ids = insert_teachers(&mut tx, &generate::teachers(config.teachers, &run)).await?;

    println!("📚 Seeding subjects...");
    let subjects = insert_subjects(&mut tx, &generate::subjects()).await?;

    println!("🏫 Seeding {} classes...", config.classes);
    let class_ids =
        insert_classes(&mut tx, &generate::classes(config.classes, &teacher_ids)).await?;

    println!("🎓 Seeding {} students...", config.students);
    let student_ids = insert_students(&mut tx, &generate::students(config.students, &run)).await?;

    let grades = generate::grades(&student_ids, &teacher_ids, config.grades_per_student);
    println!("📝 Seeding {} grades...", grades.len());
    insert_grades(&mut tx, &grades).await?;

    let fees = generate::fees(&student_ids, config.fees_per_student);
    println!("💰 Seeding {} fees...", fees.len());
    insert_fees(&mut tx, &fees).await?;

    let attendance = generate::attendance(&student_ids, &class_ids, config.attendance_days);
    println!("✅ Seeding {} attendance records...", attendance.len());
    insert_attendance(&mut tx, &attendance).await?;

    tx.commit().await?;

    let report = SeedReport {
        teachers: teacher_ids.len(),
        students: student_ids.len(),
        classes: class_ids.len(),
        subjects,
        grades: grades.len(),
        fees: fees.len(),
        attendance: attendance.len(),
    };
    println!("\n✨ Seeding finished in {:?}: {report:?}", start_time.elapsed());
    Ok(report)
}

/// Hard-deletes every seeded record, dependents first. Real records are
/// never touched.
pub async fn clear_all(db: &SqlitePool) -> anyhow::Result<ClearReport> {
    let start_time = Instant::now();
    let email_pattern = format!("%@{SEED_EMAIL_DOMAIN}");
    let subject_pattern = format!("{SEED_SUBJECT_PREFIX}%");
    let mut tx = db.begin().await?;

    let seeded_students = "SELECT id FROM students WHERE email LIKE ?1";
    let seeded_teachers = "SELECT id FROM teachers WHERE email LIKE ?1";

    let attendance = sqlx::query(&format!(
        "DELETE FROM attendance WHERE student_id IN ({seeded_students}) \
         OR class_id IN (SELECT id FROM classes WHERE teacher_id IN ({seeded_teachers}))"
    ))
    .bind(&email_pattern)
    .execute(&mut *tx)
    .await
    .context("Failed to clear attendance")?
    .rows_affected();

    let grades = sqlx::query(&format!(
        "DELETE FROM grades WHERE student_id IN ({seeded_students}) \
         OR teacher_id IN ({seeded_teachers})"
    ))
    .bind(&email_pattern)
    .execute(&mut *tx)
    .await
    .context("Failed to clear grades")?
    .rows_affected();

    let fees = sqlx::query(&format!("DELETE FROM fees WHERE student_id IN ({seeded_students})"))
    .bind(&email_pattern)
    .execute(&mut *tx)
    .await
    .context("Failed to clear fees")?
    .rows_affected();

    let classes = sqlx::query(&format!(
        "DELETE FROM classes WHERE teacher_id IN ({seeded_teachers})"
    ))
    .bind(&email_pattern)
    .execute(&mut *tx)
    .await
    .context("Failed to clear classes")?
    .rows_affected();

    let students = sqlx::query("DELETE FROM students WHERE email LIKE ?")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await
        .context("Failed to clear students")?
        .rows_affected();

    let teachers = sqlx::query("DELETE FROM teachers WHERE email LIKE ?")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await
        .context("Failed to clear teachers")?
        .rows_affected();

    let subjects = sqlx::query("DELETE FROM subjects WHERE code LIKE ?")
        .bind(&subject_pattern)
        .execute(&mut *tx)
        .await
        .context("Failed to clear subjects")?
        .rows_affected();

    tx.commit().await?;

    let report = ClearReport {
        attendance,
        grades,
        fees,
        classes,
        students,
        teachers,
        subjects,
    };
    println!("🗑️  Cleared seeded data in {:?}: {report:?}", start_time.elapsed());
    Ok(report)
}

async fn insert_teachers(
    tx: &mut Transaction<'_, Sqlite>,
    teachers: &[TeacherSeed],
) -> anyhow::Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(teachers.len());
    for chunk in teachers.chunks(BATCH_SIZE) {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "INSERT INTO teachers (teacher_id, first_name, last_name, email, phone, subject, \
             department, experience_years, salary) ",
        );
        qb.push_values(chunk, |mut b, t| {
            b.push_bind(t.teacher_id.clone())
                .push_bind(t.first_name.clone())
                .push_bind(t.last_name.clone())
                .push_bind(t.email.clone())
                .push_bind(t.phone.clone())
                .push_bind(t.subject.clone())
                .push_bind(t.department.clone())
                .push_bind(t.experience_years)
                .push_bind(t.salary);
        });
        qb.push(" RETURNING id");
        let chunk_ids: Vec<i64> = qb
            .build_query_scalar()
            .fetch_all(&mut **tx)
            .await
            .context("Failed to insert teachers")?;
        ids.extend(chunk_ids);
    }
    Ok(ids)
}

async fn insert_students(
    tx: &mut Transaction<'_, Sqlite>,
    students: &[StudentSeed],
) -> anyhow::Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(students.len());
    for chunk in students.chunks(BATCH_SIZE) {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "INSERT INTO students (student_id, first_name, last_name, email, phone, grade, \
             date_of_birth, guardian_name, guardian_phone) ",
        );
        qb.push_values(chunk, |mut b, s| {
            b.push_bind(s.student_id.clone())
                .push_bind(s.first_name.clone())
                .push_bind(s.last_name.clone())
                .push_bind(s.email.clone())
                .push_bind(s.phone.clone())
                .push_bind(s.grade.clone())
                .push_bind(s.date_of_birth)
                .push_bind(s.guardian_name.clone())
                .push_bind(s.guardian_phone.clone());
        });
        qb.push(" RETURNING id");
        let chunk_ids: Vec<i64> = qb
            .build_query_scalar()
            .fetch_all(&mut **tx)
            .await
            .context("Failed to insert students")?;
        ids.extend(chunk_ids);
    }
    Ok(ids)
}

async fn insert_classes(
    tx: &mut Transaction<'_, Sqlite>,
    classes: &[ClassSeed],
) -> anyhow::Result<Vec<i64>> {
    if classes.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb = QueryBuilder::<Sqlite>::new(
        "INSERT INTO classes (name, grade, section, teacher_id, room_number, academic_year) ",
    );
    qb.push_values(classes, |mut b, c| {
        b.push_bind(c.name.clone())
            .push_bind(c.grade.clone())
            .push_bind(c.section.clone())
            .push_bind(c.teacher_id)
            .push_bind(c.room_number.clone())
            .push_bind(c.academic_year.clone());
    });
    qb.push(" RETURNING id");
    qb.build_query_scalar()
        .fetch_all(&mut **tx)
        .await
        .context("Failed to insert classes")
}

/// Returns how many subjects were new; codes already present are skipped.
async fn insert_subjects(
    tx: &mut Transaction<'_, Sqlite>,
    subjects: &[SubjectSeed],
) -> anyhow::Result<usize> {
    let mut qb =
        QueryBuilder::<Sqlite>::new("INSERT INTO subjects (name, code, department, credits) ");
    qb.push_values(subjects, |mut b, s| {
        b.push_bind(s.name)
            .push_bind(s.code.clone())
            .push_bind(s.department)
            .push_bind(s.credits);
    });
    qb.push(" ON CONFLICT(code) DO NOTHING");
    let result = qb
        .build()
        .execute(&mut **tx)
        .await
        .context("Failed to insert subjects")?;
    Ok(result.rows_affected() as usize)
}

async fn insert_grades(
    tx: &mut Transaction<'_, Sqlite>,
    grades: &[GradeSeed],
) -> anyhow::Result<()> {
    for chunk in grades.chunks(BATCH_SIZE) {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "INSERT INTO grades (student_id, teacher_id, subject, exam_type, marks_obtained, \
             total_marks, grade_letter, exam_date) ",
        );
        qb.push_values(chunk, |mut b, g| {
            b.push_bind(g.student_id)
                .push_bind(g.teacher_id)
                .push_bind(g.subject)
                .push_bind(g.exam_type)
                .push_bind(g.marks_obtained)
                .push_bind(g.total_marks)
                .push_bind(g.grade_letter)
                .push_bind(g.exam_date);
        });
        qb.build()
            .execute(&mut **tx)
            .await
            .context("Failed to insert grades")?;
    }
    Ok(())
}

async fn insert_fees(tx: &mut Transaction<'_, Sqlite>, fees: &[FeeSeed]) -> anyhow::Result<()> {
    for chunk in fees.chunks(BATCH_SIZE) {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "INSERT INTO fees (student_id, fee_type, amount, paid_amount, status, due_date, \
             payment_date) ",
        );
        qb.push_values(chunk, |mut b, f| {
            b.push_bind(f.student_id)
                .push_bind(f.fee_type)
                .push_bind(f.amount)
                .push_bind(f.paid_amount)
                .push_bind(f.status)
                .push_bind(f.due_date)
                .push_bind(f.payment_date);
        });
        qb.build()
            .execute(&mut **tx)
            .await
            .context("Failed to insert fees")?;
    }
    Ok(())
}

async fn insert_attendance(
    tx: &mut Transaction<'_, Sqlite>,
    records: &[AttendanceSeed],
) -> anyhow::Result<()> {
    for chunk in records.chunks(BATCH_SIZE) {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "INSERT INTO attendance (student_id, class_id, date, status) ",
        );
        qb.push_values(chunk, |mut b, a| {
            b.push_bind(a.student_id)
                .push_bind(a.class_id)
                .push_bind(a.date)
                .push_bind(a.status);
        });
        qb.build()
            .execute(&mut **tx)
            .await
            .context("Failed to insert attendance")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SeedConfig {
        SeedConfig::default()
            .with_teachers(3)
            .with_students(8)
            .with_classes(2)
            .with_grades_per_student(2)
            .with_fees_per_student(1)
            .with_attendance_days(2)
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn seed_then_clear_round_trip(pool: SqlitePool) {
        let report = seed_all(&pool, &small()).await.unwrap();
        assert_eq!(report.teachers, 3);
        assert_eq!(report.students, 8);
        assert_eq!(report.grades, 16);
        assert_eq!(report.attendance, 16);
        assert_eq!(count(&pool, "students").await, 8);

        let cleared = clear_all(&pool).await.unwrap();
        assert_eq!(cleared.students, 8);
        assert_eq!(count(&pool, "students").await, 0);
        assert_eq!(count(&pool, "grades").await, 0);
        assert_eq!(count(&pool, "subjects").await, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn clear_keeps_real_records(pool: SqlitePool) {
        sqlx::query(
            "INSERT INTO students (student_id, first_name, last_name, email, grade) \
             VALUES ('REAL-1', 'Real', 'Student', 'real@school.org', 'Grade 9')",
        )
        .execute(&pool)
        .await
        .unwrap();

        seed_all(&pool, &small()).await.unwrap();
        clear_all(&pool).await.unwrap();

        assert_eq!(count(&pool, "students").await, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn reseeding_skips_existing_subjects(pool: SqlitePool) {
        let first = seed_all(&pool, &small()).await.unwrap();
        let second = seed_all(&pool, &small().with_students(0)).await.unwrap();
        assert_eq!(first.subjects, 8);
        assert_eq!(second.subjects, 0);
    }
}
