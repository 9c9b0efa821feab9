//! OpenAPI document served by Swagger UI and Scalar.

use emsu_core::{ErrorResponse, PaginationMeta, PaginationParams};
use emsu_models::{
    Announcement, Attendance, AttendanceStatus, AttendanceSummary, ChangePasswordDto, Class,
    CreateAnnouncementDto, CreateAttendanceDto, CreateClassDto, CreateEventDto, CreateFeeDto,
    CreateGradeDto, CreateStudentDto, CreateSubjectDto, CreateTeacherDto, CreateUserDto,
    DashboardStats, Event, EventType, FeeResponse, FeeStatus, FeeSummary, GradeResponse,
    LoginRequest, LoginResponse, MessageResponse, PaginatedAnnouncementsResponse,
    PaginatedAttendanceResponse, PaginatedClassesResponse, PaginatedEventsResponse,
    PaginatedFeesResponse, PaginatedGradesResponse, PaginatedStudentsResponse,
    PaginatedSubjectsResponse, PaginatedTeachersResponse, PaginatedUsersResponse, Priority,
    Student, Subject, TargetAudience, Teacher, UpdateAnnouncementDto, UpdateAttendanceDto,
    UpdateClassDto, UpdateEventDto, UpdateFeeDto, UpdateGradeDto, UpdateProfileDto,
    UpdateStudentDto, UpdateSubjectDto, UpdateTeacherDto, UpdateUserDto, User, UserRole,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health_check,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::me,
        crate::modules::auth::controller::update_profile,
        crate::modules::auth::controller::change_password,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::get_student_grades,
        crate::modules::students::controller::get_student_fees,
        crate::modules::students::controller::get_student_attendance,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::attendance::controller::get_attendance_records,
        crate::modules::attendance::controller::create_attendance,
        crate::modules::attendance::controller::get_attendance,
        crate::modules::attendance::controller::update_attendance,
        crate::modules::attendance::controller::delete_attendance,
        crate::modules::grades::controller::get_grades,
        crate::modules::grades::controller::create_grade,
        crate::modules::grades::controller::get_grade,
        crate::modules::grades::controller::update_grade,
        crate::modules::grades::controller::delete_grade,
        crate::modules::fees::controller::get_fees,
        crate::modules::fees::controller::create_fee,
        crate::modules::fees::controller::get_fee,
        crate::modules::fees::controller::update_fee,
        crate::modules::fees::controller::delete_fee,
        crate::modules::announcements::controller::get_announcements,
        crate::modules::announcements::controller::create_announcement,
        crate::modules::announcements::controller::get_announcement,
        crate::modules::announcements::controller::update_announcement,
        crate::modules::announcements::controller::delete_announcement,
        crate::modules::events::controller::get_events,
        crate::modules::events::controller::create_event,
        crate::modules::events::controller::get_event,
        crate::modules::events::controller::update_event,
        crate::modules::events::controller::delete_event,
        crate::modules::dashboard::controller::get_stats,
    ),
    components(
        schemas(
            crate::router::HealthResponse,
            ErrorResponse,
            PaginationMeta,
            PaginationParams,
            MessageResponse,
            LoginRequest,
            LoginResponse,
            UpdateProfileDto,
            ChangePasswordDto,
            User,
            UserRole,
            CreateUserDto,
            UpdateUserDto,
            PaginatedUsersResponse,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            Teacher,
            CreateTeacherDto,
            UpdateTeacherDto,
            PaginatedTeachersResponse,
            Class,
            CreateClassDto,
            UpdateClassDto,
            PaginatedClassesResponse,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            PaginatedSubjectsResponse,
            Attendance,
            AttendanceStatus,
            CreateAttendanceDto,
            UpdateAttendanceDto,
            PaginatedAttendanceResponse,
            GradeResponse,
            CreateGradeDto,
            UpdateGradeDto,
            PaginatedGradesResponse,
            FeeResponse,
            FeeStatus,
            CreateFeeDto,
            UpdateFeeDto,
            PaginatedFeesResponse,
            Announcement,
            TargetAudience,
            Priority,
            CreateAnnouncementDto,
            UpdateAnnouncementDto,
            PaginatedAnnouncementsResponse,
            Event,
            EventType,
            CreateEventDto,
            UpdateEventDto,
            PaginatedEventsResponse,
            DashboardStats,
            AttendanceSummary,
            FeeSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database connectivity"),
        (name = "Authentication", description = "Login and the current user's profile"),
        (name = "Users", description = "Staff account management (admin only)"),
        (name = "Students", description = "Student records and their academic history"),
        (name = "Teachers", description = "Teacher records"),
        (name = "Classes", description = "Classes and their homeroom teachers"),
        (name = "Subjects", description = "Subject catalogue"),
        (name = "Attendance", description = "Daily attendance marking"),
        (name = "Grades", description = "Assessment results"),
        (name = "Fees", description = "Fee billing and payments"),
        (name = "Announcements", description = "School-wide notices"),
        (name = "Events", description = "School calendar"),
        (name = "Dashboard", description = "Aggregate statistics")
    ),
    info(
        title = "EMSU API",
        version = "0.1.0",
        description = "School management REST API built with Rust, Axum, and SQLite featuring JWT-based authentication and role-based access control.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/users",
            "/api/students/{id}/grades",
            "/api/attendance",
            "/api/fees/{id}",
            "/api/dashboard/stats",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
