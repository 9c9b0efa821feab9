//! # EMSU Models
//!
//! Domain models and DTOs for the EMSU API.
//!
//! Each module holds an entity as read from the database (joined display
//! names included), its create and update DTOs, its list filters and its
//! paginated response type.
//!
//! - [`users`]: staff accounts and [`UserRole`]
//! - [`students`], [`teachers`], [`classes`]
//! - [`attendance`], [`grades`], [`fees`]
//! - [`subjects`], [`announcements`], [`events`]
//! - [`auth`]: login and profile DTOs
//! - [`dashboard`]: aggregate counters
//!
//! Update DTOs are partial: absent keys keep their stored value and, for
//! nullable columns, an explicit `null` clears it.

pub mod announcements;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod events;
pub mod fees;
pub mod grades;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod users;

pub use announcements::{
    Announcement, AnnouncementFilterParams, CreateAnnouncementDto, PaginatedAnnouncementsResponse,
    Priority, TargetAudience, UpdateAnnouncementDto,
};
pub use attendance::{
    Attendance, AttendanceFilterParams, AttendanceStatus, CreateAttendanceDto,
    PaginatedAttendanceResponse, UpdateAttendanceDto,
};
pub use auth::{ChangePasswordDto, LoginRequest, LoginResponse, MessageResponse, UpdateProfileDto};
pub use classes::{
    Class, ClassFilterParams, CreateClassDto, PaginatedClassesResponse, UpdateClassDto,
};
pub use dashboard::{AttendanceSummary, DashboardStats, FeeSummary};
pub use events::{
    CreateEventDto, Event, EventFilterParams, EventType, PaginatedEventsResponse, UpdateEventDto,
};
pub use fees::{
    CreateFeeDto, Fee, FeeFilterParams, FeeResponse, FeeStatus, PaginatedFeesResponse,
    UpdateFeeDto,
};
pub use grades::{
    CreateGradeDto, Grade, GradeFilterParams, GradeResponse, PaginatedGradesResponse,
    UpdateGradeDto,
};
pub use students::{
    CreateStudentDto, PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto,
};
pub use subjects::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, SubjectFilterParams, UpdateSubjectDto,
};
pub use teachers::{
    CreateTeacherDto, PaginatedTeachersResponse, Teacher, TeacherFilterParams, UpdateTeacherDto,
};
pub use users::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams, UserRole,
};

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
