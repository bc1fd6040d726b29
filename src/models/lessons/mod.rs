pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{
    AttendanceStatus, ConflictKind, Lesson, LessonAttendance, LessonConflict, LessonStatus,
};
pub use requests::{
    AttendanceInput, CheckConflictsRequest, CompleteLessonRequest, CreateLessonRequest,
    LessonQueryParams, SuggestTimesRequest, UpdateLessonRequest,
};
pub use responses::{AttendanceCharge, CompleteLessonResponse, TimeSlot};
