//! 排课冲突检测
//!
//! 两节未取消的课程时间相交（`a.start < b.end && b.start < a.end`），并且共用
//! 教师、教室、班组或学员时视为冲突。首尾相接不算冲突。

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::lessons::{ConflictKind, Lesson, LessonConflict, LessonStatus};
use crate::storage::Storage;

/// 一节课涉及的教师、教室、班组与学员
#[derive(Debug, Clone, Default)]
pub struct Participants {
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,
    pub group_id: Option<i64>,
    pub student_id: Option<i64>,
    /// 本节课占用的学员：个人课的学员或班组的全部成员
    pub student_ids: Vec<i64>,
    /// 这些学员所在的班组，其他班组课同样占用他们的时间
    pub student_group_ids: Vec<i64>,
}

impl Participants {
    /// 已有课程与本次排课的共用资源
    pub fn shared_with(&self, lesson: &Lesson) -> Vec<ConflictKind> {
        let mut kinds = Vec::new();
        if self.teacher_id == Some(lesson.teacher_id) {
            kinds.push(ConflictKind::Teacher);
        }
        if self.room_id.is_some() && self.room_id == lesson.room_id {
            kinds.push(ConflictKind::Room);
        }
        let same_group = self.group_id.is_some() && self.group_id == lesson.group_id;
        if same_group {
            kinds.push(ConflictKind::Group);
        } else {
            let private = lesson
                .student_id
                .is_some_and(|s| self.student_ids.contains(&s));
            let via_group = lesson
                .group_id
                .is_some_and(|g| self.student_group_ids.contains(&g));
            if private || via_group {
                kinds.push(ConflictKind::Student);
            }
        }
        kinds
    }

    pub fn involves(&self, lesson: &Lesson) -> bool {
        !self.shared_with(lesson).is_empty()
    }
}

pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

fn conflict_message(kind: ConflictKind, lesson: &Lesson) -> String {
    let what = match kind {
        ConflictKind::Teacher => "Teacher",
        ConflictKind::Room => "Room",
        ConflictKind::Group => "Group",
        ConflictKind::Student => "Student",
        ConflictKind::Capacity => "Room capacity",
    };
    format!(
        "{what} is busy with lesson {} from {} to {}",
        lesson.id,
        lesson.start_time.format("%Y-%m-%d %H:%M"),
        lesson.end_time.format("%H:%M")
    )
}

/// 在给定课程中查找与 `[start, end)` 冲突的课程
pub fn detect_conflicts(
    who: &Participants,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_lesson_id: Option<i64>,
    lessons: &[Lesson],
) -> Vec<LessonConflict> {
    let mut conflicts = Vec::new();
    for lesson in lessons {
        if Some(lesson.id) == exclude_lesson_id
            || lesson.status == LessonStatus::Cancelled
            || !overlaps(start, end, lesson.start_time, lesson.end_time)
        {
            continue;
        }
        for kind in who.shared_with(lesson) {
            conflicts.push(LessonConflict {
                kind,
                lesson_id: Some(lesson.id),
                start_time: lesson.start_time,
                end_time: lesson.end_time,
                message: conflict_message(kind, lesson),
            });
        }
    }
    conflicts
}

/// 班组人数超过教室容量
pub fn capacity_conflict(
    members: i64,
    capacity: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<LessonConflict> {
    (members > i64::from(capacity)).then(|| LessonConflict {
        kind: ConflictKind::Capacity,
        lesson_id: None,
        start_time: start,
        end_time: end,
        message: format!("Group has {members} students but the room holds {capacity}"),
    })
}

/// 补全本节课占用的学员及其所在班组
///
/// 班组课按成员展开，因此与成员的个人课、共享成员的其他班组课同样冲突。
pub async fn load_participants(
    storage: &dyn Storage,
    mut who: Participants,
) -> Result<Participants> {
    let mut student_ids = match who.group_id {
        Some(group_id) => storage.list_group_student_ids(group_id).await?,
        None => Vec::new(),
    };
    if let Some(student_id) = who.student_id
        && !student_ids.contains(&student_id)
    {
        student_ids.push(student_id);
    }
    who.student_group_ids = storage.list_student_group_ids(&student_ids).await?;
    who.student_ids = student_ids;
    Ok(who)
}

/// 查询数据库中的课程并检测冲突，包括容量冲突
pub async fn find_conflicts(
    storage: &dyn Storage,
    company_id: i64,
    who: Participants,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_lesson_id: Option<i64>,
) -> Result<Vec<LessonConflict>> {
    let who = load_participants(storage, who).await?;
    let lessons = storage
        .list_active_lessons_between(company_id, start.timestamp(), end.timestamp())
        .await?;
    let mut conflicts = detect_conflicts(&who, start, end, exclude_lesson_id, &lessons);

    if let (Some(group_id), Some(room_id)) = (who.group_id, who.room_id) {
        let group = storage.get_group(company_id, group_id).await?;
        let room = storage.get_room(company_id, room_id).await?;
        if let (Some(group), Some(room)) = (group, room)
            && let Some(conflict) = capacity_conflict(group.student_count, room.capacity, start, end)
        {
            conflicts.push(conflict);
        }
    }
    Ok(conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn lesson(id: i64, teacher_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Lesson {
        Lesson {
            id,
            company_id: 1,
            branch_id: None,
            group_id: None,
            student_id: None,
            teacher_id,
            room_id: None,
            subject: None,
            start_time: start,
            end_time: end,
            status: LessonStatus::Scheduled,
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    fn teacher(id: i64) -> Participants {
        Participants {
            teacher_id: Some(id),
            ..Default::default()
        }
    }

    #[test]
    fn test_overlap_is_strict() {
        assert!(overlaps(at(10, 0), at(11, 0), at(10, 30), at(11, 30)));
        assert!(overlaps(at(10, 0), at(12, 0), at(10, 30), at(11, 0)));
        // 首尾相接
        assert!(!overlaps(at(10, 0), at(11, 0), at(11, 0), at(12, 0)));
        assert!(!overlaps(at(11, 0), at(12, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn test_teacher_conflict() {
        let existing = vec![lesson(1, 7, at(10, 0), at(11, 0))];
        let conflicts = detect_conflicts(&teacher(7), at(10, 30), at(11, 30), None, &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Teacher);
        assert_eq!(conflicts[0].lesson_id, Some(1));

        assert!(detect_conflicts(&teacher(8), at(10, 30), at(11, 30), None, &existing).is_empty());
        assert!(detect_conflicts(&teacher(7), at(11, 0), at(12, 0), None, &existing).is_empty());
    }

    #[test]
    fn test_cancelled_and_excluded_lessons_are_ignored() {
        let mut cancelled = lesson(1, 7, at(10, 0), at(11, 0));
        cancelled.status = LessonStatus::Cancelled;
        let existing = vec![cancelled, lesson(2, 7, at(10, 0), at(11, 0))];
        assert!(detect_conflicts(&teacher(7), at(10, 0), at(11, 0), Some(2), &existing).is_empty());
    }

    #[test]
    fn test_room_group_and_student_conflicts() {
        let mut room_lesson = lesson(1, 1, at(9, 0), at(10, 0));
        room_lesson.room_id = Some(3);
        let mut group_lesson = lesson(2, 2, at(9, 0), at(10, 0));
        group_lesson.group_id = Some(5);
        let mut private_lesson = lesson(3, 4, at(9, 0), at(10, 0));
        private_lesson.student_id = Some(9);
        let existing = vec![room_lesson, group_lesson, private_lesson];

        let who = Participants {
            teacher_id: Some(99),
            room_id: Some(3),
            student_id: Some(9),
            student_ids: vec![9],
            student_group_ids: vec![5],
            ..Default::default()
        };
        let kinds: Vec<_> = detect_conflicts(&who, at(9, 30), at(10, 30), None, &existing)
            .into_iter()
            .map(|c| (c.kind, c.lesson_id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ConflictKind::Room, Some(1)),
                (ConflictKind::Student, Some(2)),
                (ConflictKind::Student, Some(3)),
            ]
        );

        let group = Participants {
            group_id: Some(5),
            ..Default::default()
        };
        let conflicts = detect_conflicts(&group, at(9, 0), at(10, 0), None, &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Group);
    }

    #[test]
    fn test_group_lesson_occupies_its_members() {
        // 学员 9 同属班组 5 和 6，另有一节个人课
        let mut private_lesson = lesson(1, 1, at(10, 0), at(11, 0));
        private_lesson.student_id = Some(9);
        let mut other_group = lesson(2, 2, at(10, 0), at(11, 0));
        other_group.group_id = Some(6);
        let mut unrelated = lesson(3, 3, at(10, 0), at(11, 0));
        unrelated.group_id = Some(8);
        let existing = vec![private_lesson, other_group, unrelated];

        let group = Participants {
            teacher_id: Some(99),
            group_id: Some(5),
            student_ids: vec![9, 10],
            student_group_ids: vec![5, 6],
            ..Default::default()
        };
        let kinds: Vec<_> = detect_conflicts(&group, at(10, 0), at(11, 0), None, &existing)
            .into_iter()
            .map(|c| (c.kind, c.lesson_id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ConflictKind::Student, Some(1)),
                (ConflictKind::Student, Some(2)),
            ]
        );
    }

    #[test]
    fn test_student_conflicts_are_symmetric() {
        let mut group_lesson = lesson(1, 1, at(10, 0), at(11, 0));
        group_lesson.group_id = Some(5);
        let mut private_lesson = lesson(2, 2, at(10, 0), at(11, 0));
        private_lesson.student_id = Some(9);

        let private = Participants {
            student_id: Some(9),
            student_ids: vec![9],
            student_group_ids: vec![5],
            ..Default::default()
        };
        let group = Participants {
            group_id: Some(5),
            student_ids: vec![9],
            student_group_ids: vec![5],
            ..Default::default()
        };
        assert!(private.involves(&group_lesson));
        assert!(group.involves(&private_lesson));
    }

    #[test]
    fn test_capacity_conflict() {
        assert!(capacity_conflict(10, 10, at(9, 0), at(10, 0)).is_none());
        let conflict = capacity_conflict(11, 10, at(9, 0), at(10, 0)).unwrap();
        assert_eq!(conflict.kind, ConflictKind::Capacity);
        assert_eq!(conflict.lesson_id, None);
    }
}
