/// Files table: JSON array of StoredFile
pub const FILES: &str = "aceplan_files";

/// Subjects table: JSON array of StoredSubject
pub const SUBJECTS: &str = "aceplan_subjects";

/// Field of study preference: plain string, owned by the dashboard
pub const FIELD_OF_STUDY: &str = "aceplan_fieldOfStudy";

/// Weekly goal preference: integer written as a string, owned by the dashboard
pub const GOAL_HOURS: &str = "aceplan_goalHours";
