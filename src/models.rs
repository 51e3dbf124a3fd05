use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::category::FeedbackCategory;
use crate::format;
use crate::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    Exam,
    Assignment,
    Quiz,
}

impl AssessmentType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "exam" | "امتحان" | "اختبار نهائي" => Some(AssessmentType::Exam),
            "assignment" | "homework" | "واجب" | "تكليف" => Some(AssessmentType::Assignment),
            "quiz" | "اختبار قصير" | "اختبار" => Some(AssessmentType::Quiz),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssessmentType::Exam => "امتحانات",
            AssessmentType::Assignment => "واجبات",
            AssessmentType::Quiz => "اختبارات قصيرة",
        }
    }
}

fn deserialize_assessment_type<'de, D>(deserializer: D) -> Result<Option<AssessmentType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => AssessmentType::parse(&raw),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    #[serde(default, deserialize_with = "lenient::deserialize_id")]
    pub id: String,
    #[serde(default, alias = "title", deserialize_with = "lenient::deserialize_text")]
    pub assessment_name: String,
    #[serde(default, deserialize_with = "lenient::deserialize_number")]
    pub score: f64,
    #[serde(default, alias = "maxScore", deserialize_with = "lenient::deserialize_number")]
    pub out_of: f64,
    #[serde(default, deserialize_with = "lenient::deserialize_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, rename = "type", deserialize_with = "deserialize_assessment_type")]
    pub kind: Option<AssessmentType>,
}

impl GradeRecord {
    pub fn new(assessment_name: &str, score: f64, out_of: f64) -> Self {
        Self {
            assessment_name: assessment_name.to_string(),
            score,
            out_of,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkRecord {
    #[serde(default, deserialize_with = "lenient::deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::deserialize_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::deserialize_bool")]
    pub submitted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(default, deserialize_with = "lenient::deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub title: String,
    #[serde(default, alias = "content", deserialize_with = "lenient::deserialize_text")]
    pub body: String,
    #[serde(default, deserialize_with = "lenient::deserialize_date")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    #[serde(default, deserialize_with = "lenient::deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub category: FeedbackCategory,
    #[serde(default, deserialize_with = "lenient::deserialize_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "content", deserialize_with = "lenient::deserialize_text")]
    pub preview: String,
    #[serde(default, alias = "subject", deserialize_with = "lenient::deserialize_text")]
    pub subject_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, deserialize_with = "lenient::deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub name: String,
    #[serde(default, alias = "teacherName", deserialize_with = "lenient::deserialize_text")]
    pub teacher: String,
    #[serde(default, deserialize_with = "lenient::deserialize_list")]
    pub grades: Vec<GradeRecord>,
    #[serde(default, deserialize_with = "lenient::deserialize_list")]
    pub homework: Vec<HomeworkRecord>,
    #[serde(default, deserialize_with = "lenient::deserialize_list")]
    pub posts: Vec<PostRecord>,
    #[serde(default, deserialize_with = "lenient::deserialize_list")]
    pub feedback_items: Vec<FeedbackRecord>,
}

impl Subject {
    pub fn pending_homework(&self) -> usize {
        self.homework.iter().filter(|item| !item.submitted).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "طالب",
            Role::Teacher => "معلم",
            Role::Admin => "مسؤول",
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::deserialize_text(deserializer)?;
        Ok(match raw.trim().to_lowercase().as_str() {
            "teacher" => Role::Teacher,
            "admin" => Role::Admin,
            _ => Role::Student,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    #[serde(default, deserialize_with = "lenient::deserialize_id")]
    pub id: String,
    #[serde(default, alias = "fullName", deserialize_with = "lenient::deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::deserialize_optional_text")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySnapshot {
    #[serde(default, deserialize_with = "lenient::deserialize_optional_number")]
    pub attendance_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::deserialize_count")]
    pub completed_homework: u32,
    #[serde(default, deserialize_with = "lenient::deserialize_count")]
    pub pending_homework: u32,
    #[serde(default, deserialize_with = "lenient::deserialize_count")]
    pub upcoming_exams: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalPayload {
    #[serde(default, deserialize_with = "lenient::deserialize_or_default")]
    pub student: StudentInfo,
    #[serde(default, deserialize_with = "lenient::deserialize_list")]
    pub subjects: Vec<Subject>,
    #[serde(default, deserialize_with = "lenient::deserialize_list")]
    pub recent_feedback: Vec<FeedbackRecord>,
    #[serde(default, deserialize_with = "lenient::deserialize_or_default")]
    pub weekly_snapshot: WeeklySnapshot,
}

impl PortalPayload {
    pub fn find_subject(&self, name: &str) -> Option<&Subject> {
        let name = name.trim();
        self.subjects
            .iter()
            .find(|subject| subject.name.trim() == name)
            .or_else(|| self.subjects.iter().find(|subject| subject.name.contains(name)))
    }
}

/// Marker for an entry whose day index is outside Sunday..=Saturday.
pub const UNKNOWN_DAY: u8 = u8::MAX;

fn deserialize_day<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let day = lenient::number_or_zero(value.as_ref());
    Ok(if day.fract() == 0.0 && (0.0..=6.0).contains(&day) {
        day as u8
    } else {
        UNKNOWN_DAY
    })
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => format::parse_time(&raw),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[serde(default = "unknown_day", deserialize_with = "deserialize_day")]
    pub day_of_week: u8,
    #[serde(default, deserialize_with = "deserialize_time")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "deserialize_time")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient::deserialize_optional_text")]
    pub teacher_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize_optional_text")]
    pub room: Option<String>,
}

fn unknown_day() -> u8 {
    UNKNOWN_DAY
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySchedule {
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub class_name: String,
    #[serde(default, deserialize_with = "lenient::deserialize_list")]
    pub entries: Vec<ScheduleEntry>,
    #[serde(default, deserialize_with = "lenient::deserialize_list")]
    pub school_days: Vec<u8>,
}
