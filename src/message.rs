use crate::classify::{Classification, ClassificationTable};
use crate::format;
use crate::models::Subject;
use crate::performance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Praise,
    Encourage,
    Support,
    Neutral,
}

fn tone_for(tier: &Classification<'_>) -> Tone {
    if tier.tier_count == 0 {
        Tone::Neutral
    } else if tier.is_top() {
        Tone::Praise
    } else if tier.is_fallback() {
        Tone::Support
    } else {
        Tone::Encourage
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackMessage {
    pub tone: Tone,
    pub text: String,
}

pub fn compose(student_name: &str, subject: &Subject, table: &ClassificationTable) -> FeedbackMessage {
    let student = if student_name.trim().is_empty() {
        "الطالب"
    } else {
        student_name.trim()
    };

    if !performance::is_gradable(subject) {
        return FeedbackMessage {
            tone: Tone::Neutral,
            text: format!(
                "لا توجد درجات مسجلة بعد لـ{} في مادة {}. سيتم تحديث التحليل فور رصد أول تقييم.",
                student, subject.name
            ),
        };
    }

    let summary = performance::summarize(&subject.grades, table);
    let tier = table.classify(summary.percentage);
    let tone = tone_for(&tier);
    let pct = format::percentage(summary.percentage);

    let mut text = match tone {
        Tone::Praise => format!(
            "أداء {} في مادة {} {} بنسبة {}. نشجعه على الاستمرار بنفس المستوى.",
            student, subject.name, summary.label, pct
        ),
        Tone::Encourage => format!(
            "حقق {} مستوى {} في مادة {} بنسبة {}. مع المزيد من المراجعة يمكنه الوصول إلى مستوى أعلى.",
            student, summary.label, subject.name, pct
        ),
        Tone::Support => format!(
            "مستوى {} في مادة {} {} بنسبة {}. نوصي بخطة دعم ومتابعة أسبوعية مع معلم المادة.",
            student, subject.name, summary.label, pct
        ),
        Tone::Neutral => format!(
            "نسبة {} في مادة {} هي {}.",
            student, subject.name, pct
        ),
    };

    let pending = subject.pending_homework();
    if pending > 0 {
        text.push_str(&format!(" لديه {} من الواجبات غير المسلمة.", pending));
    }

    FeedbackMessage { tone, text }
}
