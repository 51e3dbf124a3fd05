use std::fmt::Write;

use chrono::NaiveDate;

use crate::category::{self, FeedbackCategory};
use crate::classify::ClassificationTable;
use crate::format;
use crate::models::{FeedbackRecord, HomeworkRecord, PortalPayload, PostRecord};
use crate::performance;
use crate::subject_image;

/// Feedback from the payload's recent list plus every subject's items,
/// newest first. Undated items sort last.
pub fn collect_feedback(payload: &PortalPayload) -> Vec<FeedbackRecord> {
    let mut items: Vec<FeedbackRecord> = payload.recent_feedback.clone();
    for subject in &payload.subjects {
        for item in &subject.feedback_items {
            if items.iter().any(|known| !known.id.is_empty() && known.id == item.id) {
                continue;
            }
            let mut item = item.clone();
            if item.subject_name.is_empty() {
                item.subject_name = subject.name.clone();
            }
            items.push(item);
        }
    }

    items.sort_by(|a, b| b.date.cmp(&a.date));
    items
}

pub fn build_report(
    payload: &PortalPayload,
    table: &ClassificationTable,
    generated_on: NaiveDate,
) -> String {
    let ranked = performance::rank_subjects(&payload.subjects, table);
    let feedback = collect_feedback(payload);
    let mix = category::category_mix(feedback.iter().map(|item| item.category));

    let mut output = String::new();
    let student = if payload.student.name.is_empty() {
        "طالب غير مسمى"
    } else {
        payload.student.name.as_str()
    };

    let _ = writeln!(output, "# تقرير أداء الطالب");
    let _ = writeln!(
        output,
        "أُعد لـ {} بتاريخ {} (جدول التصنيف {})",
        student,
        format::long_date(generated_on),
        table.version()
    );
    if !payload.student.id.is_empty() {
        let _ = writeln!(
            output,
            "رقم المستخدم: {} ({})",
            payload.student.id,
            payload.student.role.label()
        );
    }
    if let Some(class_name) = &payload.student.class_name {
        let _ = writeln!(output, "الصف: {}", class_name);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## الملخص العام");
    match performance::overall(&payload.subjects, table) {
        Some(summary) => {
            let _ = writeln!(
                output,
                "- المعدل العام: {} ({})",
                format::percentage(summary.percentage),
                summary.label
            );
            if let Some(best) = performance::strongest(&ranked) {
                let _ = writeln!(output, "- أقوى مادة: {}", best.subject_name);
            }
            if let Some(worst) = performance::weakest(&ranked) {
                let _ = writeln!(output, "- المادة الأضعف: {}", worst.subject_name);
            }
        }
        None => {
            let _ = writeln!(output, "لا توجد درجات مسجلة بعد.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## ترتيب المواد");
    if ranked.is_empty() {
        let _ = writeln!(output, "لا توجد مواد ذات درجات.");
    } else {
        for (position, entry) in ranked.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({}) {} - {} [{}]",
                position + 1,
                entry.subject_name,
                entry.teacher,
                format::percentage(entry.summary.percentage),
                entry.summary.label,
                subject_image::resolve(&entry.subject_name)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## حسب نوع التقييم");
    let all_grades: Vec<_> = payload
        .subjects
        .iter()
        .filter(|subject| performance::is_gradable(subject))
        .flat_map(|subject| subject.grades.iter().cloned())
        .collect();
    let breakdown = performance::by_type(&all_grades, table);
    if breakdown.is_empty() {
        let _ = writeln!(output, "لا توجد تقييمات.");
    } else {
        for entry in breakdown {
            let kind = entry.kind.map(|kind| kind.label()).unwrap_or("غير مصنف");
            let _ = writeln!(
                output,
                "- {}: {} ({} تقييم)",
                kind,
                format::percentage(entry.summary.percentage),
                entry.record_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## توزيع الملاحظات");
    if mix.is_empty() {
        let _ = writeln!(output, "لا توجد ملاحظات.");
    } else {
        for entry in &mix {
            let _ = writeln!(output, "- {}: {}", entry.category, entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## أحدث الملاحظات");
    if feedback.is_empty() {
        let _ = writeln!(output, "لا توجد ملاحظات.");
    } else {
        for item in feedback.iter().take(5) {
            let _ = writeln!(
                output,
                "- [{}] {} ({}): {}",
                item.category,
                item.subject_name,
                format::optional_date(item.date),
                item.preview
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## الواجبات المعلقة");
    let mut pending: Vec<(&str, &HomeworkRecord)> = payload
        .subjects
        .iter()
        .flat_map(|subject| {
            subject
                .homework
                .iter()
                .filter(|item| !item.submitted)
                .map(move |item| (subject.name.as_str(), item))
        })
        .collect();
    // Earliest due date first; undated homework last.
    pending.sort_by_key(|(_, item)| (item.due_date.is_none(), item.due_date));
    if pending.is_empty() {
        let _ = writeln!(output, "لا توجد واجبات معلقة.");
    } else {
        for (subject_name, item) in pending {
            let _ = writeln!(
                output,
                "- {}: {} (التسليم: {})",
                subject_name,
                item.title,
                format::optional_date(item.due_date)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## آخر الإعلانات");
    let mut posts: Vec<(&str, &PostRecord)> = payload
        .subjects
        .iter()
        .flat_map(|subject| subject.posts.iter().map(move |post| (subject.name.as_str(), post)))
        .collect();
    posts.sort_by(|a, b| b.1.date.cmp(&a.1.date));
    if posts.is_empty() {
        let _ = writeln!(output, "لا توجد إعلانات.");
    } else {
        for (subject_name, post) in posts.iter().take(3) {
            let _ = writeln!(
                output,
                "- {} / {} ({}): {}",
                subject_name,
                post.title,
                format::optional_date(post.date),
                post.body
            );
        }
    }

    let snapshot = &payload.weekly_snapshot;
    let _ = writeln!(output);
    let _ = writeln!(output, "## هذا الأسبوع");
    if let Some(rate) = snapshot.attendance_rate {
        let _ = writeln!(output, "- نسبة الحضور: {}", format::percentage(rate));
    }
    let _ = writeln!(output, "- واجبات مكتملة: {}", snapshot.completed_homework);
    let _ = writeln!(output, "- واجبات معلقة: {}", snapshot.pending_homework);
    let _ = writeln!(output, "- اختبارات قادمة: {}", snapshot.upcoming_exams);

    output
}

pub fn feedback_lines(items: &[FeedbackRecord], category: Option<FeedbackCategory>) -> Vec<String> {
    items
        .iter()
        .filter(|item| category.map_or(true, |wanted| item.category == wanted))
        .map(|item| {
            format!(
                "- [{} / {}] {} ({}): {}",
                item.category,
                item.category.color(),
                item.subject_name,
                format::optional_date(item.date),
                item.preview
            )
        })
        .collect()
}
