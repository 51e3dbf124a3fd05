use std::collections::BTreeMap;

use serde::Serialize;

use crate::classify::ClassificationTable;
use crate::models::{AssessmentType, GradeRecord, Subject};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub percentage: f64,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
    pub subject_id: String,
    pub subject_name: String,
    pub teacher: String,
    pub graded_count: usize,
    pub summary: PerformanceSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBreakdown {
    pub kind: Option<AssessmentType>,
    pub record_count: usize,
    pub summary: PerformanceSummary,
}

struct Totals {
    score: f64,
    out_of: f64,
}

fn totals<'a, I>(records: I) -> Totals
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    records.into_iter().fold(
        Totals {
            score: 0.0,
            out_of: 0.0,
        },
        |acc, record| Totals {
            score: acc.score + record.score,
            out_of: acc.out_of + record.out_of,
        },
    )
}

fn percentage_of(totals: &Totals) -> f64 {
    if totals.out_of > 0.0 {
        totals.score / totals.out_of * 100.0
    } else {
        0.0
    }
}

// No clamping. An empty set or a zero denominator yields 0.0.
pub fn aggregate(records: &[GradeRecord]) -> f64 {
    percentage_of(&totals(records))
}

pub fn summarize(records: &[GradeRecord], table: &ClassificationTable) -> PerformanceSummary {
    summary_for(aggregate(records), table)
}

pub fn summary_for(percentage: f64, table: &ClassificationTable) -> PerformanceSummary {
    let tier = table.classify(percentage);
    PerformanceSummary {
        percentage,
        label: tier.label.to_string(),
        color: tier.color.to_string(),
    }
}

pub fn is_gradable(subject: &Subject) -> bool {
    !subject.grades.is_empty() && totals(&subject.grades).out_of > 0.0
}

/// Gradable subjects, best first. The sort is stable so equal percentages
/// keep their input order.
pub fn rank_subjects(subjects: &[Subject], table: &ClassificationTable) -> Vec<SubjectPerformance> {
    let mut ranked: Vec<SubjectPerformance> = subjects
        .iter()
        .filter(|subject| is_gradable(subject))
        .map(|subject| SubjectPerformance {
            subject_id: subject.id.clone(),
            subject_name: subject.name.clone(),
            teacher: subject.teacher.clone(),
            graded_count: subject.grades.len(),
            summary: summarize(&subject.grades, table),
        })
        .collect();

    ranked.sort_by(|a, b| b.summary.percentage.total_cmp(&a.summary.percentage));
    ranked
}

pub fn overall(subjects: &[Subject], table: &ClassificationTable) -> Option<PerformanceSummary> {
    let gradable: Vec<&Subject> = subjects.iter().filter(|s| is_gradable(s)).collect();
    if gradable.is_empty() {
        return None;
    }

    let pooled = totals(gradable.iter().flat_map(|subject| subject.grades.iter()));
    Some(summary_for(percentage_of(&pooled), table))
}

pub fn strongest(ranked: &[SubjectPerformance]) -> Option<&SubjectPerformance> {
    ranked.first()
}

/// The weakest entry, or `None` when only one subject is ranked.
pub fn weakest(ranked: &[SubjectPerformance]) -> Option<&SubjectPerformance> {
    if ranked.len() < 2 {
        return None;
    }
    ranked.last()
}

/// Per assessment type, typed kinds first and untyped records last.
pub fn by_type(records: &[GradeRecord], table: &ClassificationTable) -> Vec<TypeBreakdown> {
    let mut groups: BTreeMap<Option<AssessmentType>, Vec<&GradeRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.kind).or_default().push(record);
    }

    let mut breakdown: Vec<TypeBreakdown> = groups
        .into_iter()
        .map(|(kind, group)| {
            let group_totals = totals(group.iter().copied());
            TypeBreakdown {
                kind,
                record_count: group.len(),
                summary: summary_for(percentage_of(&group_totals), table),
            }
        })
        .collect();

    // `None` sorts first in a BTreeMap; move untyped records to the end.
    breakdown.sort_by_key(|entry| entry.kind.is_none());
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(score: f64, out_of: f64) -> GradeRecord {
        GradeRecord::new("assessment", score, out_of)
    }

    fn subject(name: &str, grades: Vec<GradeRecord>) -> Subject {
        Subject {
            id: name.to_string(),
            name: name.to_string(),
            grades,
            ..Subject::default()
        }
    }

    #[test]
    fn empty_input_aggregates_to_zero() {
        assert_eq!(aggregate(&[]), 0.0);
    }

    #[test]
    fn aggregates_total_score_over_total_possible() {
        assert_eq!(aggregate(&[grade(50.0, 100.0)]), 50.0);

        let value = aggregate(&[grade(8.0, 10.0), grade(18.0, 20.0)]);
        assert!((value - 86.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn aggregate_ignores_record_order() {
        let records = vec![grade(8.0, 10.0), grade(18.0, 20.0), grade(3.0, 5.0)];
        let mut reversed = records.clone();
        reversed.reverse();
        assert!((aggregate(&records) - aggregate(&reversed)).abs() < 1e-9);
    }

    #[test]
    fn zero_denominator_and_overflow_are_passed_through() {
        assert_eq!(aggregate(&[grade(5.0, 0.0)]), 0.0);
        assert_eq!(aggregate(&[grade(12.0, 10.0)]), 120.0);
    }

    #[test]
    fn ranking_drops_ungradable_subjects() {
        let subjects = vec![
            subject("empty", vec![]),
            subject("zero", vec![grade(4.0, 0.0)]),
            subject("math", vec![grade(7.0, 10.0)]),
        ];

        let ranked = rank_subjects(&subjects, &ClassificationTable::v1());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].subject_name, "math");
        assert_eq!(ranked[0].graded_count, 1);
    }

    #[test]
    fn ranking_is_descending_and_stable_on_ties() {
        let subjects = vec![
            subject("a", vec![grade(60.0, 100.0)]),
            subject("b", vec![grade(90.0, 100.0)]),
            subject("c", vec![grade(6.0, 10.0)]),
        ];

        let ranked = rank_subjects(&subjects, &ClassificationTable::v1());
        let names: Vec<&str> = ranked.iter().map(|r| r.subject_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn end_to_end_ranking_and_labels() {
        let subjects = vec![
            subject("first", vec![grade(90.0, 100.0)]),
            subject("second", vec![grade(60.0, 100.0)]),
        ];

        let v1 = rank_subjects(&subjects, &ClassificationTable::v1());
        assert_eq!(v1[0].summary.percentage, 90.0);
        assert_eq!(v1[1].summary.percentage, 60.0);
        assert_eq!(v1[0].summary.label, "ممتاز");
        // 60 is "جيد" under v1's >= 60 cut; the 50..60 band is "مقبول".
        assert_eq!(v1[1].summary.label, "جيد");

        let v2 = rank_subjects(&subjects, &ClassificationTable::v2());
        assert_eq!(v2[0].summary.label, "ممتاز");
        assert_eq!(v2[1].summary.label, "مقبول");
    }

    #[test]
    fn overall_pools_records_across_subjects() {
        let subjects = vec![
            subject("a", vec![grade(8.0, 10.0)]),
            subject("b", vec![grade(18.0, 20.0)]),
            subject("empty", vec![]),
        ];
        let summary = overall(&subjects, &ClassificationTable::v1()).unwrap();
        assert!((summary.percentage - 86.666_666_666).abs() < 1e-6);
        assert_eq!(summary.label, "جيد جداً");

        assert!(overall(&[subject("empty", vec![])], &ClassificationTable::v1()).is_none());
    }

    #[test]
    fn strongest_and_weakest_need_a_ranking() {
        let table = ClassificationTable::v1();
        let ranked = rank_subjects(
            &[
                subject("a", vec![grade(4.0, 10.0)]),
                subject("b", vec![grade(9.0, 10.0)]),
            ],
            &table,
        );
        assert_eq!(strongest(&ranked).unwrap().subject_name, "b");
        assert_eq!(weakest(&ranked).unwrap().subject_name, "a");
        assert!(weakest(&ranked[..1]).is_none());
        assert!(strongest(&[]).is_none());
    }

    #[test]
    fn breakdown_groups_by_assessment_type() {
        let mut exam = grade(40.0, 50.0);
        exam.kind = Some(AssessmentType::Exam);
        let mut quiz = grade(5.0, 10.0);
        quiz.kind = Some(AssessmentType::Quiz);
        let untyped = grade(1.0, 2.0);

        let breakdown = by_type(&[untyped, quiz, exam], &ClassificationTable::v1());
        let kinds: Vec<Option<AssessmentType>> = breakdown.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![Some(AssessmentType::Exam), Some(AssessmentType::Quiz), None]
        );
        assert_eq!(breakdown[0].summary.percentage, 80.0);
        assert_eq!(breakdown[2].record_count, 1);
    }
}
