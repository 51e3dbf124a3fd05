use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tracing::{info, warn};

use crate::format;
use crate::lenient;
use crate::models::{AssessmentType, GradeRecord, Subject};

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    subject: String,
    #[serde(default)]
    assessment_name: String,
    #[serde(default)]
    score: String,
    #[serde(default)]
    out_of: String,
    #[serde(default)]
    date: String,
    #[serde(default, rename = "type")]
    kind: String,
}

fn lenient_number(raw: String) -> f64 {
    lenient::number_or_zero(Some(&Value::String(raw)))
}

// Grouped by subject in first-seen order.
pub fn read_grades<R: Read>(reader: R) -> anyhow::Result<Vec<Subject>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut subjects: Vec<Subject> = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed CSV row {}", index + 1))?;
        if row.subject.is_empty() {
            warn!(row = index + 1, "skipping row without a subject");
            continue;
        }

        let record = GradeRecord {
            id: format!("csv-{}", index + 1),
            date: format::parse_date(&row.date),
            kind: AssessmentType::parse(&row.kind),
            ..GradeRecord::new(
                &row.assessment_name,
                lenient_number(row.score),
                lenient_number(row.out_of),
            )
        };

        match subjects.iter_mut().find(|subject| subject.name == row.subject) {
            Some(subject) => subject.grades.push(record),
            None => subjects.push(Subject {
                id: row.subject.clone(),
                name: row.subject,
                grades: vec![record],
                ..Subject::default()
            }),
        }
    }

    Ok(subjects)
}

pub fn read_grades_file(path: &Path) -> anyhow::Result<Vec<Subject>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let subjects = read_grades(file)?;
    info!(
        path = %path.display(),
        subjects = subjects.len(),
        records = subjects.iter().map(|s| s.grades.len()).sum::<usize>(),
        "grades imported"
    );
    Ok(subjects)
}
