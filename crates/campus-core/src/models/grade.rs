use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub credits: Option<f64>,
    pub midterm_grade: Option<f64>,
    pub final_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub grade_point: Option<f64>,
}

impl Grade {
    pub fn letter_display(&self) -> &str {
        self.letter_grade.as_deref().unwrap_or("-")
    }
}

/// Credit-weighted grade point average over graded courses.
/// Courses without credits or grade points are skipped.
pub fn weighted_gpa(grades: &[Grade]) -> Option<f64> {
    let (points, credits) = grades
        .iter()
        .filter_map(|g| Some((g.grade_point?, g.credits?)))
        .filter(|(_, credits)| *credits > 0.0)
        .fold((0.0, 0.0), |(p, c), (gp, cr)| (p + gp * cr, c + cr));

    (credits > 0.0).then(|| points / credits)
}
