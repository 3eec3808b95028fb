//! Patient and exam identification
//!
//! Every field is optional. Absence never fails a render: the title simply
//! shows a placeholder.

use tracing::debug;

use super::document::ExamDocument;

/// Shown when the patient name is absent
pub const UNKNOWN_NAME: &str = "Unknown";
/// Shown for any other absent field
pub const NOT_AVAILABLE: &str = "N/A";

/// Patient and exam metadata; `None` means "show the placeholder"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientInfo {
    pub name: Option<String>,
    pub sex: Option<String>,
    pub birth_date: Option<String>,
    pub exam_date: Option<String>,
    pub exam_time: Option<String>,
    pub age_years: Option<i32>,
}

impl PatientInfo {
    /// Read `Paciente/*` and `Exame/*`; never fails
    pub fn from_document(doc: &ExamDocument<'_>) -> Self {
        let owned = |parent: &str, child: &str| doc.text_at(parent, child).map(str::to_string);

        let name = owned("Paciente", "Nome");
        let sex = owned("Paciente", "Sexo");
        let birth_date = owned("Paciente", "DataNascimento");
        let exam_date = owned("Exame", "Data");
        let exam_time = owned("Exame", "Hora");
        let age_years = derive_age(birth_date.as_deref(), exam_date.as_deref());

        if age_years.is_none() && birth_date.is_some() {
            debug!(
                "Could not derive age from birth date {:?} and exam date {:?}",
                birth_date, exam_date
            );
        }

        Self {
            name,
            sex,
            birth_date,
            exam_date,
            exam_time,
            age_years,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }

    pub fn display_sex(&self) -> &str {
        self.sex.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn display_age(&self) -> String {
        self.age_years
            .map(|age| age.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn display_exam_date(&self) -> &str {
        self.exam_date.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn display_exam_time(&self) -> &str {
        self.exam_time.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Banner line printed above the chart
    pub fn title(&self) -> String {
        format!(
            "ECG - Patient: {} ({}, {} years) - Date: {} {}",
            self.display_name(),
            self.display_sex(),
            self.display_age(),
            self.display_exam_date(),
            self.display_exam_time()
        )
    }
}

/// Year token of a `dd/mm/yyyy`-style date: the text after the last `/`
pub fn year_token(date: &str) -> Option<i32> {
    let (_, year) = date.rsplit_once('/')?;
    year.trim().parse().ok()
}

/// Age in whole years from the year parts of two dates
///
/// Month and day are not considered. Any missing or unparsable input gives
/// `None`.
pub fn derive_age(birth_date: Option<&str>, exam_date: Option<&str>) -> Option<i32> {
    let birth_year = year_token(birth_date?)?;
    let exam_year = year_token(exam_date?)?;
    exam_year.checked_sub(birth_year)
}
