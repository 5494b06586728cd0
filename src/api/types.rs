use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub problem_set_id: i64,
    pub problem_set_type: String,
}

// Problem set types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub activity_type: String,
    pub problem_set: ProblemSet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSet {
    pub name: String,
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub tags: Vec<String>,
    pub locales: Vec<Locale>,
    pub edit_files: Vec<EditFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    pub title: String,
    pub description: String,
    pub locale_code: String,
}

impl Locale {
    pub fn is_traditional_chinese(&self) -> bool {
        self.locale_code.eq_ignore_ascii_case("zh-hant")
    }
}

/// Starter file shipped with a problem. `file_stream` is a data-URL style
/// `"<metadata>,<base64>"` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditFile {
    pub file_name: String,
    pub extension: String,
    pub file_stream: String,
}
