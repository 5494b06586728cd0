//! Writes a fetched problem set to disk.
//!
//! Layout per problem:
//!
//! ```text
//! <root>/<category>/<set name without category>/<code>_<name>/
//!     <code>.md
//!     in0.txt, out0.txt, ...
//!     <starter files>
//! ```

pub mod error;
pub mod samples;
pub mod title;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

use crate::api::types::{EditFile, Locale, Problem, ProblemSet};

pub use error::{MaterializeError, ProblemError, Result};
pub use title::LocaleTitle;

/// What one `materialize` call produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    /// Problem directories written, in problem order.
    pub written: Vec<PathBuf>,
    /// Indices of problems skipped for having no locale.
    pub skipped: Vec<usize>,
}

/// Materializes every problem of `problem_set` under `output_root`.
///
/// Problems without locales are skipped and listed in the report. Any other
/// failure stops the set and names the problem that caused it.
pub fn materialize(problem_set: &ProblemSet, output_root: &Path) -> Result<Report> {
    let mut report = Report::default();

    for (index, problem) in problem_set.problems.iter().enumerate() {
        match save_problem(problem_set, problem, output_root) {
            Ok(Some(dir)) => report.written.push(dir),
            Ok(None) => {
                warn!(problem_set = %problem_set.name, index, "No locales for problem.");
                report.skipped.push(index);
            }
            Err(source) => {
                return Err(MaterializeError {
                    problem_set: problem_set.name.clone(),
                    index,
                    source,
                });
            }
        }
    }

    info!(
        problem_set = %problem_set.name,
        written = report.written.len(),
        skipped = report.skipped.len(),
        "saved problem set"
    );
    Ok(report)
}

fn save_problem(
    problem_set: &ProblemSet,
    problem: &Problem,
    output_root: &Path,
) -> std::result::Result<Option<PathBuf>, ProblemError> {
    let Some(locale) = select_locale(&problem.locales) else {
        return Ok(None);
    };

    let title = LocaleTitle::parse(&locale.title)?;
    let dir = problem_dir(output_root, &problem_set.name, &title)?;
    std::fs::create_dir_all(&dir).map_err(ProblemError::io(&dir))?;

    let description = normalize_line_endings(&locale.description);
    let md_path = dir.join(format!("{}.md", title.code));
    std::fs::write(&md_path, format!("# {}\n\n{}", locale.title, description))
        .map_err(ProblemError::io(&md_path))?;

    samples::extract(&description, &dir)?;

    for file in &problem.edit_files {
        write_edit_file(file, &dir)?;
    }

    Ok(Some(dir))
}

/// Picks the first locale, replaced by each later `zh-hant` locale in turn,
/// so the last `zh-hant` entry wins. `None` for an empty slice.
pub fn select_locale(locales: &[Locale]) -> Option<&Locale> {
    let (first, rest) = locales.split_first()?;
    Some(rest.iter().fold(first, |chosen, locale| {
        if locale.is_traditional_chinese() {
            locale
        } else {
            chosen
        }
    }))
}

/// `<root>/<category>/<set name stripped of category chars>/<code>_<name>`
///
/// Each part may nest (`C/C++`) but must stay below `output_root`.
pub fn problem_dir(
    output_root: &Path,
    set_name: &str,
    title: &LocaleTitle<'_>,
) -> std::result::Result<PathBuf, ProblemError> {
    let dir_name = title.dir_name();
    let parts = [title.category, title.strip_category(set_name), dir_name.as_str()];

    let mut dir = output_root.to_path_buf();
    for part in parts {
        if !is_plain_relative(part) {
            return Err(ProblemError::UnsafePath {
                part: part.to_string(),
            });
        }
        dir.push(part);
    }
    Ok(dir)
}

/// Only normal components: no root, prefix, `.` or `..`.
fn is_plain_relative(part: &str) -> bool {
    Path::new(part)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Byte-level `\r\n` → `\n`; leaves lone `\r` and non-UTF-8 bytes untouched.
pub fn normalize_line_endings_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&b) = iter.next() {
        if b == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}

/// Decodes the base64 payload after the first comma of `file_stream`.
pub fn decode_file_stream(file: &EditFile) -> std::result::Result<Vec<u8>, ProblemError> {
    let (_, payload) =
        file.file_stream
            .split_once(',')
            .ok_or_else(|| ProblemError::MissingStreamPrefix {
                file_name: file.file_name.clone(),
            })?;

    // MIME-style payloads may be wrapped across lines
    let payload: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    STANDARD
        .decode(payload)
        .map_err(|source| ProblemError::InvalidBase64 {
            file_name: file.file_name.clone(),
            source,
        })
}

fn write_edit_file(file: &EditFile, dir: &Path) -> std::result::Result<(), ProblemError> {
    let mut components = Path::new(&file.file_name).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(ProblemError::UnsafeFileName {
            file_name: file.file_name.clone(),
        });
    }

    let content = normalize_line_endings_bytes(&decode_file_stream(file)?);
    let path = dir.join(&file.file_name);
    std::fs::write(&path, content).map_err(ProblemError::io(&path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locale(title: &str, code: &str) -> Locale {
        Locale {
            title: title.to_string(),
            description: String::new(),
            locale_code: code.to_string(),
        }
    }

    fn edit_file(name: &str, content: &[u8]) -> EditFile {
        EditFile {
            file_name: name.to_string(),
            extension: String::new(),
            file_stream: format!("data:text/plain;base64,{}", STANDARD.encode(content)),
        }
    }

    fn problem(locales: Vec<Locale>, edit_files: Vec<EditFile>) -> Problem {
        Problem {
            tags: vec![],
            locales,
            edit_files,
        }
    }

    #[test]
    fn select_locale_defaults_to_first() {
        let locales = vec![locale("a", "en"), locale("b", "zh-hans"), locale("c", "ja")];
        assert_eq!(select_locale(&locales).unwrap().title, "a");
    }

    #[test]
    fn select_locale_prefers_last_zh_hant() {
        let locales = vec![
            locale("a", "en"),
            locale("b", "zh-Hant"),
            locale("c", "en"),
            locale("d", "ZH-HANT"),
            locale("e", "en"),
        ];
        assert_eq!(select_locale(&locales).unwrap().title, "d");
    }

    #[test]
    fn select_locale_single_and_empty() {
        assert_eq!(select_locale(&[locale("x", "en")]).unwrap().title, "x");
        assert!(select_locale(&[]).is_none());
    }

    #[test]
    fn byte_normalization_only_touches_crlf() {
        assert_eq!(
            normalize_line_endings_bytes(b"a\r\nb\rc\n\r\n\xff"),
            b"a\nb\rc\n\n\xff".to_vec()
        );
        assert_eq!(normalize_line_endings_bytes(b"\r"), b"\r".to_vec());
    }

    #[test]
    fn decode_uses_text_after_first_comma() {
        let file = EditFile {
            file_name: "a.txt".into(),
            extension: ".txt".into(),
            file_stream: "meta,aGk=".into(),
        };
        assert_eq!(decode_file_stream(&file).unwrap(), b"hi");
    }

    #[test]
    fn decode_tolerates_wrapped_payload() {
        let file = EditFile {
            file_name: "a.txt".into(),
            extension: ".txt".into(),
            file_stream: "meta,aGVs\nbG8=".into(),
        };
        assert_eq!(decode_file_stream(&file).unwrap(), b"hello");
    }

    #[test]
    fn decode_errors_name_the_file() {
        let missing = EditFile {
            file_name: "x.py".into(),
            extension: ".py".into(),
            file_stream: "no-comma".into(),
        };
        assert!(matches!(
            decode_file_stream(&missing),
            Err(ProblemError::MissingStreamPrefix { file_name }) if file_name == "x.py"
        ));

        let invalid = EditFile {
            file_stream: "meta,@@@".into(),
            ..missing
        };
        assert!(matches!(
            decode_file_stream(&invalid),
            Err(ProblemError::InvalidBase64 { file_name, .. }) if file_name == "x.py"
        ));
    }

    #[test]
    fn writes_problem_layout() {
        let root = TempDir::new().unwrap();
        let mut loc = locale("Python 101 Hello World", "zh-hant");
        loc.description = "Say hi.\r\n## 範例輸入\r\n```\r\n1 2\r\n```\r\n## 範例輸出\r\n```\r\n3\r\n```\r\n".into();
        let set = ProblemSet {
            name: "Python TQC+ 第1類".into(),
            problems: vec![problem(vec![loc], vec![edit_file("main.py", b"print(1)\r\n")])],
        };

        let report = materialize(&set, root.path()).unwrap();

        let dir = root
            .path()
            .join("Python")
            .join("TQC+ 第1類")
            .join("101_Hello World");
        assert_eq!(report.written, vec![dir.clone()]);
        assert!(report.skipped.is_empty());

        let md = std::fs::read_to_string(dir.join("101.md")).unwrap();
        assert!(md.starts_with("# Python 101 Hello World\n\nSay hi.\n"));
        assert!(!md.contains("\r\n"));
        assert_eq!(std::fs::read_to_string(dir.join("in0.txt")).unwrap(), "1 2");
        assert_eq!(std::fs::read_to_string(dir.join("out0.txt")).unwrap(), "3");
        assert_eq!(std::fs::read(dir.join("main.py")).unwrap(), b"print(1)\n");
    }

    #[test]
    fn problem_without_locales_is_skipped() {
        let root = TempDir::new().unwrap();
        let set = ProblemSet {
            name: "Python Set".into(),
            problems: vec![
                problem(vec![], vec![edit_file("lost.py", b"x")]),
                problem(vec![locale("Python 2 Two", "en")], vec![]),
            ],
        };

        let report = materialize(&set, root.path()).unwrap();

        assert_eq!(report.skipped, vec![0]);
        assert_eq!(report.written.len(), 1);
        assert!(report.written[0].join("2.md").exists());
        assert!(!report.written[0].join("lost.py").exists());
    }

    #[test]
    fn bad_title_stops_the_set_with_context() {
        let root = TempDir::new().unwrap();
        let set = ProblemSet {
            name: "Python Set".into(),
            problems: vec![
                problem(vec![locale("Python 1 One", "en")], vec![]),
                problem(vec![locale("Broken", "en")], vec![]),
                problem(vec![locale("Python 3 Three", "en")], vec![]),
            ],
        };

        let err = materialize(&set, root.path()).unwrap_err();

        assert_eq!(err.problem_set, "Python Set");
        assert_eq!(err.index, 1);
        assert!(matches!(err.source, ProblemError::Title { ref title } if title == "Broken"));
        assert!(!root.path().join("Python").join("Set").join("3_Three").exists());
    }

    #[test]
    fn directory_parts_cannot_escape_root() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("root");
        for (title, set_name) in [
            (".. 1 x", "Set"),
            ("Python 1 ../../x", "Set"),
            ("Python 1 x", "Python /etc"),
            ("Python 1 x", "Python ./here"),
        ] {
            let set = ProblemSet {
                name: set_name.into(),
                problems: vec![problem(vec![locale(title, "en")], vec![])],
            };
            let err = materialize(&set, &root).unwrap_err();
            assert!(
                matches!(err.source, ProblemError::UnsafePath { .. }),
                "{title:?} in {set_name:?} should be rejected"
            );
        }
        assert!(!parent.path().join("Set").exists());
        assert!(!root.exists());
    }

    #[test]
    fn nested_category_stays_inside_root() {
        let root = TempDir::new().unwrap();
        let set = ProblemSet {
            name: "C/C++ Set".into(),
            problems: vec![problem(vec![locale("C/C++ 1 Hello", "en")], vec![])],
        };

        let report = materialize(&set, root.path()).unwrap();

        let dir = root.path().join("C").join("C++").join("Set").join("1_Hello");
        assert_eq!(report.written, vec![dir.clone()]);
        assert!(dir.join("1.md").exists());
    }

    #[test]
    fn unsafe_file_names_are_rejected() {
        let root = TempDir::new().unwrap();
        for name in ["../escape.py", "/abs.py", "a/b.py", ".."] {
            let set = ProblemSet {
                name: "Python Set".into(),
                problems: vec![problem(
                    vec![locale("Python 1 One", "en")],
                    vec![edit_file(name, b"x")],
                )],
            };
            let err = materialize(&set, root.path()).unwrap_err();
            assert!(
                matches!(err.source, ProblemError::UnsafeFileName { .. }),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn running_twice_is_idempotent() {
        let root = TempDir::new().unwrap();
        let mut loc = locale("Python 7 Seven", "en");
        loc.description = "# 範例輸出\n```\n42\n```".into();
        let set = ProblemSet {
            name: "Python Set".into(),
            problems: vec![problem(vec![loc], vec![edit_file("s.py", b"pass")])],
        };

        let first = materialize(&set, root.path()).unwrap();
        let snapshot: Vec<_> = ["7.md", "out0.txt", "s.py"]
            .iter()
            .map(|f| std::fs::read(first.written[0].join(f)).unwrap())
            .collect();

        let second = materialize(&set, root.path()).unwrap();
        assert_eq!(first, second);
        for (f, before) in ["7.md", "out0.txt", "s.py"].iter().zip(snapshot) {
            assert_eq!(std::fs::read(second.written[0].join(f)).unwrap(), before);
        }
    }
}
