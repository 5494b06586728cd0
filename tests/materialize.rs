use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use tempfile::TempDir;

use cjc::api::types::{Activity, ProblemSet};
use cjc::materialize::{self, ProblemError};

fn problem_set_json(description: &str, stream: &str) -> String {
    serde_json::json!({
        "activityType": "Exercise",
        "problemSet": {
            "name": "Python TQC+ 第1類",
            "problems": [
                {
                    "tags": ["io"],
                    "locales": [
                        {
                            "title": "Python 101 Add Two Numbers",
                            "description": "English text",
                            "localeCode": "en"
                        },
                        {
                            "title": "Python 101 兩數相加",
                            "description": description,
                            "localeCode": "zh-Hant"
                        }
                    ],
                    "editFiles": [
                        { "fileName": "PYD101.py", "extension": ".py", "fileStream": stream }
                    ]
                },
                { "tags": [], "locales": [], "editFiles": [] }
            ]
        }
    })
    .to_string()
}

fn load(description: &str, stream: &str) -> ProblemSet {
    let activity: Activity = serde_json::from_str(&problem_set_json(description, stream)).unwrap();
    activity.problem_set
}

#[test]
fn downloads_full_problem_layout() {
    let root = TempDir::new().unwrap();
    let description = "讀入兩個整數。\r\n\r\n## 範例輸入\r\n```\r\n1 2\r\n```\r\n\r\n## 範例輸出\r\n```\r\n3\r\n```\r\n";
    let stream = format!(
        "data:text/x-python;base64,{}",
        STANDARD.encode("a, b = map(int, input().split())\r\nprint(a + b)\r\n")
    );
    let set = load(description, &stream);

    let report = materialize::materialize(&set, root.path()).unwrap();

    let dir = root.path().join("Python").join("TQC+ 第1類").join("101_兩數相加");
    assert_eq!(report.written, vec![dir.clone()]);
    assert_eq!(report.skipped, vec![1]);

    let md = fs::read_to_string(dir.join("101.md")).unwrap();
    assert_eq!(
        md,
        "# Python 101 兩數相加\n\n讀入兩個整數。\n\n## 範例輸入\n```\n1 2\n```\n\n## 範例輸出\n```\n3\n```\n"
    );
    assert_eq!(fs::read_to_string(dir.join("in0.txt")).unwrap(), "1 2");
    assert_eq!(fs::read_to_string(dir.join("out0.txt")).unwrap(), "3");
    assert_eq!(
        fs::read_to_string(dir.join("PYD101.py")).unwrap(),
        "a, b = map(int, input().split())\nprint(a + b)\n"
    );

    let mut entries: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    entries.sort();
    assert_eq!(entries, ["101.md", "PYD101.py", "in0.txt", "out0.txt"]);
}

#[test]
fn second_run_overwrites_in_place() {
    let root = TempDir::new().unwrap();
    let stream = format!("x,{}", STANDARD.encode("v1"));
    materialize::materialize(&load("text", &stream), root.path()).unwrap();

    let stream = format!("x,{}", STANDARD.encode("v2"));
    let report = materialize::materialize(&load("text", &stream), root.path()).unwrap();

    assert_eq!(fs::read_to_string(report.written[0].join("PYD101.py")).unwrap(), "v2");
}

#[test]
fn broken_attachment_reports_set_and_file() {
    let root = TempDir::new().unwrap();
    let set = load("text", "no prefix here");

    let err = materialize::materialize(&set, root.path()).unwrap_err();

    assert_eq!(err.problem_set, "Python TQC+ 第1類");
    assert_eq!(err.index, 0);
    match err.source {
        ProblemError::MissingStreamPrefix { file_name } => assert_eq!(file_name, "PYD101.py"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unwritable_root_surfaces_io_error() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("not-a-dir");
    fs::write(&root, "plain file").unwrap();

    let err = materialize::materialize(&load("text", "x,aGk="), &root).unwrap_err();

    assert_eq!(err.problem_set, "Python TQC+ 第1類");
    assert_eq!(err.index, 0);
    match err.source {
        ProblemError::Io { path, .. } => assert!(path.starts_with(&root)),
        other => panic!("unexpected error: {other:?}"),
    }
}
