use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn shortlist(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shortlist").expect("binary");
    cmd.current_dir(workdir)
        .env("SHORTLIST_EMBEDDING_MODE", "hash");
    cmd
}

fn write_pairs(root: &Path) {
    fs::write(
        root.join("pairs.json"),
        r#"
        {
          "schema_version": 1,
          "name": "smoke",
          "pairs": [
            { "query": "Senior Java developer for banking platform", "reference": "https://catalog/java-advanced" },
            { "query": "Junior Python data analyst", "reference": "https://catalog/python-basics" },
            { "query": "DevOps engineer with Kubernetes and AWS", "reference": "https://catalog/devops" }
          ]
        }
        "#,
    )
    .unwrap();
}

fn build_index(root: &Path) {
    let output = shortlist(root)
        .args(["index", "--pairs", "pairs.json", "--out", "index.json"])
        .args(["--dimension", "32"])
        .output()
        .expect("index run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let summary: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(summary["indexed"], 3);
    assert_eq!(summary["dimension"], 32);
}

#[test]
fn index_then_search_returns_ranked_json() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_pairs(root);
    build_index(root);

    let output = shortlist(root)
        .args(["search", "--index", "index.json"])
        .args(["--query", "Senior Java developer", "--top-k", "2"])
        .output()
        .expect("search run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);

    let references: Vec<&str> = results
        .iter()
        .map(|r| r["item"]["reference"].as_str().unwrap())
        .collect();
    assert_eq!(
        references.iter().collect::<std::collections::HashSet<_>>().len(),
        references.len(),
        "duplicate references in output"
    );
    for result in results {
        let final_score = result["final_score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&final_score));
    }
}

#[test]
fn search_without_keyword_boost_reports_semantic_scores_only() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_pairs(root);
    build_index(root);

    let output = shortlist(root)
        .args(["search", "--index", "index.json"])
        .args(["--query", "data analyst", "--top-k", "3", "--no-keyword-boost"])
        .output()
        .expect("search run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    for result in body["results"].as_array().unwrap() {
        assert_eq!(result["keyword_score"].as_f64().unwrap(), 0.0);
        assert_eq!(
            result["final_score"].as_f64().unwrap(),
            result["semantic_score"].as_f64().unwrap()
        );
    }
}

#[test]
fn eval_against_full_catalog_saturates_recall() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_pairs(root);
    build_index(root);

    fs::write(
        root.join("queries.json"),
        r#"
        {
          "schema_version": 1,
          "queries": [
            "hiring a senior java engineer",
            "entry level data role"
          ]
        }
        "#,
    )
    .unwrap();

    let output = shortlist(root)
        .args(["eval", "--index", "index.json", "--queries", "queries.json"])
        .args(["--k", "3", "--out", "report.json"])
        .output()
        .expect("eval run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let summary: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    // k covers the whole catalog, so the degenerate relevance mode saturates.
    assert_eq!(summary["mean_recall"], 1.0);
    assert_eq!(summary["excluded_queries"], 0);

    let report: Value =
        serde_json::from_slice(&fs::read(root.join("report.json")).unwrap()).expect("report json");
    assert_eq!(report["query_results"].as_array().unwrap().len(), 2);
    assert!(report["note"].as_str().unwrap().contains("catalog"));
}

#[test]
fn eval_with_labels_excludes_unlabeled_queries_from_aggregates() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_pairs(root);
    build_index(root);

    fs::write(
        root.join("queries.json"),
        r#"
        {
          "schema_version": 1,
          "queries": [
            "Senior Java developer for banking platform",
            "completely unlabeled query"
          ]
        }
        "#,
    )
    .unwrap();
    fs::write(
        root.join("labels.json"),
        r#"
        {
          "schema_version": 1,
          "labels": {
            "Senior Java developer for banking platform": ["https://catalog/java-advanced"]
          }
        }
        "#,
    )
    .unwrap();

    let output = shortlist(root)
        .args(["eval", "--index", "index.json", "--queries", "queries.json"])
        .args(["--labels", "labels.json", "--k", "3", "--out", "report.json"])
        .output()
        .expect("eval run");
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(summary["evaluated_queries"], 1);
    assert_eq!(summary["excluded_queries"], 1);
    // The labeled query's reference sits in a 3-item catalog with k=3.
    assert_eq!(summary["mean_recall"], 1.0);
}

#[test]
fn index_rejects_invalid_dataset() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(
        root.join("pairs.json"),
        r#"{ "schema_version": 1, "pairs": [] }"#,
    )
    .unwrap();

    shortlist(root)
        .args(["index", "--pairs", "pairs.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one pair"));
}

#[test]
fn search_rejects_invalid_profile_weights() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_pairs(root);
    build_index(root);

    fs::write(
        root.join("profile.toml"),
        "semantic_weight = 0.9\nkeyword_weight = 0.3\n",
    )
    .unwrap();

    shortlist(root)
        .args(["search", "--index", "index.json", "--query", "java"])
        .args(["--profile", "profile.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sum to 1.0"));
}
