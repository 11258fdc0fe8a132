use std::fs;

use damage_bench::config::SweepConfig;
use damage_bench::sweep::SweepRunner;
use serde_json::Value;
use tempfile::tempdir;

fn load_config(output_dir: &std::path::Path) -> SweepConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
seed: 4242
scenarios:
  - name: "standard"
    deck: [6, 6, 3, 3]
    targets: {{ from: 0, to: 4 }}
    arithmetic: "all"
    sampling: {{ trials: 500 }}
  - name: "partial"
    deck: [1, 1, 0, 0]
    hand: [1, 0, 0, 0]
    targets: {{ from: 2, to: 2 }}
  - name: "red"
    deck: [2, 2, 1, 1]
    targets: {{ from: 1, to: 3 }}
    colour: "red"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
  plots_dir: "{plots}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("rows.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
        plots = output_dir.join("plots").display()
    );

    let mut cfg: SweepConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn read_rows(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("jsonl readable")
        .lines()
        .map(|line| serde_json::from_str(line).expect("row is json"))
        .collect()
}

#[test]
fn sweep_smoke_test_writes_exact_rows() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());
    let outputs = config.resolved_outputs();

    let runner = SweepRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("sweep completes");

    assert_eq!(summary.scenarios, 3);
    assert_eq!(summary.rows_written, 9);
    assert!(summary.summary_path.exists());
    assert!(summary.telemetry_path.is_none());
    assert!(summary.max_abs_drift.is_some_and(|d| d < 1e-12));

    let rows = read_rows(&summary.jsonl_path);
    assert_eq!(rows.len(), 9);

    let exact: Vec<&str> = rows
        .iter()
        .take(5)
        .map(|row| row["exact"].as_str().expect("exact string"))
        .collect();
    assert_eq!(exact, ["0", "47/40", "47/20", "193527/61880", "157627/46410"]);

    assert_eq!(rows[2]["terminal_mass_exact"], "46/51");
    // One miss already in hand: a second miss busts, the hit finishes.
    assert_eq!(rows[5]["scenario"], "partial");
    assert_eq!(rows[5]["hand"], serde_json::json!([1, 0, 0, 0]));
    assert_eq!(rows[5]["exact"], "1/2");
    assert_eq!(rows[5]["leaked_mass_exact"], "1/2");
    assert_eq!(rows[5]["deck"], serde_json::json!([1, 1, 0, 0]));
    assert!(rows[5]["sampling"].is_null());

    let red: Vec<&str> = rows[6..]
        .iter()
        .map(|row| row["exact"].as_str().expect("exact string"))
        .collect();
    assert_eq!(red, ["8/3", "16/3", "107/15"]);
    assert!(rows[6..].iter().all(|row| row["colour"] == "red"));
    assert_eq!(rows[0]["colour"], "white");

    let sampled = &rows[1]["sampling"];
    assert_eq!(sampled["trials"], 500);
    assert_eq!(sampled["finished_rate"], 1.0);

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("## standard"));
    assert!(markdown.contains("## partial"));
    assert!(markdown.contains("| 3 | red | 107/15 |"));
}

#[test]
fn sweep_is_deterministic_for_a_seed() {
    let first = tempdir().expect("temp dir");
    let second = tempdir().expect("temp dir");

    let strip_timing = |mut rows: Vec<Value>| {
        for row in &mut rows {
            if let Some(object) = row.as_object_mut() {
                object.remove("elapsed_ms");
            }
        }
        rows
    };

    let mut outputs = Vec::new();
    for dir in [&first, &second] {
        let config = load_config(dir.path());
        let resolved = config.resolved_outputs();
        let summary = SweepRunner::new(config, resolved)
            .expect("runner created")
            .run()
            .expect("sweep completes");
        outputs.push(strip_timing(read_rows(&summary.jsonl_path)));
    }

    assert_eq!(outputs[0], outputs[1]);
}
