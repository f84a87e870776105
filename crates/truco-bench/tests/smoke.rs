use std::collections::HashSet;
use std::fs;

use tempfile::tempdir;
use truco_bench::config::BenchmarkConfig;
use truco_bench::tournament::TournamentRunner;

fn load_config(output_dir: &std::path::Path, games: usize) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
matches:
  seed: 4242
  games: {games}
agents:
  - name: "baseline"
    kind: "builtin"
    params:
      strategy: "dummy"
  - name: "strong"
    kind: "builtin"
    params:
      strategy: "hand-strength"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
metrics:
  baseline: "baseline"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("{run_id}").join("games.jsonl").display(),
        summary = output_dir.join("{run_id}").join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn rows(path: &std::path::Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .expect("jsonl readable")
        .lines()
        .map(|line| serde_json::from_str(line).expect("row decodes to JSON"))
        .collect()
}

#[test]
fn tournament_writes_one_row_per_seat_per_game() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path(), 4);
    let outputs = config.resolved_outputs();
    assert!(outputs.jsonl.starts_with(dir.path().join("test_smoke")));

    let runner = TournamentRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("tournament completes");

    assert_eq!(summary.games_played, 4);
    assert_eq!(summary.rows_written, 8);
    assert!(summary.telemetry_path.is_none());

    let rows = rows(&summary.jsonl_path);
    assert_eq!(rows.len(), 8);

    let game_ids: HashSet<&str> = rows
        .iter()
        .map(|row| row["game_id"].as_str().expect("game id"))
        .collect();
    assert_eq!(game_ids.len(), 4);
    assert!(game_ids.contains("G00000"));

    for pair in rows.chunks(2) {
        assert_eq!(pair[0]["game_id"], pair[1]["game_id"]);
        assert_eq!(pair[0]["seat"], "one");
        assert_eq!(pair[1]["seat"], "two");
        let wins = pair.iter().filter(|row| row["won"] == true).count();
        assert_eq!(wins, 1, "exactly one winner per game");
        let winner = pair.iter().find(|row| row["won"] == true).expect("winner row");
        assert_eq!(winner["points"], 12);
        assert!(pair.iter().all(|row| row["decisions"].as_u64() > Some(0)));
    }

    // Seats swap every other game.
    assert_eq!(rows[0]["bot"], "baseline");
    assert_eq!(rows[2]["bot"], "strong");

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.starts_with("# Tournament Summary"));
    assert!(markdown.contains("| baseline | Builtin | 4 |"));
    assert!(markdown.contains("| strong | Builtin | 4 |"));
}

#[test]
fn seeded_runs_replay_identically() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let strip_speed = |mut rows: Vec<serde_json::Value>| {
        for row in &mut rows {
            if let Some(obj) = row.as_object_mut() {
                obj.remove("speed_ms_decision");
            }
        }
        rows
    };

    let mut results = Vec::new();
    for dir in [first_dir.path(), second_dir.path()] {
        let config = load_config(dir, 3);
        let outputs = config.resolved_outputs();
        let summary = TournamentRunner::new(config, outputs)
            .expect("runner created")
            .run()
            .expect("tournament completes");
        results.push(strip_speed(rows(&summary.jsonl_path)));
    }

    assert_eq!(results[0], results[1]);
}

#[test]
fn shipped_configs_validate() {
    let bench_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../bench");
    for file in ["bench.yaml", "external.yaml"] {
        let config = BenchmarkConfig::from_path(bench_dir.join(file))
            .unwrap_or_else(|err| panic!("{file}: {err}"));
        assert_eq!(config.agents.len(), 2);
        assert!(TournamentRunner::new(config.clone(), config.resolved_outputs()).is_ok());
    }
}
