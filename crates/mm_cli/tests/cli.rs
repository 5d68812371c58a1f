use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

const GB: &str = r#"{"type":"FeatureCollection","features":[
  {"type":"Feature","properties":{"CODE":"E1"},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
  {"type":"Feature","properties":{"CODE":"E2"},"geometry":{"type":"Polygon","coordinates":[[[1,0],[2,0],[2,1],[1,1],[1,0]]]}}
]}"#;

const RESULTS: &str = "E1,x,Foo,x,x,x,A,30\nE1,x,Foo,x,x,x,B,70\nE2,x,Bar,x,x,x,A,40\nE2,x,Bar,x,x,x,B,60\n";

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new(table: &str, results: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("c.csv"), table).unwrap();
        fs::write(dir.path().join("r.csv"), results).unwrap();
        fs::write(dir.path().join("gb.geojson"), GB).unwrap();
        Fixture { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self, sub: &str) -> Command {
        let mut cmd = Command::cargo_bin("mm").unwrap();
        cmd.env_remove("RUST_LOG")
            .arg(sub)
            .arg("--constituencies")
            .arg(self.path("c.csv"))
            .arg("--results")
            .arg(self.path("r.csv"))
            .arg("--boundaries")
            .arg(format!("{}:CODE", self.path("gb.geojson").display()));
        cmd
    }
}

fn read_json(p: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(p).unwrap()).unwrap()
}

#[test]
fn run_writes_data_and_geometries() {
    let fx = Fixture::new("FooBar,5000,2,Foo,Bar\n", RESULTS);
    let out = fx.path("out");

    fx.cmd("run").arg("--out").arg(&out).assert().success();

    let data = read_json(&out.join("data.json"));
    assert_eq!(data["parliament"], json!({"A": 1, "B": 1}));
    assert_eq!(data["constituencies"]["FooBar"]["votes"], json!({"A": 70, "B": 130}));
    assert!(data.get("topUp").is_none());

    let feature = read_json(&out.join("geometries").join("FooBar.geojson"));
    assert_eq!(feature["properties"]["name"], "FooBar");
}

#[test]
fn run_top_up_variant_from_flags() {
    let fx = Fixture::new("FooBar,5000,2,1,Foo,Bar\n", RESULTS);
    let out = fx.path("out");

    fx.cmd("run")
        .args(["--variant", "top-up", "--topup-seats", "2", "--quiet"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let data = read_json(&out.join("data.json"));
    assert_eq!(data["topUp"], json!({"A": 1, "B": 1}));
    assert_eq!(data["parliamentWithTopUp"], json!({"A": 1, "B": 2}));
}

#[test]
fn params_file_is_honoured() {
    let fx = Fixture::new("FooBar,5000,2,1,Foo,Bar\n", RESULTS);
    fs::write(fx.path("p.json"), r#"{"variant":"top_up","national_topup_seats":1}"#).unwrap();
    let out = fx.path("out");

    fx.cmd("run")
        .arg("--params")
        .arg(fx.path("p.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(read_json(&out.join("data.json"))["topUp"], json!({"B": 1}));
}

#[test]
fn validate_reports_ok_and_writes_nothing() {
    let fx = Fixture::new("FooBar,5000,2,Foo,Bar\n", RESULTS);
    fx.cmd("validate")
        .assert()
        .success()
        .stderr(predicate::str::contains("inputs OK"));
    assert!(!fx.path("out").exists());
}

#[test]
fn count_mismatch_exits_2_without_output() {
    let fx = Fixture::new("FooBar,5000,2,Foo,Bar,Baz\n", RESULTS);
    let out = fx.path("out");
    fx.cmd("run")
        .arg("--out")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("mismatched legacy-unit counts"));
    assert!(!out.exists());
}

#[test]
fn unmatched_source_exits_2() {
    let fx = Fixture::new("FooBar,5000,2,Foo\n", RESULTS);
    fx.cmd("validate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Bar"));
}

#[test]
fn missing_input_exits_4() {
    let fx = Fixture::new("FooBar,5000,2,Foo,Bar\n", RESULTS);
    fs::remove_file(fx.path("r.csv")).unwrap();
    fx.cmd("validate")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn bad_params_file_exits_5() {
    let fx = Fixture::new("FooBar,5000,2,Foo,Bar\n", RESULTS);
    fs::write(fx.path("p.json"), r#"{"variant":"stv"}"#).unwrap();
    fx.cmd("validate")
        .arg("--params")
        .arg(fx.path("p.json"))
        .assert()
        .code(5)
        .stderr(predicate::str::contains("params"));
}

#[test]
fn boundary_without_id_property_falls_back_to_params() {
    let fx = Fixture::new("FooBar,5000,2,Foo,Bar\n", RESULTS);
    let mut cmd = Command::cargo_bin("mm").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("validate")
        .arg("--constituencies")
        .arg(fx.path("c.csv"))
        .arg("--results")
        .arg(fx.path("r.csv"))
        .arg("--boundaries")
        .arg(fx.path("gb.geojson"))
        .assert()
        .success();
}

#[test]
fn bad_flag_value_is_a_usage_error() {
    let fx = Fixture::new("FooBar,5000,2,Foo,Bar\n", RESULTS);
    fx.cmd("validate").args(["--variant", "stv"]).assert().code(2);
}
