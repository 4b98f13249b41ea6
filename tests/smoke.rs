use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("pushshift-harvest").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn fetch_requires_a_query() {
    let mut cmd = Command::cargo_bin("pushshift-harvest").expect("binary exists");
    cmd.arg("fetch").assert().failure();
}
