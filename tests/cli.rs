use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::process::Command;

// `primes` with no args prints the primes up to 100
#[test]
fn cli_default() {
    Command::cargo_bin("primes")
        .unwrap()
        .assert()
        .success()
        .stdout(contains("{2, 3, 5, 7, 11,").and(contains("89, 97}")));
}

// `primes -V` should print the version
#[test]
fn cli_version() {
    Command::cargo_bin("primes")
        .unwrap()
        .args(["-V"])
        .assert()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_small_range() {
    for pool in ["queue", "rayon"] {
        Command::cargo_bin("primes")
            .unwrap()
            .args(["--max", "30", "--threads", "3", "--pool", pool])
            .assert()
            .success()
            .stdout("{2, 3, 5, 7, 11, 13, 17, 19, 23, 29}\n");
    }
}

#[test]
fn cli_empty_range() {
    Command::cargo_bin("primes")
        .unwrap()
        .args(["--max", "1", "--threads", "2"])
        .assert()
        .success()
        .stdout("{}\n");
}

#[test]
fn cli_json_report() {
    Command::cargo_bin("primes")
        .unwrap()
        .args(["--max", "20", "--threads", "2", "--json"])
        .assert()
        .success()
        .stdout(
            contains(r#""max":20"#)
                .and(contains(r#""threads":2"#))
                .and(contains(r#""pool":"queue""#))
                .and(contains(r#""count":8"#))
                .and(contains(r#""primes":[2,3,5,7,11,13,17,19]"#)),
        );
}

#[test]
fn cli_compare_with_baseline() {
    Command::cargo_bin("primes")
        .unwrap()
        .args(["--max", "2000", "--threads", "5", "--compare"])
        .assert()
        .success()
        .stderr(contains("matches the sequential baseline"));
}

#[test]
fn cli_zero_threads() {
    Command::cargo_bin("primes")
        .unwrap()
        .args(["--threads", "0"])
        .assert()
        .failure()
        .stderr(contains("Invalid thread count 0"));
}

#[test]
fn cli_negative_max() {
    Command::cargo_bin("primes")
        .unwrap()
        .args(["--max", "-5"])
        .assert()
        .failure()
        .stderr(contains("Invalid range bound -5"));
}

#[test]
fn cli_invalid_pool() {
    Command::cargo_bin("primes")
        .unwrap()
        .args(["--pool", "naive"])
        .assert()
        .failure();
}
