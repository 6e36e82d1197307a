//! End-to-end style profiling over real file trees.

use assert_fs::prelude::*;
use stylepatch::core::style::analyze_with;

fn langs() -> Vec<String> {
    vec!["python".to_string(), "rust".to_string()]
}

#[test]
fn mixed_documented_and_camel_tree_hits_half_ratios() {
    // One documented snake_case function, one undocumented CamelCase
    // function: both ratios land exactly on 0.5.
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("app.py")
        .write_str(concat!(
            "def documented_one():\n",
            "    \"\"\"Does the first thing.\"\"\"\n",
            "    return 1\n",
            "\n",
            "def UndocumentedTwo():\n",
            "    return 2\n",
        ))
        .expect("write");

    let profile = analyze_with(tmp.path(), &langs(), &[], None).expect("analyze");

    assert_eq!(profile.docstring_ratio, 0.5);
    assert_eq!(profile.camel_ratio, 0.5);
    assert!(profile.avg_func_len >= 1.0);
}

#[test]
fn zero_function_tree_profiles_to_all_zero() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("constants.py")
        .write_str("VERSION = \"1.0\"\n")
        .expect("write");

    let profile = analyze_with(tmp.path(), &langs(), &[], None).expect("analyze");

    assert_eq!(profile.avg_func_len, 0.0);
    assert_eq!(profile.camel_ratio, 0.0);
    assert_eq!(profile.docstring_ratio, 0.0);
    assert_eq!(profile.log_usage, 0.0);
}

#[test]
fn ratios_stay_within_unit_interval() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    for i in 0..4 {
        tmp.child(format!("mod_{i}.py"))
            .write_str(&format!(
                "def handler_{i}(x):\n    \"\"\"doc\"\"\"\n    logger.info(x)\n    return x\n"
            ))
            .expect("write");
    }

    let profile = analyze_with(tmp.path(), &langs(), &[], None).expect("analyze");

    assert!((0.0..=1.0).contains(&profile.camel_ratio));
    assert!((0.0..=1.0).contains(&profile.docstring_ratio));
    assert!(profile.avg_func_len >= 0.0);
    // Fully documented tree
    assert_eq!(profile.docstring_ratio, 1.0);
    // One logging call per function
    assert_eq!(profile.log_usage, 1.0);
}

#[test]
fn unparsable_file_is_skipped_not_fatal() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("good.py")
        .write_str("def ok():\n    return 1\n")
        .expect("write");
    // Severely malformed source; the grammar still produces a tree with
    // error nodes, and in the worst case the file is skipped
    tmp.child("bad.py")
        .write_str("def broken(((\n  ::::\n")
        .expect("write");

    let profile = analyze_with(tmp.path(), &langs(), &[], None).expect("analyze");

    // The good file's function is always counted
    assert!(profile.avg_func_len >= 1.0);
}

#[test]
fn rust_and_python_tallies_merge() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("lib.rs")
        .write_str("/// Doc.\nfn documented() {}\n")
        .expect("write");
    tmp.child("app.py")
        .write_str("def plain():\n    return 0\n")
        .expect("write");

    let profile = analyze_with(tmp.path(), &langs(), &[], None).expect("analyze");

    // Two functions, one documented
    assert_eq!(profile.docstring_ratio, 0.5);
}

#[test]
fn ignore_patterns_exclude_trees() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("src/real.py")
        .write_str("def real():\n    return 1\n")
        .expect("write");
    tmp.child("vendor/dep.py")
        .write_str(concat!(
            "def VendorOne():\n    return 1\n",
            "def VendorTwo():\n    return 2\n",
        ))
        .expect("write");

    let ignores = vec!["vendor/**".to_string()];
    let profile = analyze_with(tmp.path(), &langs(), &ignores, None).expect("analyze");

    // Only the snake_case function under src/ is visible
    assert_eq!(profile.camel_ratio, 0.0);
}
