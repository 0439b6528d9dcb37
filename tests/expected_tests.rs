//! Fixture runner: interpolates every `tests/cases/**/*.txt` and compares the
//! result with `.expected.json` (tree, or a JSON string when the input comes
//! back untouched) or `.expected.err` (strict-mode error).
//!
//! Each case reads its nodes from `<name>.nodes.json`, falling back to the
//! directory's `nodes.json`, and its tags from an optional `<name>.tags.json`.
//!
//! Run with: cargo test --test expected_tests

use libtest_mimic::{Arguments, Failed, Trial};
use node_interpolate::node::JsonNode;
use node_interpolate::{Components, Interpolation, Options, Tags, interpolate};
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let args = Arguments::from_args();
    let trials = collect_cases()
        .into_iter()
        .map(|path| {
            let name = case_name(&path);
            Trial::test(name, move || run_case(&path))
        })
        .collect();
    libtest_mimic::run(&args, trials).exit();
}

fn cases_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cases")
}

/// Collect all .txt case files
fn collect_cases() -> Vec<PathBuf> {
    let pattern = cases_dir().join("**").join("*.txt");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(Result::ok)
        .collect();
    files.sort();
    files
}

fn case_name(path: &Path) -> String {
    path.strip_prefix(cases_dir())
        .unwrap_or(path)
        .with_extension("")
        .to_string_lossy()
        .into_owned()
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    path.with_file_name(format!("{}.{}", stem, suffix))
}

fn read(path: &Path) -> Result<String, Failed> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e).into())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Failed> {
    serde_json::from_str(&read(path)?).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e).into())
}

fn load_options(path: &Path) -> Result<Options<JsonNode>, Failed> {
    let raw = read(path)?;
    let source = raw.strip_suffix('\n').unwrap_or(&raw);

    let nodes_path = match sibling(path, "nodes.json") {
        own if own.exists() => own,
        _ => path.with_file_name("nodes.json"),
    };
    let components = Components::from_json(read_json(&nodes_path)?)
        .map_err(|e| format!("invalid nodes in {}: {}", nodes_path.display(), e))?;

    let mut options = Options {
        components,
        ..Options::new(source)
    };
    let tags_path = sibling(path, "tags.json");
    if tags_path.exists() {
        let tags: Tags = read_json(&tags_path)?;
        options = options.with_tags(tags);
    }
    Ok(options)
}

fn run_case(path: &Path) -> Result<(), Failed> {
    let options = load_options(path)?;
    let expected_json = sibling(path, "expected.json");
    let expected_err = sibling(path, "expected.err");

    if expected_json.exists() {
        let expected: serde_json::Value = read_json(&expected_json)?;
        // A tree serializes as an object, an untouched input as a string
        let actual = match interpolate(options.strict()) {
            Ok(Interpolation::Tree(tree)) => serde_json::to_value(&tree),
            Ok(Interpolation::Original(original)) => serde_json::to_value(&original),
            Err(e) => return Err(format!("unexpected error: {}", e).into()),
        }
        .map_err(|e| e.to_string())?;
        if actual != expected {
            return Err(format!(
                "result mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                serde_json::to_string_pretty(&expected).unwrap_or_default(),
                serde_json::to_string_pretty(&actual).unwrap_or_default()
            )
            .into());
        }
        Ok(())
    } else if expected_err.exists() {
        let expected = read(&expected_err)?;

        // Lenient mode must hand back the input untouched
        let source = options.mixed_string.clone();
        match interpolate(options.clone()) {
            Ok(Interpolation::Original(original)) if original == source => {}
            other => return Err(format!("lenient mode should return the original string, got {:?}", other).into()),
        }

        let err = match interpolate(options.strict()) {
            Ok(result) => return Err(format!("expected an error, got {:?}", result).into()),
            Err(err) => err,
        };
        let actual = format!("{:?}\n{}", err.kind, err.message);
        if actual.trim() != expected.trim() {
            return Err(format!(
                "error mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                expected.trim(),
                actual.trim()
            )
            .into());
        }
        Ok(())
    } else {
        Err(format!("missing {} or {}", expected_json.display(), expected_err.display()).into())
    }
}
