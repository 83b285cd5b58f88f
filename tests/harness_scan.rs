//! End-to-end scans over inline source fixtures.

use std::fs;
use std::path::Path;

use kani_harness_parser::parser::UnwindBound;
use kani_harness_parser::{
    check_text_for_proofs, scan_path, scan_source, HarnessAction, HarnessTarget,
    ModulePathStrategy, Position, ScanOptions, VerifierCommand, VerifierConfig,
};
use rstest::{fixture, rstest};

const KANI_PROOFS: &str = r#"
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(0)]
fn function_abc() {
    assert!(1 == 2);
}

#[cfg(kani)]
#[kani::proof]
#[kani::solver(kissat)]
pub fn function_xyz() {
    assert!(1 == 2);
}
"#;

const TEST_MODULE: &str = r#"
#[cfg(test)]
mod test {
    #[test]
    #[cfg_attr(kani, kani::proof, kani::unwind(4))]
    fn insert_test() {
        assert!(1 == 1);
    }
}
"#;

const NESTED: &str = r#"
mod outer {
    mod inner {
        #[kani::proof]
        #[kani::stub(rand::random, mock_random)]
        fn deep() {
        }
    }
}

#[kani::proof]
fn top_level() {
}
"#;

const BUNDLED: &str =
    "#[cfg_attr(kani, test, kani::proof, kani::unwind(7))]\nfn bundled() {\n}\n";

const REPEATED_MODULE: &str =
    "mod foo {\n#[kani::proof]\nfn h() {\n}\n}\nmod foo {\n#[kani::proof]\nfn h() {\n}\n}\n";

#[fixture]
fn options() -> ScanOptions {
    ScanOptions::default()
}

#[rstest]
fn given_stacked_attributes_when_scanned_then_first_harness_matches(options: ScanOptions) {
    let scan = scan_source(KANI_PROOFS, options);
    assert!(scan.desyncs.is_empty());
    assert_eq!(scan.harnesses.len(), 2);

    let abc = &scan.harnesses[0];
    assert_eq!(abc.name, "function_abc");
    assert_eq!(abc.full_line, "fn function_abc() {");
    assert_eq!(abc.end_position, Position { row: 4, column: 15 });
    assert_eq!(abc.attributes, vec!["#[kani::unwind(0)]"]);
    assert_eq!(abc.args.unwind, Some(UnwindBound::Bounded(0)));
    assert_eq!(abc.args.solver, None);
    assert!(abc.flags.is_proof);
    assert!(!abc.flags.is_test_style);
    assert!(!abc.flags.has_stub);
    assert_eq!(abc.module, None);

    assert_eq!(scan.harnesses[1].args.solver.as_deref(), Some("kissat"));
}

#[rstest]
#[case::stacked(KANI_PROOFS)]
#[case::test_module(TEST_MODULE)]
#[case::nested(NESTED)]
fn given_any_source_when_scanned_twice_then_results_are_identical(
    #[case] source: &str,
    options: ScanOptions,
) {
    assert_eq!(scan_source(source, options), scan_source(source, options));
}

#[rstest]
#[case::stacked(KANI_PROOFS)]
#[case::test_module(TEST_MODULE)]
#[case::nested(NESTED)]
fn given_any_source_when_scanned_then_harnesses_are_sorted_and_valid(
    #[case] source: &str,
    options: ScanOptions,
) {
    let scan = scan_source(source, options);
    let rows: Vec<usize> = scan.harnesses.iter().map(|h| h.end_position.row).collect();
    let mut sorted = rows.clone();
    sorted.sort();
    assert_eq!(rows, sorted);

    let lines: Vec<&str> = source.lines().collect();
    for harness in &scan.harnesses {
        assert_eq!(lines[harness.end_position.row].trim(), harness.full_line);
    }
}

#[rstest]
fn given_composite_attribute_when_scanned_then_harness_is_test_style(options: ScanOptions) {
    let scan = scan_source(TEST_MODULE, options);
    assert_eq!(scan.harnesses.len(), 1);

    let harness = &scan.harnesses[0];
    assert_eq!(harness.name, "insert_test");
    assert!(harness.flags.is_test_style);
    assert_eq!(harness.args.unwind, Some(UnwindBound::Bounded(4)));
    assert_eq!(harness.module.as_deref(), Some("test"));
    assert_eq!(
        harness.attributes,
        vec!["#[cfg_attr(kani, kani::proof, kani::unwind(4))]"]
    );
}

#[rstest]
fn given_composite_with_test_directive_when_scanned_then_harness_is_test_style(
    options: ScanOptions,
) {
    let scan = scan_source(BUNDLED, options);
    assert!(scan.desyncs.is_empty());
    assert_eq!(scan.harnesses.len(), 1);

    let harness = &scan.harnesses[0];
    assert_eq!(harness.name, "bundled");
    assert_eq!(harness.full_line, "fn bundled() {");
    assert!(harness.flags.is_proof);
    assert!(harness.flags.is_test_style);
    assert_eq!(harness.args.unwind, Some(UnwindBound::Bounded(7)));
}

#[rstest]
#[case::bare_ident("#[kani::solver(kissat)]", "kissat")]
#[case::string_literal("#[kani::solver(\"minisat\")]", "minisat")]
#[case::bin_path("#[kani::solver(bin = \"kissat\")]", "kissat")]
fn given_solver_attribute_when_scanned_then_solver_is_extracted(
    #[case] attribute: &str,
    #[case] expected: &str,
    options: ScanOptions,
) {
    let source = format!("#[kani::proof]\n{}\nfn check() {{\n}}\n", attribute);
    let scan = scan_source(&source, options);
    assert_eq!(scan.harnesses.len(), 1);
    assert_eq!(scan.harnesses[0].args.solver.as_deref(), Some(expected));
}

#[rstest]
fn given_repeated_module_name_when_scanned_then_blocks_are_joined(options: ScanOptions) {
    let scan = scan_source(REPEATED_MODULE, options);
    assert!(scan.desyncs.is_empty());
    assert_eq!(scan.harnesses.len(), 2);
    for harness in &scan.harnesses {
        assert_eq!(harness.name, "h");
        assert_eq!(harness.module.as_deref(), Some("foo::foo"));
    }
}

#[rstest]
#[case::reverse_index(ModulePathStrategy::ReverseIndex)]
#[case::ancestor_chain(ModulePathStrategy::AncestorChain)]
fn given_nested_modules_when_scanned_then_module_path_is_outer_to_inner(
    #[case] module_paths: ModulePathStrategy,
) {
    let scan = scan_source(NESTED, ScanOptions { module_paths });
    assert_eq!(scan.harnesses.len(), 2);
    assert_eq!(scan.harnesses[0].module.as_deref(), Some("outer::inner"));
    assert!(scan.harnesses[0].flags.has_stub);
    assert_eq!(scan.harnesses[1].module, None);
}

#[rstest]
fn given_edited_text_when_revalidated_then_desync_is_reported(options: ScanOptions) {
    let scan = scan_source(KANI_PROOFS, options);
    let edited = KANI_PROOFS.replace("fn function_abc() {", "fn function_renamed() {");

    let harness = &scan.harnesses[0];
    let err = kani_harness_parser::parser::validate_harness(harness, &edited).unwrap_err();
    assert_eq!(err.harness, "function_abc");
    assert_eq!(err.row, 4);
    assert_eq!(err.found, "fn function_renamed() {");
    assert!(err.to_string().contains("line 5"));
}

#[rstest]
#[case::proofs(KANI_PROOFS, true)]
#[case::composite(TEST_MODULE, true)]
#[case::plain("fn main() {}\n", false)]
#[case::comment_only("// #[kani::proof]\nfn main() {}\n", false)]
#[case::empty("", false)]
fn given_text_when_checked_for_proofs_then_marker_presence_is_reported(
    #[case] source: &str,
    #[case] expected: bool,
) {
    assert_eq!(check_text_for_proofs(source), expected);
}

#[rstest]
fn given_unparseable_source_when_scanned_then_no_harnesses(options: ScanOptions) {
    let scan = scan_source("#[kani::proof]\n}}}} fn (", options);
    assert!(scan.harnesses.is_empty());
}

#[rstest]
fn given_file_on_disk_when_scanned_then_commands_use_qualified_name(options: ScanOptions) {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("buffer.rs");
    fs::write(&file, NESTED).unwrap();

    let scan = scan_path(&file, options).unwrap();
    assert_eq!(scan.path.as_deref(), Some(file.as_path()));

    let deep = &scan.harnesses[0];
    let target = HarnessTarget::new(deep, &file);
    assert_eq!(target.attempts(), vec!["buffer::outer::inner::deep", "deep"]);

    let config = VerifierConfig {
        package: Some("buffers".to_string()),
        ..Default::default()
    };
    let commands = VerifierCommand::for_harness(&config, deep, &file, HarnessAction::Verify);
    assert_eq!(
        commands[0].to_string(),
        "cargo-kani -p buffers --harness buffer::outer::inner::deep -Z stubbing"
    );
    assert_eq!(
        commands[1].to_string(),
        "cargo-kani -p buffers --harness deep -Z stubbing"
    );
}

#[rstest]
fn given_test_style_harness_when_played_back_then_commands_request_inplace_tests(
    options: ScanOptions,
) {
    let scan = scan_source(TEST_MODULE, options);
    let harness = &scan.harnesses[0];
    let config = VerifierConfig {
        package: Some("maps".to_string()),
        ..Default::default()
    };

    let commands = VerifierCommand::for_harness(
        &config,
        harness,
        Path::new("src/map.rs"),
        HarnessAction::ConcretePlayback,
    );
    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0].to_string(),
        "cargo-kani --tests --harness map::test::insert_test -p maps -Z concrete-playback \
         --concrete-playback=inplace"
    );
    assert_eq!(commands[1].args[2], "insert_test");

    let run = VerifierCommand::playback_test(&config, "kani_concrete_playback_insert_test_1");
    assert_eq!(
        run.to_string(),
        "cargo-kani playback --package maps -Z concrete-playback -- \
         kani_concrete_playback_insert_test_1 --nocapture"
    );
}

#[rstest]
fn given_missing_file_when_scanned_then_read_error(options: ScanOptions) {
    let err = scan_path(Path::new("/definitely/not/here.rs"), options).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}
