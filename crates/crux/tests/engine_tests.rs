//! End-to-end tests through the engine facade.
//!
//! Covers:
//! - one-call interpretation with static and dynamic metadata
//! - seeded reproducibility
//! - canonical rendering of evaluated sections
//! - error conversion from both pipeline stages
//! - the static-analysis entry points
//! - JSON serialization of results and errors

use crux::{CruxError, EvalError, InterpResult};

fn run(source: &str) -> InterpResult {
    crux::interp_seeded(source, "engine-tests")
        .unwrap_or_else(|err| panic!("interp failure in {source:?}: {err}"))
}

fn rendered(source: &str) -> String {
    let result = run(source);
    assert_eq!(
        result.sections.len(),
        1,
        "expected a single section in {source:?}"
    );
    result.sections[0].to_string()
}

// ── Interpretation ──────────────────────────────────────────────────────

#[test]
fn test_transpose_through_facade() {
    assert_eq!(rendered("[0, 1] * [2]"), "[2, 3]");
}

#[test]
fn test_expand_through_facade() {
    assert_eq!(rendered("[1, 2] ^ [2]"), "[2, 4]");
}

#[test]
fn test_cog_transpose_through_facade() {
    assert_eq!(rendered("[0, 1, 2] . [10, 20]"), "[10, 21, 12]");
}

#[test]
fn test_cog_rotation_through_facade() {
    assert_eq!(rendered("[0, 1, 2, 3] .~ [1]"), "[1, 2, 3, 0]");
}

#[test]
fn test_multi_section_program() {
    let result = run("[0, 1]\n!\n[2]");
    assert_eq!(result.sections.len(), 2);
    assert_eq!(result.sections[0].to_string(), "[0, 1]");
    assert_eq!(result.sections[1].to_string(), "[2]");
}

#[test]
fn test_empty_program_yields_one_empty_section() {
    let result = run("");
    assert_eq!(result.sections.len(), 1);
    assert_eq!(result.sections[0].to_string(), "[]");
    assert_eq!(result.pip_count, 0);
    assert_eq!(result.pip_depth, 0);
    assert_eq!(result.duration, 0.0);
}

#[test]
fn test_canonical_rendering_round_trips() {
    let source = "[0:rest0, 1:0.5, 2, -3]";
    assert_eq!(rendered(source), source);
}

// ── Metadata ────────────────────────────────────────────────────────────

#[test]
fn test_static_metadata_reflects_source_not_result() {
    // The source holds six pips across three leaves; evaluation fans
    // them out to eight.
    let source = "([0, 1] * [2, 3]) ^ [4, 5]";
    let result = run(source);
    assert_eq!(result.pip_count, 6);
    assert_eq!(result.pip_depth, 2);
    assert_eq!(result.sections[0].len(), 8);
    assert_eq!(
        result.sections[0].to_string(),
        "[8, 12, 12, 16, 10, 15, 15, 20]"
    );
    // Dynamic duration tracks the evaluated mot; the static estimate
    // stays at the deepest leaf's literal duration.
    assert_eq!(result.duration, 8.0);
    let info = crux::program_info(source).unwrap();
    assert_eq!(info.pip_count, 6);
    assert_eq!(info.pip_depth, 2);
    assert_eq!(info.duration, 2.0);
}

#[test]
fn test_duration_is_max_over_sections() {
    let result = run("[0:2]\n!\n[0]");
    assert_eq!(result.sections.len(), 2);
    assert_eq!(result.duration, 2.0);
}

// ── Reproducibility ─────────────────────────────────────────────────────

#[test]
fn test_seeded_interp_replays_exactly() {
    let source = "[{0..9}, {3, 5, 7}] * [0, 12]";
    let a = crux::interp_seeded(source, "replay").unwrap();
    let b = crux::interp_seeded(source, "replay").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_seeded_interp_is_deterministic_across_runs() {
    let source = "[{0..9}, {0..9}$ab] * [0, 12]";
    let first = run(source);
    for i in 0..100 {
        assert_eq!(run(source), first, "determinism failure at iteration {i}");
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

#[test]
fn test_parse_reports_rightmost_failure() {
    let err = crux::parse("[0").unwrap_err();
    assert_eq!(err.position, 2);
}

#[test]
fn test_interp_wraps_syntax_errors() {
    match crux::interp("[0") {
        Err(CruxError::Syntax(err)) => assert_eq!(err.position, 2),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_interp_wraps_eval_errors() {
    match crux::interp("nope") {
        Err(CruxError::Eval(EvalError::UndeclaredIdentifier(name))) => {
            assert_eq!(name, "nope");
        }
        other => panic!("expected an undeclared identifier, got {other:?}"),
    }
}

// ── Analysis Entry Points ───────────────────────────────────────────────

#[test]
fn test_leaf_depths_pair_each_leaf_with_its_depth() {
    let leaves = crux::mot_depths_from_root("[0]*[1], [2]").unwrap();
    let pairs: Vec<(usize, usize, u32)> = leaves
        .iter()
        .map(|l| (l.span.start, l.span.end, l.depth))
        .collect();
    assert_eq!(pairs, vec![(0, 3, 1), (4, 7, 1), (9, 12, 0)]);
    assert_eq!(crux::height_from_leaves("[0]*[1], [2]").unwrap(), 1);
}

#[test]
fn test_binding_only_final_section_is_the_analyzed_expression() {
    // The first section's expression only matters to evaluation; the
    // static walk reads the final section.
    let source = "[0]*[1]\n!\na := [2]";
    let leaves = crux::mot_depths_from_root(source).unwrap();
    let depths: Vec<u32> = leaves.iter().map(|l| l.depth).collect();
    assert_eq!(depths, vec![0]);

    let info = crux::program_info(source).unwrap();
    assert_eq!(info.pip_count, 1);
    assert_eq!(info.pip_depth, 0);
}

#[test]
fn test_numeric_indices_from_source() {
    let source = "[0]*[1], [2]";
    assert_eq!(
        crux::numeric_value_indices_at_depth(source, 1).unwrap(),
        vec![vec![1], vec![5]]
    );
    assert_eq!(
        crux::numeric_value_indices_at_depth_or_above(source, 0).unwrap(),
        vec![vec![1], vec![5], vec![10]]
    );
}

// ── Serialization ───────────────────────────────────────────────────────

#[test]
fn test_interp_result_json_round_trip() {
    let result = run("[0, 1] * [12]");
    let json = serde_json::to_string(&result).unwrap();
    let back: InterpResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, back);
}

#[test]
fn test_syntax_error_json_carries_position() {
    let err = crux::parse("[0").unwrap_err();
    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"position\":2"), "unexpected JSON: {json}");
}
