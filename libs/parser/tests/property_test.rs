//! Property-based tests using QuickCheck

use newton_parser::{Engine, Scope};
use quickcheck::{QuickCheck, TestResult};

const SYMBOLS: &[&str] = &["m", "kg", "s", "A", "K", "mol"];

fn product(indices: &[u8]) -> String {
    indices
        .iter()
        .map(|i| SYMBOLS[*i as usize % SYMBOLS.len()])
        .collect::<Vec<_>>()
        .join(" * ")
}

/// Property: reordering the factors of a product never changes its dimensions
#[test]
fn prop_product_order_is_irrelevant() {
    fn prop(indices: Vec<u8>) -> TestResult {
        if indices.is_empty() || indices.len() > 12 {
            return TestResult::discard();
        }
        let mut reversed = indices.clone();
        reversed.reverse();

        let engine = Engine::new(Scope::si());
        let forward = engine.compile_quantity(&product(&indices)).unwrap();
        let backward = engine.compile_quantity(&product(&reversed)).unwrap();
        let forward = forward.physics().unwrap();
        let backward = backward.physics().unwrap();

        TestResult::from_bool(
            forward.dimensionally_equal(backward)
                && forward.number_of_numerators() == indices.len(),
        )
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<u8>) -> TestResult);
}

/// Property: a numeric sum folds to the arithmetic sum of its terms
#[test]
fn prop_numeric_sum_folds() {
    fn prop(values: Vec<i16>) -> TestResult {
        if values.is_empty() || values.len() > 20 {
            return TestResult::discard();
        }
        let source = values
            .iter()
            .map(|v| format!("({})", v))
            .collect::<Vec<_>>()
            .join(" + ");

        let engine = Engine::default();
        let ast = match engine.compile_numeric(&source) {
            Ok(ast) => ast,
            Err(e) => return TestResult::error(e.to_string()),
        };
        let expected: f64 = values.iter().map(|v| f64::from(*v)).sum();
        TestResult::from_bool(ast.value == expected)
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<i16>) -> TestResult);
}

/// Property: a quantity never equals itself times one more dimension
#[test]
fn prop_extra_factor_changes_dimensions() {
    fn prop(indices: Vec<u8>, extra: u8) -> TestResult {
        if indices.is_empty() || indices.len() > 12 {
            return TestResult::discard();
        }
        let engine = Engine::default();
        let base = product(&indices);
        let extended = format!("{} * {}", base, SYMBOLS[extra as usize % SYMBOLS.len()]);

        let base = engine.compile_quantity(&base).unwrap();
        let extended = engine.compile_quantity(&extended).unwrap();
        TestResult::from_bool(
            !base
                .physics()
                .unwrap()
                .dimensionally_equal(extended.physics().unwrap()),
        )
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<u8>, u8) -> TestResult);
}
