use std::collections::HashMap;

use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};
use vscurves::math::curve::coefficient::{Coefficient, Jacobian};
use vscurves::math::curve::curveerror::CurveError;
use vscurves::math::curve::key::Key;
use vscurves::math::curve::vectorspacecurve::VectorSpaceCurve;
use vscurves::math::curve::vectorspacecurvevariant::{InterpolationPolicy, VectorSpaceCurveVariant};
use vscurves::math::curve::vectorspaceevaluator::VectorSpaceEvaluator;

type CurveTestResult = Result<(), CurveError>;

fn sampled_curve() -> Result<(VectorSpaceCurveVariant, Vec<Key>), CurveError> {
    let mut curve = VectorSpaceCurveVariant::new(InterpolationPolicy::Linear, 3);
    let times: [f64; 5] = [0.0, 0.4, 1.0, 2.5, 3.0];
    let values: Vec<Coefficient> = times
        .iter()
        .map(|&t| DVector::from_vec(vec![t.sin(), t.cos(), t * t]))
        .collect();
    let keys = curve.fit_curve(&times, &values)?;
    Ok((curve, keys))
}

fn store_values(curve: &VectorSpaceCurveVariant) -> HashMap<Key, Coefficient> {
    curve
        .all_coefficients()
        .iter()
        .map(|s| (s.key(), s.coefficient().clone()))
        .collect()
}

#[test]
fn partition_of_unity_over_the_domain() -> CurveTestResult {
    let (curve, _) = sampled_curve()?;
    let mut t: f64 = 0.0;
    while t < 3.0 {
        let (_, jacobians) = curve.evaluator(t)?.evaluate_and_jacobians();
        assert_relative_eq!(&jacobians[0] + &jacobians[1], DMatrix::<f64>::identity(3, 3), epsilon = 1e-12);
        t += 0.05;
    }
    Ok(())
}

#[test]
fn keyed_evaluation_with_store_values_is_consistent() -> CurveTestResult {
    let (curve, _) = sampled_curve()?;
    let values = store_values(&curve);
    for &t in &[0.0, 0.1, 0.4, 0.99, 2.0, 2.999] {
        let evaluator = curve.evaluator(t)?;
        assert_relative_eq!(evaluator.evaluate_keyed(&values)?, curve.evaluate(t)?, epsilon = 1e-12);
        assert_relative_eq!(evaluator.evaluate_with(evaluator.coefficients())?, evaluator.evaluate(), epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn trial_values_do_not_touch_the_store() -> CurveTestResult {
    let (curve, _) = sampled_curve()?;
    let evaluator = curve.evaluator(1.75)?;
    let mut trial = store_values(&curve);
    for key in evaluator.keys() {
        trial.insert(*key, DVector::from_vec(vec![1.0, 1.0, 1.0]));
    }
    assert_relative_eq!(evaluator.evaluate_keyed(&trial)?, DVector::from_vec(vec![1.0, 1.0, 1.0]), epsilon = 1e-12);
    assert_relative_eq!(curve.evaluate(1.75)?, evaluator.evaluate(), epsilon = 1e-12);
    Ok(())
}

#[test]
fn chain_rule_accumulates_over_several_queries() -> CurveTestResult {
    let (curve, keys) = sampled_curve()?;
    let values = store_values(&curve);
    let mut accumulator: HashMap<Key, Jacobian> = keys.iter().map(|k| (*k, DMatrix::<f64>::zeros(3, 3))).collect();

    // 0.2 -> bracket (0.0, 0.4), alpha 0.5;  0.7 -> bracket (0.4, 1.0), alpha 0.5
    curve.evaluator(0.2)?.evaluate_and_accumulate(&values, &mut accumulator, 2.0)?;
    curve.evaluator(0.7)?.evaluate_and_accumulate(&values, &mut accumulator, 3.0)?;

    let eye = DMatrix::<f64>::identity(3, 3);
    assert_relative_eq!(accumulator[&keys[0]], &eye * 1.0, epsilon = 1e-12);
    assert_relative_eq!(accumulator[&keys[1]], &eye * 2.5, epsilon = 1e-12);
    assert_relative_eq!(accumulator[&keys[2]], &eye * 1.5, epsilon = 1e-12);
    assert_eq!(accumulator[&keys[3]], DMatrix::<f64>::zeros(3, 3));
    Ok(())
}

#[test]
fn missing_keys_are_reported() -> CurveTestResult {
    let (curve, keys) = sampled_curve()?;
    let evaluator = curve.evaluator(2.6)?;
    let values = store_values(&curve);

    let mut accumulator: HashMap<Key, Jacobian> = HashMap::new();
    accumulator.insert(keys[3], DMatrix::<f64>::zeros(3, 3));
    let err = evaluator.evaluate_and_accumulate(&values, &mut accumulator, 1.0).unwrap_err();
    assert!(matches!(err, CurveError::MissingKey(k) if k == keys[4]));
    assert!(err.is_precondition_violation());

    let mut partial = values.clone();
    partial.remove(&keys[3]);
    assert!(matches!(evaluator.evaluate_keyed(&partial), Err(CurveError::MissingKey(k)) if k == keys[3]));
    Ok(())
}

#[test]
fn active_keys_assemble_a_sparse_row() -> CurveTestResult {
    let (curve, keys) = sampled_curve()?;
    let mut active_keys = Vec::new();
    let mut active_values = Vec::new();
    for &t in &[0.1, 2.7] {
        let evaluator = curve.evaluator(t)?;
        evaluator.append_keys(&mut active_keys);
        evaluator.append_coefficients(&mut active_values);
    }
    assert_eq!(active_keys, vec![keys[0], keys[1], keys[3], keys[4]]);
    assert_eq!(active_values.len(), 4);

    let evaluator = curve.evaluator(2.7)?;
    assert_eq!(evaluator.keys(), &[keys[3], keys[4]]);
    assert_eq!(evaluator.dimension(), 3);
    Ok(())
}
