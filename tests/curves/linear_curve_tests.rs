use nalgebra::DVector;
use vscurves::math::curve::coefficient::{Coefficient, Time};
use vscurves::math::curve::curveerror::{CurveError, ErrorKind};
use vscurves::math::curve::key::Key;
use vscurves::math::curve::linearinterpolation::linearinterpolationcurve::LinearInterpolationCurve;
use vscurves::math::curve::vectorspacecurve::VectorSpaceCurve;
use vscurves::math::curve::vectorspacecurvevariant::{InterpolationPolicy, VectorSpaceCurveVariant};
use vscurves::math::curve::vectorspaceevaluator::VectorSpaceEvaluator;

type CurveTestResult = Result<(), CurveError>;

const ATOL: f64 = 1e-12;

fn v2(a: f64, b: f64) -> Coefficient {
    DVector::from_vec(vec![a, b])
}

#[inline]
fn assert_vec_close(a: &Coefficient, b: &Coefficient) {
    assert_eq!(a.len(), b.len());
    for (i, (ai, bi)) in a.iter().zip(b.iter()).enumerate() {
        assert!((ai - bi).abs() <= ATOL, "mismatch at {}: left={}, right={}", i, ai, bi);
    }
}

fn tent_curve() -> Result<(LinearInterpolationCurve, Vec<Key>), CurveError> {
    let mut curve = LinearInterpolationCurve::new(2);
    let keys = curve.fit_curve(&[0.0, 1.0, 2.0], &[v2(0.0, 0.0), v2(10.0, 10.0), v2(0.0, 0.0)])?;
    Ok((curve, keys))
}

#[test]
fn tent_example() -> CurveTestResult {
    let (curve, _) = tent_curve()?;
    assert_vec_close(&curve.evaluate(0.5)?, &v2(5.0, 5.0));
    assert_vec_close(&curve.evaluate(1.5)?, &v2(5.0, 5.0));
    assert_eq!(curve.evaluate(0.0)?, v2(0.0, 0.0));

    let err = curve.evaluate(2.0).unwrap_err();
    assert!(matches!(err, CurveError::OutOfRange { .. }));
    assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    Ok(())
}

#[test]
fn exact_hits_at_sample_times() -> CurveTestResult {
    let times = [-3.0, -1.25, 0.0, 0.7, 4.0];
    let values: Vec<Coefficient> = times.iter().map(|&t| v2(t * t, -t)).collect();
    let mut curve = LinearInterpolationCurve::new(2);
    curve.fit_curve(&times, &values)?;
    for (t, value) in times[..times.len() - 1].iter().zip(&values) {
        assert_eq!(curve.evaluate(*t)?, *value);
    }
    Ok(())
}

#[test]
fn interior_points_blend_both_dimensions() -> CurveTestResult {
    let mut curve = LinearInterpolationCurve::new(2);
    curve.fit_curve(&[2.0, 5.0], &[v2(7.0, -1.0), v2(1.0, 2.0)])?;
    for &t in &[2.0, 3.0, 4.0, 4.9] {
        let alpha = (t - 2.0) / 3.0;
        let expected = v2(7.0 * (1.0 - alpha) + 1.0 * alpha, -1.0 * (1.0 - alpha) + 2.0 * alpha);
        assert_vec_close(&curve.evaluate(t)?, &expected);
    }
    Ok(())
}

#[test]
fn boundary_rejection() -> CurveTestResult {
    let (curve, _) = tent_curve()?;
    for &t in &[-1e-9, -5.0, 2.0, 2.5, f64::INFINITY] {
        let err = curve.evaluate(t).unwrap_err();
        assert!(err.is_precondition_violation(), "t = {} gave {:?}", t, err);
    }

    let empty = LinearInterpolationCurve::new(2);
    assert!(matches!(empty.evaluate(0.0), Err(CurveError::InsufficientSamples { got: 0 })));
    assert_eq!((empty.min_time(), empty.max_time()), (None, None));
    Ok(())
}

#[test]
fn locality_of_mutations() -> CurveTestResult {
    let mut curve = LinearInterpolationCurve::new(2);
    let keys = curve.fit_curve(&[0.0, 1.0, 2.0, 3.0], &[v2(0.0, 0.0), v2(1.0, 1.0), v2(2.0, 2.0), v2(3.0, 3.0)])?;
    let before = curve.evaluate(1.5)?;

    curve.set_coefficient(keys[0], v2(-100.0, 100.0))?;
    curve.set_coefficient(keys[3], v2(50.0, 50.0))?;
    assert_eq!(curve.evaluate(1.5)?, before);

    curve.set_coefficient(keys[2], v2(4.0, 4.0))?;
    assert_vec_close(&curve.evaluate(1.5)?, &v2(2.5, 2.5));
    Ok(())
}

#[test]
fn evaluator_outlives_store_mutation() -> CurveTestResult {
    let (mut curve, keys) = tent_curve()?;
    let evaluator = curve.evaluator(0.5)?;
    curve.set_coefficient(keys[1], v2(-10.0, -10.0))?;
    curve.extend(&[3.0], &[v2(1.0, 1.0)])?;

    assert_vec_close(&evaluator.evaluate(), &v2(5.0, 5.0));
    assert_vec_close(&curve.evaluate(0.5)?, &v2(-5.0, -5.0));
    Ok(())
}

#[test]
fn range_queries() -> CurveTestResult {
    let times: Vec<Time> = (0..10).map(|i| i as f64 * 0.5).collect();
    let values: Vec<Coefficient> = times.iter().map(|&t| v2(t, t)).collect();
    let mut curve = LinearInterpolationCurve::new(2);
    curve.fit_curve(&times, &values)?;

    for &(a, b) in &[(0.0, 4.5), (0.25, 2.0), (1.0, 1.0), (3.0, 100.0), (-2.0, 0.5)] {
        let got: Vec<Time> = curve.coefficients_in_range(a, b).iter().map(|s| s.time()).collect();
        let expected: Vec<Time> = times.iter().copied().filter(|&t| a <= t && t < b).collect();
        assert_eq!(got, expected, "range [{}, {})", a, b);
    }
    assert_eq!(curve.all_coefficients().len(), times.len());
    Ok(())
}

#[test]
fn bracket_lookup_through_curve() -> CurveTestResult {
    let (curve, keys) = tent_curve()?;
    let (s0, s1) = curve.coefficients_at(1.0)?;
    assert_eq!((s0.key(), s1.key()), (keys[1], keys[2]));
    Ok(())
}

#[test]
fn set_coefficient_checks_key_and_dimension() -> CurveTestResult {
    let (mut curve, keys) = tent_curve()?;
    assert!(matches!(curve.set_coefficient(keys[0], DVector::zeros(3)),
                     Err(CurveError::DimensionMismatch { expected: 2, got: 3 })));
    assert!(matches!(curve.set_coefficient(Key::new(), v2(0.0, 0.0)),
                     Err(CurveError::MissingKey(_))));
    Ok(())
}

#[test]
fn derivative_order_zero_matches_value() -> CurveTestResult {
    let (curve, _) = tent_curve()?;
    assert_eq!(curve.evaluate_derivative(0.25, 0)?, curve.evaluate(0.25)?);
    assert!(matches!(curve.evaluate_derivative(0.25, 1), Err(CurveError::Unimplemented { order: 1, .. })));
    Ok(())
}

#[test]
fn variant_delegates_to_linear_policy() -> CurveTestResult {
    let mut curve = VectorSpaceCurveVariant::new(InterpolationPolicy::Linear, 2);
    curve.extend(&[0.0, 1.0], &[v2(0.0, 0.0), v2(10.0, 10.0)])?;
    curve.extend(&[2.0], &[v2(0.0, 0.0)])?;
    assert_vec_close(&curve.evaluate(1.5)?, &v2(5.0, 5.0));
    assert_eq!(curve.max_time(), Some(2.0));
    assert!(curve.to_string().starts_with("LinearInterpolationCurve (dimension 2, 3 samples)"));
    assert_eq!("linear".parse::<InterpolationPolicy>()?, InterpolationPolicy::Linear);
    assert!(matches!("spline".parse::<InterpolationPolicy>(), Err(CurveError::UnknownPolicy(_))));
    Ok(())
}
