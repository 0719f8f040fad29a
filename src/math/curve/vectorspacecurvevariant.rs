use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize
};

use crate::math::curve::coefficient::{
    Coefficient,
    Jacobian,
    Time
};
use crate::math::curve::coefficientstore::OrderedCoefficientStore;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::jacobianaccumulator::JacobianAccumulator;
use crate::math::curve::key::Key;
use crate::math::curve::linearinterpolation::linearinterpolationcurve::LinearInterpolationCurve;
use crate::math::curve::linearinterpolation::linearinterpolationevaluator::LinearInterpolationEvaluator;
use crate::math::curve::vectorspacecurve::VectorSpaceCurve;
use crate::math::curve::vectorspaceevaluator::VectorSpaceEvaluator;

/// 已知的插值策略；JSON 中以名稱字串表示，解析經過 `FromStr`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InterpolationPolicy {
    Linear
}

impl InterpolationPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationPolicy::Linear => "linear"
        }
    }
}

impl FromStr for InterpolationPolicy {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(InterpolationPolicy::Linear),
            _ => Err(CurveError::UnknownPolicy(s.to_owned()))
        }
    }
}

impl TryFrom<String> for InterpolationPolicy {
    type Error = CurveError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<InterpolationPolicy> for String {
    fn from(policy: InterpolationPolicy) -> String {
        policy.name().to_owned()
    }
}

// ── 曲線 ─────────────────────────────────────────────────────────────────────
//
// 插值策略的集合在設計時就固定，因此用 enum 封閉，而不是 trait object。

#[derive(Clone, Debug)]
pub enum VectorSpaceCurveVariant {
    LinearInterpolation(LinearInterpolationCurve)
}

impl VectorSpaceCurveVariant {
    pub fn new(policy: InterpolationPolicy, dimension: usize) -> VectorSpaceCurveVariant {
        match policy {
            InterpolationPolicy::Linear => {
                VectorSpaceCurveVariant::LinearInterpolation(LinearInterpolationCurve::new(dimension))
            }
        }
    }

    pub fn policy(&self) -> InterpolationPolicy {
        match self {
            VectorSpaceCurveVariant::LinearInterpolation(_) => InterpolationPolicy::Linear
        }
    }
}

impl VectorSpaceCurve for VectorSpaceCurveVariant {
    type Store = OrderedCoefficientStore;
    type Evaluator = CurveEvaluator;

    fn dimension(&self) -> usize {
        match self {
            VectorSpaceCurveVariant::LinearInterpolation(curve) => curve.dimension()
        }
    }

    fn store(&self) -> &OrderedCoefficientStore {
        match self {
            VectorSpaceCurveVariant::LinearInterpolation(curve) => curve.store()
        }
    }

    fn store_mut(&mut self) -> &mut OrderedCoefficientStore {
        match self {
            VectorSpaceCurveVariant::LinearInterpolation(curve) => curve.store_mut()
        }
    }

    fn extend(&mut self, times: &[Time], values: &[Coefficient]) -> CurveResult<Vec<Key>> {
        match self {
            VectorSpaceCurveVariant::LinearInterpolation(curve) => curve.extend(times, values)
        }
    }

    fn fit_curve(&mut self, times: &[Time], values: &[Coefficient]) -> CurveResult<Vec<Key>> {
        match self {
            VectorSpaceCurveVariant::LinearInterpolation(curve) => curve.fit_curve(times, values)
        }
    }

    fn evaluator(&self, time: Time) -> CurveResult<CurveEvaluator> {
        match self {
            VectorSpaceCurveVariant::LinearInterpolation(curve) => {
                curve.evaluator(time).map(CurveEvaluator::LinearInterpolation)
            }
        }
    }
}

impl fmt::Display for VectorSpaceCurveVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorSpaceCurveVariant::LinearInterpolation(curve) => write!(f, "{}", curve)
        }
    }
}

// ── Evaluator ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub enum CurveEvaluator {
    LinearInterpolation(LinearInterpolationEvaluator)
}

impl CurveEvaluator {
    fn inner(&self) -> &dyn VectorSpaceEvaluator {
        match self {
            CurveEvaluator::LinearInterpolation(evaluator) => evaluator
        }
    }
}

impl VectorSpaceEvaluator for CurveEvaluator {
    fn dimension(&self) -> usize                 { self.inner().dimension() }
    fn keys(&self) -> &[Key]                     { self.inner().keys() }
    fn coefficients(&self) -> &[Coefficient]     { self.inner().coefficients() }
    fn evaluate(&self) -> Coefficient            { self.inner().evaluate() }

    fn evaluate_with(&self, coefficients: &[Coefficient]) -> CurveResult<Coefficient> {
        self.inner().evaluate_with(coefficients)
    }

    fn evaluate_keyed(&self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<Coefficient> {
        self.inner().evaluate_keyed(coefficients)
    }

    fn evaluate_and_jacobians(&self) -> (Coefficient, Vec<Jacobian>) {
        self.inner().evaluate_and_jacobians()
    }

    fn evaluate_and_jacobians_with(&self,
                                   coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)> {
        self.inner().evaluate_and_jacobians_with(coefficients)
    }

    fn evaluate_and_accumulate(&self,
                               coefficients: &HashMap<Key, Coefficient>,
                               accumulator: &mut dyn JacobianAccumulator,
                               chain_rule: f64) -> CurveResult<Coefficient> {
        self.inner().evaluate_and_accumulate(coefficients, accumulator, chain_rule)
    }

    fn evaluate_derivative(&self, order: u32) -> CurveResult<Coefficient> {
        self.inner().evaluate_derivative(order)
    }

    fn evaluate_derivative_with(&self,
                                order: u32,
                                coefficients: &[Coefficient]) -> CurveResult<Coefficient> {
        self.inner().evaluate_derivative_with(order, coefficients)
    }

    fn evaluate_vector_and_jacobian(&self,
                                    coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)> {
        self.inner().evaluate_vector_and_jacobian(coefficients)
    }

    fn evaluate_derivative_and_jacobian(&self,
                                        order: u32,
                                        coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)> {
        self.inner().evaluate_derivative_and_jacobian(order, coefficients)
    }
}
