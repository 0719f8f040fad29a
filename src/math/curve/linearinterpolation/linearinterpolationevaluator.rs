use std::collections::HashMap;

use nalgebra::DMatrix;

use crate::math::curve::coefficient::{
    Coefficient,
    Jacobian,
    Sample,
    Time
};
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::jacobianaccumulator::JacobianAccumulator;
use crate::math::curve::key::Key;
use crate::math::curve::vectorspaceevaluator::VectorSpaceEvaluator;

// ─────────────────────────────────────────────────────────────────────────────
// LinearInterpolationEvaluator
// ─────────────────────────────────────────────────────────────────────────────
//
// 對 bracket (t0, c0) - (t1, c1)，t0 <= t < t1：
//
//   alpha = (t - t0) / (t1 - t0)
//   f(t)  = (1 - alpha)·c0 + alpha·c1
//
// Jacobian 與係數值無關：
//   J0 = (1 - alpha)·I,  J1 = alpha·I,  J0 + J1 = I

#[derive(Clone, Debug)]
pub struct LinearInterpolationEvaluator {
    time: Time,
    keys: [Key; 2],
    coefficients: [Coefficient; 2],
    jacobians: [Jacobian; 2],
    alpha: f64,
    one_minus_alpha: f64,
    dimension: usize,
}

impl LinearInterpolationEvaluator {
    /// 由 bracket 的兩個 sample 建構；`t1 - t0` 必須為正，且兩個係數長度都必須等於曲線維度。
    pub(crate) fn from_bracket(sample0: &Sample,
                               sample1: &Sample,
                               time: Time,
                               dimension: usize) -> CurveResult<LinearInterpolationEvaluator> {
        let t0 = sample0.time();
        let t1 = sample1.time();
        let dt = t1 - t0;
        if !(dt > 0.0) {
            return Err(CurveError::DegenerateBracket { time, t0, t1 });
        }

        for sample in [sample0, sample1] {
            if sample.coefficient().len() != dimension {
                return Err(CurveError::DimensionMismatch { expected: dimension, got: sample.coefficient().len() });
            }
        }

        let alpha = (time - t0) / dt;
        let one_minus_alpha = 1.0 - alpha;

        let identity = DMatrix::<f64>::identity(dimension, dimension);
        let jacobians = [&identity * one_minus_alpha, &identity * alpha];

        Ok(LinearInterpolationEvaluator {
            time,
            keys: [sample0.key(), sample1.key()],
            coefficients: [sample0.coefficient().clone(), sample1.coefficient().clone()],
            jacobians,
            alpha,
            one_minus_alpha,
            dimension,
        })
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn jacobians(&self) -> &[Jacobian] {
        &self.jacobians
    }

    fn blend(&self, c0: &Coefficient, c1: &Coefficient) -> Coefficient {
        c0 * self.one_minus_alpha + c1 * self.alpha
    }

    fn check_dimension(&self, value: &Coefficient) -> CurveResult<()> {
        if value.len() != self.dimension {
            return Err(CurveError::DimensionMismatch { expected: self.dimension, got: value.len() });
        }
        Ok(())
    }

    fn check_coefficients(&self, coefficients: &[Coefficient]) -> CurveResult<()> {
        if coefficients.len() != self.keys.len() {
            return Err(CurveError::LengthMismatch { expected: self.keys.len(), got: coefficients.len() });
        }
        coefficients.iter().try_for_each(|c| self.check_dimension(c))
    }

    fn lookup<'a>(&self, coefficients: &'a HashMap<Key, Coefficient>, key: &Key) -> CurveResult<&'a Coefficient> {
        let value = coefficients.get(key).ok_or(CurveError::MissingKey(*key))?;
        self.check_dimension(value)?;
        Ok(value)
    }

    fn unimplemented(operation: &'static str, order: u32) -> CurveError {
        CurveError::Unimplemented { operation, order }
    }
}

impl VectorSpaceEvaluator for LinearInterpolationEvaluator {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    fn evaluate(&self) -> Coefficient {
        self.blend(&self.coefficients[0], &self.coefficients[1])
    }

    fn evaluate_with(&self, coefficients: &[Coefficient]) -> CurveResult<Coefficient> {
        self.check_coefficients(coefficients)?;
        Ok(self.blend(&coefficients[0], &coefficients[1]))
    }

    fn evaluate_keyed(&self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<Coefficient> {
        let c0 = self.lookup(coefficients, &self.keys[0])?;
        let c1 = self.lookup(coefficients, &self.keys[1])?;
        Ok(self.blend(c0, c1))
    }

    fn evaluate_and_jacobians(&self) -> (Coefficient, Vec<Jacobian>) {
        (self.evaluate(), self.jacobians.to_vec())
    }

    fn evaluate_and_jacobians_with(&self,
                                   coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)> {
        let value = self.evaluate_with(coefficients)?;
        Ok((value, self.jacobians.to_vec()))
    }

    fn evaluate_and_accumulate(&self,
                               coefficients: &HashMap<Key, Coefficient>,
                               accumulator: &mut dyn JacobianAccumulator,
                               chain_rule: f64) -> CurveResult<Coefficient> {
        // 兩個 block 都先檢查過，才開始累加
        for (key, jacobian) in self.keys.iter().zip(self.jacobians.iter()) {
            accumulator.check_block(key, jacobian.nrows(), jacobian.ncols())?;
        }
        let value = self.evaluate_keyed(coefficients)?;
        for (key, jacobian) in self.keys.iter().zip(self.jacobians.iter()) {
            accumulator.accumulate(key, jacobian, chain_rule)?;
        }
        Ok(value)
    }

    fn evaluate_derivative(&self, order: u32) -> CurveResult<Coefficient> {
        match order {
            0 => Ok(self.evaluate()),
            _ => Err(Self::unimplemented("evaluate_derivative", order))
        }
    }

    fn evaluate_derivative_with(&self,
                                order: u32,
                                coefficients: &[Coefficient]) -> CurveResult<Coefficient> {
        match order {
            0 => self.evaluate_with(coefficients),
            _ => Err(Self::unimplemented("evaluate_derivative_with", order))
        }
    }

    fn evaluate_vector_and_jacobian(&self,
                                    _coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)> {
        Err(Self::unimplemented("evaluate_vector_and_jacobian", 0))
    }

    fn evaluate_derivative_and_jacobian(&self,
                                        order: u32,
                                        coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)> {
        match order {
            0 => self.evaluate_and_jacobians_with(coefficients),
            _ => Err(Self::unimplemented("evaluate_derivative_and_jacobian", order))
        }
    }
}
