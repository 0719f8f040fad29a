use std::collections::HashMap;

use crate::math::curve::coefficient::{
    Coefficient,
    Jacobian
};
use crate::math::curve::curveerror::CurveResult;
use crate::math::curve::jacobianaccumulator::JacobianAccumulator;
use crate::math::curve::key::Key;

/// 單次查詢用的 evaluator：綁定 active coefficients、插值權重與 Jacobian blocks。
///
/// 建構後不可變，持有係數的複本，因此 store 之後被修改也不影響既有 evaluator。
/// `keys()`、`coefficients()` 與 `evaluate_and_jacobians()` 回傳的 Jacobian 順序一致。
pub trait VectorSpaceEvaluator {
    fn dimension(&self) -> usize;

    fn keys(&self) -> &[Key];

    fn append_keys(&self, out_keys: &mut Vec<Key>) {
        out_keys.extend_from_slice(self.keys());
    }

    fn coefficients(&self) -> &[Coefficient];

    fn append_coefficients(&self, out_coefficients: &mut Vec<Coefficient>) {
        out_coefficients.extend(self.coefficients().iter().cloned());
    }

    /// 以 evaluator 自己快取的係數求值。
    fn evaluate(&self) -> Coefficient;

    /// 以呼叫端提供、與 `keys()` 對齊的係數求值（optimizer 的 trial state）。
    fn evaluate_with(&self, coefficients: &[Coefficient]) -> CurveResult<Coefficient>;

    /// 以 key 查表取得係數求值。
    fn evaluate_keyed(&self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<Coefficient>;

    fn evaluate_and_jacobians(&self) -> (Coefficient, Vec<Jacobian>);

    fn evaluate_and_jacobians_with(&self,
                                   coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)>;

    /// 求值並對每個 active key 做 `accumulator[key] += chain_rule * J_key`。
    fn evaluate_and_accumulate(&self,
                               coefficients: &HashMap<Key, Coefficient>,
                               accumulator: &mut dyn JacobianAccumulator,
                               chain_rule: f64) -> CurveResult<Coefficient>;

    fn evaluate_derivative(&self, order: u32) -> CurveResult<Coefficient>;

    fn evaluate_derivative_with(&self,
                                order: u32,
                                coefficients: &[Coefficient]) -> CurveResult<Coefficient>;

    fn evaluate_vector_and_jacobian(&self,
                                    coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)>;

    fn evaluate_derivative_and_jacobian(&self,
                                        order: u32,
                                        coefficients: &[Coefficient]) -> CurveResult<(Coefficient, Vec<Jacobian>)>;
}
