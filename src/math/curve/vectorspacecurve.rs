use std::collections::HashMap;

use crate::math::curve::coefficient::{
    Coefficient,
    Sample,
    Time
};
use crate::math::curve::coefficientstore::CoefficientStore;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::key::Key;
use crate::math::curve::vectorspaceevaluator::VectorSpaceEvaluator;

/// 固定維度向量空間上的連續時間曲線。
///
/// 儲存交給 `Store`，求值交給每次查詢新建的 `Evaluator`。
/// `extend` 與 `fit_curve` 是各插值策略自己的 policy，沒有預設實作。
pub trait VectorSpaceCurve {
    type Store: CoefficientStore;
    type Evaluator: VectorSpaceEvaluator;

    fn dimension(&self) -> usize;

    fn store(&self) -> &Self::Store;

    fn store_mut(&mut self) -> &mut Self::Store;

    /// 擴充曲線使其能在 `times` 求值，回傳新係數的 key。
    fn extend(&mut self, times: &[Time], values: &[Coefficient]) -> CurveResult<Vec<Key>>;

    /// 清除既有係數並以 `times`/`values` 重建。
    fn fit_curve(&mut self, times: &[Time], values: &[Coefficient]) -> CurveResult<Vec<Key>>;

    fn evaluator(&self, time: Time) -> CurveResult<Self::Evaluator>;

    fn check_dimension(&self, value: &Coefficient) -> CurveResult<()> {
        if value.len() != self.dimension() {
            return Err(CurveError::DimensionMismatch { expected: self.dimension(), got: value.len() });
        }
        Ok(())
    }

    fn coefficients_at(&self, time: Time) -> CurveResult<(&Sample, &Sample)> {
        self.store().coefficients_at(time)
    }

    fn coefficients_in_range(&self, start: Time, end: Time) -> Vec<&Sample> {
        self.store().coefficients_in_range(start, end)
    }

    fn all_coefficients(&self) -> Vec<&Sample> {
        self.store().all_coefficients()
    }

    fn set_coefficient(&mut self, key: Key, value: Coefficient) -> CurveResult<()> {
        self.check_dimension(&value)?;
        self.store_mut().set_coefficient(key, value)
    }

    fn set_coefficients(&mut self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<()> {
        for value in coefficients.values() {
            self.check_dimension(value)?;
        }
        self.store_mut().set_coefficients(coefficients)
    }

    fn min_time(&self) -> Option<Time> {
        self.store().min_time()
    }

    /// 最後一個 sample 的時間（不含）。
    fn max_time(&self) -> Option<Time> {
        self.store().max_time()
    }

    fn evaluate(&self, time: Time) -> CurveResult<Coefficient> {
        Ok(self.evaluator(time)?.evaluate())
    }

    /// `order == 0` 等同 `evaluate`；更高階由各策略決定。
    fn evaluate_derivative(&self, time: Time, order: u32) -> CurveResult<Coefficient> {
        self.evaluator(time)?.evaluate_derivative(order)
    }
}
