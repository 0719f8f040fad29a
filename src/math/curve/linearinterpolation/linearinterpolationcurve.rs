use std::fmt;

use log::debug;

use crate::math::curve::coefficient::{
    Coefficient,
    Time
};
use crate::math::curve::coefficientstore::{
    CoefficientStore,
    OrderedCoefficientStore
};
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::key::Key;
use crate::math::curve::linearinterpolation::linearinterpolationevaluator::LinearInterpolationEvaluator;
use crate::math::curve::vectorspacecurve::VectorSpaceCurve;

/// 向量空間上的分段線性插值曲線。
///
/// # Policies
/// - `extend`：只接受嚴格遞增、且晚於目前最後一個 sample 的時間（單調 append）。
/// - `fit_curve`：先驗證輸入，通過後才清空並重建，失敗時曲線保持原狀。
///
/// 兩者都會為每個新係數產生新的 `Key`。
#[derive(Clone, Debug)]
pub struct LinearInterpolationCurve<S: CoefficientStore = OrderedCoefficientStore> {
    dimension: usize,
    store: S,
}

impl LinearInterpolationCurve {
    pub fn new(dimension: usize) -> LinearInterpolationCurve {
        LinearInterpolationCurve::with_store(dimension, OrderedCoefficientStore::new())
    }
}

impl<S: CoefficientStore> LinearInterpolationCurve<S> {
    /// 使用自訂的 store 實作；store 內既有內容會被清除。
    pub fn with_store(dimension: usize, mut store: S) -> LinearInterpolationCurve<S> {
        store.clear();
        LinearInterpolationCurve { dimension, store }
    }

    fn validate_samples(&self, times: &[Time], values: &[Coefficient]) -> CurveResult<()> {
        if times.len() != values.len() {
            return Err(CurveError::LengthMismatch { expected: times.len(), got: values.len() });
        }
        for (&time, value) in times.iter().zip(values) {
            if !time.is_finite() {
                return Err(CurveError::NonFiniteTime { time });
            }
            self.check_dimension(value)?;
        }
        Ok(())
    }
}

impl<S: CoefficientStore> VectorSpaceCurve for LinearInterpolationCurve<S> {
    type Store = S;
    type Evaluator = LinearInterpolationEvaluator;

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn store(&self) -> &S {
        &self.store
    }

    fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn extend(&mut self, times: &[Time], values: &[Coefficient]) -> CurveResult<Vec<Key>> {
        self.validate_samples(times, values)?;

        let mut previous = self.store.max_time();
        for &time in times {
            if let Some(previous) = previous {
                if time <= previous {
                    return Err(CurveError::NonIncreasingTime { time, previous });
                }
            }
            previous = Some(time);
        }

        let keys: Vec<Key> = times.iter().map(|_| Key::new()).collect();
        self.store.insert_coefficients(&keys, times, values)?;
        debug!("extended linear interpolation curve by {} samples (now {})", keys.len(), self.store.len());
        Ok(keys)
    }

    fn fit_curve(&mut self, times: &[Time], values: &[Coefficient]) -> CurveResult<Vec<Key>> {
        self.validate_samples(times, values)?;

        let mut sorted_times = times.to_vec();
        sorted_times.sort_by(f64::total_cmp);
        if let Some(pair) = sorted_times.windows(2).find(|w| w[0] == w[1]) {
            return Err(CurveError::DuplicateTime { time: pair[0] });
        }

        self.store.clear();
        let keys: Vec<Key> = times.iter().map(|_| Key::new()).collect();
        self.store.insert_coefficients(&keys, times, values)?;
        debug!("fitted linear interpolation curve to {} samples", keys.len());
        Ok(keys)
    }

    fn evaluator(&self, time: Time) -> CurveResult<LinearInterpolationEvaluator> {
        let (sample0, sample1) = self.store.coefficients_at(time)?;
        LinearInterpolationEvaluator::from_bracket(sample0, sample1, time, self.dimension)
    }
}

impl<S: CoefficientStore> fmt::Display for LinearInterpolationCurve<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LinearInterpolationCurve (dimension {}, {} samples)", self.dimension, self.store.len())?;
        for sample in self.store.all_coefficients() {
            let entries: Vec<String> = sample.coefficient().iter().map(|v| v.to_string()).collect();
            writeln!(f, "  t = {}: [{}]  key {}", sample.time(), entries.join(", "), sample.key())?;
        }
        Ok(())
    }
}
