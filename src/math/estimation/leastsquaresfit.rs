use std::collections::HashMap;

use argmin::core::{
    Error,
    Executor,
    Jacobian as ArgminJacobian,
    Operator,
    State
};
use argmin::solver::gaussnewton::GaussNewton;
use log::debug;
use nalgebra::{
    DMatrix,
    DVector
};

use crate::math::curve::coefficient::{
    Coefficient,
    Jacobian,
    Time
};
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::jacobianaccumulator::JacobianAccumulator;
use crate::math::curve::key::Key;
use crate::math::curve::vectorspacecurve::VectorSpaceCurve;
use crate::math::curve::vectorspaceevaluator::VectorSpaceEvaluator;

// ─────────────────────────────────────────────────────────────────────────────
// 以量測值對曲線係數做加權最小平方
// ─────────────────────────────────────────────────────────────────────────────
//
// 殘差與 Jacobian（第 i 筆量測，w_i 為權重）：
//
//   r_i = sqrt(w_i)·(f(t_i) - y_i)
//   ∂r_i/∂c_k = sqrt(w_i)·J_k      （chain rule scale = sqrt(w_i)）
//
// 求解交給 argmin 的 GaussNewton（(JᵀJ)·δ = Jᵀr，c ← c - δ）。
// 線性插值下殘差對係數是線性的，第一步即為最小平方解，
// 之後的迭代只用來確認殘差不再下降。

#[derive(Clone, Debug)]
pub struct Measurement {
    time: Time,
    value: Coefficient,
    weight: f64,
}

impl Measurement {
    pub fn new(time: Time, value: Coefficient) -> Measurement {
        Measurement { time, value, weight: 1.0 }
    }

    pub fn with_weight(mut self, weight: f64) -> Measurement {
        self.weight = weight;
        self
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn value(&self) -> &Coefficient {
        &self.value
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FitOptions {
    pub max_iterations: usize,
    /// 相鄰兩次迭代殘差 L2 norm 的差小於此值即停止；必須為正。
    pub cost_tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions { max_iterations: 10, cost_tolerance: 1e-12 }
    }
}

#[derive(Clone, Debug)]
pub struct FitReport {
    pub n_measurements: usize,
    pub iterations: usize,
    pub initial_cost: f64,
    pub final_cost: f64,
    pub keys: Vec<Key>,
}

/// 把一筆量測的 Jacobian blocks 寫進大矩陣的某幾列。
struct BlockRowAccumulator<'a> {
    matrix: &'a mut DMatrix<f64>,
    row: usize,
    offsets: &'a HashMap<Key, usize>,
}

impl JacobianAccumulator for BlockRowAccumulator<'_> {
    fn check_block(&self, key: &Key, rows: usize, cols: usize) -> CurveResult<()> {
        let col = *self.offsets.get(key).ok_or(CurveError::MissingKey(*key))?;
        if self.row + rows > self.matrix.nrows() {
            return Err(CurveError::DimensionMismatch { expected: self.matrix.nrows() - self.row, got: rows });
        }
        if col + cols > self.matrix.ncols() {
            return Err(CurveError::DimensionMismatch { expected: self.matrix.ncols() - col, got: cols });
        }
        Ok(())
    }

    fn accumulate(&mut self, key: &Key, jacobian: &Jacobian, scale: f64) -> CurveResult<()> {
        let (nrows, ncols) = jacobian.shape();
        self.check_block(key, nrows, ncols)?;
        let col = self.offsets[key];
        let mut block = self.matrix.view_mut((self.row, col), (nrows, ncols));
        block += jacobian * scale;
        Ok(())
    }
}

/// 固定 bracket 的最小平方問題。
///
/// 每筆量測的 evaluator 只在建構時做一次 bracket 查詢，
/// 之後所有 trial coefficients 都透過同一組 evaluator 求值。
pub struct LeastSquaresProblem<E: VectorSpaceEvaluator> {
    dimension: usize,
    keys: Vec<Key>,
    offsets: HashMap<Key, usize>,
    evaluators: Vec<E>,
    measurements: Vec<Measurement>,
}

impl<E: VectorSpaceEvaluator> LeastSquaresProblem<E> {
    pub fn new<C>(curve: &C, measurements: Vec<Measurement>) -> CurveResult<LeastSquaresProblem<E>>
    where
        C: VectorSpaceCurve<Evaluator = E>,
    {
        let dimension = curve.dimension();
        let mut evaluators = Vec::with_capacity(measurements.len());
        for measurement in &measurements {
            curve.check_dimension(&measurement.value)?;
            if !measurement.weight.is_finite() || measurement.weight <= 0.0 {
                return Err(CurveError::InvalidWeight { weight: measurement.weight });
            }
            evaluators.push(curve.evaluator(measurement.time)?);
        }

        let keys: Vec<Key> = curve.all_coefficients().iter().map(|s| s.key()).collect();
        let offsets = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (*key, i * dimension))
            .collect();

        Ok(LeastSquaresProblem { dimension, keys, offsets, evaluators, measurements })
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn n_residuals(&self) -> usize {
        self.measurements.len() * self.dimension
    }

    pub fn n_parameters(&self) -> usize {
        self.keys.len() * self.dimension
    }

    pub fn stack(&self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<DVector<f64>> {
        let mut param = DVector::<f64>::zeros(self.n_parameters());
        for key in &self.keys {
            let value = coefficients.get(key).ok_or(CurveError::MissingKey(*key))?;
            if value.len() != self.dimension {
                return Err(CurveError::DimensionMismatch { expected: self.dimension, got: value.len() });
            }
            param.rows_mut(self.offsets[key], self.dimension).copy_from(value);
        }
        Ok(param)
    }

    pub fn unstack(&self, param: &DVector<f64>) -> CurveResult<HashMap<Key, Coefficient>> {
        if param.len() != self.n_parameters() {
            return Err(CurveError::LengthMismatch { expected: self.n_parameters(), got: param.len() });
        }
        Ok(self.keys
            .iter()
            .map(|key| (*key, param.rows(self.offsets[key], self.dimension).into_owned()))
            .collect())
    }

    pub fn residuals(&self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<DVector<f64>> {
        let mut residuals = DVector::<f64>::zeros(self.n_residuals());
        for (i, (evaluator, measurement)) in self.evaluators.iter().zip(&self.measurements).enumerate() {
            let value = evaluator.evaluate_keyed(coefficients)?;
            let residual = (value - &measurement.value) * measurement.weight.sqrt();
            residuals.rows_mut(i * self.dimension, self.dimension).copy_from(&residual);
        }
        Ok(residuals)
    }

    pub fn jacobian(&self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<DMatrix<f64>> {
        let mut jacobian = DMatrix::<f64>::zeros(self.n_residuals(), self.n_parameters());
        for (i, (evaluator, measurement)) in self.evaluators.iter().zip(&self.measurements).enumerate() {
            let mut accumulator = BlockRowAccumulator {
                matrix: &mut jacobian,
                row: i * self.dimension,
                offsets: &self.offsets,
            };
            evaluator.evaluate_and_accumulate(coefficients, &mut accumulator, measurement.weight.sqrt())?;
        }
        Ok(jacobian)
    }

    pub fn cost(&self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<f64> {
        Ok(0.5 * self.residuals(coefficients)?.norm_squared())
    }

    /// Gauss-Newton；回傳最佳係數與報告，不修改曲線。
    pub fn solve(&self,
                 initial: &HashMap<Key, Coefficient>,
                 options: &FitOptions) -> CurveResult<(HashMap<Key, Coefficient>, FitReport)> {
        let param = self.stack(initial)?;
        let initial_cost = self.cost(initial)?;

        let solver = GaussNewton::new().with_tolerance(options.cost_tolerance)?;
        let max_iterations = options.max_iterations.max(1) as u64;
        let mut state = Executor::new(GaussNewtonAdapter::new(self), solver)
            .configure(|state| state.param(param).max_iters(max_iterations))
            .run()?
            .state()
            .clone();

        let iterations = state.get_iter() as usize;
        let termination = state.get_termination_status().clone();
        let best = state
            .take_best_param()
            .ok_or_else(|| CurveError::Solver("solver returned no parameters".to_owned()))?;
        let coefficients = self.unstack(&best)?;
        let final_cost = self.cost(&coefficients)?;
        debug!("gauss-newton stopped after {} iterations: {:?}", iterations, termination);

        let report = FitReport {
            n_measurements: self.measurements.len(),
            iterations,
            initial_cost,
            final_cost,
            keys: self.keys.clone(),
        };
        Ok((coefficients, report))
    }
}

/// 把 `LeastSquaresProblem` 接到 argmin：參數是所有係數疊成的一條向量。
struct GaussNewtonAdapter<'a, E: VectorSpaceEvaluator> {
    problem: &'a LeastSquaresProblem<E>,
}

impl<'a, E: VectorSpaceEvaluator> GaussNewtonAdapter<'a, E> {
    fn new(problem: &'a LeastSquaresProblem<E>) -> Self {
        GaussNewtonAdapter { problem }
    }
}

impl<E: VectorSpaceEvaluator> Operator for GaussNewtonAdapter<'_, E> {
    type Param = DVector<f64>;
    type Output = DVector<f64>;

    fn apply(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let coefficients = self.problem.unstack(param)?;
        Ok(self.problem.residuals(&coefficients)?)
    }
}

impl<E: VectorSpaceEvaluator> ArgminJacobian for GaussNewtonAdapter<'_, E> {
    type Param = DVector<f64>;
    type Jacobian = DMatrix<f64>;

    fn jacobian(&self, param: &Self::Param) -> Result<Self::Jacobian, Error> {
        let coefficients = self.problem.unstack(param)?;
        Ok(self.problem.jacobian(&coefficients)?)
    }
}

/// 以量測值重新估計曲線的所有係數並寫回曲線；bracket 結構（時間、key）不變。
pub fn fit_to_measurements<C: VectorSpaceCurve>(curve: &mut C,
                                                measurements: Vec<Measurement>,
                                                options: &FitOptions) -> CurveResult<FitReport> {
    let problem = LeastSquaresProblem::new(&*curve, measurements)?;
    let initial: HashMap<Key, Coefficient> = curve
        .all_coefficients()
        .iter()
        .map(|s| (s.key(), s.coefficient().clone()))
        .collect();
    let (coefficients, report) = problem.solve(&initial, options)?;
    curve.set_coefficients(&coefficients)?;
    debug!("fitted {} coefficients to {} measurements in {} iterations (cost {:.3e} -> {:.3e})",
           report.keys.len(), report.n_measurements, report.iterations, report.initial_cost, report.final_cost);
    Ok(report)
}
