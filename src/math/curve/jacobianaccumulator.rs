use std::collections::HashMap;

use crate::math::curve::coefficient::Jacobian;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::key::Key;

/// 呼叫端持有的 Jacobian 累加器（chain rule hook）。
///
/// Evaluator 先對每個 active key 呼叫 `check_block`，全部通過後才呼叫
/// `accumulate(key, J_key, scale)`，實作端負責 `acc[key] += scale * J_key`。
pub trait JacobianAccumulator {
    /// 確認 `key` 存在，且可以接收 `rows × cols` 的 block。
    fn check_block(&self, key: &Key, rows: usize, cols: usize) -> CurveResult<()>;

    fn accumulate(&mut self, key: &Key, jacobian: &Jacobian, scale: f64) -> CurveResult<()>;
}

impl JacobianAccumulator for HashMap<Key, Jacobian> {
    fn check_block(&self, key: &Key, rows: usize, cols: usize) -> CurveResult<()> {
        let target = self.get(key).ok_or(CurveError::MissingKey(*key))?;
        if target.nrows() != rows {
            return Err(CurveError::DimensionMismatch { expected: target.nrows(), got: rows });
        }
        if target.ncols() != cols {
            return Err(CurveError::DimensionMismatch { expected: target.ncols(), got: cols });
        }
        Ok(())
    }

    fn accumulate(&mut self, key: &Key, jacobian: &Jacobian, scale: f64) -> CurveResult<()> {
        self.check_block(key, jacobian.nrows(), jacobian.ncols())?;
        let target = self.get_mut(key).ok_or(CurveError::MissingKey(*key))?;
        *target += jacobian * scale;
        Ok(())
    }
}
