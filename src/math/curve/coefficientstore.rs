use std::collections::{
    HashMap,
    HashSet
};

use log::trace;

use crate::math::curve::coefficient::{
    Coefficient,
    Sample,
    Time
};
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::key::Key;

/// 依時間排序的係數集合。
///
/// 定義域為半開區間 `[min_time, max_time)`：`max_time` 是最後一個 sample 的時間，
/// 本身不可查詢。同一時間最多一個 sample。
pub trait CoefficientStore {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 回傳唯一的 bracket `(s0, s1)`，滿足 `s0.time <= time < s1.time`。
    fn coefficients_at(&self, time: Time) -> CurveResult<(&Sample, &Sample)>;

    /// `start <= sample.time < end` 的 sample，時間遞增。
    fn coefficients_in_range(&self, start: Time, end: Time) -> Vec<&Sample>;

    fn all_coefficients(&self) -> Vec<&Sample>;

    fn coefficient(&self, key: &Key) -> Option<&Sample>;

    fn set_coefficient(&mut self, key: Key, value: Coefficient) -> CurveResult<()>;

    /// 全部 key 都存在才會寫入，否則 store 不變。
    fn set_coefficients(&mut self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<()>;

    fn insert_coefficient(&mut self, key: Key, time: Time, value: Coefficient) -> CurveResult<()>;

    /// 批次插入；任何一筆不合法則整批不寫入。
    fn insert_coefficients(&mut self,
                           keys: &[Key],
                           times: &[Time],
                           values: &[Coefficient]) -> CurveResult<()>;

    fn clear(&mut self);

    fn min_time(&self) -> Option<Time>;

    fn max_time(&self) -> Option<Time>;
}

// ─────────────────────────────────────────────
// OrderedCoefficientStore
// ─────────────────────────────────────────────
//
// samples 依時間排序存於 Vec，bracket 查詢用 binary search；
// index 記錄 key → time，以時間回查位置。

#[derive(Clone, Debug, Default)]
pub struct OrderedCoefficientStore {
    samples: Vec<Sample>,
    index: HashMap<Key, Time>,
}

impl OrderedCoefficientStore {
    pub fn new() -> OrderedCoefficientStore {
        OrderedCoefficientStore::default()
    }

    fn position_of_key(&self, key: &Key) -> Option<usize> {
        let time = *self.index.get(key)?;
        self.samples
            .binary_search_by(|s| s.time().total_cmp(&time))
            .ok()
    }

    fn has_time(&self, time: Time) -> bool {
        let pos = self.samples.partition_point(|s| s.time() < time);
        self.samples.get(pos).is_some_and(|s| s.time() == time)
    }

    fn validate_insertion(&self, key: &Key, time: Time) -> CurveResult<()> {
        if !time.is_finite() {
            return Err(CurveError::NonFiniteTime { time });
        }
        if self.index.contains_key(key) {
            return Err(CurveError::DuplicateKey(*key));
        }
        if self.has_time(time) {
            return Err(CurveError::DuplicateTime { time });
        }
        Ok(())
    }

    fn insert_unchecked(&mut self, key: Key, time: Time, value: Coefficient) {
        let pos = self.samples.partition_point(|s| s.time() < time);
        self.samples.insert(pos, Sample::new(key, time, value));
        self.index.insert(key, time);
        trace!("inserted coefficient {} at time {}", key, time);
    }
}

impl CoefficientStore for OrderedCoefficientStore {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn coefficients_at(&self, time: Time) -> CurveResult<(&Sample, &Sample)> {
        if !time.is_finite() {
            return Err(CurveError::NonFiniteTime { time });
        }
        let n = self.samples.len();
        if n < 2 {
            return Err(CurveError::InsufficientSamples { got: n });
        }
        let min_time = self.samples[0].time();
        let max_time = self.samples[n - 1].time();
        if time < min_time || time >= max_time {
            return Err(CurveError::OutOfRange { time, min_time, max_time });
        }
        // min_time <= time < max_time  =>  1 <= idx <= n - 1
        let idx = self.samples.partition_point(|s| s.time() <= time);
        Ok((&self.samples[idx - 1], &self.samples[idx]))
    }

    fn coefficients_in_range(&self, start: Time, end: Time) -> Vec<&Sample> {
        let lo = self.samples.partition_point(|s| s.time() < start);
        let hi = self.samples.partition_point(|s| s.time() < end);
        if hi <= lo {
            return Vec::new();
        }
        self.samples[lo..hi].iter().collect()
    }

    fn all_coefficients(&self) -> Vec<&Sample> {
        self.samples.iter().collect()
    }

    fn coefficient(&self, key: &Key) -> Option<&Sample> {
        self.position_of_key(key).map(|pos| &self.samples[pos])
    }

    fn set_coefficient(&mut self, key: Key, value: Coefficient) -> CurveResult<()> {
        let pos = self.position_of_key(&key).ok_or(CurveError::MissingKey(key))?;
        self.samples[pos].set_coefficient(value);
        Ok(())
    }

    fn set_coefficients(&mut self, coefficients: &HashMap<Key, Coefficient>) -> CurveResult<()> {
        let mut positions = Vec::with_capacity(coefficients.len());
        for (key, value) in coefficients {
            let pos = self.position_of_key(key).ok_or(CurveError::MissingKey(*key))?;
            positions.push((pos, value));
        }
        for (pos, value) in positions {
            self.samples[pos].set_coefficient(value.clone());
        }
        Ok(())
    }

    fn insert_coefficient(&mut self, key: Key, time: Time, value: Coefficient) -> CurveResult<()> {
        self.validate_insertion(&key, time)?;
        self.insert_unchecked(key, time, value);
        Ok(())
    }

    fn insert_coefficients(&mut self,
                           keys: &[Key],
                           times: &[Time],
                           values: &[Coefficient]) -> CurveResult<()> {
        if keys.len() != times.len() {
            return Err(CurveError::LengthMismatch { expected: times.len(), got: keys.len() });
        }
        if values.len() != times.len() {
            return Err(CurveError::LengthMismatch { expected: times.len(), got: values.len() });
        }

        let mut batch_keys = HashSet::with_capacity(keys.len());
        for (key, &time) in keys.iter().zip(times) {
            self.validate_insertion(key, time)?;
            if !batch_keys.insert(*key) {
                return Err(CurveError::DuplicateKey(*key));
            }
        }
        let mut sorted_times = times.to_vec();
        sorted_times.sort_by(f64::total_cmp);
        if let Some(pair) = sorted_times.windows(2).find(|w| w[0] == w[1]) {
            return Err(CurveError::DuplicateTime { time: pair[0] });
        }

        for ((key, &time), value) in keys.iter().zip(times).zip(values) {
            self.insert_unchecked(*key, time, value.clone());
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.samples.clear();
        self.index.clear();
    }

    fn min_time(&self) -> Option<Time> {
        self.samples.first().map(|s| s.time())
    }

    fn max_time(&self) -> Option<Time> {
        self.samples.last().map(|s| s.time())
    }
}
