use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use nalgebra::DVector;
use serde::{
    Deserialize,
    Serialize
};

use crate::math::curve::coefficient::{
    Coefficient,
    Time
};
use crate::math::curve::coefficientstore::CoefficientStore;
use crate::math::curve::curveerror::CurveResult;
use crate::math::curve::key::Key;
use crate::math::curve::vectorspacecurve::VectorSpaceCurve;
use crate::math::curve::vectorspacecurvevariant::{
    InterpolationPolicy,
    VectorSpaceCurveVariant
};

/// JSON 中的一筆 sample；`key` 省略時建構曲線會產生新的 key。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleRecord {
    pub time: Time,
    pub value: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>
}

/// 曲線設定，亦作為曲線內容的 JSON dump。
///
/// ```json
/// {
///     "policy": "linear",
///     "dimension": 2,
///     "samples": [
///         { "time": 0.0, "value": [0.0, 0.0] },
///         { "time": 1.0, "value": [10.0, 10.0] }
///     ]
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurveConfiguration {
    pub policy: InterpolationPolicy,
    pub dimension: usize,
    #[serde(default)]
    pub samples: Vec<SampleRecord>
}

impl CurveConfiguration {
    pub fn from_reader<P: AsRef<Path>>(file_path: P) -> CurveResult<CurveConfiguration> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let configuration: CurveConfiguration = serde_json::from_reader(reader)?;
        Ok(configuration)
    }

    pub fn from_json_value(json_value: serde_json::Value) -> CurveResult<CurveConfiguration> {
        Ok(serde_json::from_value(json_value)?)
    }

    /// 擷取曲線目前所有 sample（含 key）。
    pub fn from_curve(curve: &VectorSpaceCurveVariant) -> CurveConfiguration {
        let samples = curve
            .all_coefficients()
            .iter()
            .map(|s| SampleRecord {
                time: s.time(),
                value: s.coefficient().iter().copied().collect(),
                key: Some(s.key())
            })
            .collect();
        CurveConfiguration { policy: curve.policy(), dimension: curve.dimension(), samples }
    }

    pub fn to_json_value(&self) -> CurveResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// 依設定建立曲線；sample 順序不限，但時間與 key 不可重複。
    pub fn build(&self) -> CurveResult<VectorSpaceCurveVariant> {
        let mut curve = VectorSpaceCurveVariant::new(self.policy, self.dimension);
        let mut keys = Vec::with_capacity(self.samples.len());
        let mut times = Vec::with_capacity(self.samples.len());
        let mut values: Vec<Coefficient> = Vec::with_capacity(self.samples.len());
        for record in &self.samples {
            let value = DVector::from_vec(record.value.clone());
            curve.check_dimension(&value)?;
            keys.push(record.key.unwrap_or_default());
            times.push(record.time);
            values.push(value);
        }
        curve.store_mut().insert_coefficients(&keys, &times, &values)?;
        debug!("built {} curve with {} samples from configuration", self.policy.name(), keys.len());
        Ok(curve)
    }
}

impl VectorSpaceCurveVariant {
    pub fn to_json(&self) -> CurveResult<serde_json::Value> {
        CurveConfiguration::from_curve(self).to_json_value()
    }
}
