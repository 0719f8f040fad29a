use nalgebra::{
    DMatrix,
    DVector
};

use crate::math::curve::key::Key;

pub type Time = f64;

/// 向量空間中的一個點；只用到加法與純量乘法。
pub type Coefficient = DVector<f64>;

/// D×D Jacobian block。
pub type Jacobian = DMatrix<f64>;

/// Store 內的原子紀錄：(key, time, coefficient)。
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    key: Key,
    time: Time,
    coefficient: Coefficient
}

impl Sample {
    pub fn new(key: Key, time: Time, coefficient: Coefficient) -> Sample {
        Sample { key, time, coefficient }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn coefficient(&self) -> &Coefficient {
        &self.coefficient
    }

    pub(crate) fn set_coefficient(&mut self, coefficient: Coefficient) {
        self.coefficient = coefficient;
    }
}
