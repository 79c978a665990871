//! EAR (Eye Aspect Ratio) 计算
//!
//! 输入为人脸网格模型输出的归一化 3D 关键点，按 6 点公式分别计算左右眼 EAR，
//! 取平均值作为该帧的睁眼程度。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 左眼 6 点索引（p1..p6），对应 Face Mesh 拓扑
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
/// 右眼 6 点索引（p1..p6）
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

const MIN_HORIZONTAL_DISTANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EarError {
    #[error("landmark index {index} out of range (frame has {len} points)")]
    MissingLandmark { index: usize, len: usize },
    #[error("landmark {index} has non-finite coordinates")]
    NonFinite { index: usize },
    #[error("eye corners coincide, aspect ratio undefined")]
    DegenerateEye,
}

/// Per-eye and averaged openness for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeOpenness {
    pub left: f64,
    pub right: f64,
    pub average: f64,
}

/// 标准 6 点公式: EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)
///
/// - p1, p4: 眼角点（水平方向）
/// - p2, p3: 上眼睑
/// - p5, p6: 下眼睑
pub fn eye_aspect_ratio(landmarks: &[Landmark], eye: &[usize; 6]) -> Result<f64, EarError> {
    let mut points = [Landmark::default(); 6];
    for (slot, &index) in points.iter_mut().zip(eye.iter()) {
        let point = landmarks.get(index).ok_or(EarError::MissingLandmark {
            index,
            len: landmarks.len(),
        })?;
        if !point.is_finite() {
            return Err(EarError::NonFinite { index });
        }
        *slot = *point;
    }

    let [p1, p2, p3, p4, p5, p6] = points;
    let horizontal = p1.distance(&p4);
    if horizontal < MIN_HORIZONTAL_DISTANCE {
        return Err(EarError::DegenerateEye);
    }

    let vertical1 = p2.distance(&p6);
    let vertical2 = p3.distance(&p5);
    Ok((vertical1 + vertical2) / (2.0 * horizontal))
}

/// 双眼 EAR 取平均
pub fn binocular_openness(landmarks: &[Landmark]) -> Result<EyeOpenness, EarError> {
    let left = eye_aspect_ratio(landmarks, &LEFT_EYE)?;
    let right = eye_aspect_ratio(landmarks, &RIGHT_EYE)?;
    Ok(EyeOpenness {
        left,
        right,
        average: (left + right) / 2.0,
    })
}
