use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Clamp into [min, max]; NaN falls back to `min`
fn clamp_or_min(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// A slope angle in degrees constrained to [0.0, 89.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct SlopeAngle(f64);

impl SlopeAngle {
    const MIN: f64 = 0.0;
    const MAX: f64 = 89.0;

    pub fn new(value: f64) -> Self {
        Self(clamp_or_min(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for SlopeAngle {
    fn default() -> Self {
        Self::new(40.0)
    }
}

impl From<f64> for SlopeAngle {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Neighbor threshold multiplier over the mean node spacing, constrained to [1.05, 4.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct ConnectivityMultiplier(f64);

impl ConnectivityMultiplier {
    const MIN: f64 = 1.05;
    const MAX: f64 = 4.0;

    pub fn new(value: f64) -> Self {
        Self(clamp_or_min(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ConnectivityMultiplier {
    fn default() -> Self {
        Self::new(1.6)
    }
}

impl From<f64> for ConnectivityMultiplier {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// A clearance distance in world units constrained to [0.0, 100.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct Clearance(f64);

impl Clearance {
    const MIN: f64 = 0.0;
    const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Self {
        Self(clamp_or_min(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Clearance {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl From<f64> for Clearance {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// A soft avoidance buffer width in world units constrained to [0.0, 100.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct AvoidanceMargin(f64);

impl AvoidanceMargin {
    const MIN: f64 = 0.0;
    const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Self {
        Self(clamp_or_min(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for AvoidanceMargin {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl From<f64> for AvoidanceMargin {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Local channel half-width in world units constrained to [0.1, 500.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct ChannelMargin(f64);

impl ChannelMargin {
    const MIN: f64 = 0.1;
    const MAX: f64 = 500.0;

    pub fn new(value: f64) -> Self {
        Self(clamp_or_min(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ChannelMargin {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl From<f64> for ChannelMargin {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Local grid cell spacing in world units constrained to [0.05, 50.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct GridSpacing(f64);

impl GridSpacing {
    const MIN: f64 = 0.05;
    const MAX: f64 = 50.0;

    pub fn new(value: f64) -> Self {
        Self(clamp_or_min(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl From<f64> for GridSpacing {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// A search cost multiplier constrained to [1.0, 100.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct CostMultiplier(f64);

impl CostMultiplier {
    const MIN: f64 = 1.0;
    const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Self {
        Self(clamp_or_min(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for CostMultiplier {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl From<f64> for CostMultiplier {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// A scale factor constrained to [1.0, 20.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    const MIN: f64 = 1.0;
    const MAX: f64 = 20.0;

    pub fn new(value: f64) -> Self {
        Self(clamp_or_min(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl From<f64> for ScaleFactor {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}
