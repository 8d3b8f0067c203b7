//! 阈值与告警分类模型。

/// 被监控的指标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }
}

/// 越限方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cause {
    Upper,
    Lower,
}

impl Cause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cause::Upper => "upper",
            Cause::Lower => "lower",
        }
    }
}

/// 单个指标的判定结果，`Within` 为清除态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Above,
    Below,
    Within,
}

/// 温湿度阈值：min 含边界，max 不含（value >= max 判为越上限）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub temp_min: f64,
    pub temp_max: f64,
    pub hum_min: f64,
    pub hum_max: f64,
}

impl Threshold {
    /// 判定单个值相对一对上下限的位置。
    pub fn classify_value(value: f64, min: f64, max: f64) -> Classification {
        if value >= max {
            Classification::Above
        } else if value < min {
            Classification::Below
        } else {
            Classification::Within
        }
    }

    pub fn bounds(&self, metric: Metric) -> (f64, f64) {
        match metric {
            Metric::Temperature => (self.temp_min, self.temp_max),
            Metric::Humidity => (self.hum_min, self.hum_max),
        }
    }
}
