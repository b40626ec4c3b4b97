//! 观测记录指标收集模块
//!
//! 记录解析、分类与持久化过程中的运行指标。

use std::collections::BTreeMap;

use contracts::{Classification, Observation};
use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};

/// 登记所有指标的说明，安装 recorder 后调用一次
pub fn describe_metrics() {
    describe_counter!(
        "sbs_logger_observations_total",
        "Observations built from position reports, by classification"
    );
    describe_histogram!(
        "sbs_logger_altitude_ft",
        "Reported altitude of each observation in feet"
    );
    describe_histogram!(
        "sbs_logger_speed_kt",
        "Reported ground speed of each observation in knots"
    );
    describe_counter!(
        "sbs_logger_lines_skipped_total",
        "Feed lines that produced no observation, by reason"
    );
    describe_counter!(
        "sbs_logger_sink_writes_total",
        "Observations offered to each sink, by status"
    );
    describe_counter!(
        "sbs_logger_batch_flushes_total",
        "CSV batch flush attempts, by status"
    );
    describe_counter!(
        "sbs_logger_batch_rows_written_total",
        Unit::Count,
        "Rows appended to the CSV file"
    );
    describe_gauge!(
        "sbs_logger_pending_batch",
        Unit::Count,
        "Observations waiting for the next CSV flush"
    );
}

/// 记录一条完成分类的观测
///
/// 每构建一个 `Observation` 时调用一次。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_observation;
///
/// let observation = Observation::from_report(report);
/// record_observation(&observation);
/// ```
pub fn record_observation(observation: &Observation) {
    counter!(
        "sbs_logger_observations_total",
        "classification" => observation.classification().as_str()
    )
    .increment(1);

    if let Some(altitude) = observation.altitude() {
        histogram!("sbs_logger_altitude_ft").record(altitude);
    }
    if let Some(speed) = observation.speed() {
        histogram!("sbs_logger_speed_kt").record(speed);
    }
}

/// 记录被跳过的行
pub fn record_line_skipped(reason: &'static str) {
    counter!("sbs_logger_lines_skipped_total", "reason" => reason).increment(1);
}

/// 记录 sink 写入结果
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "sbs_logger_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录批量刷新结果
pub fn record_batch_flush(sink_name: &str, rows: usize, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "sbs_logger_batch_flushes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);

    if success {
        counter!("sbs_logger_batch_rows_written_total", "sink" => sink_name.to_string())
            .increment(rows as u64);
    }
}

/// 记录待刷新批次长度
pub fn record_pending_batch(sink_name: &str, len: usize) {
    gauge!("sbs_logger_pending_batch", "sink" => sink_name.to_string()).set(len as f64);
}

/// 观测指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FeedMetricsAggregator {
    /// 观测总数
    pub total_observations: u64,

    /// 带有经纬度的观测数
    pub with_position: u64,

    /// 各分类计数
    pub classification_counts: BTreeMap<&'static str, u64>,

    /// 各跳过原因计数
    pub skip_counts: BTreeMap<&'static str, u64>,

    /// 高度统计 (ft)
    pub altitude_stats: RunningStats,

    /// 速度统计 (kt)
    pub speed_stats: RunningStats,
}

impl FeedMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, observation: &Observation) {
        self.total_observations += 1;
        *self
            .classification_counts
            .entry(observation.classification().as_str())
            .or_insert(0) += 1;

        if observation.lat().is_some() && observation.lon().is_some() {
            self.with_position += 1;
        }
        if let Some(altitude) = observation.altitude() {
            self.altitude_stats.push(altitude);
        }
        if let Some(speed) = observation.speed() {
            self.speed_stats.push(speed);
        }
    }

    /// 记录一次跳过
    pub fn record_skip(&mut self, reason: &'static str) {
        *self.skip_counts.entry(reason).or_insert(0) += 1;
    }

    /// 某一分类的计数
    pub fn count_of(&self, classification: Classification) -> u64 {
        self.classification_counts
            .get(classification.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// 跳过总数
    pub fn total_skipped(&self) -> u64 {
        self.skip_counts.values().sum()
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_observations: self.total_observations,
            total_skipped: self.total_skipped(),
            position_rate: if self.total_observations > 0 {
                self.with_position as f64 / self.total_observations as f64 * 100.0
            } else {
                0.0
            },
            classification_counts: self.classification_counts.clone(),
            skip_counts: self.skip_counts.clone(),
            altitude_ft: StatsSummary::from(&self.altitude_stats),
            speed_kt: StatsSummary::from(&self.speed_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_observations: u64,
    pub total_skipped: u64,
    pub position_rate: f64,
    pub classification_counts: BTreeMap<&'static str, u64>,
    pub skip_counts: BTreeMap<&'static str, u64>,
    pub altitude_ft: StatsSummary,
    pub speed_kt: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Feed Metrics Summary ===")?;
        writeln!(f, "Observations: {}", self.total_observations)?;
        writeln!(f, "Skipped lines: {}", self.total_skipped)?;
        writeln!(f, "With position: {:.2}%", self.position_rate)?;
        writeln!(f, "Altitude (ft): {}", self.altitude_ft)?;
        writeln!(f, "Speed (kt): {}", self.speed_kt)?;

        if !self.classification_counts.is_empty() {
            writeln!(f, "Classifications:")?;
            for (label, count) in &self.classification_counts {
                writeln!(f, "  {}: {}", label, count)?;
            }
        }

        if !self.skip_counts.is_empty() {
            writeln!(f, "Skip reasons:")?;
            for (reason, count) in &self.skip_counts {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
