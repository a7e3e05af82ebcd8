//! Rolling window of historical snapshots
//!
//! The controller itself is stateless. Callers that keep history between
//! ticks own a `MetricsWindow`: a fixed-capacity ring buffer with FIFO
//! eviction, so history never grows without bound.

use std::collections::VecDeque;

use crate::models::ResourceMetrics;

/// Default number of snapshots retained (one hour at 60s sampling)
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Fixed-capacity ring buffer of metrics snapshots
#[derive(Debug, Clone)]
pub struct MetricsWindow {
    samples: VecDeque<ResourceMetrics>,
    capacity: usize,
}

impl MetricsWindow {
    /// Create a window holding at most `capacity` samples (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(10_000)),
            capacity,
        }
    }

    /// Append a sample, returning the evicted oldest sample when full
    pub fn push(&mut self, metrics: ResourceMetrics) -> Option<ResourceMetrics> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(metrics);
        evicted
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &ResourceMetrics> {
        self.samples.iter()
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<&ResourceMetrics> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Mean CPU and memory over the window, `None` when empty
    pub fn averages(&self) -> Option<HistoricalAverages> {
        HistoricalAverages::from_samples(self.samples.iter())
    }
}

impl Default for MetricsWindow {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl Extend<ResourceMetrics> for MetricsWindow {
    fn extend<I: IntoIterator<Item = ResourceMetrics>>(&mut self, iter: I) {
        for metrics in iter {
            self.push(metrics);
        }
    }
}

impl<'a> IntoIterator for &'a MetricsWindow {
    type Item = &'a ResourceMetrics;
    type IntoIter = std::collections::vec_deque::Iter<'a, ResourceMetrics>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Arithmetic means over a set of historical samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalAverages {
    pub cpu: f64,
    pub memory: f64,
    pub samples: usize,
}

impl HistoricalAverages {
    /// Average CPU and memory in one pass; `None` for an empty input
    pub fn from_samples<'a, I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ResourceMetrics>,
    {
        let (count, cpu_sum, memory_sum) = samples
            .into_iter()
            .fold((0usize, 0.0f64, 0.0f64), |(n, cpu, mem), m| {
                (n + 1, cpu + m.cpu, mem + m.memory)
            });

        if count == 0 {
            return None;
        }

        Some(Self {
            cpu: cpu_sum / count as f64,
            memory: memory_sum / count as f64,
            samples: count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cpu: f64, memory: f64) -> ResourceMetrics {
        ResourceMetrics {
            cpu,
            memory,
            disk_io: 0.0,
            network_io: 0.0,
            active_connections: 0,
            queue_length: 0,
        }
    }

    #[test]
    fn test_window_evicts_oldest_when_full() {
        let mut window = MetricsWindow::with_capacity(3);
        assert!(window.push(sample(1.0, 1.0)).is_none());
        assert!(window.push(sample(2.0, 2.0)).is_none());
        assert!(window.push(sample(3.0, 3.0)).is_none());
        assert!(window.is_full());

        let evicted = window.push(sample(4.0, 4.0)).unwrap();
        assert_eq!(evicted.cpu, 1.0);
        assert_eq!(window.len(), 3);

        let cpus: Vec<f64> = window.iter().map(|m| m.cpu).collect();
        assert_eq!(cpus, vec![2.0, 3.0, 4.0]);
        assert_eq!(window.latest().unwrap().cpu, 4.0);
    }

    #[test]
    fn test_zero_capacity_holds_one_sample() {
        let mut window = MetricsWindow::with_capacity(0);
        window.extend([sample(1.0, 1.0), sample(2.0, 2.0)]);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest().unwrap().cpu, 2.0);
    }

    #[test]
    fn test_averages() {
        let mut window = MetricsWindow::default();
        assert!(window.averages().is_none());

        window.extend([sample(10.0, 20.0), sample(20.0, 30.0), sample(30.0, 40.0)]);
        let avg = window.averages().unwrap();
        assert!((avg.cpu - 20.0).abs() < 1e-9);
        assert!((avg.memory - 30.0).abs() < 1e-9);
        assert_eq!(avg.samples, 3);

        window.clear();
        assert!(window.is_empty());
    }

    #[test]
    fn test_averages_from_slice() {
        let samples = [sample(18.0, 25.0), sample(18.0, 25.0)];
        let avg = HistoricalAverages::from_samples(&samples).unwrap();
        assert_eq!(avg.cpu, 18.0);
        assert_eq!(avg.memory, 25.0);
    }
}
