//! Scaling decision engine
//!
//! Combines the assessment of the current snapshot with averages over the
//! caller's history window and walks a fixed priority cascade. The first
//! matching rule wins:
//!
//! 1. critical assessment          -> scale up, critical
//! 2. high assessment or hot avg   -> scale up, high
//! 3. low assessment and cold avg  -> scale down, low
//! 4. queue buildup with idle CPU  -> rebalance, medium
//! 5. otherwise                    -> maintain, low

use tracing::debug;

use super::history::HistoricalAverages;
use super::options::ScalingOptions;
use crate::assessor::UtilizationAssessor;
use crate::error::{ControllerError, ControllerResult};
use crate::models::{
    AllocationDecision, Priority, ResourceMetrics, ScalingAction, UtilizationAssessment,
    UtilizationLevel,
};

/// Action, priority and explanation chosen by the cascade
struct Verdict {
    action: ScalingAction,
    priority: Priority,
    reason: String,
    recommendations: Vec<String>,
}

/// Produces one advisory `AllocationDecision` per evaluation
#[derive(Debug, Clone, Default)]
pub struct ScalingDecisionEngine {
    options: ScalingOptions,
    assessor: UtilizationAssessor,
}

impl ScalingDecisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ScalingOptions) -> Self {
        Self {
            options,
            assessor: UtilizationAssessor::new(),
        }
    }

    /// Replace the assessor (e.g. to change the connection capacity)
    pub fn with_assessor(mut self, assessor: UtilizationAssessor) -> Self {
        self.assessor = assessor;
        self
    }

    pub fn options(&self) -> &ScalingOptions {
        &self.options
    }

    pub fn assessor(&self) -> &UtilizationAssessor {
        &self.assessor
    }

    /// Decide on a scaling action for `current` given prior snapshots.
    ///
    /// Total and deterministic. With an empty history the current sample
    /// stands in for the averages.
    pub fn decide<'a, I>(&self, current: &ResourceMetrics, historical: I) -> AllocationDecision
    where
        I: IntoIterator<Item = &'a ResourceMetrics>,
    {
        let assessment = self.assessor.assess(current);
        let averages = HistoricalAverages::from_samples(historical);
        let (avg_cpu, avg_memory, history_samples) = match averages {
            Some(avg) => (avg.cpu, avg.memory, avg.samples),
            None => (current.cpu, current.memory, 0),
        };

        let verdict = self.evaluate(current, &assessment, avg_cpu, avg_memory);

        debug!(
            action = %verdict.action,
            priority = %verdict.priority,
            level = %assessment.level,
            avg_cpu = avg_cpu,
            avg_memory = avg_memory,
            history_samples = history_samples,
            "Scaling decision made"
        );

        AllocationDecision {
            action: verdict.action,
            priority: verdict.priority,
            reason: verdict.reason,
            recommendations: verdict.recommendations,
            assessment,
            avg_cpu,
            avg_memory,
            history_samples,
        }
    }

    /// Validate options and every snapshot, then decide
    pub fn try_decide<'a, I>(
        &self,
        current: &ResourceMetrics,
        historical: I,
    ) -> ControllerResult<AllocationDecision>
    where
        I: IntoIterator<Item = &'a ResourceMetrics>,
    {
        self.options.validate()?;
        self.assessor.config().validate()?;
        current.validate()?;

        let historical: Vec<&ResourceMetrics> = historical.into_iter().collect();
        for (index, sample) in historical.iter().enumerate() {
            sample
                .validate()
                .map_err(|source| ControllerError::InvalidHistory {
                    index,
                    source: Box::new(source),
                })?;
        }

        Ok(self.decide(current, historical))
    }

    /// Instance count the caller should converge to after applying `decision`.
    ///
    /// Scale-ups add `scale_step` (twice that when critical), scale-downs
    /// remove it; the result always lies within `[min_instances, max_instances]`.
    pub fn target_instances(&self, decision: &AllocationDecision, current: u32) -> u32 {
        let step = self.options.scale_step;
        let desired = match decision.action {
            ScalingAction::ScaleUp if decision.priority == Priority::Critical => {
                current.saturating_add(step.saturating_mul(2))
            }
            ScalingAction::ScaleUp => current.saturating_add(step),
            ScalingAction::ScaleDown => current.saturating_sub(step),
            ScalingAction::Rebalance | ScalingAction::Maintain => current,
        };
        self.options.clamp_instances(desired)
    }

    fn evaluate(
        &self,
        current: &ResourceMetrics,
        assessment: &UtilizationAssessment,
        avg_cpu: f64,
        avg_memory: f64,
    ) -> Verdict {
        let opts = &self.options;
        let bottlenecks = assessment.bottleneck_messages();

        if assessment.level == UtilizationLevel::Critical {
            let mut recommendations = vec![
                "Scale up immediately by adding instances".to_string(),
                "Warm caches on new instances before routing traffic to them".to_string(),
                "Review recent deployments for performance regressions".to_string(),
            ];
            recommendations.extend(bottlenecks.iter().cloned());
            return Verdict {
                action: ScalingAction::ScaleUp,
                priority: Priority::Critical,
                reason: format!(
                    "Critical resource utilization detected: {}",
                    bottlenecks.join(", ")
                ),
                recommendations,
            };
        }

        if assessment.level == UtilizationLevel::High || avg_cpu > opts.scale_up_threshold {
            let mut recommendations = vec![
                "Add 1-2 instances to absorb the current load".to_string(),
                "Enable auto-scaling if it is not already active".to_string(),
                "Monitor request queue length closely".to_string(),
                "Consider rate limiting non-critical endpoints".to_string(),
            ];
            recommendations.extend(bottlenecks);
            return Verdict {
                action: ScalingAction::ScaleUp,
                priority: Priority::High,
                reason: format!(
                    "High resource utilization: CPU {:.1}%, memory {:.1}% (average CPU {:.1}%)",
                    current.cpu, current.memory, avg_cpu
                ),
                recommendations,
            };
        }

        if assessment.level == UtilizationLevel::Low
            && avg_cpu < opts.scale_down_threshold
            && avg_memory < opts.scale_down_memory_ceiling
        {
            return Verdict {
                action: ScalingAction::ScaleDown,
                priority: Priority::Low,
                reason: format!(
                    "Sustained low resource utilization: CPU {:.1}%, memory {:.1}%",
                    current.cpu, current.memory
                ),
                recommendations: vec![
                    "Reduce instance count to cut infrastructure cost".to_string(),
                    format!(
                        "Keep at least {} instance(s) running for availability",
                        opts.min_instances
                    ),
                    "Re-evaluate after the next expected traffic peak".to_string(),
                ],
            };
        }

        if current.queue_length > opts.imbalance_queue_length
            && current.cpu < opts.imbalance_cpu_ceiling
        {
            return Verdict {
                action: ScalingAction::Rebalance,
                priority: Priority::Medium,
                reason: format!(
                    "Request queue building up despite spare CPU capacity ({:.1}%), \
                     suggesting uneven load distribution",
                    current.cpu
                ),
                recommendations: vec![
                    "Rebalance traffic across existing instances".to_string(),
                    "Check connection pooling configuration".to_string(),
                    "Review load balancer configuration".to_string(),
                    "Verify session affinity is not pinning traffic to few instances".to_string(),
                ],
            };
        }

        Verdict {
            action: ScalingAction::Maintain,
            priority: Priority::Low,
            reason: format!(
                "Resource utilization within normal parameters: CPU {:.1}%, memory {:.1}%",
                current.cpu, current.memory
            ),
            recommendations: vec![
                "Continue monitoring resource metrics".to_string(),
                "Review utilization trends for capacity planning".to_string(),
                "Optimize slow queries and cache hit rates".to_string(),
            ],
        }
    }
}
