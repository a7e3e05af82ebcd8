//! Pool sizing and cache budgeting commands

use allocator_lib::{CacheAllocationPlan, CacheAllocator, ConnectionPoolSizer, PoolSizeRecommendation};
use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use super::CommandContext;
use crate::output::{self, OutputFormat};

#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "Bound")]
    bound: &'static str,
    #[tabled(rename = "Connections")]
    connections: u64,
}

#[derive(Serialize)]
struct PoolOutput {
    concurrent_users: u32,
    avg_queries_per_user: f64,
    #[serde(flatten)]
    pool: PoolSizeRecommendation,
}

/// Size a connection pool; arguments override the configured workload
pub fn run_pool(
    ctx: &CommandContext,
    users: Option<u32>,
    queries_per_user: Option<f64>,
) -> Result<()> {
    let settings = &ctx.config.pool;
    let concurrent_users = users.unwrap_or(settings.concurrent_users);
    let avg_queries_per_user = queries_per_user.unwrap_or(settings.avg_queries_per_user);

    let pool = ConnectionPoolSizer::with_config(settings.sizing)
        .size(concurrent_users, avg_queries_per_user);
    ctx.metrics.record_pool_size(&pool);
    ctx.logger
        .log_pool_sizing(concurrent_users, avg_queries_per_user, &pool);

    match ctx.format {
        OutputFormat::Json => output::print_json(&PoolOutput {
            concurrent_users,
            avg_queries_per_user,
            pool,
        })?,
        OutputFormat::Table => {
            output::print_info(&format!(
                "{} concurrent users at {:.1} queries each",
                concurrent_users, avg_queries_per_user
            ));
            let rows = [
                PoolRow {
                    bound: "min",
                    connections: pool.min,
                },
                PoolRow {
                    bound: "recommended",
                    connections: pool.recommended,
                },
                PoolRow {
                    bound: "max",
                    connections: pool.max,
                },
            ];
            output::print_table(&rows, "No pool bounds");
            if pool.demand < pool.recommended {
                output::print_warning(&format!(
                    "Demand of {} connection(s) raised to the pool floor",
                    pool.demand
                ));
            }
        }
    }

    Ok(())
}

/// Arguments for cache budgeting
pub struct CacheArgs {
    pub total_mb: Option<f64>,
    pub types: Vec<String>,
    pub normalize: bool,
    pub strict: bool,
}

#[derive(Tabled)]
struct CacheRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Share")]
    share: String,
}

#[derive(Serialize)]
struct CacheOutput<'a> {
    total_memory_mb: f64,
    available_mb: f64,
    allocated_mb: f64,
    overcommitted: bool,
    allocations: &'a CacheAllocationPlan,
}

/// Split a memory budget across cache categories
pub fn run_cache(ctx: &CommandContext, args: CacheArgs) -> Result<()> {
    let settings = &ctx.config.cache;
    let total_memory_mb = args.total_mb.unwrap_or(settings.total_memory_mb);
    let types = if args.types.is_empty() {
        settings.types.clone()
    } else {
        args.types
    };

    let allocator = CacheAllocator::with_config(settings.allocation.clone());
    if args.strict {
        allocator
            .validate_request(total_memory_mb, &types)
            .map_err(|err| {
                ctx.logger.log_invalid_input("cache", &err);
                err
            })?;
    }

    let plan = if args.normalize {
        allocator.allocate_normalized(total_memory_mb, &types)
    } else {
        allocator.allocate(total_memory_mb, &types)
    };
    let available_mb = allocator.available_mb(total_memory_mb);
    let overcommitted = plan.is_overcommitted(available_mb);

    ctx.metrics.record_cache_plan(&plan);
    ctx.logger
        .log_cache_plan(total_memory_mb, available_mb, &plan);

    match ctx.format {
        OutputFormat::Json => output::print_json(&CacheOutput {
            total_memory_mb,
            available_mb,
            allocated_mb: plan.total_mb(),
            overcommitted,
            allocations: &plan,
        })?,
        OutputFormat::Table => {
            let rows: Vec<CacheRow> = plan
                .iter()
                .map(|(category, megabytes)| CacheRow {
                    category: category.to_string(),
                    budget: output::format_mb(megabytes),
                    share: if available_mb > 0.0 {
                        output::format_percent(megabytes / available_mb * 100.0)
                    } else {
                        "-".to_string()
                    },
                })
                .collect();
            output::print_table(&rows, "No cache categories requested");
            println!(
                "Allocated {} of {} available ({} total)",
                output::format_mb(plan.total_mb()),
                output::format_mb(available_mb),
                output::format_mb(total_memory_mb)
            );
            if overcommitted {
                output::print_warning(
                    "Plan exceeds available memory; use --normalize to rescale weights",
                );
            } else {
                output::print_success("Plan fits within available memory");
            }
        }
    }

    Ok(())
}
