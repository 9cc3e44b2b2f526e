use crab_sim::{SimConfig, SimState, Simulator, init_logger_with_file};
use shared::money::format_cents;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env 与配置
    dotenv::dotenv().ok();
    let config = SimConfig::from_env()?;

    // 2. 日志 (RUST_LOG 优先)
    let log_dir = config.log_dir();
    init_logger_with_file(Some(&config.log_level), config.log_json, Some(log_dir.as_path()));

    tracing::info!(
        work_dir = %config.work_dir.display(),
        start = %config.start_date,
        days = config.days,
        seed = config.seed,
        dry_run = config.is_dry_run(),
        policy = ?config.detection_policy,
        "🦀 Crab Sim starting..."
    );

    // 3. 初始化状态 (redb + gateway)
    let state = SimState::initialize(&config)?;

    // 4. 运行
    let simulator = Simulator::new(state);
    let report = match simulator.run(config.start_date, config.days).await {
        Ok(report) => report,
        Err(e) => {
            let code = e.code();
            tracing::error!(
                code = %code,
                category = code.category().name(),
                reason = code.message(),
                fatal = e.is_fatal(),
                retryable = e.is_retryable(),
                error = %e,
                "Simulation aborted"
            );
            return Err(e.into());
        }
    };

    let c = &report.counters;
    tracing::info!(
        created = report.reconcile.total_created(),
        failed = report.reconcile.total_failed(),
        "Reconciliation"
    );
    for (phase, counter) in [
        ("shifts", c.shifts),
        ("reservations", c.reservations),
        ("orders", c.orders),
        ("line_items", c.line_items),
        ("payments", c.payments),
        ("tips", c.tips),
        ("refunds", c.refunds),
    ] {
        tracing::info!(
            phase,
            success = counter.success_count,
            errors = counter.error_count,
            "Phase totals"
        );
    }

    let p = &report.period;
    tracing::info!(
        orders = p.total_orders,
        revenue = %format_cents(p.total_revenue),
        refunds = %format_cents(p.total_refunds),
        net = %format_cents(p.total_net_revenue),
        tips = %format_cents(p.total_tips),
        average = %p.average_order_value,
        busiest = ?p.busiest_day.as_ref().map(|b| b.date),
        "Period summary"
    );

    Ok(())
}
