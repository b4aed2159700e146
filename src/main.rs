use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parlour::cli::{Cli, Command};
use parlour::config::{database, AppConfig, Config, GatewayConfig};
use parlour::core::error::{json_error_handler, query_error_handler};
use parlour::core::SalonClock;
use parlour::gateways::{GatewayService, RazorpayClient};
use parlour::middleware::{generate_api_key, new_admin_key, AdminKeyStore, RateLimiter, RequestId};
use parlour::{AppServices, Repositories};

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    init_tracing(&config.app);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(config).await,
        Command::FixCancelledRefunds { dry_run } => fix_cancelled_refunds(config, dry_run).await,
        Command::ProcessRefund { booking_id } => process_refund(config, &booking_id).await,
        Command::CreateAdminKey { label } => create_admin_key(config, &label).await,
    }
}

fn init_tracing(app: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("parlour={},actix_web=info", app.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if app.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn razorpay_gateways() -> Result<GatewayService> {
    let gateway_config =
        GatewayConfig::razorpay_from_env().context("Razorpay is not configured")?;
    let mut gateways = GatewayService::new();
    gateways.register_gateway(Arc::new(RazorpayClient::new(&gateway_config)?));
    Ok(gateways)
}

async fn serve(config: Config) -> Result<()> {
    tracing::info!(env = %config.app.env, "Starting parlour");

    let pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;
    tracing::info!(
        pool_size = config.database.pool_size,
        "Database pool initialized"
    );

    let services = AppServices::new(
        Repositories::mysql(&pool),
        razorpay_gateways()?,
        config.salon.default_currency,
    );
    let limiter = RateLimiter::new(config.security.rate_limit_per_minute)?;
    let cors_origin = config.security.cors_allowed_origin.clone();
    let bind_address = config.server.bind_address();

    let server = HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
            None => Cors::default(),
        };
        let services = services.clone();
        let limiter = limiter.clone();

        App::new()
            .wrap(cors)
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .configure(move |cfg| services.configure(cfg, limiter))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!(address = %bind_address, "Server started");
    server.await.context("Server error")
}

async fn migrate(config: Config) -> Result<()> {
    let pool = config.database.create_pool().await?;
    database::run_migrations(&pool)
        .await
        .context("Migration failed")?;
    tracing::info!("Migrations applied");
    Ok(())
}

/// Per-booking failures are reported but do not fail the command
async fn fix_cancelled_refunds(config: Config, dry_run: bool) -> Result<()> {
    let pool = config.database.create_pool().await?;
    let clock = config.salon.clock()?;
    let services = AppServices::new(
        Repositories::mysql(&pool),
        GatewayService::new(),
        config.salon.default_currency,
    );

    let summary = services.refunds.recalculate_cancelled(dry_run).await?;

    for adjustment in &summary.adjustments {
        println!(
            "{} {}: refund {} -> {} ({}), fee {}",
            if dry_run { "would update" } else { "updated" },
            adjustment.booking_id,
            adjustment
                .previous_refund_amount
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
            adjustment.refund_amount,
            adjustment.refund_status,
            adjustment.cancellation_fee,
        );
    }
    println!(
        "[{}] examined {}, updated {}, unchanged {}, failed {}{}",
        clock.format_local(chrono::Utc::now()),
        summary.examined,
        summary.updated,
        summary.unchanged,
        summary.failed,
        if dry_run { " (dry run)" } else { "" },
    );

    Ok(())
}

/// Exits non-zero when the gateway call fails; no retry
async fn process_refund(config: Config, booking_id: &str) -> Result<()> {
    let pool = config.database.create_pool().await?;
    let clock: SalonClock = config.salon.clock()?;
    let services = AppServices::new(
        Repositories::mysql(&pool),
        razorpay_gateways()?,
        config.salon.default_currency,
    );

    let booking = services
        .refunds
        .process_refund(booking_id)
        .await
        .with_context(|| format!("Refund for booking {} failed", booking_id))?;

    println!(
        "Refunded {} for booking {} (refund {}) at {}",
        booking.currency.format_amount(booking.refund_amount.unwrap_or_default()),
        booking_id,
        booking.refund_transaction_id.as_deref().unwrap_or("-"),
        booking
            .refunded_at
            .map(|t| clock.format_local(t))
            .unwrap_or_default(),
    );
    Ok(())
}

async fn create_admin_key(config: Config, label: &str) -> Result<()> {
    let pool = config.database.create_pool().await?;
    let repos = Repositories::mysql(&pool);

    let api_key = generate_api_key();
    let record = new_admin_key(&api_key, label)?;
    repos.admin_keys.create(&record).await?;

    tracing::info!(key_id = %record.id, label = %label, "Admin API key created");
    println!("{}", api_key);
    Ok(())
}
