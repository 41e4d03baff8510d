use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use timeclock_be::database::{
    init_database,
    repositories::{AttendanceRepository, ClockRepository, ShiftRepository},
};
use timeclock_be::handlers::{clock, reports, shifts};
use timeclock_be::middleware::RequestIdMiddleware;
use timeclock_be::{ClockCodeService, Config};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Timeclock API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Initialize repositories and services
    let shift_repository = ShiftRepository::new(pool.clone());
    let clock_repository = ClockRepository::new(pool.clone());
    let attendance_repository = AttendanceRepository::new(pool.clone());
    let clock_code_service = ClockCodeService::new(
        config.clock_code_secret.as_bytes(),
        config.clock_code_ttl_seconds,
    );

    let shift_repo_data = web::Data::new(shift_repository);
    let clock_repo_data = web::Data::new(clock_repository);
    let attendance_repo_data = web::Data::new(attendance_repository);
    let clock_code_data = web::Data::new(clock_code_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(shift_repo_data.clone())
            .app_data(clock_repo_data.clone())
            .app_data(attendance_repo_data.clone())
            .app_data(clock_code_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/shifts")
                            .route("", web::post().to(shifts::create_shifts))
                            .route("", web::get().to(shifts::get_shifts))
                            .route("/settings", web::get().to(shifts::get_shift_settings))
                            .route("/settings", web::put().to(shifts::update_shift_settings))
                            .route("/{id}", web::get().to(shifts::get_shift))
                            .route("/{id}", web::put().to(shifts::update_shift)),
                    )
                    .service(
                        web::scope("/clock")
                            .route("/rules/{clock_id}", web::put().to(clock::update_clock_rules))
                            .route("/{shift_id}/clock-in", web::post().to(clock::clock_in))
                            .route("/{shift_id}/clock-out", web::post().to(clock::clock_out))
                            .route("/{shift_id}/clocks", web::get().to(clock::get_shift_clocks))
                            .route("/{shift_id}/code", web::get().to(clock::generate_clock_code))
                            .route(
                                "/{shift_id}/code/clock-in",
                                web::post().to(clock::clock_in_with_code),
                            ),
                    )
                    .service(
                        web::scope("/reports")
                            .route("/adherence", web::get().to(reports::get_shift_adherence))
                            .route("/clocked-in", web::get().to(reports::get_clocked_in_count))
                            .route(
                                "/timing-issues",
                                web::get().to(reports::get_shift_timing_issues),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
