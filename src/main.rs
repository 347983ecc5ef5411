use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

use rostrum::api::{AppState, configure_routes};
use rostrum::{banner, config, database};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Print the startup banner
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
        eprintln!("   Make sure GEMINI_API_KEY is set in your environment");
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = config::AppConfig::from_env()
        .expect("Failed to load app configuration from environment");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:rostrum.db".to_string());
    let db_pool = database::init_db(&database_url)
        .await
        .expect("Failed to initialize database");

    let state =
        AppState::new(app_config.clone(), db_pool).expect("Failed to build application state");

    println!(
        "🚀 Starting server on {}:{}",
        app_config.bind_addr, app_config.port
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind((app_config.bind_addr.as_str(), app_config.port))?
    .run()
    .await
}
