use std::env;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use pushkind_common::models::config::CommonServerConfig;

use product_catalog::repository::DieselRepository;
use product_catalog::routes::products::{
    create_product_form, destroy_product, edit_product_form, index_products, multipart_config,
    show_product, store_product, update_product,
};
use product_catalog::storage::PublicDisk;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let database_url = env::var("DATABASE_URL").unwrap_or("app.db".to_string());
    let port = env::var("PORT").unwrap_or("8080".to_string());
    let port = port.parse::<u16>().unwrap_or(8080);
    let address = env::var("ADDRESS").unwrap_or("127.0.0.1".to_string());
    let storage_path = env::var("STORAGE_PATH").unwrap_or("storage/app/public".to_string());

    let secret = env::var("SECRET_KEY");
    let secret_key = match &secret {
        Ok(key) => Key::from(key.as_bytes()),
        Err(_) => Key::generate(),
    };

    let auth_service_url = match env::var("AUTH_SERVICE_URL") {
        Ok(auth_service_url) => auth_service_url,
        Err(_) => {
            log::error!("AUTH_SERVICE_URL environment variable not set");
            std::process::exit(1);
        }
    };

    let common_config = CommonServerConfig {
        secret: secret.unwrap_or_default(),
        auth_service_url,
    };

    let domain = env::var("DOMAIN").unwrap_or("localhost".to_string());

    let pool = match establish_connection_pool(&database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let disk = PublicDisk::new(storage_path);
    if let Err(e) = disk.ensure_root() {
        log::error!(
            "Failed to prepare public storage at {}: {e}",
            disk.root().display()
        );
        std::process::exit(1);
    }
    let public_root = disk.root().to_path_buf();

    log::info!("Starting product catalog on {address}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{domain}")))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/storage", public_root.clone()))
            .service(
                web::scope("/api")
                    .service(index_products)
                    .service(create_product_form)
                    .service(store_product)
                    .service(show_product)
                    .service(edit_product_form)
                    .service(update_product)
                    .service(destroy_product),
            )
            .app_data(multipart_config())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(disk.clone()))
            .app_data(web::Data::new(common_config.clone()))
    })
    .bind((address, port))?
    .run()
    .await
}
