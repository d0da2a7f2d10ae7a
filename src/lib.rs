use actix_web::web::{self, Data, JsonConfig, PathConfig, ServiceConfig};
use actix_web::{App, HttpResponse, HttpServer, ResponseError};
use mongodb::Client;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

pub mod audience;
pub mod auth;
pub mod campaign;
pub mod config;
pub mod database;
pub mod error;
pub mod ingest;
pub mod optimizer;
pub mod seed;
pub mod segment;
pub mod typedid;
pub mod utils;
pub mod validation;

pub use campaign::CampaignBody;
pub use segment::SegmentBody;

use crate::audience::{AudienceEstimator, PlaceholderEstimator};
use crate::config::{Config, DatabaseBackend};
use crate::database::{Database, MemoryDatabase, MongoDatabase};
use crate::error::Error;
use crate::ingest::IngestConfig;
use crate::optimizer::{CampaignOptimizer, GenerativeOptimizer, UnconfiguredOptimizer};

/// Everything the handlers pull out of the app data, shared by all workers.
#[derive(Clone)]
pub struct AppData {
    pub database: Data<Box<dyn Database>>,
    pub estimator: Data<Box<dyn AudienceEstimator>>,
    pub optimizer: Data<Box<dyn CampaignOptimizer>>,
    pub ingest: Data<IngestConfig>,
}

impl AppData {
    pub fn new(
        database: Box<dyn Database>,
        estimator: Box<dyn AudienceEstimator>,
        optimizer: Box<dyn CampaignOptimizer>,
        ingest: IngestConfig,
    ) -> AppData {
        AppData {
            database: Data::new(database),
            estimator: Data::new(estimator),
            optimizer: Data::new(optimizer),
            ingest: Data::new(ingest),
        }
    }

    pub fn configure(&self, cfg: &mut ServiceConfig) {
        cfg.app_data(self.database.clone())
            .app_data(self.estimator.clone())
            .app_data(self.optimizer.clone())
            .app_data(self.ingest.clone());

        configure(cfg);
    }
}

/// Registers every route along with the extractor error formats.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .service(segment::endpoints::create_segment)
    .service(segment::endpoints::get_segments)
    .service(segment::endpoints::get_segment_by_id)
    .service(segment::endpoints::edit_segment)
    .service(segment::endpoints::delete_segment)
    .service(campaign::endpoints::create_campaign)
    .service(campaign::endpoints::get_campaigns)
    .service(campaign::endpoints::get_campaign_by_id)
    .service(campaign::endpoints::edit_campaign)
    .service(campaign::endpoints::delete_campaign)
    .service(ingest::ingest_customers)
    .service(ingest::ingest_orders)
    .service(optimizer::optimize_campaign);
}

pub async fn path_not_found() -> HttpResponse {
    Error::PathNotFound.error_response()
}

async fn connect(config: &Config) -> Result<Box<dyn Database>, Error> {
    match config.database_backend {
        DatabaseBackend::Mongo => {
            info!("connecting to db: {}", config.database_uri);
            let db = Client::with_uri_str(&config.database_uri)
                .await?
                .database(&config.database_name);
            let db = MongoDatabase::initialize(db).await?;

            Ok(Box::new(db))
        }
        DatabaseBackend::Memory => {
            info!("using in-memory database");
            Ok(Box::new(MemoryDatabase::new()))
        }
    }
}

pub async fn run(config: Config) -> Result<(), Error> {
    let database = connect(&config).await?;

    if config.seed_data {
        seed::seed(&*database).await?;
    }

    let optimizer: Box<dyn CampaignOptimizer> = match &config.optimizer_url {
        Some(url) => Box::new(GenerativeOptimizer::new(
            url.clone(),
            config.optimizer_api_key.clone(),
        )),
        None => {
            warn!("OPTIMIZER_URL is not set, optimizer requests will be refused");
            Box::new(UnconfiguredOptimizer)
        }
    };

    let data = AppData::new(
        database,
        Box::new(PlaceholderEstimator),
        optimizer,
        IngestConfig {
            payload_limit: config.ingest_payload_limit,
        },
    );

    info!("listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(|cfg| data.configure(cfg))
            .default_service(web::to(path_not_found))
    })
    .bind(config.bind_address)?
    .run()
    .await?;

    Ok(())
}
