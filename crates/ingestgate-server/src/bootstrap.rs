//! Wires every port to its concrete adapter and assembles [`AppState`]:
//! build each collaborator from config, log what got configured, and
//! degrade gracefully where that's tolerable (no stream publisher
//! credentials → noop).

use std::sync::Arc;

use ingestgate_cleaner::Cleaner;
use ingestgate_core::ports::{EventBusPublisher, FanOutPublisher, LiveTranscriptionProvider, StreamPublisher, TranscriptionProvider};
use ingestgate_db::{DbConfig, IntelligenceRepository, UploadJobRepository};
use ingestgate_identity::IdentityConfig;
use ingestgate_intelligence::{IntelligenceExtractor, IntelligencePersister};
use ingestgate_llm::client::HttpClientConfig;
use ingestgate_llm::openai::{OpenAiClient, OpenAiConfig};
use ingestgate_observability::metrics::Metrics;
use ingestgate_orchestrator::Orchestrator;
use ingestgate_publisher::{EventBridgeBusPublisher, FanOutPublisherImpl, KinesisStreamPublisher};
use ingestgate_transcription::{DeepgramConfig, DeepgramLiveConfig, DeepgramLiveTranscriptionProvider, DeepgramTranscriptionProvider};
use ingestgate_upload::{JobQueue, S3Config, S3ObjectStore, UploadJobService, UploadWorker};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::state::AppState;

pub struct Bootstrap {
    pub state: AppState,
    pub worker: Arc<UploadWorker>,
}

pub async fn bootstrap(config: &ServerConfig) -> anyhow::Result<Bootstrap> {
    let db_pool: PgPool = ingestgate_db::connect(&config.database_url, DbConfig::default()).await?;
    info!("connected to postgres");

    let identity_config = Arc::new(IdentityConfig {
        jwt_secret: config.internal_jwt_secret.clone(),
        jwt_issuer: config.internal_jwt_issuer.clone(),
        jwt_audience: config.internal_jwt_audience.clone(),
        allow_legacy_header_auth: config.allow_legacy_header_auth,
        mock_tenant_id: config.mock_tenant_id.clone(),
        mock_user_id: config.mock_user_id.clone(),
    });

    let metrics = Arc::new(Metrics::new()?);

    let llm_config = OpenAiConfig::from_env();
    let llm = Arc::new(OpenAiClient::new(llm_config)?) as Arc<dyn ingestgate_core::ports::LlmClient>;
    let cleaner = Arc::new(Cleaner::new(llm.clone(), metrics.clone()));

    let transcription_http = ingestgate_llm::client::create_client(&HttpClientConfig::default())?;
    let transcription: Arc<dyn TranscriptionProvider> = Arc::new(DeepgramTranscriptionProvider::new(
        transcription_http,
        DeepgramConfig::from_env(),
    ));
    let live_transcription: Arc<dyn LiveTranscriptionProvider> =
        Arc::new(DeepgramLiveTranscriptionProvider::new(DeepgramLiveConfig::from_env()));

    let session_buffer = ingestgate_session_buffer::build_from_env().await;

    let publisher = build_publisher(config).await;

    let intelligence_repo = IntelligenceRepository::new(db_pool.clone());
    let extractor = Arc::new(IntelligenceExtractor::new(llm.clone()));
    let persister = Arc::new(IntelligencePersister::new(intelligence_repo, llm.clone()));
    let orchestrator = Arc::new(Orchestrator::new(publisher, extractor, persister, metrics.clone()));

    let s3_config = S3Config {
        bucket: config.upload_bucket_name.clone(),
        region: config.upload_region.clone(),
    };
    let object_store: Arc<dyn ingestgate_core::ports::ObjectStore> =
        Arc::new(S3ObjectStore::from_env(s3_config).await);

    let (job_queue, job_queue_receiver) = JobQueue::new();
    let upload_repo = UploadJobRepository::new(db_pool.clone());
    let upload_jobs = Arc::new(UploadJobService::new(
        upload_repo.clone(),
        object_store,
        job_queue,
        metrics.clone(),
    ));

    let worker = Arc::new(UploadWorker::new(
        upload_repo,
        upload_jobs.clone(),
        transcription.clone(),
        cleaner.clone(),
        orchestrator.clone(),
        metrics.clone(),
    ));
    let worker_handle = worker.clone();
    tokio::spawn(async move { worker_handle.run(job_queue_receiver).await });
    info!("upload worker started");

    Ok(Bootstrap {
        state: AppState {
            identity_config,
            cleaner,
            transcription,
            live_transcription,
            session_buffer,
            orchestrator,
            upload_jobs,
            metrics,
            db_pool,
            detach_orchestrator_lanes: config.detach_orchestrator_lanes,
        },
        worker,
    })
}

/// The stream leg degrades to `None` (skipped with a warning at publish
/// time) when no stream name was ever configured; the bus leg is always
/// wired.
async fn build_publisher(config: &ServerConfig) -> Arc<dyn FanOutPublisher> {
    let stream: Option<Arc<dyn StreamPublisher>> = if config.kinesis_stream_name.is_empty() {
        warn!("no kinesis stream configured, stream publish will be skipped");
        None
    } else {
        Some(Arc::new(
            KinesisStreamPublisher::from_env(config.kinesis_stream_name.clone()).await,
        ))
    };

    let bus: Arc<dyn EventBusPublisher> = Arc::new(
        EventBridgeBusPublisher::from_env(config.eventbridge_bus_name.clone()).await,
    );

    Arc::new(FanOutPublisherImpl::new(stream, bus, config.event_source.clone()))
}
