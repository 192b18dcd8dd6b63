use crate::config::mongo_conf::MongoConfig;
use crate::model::{FormKind, SubmissionRecord};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use mongodb::{options::IndexOptions, Database, IndexModel};
use tracing::{debug, error, info, instrument, warn};

/// Durable store for accepted submissions, one collection per form kind.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Store a new record and return it with its identity and creation time set.
    async fn insert(&self, record: SubmissionRecord) -> RepositoryResult<SubmissionRecord>;
    async fn count(&self, kind: FormKind) -> RepositoryResult<u64>;
}

pub struct MongoSubmissionRepository {
    db: Database,
}

impl MongoSubmissionRepository {
    /// Connect using MongoConfig, check the server answers and make sure every
    /// collection exists. Running it again against an initialised database is a no-op.
    pub async fn new(config: &MongoConfig) -> RepositoryResult<Self> {
        use mongodb::{options::{ClientOptions, Credential, ResolverConfig}, Client};

        let mut client_options = ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
        client_options.app_name = Some("NoteEaseBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout = Some(config.connection_timeout());
        client_options.server_selection_timeout = Some(config.connection_timeout());

        if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
            client_options.credential = Some(Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build());
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);

        // An unreachable server is a startup error.
        db.run_command(doc! { "ping": 1 }, None).await.map_err(|e| {
            error!("MongoDB ping failed: {}", e);
            RepositoryError::connection(format!("MongoDB is unreachable: {}", e))
        })?;
        info!(database = %config.database, "Connected to MongoDB");

        let repo = MongoSubmissionRepository { db };
        repo.ensure_collections().await?;
        Ok(repo)
    }

    #[instrument(skip(self))]
    async fn ensure_collections(&self) -> RepositoryResult<()> {
        let existing = self.db.list_collection_names(None).await?;
        for kind in FormKind::ALL {
            let name = kind.collection_name();
            if existing.iter().any(|c| c == name) {
                debug!("Collection '{}' already exists", name);
            } else {
                warn!("Collection '{}' does not exist, creating it", name);
                self.db.create_collection(name, None).await?;
            }

            let index = IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(IndexOptions::builder().name("created_at_desc".to_string()).build())
                .build();
            self.db.collection::<Document>(name).create_index(index, None).await?;
        }
        info!("Submission collections ready");
        Ok(())
    }
}

fn to_document(record: &SubmissionRecord) -> RepositoryResult<Document> {
    let document = match record {
        SubmissionRecord::Contact(r) => bson::to_document(r)?,
        SubmissionRecord::WriterApplication(r) => bson::to_document(r)?,
        SubmissionRecord::GenericRequest(r) => bson::to_document(r)?,
    };
    Ok(document)
}

#[async_trait]
impl SubmissionRepository for MongoSubmissionRepository {
    #[instrument(skip(self, record), fields(kind = %record.kind()))]
    async fn insert(&self, record: SubmissionRecord) -> RepositoryResult<SubmissionRecord> {
        let kind = record.kind();
        info!("Storing new {} submission", kind);

        let mut new_record = record;
        new_record.assign_identity(ObjectId::new(), chrono::Utc::now());
        let document = to_document(&new_record)?;

        let result = self
            .db
            .collection::<Document>(kind.collection_name())
            .insert_one(document, None)
            .await;
        match result {
            Ok(_) => {
                info!(id = ?new_record.id(), "Submission stored successfully");
                Ok(new_record)
            }
            Err(e) => {
                error!("Failed to store {} submission: {}", kind, e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn count(&self, kind: FormKind) -> RepositoryResult<u64> {
        let count = self
            .db
            .collection::<Document>(kind.collection_name())
            .count_documents(None, None)
            .await?;
        debug!("{} stored {} submissions", kind, count);
        Ok(count)
    }
}
