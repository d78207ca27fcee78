//! Replicated, event-sourced key store.

use crate::config::KeyStoreConfig;
use crate::error::{KmsError, KmsResult};
use crate::fold::apply_command;
use crate::log::CommandLog;
use crate::provider::{DecryptingMaterialsProvider, EncryptingMaterialsProvider};
use crate::view::KeyView;
use async_trait::async_trait;
use shroud_crypto::KeyGenerator;
use shroud_types::{KmsCommand, SubjectId, SubjectKeyAggregate, SymmetricMaterial};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const FETCH_BATCH: usize = 64;

/// Per-subject symmetric key registry backed by a replicated command log.
///
/// A background projector folds log commands into a local materialized
/// view and mirrors it into a global view; `open` blocks until the views
/// have caught up with the log (bounded by `startup.timeout_ms`).
///
/// The create path is optimistic: a fresh key is returned immediately
/// after its `Register` command is appended, and the fold reconciles
/// races in log order. Readers on other nodes may briefly observe
/// `NotFound` for a just-created subject; the creating caller owns the
/// key it used, so this is acceptable.
pub struct ReplicatedKeyStore {
    config: KeyStoreConfig,
    key_generator: Arc<dyn KeyGenerator>,
    log: Arc<dyn CommandLog>,
    global: KeyView,
    position: Arc<AtomicU64>,
    shutdown_tx: watch::Sender<bool>,
    projector: Mutex<Option<JoinHandle<()>>>,
}

impl ReplicatedKeyStore {
    /// Opens the store: spawns the projector and waits on the startup
    /// barrier until the views are caught up.
    pub async fn open(
        config: KeyStoreConfig,
        key_generator: Arc<dyn KeyGenerator>,
        log: Arc<dyn CommandLog>,
    ) -> KmsResult<Self> {
        let local = KeyView::new(&config.local_store_name);
        let global = KeyView::new(&config.global_store_name);
        let position = Arc::new(AtomicU64::new(0));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = oneshot::channel();

        let projector = tokio::spawn(run_projector(
            Arc::clone(&log),
            local,
            global.clone(),
            Arc::clone(&position),
            Duration::from_millis(config.poll_interval_ms),
            shutdown_rx,
            ready_tx,
        ));

        let store = Self {
            config,
            key_generator,
            log,
            global,
            position,
            shutdown_tx,
            projector: Mutex::new(Some(projector)),
        };

        let timeout = Duration::from_millis(store.config.startup_timeout_ms);
        match tokio::time::timeout(timeout, ready_rx).await {
            Ok(Ok(())) => {
                info!(
                    topic = %store.config.commands_topic,
                    "key store caught up with command log"
                );
                Ok(store)
            }
            _ => {
                store.close().await;
                Err(KmsError::StartupTimeout {
                    timeout_ms: store.config.startup_timeout_ms,
                })
            }
        }
    }

    /// Returns the subject's existing material, or generates one,
    /// appends its `Register` command, and returns it optimistically.
    pub async fn encryption_key_for(&self, subject: &SubjectId) -> KmsResult<SymmetricMaterial> {
        if let Some(material) = self.global.current_material(subject).await {
            return Ok(material);
        }

        let material = self.key_generator.generate();
        let command = KmsCommand::Register {
            material: material.clone(),
        };
        self.log.append(subject, serde_json::to_vec(&command)?).await?;
        debug!(subject = %subject, material_id = %material.id(), "registered new key material");
        Ok(material)
    }

    /// Reads the subject's material from the view; never creates.
    pub async fn decryption_key_for(&self, subject: &SubjectId) -> KmsResult<SymmetricMaterial> {
        self.global
            .current_material(subject)
            .await
            .ok_or_else(|| KmsError::DecryptingMaterialNotFound {
                subject: subject.to_string(),
            })
    }

    /// Appends a `Forget` command, cryptographically erasing the
    /// subject's material once folded.
    pub async fn forget(&self, subject: &SubjectId) -> KmsResult<()> {
        self.log
            .append(subject, serde_json::to_vec(&KmsCommand::Forget)?)
            .await?;
        info!(subject = %subject, "forget command appended");
        Ok(())
    }

    /// Waits until the views reflect every command appended so far.
    ///
    /// Bounded by the startup timeout. Intended for shutdown drains and
    /// tests that assert on steady state.
    pub async fn synchronize(&self) -> KmsResult<()> {
        let target = self.log.end_offset().await?;
        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(self.config.startup_timeout_ms);

        while self.position.load(Ordering::Acquire) < target {
            if tokio::time::Instant::now() >= deadline {
                return Err(KmsError::StartupTimeout {
                    timeout_ms: self.config.startup_timeout_ms,
                });
            }
            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }
        Ok(())
    }

    /// The globally-replicated view. Read-only projection; the
    /// projector is the only writer.
    pub fn global_view(&self) -> &KeyView {
        &self.global
    }

    /// Orderly stop of the producer and the projector.
    pub async fn close(&self) {
        debug!("stopping key store [producer, projector]");
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.projector.lock().await.take() {
            let _ = handle.await;
        }
        info!("key store stopped");
    }
}

#[async_trait]
impl EncryptingMaterialsProvider for ReplicatedKeyStore {
    async fn encryption_key_for(&self, subject: &SubjectId) -> KmsResult<SymmetricMaterial> {
        ReplicatedKeyStore::encryption_key_for(self, subject).await
    }
}

#[async_trait]
impl DecryptingMaterialsProvider for ReplicatedKeyStore {
    async fn decryption_key_for(&self, subject: &SubjectId) -> KmsResult<SymmetricMaterial> {
        ReplicatedKeyStore::decryption_key_for(self, subject).await
    }
}

/// Projector loop: drains the log into the local view and mirrors each
/// folded aggregate into the global view. Signals `ready` once the
/// records present at startup have been consumed.
async fn run_projector(
    log: Arc<dyn CommandLog>,
    local: KeyView,
    global: KeyView,
    position: Arc<AtomicU64>,
    poll_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
    ready_tx: oneshot::Sender<()>,
) {
    let startup_target = match log.end_offset().await {
        Ok(end) => end,
        Err(e) => {
            warn!("command log unavailable at startup: {e}");
            // Startup barrier will time out if this never recovers.
            u64::MAX
        }
    };
    let mut ready = Some(ready_tx);

    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let next = position.load(Ordering::Acquire);
                let records = match log.fetch(next, FETCH_BATCH).await {
                    Ok(records) => records,
                    Err(e) => {
                        warn!("command log fetch failed, will retry: {e}");
                        continue;
                    }
                };

                for record in records {
                    match serde_json::from_slice::<KmsCommand>(&record.payload) {
                        Ok(command) => {
                            let current = local
                                .get(&record.subject)
                                .await
                                .unwrap_or_else(|| SubjectKeyAggregate::empty(record.subject.clone()));
                            let folded = apply_command(&current, &command);
                            local.put(folded.clone()).await;
                            global.put(folded).await;
                        }
                        Err(e) => {
                            warn!(
                                subject = %record.subject,
                                offset = record.offset,
                                "skipping undecodable command: {e}"
                            );
                        }
                    }
                    position.store(record.offset + 1, Ordering::Release);
                }

                if ready.is_some() && position.load(Ordering::Acquire) >= startup_target {
                    if let Some(tx) = ready.take() {
                        let _ = tx.send(());
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    debug!("key store projector stopped");
}
