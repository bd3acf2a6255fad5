use std::any::Any;

use diesel::SqliteConnection;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use fund_core::errors::{DatabaseError, Error, Result};

/// A write job run against the writer's dedicated connection.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type AnyResult = Result<Box<dyn Any + Send + 'static>>;
type Envelope = (Job<Box<dyn Any + Send + 'static>>, oneshot::Sender<AnyResult>);

/// Queue capacity of the writer actor.
const WRITE_QUEUE_SIZE: usize = 256;

/// Handle to the single writer task.
///
/// Every job runs inside its own `IMMEDIATE` transaction, so a job is the
/// unit of atomicity: an error returned by the closure rolls back everything
/// it wrote.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<Envelope>,
}

fn actor_gone() -> Error {
    Error::Database(DatabaseError::ConnectionFailed(
        "database writer is not running".to_string(),
    ))
}

impl WriteHandle {
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let erased: Job<Box<dyn Any + Send + 'static>> =
            Box::new(move |conn| job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>));

        self.tx
            .send((erased, reply_tx))
            .await
            .map_err(|_| actor_gone())?;

        let boxed = reply_rx.await.map_err(|_| actor_gone())??;
        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "writer returned an unexpected result type".to_string(),
            ))
        })
    }
}

/// Spawns the writer task on the current tokio runtime.
///
/// The task owns one pooled connection for its whole life and processes jobs
/// one at a time. It stops when every `WriteHandle` has been dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(WRITE_QUEUE_SIZE);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Database writer could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: AnyResult = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);
            if let Err(e) = &result {
                debug!("Write job rolled back: {}", e);
            }
            // The caller may have gone away; nothing to report to.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
