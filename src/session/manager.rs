// src/session/manager.rs

// Реестр сессий. Одна грубая блокировка на весь реестр: применение команды
// и рассылка выполняются под ней атомарно, поэтому все участники видят
// команды в едином общем порядке. Пропускная способность всех сессий
// сериализуется через этот lock — известное ограничение масштаба.

use axum::extract::ws::Message;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

use crate::config::Config;
use crate::game::command::{self, ClientMessage};
use crate::game::SceneState;
use crate::store::SnapshotStore;

/// Канал на клиента: запись в сокет выполняет отдельная задача,
/// поэтому send под блокировкой не ждет медленного клиента.
pub type ClientTx = UnboundedSender<Message>;

/// Окно, в течение которого пустая сессия еще может быть переподхвачена.
pub const CLEANUP_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Достигнут лимит сессий.
    CapacityExceeded,
    NotFound,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::CapacityExceeded => write!(f, "maximum number of sessions reached"),
            SessionError::NotFound => write!(f, "session not found"),
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, PartialEq, Eq)]
pub enum JoinError {
    /// Неизвестный id: соединение закрывается молча, без payload,
    /// чтобы не раскрывать, какие id существуют.
    NotFound,
    SessionFull,
}

pub struct Session {
    pub clients: HashMap<Uuid, ClientTx>,
    pub state: SceneState,
}

impl Session {
    fn new() -> Self {
        Self { clients: HashMap::new(), state: SceneState::new() }
    }

    pub(crate) fn restored(state: SceneState) -> Self {
        Self { clients: HashMap::new(), state }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub connected_clients: usize,
}

#[derive(Clone)]
pub struct SessionManager {
    pub(crate) sessions: Arc<Mutex<HashMap<String, Session>>>,
    max_sessions: usize,
    max_users_per_session: usize,
    pub(crate) store: Option<Arc<dyn SnapshotStore>>,
    pub(crate) snapshot_interval: Duration,
    pub(crate) snapshot_stop: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl SessionManager {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            max_sessions: config.max_sessions,
            max_users_per_session: config.max_users_per_session,
            store: None,
            snapshot_interval: Duration::from_secs(config.snapshot_interval_secs),
            snapshot_stop: Arc::new(Mutex::new(None)),
        }
    }

    /// Подключает хранилище снапшотов. Вызывается до клонирования менеджера.
    pub fn set_store(&mut self, store: Arc<dyn SnapshotStore>, interval: Duration) {
        self.store = Some(store);
        self.snapshot_interval = interval;
    }

    pub async fn create_session(&self) -> Result<String, SessionError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::CapacityExceeded);
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(id.clone(), Session::new());
        tracing::info!("session created: {}", id);
        Ok(id)
    }

    pub async fn get_session(&self, session_id: &str) -> Option<SessionSummary> {
        let sessions = self.sessions.lock().await;
        sessions.get(session_id).map(|session| SessionSummary {
            session_id: session_id.to_string(),
            connected_clients: session.clients.len(),
        })
    }

    /// Впускает соединение в сессию. Под одной блокировкой: проверка лимита
    /// строго до вставки, затем полное текущее состояние первым сообщением
    /// (синхронизация опоздавшего), затем регистрация канала. Никакое
    /// частичное состояние наружу не утекает.
    pub async fn join(&self, session_id: &str, tx: ClientTx) -> Result<Uuid, JoinError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(session_id).ok_or(JoinError::NotFound)?;

        if session.clients.len() >= self.max_users_per_session {
            return Err(JoinError::SessionFull);
        }

        match command::state_update_message(&session.state) {
            Ok(text) => {
                let _ = tx.send(Message::Text(text));
            }
            Err(err) => tracing::warn!("failed to serialize state: {}", err),
        }

        let connection_id = Uuid::new_v4();
        session.clients.insert(connection_id, tx);
        tracing::info!(
            "client joined session {} ({} connected)",
            session_id,
            session.clients.len()
        );
        Ok(connection_id)
    }

    /// Применяет команду и рассылает новое полное состояние всем клиентам
    /// сессии, включая отправителя. Состояние сериализуется один раз.
    pub async fn apply(&self, session_id: &str, msg: ClientMessage) {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(session_id) else {
            return;
        };

        command::apply(&msg, &mut session.state);

        let text = match command::state_update_message(&session.state) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("failed to serialize state: {}", err);
                return;
            }
        };
        for tx in session.clients.values() {
            let _ = tx.send(Message::Text(text.clone()));
        }
    }

    /// Убирает соединение. Опустевшая сессия не удаляется сразу: проверка
    /// повторяется после grace-паузы, переподключение в окне отменяет снос.
    pub async fn leave(&self, session_id: &str, connection_id: Uuid) {
        let remaining = {
            let mut sessions = self.sessions.lock().await;
            let Some(session) = sessions.get_mut(session_id) else {
                return;
            };
            session.clients.remove(&connection_id);
            tracing::info!(
                "client left session {} ({} connected)",
                session_id,
                session.clients.len()
            );
            session.clients.len()
        };

        if remaining == 0 {
            self.schedule_cleanup(session_id.to_string());
        }
    }

    fn schedule_cleanup(&self, session_id: String) {
        let manager = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(CLEANUP_GRACE).await;
            let mut sessions = manager.sessions.lock().await;
            let still_empty = sessions
                .get(&session_id)
                .map(|s| s.clients.is_empty())
                .unwrap_or(false);
            if still_empty {
                sessions.remove(&session_id);
                tracing::info!("session {} removed (no clients remaining)", session_id);
            }
        });
    }

    /// Сбрасывает реестр в пустое состояние.
    pub async fn reset(&self) {
        self.sessions.lock().await.clear();
    }
}
