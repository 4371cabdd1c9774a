// src/session/snapshot.rs

// Снапшоты — чистый best-effort: ни одна ошибка персистентности не должна
// заблокировать или уронить живой путь команд. Крах между двумя интервалами
// теряет максимум команды, примененные после последнего снапшота.

use crate::game::SceneState;
use crate::session::manager::{Session, SessionManager};
use tokio::sync::oneshot;

impl SessionManager {
    /// Восстанавливает сессии из хранилища. Вызывается на старте, до приема
    /// соединений. Битая запись логируется и пропускается, остальные
    /// восстанавливаются.
    pub async fn restore_sessions(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let snapshots = match store.load_all().await {
            Ok(snapshots) => snapshots,
            Err(err) => {
                tracing::warn!("failed to load snapshots: {}", err);
                return;
            }
        };

        let mut sessions = self.sessions.lock().await;
        for (session_id, state_json) in snapshots {
            match serde_json::from_str::<SceneState>(&state_json) {
                Ok(state) => {
                    sessions.insert(session_id.clone(), Session::restored(state));
                    tracing::info!("restored session {} from snapshot", session_id);
                }
                Err(err) => {
                    tracing::warn!("failed to deserialize snapshot for session {}: {}", session_id, err);
                }
            }
        }
    }

    /// Запускает фоновую задачу периодического сохранения.
    pub async fn start_periodic_snapshots(&self) {
        if self.store.is_none() {
            return;
        }

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        *self.snapshot_stop.lock().await = Some(stop_tx);

        let manager = self.clone();
        let mut ticker = tokio::time::interval(self.snapshot_interval);
        tokio::spawn(async move {
            // Первый tick у interval мгновенный — пропускаем
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => manager.save_all_snapshots().await,
                    _ = &mut stop_rx => break,
                }
            }
        });
    }

    /// Останавливает периодические снапшоты и делает финальный проход.
    pub async fn stop_periodic_snapshots(&self) {
        let stop_tx = self.snapshot_stop.lock().await.take();
        let Some(stop_tx) = stop_tx else {
            return;
        };
        let _ = stop_tx.send(());
        self.save_all_snapshots().await;
    }

    /// Сохраняет состояние каждой сессии. Копия пар (id, state) снимается
    /// под блокировкой, сериализация и I/O — уже снаружи, чтобы не держать
    /// обработку команд на время записи.
    pub async fn save_all_snapshots(&self) {
        let Some(store) = self.store.clone() else {
            return;
        };

        let snapshots: Vec<(String, SceneState)> = {
            let sessions = self.sessions.lock().await;
            sessions
                .iter()
                .map(|(id, session)| (id.clone(), session.state.clone()))
                .collect()
        };

        for (session_id, state) in snapshots {
            let state_json = match serde_json::to_string(&state) {
                Ok(json) => json,
                Err(err) => {
                    tracing::warn!("failed to serialize state for session {}: {}", session_id, err);
                    continue;
                }
            };
            if let Err(err) = store.save(&session_id, &state_json).await {
                tracing::warn!("failed to save snapshot for session {}: {}", session_id, err);
            }
        }
    }
}
