// src/session/handler.rs

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};

use crate::game::command::{self, ClientMessage};
use crate::session::manager::{JoinError, SessionManager};
use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.manager, session_id))
}

/// Протокол одного соединения: впуск, цикл команд, выход.
async fn handle_socket(socket: WebSocket, manager: SessionManager, session_id: String) {
    let (mut sender, mut receiver) = socket.split();

    // Почтовый ящик клиента: задача ниже пересылает все из rx в сокет,
    // поэтому рассылка под блокировкой реестра не ждет записи в сеть.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Message>();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let connection_id = match manager.join(&session_id, tx.clone()).await {
        Ok(connection_id) => connection_id,
        Err(JoinError::NotFound) => {
            // Молча закрываем: не раскрываем, какие id сессий существуют
            tracing::debug!("rejected connection to unknown session {}", session_id);
            return;
        }
        Err(JoinError::SessionFull) => {
            tracing::info!("rejected connection: session {} is full", session_id);
            let _ = tx.send(Message::Text(command::error_message("session is full")));
            // Закрываем канал — задача записи дошлет ошибку и закроет сокет
            drop(tx);
            let _ = send_task.await;
            return;
        }
    };

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => manager.apply(&session_id, client_msg).await,
                // Нечитаемый конверт: лог и дальше, соединение живет
                Err(err) => tracing::warn!("invalid message: {}", err),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Любой исход чтения — удаляем соединение из сессии
    manager.leave(&session_id, connection_id).await;
}
