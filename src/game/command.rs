// src/game/command.rs

// Конверты сообщений и диспетчер команд. Диспетчер чистый: не трогает
// соединения, мутирует только переданный SceneState. Битый payload или
// неизвестный тип команды — лог и no-op, соединение не закрывается.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{AreaTemplate, SceneState, Token};

/// Входящее сообщение клиента: `{"type": ..., "payload": ...}`.
/// Payload опционален — команды без аргументов его не передают.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

#[derive(Serialize)]
struct Outbound<T> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: T,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    error: &'a str,
}

/// `{"type":"state_update","payload":<полное состояние сцены>}`.
/// Сериализуем один раз — дальше строка рассылается всем клиентам как есть.
pub fn state_update_message(state: &SceneState) -> serde_json::Result<String> {
    serde_json::to_string(&Outbound { kind: "state_update", payload: state })
}

/// `{"type":"error","payload":{"error":<текст>}}`.
pub fn error_message(error: &str) -> String {
    serde_json::to_string(&Outbound {
        kind: "error",
        payload: ErrorPayload { error },
    })
    // Структура из двух строк не может не сериализоваться
    .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub struct AddTokenPayload {
    pub id: String,
    pub token: Token,
}

#[derive(Debug, Deserialize)]
pub struct MovePayload {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct DeletePayload {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBackgroundPayload {
    pub image_path: String,
}

#[derive(Debug, Deserialize)]
pub struct AddAreaTemplatePayload {
    /// Пустой id — реестр генерирует свежий.
    #[serde(default)]
    pub id: String,
    pub template: AreaTemplate,
}

/// Применяет команду к состоянию сцены.
pub fn apply(msg: &ClientMessage, state: &mut SceneState) {
    match msg.kind.as_str() {
        "add_token" => {
            if let Some(p) = decode::<AddTokenPayload>(msg) {
                state.add_token(p.id, p.token);
            }
        }
        "move_token" => {
            if let Some(p) = decode::<MovePayload>(msg) {
                state.move_token(&p.id, p.x, p.y);
            }
        }
        "delete_token" => {
            if let Some(p) = decode::<DeletePayload>(msg) {
                state.delete_token(&p.id);
            }
        }
        "clear_tokens" => state.clear_tokens(),
        "change_background" => {
            if let Some(p) = decode::<ChangeBackgroundPayload>(msg) {
                state.set_background(p.image_path);
            }
        }
        "toggle_grid" => state.toggle_grid(),
        "add_area_template" => {
            if let Some(p) = decode::<AddAreaTemplatePayload>(msg) {
                let id = if p.id.is_empty() {
                    Uuid::new_v4().to_string()
                } else {
                    p.id
                };
                state.add_area_template(id, p.template);
            }
        }
        "move_area_template" => {
            if let Some(p) = decode::<MovePayload>(msg) {
                state.move_area_template(&p.id, p.x, p.y);
            }
        }
        "delete_area_template" => {
            if let Some(p) = decode::<DeletePayload>(msg) {
                state.delete_area_template(&p.id);
            }
        }
        "clear_area_templates" => state.clear_area_templates(),
        other => {
            tracing::debug!("unknown command type: {}", other);
        }
    }
}

fn decode<T: DeserializeOwned>(msg: &ClientMessage) -> Option<T> {
    let value = msg.payload.clone().unwrap_or(Value::Null);
    match serde_json::from_value(value) {
        Ok(payload) => Some(payload),
        Err(err) => {
            tracing::warn!("dropping malformed {} payload: {}", msg.kind, err);
            None
        }
    }
}
