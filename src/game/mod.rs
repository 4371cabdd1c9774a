// src/game/mod.rs

// Модель сцены: токены, шаблоны областей, фон и сетка.
// Все мутации тотальны: операция над несуществующим id — тихий no-op.

pub mod command;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Фон, который получает каждая новая сессия.
pub const DEFAULT_BACKGROUND: &str = "/assets/default/maps/tavern.jpg";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Token {
    pub name: String,
    pub image_path: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Circle,
    Square,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AreaTemplate {
    pub shape: Shape,
    pub x: f64,
    pub y: f64,
    /// Размер в клетках сетки.
    pub size: f64,
    /// Hex-цвет, например "#ff0000".
    pub color: String,
    /// От 0.0 до 1.0.
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneState {
    // default — чтобы старые снапшоты без этих полей восстанавливались с пустыми картами
    #[serde(default)]
    pub tokens: HashMap<String, Token>,
    pub background_image_path: String,
    pub show_grid: bool,
    pub grid_unit: f64,
    #[serde(default)]
    pub area_templates: HashMap<String, AreaTemplate>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            tokens: HashMap::new(),
            background_image_path: DEFAULT_BACKGROUND.to_string(),
            show_grid: true,
            grid_unit: 96.0,
            area_templates: HashMap::new(),
        }
    }
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&mut self, id: String, token: Token) {
        self.tokens.insert(id, token);
    }

    pub fn move_token(&mut self, id: &str, x: f64, y: f64) {
        if let Some(token) = self.tokens.get_mut(id) {
            token.x = x;
            token.y = y;
        }
    }

    pub fn delete_token(&mut self, id: &str) {
        self.tokens.remove(id);
    }

    pub fn clear_tokens(&mut self) {
        self.tokens.clear();
    }

    pub fn set_background(&mut self, path: String) {
        self.background_image_path = path;
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }

    pub fn add_area_template(&mut self, id: String, template: AreaTemplate) {
        self.area_templates.insert(id, template);
    }

    pub fn move_area_template(&mut self, id: &str, x: f64, y: f64) {
        if let Some(template) = self.area_templates.get_mut(id) {
            template.x = x;
            template.y = y;
        }
    }

    pub fn delete_area_template(&mut self, id: &str) {
        self.area_templates.remove(id);
    }

    pub fn clear_area_templates(&mut self) {
        self.area_templates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_defaults() {
        let s = SceneState::new();

        assert!(s.tokens.is_empty());
        assert_eq!(s.background_image_path, "/assets/default/maps/tavern.jpg");
        assert!(s.show_grid);
        assert_eq!(s.grid_unit, 96.0);
        assert!(s.area_templates.is_empty());
    }

    #[test]
    fn add_token_inserts() {
        let mut s = SceneState::new();
        let token = Token {
            name: "Goblin".into(),
            image_path: "/goblin.jpg".into(),
            x: 96.0,
            y: 96.0,
            size: 96.0,
        };

        s.add_token("t1".into(), token);

        assert_eq!(s.tokens.len(), 1);
        let got = &s.tokens["t1"];
        assert_eq!(got.name, "Goblin");
        assert_eq!((got.x, got.y), (96.0, 96.0));
    }

    #[test]
    fn move_token_updates_position() {
        let mut s = SceneState::new();
        s.add_token(
            "t1".into(),
            Token {
                name: "Goblin".into(),
                x: 96.0,
                y: 96.0,
                size: 96.0,
                ..Default::default()
            },
        );

        s.move_token("t1", 200.0, 300.0);

        let got = &s.tokens["t1"];
        assert_eq!((got.x, got.y), (200.0, 300.0));
    }

    #[test]
    fn move_nonexistent_token_is_noop() {
        let mut s = SceneState::new();

        s.move_token("does-not-exist", 100.0, 100.0);

        assert!(s.tokens.is_empty(), "no entry must be created");
    }

    #[test]
    fn delete_token_keeps_others() {
        let mut s = SceneState::new();
        s.add_token("t1".into(), Token { name: "Goblin".into(), ..Default::default() });
        s.add_token("t2".into(), Token { name: "Orc".into(), ..Default::default() });

        s.delete_token("t1");

        assert_eq!(s.tokens.len(), 1);
        assert!(!s.tokens.contains_key("t1"));
        assert!(s.tokens.contains_key("t2"));
    }

    #[test]
    fn delete_nonexistent_token_is_noop() {
        let mut s = SceneState::new();
        let before = s.clone();

        s.delete_token("nope");

        assert_eq!(s, before);
    }

    #[test]
    fn clear_tokens_empties_map() {
        let mut s = SceneState::new();
        s.add_token("t1".into(), Token::default());
        s.add_token("t2".into(), Token::default());
        s.add_token("t3".into(), Token::default());

        s.clear_tokens();

        assert!(s.tokens.is_empty());
    }

    #[test]
    fn set_background_replaces_path() {
        let mut s = SceneState::new();

        s.set_background("/assets/default/maps/forest.jpg".into());

        assert_eq!(s.background_image_path, "/assets/default/maps/forest.jpg");
    }

    #[test]
    fn toggle_grid_flips_both_ways() {
        let mut s = SceneState::new();
        assert!(s.show_grid);

        s.toggle_grid();
        assert!(!s.show_grid);

        s.toggle_grid();
        assert!(s.show_grid);
    }

    #[test]
    fn add_area_template_inserts() {
        let mut s = SceneState::new();
        let tmpl = AreaTemplate {
            shape: Shape::Circle,
            x: 192.0,
            y: 288.0,
            size: 3.0,
            color: "#ff0000".into(),
            opacity: 0.5,
        };

        s.add_area_template("at1".into(), tmpl);

        assert_eq!(s.area_templates.len(), 1);
        let got = &s.area_templates["at1"];
        assert_eq!(got.shape, Shape::Circle);
        assert_eq!(got.color, "#ff0000");
        assert_eq!(got.opacity, 0.5);
    }

    #[test]
    fn move_area_template_keeps_other_fields() {
        let mut s = SceneState::new();
        s.add_area_template(
            "at1".into(),
            AreaTemplate {
                shape: Shape::Square,
                x: 96.0,
                y: 96.0,
                size: 2.0,
                color: "#00ff00".into(),
                opacity: 0.3,
            },
        );

        s.move_area_template("at1", 384.0, 480.0);

        let got = &s.area_templates["at1"];
        assert_eq!((got.x, got.y), (384.0, 480.0));
        assert_eq!(got.shape, Shape::Square);
        assert_eq!(got.color, "#00ff00");
    }

    #[test]
    fn move_nonexistent_area_template_is_noop() {
        let mut s = SceneState::new();

        s.move_area_template("does-not-exist", 100.0, 100.0);

        assert!(s.area_templates.is_empty());
    }

    #[test]
    fn delete_area_template_keeps_others() {
        let mut s = SceneState::new();
        s.add_area_template("at1".into(), AreaTemplate::default());
        s.add_area_template("at2".into(), AreaTemplate::default());

        s.delete_area_template("at1");

        assert_eq!(s.area_templates.len(), 1);
        assert!(s.area_templates.contains_key("at2"));
    }

    #[test]
    fn clear_area_templates_empties_map() {
        let mut s = SceneState::new();
        s.add_area_template("at1".into(), AreaTemplate::default());
        s.add_area_template("at2".into(), AreaTemplate::default());

        s.clear_area_templates();

        assert!(s.area_templates.is_empty());
    }

    #[test]
    fn scene_state_restores_missing_maps_as_empty() {
        // Снапшот старого формата: без tokens и areaTemplates
        let old = r#"{"backgroundImagePath":"/x.jpg","showGrid":false,"gridUnit":64}"#;

        let s: SceneState = serde_json::from_str(old).unwrap();

        assert!(s.tokens.is_empty());
        assert!(s.area_templates.is_empty());
        assert_eq!(s.background_image_path, "/x.jpg");
        assert!(!s.show_grid);
        assert_eq!(s.grid_unit, 64.0);
    }

    #[test]
    fn empty_maps_serialize_as_objects() {
        let json = serde_json::to_string(&SceneState::new()).unwrap();

        assert!(json.contains(r#""tokens":{}"#));
        assert!(json.contains(r#""areaTemplates":{}"#));
    }
}
