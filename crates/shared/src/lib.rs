use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod segment;
mod wall;

pub use segment::{WallSegment, DEFAULT_HEIGHT, DEFAULT_THICKNESS};
pub use wall::{Appearance, Texture, Wall, WallPatch, DEFAULT_COLOR, DEFAULT_SIZE};

/// План этажа — упорядоченный список стен.
///
/// Order carries no meaning beyond stable indexing for selection.
pub type FloorPlan = Vec<Wall>;

/// Идентификатор пользователя
pub type UserId = String;

/// Сохранённый проект. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub owner: UserId,
    pub name: String,
    pub walls: FloorPlan,
    pub created_at: DateTime<Utc>,
}

/// Строка для вставки в таблицу проектов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub owner: UserId,
    pub name: String,
    pub walls: FloorPlan,
}

/// Тело запроса `POST /edit`.
///
/// Field names are part of the backend contract and must not be renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    pub prompt: String,
    pub current_walls: FloorPlan,
}

/// Ответ `POST /upload` и `POST /edit`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walls: Option<FloorPlan>,
}

/// Drop walls with degenerate geometry, keeping order of the rest
pub fn retain_solid(plan: FloorPlan) -> FloorPlan {
    let total = plan.len();
    let solid: FloorPlan = plan.into_iter().filter(Wall::is_solid).collect();
    if solid.len() < total {
        tracing::warn!(
            "Dropped {} degenerate wall(s) out of {}",
            total - solid.len(),
            total
        );
    }
    solid
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edit_request_field_names() {
        let request = EditRequest {
            prompt: "make it red".into(),
            current_walls: vec![Wall::at([0.0; 3])],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["prompt"], "make it red");
        assert_eq!(value["current_walls"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_walls_response_absent_vs_empty() {
        let absent: WallsResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.walls, None);

        let empty: WallsResponse = serde_json::from_value(json!({ "walls": [] })).unwrap();
        assert_eq!(empty.walls, Some(vec![]));

        let null: WallsResponse = serde_json::from_value(json!({ "walls": null })).unwrap();
        assert_eq!(null.walls, None);
    }

    #[test]
    fn test_mixed_wall_forms_in_one_response() {
        let response: WallsResponse = serde_json::from_value(json!({
            "walls": [
                { "position": [0, 1, 0], "size": [2, 2, 0.2] },
                { "id": "abc", "start": [0, 0], "end": [0, 2] }
            ]
        }))
        .unwrap();
        let walls = response.walls.unwrap();
        assert_eq!(walls.len(), 2);
        assert_eq!(walls[1].id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_retain_solid_drops_zero_length_segments() {
        let plan = vec![
            Wall::at([0.0; 3]),
            WallSegment::new([1.0, 1.0], [1.0, 1.0]).to_wall(),
            Wall::at([2.0, 0.0, 0.0]),
        ];
        let solid = retain_solid(plan);
        assert_eq!(solid.len(), 2);
        assert_eq!(solid[1].position, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_project_round_trips_through_json() {
        let project = Project {
            id: "p1".into(),
            owner: "u1".into(),
            name: "Flat".into(),
            walls: vec![Wall::at([0.0; 3]).with_texture(Texture::Brick)],
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&project).unwrap();
        let back: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(back, project);
    }
}
