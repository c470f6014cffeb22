//! Remote sync gateway against the development backend on an ephemeral port.

use floorplan_editor_lib::harness::TestHarness;
use floorplan_editor_lib::sync::{SyncError, SyncGateway};
use serde_json::json;
use server::AppState;
use shared::{Texture, Wall, DEFAULT_SIZE};

async fn spawn(state: AppState) -> SyncGateway {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));
    SyncGateway::new(format!("http://{addr}"))
}

const IMAGE: &[u8] = &[0x89, b'P', b'N', b'G', 0, 1, 2, 3];

#[tokio::test]
async fn test_upload_returns_fixture_walls() {
    let fixture = json!({ "walls": [
        { "position": [0, 1, 0], "size": [4, 2, 0.2], "color": "white" },
        { "position": [2, 1, 2], "rotation": [0, 1.5708, 0], "texture": "brick" }
    ]});
    let gw = spawn(AppState::default().with_upload_response(fixture)).await;

    let walls = gw.infer_from_image(IMAGE.to_vec(), "plan.png").await.unwrap();
    assert_eq!(walls.len(), 2);
    assert_eq!(walls[0].size, [4.0, 2.0, 0.2]);
    assert_eq!(walls[0].appearance.color(), Some("white"));
    assert_eq!(walls[1].size, DEFAULT_SIZE);
    assert_eq!(walls[1].appearance.texture(), Some(Texture::Brick));
}

#[tokio::test]
async fn test_upload_accepts_segment_walls() {
    let fixture = json!({ "walls": [
        { "id": "w1", "start": [0, 0], "end": [0, 5], "thickness": 0.3 },
        { "start": [1, 1], "end": [1, 1] }
    ]});
    let gw = spawn(AppState::default().with_upload_response(fixture)).await;

    let walls = gw.infer_from_image(IMAGE.to_vec(), "plan.jpg").await.unwrap();
    // Zero-length segment is dropped
    assert_eq!(walls.len(), 1);
    assert_eq!(walls[0].id.as_deref(), Some("w1"));
    assert!((walls[0].size[0] - 5.0).abs() < 1e-9);
    assert!((walls[0].size[2] - 0.3).abs() < 1e-9);
    assert_eq!(walls[0].position, [0.0, 1.0, 2.5]);
}

#[tokio::test]
async fn test_upload_with_no_walls() {
    let gw = spawn(AppState::default()).await;
    let err = gw.infer_from_image(IMAGE.to_vec(), "plan.png").await.unwrap_err();
    assert!(matches!(err, SyncError::NoWallsDetected));

    let gw = spawn(AppState::default().with_upload_response(json!({}))).await;
    let err = gw.infer_from_image(IMAGE.to_vec(), "plan.png").await.unwrap_err();
    assert!(err.is_empty_result());
}

#[tokio::test]
async fn test_backend_unreachable() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gw = SyncGateway::new(format!("http://{addr}"));
    let err = gw.infer_from_image(IMAGE.to_vec(), "plan.png").await.unwrap_err();
    assert!(matches!(err, SyncError::Unreachable(_)));

    let err = gw.apply_instruction("add a wall", &[]).await.unwrap_err();
    assert!(matches!(err, SyncError::Unreachable(_)));
}

#[tokio::test]
async fn test_malformed_upload_response() {
    let gw = spawn(AppState::default().with_upload_response(json!({ "walls": "many" }))).await;
    let err = gw.infer_from_image(IMAGE.to_vec(), "plan.png").await.unwrap_err();
    assert!(matches!(err, SyncError::Decode(_)));
}

#[tokio::test]
async fn test_edit_echo_sends_current_walls() {
    let gw = spawn(AppState::default()).await;
    let current = vec![
        Wall::at([0.0, 1.0, 0.0]).with_color("white"),
        Wall::at([3.0, 1.0, 0.0]).with_texture(Texture::Wood),
    ];

    let walls = gw.apply_instruction("keep it", &current).await.unwrap().unwrap();
    assert_eq!(walls, current);
}

#[tokio::test]
async fn test_edit_without_walls_is_none() {
    let gw = spawn(AppState::default().with_edit_response(json!({}))).await;
    let walls = gw
        .apply_instruction("do nothing", &[Wall::at([0.0; 3])])
        .await
        .unwrap();
    assert!(walls.is_none());
}

#[tokio::test]
async fn test_edit_replaces_plan_and_clears_selection() {
    let x = json!({ "position": [1, 1, 1] });
    let y = json!({ "position": [2, 1, 2], "color": "blue" });
    let gw = spawn(AppState::default().with_edit_response(json!({ "walls": [x, y] }))).await;

    let mut h = TestHarness::new();
    h.load_plan(vec![Wall::at([0.0; 3]), Wall::at([5.0; 3]), Wall::at([9.0; 3])]);
    h.click(2);

    let walls = gw
        .apply_instruction("make two walls", h.walls())
        .await
        .unwrap()
        .unwrap();
    h.load_plan(walls);

    assert_eq!(h.wall_count(), 2);
    assert_eq!(h.wall(1).unwrap().appearance.color(), Some("blue"));
    assert_eq!(h.selected(), None);
}

#[tokio::test]
async fn test_backend_error_status() {
    let gw = spawn(AppState::default()).await;
    let gw = SyncGateway::new(format!("{}/missing", gw.base_url()));
    let err = gw
        .apply_instruction("add a wall", &[Wall::at([0.0; 3])])
        .await
        .unwrap_err();
    match err {
        SyncError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("Expected Status, got {other:?}"),
    }
}
