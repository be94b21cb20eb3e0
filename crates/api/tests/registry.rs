//! Connection registry tests: registration, room membership, broadcast
//! fan-out, and disconnect cleanup.

use axum::extract::ws::Message;
use copydesk_api::ws::ConnectionRegistry;

fn text(body: &str) -> Message {
    Message::Text(body.into())
}

fn expect_text(message: Message) -> String {
    match message {
        Message::Text(body) => body.to_string(),
        other => panic!("Expected text frame, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_disconnect_update_connection_count() {
    let registry = ConnectionRegistry::new();
    assert_eq!(registry.connection_count().await, 0);

    let _rx_a = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    let _rx_b = registry.add("conn-b".to_string(), "ben@example.com".to_string()).await;
    assert_eq!(registry.connection_count().await, 2);

    registry.on_disconnect("conn-a").await;
    assert_eq!(registry.connection_count().await, 1);
}

#[tokio::test]
async fn identity_of_returns_registered_identity() {
    let registry = ConnectionRegistry::new();
    let _rx = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;

    assert_eq!(
        registry.identity_of("conn-a").await,
        Some("ana@example.com".to_string())
    );
    assert_eq!(registry.identity_of("conn-x").await, None);
}

#[tokio::test]
async fn re_adding_a_connection_id_replaces_the_channel() {
    let registry = ConnectionRegistry::new();
    let mut old_rx = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    let mut new_rx = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    assert_eq!(registry.connection_count().await, 1);

    assert!(registry.send_to("conn-a", text("hello")).await);
    assert!(old_rx.try_recv().is_err());
    assert_eq!(expect_text(new_rx.try_recv().unwrap()), "hello");
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn join_is_idempotent_and_leave_prunes_empty_rooms() {
    let registry = ConnectionRegistry::new();
    let _rx = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;

    registry.join("conn-a", "article:42").await;
    registry.join("conn-a", "article:42").await;
    assert_eq!(registry.room_size("article:42").await, 1);

    registry.leave("conn-a", "article:42").await;
    assert_eq!(registry.room_size("article:42").await, 0);

    // Leaving again is a no-op.
    registry.leave("conn-a", "article:42").await;
}

#[tokio::test]
async fn join_from_unknown_connection_is_ignored() {
    let registry = ConnectionRegistry::new();
    registry.join("ghost", "article:42").await;
    assert_eq!(registry.room_size("article:42").await, 0);
}

// ---------------------------------------------------------------------------
// Broadcast
// ---------------------------------------------------------------------------

#[tokio::test]
async fn room_broadcast_reaches_members_only() {
    let registry = ConnectionRegistry::new();
    let mut rx_a = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    let mut rx_b = registry.add("conn-b".to_string(), "ben@example.com".to_string()).await;
    let mut rx_c = registry.add("conn-c".to_string(), "cal@example.com".to_string()).await;

    registry.join("conn-a", "article:42").await;
    registry.join("conn-b", "article:42").await;

    registry
        .broadcast_to_room("article:42", text("reload"), None)
        .await;

    assert_eq!(expect_text(rx_a.try_recv().unwrap()), "reload");
    assert_eq!(expect_text(rx_b.try_recv().unwrap()), "reload");
    assert!(rx_c.try_recv().is_err());
}

#[tokio::test]
async fn room_broadcast_can_exclude_the_sender() {
    let registry = ConnectionRegistry::new();
    let mut rx_a = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    let mut rx_b = registry.add("conn-b".to_string(), "ben@example.com".to_string()).await;

    registry.join("conn-a", "article:42").await;
    registry.join("conn-b", "article:42").await;

    registry
        .broadcast_to_room("article:42", text("saved"), Some("conn-a"))
        .await;

    assert!(rx_a.try_recv().is_err());
    assert_eq!(expect_text(rx_b.try_recv().unwrap()), "saved");
}

#[tokio::test]
async fn broadcast_to_empty_room_is_a_noop() {
    let registry = ConnectionRegistry::new();
    registry
        .broadcast_to_room("article:99", text("reload"), None)
        .await;
}

#[tokio::test]
async fn broadcast_all_skips_only_the_excluded_connection() {
    let registry = ConnectionRegistry::new();
    let mut rx_a = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    let mut rx_b = registry.add("conn-b".to_string(), "ben@example.com".to_string()).await;

    registry.broadcast_all(text("typing"), Some("conn-a")).await;

    assert!(rx_a.try_recv().is_err());
    assert_eq!(expect_text(rx_b.try_recv().unwrap()), "typing");
}

#[tokio::test]
async fn closed_receiver_does_not_block_other_deliveries() {
    let registry = ConnectionRegistry::new();
    let rx_a = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    let mut rx_b = registry.add("conn-b".to_string(), "ben@example.com".to_string()).await;

    registry.join("conn-a", "article:42").await;
    registry.join("conn-b", "article:42").await;
    drop(rx_a);

    registry
        .broadcast_to_room("article:42", text("reload"), None)
        .await;
    assert_eq!(expect_text(rx_b.try_recv().unwrap()), "reload");
}

#[tokio::test]
async fn send_to_reports_missing_connections() {
    let registry = ConnectionRegistry::new();
    let _rx = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;

    assert!(registry.send_to("conn-a", text("hi")).await);
    assert!(!registry.send_to("conn-x", text("hi")).await);
}

// ---------------------------------------------------------------------------
// Disconnect and shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn on_disconnect_returns_sorted_rooms_and_clears_memberships() {
    let registry = ConnectionRegistry::new();
    let _rx = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    registry.join("conn-a", "layout:2").await;
    registry.join("conn-a", "article:42").await;

    let rooms = registry.on_disconnect("conn-a").await;
    assert_eq!(rooms, vec!["article:42".to_string(), "layout:2".to_string()]);
    assert_eq!(registry.room_size("article:42").await, 0);
    assert_eq!(registry.room_size("layout:2").await, 0);

    // Second call for the same connection finds nothing.
    assert!(registry.on_disconnect("conn-a").await.is_empty());
}

#[tokio::test]
async fn shutdown_all_sends_close_frames_and_clears_state() {
    let registry = ConnectionRegistry::new();
    let mut rx_a = registry.add("conn-a".to_string(), "ana@example.com".to_string()).await;
    let mut rx_b = registry.add("conn-b".to_string(), "ben@example.com".to_string()).await;
    registry.join("conn-a", "article:42").await;

    registry.shutdown_all().await;

    assert!(matches!(rx_a.try_recv().unwrap(), Message::Close(_)));
    assert!(matches!(rx_b.try_recv().unwrap(), Message::Close(_)));
    assert_eq!(registry.connection_count().await, 0);
    assert_eq!(registry.room_size("article:42").await, 0);
}
