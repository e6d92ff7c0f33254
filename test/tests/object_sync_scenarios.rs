use glam::Vec3;

use thengill_peer::{ApplyOutcome, ObjectSyncService, SyncConfig};
use thengill_shared::{
    decode, encode, HeadlessAssets, PeerMessage, Scene, SyncId, SyncKind, SyncObject, Transform,
};

fn service(address: &str) -> ObjectSyncService {
    ObjectSyncService::new(
        SyncConfig::default(),
        address,
        Box::new(HeadlessAssets::default()),
    )
}

fn scene(name: &str) -> Scene {
    let mut scene = Scene::new(name);
    scene.init();
    scene
}

/// Pushes a message through the wire encoding, as a peer would receive it.
fn over_the_wire(message: PeerMessage) -> PeerMessage {
    let bytes = encode(&message).expect("encodes");
    decode(&bytes).expect("decodes")
}

#[test]
fn test_snapshot_creates_entity_on_empty_peer() {
    let mut owner_scene = scene("owner");
    let mut owner = service("a");
    let entity = owner_scene.add_entity();
    owner_scene.add_component(&entity, SyncObject::with_id("s1", "tree"));
    owner_scene.add_component(&entity, Transform::from_position(Vec3::ZERO));

    let messages = owner.collect_outbound(&mut owner_scene);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, SyncKind::Create);

    let PeerMessage::Sync(received) = over_the_wire(PeerMessage::Sync(messages[0].clone())) else {
        panic!("sync message changed type on the wire");
    };

    let mut peer_scene = scene("peer");
    let mut peer = service("b");
    let outcome = peer.apply(&mut peer_scene, "a", &received).unwrap();

    let ApplyOutcome::Created(replica) = outcome else {
        panic!("expected a created replica, got {:?}", outcome);
    };
    assert_eq!(peer.entity_for(&SyncId::from("s1")), Some(replica));
    assert_eq!(
        peer_scene
            .get_component_from_entity::<Transform>(&replica)
            .unwrap()
            .position,
        Vec3::ZERO
    );
}

#[test]
fn test_duplicate_create_keeps_one_entity_with_latest_fields() {
    let mut owner_scene = scene("owner");
    let mut owner = service("a");
    let entity = owner_scene.add_entity();
    owner_scene.add_component(&entity, SyncObject::new("tree"));
    owner_scene.add_component(&entity, Transform::from_position(Vec3::ONE));
    let first = owner.collect_outbound(&mut owner_scene).remove(0);

    owner_scene
        .get_component_mut::<Transform>(&entity)
        .unwrap()
        .position = Vec3::new(9.0, 9.0, 9.0);
    let mut second = owner.collect_outbound(&mut owner_scene).remove(0);
    // a late joiner catch-up arrives as a second create
    second.kind = SyncKind::Create;

    let mut peer_scene = scene("peer");
    let mut peer = service("b");
    peer.apply(&mut peer_scene, "a", &first).unwrap();
    let outcome = peer.apply(&mut peer_scene, "a", &second).unwrap();

    assert!(matches!(outcome, ApplyOutcome::Updated(_)));
    assert_eq!(peer.sync_map().len(), 1);
    let replicas = peer_scene.get_components::<Transform>();
    assert_eq!(replicas.len(), 1);
    assert_eq!(replicas[0].1.position, Vec3::new(9.0, 9.0, 9.0));
}

#[test]
fn test_reordered_update_is_dropped() {
    let mut owner_scene = scene("owner");
    let mut owner = service("a");
    let entity = owner_scene.add_entity();
    owner_scene.add_component(&entity, SyncObject::new("rock"));
    owner_scene.add_component(&entity, Transform::default());
    let create = owner.collect_outbound(&mut owner_scene).remove(0);

    owner_scene
        .get_component_mut::<Transform>(&entity)
        .unwrap()
        .position = Vec3::X;
    let older = owner.collect_outbound(&mut owner_scene).remove(0);
    owner_scene
        .get_component_mut::<Transform>(&entity)
        .unwrap()
        .position = Vec3::Y;
    let newer = owner.collect_outbound(&mut owner_scene).remove(0);

    let mut peer_scene = scene("peer");
    let mut peer = service("b");
    peer.apply(&mut peer_scene, "a", &create).unwrap();
    peer.apply(&mut peer_scene, "a", &newer).unwrap();
    assert_eq!(
        peer.apply(&mut peer_scene, "a", &older).unwrap(),
        ApplyOutcome::Stale
    );

    let replicas = peer_scene.get_components::<Transform>();
    assert_eq!(replicas[0].1.position, Vec3::Y);
}
